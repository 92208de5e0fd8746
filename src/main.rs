//! Headless demo: builds a banked road curve and drives a follower over it.
//!
//! Run with: `cargo run`

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use spline_studio::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))),
            LogPlugin::default(),
        ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .add_plugins((SplinePlugin, SplineFollowPlugin))
        .add_systems(Startup, setup)
        .add_systems(Update, report_progress.after(SplineSystems::Follow))
        .run();
}

fn build_road(settings: &SplineSettings) -> Result<Spline, SplineError> {
    let mut road = settings.new_spline(SplineType::Hermite);
    // Straight run-up, a banked right-hander, then a straight exit
    road.build_straight(Vec3::Z, 30.0, 3, false)?;
    road.build_full_curve(20.0, 90.0, false, 50.0, 5.0, 10, 8, true)?;
    road.build_straight(Vec3::Z, 30.0, 3, true)?;
    Ok(road)
}

fn setup(mut commands: Commands, settings: Res<SplineSettings>) {
    let road = match build_road(&settings) {
        Ok(road) => road,
        Err(err) => {
            error!("Failed to build demo road: {err}");
            return;
        }
    };

    info!(
        "Road: {} control points, {} samples, {:.1} m",
        road.control_points().len(),
        road.samples().len(),
        road.total_length()
    );

    let road = commands.spawn((road, Transform::default())).id();

    commands.spawn((
        Name::new("Car"),
        Transform::default(),
        SplineFollower::new(road)
            .with_speed(120.0, SpeedUnits::KilometersPerHour)
            .with_offset(Vec3::new(1.5, 0.5, 0.0)),
    ));
}

fn report_progress(
    mut events: MessageReader<FollowerEvent>,
    followers: Query<(&Transform, &SplineFollower)>,
    mut exit: MessageWriter<AppExit>,
) {
    for event in events.read() {
        let Ok((transform, follower)) = followers.get(event.entity) else {
            continue;
        };
        match event.kind {
            FollowerEventKind::MilestoneReached(index) => info!(
                "Control point {index} at {:.1}% ({:.2}, {:.2}, {:.2})",
                follower.curve_percent * 100.0,
                transform.translation.x,
                transform.translation.y,
                transform.translation.z
            ),
            FollowerEventKind::Finished => {
                info!("Finished at {:?}", transform.translation);
                exit.write(AppExit::Success);
            }
            kind => debug!("{kind:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_road_run_up_stays_straight() {
        let road = build_road(&SplineSettings::default()).unwrap();
        let run_up: Vec<Vec3> = road
            .samples()
            .iter()
            .filter(|s| matches!(s.source_control_point, Some(0 | 1)))
            .map(|s| s.position)
            .collect();

        assert!(!run_up.is_empty());
        for p in run_up {
            assert!(p.x.abs() < 1e-3 && p.z >= -1e-3, "{p}");
        }
    }
}
