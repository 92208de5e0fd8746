use bevy::prelude::*;

use crate::geometry::CoordinateFrame;
use crate::spline::{SampledPoint, Spline, SplineLocation};

use super::{
    FollowerEvent, FollowerEventKind, FollowerOrientation, FollowerState, LoopMode, MilestoneMode,
    SplineFollower,
};

/// System that updates all spline followers.
pub fn update_spline_followers(
    mut followers: Query<(Entity, &mut SplineFollower, &mut Transform)>,
    splines: Query<(&Spline, Option<&GlobalTransform>)>,
    targets: Query<&GlobalTransform>,
    time: Res<Time>,
    mut events: MessageWriter<FollowerEvent>,
) {
    let delta = time.delta_secs();

    for (entity, mut follower, mut transform) in &mut followers {
        if follower.state != FollowerState::Playing {
            continue;
        }
        if !follower.affect_position && follower.orientation == FollowerOrientation::None {
            continue;
        }

        let Ok((spline, spline_transform)) = splines.get(follower.spline) else {
            warn_once!("Spline follower {entity} references missing spline {}", follower.spline);
            continue;
        };
        let spline_transform = spline_transform
            .map(GlobalTransform::compute_transform)
            .unwrap_or_default();

        let rate = follower.speed_units.parameter_rate(follower.speed, spline.total_length());
        let advanced = follower.curve_percent + rate * follower.direction * delta;
        let (percent, direction, event) = handle_bounds(advanced, follower.direction, follower.loop_mode);
        follower.curve_percent = percent;
        follower.direction = direction;

        if let Some(kind) = event {
            events.write(FollowerEvent { entity, kind });
            if kind == FollowerEventKind::Finished {
                follower.state = FollowerState::Finished;
            }
        }

        let location = match spline.query_by_parameter(percent, follower.position_offset, &spline_transform) {
            Ok(location) => location,
            Err(err) => {
                debug!("Spline follower {entity} skipped: {err}");
                continue;
            }
        };

        let milestone = milestone_index(spline.samples(), location.index, follower.milestones);
        if milestone != follower.current_milestone {
            follower.current_milestone = milestone;
            events.write(FollowerEvent {
                entity,
                kind: FollowerEventKind::MilestoneReached(milestone),
            });
        }

        if follower.affect_position {
            transform.translation = location.position;
        }

        let extra = follower.additional_rotation_quat();
        match follower.orientation {
            FollowerOrientation::None => {}
            FollowerOrientation::FollowSpline => {
                transform.rotation = location.rotation() * extra;
            }
            FollowerOrientation::FollowTarget(target) => {
                transform.rotation = match targets.get(target) {
                    Ok(target) => look_at_target(&location, transform.translation, target.translation()) * extra,
                    Err(_) => Quat::IDENTITY,
                };
            }
        }
    }
}

/// Apply the loop mode to an advanced curve percent.
/// Returns (new_percent, new_direction, optional_event).
pub(crate) fn handle_bounds(
    t: f32,
    direction: f32,
    loop_mode: LoopMode,
) -> (f32, f32, Option<FollowerEventKind>) {
    match loop_mode {
        LoopMode::Once => {
            if t >= 1.0 && direction > 0.0 {
                (1.0, direction, Some(FollowerEventKind::Finished))
            } else if t <= 0.0 && direction < 0.0 {
                (0.0, direction, Some(FollowerEventKind::Finished))
            } else {
                (t.clamp(0.0, 1.0), direction, None)
            }
        }
        LoopMode::AutoRewind => {
            if t >= 1.0 && direction > 0.0 {
                (0.0, direction, Some(FollowerEventKind::ReachedEnd))
            } else if t <= 0.0 && direction < 0.0 {
                (1.0, direction, Some(FollowerEventKind::ReachedStart))
            } else {
                (t.clamp(0.0, 1.0), direction, None)
            }
        }
        LoopMode::PingPong => {
            // Only bounce off the end being travelled towards
            if t >= 1.0 && direction > 0.0 {
                let overshoot = t - 1.0;
                ((1.0 - overshoot).max(0.0), -1.0, Some(FollowerEventKind::ReachedEnd))
            } else if t <= 0.0 && direction < 0.0 {
                let overshoot = -t;
                (overshoot.min(1.0), 1.0, Some(FollowerEventKind::ReachedStart))
            } else {
                (t.clamp(0.0, 1.0), direction, None)
            }
        }
    }
}

/// Milestone for the sample starting the follower's current segment.
///
/// Samples without a control point keep the sample index, so interpolated
/// runs between control points report the sample they started from.
pub(crate) fn milestone_index(samples: &[SampledPoint], sample_index: usize, mode: MilestoneMode) -> usize {
    match mode {
        MilestoneMode::InterpolatedPoints => sample_index,
        MilestoneMode::ControlPoints => samples
            .get(sample_index)
            .and_then(|sample| sample.source_control_point)
            .unwrap_or(sample_index),
    }
}

fn look_at_target(location: &SplineLocation, position: Vec3, target: Vec3) -> Quat {
    let frame = CoordinateFrame::look((target - position).normalize_or_zero(), location.axis_y);
    if !frame.is_valid() {
        return Quat::IDENTITY;
    }
    frame.to_rotation()
}
