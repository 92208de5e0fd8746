//! Path following plugin for moving entities along splines.
//!
//! Followers advance by arc length, so a speed in meters per second is
//! constant in world space regardless of control-point density. They report
//! milestones and loop events through [`FollowerEvent`] messages.
//!
//! # Example
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use spline_studio::prelude::*;
//!
//! fn setup(mut commands: Commands) {
//!     let mut road = Spline::new(SplineType::Hermite, Vec::new());
//!     road.build_full_curve(20.0, 90.0, false, 50.0, 5.0, 10, 8, false).unwrap();
//!     let road = commands.spawn((road, Transform::default())).id();
//!
//!     commands.spawn((
//!         Transform::default(),
//!         SplineFollower::new(road)
//!             .with_speed(50.0, SpeedUnits::KilometersPerHour)
//!             .with_loop_mode(LoopMode::PingPong),
//!     ));
//! }
//! ```

mod components;
mod systems;

pub use components::*;
pub use systems::update_spline_followers;

use bevy::prelude::*;

use crate::spline::SplineSystems;

/// Plugin that enables entities to follow spline paths.
///
/// Requires [`SplinePlugin`](crate::spline::SplinePlugin) for the refresh
/// ordering. Add [`SplineFollower`] components to entities you want to move.
pub struct SplineFollowPlugin;

impl Plugin for SplineFollowPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SplineFollower>()
            .register_type::<SpeedUnits>()
            .register_type::<LoopMode>()
            .register_type::<MilestoneMode>()
            .register_type::<FollowerOrientation>()
            .register_type::<FollowerState>()
            .add_message::<FollowerEvent>()
            .add_systems(
                Update,
                systems::update_spline_followers.in_set(SplineSystems::Follow),
            );
    }
}
