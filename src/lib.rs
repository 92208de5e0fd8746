//! # spline_studio
//!
//! A Bevy plugin for sampling 3D splines and building road-style curves.
//!
//! ## Features
//!
//! - Linear, Hermite, Bézier and Catmull-Rom splines with per-point camber
//! - Fixed-step or fixed-distance sampling with a local frame per sample
//! - Arc-length queries by normalized parameter or distance
//! - Builders for straights, arcs, clothoids and full banked curves
//! - Entities that follow splines with loop modes and milestone events
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use spline_studio::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins((SplinePlugin, SplineFollowPlugin))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn((
//!         Spline::from_positions(
//!             SplineType::CatmullRom,
//!             [
//!                 Vec3::new(-3.0, 0.0, 0.0),
//!                 Vec3::new(-1.0, 2.0, 0.0),
//!                 Vec3::new(1.0, -1.0, 0.0),
//!                 Vec3::new(3.0, 1.0, 0.0),
//!             ],
//!         ),
//!         Transform::default(),
//!     ));
//! }
//! ```
//!
//! ## Plugins
//!
//! - [`SplinePlugin`]: Type registration, settings and automatic refresh (required)
//! - [`SplineFollowPlugin`]: Move entities along splines (optional)
//!
//! ## Refreshing
//!
//! Splines cache their samples. Any edit marks the spline dirty and queries
//! return [`SplineError::Stale`](spline::SplineError::Stale) until it is
//! refreshed, either by [`SplinePlugin`] at the start of `Update` or manually:
//!
//! ```ignore
//! spline.control_points_mut()[0].camber = 10.0;
//! spline.refresh();
//! let location = spline.query_by_parameter(0.5, Vec3::ZERO, &transform)?;
//! ```

pub mod geometry;
pub mod path_follow;
pub mod spline;

pub use path_follow::SplineFollowPlugin;
pub use spline::SplinePlugin;

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::path_follow::{
        FollowerEvent, FollowerEventKind, FollowerOrientation, FollowerState, LoopMode,
        MilestoneMode, SpeedUnits, SplineFollowPlugin, SplineFollower,
    };
    pub use crate::spline::{
        ControlPoint, HandleMode, Interpolation, SampledPoint, Spline, SplineError,
        SplineLocation, SplinePlugin, SplineSettings, SplineSystems, SplineType,
    };
}
