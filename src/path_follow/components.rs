use bevy::prelude::*;

/// Unit of [`SplineFollower::speed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Default)]
pub enum SpeedUnits {
    #[default]
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
    /// Curve parameter (0..1) per second, independent of the spline's length.
    PercentagePerSecond,
}

impl SpeedUnits {
    /// Convert `speed` in these units into curve parameter per second.
    ///
    /// Distance-based units need the spline's `total_length`; a spline of
    /// zero length yields zero.
    pub fn parameter_rate(self, speed: f32, total_length: f32) -> f32 {
        let meters_per_second = match self {
            Self::PercentagePerSecond => return speed,
            Self::MetersPerSecond => speed,
            Self::KilometersPerHour => speed / 3.6,
            Self::MilesPerHour => speed * 0.44704,
        };
        if total_length > 0.0 {
            meters_per_second / total_length
        } else {
            0.0
        }
    }
}

/// How the follower behaves when reaching an end of the spline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Default)]
pub enum LoopMode {
    /// Stop at the end of the spline.
    #[default]
    Once,
    /// Jump back to the start (or the end, when moving backwards).
    AutoRewind,
    /// Reverse direction at each end.
    PingPong,
}

/// What counts as a milestone while travelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Default)]
pub enum MilestoneMode {
    /// Control points the follower passes.
    #[default]
    ControlPoints,
    /// Every sampled point the follower passes.
    InterpolatedPoints,
}

/// How the follower's rotation is driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Default)]
pub enum FollowerOrientation {
    /// Leave the rotation alone.
    #[default]
    None,
    /// Face along the spline, using its cambered up axis.
    FollowSpline,
    /// Face the given entity, using the spline's cambered up axis.
    FollowTarget(Entity),
}

/// Current state of a spline follower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Default)]
pub enum FollowerState {
    #[default]
    Playing,
    Paused,
    /// Reached the end with [`LoopMode::Once`].
    Finished,
}

/// Component that moves an entity along a spline.
///
/// The follower writes its [`Transform`] directly, so it should not be
/// parented to another moving entity.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component, Default)]
pub struct SplineFollower {
    /// The spline entity to follow.
    pub spline: Entity,

    /// Position on the spline by arc length, 0 at the start and 1 at the end.
    pub curve_percent: f32,

    /// Travel speed, in `speed_units`.
    pub speed: f32,

    pub speed_units: SpeedUnits,

    pub loop_mode: LoopMode,

    pub state: FollowerState,

    /// Whether the entity's translation is moved onto the spline.
    pub affect_position: bool,

    /// Offset from the spline in the local frame of the current segment
    /// (X right, Y up, Z forward).
    pub position_offset: Vec3,

    pub orientation: FollowerOrientation,

    /// Extra rotation applied after the orientation, as Euler angles in degrees.
    pub additional_rotation: Vec3,

    pub milestones: MilestoneMode,

    /// Last milestone index reported.
    pub current_milestone: usize,

    /// Direction of travel: 1.0 forward, -1.0 backward.
    pub direction: f32,
}

impl Default for SplineFollower {
    fn default() -> Self {
        Self {
            spline: Entity::PLACEHOLDER,
            curve_percent: 0.0,
            speed: 1.0,
            speed_units: SpeedUnits::MetersPerSecond,
            loop_mode: LoopMode::Once,
            state: FollowerState::Playing,
            affect_position: true,
            position_offset: Vec3::ZERO,
            orientation: FollowerOrientation::FollowSpline,
            additional_rotation: Vec3::ZERO,
            milestones: MilestoneMode::ControlPoints,
            current_milestone: 0,
            direction: 1.0,
        }
    }
}

impl SplineFollower {
    /// Create a new follower for the given spline.
    pub fn new(spline: Entity) -> Self {
        Self {
            spline,
            ..default()
        }
    }

    /// Set the speed and its units.
    pub fn with_speed(mut self, speed: f32, units: SpeedUnits) -> Self {
        self.speed = speed;
        self.speed_units = units;
        self
    }

    /// Set the starting position (0.0 to 1.0).
    pub fn with_start_percent(mut self, percent: f32) -> Self {
        self.curve_percent = percent.clamp(0.0, 1.0);
        self
    }

    pub fn with_loop_mode(mut self, mode: LoopMode) -> Self {
        self.loop_mode = mode;
        self
    }

    pub fn with_orientation(mut self, orientation: FollowerOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_additional_rotation(mut self, degrees: Vec3) -> Self {
        self.additional_rotation = degrees;
        self
    }

    /// Set a segment-local offset from the spline position.
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.position_offset = offset;
        self
    }

    pub fn with_affect_position(mut self, affect: bool) -> Self {
        self.affect_position = affect;
        self
    }

    pub fn with_milestones(mut self, mode: MilestoneMode) -> Self {
        self.milestones = mode;
        self
    }

    /// Travel from the end towards the start.
    pub fn reversed(mut self) -> Self {
        self.direction = -1.0;
        self
    }

    pub fn play(&mut self) {
        self.state = FollowerState::Playing;
    }

    pub fn pause(&mut self) {
        self.state = FollowerState::Paused;
    }

    /// Reset to the start of the spline.
    pub fn reset(&mut self) {
        self.curve_percent = 0.0;
        self.direction = 1.0;
        self.current_milestone = 0;
        self.state = FollowerState::Playing;
    }

    pub fn is_finished(&self) -> bool {
        self.state == FollowerState::Finished
    }

    pub fn is_playing(&self) -> bool {
        self.state == FollowerState::Playing
    }

    /// [`Self::additional_rotation`] as a quaternion (Z, then X, then Y).
    pub fn additional_rotation_quat(&self) -> Quat {
        let degrees = self.additional_rotation;
        Quat::from_euler(
            EulerRot::YXZ,
            degrees.y.to_radians(),
            degrees.x.to_radians(),
            degrees.z.to_radians(),
        )
    }
}

/// Message emitted when a follower reaches a significant point.
#[derive(Message, Debug, Clone)]
pub struct FollowerEvent {
    /// The entity with the SplineFollower component.
    pub entity: Entity,
    pub kind: FollowerEventKind,
}

/// Types of follower events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerEventKind {
    /// Follower passed onto a new milestone (control point or sample index).
    MilestoneReached(usize),
    /// Follower reached the end of the spline.
    ReachedEnd,
    /// Follower reached the start of the spline while travelling backwards.
    ReachedStart,
    /// Follower stopped ([`LoopMode::Once`]).
    Finished,
}
