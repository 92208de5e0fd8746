use bevy::prelude::*;

/// How editing one tangent handle affects the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Default)]
pub enum HandleMode {
    /// Handles move independently.
    Free,
    /// Handles stay anti-parallel but keep their own lengths.
    Aligned,
    /// Each handle is the exact negation of the other.
    #[default]
    Mirrored,
}

/// A user-authored anchor of a spline.
///
/// Handles are stored as offsets from `position` and only affect
/// [`SplineType::Bezier`](super::SplineType::Bezier) curves.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Default)]
pub struct ControlPoint {
    /// Position in the spline's local space.
    pub position: Vec3,
    /// Tilt in degrees around the curve direction, 0 is level.
    pub camber: f32,
    /// Incoming handle, relative to `position`.
    pub handle_in: Vec3,
    /// Outgoing handle, relative to `position`.
    pub handle_out: Vec3,
    /// Handle coupling mode.
    pub handle_mode: HandleMode,
}

impl ControlPoint {
    /// Create a control point with zero handles.
    pub fn new(position: Vec3, camber: f32) -> Self {
        Self {
            position,
            camber,
            ..default()
        }
    }

    /// Set the handle coupling mode.
    pub fn with_handle_mode(mut self, mode: HandleMode) -> Self {
        self.handle_mode = mode;
        self
    }

    /// Set the incoming handle and update the outgoing one according to the mode.
    pub fn set_handle_in(&mut self, handle: Vec3) {
        self.handle_in = handle;
        self.handle_in_changed();
    }

    /// Set the outgoing handle and update the incoming one according to the mode.
    pub fn set_handle_out(&mut self, handle: Vec3) {
        self.handle_out = handle;
        self.handle_out_changed();
    }

    /// Re-apply the handle mode after `handle_in` was edited directly.
    pub fn handle_in_changed(&mut self) {
        match self.handle_mode {
            HandleMode::Mirrored => self.handle_out = -self.handle_in,
            HandleMode::Aligned => {
                let length = self.handle_out.length();
                self.handle_out = (-self.handle_in).normalize_or_zero() * length;
            }
            HandleMode::Free => {}
        }
    }

    /// Re-apply the handle mode after `handle_out` was edited directly.
    pub fn handle_out_changed(&mut self) {
        match self.handle_mode {
            HandleMode::Mirrored => self.handle_in = -self.handle_out,
            HandleMode::Aligned => {
                let length = self.handle_in.length();
                self.handle_in = (-self.handle_out).normalize_or_zero() * length;
            }
            HandleMode::Free => {}
        }
    }

    /// Exchange the incoming and outgoing handles.
    pub fn swap_handles(&mut self) {
        std::mem::swap(&mut self.handle_in, &mut self.handle_out);
    }
}
