//! Geometry utilities for spline-based calculations.

use bevy::prelude::*;

/// A local coordinate frame defined by right, up and forward vectors.
///
/// Built like a look rotation: `forward` is kept, `right = up × forward` and
/// the up vector is re-orthogonalized. A zero forward yields the identity
/// frame, so offsets pass through unchanged on degenerate segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFrame {
    /// Local +X.
    pub right: Vec3,
    /// Local +Y.
    pub up: Vec3,
    /// Local +Z, the direction of travel.
    pub forward: Vec3,
}

impl CoordinateFrame {
    /// The world axes.
    pub const IDENTITY: Self = Self {
        right: Vec3::X,
        up: Vec3::Y,
        forward: Vec3::Z,
    };

    /// Build a frame looking along `forward` with `preferred_up` as the up hint.
    ///
    /// When `forward` is parallel to `preferred_up`, X is used as the hint instead.
    pub fn look(forward: Vec3, preferred_up: Vec3) -> Self {
        let forward = forward.normalize_or_zero();
        if forward == Vec3::ZERO {
            return Self::IDENTITY;
        }

        let mut right = preferred_up.cross(forward).normalize_or_zero();
        if right.length_squared() < 0.001 {
            right = Vec3::X.cross(forward).normalize_or_zero();
        }
        let up = forward.cross(right).normalize_or_zero();

        Self { right, up, forward }
    }

    /// Map a local vector into this frame (X → right, Y → up, Z → forward).
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.right * local.x + self.up * local.y + self.forward * local.z
    }

    /// Transform a local point to world space relative to an origin.
    pub fn transform_point(&self, origin: Vec3, local: Vec3) -> Vec3 {
        origin + self.local_to_world(local)
    }

    /// Check if this frame is valid (non-degenerate).
    pub fn is_valid(&self) -> bool {
        self.right.length_squared() > 0.001 && self.up.length_squared() > 0.001
    }

    /// Rotation that points an entity's forward (-Z in Bevy) along `forward`
    /// with its +Y along `up`.
    pub fn to_rotation(&self) -> Quat {
        if !self.is_valid() {
            return Quat::IDENTITY;
        }
        Quat::from_mat3(&Mat3::from_cols(-self.right, self.up, -self.forward))
    }
}

/// Signed angle in radians between two unit vectors.
///
/// The sign is negative when `from` points away from `to_right`.
pub fn angle_between(from: Vec3, to: Vec3, to_right: Vec3) -> f32 {
    let forward_dot = from.dot(to).clamp(-1.0, 1.0);
    let right_dot = from.dot(to_right);

    let angle = forward_dot.acos();
    if right_dot < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Closest point to `point` on the segment `p1..p2`.
///
/// The flag is `false` when the result was clamped to an endpoint.
pub fn closest_point_on_segment(p1: Vec3, p2: Vec3, point: Vec3) -> (Vec3, bool) {
    let segment = p2 - p1;

    let dot_a = (point - p1).dot(segment);
    if dot_a <= 0.0 {
        return (p1, false);
    }

    let dot_b = (point - p2).dot(-segment);
    if dot_b <= 0.0 {
        return (p2, false);
    }

    (p1 + segment * (dot_a / (dot_a + dot_b)), true)
}
