use bevy::prelude::*;

use crate::geometry::CoordinateFrame;

/// A densely interpolated point of a refreshed spline.
///
/// The axes describe the segment that starts at this sample: `axis_z` points
/// to the next sample, `axis_y` is world up rolled by `camber` around
/// `axis_z`, and `axis_x = axis_z × axis_y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct SampledPoint {
    /// Position in the spline's local space.
    pub position: Vec3,
    /// Interpolated camber in degrees.
    pub camber: f32,
    /// Side axis of the segment.
    pub axis_x: Vec3,
    /// Up axis of the segment after camber.
    pub axis_y: Vec3,
    /// Direction towards the next sample.
    pub axis_z: Vec3,
    /// Distance to the next sample.
    pub segment_length_to_next: f32,
    /// Arc length from the first sample.
    pub cumulative_distance: f32,
    /// Control point this sample belongs to, if known.
    pub source_control_point: Option<usize>,
}

impl SampledPoint {
    pub(crate) fn new(position: Vec3, camber: f32, source_control_point: Option<usize>) -> Self {
        Self {
            position,
            camber,
            source_control_point,
            ..default()
        }
    }

    /// Offset this sample's position by a vector expressed in its own axes.
    ///
    /// With `swap_xy` the offset's X runs along `axis_y` and Y along `axis_x`.
    pub fn offset_point(&self, offset: Vec3, swap_xy: bool) -> Vec3 {
        self.position + offset_along_axes(self.axis_x, self.axis_y, self.axis_z, offset, swap_xy)
    }

    /// Offset `current`'s position using the average of both samples' axes.
    ///
    /// Used at joints between segments so strips built from the samples do
    /// not pinch at corners.
    pub fn averaged_offset_point(
        previous: &SampledPoint,
        current: &SampledPoint,
        offset: Vec3,
        swap_xy: bool,
    ) -> Vec3 {
        let axis_x = (previous.axis_x + current.axis_x).normalize_or_zero();
        let axis_y = (previous.axis_y + current.axis_y).normalize_or_zero();
        let axis_z = (previous.axis_z + current.axis_z).normalize_or_zero();
        current.position + offset_along_axes(axis_x, axis_y, axis_z, offset, swap_xy)
    }

    /// Look-rotation frame of this sample (forward `axis_z`, up `axis_y`).
    pub fn frame(&self) -> CoordinateFrame {
        CoordinateFrame::look(self.axis_z, self.axis_y)
    }
}

fn offset_along_axes(axis_x: Vec3, axis_y: Vec3, axis_z: Vec3, offset: Vec3, swap_xy: bool) -> Vec3 {
    let (first, second) = if swap_xy { (axis_y, axis_x) } else { (axis_x, axis_y) };
    first * offset.x + second * offset.y + axis_z * offset.z
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(position: Vec3, axis_x: Vec3, axis_z: Vec3) -> SampledPoint {
        SampledPoint {
            position,
            axis_x,
            axis_y: Vec3::Y,
            axis_z,
            ..default()
        }
    }

    #[test]
    fn test_offset_point() {
        let s = sample(Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_Z, Vec3::X);
        let p = s.offset_point(Vec3::new(2.0, 1.0, 0.5), false);
        assert!((p - Vec3::new(1.5, 1.0, -2.0)).length() < 1e-5);

        let swapped = s.offset_point(Vec3::new(2.0, 1.0, 0.0), true);
        assert!((swapped - Vec3::new(1.0, 2.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_averaged_offset_point() {
        let a = sample(Vec3::ZERO, Vec3::NEG_Z, Vec3::X);
        let b = sample(Vec3::X, Vec3::X, Vec3::Z);
        let p = SampledPoint::averaged_offset_point(&a, &b, Vec3::new(1.0, 0.0, 0.0), false);
        let expected_axis = (Vec3::NEG_Z + Vec3::X).normalize();
        assert!((p - (Vec3::X + expected_axis)).length() < 1e-5);
    }
}
