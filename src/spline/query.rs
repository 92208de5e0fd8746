//! Arc-length queries on refreshed splines.
//!
//! Positions are found by locating the pair of samples bracketing a distance
//! along the curve and interpolating linearly between them, then mapping the
//! result through the owning entity's transform.

use bevy::prelude::*;

use super::{SampledPoint, Spline, SplineError};

/// A point on a spline in world space, with the frame of its segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineLocation {
    /// Index of the sample that starts the bracketing segment.
    pub index: usize,
    /// World-space position, including any local offset.
    pub position: Vec3,
    /// World-space side axis.
    pub axis_x: Vec3,
    /// World-space up axis (cambered).
    pub axis_y: Vec3,
    /// World-space direction of travel.
    pub axis_z: Vec3,
}

impl SplineLocation {
    /// Rotation looking along `axis_z` with `axis_y` as up (Bevy's -Z forward).
    pub fn rotation(&self) -> Quat {
        crate::geometry::CoordinateFrame::look(self.axis_z, self.axis_y).to_rotation()
    }
}

impl Spline {
    /// Locate the point at normalized parameter `t` (0 = start, 1 = end).
    ///
    /// `t` is measured in arc length, not in control-point segments.
    /// Values outside `[0, 1]` clamp to the end samples. `local_offset` is
    /// applied in the frame of the bracketing segment (X right, Y up,
    /// Z forward).
    pub fn query_by_parameter(
        &self,
        t: f32,
        local_offset: Vec3,
        transform: &Transform,
    ) -> Result<SplineLocation, SplineError> {
        let samples = self.fresh_samples()?;

        if t <= 0.0 {
            return Ok(location_at_sample(samples, 0, local_offset, transform));
        }
        if t >= 1.0 {
            return Ok(location_at_sample(samples, samples.len() - 1, local_offset, transform));
        }

        self.query_by_distance(self.parameter_to_distance(t), local_offset, transform)
    }

    /// Locate the point `distance` world units along the curve from its start.
    ///
    /// Distances outside `[0, total_length]` clamp to the end samples.
    pub fn query_by_distance(
        &self,
        distance: f32,
        local_offset: Vec3,
        transform: &Transform,
    ) -> Result<SplineLocation, SplineError> {
        let samples = self.fresh_samples()?;
        let last = samples.len() - 1;

        if distance <= 0.0 {
            return Ok(location_at_sample(samples, 0, local_offset, transform));
        }
        if distance >= self.total_length() {
            return Ok(location_at_sample(samples, last, local_offset, transform));
        }

        // First bracket wins, so a distance landing on a sample belongs to the
        // segment starting there.
        let Some(index) = samples
            .windows(2)
            .position(|pair| pair[1].cumulative_distance > distance)
        else {
            return Ok(location_at_sample(samples, last, local_offset, transform));
        };

        let start = &samples[index];
        let end = &samples[index + 1];
        let t = ((distance - start.cumulative_distance) / start.segment_length_to_next).clamp(0.0, 1.0);
        let local = start.position.lerp(end.position, t) + local_offset_of(start, local_offset);

        Ok(to_world(index, local, start, transform))
    }

    /// Convert a normalized parameter into a distance along the curve.
    pub fn parameter_to_distance(&self, t: f32) -> f32 {
        self.total_length() * t.clamp(0.0, 1.0)
    }

    /// Convert a distance along the curve into a normalized parameter.
    pub fn distance_to_parameter(&self, distance: f32) -> f32 {
        let total = self.total_length();
        if total <= 0.0 {
            return 0.0;
        }
        (distance / total).clamp(0.0, 1.0)
    }

    /// `count` locations evenly spaced by arc length, both ends included.
    pub fn locations_evenly_spaced(
        &self,
        count: usize,
        local_offset: Vec3,
        transform: &Transform,
    ) -> Result<Vec<SplineLocation>, SplineError> {
        match count {
            0 => Ok(Vec::new()),
            1 => Ok(vec![self.query_by_parameter(0.5, local_offset, transform)?]),
            _ => (0..count)
                .map(|i| {
                    let t = i as f32 / (count - 1) as f32;
                    self.query_by_parameter(t, local_offset, transform)
                })
                .collect(),
        }
    }

    fn fresh_samples(&self) -> Result<&[SampledPoint], SplineError> {
        if self.is_dirty() {
            return Err(SplineError::Stale);
        }
        let samples = self.samples();
        if samples.is_empty() {
            return Err(SplineError::Empty);
        }
        Ok(samples)
    }
}

fn local_offset_of(sample: &SampledPoint, local_offset: Vec3) -> Vec3 {
    if local_offset == Vec3::ZERO {
        return Vec3::ZERO;
    }
    sample.frame().local_to_world(local_offset)
}

fn location_at_sample(
    samples: &[SampledPoint],
    index: usize,
    local_offset: Vec3,
    transform: &Transform,
) -> SplineLocation {
    let sample = &samples[index];
    let local = sample.position + local_offset_of(sample, local_offset);
    to_world(index, local, sample, transform)
}

fn to_world(index: usize, local: Vec3, sample: &SampledPoint, transform: &Transform) -> SplineLocation {
    SplineLocation {
        index,
        position: transform.transform_point(local),
        axis_x: transform.rotation * sample.axis_x,
        axis_y: transform.rotation * sample.axis_y,
        axis_z: transform.rotation * sample.axis_z,
    }
}
