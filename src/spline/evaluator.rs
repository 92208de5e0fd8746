//! Sampling of control points into a dense polyline with per-sample frames.
//!
//! Every refresh rebuilds the whole sample list from the control points; the
//! output is a pure function of its inputs.

use std::ops::{Add, Mul};

use bevy::prelude::*;

use super::{ControlPoint, Interpolation, SampledPoint, SplineType};

/// Sample `points` into a polyline and return it with its total arc length.
///
/// Fewer than two control points produce no samples.
pub fn sample_control_points(
    points: &[ControlPoint],
    spline_type: SplineType,
    interpolation: Interpolation,
    closed: bool,
) -> (Vec<SampledPoint>, f32) {
    if points.len() < 2 {
        return (Vec::new(), 0.0);
    }

    let mut sampler = Sampler {
        points,
        interpolation,
        closed,
        samples: Vec::new(),
    };

    if interpolation.is_polyline() {
        sampler.add_polyline();
    } else {
        match spline_type {
            SplineType::Linear => sampler.add_polyline(),
            SplineType::Hermite => sampler.add_hermite(),
            SplineType::Bezier => sampler.add_bezier(),
            SplineType::CatmullRom => sampler.add_catmull_rom(),
        }
    }

    let mut samples = sampler.samples;
    let total_length = compute_frames(&mut samples, closed);
    (samples, total_length)
}

struct Sampler<'a> {
    points: &'a [ControlPoint],
    interpolation: Interpolation,
    closed: bool,
    samples: Vec<SampledPoint>,
}

impl Sampler<'_> {
    fn push(&mut self, position: Vec3, camber: f32, source: Option<usize>) {
        self.samples.push(SampledPoint::new(position, camber, source));
    }

    /// `(start, end, is_last)` for every segment, including the closing one.
    fn segments(&self) -> Vec<(usize, usize, bool)> {
        let n = self.points.len();
        let mut segments: Vec<_> = (0..n - 1)
            .map(|j| (j, j + 1, !self.closed && j == n - 2))
            .collect();
        if self.closed {
            segments.push((n - 1, 0, true));
        }
        segments
    }

    fn add_polyline(&mut self) {
        let points = self.points;
        for (i, cp) in points.iter().enumerate() {
            self.push(cp.position, cp.camber, Some(i));
        }
        if self.closed {
            self.push(points[0].position, points[0].camber, Some(0));
        }
    }

    /// Emit the samples of one segment using `eval(t) -> (position, camber)`.
    fn add_segment(&mut self, start: usize, end: usize, is_last: bool, eval: impl Fn(f32) -> (Vec3, f32)) {
        let chord = self.points[start].position.distance(self.points[end].position);
        let (steps, t_step) = self.interpolation.step_parameters(chord);

        let mut t = 0.0;
        for i in 0..steps {
            let (position, camber) = eval(t);
            self.push(position, camber, (t <= 0.0).then_some(start));

            // t stays below 1 so the end point is only emitted once
            if i + 1 < steps {
                t += t_step;
            }
        }

        if t < 1.0 && is_last {
            let end_point = &self.points[end];
            self.push(end_point.position, end_point.camber, Some(end));
        }
    }

    fn add_hermite(&mut self) {
        let points = self.points;
        let n = points.len();
        let closed = self.closed;

        for (start, end, is_last) in self.segments() {
            let (p0, p1) = (points[start].position, points[end].position);
            let (c0, c1) = (points[start].camber, points[end].camber);

            let (m0, cm0, m1, cm1) = if closed {
                let prev = &points[(start + n - 1) % n];
                let next = &points[(end + 1) % n];
                (
                    0.5 * (p1 - prev.position),
                    0.5 * (c1 - prev.camber),
                    0.5 * (next.position - p0),
                    0.5 * (next.camber - c0),
                )
            } else {
                let (m0, cm0) = if start > 0 {
                    let prev = &points[start - 1];
                    (0.5 * (p1 - prev.position), 0.5 * (c1 - prev.camber))
                } else {
                    (p1 - p0, c1 - c0)
                };
                let (m1, cm1) = if end < n - 1 {
                    let next = &points[end + 1];
                    (0.5 * (next.position - p0), 0.5 * (next.camber - c0))
                } else {
                    (p1 - p0, c1 - c0)
                };
                (m0, cm0, m1, cm1)
            };

            self.add_segment(start, end, is_last, |t| {
                (hermite(p0, m0, p1, m1, t), hermite(c0, cm0, c1, cm1, t))
            });
        }
    }

    fn add_bezier(&mut self) {
        let points = self.points;

        for (start, end, is_last) in self.segments() {
            let (a, b) = (&points[start], &points[end]);
            let (p0, p1) = (a.position, a.position + a.handle_out);
            let (p2, p3) = (b.position + b.handle_in, b.position);

            self.add_segment(start, end, is_last, |t| {
                (cubic_bezier(p0, p1, p2, p3, t), lerp(a.camber, b.camber, t))
            });
        }
    }

    fn add_catmull_rom(&mut self) {
        let points = self.points;
        let n = points.len();

        for (start, end, is_last) in self.segments() {
            let p0 = points[clamp_catmull_rom_index(start as isize - 1, n)].position;
            let p1 = points[start].position;
            let p2 = points[clamp_catmull_rom_index(end as isize, n)].position;
            let p3 = points[clamp_catmull_rom_index(end as isize + 1, n)].position;
            let (c0, c1) = (points[start].camber, points[end].camber);

            self.add_segment(start, end, is_last, |t| {
                (catmull_rom(p0, p1, p2, p3, t), lerp(c0, c1, t))
            });
        }
    }
}

/// Fill in lengths, cumulative distances, frames and control-point back
/// references. Returns the total arc length.
fn compute_frames(samples: &mut [SampledPoint], closed: bool) -> f32 {
    let count = samples.len();
    if count == 0 {
        return 0.0;
    }

    let mut total_length = 0.0;
    for i in 0..count - 1 {
        let delta = samples[i + 1].position - samples[i].position;
        let length = delta.length();
        let direction = if length > 0.0 { delta / length } else { Vec3::ZERO };
        let inherited = if i > 0 { samples[i - 1].source_control_point } else { None };

        let sample = &mut samples[i];
        sample.segment_length_to_next = length;
        sample.axis_z = direction;
        sample.axis_y = cambered_up(direction, sample.camber);
        sample.axis_x = direction.cross(sample.axis_y);
        sample.cumulative_distance = total_length;
        total_length += length;

        if sample.source_control_point.is_none() {
            sample.source_control_point = inherited;
        }
    }

    let first = samples[0];
    let previous_axis_z = if count > 1 { samples[count - 2].axis_z } else { Vec3::ZERO };
    let last = &mut samples[count - 1];
    last.cumulative_distance = total_length;
    if closed {
        last.axis_x = first.axis_x;
        last.axis_y = first.axis_y;
        last.axis_z = first.axis_z;
        last.segment_length_to_next = first.segment_length_to_next;
    } else {
        last.axis_z = previous_axis_z;
        last.axis_y = cambered_up(previous_axis_z, last.camber);
        last.axis_x = previous_axis_z.cross(last.axis_y);
        last.segment_length_to_next = 0.0;
    }

    total_length
}

/// World up rolled by `camber_degrees` around `direction`.
///
/// A zero direction leaves up untouched.
fn cambered_up(direction: Vec3, camber_degrees: f32) -> Vec3 {
    if direction == Vec3::ZERO {
        return Vec3::Y;
    }
    Quat::from_axis_angle(direction, camber_degrees.to_radians()) * Vec3::Y
}

/// Neighbour lookup for Catmull-Rom windows.
///
/// Indices past the end wrap like a closed loop: `count` maps to 1 and
/// `count - 1`'s successor to 0; negative indices map to `count - 1`.
pub(crate) fn clamp_catmull_rom_index(pos: isize, count: usize) -> usize {
    let count = count as isize;
    let mut pos = pos;
    if pos < 0 {
        pos = count - 1;
    }

    if pos > count {
        pos = 1;
    } else if pos > count - 1 {
        pos = 0;
    }

    pos as usize
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

fn hermite<T>(p0: T, m0: T, p1: T, m1: T, t: f32) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let t2 = t * t;
    let t3 = t2 * t;

    p0 * (2.0 * t3 - 3.0 * t2 + 1.0)
        + m0 * (t3 - 2.0 * t2 + t)
        + p1 * (-2.0 * t3 + 3.0 * t2)
        + m1 * (t3 - t2)
}

fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    p0 * mt3 + p1 * 3.0 * mt2 * t + p2 * 3.0 * mt * t2 + p3 * t3
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}
