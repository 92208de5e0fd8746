//! Procedural generators for road-style splines.
//!
//! Builders work in the XZ plane with +Y up and +Z as the default heading.
//! Positive sweep angles turn towards +X. Each builder either replaces the
//! control points or continues from the last one, then refreshes the spline.

use bevy::prelude::*;

use crate::geometry::angle_between;

use super::{ControlPoint, Spline, SplineError};

/// Sub-intervals used per point when integrating the clothoid.
pub const CLOTHOID_INTEGRATION_INTERVALS: u32 = 20;

impl Spline {
    /// Add `steps` evenly spaced points along a straight line of `length`.
    ///
    /// When appending to a spline with at least two points, the line
    /// continues the direction of the last segment and `direction` is ignored.
    pub fn build_straight(
        &mut self,
        direction: Vec3,
        length: f32,
        steps: usize,
        append: bool,
    ) -> Result<(), SplineError> {
        require_steps(steps, 1)?;
        require_positive("length", length)?;
        let mut direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return Err(SplineError::InvalidBuilderInput {
                name: "direction",
                value: 0.0,
            });
        }

        let start = if append {
            let start = self.last_position()?;
            if let Some(last_direction) = self.last_direction() {
                direction = last_direction;
            }
            start
        } else {
            self.control_points_mut().clear();
            self.push_unique(Vec3::ZERO, 0.0);
            Vec3::ZERO
        };

        let step = length / steps as f32;
        let mut point = start;
        for _ in 0..steps {
            point += direction * step;
            self.push_unique(point, 0.0);
        }

        debug!("Built straight of length {length} in {steps} steps");
        self.refresh();
        Ok(())
    }

    /// Add a constant-radius arc sweeping `total_degrees` in `steps` steps.
    ///
    /// Positive sweeps turn right (towards +X from a +Z heading) and get
    /// their camber negated so the curve leans into the turn.
    pub fn build_curve(
        &mut self,
        radius: f32,
        total_degrees: f32,
        camber_degrees: f32,
        steps: usize,
        append: bool,
    ) -> Result<(), SplineError> {
        require_steps(steps, 1)?;
        require_positive("radius", radius)?;

        let mut side = if total_degrees >= 0.0 { Vec3::X } else { Vec3::NEG_X };
        let camber = if total_degrees > 0.0 { -camber_degrees } else { camber_degrees };

        let start = if append {
            let start = self.last_position()?;
            if let Some(last_direction) = self.last_direction() {
                side = last_direction.cross(Vec3::Y);
                if total_degrees >= 0.0 {
                    side = -side;
                }
            }
            start
        } else {
            self.control_points_mut().clear();
            self.push_unique(Vec3::ZERO, camber);
            Vec3::ZERO
        };
        let side = side.normalize_or_zero();

        let step_degrees = total_degrees / steps as f32;
        let center = start + side * radius;
        let mut angle = 0.0_f32;
        for _ in 0..=steps {
            let rotation = Quat::from_axis_angle(Vec3::Y, angle.to_radians());
            self.push_unique(center + rotation * -side * radius, camber);
            angle += step_degrees;
        }

        debug!("Built arc of radius {radius}, sweep {total_degrees}° in {steps} steps");
        self.refresh();
        Ok(())
    }

    /// Add a clothoid (Euler spiral) transition of the given `length`.
    ///
    /// An entry clothoid starts straight and reaches `final_radius` at its
    /// end; an exit clothoid is the mirror image, ending straight. Camber
    /// ramps from 0 towards `final_camber_degrees`. Requires `steps >= 3`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_clothoid(
        &mut self,
        length: f32,
        left_curve: bool,
        is_entry: bool,
        final_radius: f32,
        final_camber_degrees: f32,
        steps: usize,
        append: bool,
    ) -> Result<(), SplineError> {
        require_steps(steps, 3)?;
        require_positive("length", length)?;
        require_positive("final_radius", final_radius)?;

        let mut start = if append {
            self.last_position()?
        } else {
            self.control_points_mut().clear();
            Vec3::ZERO
        };

        // Clothoid parameter: A² = R·L
        let a = (final_radius * length).sqrt();
        let camber = if left_curve { final_camber_degrees } else { -final_camber_degrees };

        let real_step = length / steps as f32;
        let step = real_step / a;
        let mut t = 0.0_f32;
        let mut points = Vec::with_capacity(steps + 1);
        for i in 0..steps {
            let mut x = a * integrate_clothoid(0.0, t as f64, CLOTHOID_INTEGRATION_INTERVALS, true) as f32;
            let mut z = a * integrate_clothoid(0.0, t as f64, CLOTHOID_INTEGRATION_INTERVALS, false) as f32;
            if left_curve {
                x = -x;
            }
            if !is_entry {
                z = -z;
            }

            let ramp = (i as f32 / (steps - 2) as f32).min(1.0);
            points.push(ControlPoint::new(Vec3::new(x, 0.0, z), camber * ramp));
            t += step;
        }

        // Lead with one straight step so the first (or, for exits, last)
        // segment is aligned with Z.
        let lead = Vec3::new(0.0, 0.0, if is_entry { real_step } else { -real_step });
        for cp in &mut points {
            cp.position += lead;
        }
        points.insert(0, ControlPoint::new(Vec3::ZERO, 0.0));

        // Exits are still in reverse order here, so their start direction
        // runs from the last point to the one before it.
        let previous_direction = append
            .then(|| self.last_direction())
            .flatten()
            .unwrap_or(Vec3::Z);
        let own_direction = if is_entry {
            Vec3::Z
        } else {
            let n = points.len();
            (points[n - 2].position - points[n - 1].position).normalize_or_zero()
        };

        let rotation_angle = angle_between(previous_direction, own_direction, Vec3::X);
        if rotation_angle != 0.0 {
            let rotation = Quat::from_axis_angle(Vec3::Y, rotation_angle);
            for cp in &mut points {
                cp.position = rotation * cp.position;
            }
        }

        if !is_entry {
            if let Some(last) = points.last() {
                start -= last.position;
            }
        }
        for cp in &mut points {
            cp.position += start;
        }

        let control_points = self.control_points_mut();
        // The first new point lands on the current last point
        if append {
            control_points.pop();
        }
        if is_entry {
            control_points.extend(points);
        } else {
            control_points.extend(points.into_iter().rev());
        }

        debug!(
            "Built {} {} clothoid of length {length} towards radius {final_radius}",
            if left_curve { "left" } else { "right" },
            if is_entry { "entry" } else { "exit" },
        );
        self.refresh();
        Ok(())
    }

    /// Add a banked curve: entry clothoid, constant-radius arc, exit clothoid.
    ///
    /// The arc sweeps whatever is left of `total_degrees` after subtracting
    /// twice the turn measured on the entry clothoid.
    #[allow(clippy::too_many_arguments)]
    pub fn build_full_curve(
        &mut self,
        clothoid_length: f32,
        total_degrees: f32,
        left_curve: bool,
        radius: f32,
        camber_degrees: f32,
        clothoid_steps: usize,
        arc_steps: usize,
        append: bool,
    ) -> Result<(), SplineError> {
        require_steps(clothoid_steps, 3)?;
        require_steps(arc_steps, 1)?;

        let heading_before = append
            .then(|| self.last_direction())
            .flatten()
            .unwrap_or(Vec3::Z);

        self.build_clothoid(clothoid_length, left_curve, true, radius, camber_degrees, clothoid_steps, append)?;

        let heading_after_entry = self.last_direction().unwrap_or(Vec3::Z);
        let clothoid_degrees = angle_between(heading_after_entry, heading_before, Vec3::X)
            .to_degrees()
            .abs();
        let mut arc_degrees = total_degrees.abs() - clothoid_degrees * 2.0;
        if left_curve {
            arc_degrees = -arc_degrees;
        }

        self.build_curve(radius, arc_degrees, camber_degrees, arc_steps, true)?;
        self.build_clothoid(clothoid_length, left_curve, false, radius, camber_degrees, clothoid_steps, true)?;

        info!(
            "Built full {} curve: {clothoid_degrees:.2}° per clothoid, {arc_degrees:.2}° arc, {} control points",
            if left_curve { "left" } else { "right" },
            self.control_points().len()
        );
        Ok(())
    }

    fn last_position(&self) -> Result<Vec3, SplineError> {
        self.control_points()
            .last()
            .map(|cp| cp.position)
            .ok_or(SplineError::NothingToAppend)
    }

    /// Normalized direction of the last control segment.
    fn last_direction(&self) -> Option<Vec3> {
        match self.control_points() {
            [.., previous, last] => Some((last.position - previous.position).normalize_or_zero()),
            _ => None,
        }
    }
}

/// Left Riemann sum of `sin(t²/2)` or `cos(t²/2)` over `[start, end]`.
///
/// These are the Fresnel-type integrals that trace a unit clothoid.
pub fn integrate_clothoid(start: f64, end: f64, intervals: u32, use_sin: bool) -> f64 {
    let increment = (end - start) / intervals as f64;
    (0..intervals)
        .map(|n| {
            let t = start + (end - start) * n as f64 / intervals as f64;
            let value = if use_sin { (t * t * 0.5).sin() } else { (t * t * 0.5).cos() };
            // Integrand evaluated at single precision
            value as f32 as f64 * increment
        })
        .sum()
}

fn require_steps(steps: usize, min: usize) -> Result<(), SplineError> {
    if steps < min {
        return Err(SplineError::InvalidBuilderInput {
            name: "steps",
            value: steps as f32,
        });
    }
    Ok(())
}

fn require_positive(name: &'static str, value: f32) -> Result<(), SplineError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SplineError::InvalidBuilderInput { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::{Interpolation, SplineType};

    const EPS: f32 = 1e-3;

    // Open Catmull-Rom wraps its end windows, so straight inputs would not stay straight
    fn empty() -> Spline {
        Spline::new(SplineType::Hermite, Vec::new()).with_interpolation(Interpolation::FixedSteps(4))
    }

    fn positions(spline: &Spline) -> Vec<Vec3> {
        spline.control_points().iter().map(|cp| cp.position).collect()
    }

    fn heading_degrees(direction: Vec3) -> f32 {
        direction.x.atan2(direction.z).to_degrees()
    }

    #[test]
    fn test_build_straight() {
        let mut spline = empty();
        spline.build_straight(Vec3::new(2.0, 0.0, 0.0), 10.0, 5, false).unwrap();
        let points = positions(&spline);
        assert_eq!(points.len(), 6);
        assert!((points[5] - Vec3::new(10.0, 0.0, 0.0)).length() < EPS);
        assert!(!spline.is_dirty());
        assert!((spline.total_length() - 10.0).abs() < EPS);
    }

    #[test]
    fn test_append_straight_follows_last_segment() {
        let mut spline = empty();
        spline.build_straight(Vec3::X, 4.0, 2, false).unwrap();
        spline.build_straight(Vec3::Z, 4.0, 2, true).unwrap();
        let points = positions(&spline);
        assert_eq!(points.len(), 5);
        assert!((points[4] - Vec3::new(8.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_build_curve_quarter_circle() {
        let mut spline = empty();
        spline.build_curve(10.0, 90.0, 0.0, 4, false).unwrap();
        let points = positions(&spline);
        assert_eq!(points.len(), 5);

        let chord = points[0].distance(points[1]);
        for pair in points.windows(2) {
            assert!((pair[0].distance(pair[1]) - chord).abs() < EPS);
        }

        let center = Vec3::new(10.0, 0.0, 0.0);
        let first_radius = (points[0] - center).normalize();
        let last_radius = (points[4] - center).normalize();
        let angle = angle_between(first_radius, last_radius, Vec3::X).to_degrees().abs();
        assert!((angle - 90.0).abs() < 0.01);
        assert!((points[4] - Vec3::new(10.0, 0.0, 10.0)).length() < EPS);
    }

    #[test]
    fn test_build_curve_camber_leans_into_turn() {
        let mut right = empty();
        right.build_curve(10.0, 45.0, 6.0, 3, false).unwrap();
        assert!(right.control_points().iter().all(|cp| cp.camber == -6.0));

        let mut left = empty();
        left.build_curve(10.0, -45.0, 6.0, 3, false).unwrap();
        assert!(left.control_points().iter().all(|cp| cp.camber == 6.0));
        assert!(positions(&left)[3].x < 0.0);
    }

    #[test]
    fn test_entry_clothoid_starts_straight() {
        let mut spline = empty();
        spline.build_clothoid(20.0, false, true, 50.0, 5.0, 10, false).unwrap();
        let points = positions(&spline);
        assert_eq!(points.len(), 11);
        assert_eq!(points[0], Vec3::ZERO);
        assert!((points[1] - Vec3::new(0.0, 0.0, 2.0)).length() < EPS);

        // Turning right and tightening
        let heading = heading_degrees(points[10] - points[9]);
        assert!(heading > 5.0 && heading < 12.0, "heading {heading}");

        let cambers: Vec<f32> = spline.control_points().iter().map(|cp| cp.camber).collect();
        assert_eq!(cambers[0], 0.0);
        assert!((cambers[10] + 5.0).abs() < EPS);
        assert!(cambers.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_appended_clothoid_aligns_with_previous_segment() {
        let mut spline = empty();
        spline.build_straight(Vec3::X, 10.0, 5, false).unwrap();
        spline.build_clothoid(20.0, false, true, 50.0, 5.0, 10, true).unwrap();
        let points = positions(&spline);
        // The shared point is not duplicated
        assert_eq!(points.len(), 16);
        assert!((points[5] - Vec3::new(10.0, 0.0, 0.0)).length() < EPS);
        assert!((points[6] - Vec3::new(12.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_full_curve_turns_and_mirrors() {
        let mut right = empty();
        right.build_full_curve(20.0, 90.0, false, 50.0, 5.0, 10, 8, false).unwrap();
        let mut left = empty();
        left.build_full_curve(20.0, 90.0, true, 50.0, 5.0, 10, 8, false).unwrap();

        let r = positions(&right);
        let l = positions(&left);
        assert_eq!(r.len(), 29);
        assert_eq!(l.len(), r.len());
        for (a, b) in r.iter().zip(&l) {
            assert!((a.x + b.x).abs() < EPS && (a.z - b.z).abs() < EPS);
        }

        let n = r.len();
        let heading = heading_degrees(r[n - 1] - r[n - 2]);
        assert!((heading - 90.0).abs() < 6.0, "heading {heading}");

        // Banked into the turn, level at both ends
        let cambers: Vec<f32> = right.control_points().iter().map(|cp| cp.camber).collect();
        assert_eq!(cambers[0], 0.0);
        assert!(cambers[n - 1].abs() < EPS);
        assert!(cambers.iter().any(|c| (c + 5.0).abs() < EPS));
        assert!(!right.is_dirty());
    }

    #[test]
    fn test_builder_preconditions() {
        let mut spline = empty();
        assert_eq!(
            spline.build_straight(Vec3::X, 5.0, 2, true),
            Err(SplineError::NothingToAppend)
        );
        assert!(matches!(
            spline.build_curve(-1.0, 90.0, 0.0, 4, false),
            Err(SplineError::InvalidBuilderInput { name: "radius", .. })
        ));
        assert!(matches!(
            spline.build_clothoid(10.0, true, true, 20.0, 0.0, 2, false),
            Err(SplineError::InvalidBuilderInput { name: "steps", .. })
        ));
        assert!(matches!(
            spline.build_straight(Vec3::ZERO, 5.0, 2, false),
            Err(SplineError::InvalidBuilderInput { name: "direction", .. })
        ));
    }

    #[test]
    fn test_integrate_clothoid_small_angles() {
        // For small t, ∫cos(u²/2) ≈ t and ∫sin(u²/2) ≈ t³/6
        let t = 0.2;
        let c = integrate_clothoid(0.0, t, 200, false);
        let s = integrate_clothoid(0.0, t, 200, true);
        assert!((c - t).abs() < 1e-3);
        assert!((s - t.powi(3) / 6.0).abs() < 1e-4);
        assert_eq!(integrate_clothoid(0.0, 0.0, 20, true), 0.0);
    }
}
