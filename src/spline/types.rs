use bevy::prelude::*;

/// The curve family used to interpolate between control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Default)]
pub enum SplineType {
    /// Straight lines between control points.
    Linear,
    /// Cubic Hermite with tangents from neighbouring points.
    Hermite,
    /// Cubic Bézier using each point's in/out handles.
    #[default]
    Bezier,
    /// Catmull-Rom through every control point.
    CatmullRom,
}

impl SplineType {
    /// Cycle to the next spline type.
    pub fn next(self) -> Self {
        match self {
            Self::Linear => Self::Hermite,
            Self::Hermite => Self::Bezier,
            Self::Bezier => Self::CatmullRom,
            Self::CatmullRom => Self::Linear,
        }
    }

    /// Get the display name for this spline type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Hermite => "Hermite",
            Self::Bezier => "Bézier",
            Self::CatmullRom => "Catmull-Rom",
        }
    }
}

/// How densely each control segment is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Default)]
pub enum Interpolation {
    /// The same number of samples for every segment.
    ///
    /// Fewer than 2 steps disables curve evaluation and connects the
    /// control points with straight lines.
    FixedSteps(usize),
    /// Roughly one sample every `distance` world units, based on the
    /// segment's chord length.
    FixedDistance(f32),
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::FixedDistance(0.1)
    }
}

impl Interpolation {
    /// Number of steps and parameter increment for a segment with the given chord.
    pub fn step_parameters(&self, chord_length: f32) -> (usize, f32) {
        match *self {
            Self::FixedSteps(steps) => {
                let t_step = if steps > 0 { 1.0 / steps as f32 } else { 1.0 };
                (steps, t_step)
            }
            Self::FixedDistance(distance) => {
                let steps = if distance > 0.0 {
                    ((chord_length / distance) as usize).max(1)
                } else {
                    1
                };
                let t_step = if chord_length > 0.0 {
                    distance / chord_length
                } else {
                    1.0
                };
                (steps, t_step)
            }
        }
    }

    /// True when sampling degrades to plain control-point polylines.
    pub fn is_polyline(&self) -> bool {
        matches!(self, Self::FixedSteps(steps) if *steps < 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_steps_parameters() {
        assert_eq!(Interpolation::FixedSteps(4).step_parameters(100.0), (4, 0.25));
        assert!(Interpolation::FixedSteps(1).is_polyline());
        assert!(!Interpolation::FixedSteps(2).is_polyline());
    }

    #[test]
    fn test_fixed_distance_parameters() {
        let (steps, t_step) = Interpolation::FixedDistance(0.5).step_parameters(2.25);
        assert_eq!(steps, 4);
        assert!((t_step - 0.5 / 2.25).abs() < 1e-6);

        // Shorter than one step still yields a single sample
        assert_eq!(Interpolation::FixedDistance(1.0).step_parameters(0.2).0, 1);
        assert_eq!(Interpolation::FixedDistance(1.0).step_parameters(0.0), (1, 1.0));
    }

    #[test]
    fn test_cycle_covers_all_types() {
        let mut ty = SplineType::Linear;
        for _ in 0..4 {
            ty = ty.next();
        }
        assert_eq!(ty, SplineType::Linear);
    }
}
