use bevy::prelude::*;

use crate::geometry::closest_point_on_segment;

use super::evaluator::sample_control_points;
use super::{ControlPoint, HandleMode, Interpolation, SampledPoint, SplineType};

/// Squared distance under which neighbouring control points count as duplicates.
pub const DUPLICATE_POINT_EPSILON_SQ: f32 = 1e-4;

/// Squared distance under which builders skip a point repeating the last one.
pub(crate) const BUILDER_POINT_EPSILON_SQ: f32 = 1e-3;

/// Default length of handles created by [`Spline::reset_handles`].
pub const DEFAULT_HANDLE_DISTANCE: f32 = 4.0;

/// A 3D spline component that can be attached to entities.
///
/// The control points are authoritative; the sampled points are a cache that
/// is rebuilt wholesale by [`Spline::refresh`]. Every mutation marks the
/// spline dirty, and queries on a dirty spline return
/// [`SplineError::Stale`](super::SplineError::Stale).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component, Default)]
pub struct Spline {
    spline_type: SplineType,
    closed: bool,
    interpolation: Interpolation,
    control_points: Vec<ControlPoint>,
    samples: Vec<SampledPoint>,
    total_length: f32,
    #[reflect(ignore)]
    dirty: bool,
    /// Handle length used when handles are rebuilt from neighbouring points.
    pub initial_handle_distance: f32,
}

impl Default for Spline {
    fn default() -> Self {
        Self {
            spline_type: SplineType::default(),
            closed: false,
            interpolation: Interpolation::default(),
            control_points: Vec::new(),
            samples: Vec::new(),
            total_length: 0.0,
            dirty: true,
            initial_handle_distance: DEFAULT_HANDLE_DISTANCE,
        }
    }
}

impl Spline {
    /// Create a new open spline with the given type and control points.
    pub fn new(spline_type: SplineType, control_points: Vec<ControlPoint>) -> Self {
        Self {
            spline_type,
            control_points,
            ..default()
        }
    }

    /// Create a new closed spline.
    pub fn closed(spline_type: SplineType, control_points: Vec<ControlPoint>) -> Self {
        Self {
            closed: true,
            ..Self::new(spline_type, control_points)
        }
    }

    /// Create an open spline from bare positions (zero camber, no handles).
    pub fn from_positions(spline_type: SplineType, positions: impl IntoIterator<Item = Vec3>) -> Self {
        let points = positions
            .into_iter()
            .map(|p| ControlPoint::new(p, 0.0))
            .collect();
        Self::new(spline_type, points)
    }

    /// Set the interpolation policy.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.set_interpolation(interpolation);
        self
    }

    /// Set the handle length used by [`Spline::reset_handles`].
    pub fn with_initial_handle_distance(mut self, distance: f32) -> Self {
        self.initial_handle_distance = distance;
        self
    }

    pub fn spline_type(&self) -> SplineType {
        self.spline_type
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// The authoritative control points.
    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    /// Mutable access to the control points. Marks the spline dirty.
    pub fn control_points_mut(&mut self) -> &mut Vec<ControlPoint> {
        self.dirty = true;
        &mut self.control_points
    }

    /// Samples from the last refresh, possibly stale (see [`Spline::is_dirty`]).
    pub fn samples(&self) -> &[SampledPoint] {
        &self.samples
    }

    /// Arc length of the sampled curve from the last refresh.
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    /// True when the samples no longer reflect the control points.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force the next [`Spline::refresh`] check to treat the samples as stale.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn set_spline_type(&mut self, spline_type: SplineType) {
        self.spline_type = spline_type;
        self.dirty = true;
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
        self.dirty = true;
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
        self.dirty = true;
    }

    /// Toggle between closed and open spline.
    pub fn toggle_closed(&mut self) {
        self.set_closed(!self.closed);
    }

    /// Cycle to the next spline type.
    pub fn cycle_type(&mut self) {
        self.set_spline_type(self.spline_type.next());
    }

    /// Rebuild the sampled points and total length from the control points.
    pub fn refresh(&mut self) {
        let (samples, total_length) = sample_control_points(
            &self.control_points,
            self.spline_type,
            self.interpolation,
            self.closed,
        );
        debug!(
            "Refreshed {} spline: {} control points -> {} samples, length {:.3}",
            self.spline_type.name(),
            self.control_points.len(),
            samples.len(),
            total_length
        );
        self.samples = samples;
        self.total_length = total_length;
        self.dirty = false;
    }

    /// Add a control point at the end of the spline.
    pub fn add_point(&mut self, point: ControlPoint) {
        self.control_points_mut().push(point);
    }

    /// Add a point at the end and rebuild handles of it and its predecessor.
    pub fn append_point(&mut self, position: Vec3) {
        self.add_point(ControlPoint::new(position, 0.0));
        let count = self.control_points.len();
        if count >= 2 {
            self.reset_handles(count - 2);
        }
        self.reset_handles(count - 1);
    }

    /// Insert a control point at the given index.
    pub fn insert_point(&mut self, index: usize, point: ControlPoint) {
        if index <= self.control_points.len() {
            self.control_points_mut().insert(index, point);
        }
    }

    /// Remove the control point at the given index.
    pub fn remove_point(&mut self, index: usize) -> Option<ControlPoint> {
        if index < self.control_points.len() {
            Some(self.control_points_mut().remove(index))
        } else {
            None
        }
    }

    /// Push a point unless it repeats the current last point.
    pub(crate) fn push_unique(&mut self, position: Vec3, camber: f32) {
        if let Some(last) = self.control_points.last() {
            if (position - last.position).length_squared() < BUILDER_POINT_EPSILON_SQ {
                return;
            }
        }
        self.control_points_mut().push(ControlPoint::new(position, camber));
    }

    /// Remove points lying on top of their successor. Returns how many were removed.
    pub fn remove_duplicate_points(&mut self) -> usize {
        let points = &self.control_points;
        let keep: Vec<bool> = (0..points.len())
            .map(|i| {
                i + 1 >= points.len()
                    || (points[i].position - points[i + 1].position).length_squared()
                        >= DUPLICATE_POINT_EPSILON_SQ
            })
            .collect();

        let removed = keep.iter().filter(|k| !**k).count();
        if removed > 0 {
            let mut keep = keep.into_iter();
            self.control_points_mut().retain(|_| keep.next().unwrap_or(true));
        }
        removed
    }

    /// Rebuild the handles of point `index` from its neighbours.
    ///
    /// The last point gets an incoming handle towards its predecessor, the
    /// first an outgoing handle towards its successor, and interior points an
    /// outgoing handle along the averaged direction. The opposite handle then
    /// follows the point's [`HandleMode`].
    pub fn reset_handles(&mut self, index: usize) {
        let count = self.control_points.len();
        if count < 2 || index >= count {
            return;
        }
        let distance = self.initial_handle_distance;
        let points = self.control_points_mut();

        if index == count - 1 {
            let dir = (points[index - 1].position - points[index].position).normalize_or_zero();
            let cp = &mut points[index];
            cp.handle_in = dir * distance;
            if cp.handle_mode != HandleMode::Free {
                cp.handle_in_changed();
            }
        } else if index == 0 {
            let dir = (points[1].position - points[0].position).normalize_or_zero();
            let cp = &mut points[0];
            cp.handle_out = dir * distance;
            if cp.handle_mode != HandleMode::Free {
                cp.handle_out_changed();
            }
        } else {
            let dir_next = (points[index + 1].position - points[index].position).normalize_or_zero();
            let dir_prev = (points[index].position - points[index - 1].position).normalize_or_zero();
            let cp = &mut points[index];
            cp.handle_out = (dir_next + dir_prev).normalize_or_zero() * distance;
            if cp.handle_mode != HandleMode::Free {
                cp.handle_out_changed();
            }
        }
    }

    /// Double the control-point density by inserting a midpoint in every segment.
    ///
    /// Midpoints start level and mirrored; only the handles of the segment's
    /// start point are carried over before being rebuilt.
    pub fn tessellate(&mut self) {
        let midpoints: Vec<ControlPoint> = self
            .control_points
            .windows(2)
            .map(|pair| ControlPoint {
                handle_in: pair[0].handle_in,
                handle_out: pair[0].handle_out,
                ..ControlPoint::new((pair[0].position + pair[1].position) * 0.5, 0.0)
            })
            .collect();

        let mut index = 1;
        for midpoint in midpoints {
            self.insert_point(index, midpoint);
            self.reset_handles(index);
            index += 2;
        }
    }

    /// Reverse the direction of the spline, keeping the curve shape.
    pub fn reverse(&mut self) {
        let count = self.control_points.len();
        if count < 2 {
            return;
        }
        let points = self.control_points_mut();
        let first_out = points[0].handle_out;
        let last_in = points[count - 1].handle_in;
        points.reverse();

        points[0].handle_in = Vec3::ZERO;
        points[0].handle_out = last_in;
        points[count - 1].handle_in = first_out;
        points[count - 1].handle_out = Vec3::ZERO;

        for cp in &mut points[1..count - 1] {
            cp.swap_handles();
        }
    }

    /// Insert a control point on the control polygon segment closest to `position`.
    ///
    /// Only segments whose interior is closest count. Returns the index of
    /// the new point.
    pub fn insert_point_near(&mut self, position: Vec3) -> Option<usize> {
        let (segment, hit) = self
            .control_points
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| {
                let (hit, inside) = closest_point_on_segment(pair[0].position, pair[1].position, position);
                inside.then_some((i, hit))
            })
            .min_by(|a, b| {
                a.1.distance_squared(position)
                    .total_cmp(&b.1.distance_squared(position))
            })?;

        let index = segment + 1;
        self.insert_point(index, ControlPoint::new(hit, 0.0));
        if index == self.control_points.len() - 2 {
            self.reset_handles(self.control_points.len() - 1);
        }
        self.reset_handles(index);
        Some(index)
    }

    /// Append `other`'s control points, mapped from its local space into ours.
    pub fn attach(&mut self, other: &Spline, self_transform: &Transform, other_transform: &Transform) {
        let to_local = self_transform.compute_affine().inverse();
        let map = |p: Vec3| to_local.transform_point3(other_transform.transform_point(p));

        let attached: Vec<ControlPoint> = other
            .control_points
            .iter()
            .map(|cp| {
                let position = map(cp.position);
                ControlPoint {
                    position,
                    handle_in: map(cp.position + cp.handle_in) - position,
                    handle_out: map(cp.position + cp.handle_out) - position,
                    ..*cp
                }
            })
            .collect();

        self.control_points_mut().extend(attached);
        self.remove_duplicate_points();
    }

    /// Move the points at `indices` into a new spline with the same settings.
    ///
    /// The first detached point is duplicated onto the end of this spline so
    /// both pieces stay connected.
    pub fn detach(&mut self, indices: &[usize]) -> Spline {
        let mut detached = Spline {
            control_points: Vec::new(),
            samples: Vec::new(),
            total_length: 0.0,
            dirty: true,
            ..self.clone()
        };

        let mut kept = Vec::with_capacity(self.control_points.len());
        for (i, cp) in self.control_points.drain(..).enumerate() {
            if indices.contains(&i) {
                detached.control_points.push(cp);
            } else {
                kept.push(cp);
            }
        }
        self.control_points = kept;
        self.dirty = true;

        if let Some(first) = detached.control_points.first().copied() {
            self.control_points.push(first);
        }

        for spline in [&mut *self, &mut detached] {
            let last = spline.control_points.len().saturating_sub(1);
            spline.reset_handles(0);
            spline.reset_handles(last);
        }
        detached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(count: usize) -> Spline {
        Spline::from_positions(
            SplineType::Linear,
            (0..count).map(|i| Vec3::new(i as f32 * 2.0, 0.0, 0.0)),
        )
    }

    #[test]
    fn test_new_spline_is_dirty_until_refreshed() {
        let mut spline = line(3);
        assert!(spline.is_dirty());
        spline.refresh();
        assert!(!spline.is_dirty());
        assert_eq!(spline.samples().len(), 3);

        spline.control_points_mut()[1].position.y = 1.0;
        assert!(spline.is_dirty());
        spline.refresh();
        spline.set_closed(true);
        assert!(spline.is_dirty());
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut spline = Spline::from_positions(
            SplineType::CatmullRom,
            [Vec3::ZERO, Vec3::new(3.0, 1.0, 0.0), Vec3::new(6.0, 0.0, 2.0)],
        );
        spline.refresh();
        let first = (spline.samples().to_vec(), spline.total_length());
        spline.refresh();
        assert_eq!(first, (spline.samples().to_vec(), spline.total_length()));
    }

    #[test]
    fn test_single_point_has_no_length() {
        let mut spline = line(1);
        spline.refresh();
        assert!(spline.samples().is_empty());
        assert_eq!(spline.total_length(), 0.0);
    }

    #[test]
    fn test_remove_duplicate_points() {
        let mut spline = Spline::from_positions(
            SplineType::Linear,
            [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.005, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
        );
        assert_eq!(spline.remove_duplicate_points(), 1);
        assert_eq!(spline.control_points().len(), 3);
        assert_eq!(spline.control_points()[1].position, Vec3::new(1.005, 0.0, 0.0));

        assert_eq!(spline.remove_duplicate_points(), 0);
    }

    #[test]
    fn test_push_unique_skips_repeats() {
        let mut spline = line(1);
        spline.push_unique(Vec3::new(0.01, 0.0, 0.0), 0.0);
        assert_eq!(spline.control_points().len(), 1);
        spline.push_unique(Vec3::new(1.0, 0.0, 0.0), 0.0);
        assert_eq!(spline.control_points().len(), 2);
    }

    #[test]
    fn test_reset_handles() {
        let mut spline = Spline::from_positions(
            SplineType::Bezier,
            [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 10.0)],
        )
        .with_initial_handle_distance(2.0);

        for i in 0..3 {
            spline.reset_handles(i);
        }
        let cps = spline.control_points();
        assert!((cps[0].handle_out - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((cps[0].handle_in + cps[0].handle_out).length() < 1e-5);
        let diagonal = Vec3::new(1.0, 0.0, 1.0).normalize() * 2.0;
        assert!((cps[1].handle_out - diagonal).length() < 1e-5);
        assert!((cps[2].handle_in - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_tessellate_doubles_segments() {
        let mut spline = line(3);
        spline.tessellate();
        let xs: Vec<f32> = spline.control_points().iter().map(|cp| cp.position.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_tessellate_midpoints_start_level_and_mirrored() {
        let mut spline = line(2);
        for cp in spline.control_points_mut() {
            cp.camber = 8.0;
            cp.handle_mode = HandleMode::Free;
        }
        spline.tessellate();

        let mid = spline.control_points()[1];
        assert_eq!(mid.camber, 0.0);
        assert_eq!(mid.handle_mode, HandleMode::Mirrored);
        assert!((mid.handle_out - Vec3::new(DEFAULT_HANDLE_DISTANCE, 0.0, 0.0)).length() < 1e-5);
        assert!((mid.handle_in + mid.handle_out).length() < 1e-5);
        assert_eq!(spline.control_points()[0].camber, 8.0);
    }

    #[test]
    fn test_append_point_rebuilds_neighbouring_handles() {
        let mut spline = line(2);
        spline.append_point(Vec3::new(2.0, 0.0, 2.0));

        let cps = spline.control_points();
        assert_eq!(cps.len(), 3);
        let diagonal = Vec3::new(1.0, 0.0, 1.0).normalize() * DEFAULT_HANDLE_DISTANCE;
        assert!((cps[1].handle_out - diagonal).length() < 1e-5);
        assert!((cps[2].handle_in - Vec3::new(0.0, 0.0, -DEFAULT_HANDLE_DISTANCE)).length() < 1e-5);
        assert!((cps[2].handle_out - Vec3::new(0.0, 0.0, DEFAULT_HANDLE_DISTANCE)).length() < 1e-5);
        assert!(spline.is_dirty());
    }

    #[test]
    fn test_reverse_swaps_handles() {
        let mut spline = line(3);
        {
            let cps = spline.control_points_mut();
            cps[0].handle_out = Vec3::Y;
            cps[1].handle_in = Vec3::NEG_X;
            cps[1].handle_out = Vec3::X;
            cps[2].handle_in = Vec3::Z;
        }
        spline.reverse();
        let cps = spline.control_points();
        assert_eq!(cps[0].position, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(cps[0].handle_out, Vec3::Z);
        assert_eq!(cps[0].handle_in, Vec3::ZERO);
        assert_eq!(cps[1].handle_in, Vec3::X);
        assert_eq!(cps[1].handle_out, Vec3::NEG_X);
        assert_eq!(cps[2].handle_in, Vec3::Y);
    }

    #[test]
    fn test_insert_point_near() {
        let mut spline = line(3);
        let index = spline.insert_point_near(Vec3::new(3.0, 1.0, 0.0));
        assert_eq!(index, Some(2));
        assert_eq!(spline.control_points().len(), 4);
        assert!((spline.control_points()[2].position - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);

        // Beyond both ends of the polygon nothing is inserted
        assert_eq!(line(2).insert_point_near(Vec3::new(-5.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_attach_maps_into_local_space() {
        let mut a = line(2);
        let b = Spline::from_positions(SplineType::Linear, [Vec3::ZERO, Vec3::X]);
        let a_transform = Transform::from_xyz(10.0, 0.0, 0.0);
        let b_transform = Transform::from_xyz(12.0, 0.0, 0.0);

        a.attach(&b, &a_transform, &b_transform);
        let xs: Vec<f32> = a.control_points().iter().map(|cp| cp.position.x).collect();
        // b's first point lands on a's last point and is pruned as a duplicate
        assert_eq!(xs, vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_detach_keeps_pieces_connected() {
        let mut spline = line(5);
        let detached = spline.detach(&[3, 4]);
        assert_eq!(spline.control_points().len(), 4);
        assert_eq!(detached.control_points().len(), 2);
        assert_eq!(spline.control_points()[3].position, detached.control_points()[0].position);
        assert_eq!(detached.spline_type(), SplineType::Linear);
    }
}
