//! Axis-aligned bounding boxes
//!
//! Boxes are stored as center + half size. Sweeps reduce box-vs-box motion to
//! a ray against the Minkowski sum of both boxes, so everything here works on
//! a single point moving through a single box.

use glam::Vec2;

use crate::components::body::HitBody;
use crate::consts::NO_HIT_TIME;
use crate::render::{Color, RenderOp};
use crate::sign;

/// Result of a sweep or ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Whether anything was hit
    pub is_hit: bool,
    /// Entry time normalized to the displacement (1.0 = fully traversed)
    pub time: f32,
    /// Ray position at the moment of contact
    pub pos: Vec2,
    /// Axis-aligned contact normal, components in {-1, 0, 1}
    pub normal: Vec2,
    /// Body that was struck, filled in by the physics engine
    pub hit_body: Option<HitBody>,
}

impl Hit {
    pub fn miss() -> Self {
        Self {
            is_hit: false,
            time: 0.0,
            pos: Vec2::ZERO,
            normal: Vec2::ZERO,
            hit_body: None,
        }
    }

    /// Empty sweep accumulator whose time loses against any real hit
    pub(crate) fn unresolved() -> Self {
        Self {
            time: NO_HIT_TIME,
            ..Self::miss()
        }
    }
}

/// Axis-aligned box, center + half size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub pos: Vec2,
    /// Non-negative on both axes
    pub half_size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, half_size: Vec2) -> Self {
        debug_assert!(
            half_size.x >= 0.0 && half_size.y >= 0.0,
            "AABB half size must be non-negative: {half_size}"
        );
        Self { pos, half_size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos - self.half_size
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.half_size
    }

    #[inline]
    pub fn min_max(&self) -> (Vec2, Vec2) {
        (self.min(), self.max())
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half_size * 2.0
    }

    /// Same center, half size grown by `extra` (Minkowski sum with a box of that half size)
    #[inline]
    pub fn inflated(&self, extra: Vec2) -> Self {
        Self {
            pos: self.pos,
            half_size: self.half_size + extra,
        }
    }

    /// Slab test of the segment `position .. position + magnitude` against this box.
    ///
    /// A hit needs `exit > entry`, `exit > 0` and `-1 < entry < 1`. The
    /// normal lies on the axis with less room left between the contact point
    /// and the box edge, signed by which side of the center it is on.
    pub fn ray_intersect(&self, position: Vec2, magnitude: Vec2) -> Hit {
        let mut hit = Hit::miss();
        let (min, max) = self.min_max();

        let mut last_entry = f32::NEG_INFINITY;
        let mut first_exit = f32::INFINITY;

        for i in 0..2 {
            if magnitude[i] != 0.0 {
                let t1 = (min[i] - position[i]) / magnitude[i];
                let t2 = (max[i] - position[i]) / magnitude[i];

                last_entry = last_entry.max(t1.min(t2));
                first_exit = first_exit.min(t1.max(t2));
            } else if position[i] <= min[i] || position[i] >= max[i] {
                return hit;
            }
        }

        if first_exit > last_entry && first_exit > 0.0 && last_entry < 1.0 && last_entry > -1.0 {
            hit.pos = position + magnitude * last_entry;
            hit.is_hit = true;
            hit.time = last_entry;

            let d = hit.pos - self.pos;
            let room = self.half_size - d.abs();

            if room.x < room.y {
                hit.normal.x = sign(d.x);
            } else {
                hit.normal.y = sign(d.y);
            }
        }

        hit
    }

    /// Inclusive point containment
    pub fn point_intersect(&self, point: Vec2) -> bool {
        let (min, max) = self.min_max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    pub fn minkowski_difference(a: &Aabb, b: &Aabb) -> Aabb {
        Aabb {
            pos: a.pos - b.pos,
            half_size: a.half_size + b.half_size,
        }
    }

    /// True when the origin lies inside this box on both axes (edges included)
    #[inline]
    pub fn contains_origin(&self) -> bool {
        let (min, max) = self.min_max();
        min.x <= 0.0 && max.x >= 0.0 && min.y <= 0.0 && max.y >= 0.0
    }

    /// Overlap test, touching edges count
    pub fn check_intersection(a: &Aabb, b: &Aabb) -> bool {
        Self::minkowski_difference(a, b).contains_origin()
    }

    /// Smallest axis-aligned vector that moves the origin onto this
    /// (Minkowski difference) box's boundary.
    ///
    /// Candidates are checked in the order -x, +x, -y, +y; a later one only
    /// wins when strictly closer.
    pub fn penetration(&self) -> Vec2 {
        let (min, max) = self.min_max();

        let mut min_distance = min.x.abs();
        let mut result = Vec2::new(min.x, 0.0);

        if max.x.abs() < min_distance {
            min_distance = max.x.abs();
            result.x = max.x;
        }

        if min.y.abs() < min_distance {
            min_distance = min.y.abs();
            result.x = 0.0;
            result.y = min.y;
        }

        if max.y.abs() < min_distance {
            result.x = 0.0;
            result.y = max.y;
        }

        result
    }

    /// Filled-rect render op covering this box
    pub fn fill_op(&self, color: Color, order: i32) -> RenderOp {
        RenderOp::rect_fill(self.min(), self.size(), color, order)
    }

    /// Outline render op; the far corner is pulled in by one pixel
    pub fn outline_op(&self, color: Color, order: i32) -> RenderOp {
        let (min, max) = self.min_max();
        RenderOp::rect_outline(min, max - 1.0, color, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x: f32, y: f32, hx: f32, hy: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(hx, hy))
    }

    #[test]
    fn test_min_max() {
        let b = boxed(10.0, -4.0, 2.0, 3.0);
        assert_eq!(b.min(), Vec2::new(8.0, -7.0));
        assert_eq!(b.max(), Vec2::new(12.0, -1.0));
        assert_eq!(b.size(), Vec2::new(4.0, 6.0));
    }

    #[test]
    fn test_ray_hits_left_face() {
        // Box spans x in [8, 12]; ray from 0 covering 16 units
        let b = boxed(10.0, 0.0, 2.0, 2.0);
        let hit = b.ray_intersect(Vec2::ZERO, Vec2::new(16.0, 0.0));

        assert!(hit.is_hit);
        assert!((hit.time - 0.5).abs() < 1e-6);
        assert_eq!(hit.normal, Vec2::new(-1.0, 0.0));
        assert!((hit.pos.x - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_hits_bottom_face_moving_up() {
        let b = boxed(0.0, -10.0, 2.0, 2.0);
        let hit = b.ray_intersect(Vec2::ZERO, Vec2::new(0.0, -20.0));
        assert!(hit.is_hit);
        assert_eq!(hit.normal, Vec2::new(0.0, 1.0));
        assert!((hit.time - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_ray_too_short_misses() {
        let b = boxed(10.0, 0.0, 2.0, 2.0);
        let hit = b.ray_intersect(Vec2::ZERO, Vec2::new(4.0, 0.0));
        assert!(!hit.is_hit);
    }

    #[test]
    fn test_ray_moving_away_misses() {
        let b = boxed(10.0, 0.0, 2.0, 2.0);
        let hit = b.ray_intersect(Vec2::ZERO, Vec2::new(-16.0, 0.0));
        assert!(!hit.is_hit);
    }

    #[test]
    fn test_zero_axis_outside_slab_rejects() {
        // Moving along x, but y is outside the box slab
        let b = boxed(10.0, 0.0, 2.0, 2.0);
        let hit = b.ray_intersect(Vec2::new(0.0, 5.0), Vec2::new(16.0, 0.0));
        assert!(!hit.is_hit);

        // Exactly on the slab edge is also outside
        let hit = b.ray_intersect(Vec2::new(0.0, 2.0), Vec2::new(16.0, 0.0));
        assert!(!hit.is_hit);
    }

    #[test]
    fn test_zero_displacement_never_hits() {
        let b = boxed(0.0, 0.0, 2.0, 2.0);
        assert!(!b.ray_intersect(Vec2::new(5.0, 0.0), Vec2::ZERO).is_hit);
    }

    #[test]
    fn test_ray_starting_inside_reports_negative_entry() {
        // Already one unit inside the left face
        let b = boxed(10.0, 0.0, 2.0, 2.0);
        let hit = b.ray_intersect(Vec2::new(9.0, 0.0), Vec2::new(2.0, 0.0));
        assert!(hit.is_hit);
        assert!((hit.time + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_point_intersect_inclusive() {
        let b = boxed(0.0, 0.0, 1.0, 1.0);
        assert!(b.point_intersect(Vec2::new(1.0, 1.0)));
        assert!(b.point_intersect(Vec2::ZERO));
        assert!(!b.point_intersect(Vec2::new(1.01, 0.0)));
    }

    #[test]
    fn test_check_intersection() {
        let a = boxed(0.0, 0.0, 1.0, 1.0);
        let touching = boxed(2.0, 0.0, 1.0, 1.0);
        let apart = boxed(2.5, 0.0, 1.0, 1.0);
        assert!(Aabb::check_intersection(&a, &touching));
        assert!(Aabb::check_intersection(&touching, &a));
        assert!(!Aabb::check_intersection(&a, &apart));
        assert!(!Aabb::check_intersection(&apart, &a));
    }

    #[test]
    fn test_penetration_picks_smallest_axis() {
        // min = (-1, -2), max = (3, 2): -x is closest
        assert_eq!(boxed(1.0, 0.0, 2.0, 2.0).penetration(), Vec2::new(-1.0, 0.0));
        // min = (-3, -2), max = (1, 2): +x
        assert_eq!(boxed(-1.0, 0.0, 2.0, 2.0).penetration(), Vec2::new(1.0, 0.0));
        // min = (-2, -0.5), max = (2, 3.5): -y
        assert_eq!(boxed(0.0, 1.5, 2.0, 2.0).penetration(), Vec2::new(0.0, -0.5));
        // min = (-2, -3.5), max = (2, 0.5): +y
        assert_eq!(boxed(0.0, -1.5, 2.0, 2.0).penetration(), Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_penetration_tie_keeps_earlier_candidate() {
        // Centered box: all four distances equal, -x stays
        assert_eq!(boxed(0.0, 0.0, 2.0, 2.0).penetration(), Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_unresolved_hit_loses_to_any_time() {
        let h = Hit::unresolved();
        assert!(!h.is_hit);
        assert!(h.time > 1.0);
    }
}
