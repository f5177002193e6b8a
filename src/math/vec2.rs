//! Vector helpers on top of `glam::Vec2`
//!
//! Normalization goes through `Vec2::normalize_or_zero`, so the zero vector
//! stays zero instead of turning into NaN.

use glam::Vec2;
use rand::Rng;

/// Extra 2D helpers used by components and the physics engine
pub trait Vec2Ext: Sized {
    /// Rotate counter-clockwise by `radians`
    fn rotate_by_rads(self, radians: f32) -> Self;

    /// Rotate counter-clockwise by `degrees`
    fn rotate_by_deg(self, degrees: f32) -> Self {
        self.rotate_by_rads(degrees.to_radians())
    }

    /// Angle of this direction relative to `base`, in radians
    fn angle_rads(self, base: Self) -> f32;

    fn angle_deg(self, base: Self) -> f32 {
        self.angle_rads(base).to_degrees()
    }

    /// Uniformly distributed point inside a circle of `radius`
    fn random_in_circle<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Self;

    /// Point on the circumference at a uniformly random angle
    fn random_on_circle<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Self;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn rotate_by_rads(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Vec2::new(cos * self.x - sin * self.y, sin * self.x + cos * self.y)
    }

    fn angle_rads(self, base: Self) -> f32 {
        let base = base.normalize_or_zero();
        let this = self.normalize_or_zero();
        (this.y - base.y).atan2(this.x - base.x)
    }

    fn random_in_circle<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Self {
        let distance = radius * rng.random::<f32>().sqrt();
        Vec2::new(distance, 0.0).rotate_by_rads(rng.random::<f32>() * std::f32::consts::TAU)
    }

    fn random_on_circle<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Self {
        Vec2::new(radius, 0.0).rotate_by_rads(rng.random::<f32>() * std::f32::consts::TAU)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_normalize_zero_is_zero() {
        let n = Vec2::ZERO.normalize_or_zero();
        assert_eq!(n, Vec2::ZERO);
        assert!(!n.x.is_nan());
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotate_by_rads(FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);

        let w = Vec2::new(0.0, 2.0).rotate_by_deg(-90.0);
        assert!((w.x - 2.0).abs() < 1e-5);
        assert!(w.y.abs() < 1e-5);
    }

    #[test]
    fn test_angle_against_origin() {
        let angle = Vec2::new(0.0, 5.0).angle_rads(Vec2::ZERO);
        assert!((angle - FRAC_PI_2).abs() < 1e-6);
        assert!((Vec2::new(-3.0, 0.0).angle_deg(Vec2::ZERO) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_random_points_respect_radius() {
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..200 {
            let inside = Vec2::random_in_circle(&mut rng, 10.0);
            assert!(inside.length() <= 10.0 + 1e-4);

            let edge = Vec2::random_on_circle(&mut rng, 3.0);
            assert!((edge.length() - 3.0).abs() < 1e-4);
        }
    }
}
