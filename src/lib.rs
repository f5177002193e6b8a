//! Topdown Engine - fixed-timestep 2D simulation core
//!
//! Core modules:
//! - `math`: Vector helpers and axis-aligned boxes (sweeps, overlap, penetration)
//! - `time`: Fixed-step accumulator and clock sources
//! - `world`: Components, entities and entity collections
//! - `components`: Engine-provided components (bodies, camera, renderables)
//! - `physics`: Swept AABB integration of rigid bodies
//! - `engine`: Game loop orchestration and the per-frame context
//! - `render`: Render operations, colors and the presentation seam

pub mod components;
pub mod engine;
pub mod error;
pub mod input;
pub mod math;
pub mod physics;
pub mod render;
pub mod settings;
pub mod time;
pub mod timer;
pub mod world;

pub use engine::{Context, Engine, EngineStage, Game};
pub use error::{EngineError, Result};
pub use settings::EngineSettings;

use rand::Rng;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const FIXED_TIME_STEP: f64 = 1.0 / 60.0;
    /// Physics sub-iterations per fixed tick
    pub const PHYSICS_ITERATIONS: u32 = 4;

    /// First component tag available to game-defined components
    pub const GAME_COMPONENT_ID_OFFSET: u16 = 100;

    /// World units per level grid cell
    pub const UNIT_SIZE: f32 = 50.0;

    /// Default presentation size
    pub const SCREEN_WIDTH: u32 = 720;
    pub const SCREEN_HEIGHT: u32 = 720;

    /// Sweep sentinel, larger than any valid hit time in [-1, 1]
    pub const NO_HIT_TIME: f32 = 0xBEEF as f32;
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map a value in [0, 1] onto [min, max]
#[inline]
pub fn custom_range(zero_to_one: f32, min: f32, max: f32) -> f32 {
    zero_to_one * (max - min) + min
}

/// Random integer in [min, max). Returns `min` for an empty range.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}

/// Sign of a value as -1, 0 or 1 (zero maps to zero, unlike `f32::signum`)
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_lerp_and_range() {
        assert_eq!(lerp(0.0, 10.0, 0.25), 2.5);
        assert_eq!(custom_range(0.5, 10.0, 20.0), 15.0);
    }

    #[test]
    fn test_sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.0), 1.0);
        assert_eq!(sign(-0.5), -1.0);
    }

    #[test]
    fn test_random_int_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let v = random_int(&mut rng, -3, 4);
            assert!((-3..4).contains(&v));
        }
        assert_eq!(random_int(&mut rng, 5, 5), 5);
    }
}
