//! Math primitives
//!
//! `glam::Vec2` is the vector type everywhere; [`Vec2Ext`] adds the handful of
//! game-side helpers glam does not provide. [`Aabb`] carries the sweep and
//! overlap tests the physics engine is built on.

pub mod aabb;
pub mod vec2;

pub use aabb::{Aabb, Hit};
pub use glam::Vec2;
pub use vec2::Vec2Ext;
