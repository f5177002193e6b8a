//! Engine-provided components

pub mod body;
pub mod camera;
pub mod renderables;

pub use body::{BodyKind, HitBody, RigidBody, StaticBody};
pub use camera::Camera;
pub use renderables::{RenderMode, RenderRect};
