//! Physics bodies
//!
//! Static bodies never move and only have a collision layer. Rigid bodies
//! carry a velocity and a mask of the layers they collide with.

use glam::Vec2;

use crate::world::{Component, ComponentType, EngineComponentType, EntityRef};

/// Default layer for new bodies
pub const DEFAULT_LAYER: u8 = 0b0000_0001;
/// Default rigid body mask: collide with everything
pub const DEFAULT_MASK: u8 = 0b1111_1111;

/// Which kind of body an entity carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Static,
    Rigid,
}

/// The body on the other side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitBody {
    pub entity: EntityRef,
    pub kind: BodyKind,
    pub layer: u8,
}

/// True when a body with `mask` collides with one on `layer`
#[inline]
pub fn collides(mask: u8, layer: u8) -> bool {
    mask & layer != 0
}

/// Immovable obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticBody {
    pub layer: u8,
}

impl StaticBody {
    pub fn new(layer: u8) -> Self {
        Self { layer }
    }
}

impl Default for StaticBody {
    fn default() -> Self {
        Self::new(DEFAULT_LAYER)
    }
}

impl Component for StaticBody {
    fn component_type(&self) -> ComponentType {
        EngineComponentType::StaticBody.into()
    }
}

/// Moving body integrated by the physics engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub layer: u8,
    /// Layers this body collides with
    pub mask: u8,
    /// Units per second
    pub vel: Vec2,
}

impl RigidBody {
    pub fn new(layer: u8, mask: u8) -> Self {
        Self {
            layer,
            mask,
            vel: Vec2::ZERO,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    #[inline]
    pub fn collides_with(&self, layer: u8) -> bool {
        collides(self.mask, layer)
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(DEFAULT_LAYER, DEFAULT_MASK)
    }
}

impl Component for RigidBody {
    fn component_type(&self) -> ComponentType {
        EngineComponentType::RigidBody.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask_filter() {
        let body = RigidBody::new(0b0001, 0b0110);
        assert!(body.collides_with(0b0010));
        assert!(body.collides_with(0b0100));
        assert!(!body.collides_with(0b0001));
        assert!(!body.collides_with(0b1000));
    }

    #[test]
    fn test_defaults() {
        let body = RigidBody::default();
        assert_eq!(body.layer, DEFAULT_LAYER);
        assert_eq!(body.mask, DEFAULT_MASK);
        assert_eq!(body.vel, Vec2::ZERO);
        assert_eq!(StaticBody::default().layer, DEFAULT_LAYER);
    }
}
