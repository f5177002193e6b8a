//! Camera component
//!
//! There is at most one camera. It claims the camera slot the first time its
//! entity runs a post-update pass, so an entity that never joins a collection
//! never registers. From then on it publishes the entity's visual box as the
//! view every frame; renderables cull against it and draw relative to its
//! top-left corner.

use crate::engine::Context;
use crate::world::{Component, ComponentType, EngineComponentType, Entity};

#[derive(Debug, Default)]
pub struct Camera {
    registered: bool,
    /// Lost the slot to another camera
    rejected: bool,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

impl Component for Camera {
    fn component_type(&self) -> ComponentType {
        EngineComponentType::Camera.into()
    }

    fn cleanup(&mut self, _entity: &mut Entity, ctx: &mut Context) {
        if self.registered {
            ctx.camera.unregister();
            self.registered = false;
        }
    }

    fn post_update(&mut self, entity: &mut Entity, ctx: &mut Context) {
        if self.registered {
            ctx.camera.set_view(entity.visual_aabb);
            return;
        }
        if self.rejected {
            return;
        }

        debug_assert!(!ctx.camera.is_registered(), "only one camera may exist");
        if ctx.camera.is_registered() {
            log::error!("Camera on '{}' ignored, a camera is already registered", entity.name);
            self.rejected = true;
            return;
        }
        ctx.camera.register(entity.visual_aabb);
        self.registered = true;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::world::Callback;

    #[test]
    fn test_camera_publishes_view() {
        let mut ctx = Context::default();
        let mut e = Entity::new(Vec2::ZERO, Vec2::new(360.0, 360.0));
        e.add_component(Camera::new(), &mut ctx);
        e.dispatch(Callback::PostUpdate, &mut ctx);
        assert!(ctx.camera.is_registered());

        e.visual_aabb.pos = Vec2::new(5.0, 5.0);
        e.dispatch(Callback::PostUpdate, &mut ctx);
        assert_eq!(ctx.camera.view().map(|v| v.pos), Some(Vec2::new(5.0, 5.0)));

        e.remove_component(EngineComponentType::Camera, &mut ctx);
        assert!(!ctx.camera.is_registered());
    }

    #[test]
    fn test_unused_camera_entity_leaves_slot_free() {
        let mut ctx = Context::default();
        {
            let mut e = Entity::new(Vec2::ZERO, Vec2::ONE);
            e.add_component(Camera::new(), &mut ctx);
        }
        assert!(!ctx.camera.is_registered());

        let mut e = Entity::new(Vec2::ZERO, Vec2::ONE);
        e.add_component(Camera::new(), &mut ctx);
        e.dispatch(Callback::PostUpdate, &mut ctx);
        assert!(ctx.camera.is_registered());
        assert!(
            e.get_component::<Camera>(EngineComponentType::Camera)
                .is_some_and(|c| c.is_registered())
        );
    }
}
