//! Component model
//!
//! Components are attached to entities and react to lifecycle and stage
//! callbacks. Every callback has an empty default, so a component only
//! implements the ones it cares about.

use std::any::Any;

use crate::consts::GAME_COMPONENT_ID_OFFSET;
use crate::engine::Context;
use crate::math::Hit;

use super::Entity;

/// Component type tag. One component per tag per entity.
///
/// Tags below `GAME_COMPONENT_ID_OFFSET` belong to the engine, the rest to
/// the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentType(u16);

impl ComponentType {
    #[inline]
    pub fn id(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_engine(self) -> bool {
        self.0 < GAME_COMPONENT_ID_OFFSET
    }

    #[inline]
    pub fn is_game(self) -> bool {
        !self.is_engine()
    }
}

/// Engine-provided component tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EngineComponentType {
    Camera = 1,
    StaticBody = 10,
    RigidBody = 11,
    RenderRect = 20,
}

const _: () = {
    assert!((EngineComponentType::Camera as u16) < GAME_COMPONENT_ID_OFFSET);
    assert!((EngineComponentType::StaticBody as u16) < GAME_COMPONENT_ID_OFFSET);
    assert!((EngineComponentType::RigidBody as u16) < GAME_COMPONENT_ID_OFFSET);
    assert!((EngineComponentType::RenderRect as u16) < GAME_COMPONENT_ID_OFFSET);
};

impl From<EngineComponentType> for ComponentType {
    fn from(value: EngineComponentType) -> Self {
        ComponentType(value as u16)
    }
}

/// Game-side component tag enum.
///
/// `index` counts from zero; the tag is shifted into the game range.
pub trait GameComponentType: Copy {
    fn index(self) -> u16;

    fn component_type(self) -> ComponentType {
        let index = self.index();
        debug_assert!(
            index <= u16::MAX - GAME_COMPONENT_ID_OFFSET,
            "game component index {index} out of range"
        );
        ComponentType(GAME_COMPONENT_ID_OFFSET.saturating_add(index))
    }
}

/// Downcast support for boxed components
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior attached to an entity.
///
/// Callbacks receive the owning entity (without this component in it while
/// the callback runs) and the engine context. Changes to other entities go
/// through `Context` commands.
#[allow(unused_variables)]
pub trait Component: AsAny {
    fn component_type(&self) -> ComponentType;

    /// Called once, when the component first becomes usable
    fn setup(&mut self, entity: &mut Entity, ctx: &mut Context) {}
    /// Called when the component is detached or its entity is removed
    fn cleanup(&mut self, entity: &mut Entity, ctx: &mut Context) {}

    fn on_activate(&mut self, entity: &mut Entity, ctx: &mut Context) {}
    fn on_deactivate(&mut self, entity: &mut Entity, ctx: &mut Context) {}

    fn pre_fixed_update(&mut self, entity: &mut Entity, ctx: &mut Context) {}
    fn fixed_update(&mut self, entity: &mut Entity, ctx: &mut Context) {}
    fn post_fixed_update(&mut self, entity: &mut Entity, ctx: &mut Context) {}

    fn pre_update(&mut self, entity: &mut Entity, ctx: &mut Context) {}
    fn update(&mut self, entity: &mut Entity, ctx: &mut Context) {}
    fn post_update(&mut self, entity: &mut Entity, ctx: &mut Context) {}

    fn render(&mut self, entity: &mut Entity, ctx: &mut Context) {}

    /// Called on the moving entity when the physics engine reports a contact
    fn on_hit(&mut self, entity: &mut Entity, ctx: &mut Context, hit: &Hit) {}
}

/// Stage callbacks broadcast to an entity's active components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    OnActivate,
    OnDeactivate,
    PreFixedUpdate,
    FixedUpdate,
    PostFixedUpdate,
    PreUpdate,
    Update,
    PostUpdate,
    Render,
}

impl Callback {
    pub(crate) fn invoke(self, component: &mut dyn Component, entity: &mut Entity, ctx: &mut Context) {
        match self {
            Callback::OnActivate => component.on_activate(entity, ctx),
            Callback::OnDeactivate => component.on_deactivate(entity, ctx),
            Callback::PreFixedUpdate => component.pre_fixed_update(entity, ctx),
            Callback::FixedUpdate => component.fixed_update(entity, ctx),
            Callback::PostFixedUpdate => component.post_fixed_update(entity, ctx),
            Callback::PreUpdate => component.pre_update(entity, ctx),
            Callback::Update => component.update(entity, ctx),
            Callback::PostUpdate => component.post_update(entity, ctx),
            Callback::Render => component.render(entity, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    enum GameTag {
        Player,
        Enemy,
    }

    impl GameComponentType for GameTag {
        fn index(self) -> u16 {
            self as u16
        }
    }

    #[test]
    fn test_engine_and_game_ranges_disjoint() {
        let camera: ComponentType = EngineComponentType::Camera.into();
        let rigid: ComponentType = EngineComponentType::RigidBody.into();
        assert!(camera.is_engine());
        assert!(rigid.is_engine());

        let player = GameTag::Player.component_type();
        let enemy = GameTag::Enemy.component_type();
        assert!(player.is_game());
        assert_eq!(player.id(), GAME_COMPONENT_ID_OFFSET);
        assert_eq!(enemy.id(), GAME_COMPONENT_ID_OFFSET + 1);
    }

    #[test]
    fn test_engine_tags_sort_before_game_tags() {
        let render: ComponentType = EngineComponentType::RenderRect.into();
        assert!(render < GameTag::Player.component_type());
    }
}
