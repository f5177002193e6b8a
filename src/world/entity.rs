//! Entities
//!
//! An entity is a physics box, an interpolated visual box and an ordered set
//! of components. Components are dispatched in tag order, so engine
//! components always run before game components.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::components::body::{BodyKind, RigidBody, StaticBody};
use crate::engine::Context;
use crate::math::{Aabb, Hit};

use super::component::Callback;
use super::{Component, ComponentType, EngineComponentType, EntityRef};

/// Lifecycle state relative to the owning collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityState {
    Normal,
    /// Waiting in an add queue (or not yet added anywhere)
    #[default]
    QueuedForCreation,
    /// Waiting in a remove queue
    QueuedForDeletion,
}

struct ComponentSlot {
    /// `None` while the component is running one of its own callbacks
    component: Option<Box<dyn Component>>,
    active: bool,
    is_setup: bool,
}

pub struct Entity {
    /// Authoritative physics box
    pub aabb: Aabb,
    /// Box used for rendering, interpolated between fixed ticks
    pub visual_aabb: Aabb,
    /// Physics position at the start of the current fixed tick
    pub last_pos: Vec2,
    pub name: String,

    state: EntityState,
    active: bool,
    components: BTreeMap<ComponentType, ComponentSlot>,
    handle: Option<EntityRef>,
    /// Components attached while inactive, set up on activation
    setup_queue: Vec<ComponentType>,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("aabb", &self.aabb)
            .field("state", &self.state)
            .field("active", &self.active)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("handle", &self.handle)
            .finish()
    }
}

impl Entity {
    pub fn new(pos: Vec2, half_size: Vec2) -> Self {
        Self::from_aabb(Aabb::new(pos, half_size))
    }

    pub fn from_aabb(aabb: Aabb) -> Self {
        Self {
            aabb,
            visual_aabb: aabb,
            last_pos: aabb.pos,
            name: String::new(),
            state: EntityState::QueuedForCreation,
            active: true,
            components: BTreeMap::new(),
            handle: None,
            setup_queue: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn state(&self) -> EntityState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: EntityState) {
        self.state = state;
    }

    /// Handle assigned when the entity is added to a collection
    #[inline]
    pub fn handle(&self) -> Option<EntityRef> {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: Option<EntityRef>) {
        self.handle = handle;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Receives callbacks and takes part in physics
    #[inline]
    pub fn can_be_used(&self) -> bool {
        self.state == EntityState::Normal && self.active
    }

    // === Components ===

    pub fn add_component<C: Component>(&mut self, component: C, ctx: &mut Context) {
        self.add_boxed_component(Box::new(component), ctx);
    }

    /// Attach a component.
    ///
    /// On an active entity the component is set up and activated right away;
    /// on an inactive one it waits until the entity is activated.
    pub fn add_boxed_component(&mut self, mut component: Box<dyn Component>, ctx: &mut Context) {
        let ty = component.component_type();

        debug_assert!(
            !self.components.contains_key(&ty),
            "entity '{}' already has component {ty:?}",
            self.name
        );
        if self.components.contains_key(&ty) {
            log::error!("Entity '{}' already has component {:?}, dropping the new one", self.name, ty);
            return;
        }

        let is_body = body_kind_of(ty).is_some();
        debug_assert!(
            !(is_body && self.has_body()),
            "entity '{}' already has a body",
            self.name
        );
        if is_body && self.has_body() {
            log::error!("Entity '{}' already has a body, dropping {:?}", self.name, ty);
            return;
        }

        if self.active {
            component.setup(self, ctx);
            component.on_activate(self, ctx);
            self.components.insert(
                ty,
                ComponentSlot {
                    component: Some(component),
                    active: true,
                    is_setup: true,
                },
            );
        } else {
            self.components.insert(
                ty,
                ComponentSlot {
                    component: Some(component),
                    active: true,
                    is_setup: false,
                },
            );
            self.setup_queue.push(ty);
        }
    }

    /// Detach a component, running its cleanup first.
    ///
    /// Returns false if no component with that tag is attached.
    pub fn remove_component(&mut self, ty: impl Into<ComponentType>, ctx: &mut Context) -> bool {
        let ty = ty.into();
        let Some(slot) = self.components.remove(&ty) else {
            log::warn!("Entity '{}' has no component {:?} to remove", self.name, ty);
            return false;
        };
        self.setup_queue.retain(|queued| *queued != ty);

        // A component removing itself is cleaned up when its callback returns
        if let Some(mut component) = slot.component {
            component.cleanup(self, ctx);
        }
        true
    }

    pub fn has_component(&self, ty: impl Into<ComponentType>) -> bool {
        self.components.contains_key(&ty.into())
    }

    pub fn component_types(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.components.keys().copied()
    }

    pub fn is_component_active(&self, ty: impl Into<ComponentType>) -> bool {
        self.components.get(&ty.into()).is_some_and(|slot| slot.active)
    }

    pub fn set_component_active(&mut self, ty: impl Into<ComponentType>, value: bool, ctx: &mut Context) {
        let ty = ty.into();
        let Some(slot) = self.components.get_mut(&ty) else {
            return;
        };
        if slot.active == value {
            return;
        }
        slot.active = value;

        if !slot.is_setup || !self.active {
            return;
        }
        let Some(mut component) = slot.component.take() else {
            return;
        };
        if value {
            component.on_activate(self, ctx);
        } else {
            component.on_deactivate(self, ctx);
        }
        self.restore(ty, component, ctx);
    }

    /// Typed access to a component. `None` if missing, of another type, or
    /// currently running its own callback.
    pub fn get_component<T: Component>(&self, ty: impl Into<ComponentType>) -> Option<&T> {
        self.components
            .get(&ty.into())?
            .component
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    pub fn get_component_mut<T: Component>(&mut self, ty: impl Into<ComponentType>) -> Option<&mut T> {
        self.components
            .get_mut(&ty.into())?
            .component
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    // === Bodies ===

    pub fn has_body(&self) -> bool {
        self.body_kind().is_some()
    }

    pub fn body_kind(&self) -> Option<BodyKind> {
        if self.components.contains_key(&EngineComponentType::StaticBody.into()) {
            Some(BodyKind::Static)
        } else if self.components.contains_key(&EngineComponentType::RigidBody.into()) {
            Some(BodyKind::Rigid)
        } else {
            None
        }
    }

    /// Collision layer of whichever body is attached
    pub fn body_layer(&self) -> Option<u8> {
        match self.body_kind()? {
            BodyKind::Static => self.static_body().map(|body| body.layer),
            BodyKind::Rigid => self.rigid_body().map(|body| body.layer),
        }
    }

    /// Whether the attached body takes part in physics
    pub fn is_body_active(&self) -> bool {
        match self.body_kind() {
            Some(BodyKind::Static) => self.is_component_active(EngineComponentType::StaticBody),
            Some(BodyKind::Rigid) => self.is_component_active(EngineComponentType::RigidBody),
            None => false,
        }
    }

    pub fn static_body(&self) -> Option<&StaticBody> {
        self.get_component(EngineComponentType::StaticBody)
    }

    pub fn rigid_body(&self) -> Option<&RigidBody> {
        self.get_component(EngineComponentType::RigidBody)
    }

    pub fn rigid_body_mut(&mut self) -> Option<&mut RigidBody> {
        self.get_component_mut(EngineComponentType::RigidBody)
    }

    // === Lifecycle ===

    /// Toggle the entity. Activation first sets up components that were
    /// attached while inactive, in attachment order.
    pub fn set_active(&mut self, value: bool, ctx: &mut Context) {
        if self.active == value {
            return;
        }
        self.active = value;

        if value {
            let queued = std::mem::take(&mut self.setup_queue);
            for ty in queued {
                self.setup_component(ty, ctx);
            }
            self.dispatch(Callback::OnActivate, ctx);
        } else {
            self.dispatch(Callback::OnDeactivate, ctx);
        }
    }

    fn setup_component(&mut self, ty: ComponentType, ctx: &mut Context) {
        let Some(slot) = self.components.get_mut(&ty) else {
            return;
        };
        if slot.is_setup {
            return;
        }
        let Some(mut component) = slot.component.take() else {
            return;
        };
        component.setup(self, ctx);
        if let Some(slot) = self.components.get_mut(&ty) {
            slot.is_setup = true;
        }
        self.restore(ty, component, ctx);
    }

    /// Clean up every component that was set up. Called when the entity
    /// leaves its collection.
    pub(crate) fn cleanup_components(&mut self, ctx: &mut Context) {
        let types: Vec<ComponentType> = self.components.keys().copied().collect();
        for ty in types {
            let Some(slot) = self.components.get_mut(&ty) else {
                continue;
            };
            if !slot.is_setup {
                continue;
            }
            slot.is_setup = false;
            let Some(mut component) = slot.component.take() else {
                continue;
            };
            component.cleanup(self, ctx);
            self.restore(ty, component, ctx);
        }
    }

    /// Broadcast a stage callback to the active components
    pub fn dispatch(&mut self, callback: Callback, ctx: &mut Context) {
        if callback == Callback::PreUpdate {
            self.update_visual(ctx.interpolation());
        }

        let types: Vec<ComponentType> = self.components.keys().copied().collect();
        for ty in types {
            let Some(mut component) = self.checkout(ty) else {
                continue;
            };
            callback.invoke(component.as_mut(), self, ctx);
            self.restore(ty, component, ctx);
        }
    }

    /// Report a physics contact to the active components
    pub fn on_hit(&mut self, hit: &Hit, ctx: &mut Context) {
        let types: Vec<ComponentType> = self.components.keys().copied().collect();
        for ty in types {
            let Some(mut component) = self.checkout(ty) else {
                continue;
            };
            component.on_hit(self, ctx, hit);
            self.restore(ty, component, ctx);
        }
    }

    /// Move the visual box between the last and current physics positions
    pub fn update_visual(&mut self, t: f32) {
        self.visual_aabb.pos = self.last_pos.lerp(self.aabb.pos, t);
        self.visual_aabb.half_size = self.aabb.half_size;
    }

    fn checkout(&mut self, ty: ComponentType) -> Option<Box<dyn Component>> {
        let slot = self.components.get_mut(&ty)?;
        if !slot.active || !slot.is_setup {
            return None;
        }
        slot.component.take()
    }

    fn restore(&mut self, ty: ComponentType, mut component: Box<dyn Component>, ctx: &mut Context) {
        if let Some(slot) = self.components.get_mut(&ty) {
            if slot.component.is_none() {
                slot.component = Some(component);
                return;
            }
        }
        // Detached (or replaced) during its own callback
        component.cleanup(self, ctx);
    }
}

fn body_kind_of(ty: ComponentType) -> Option<BodyKind> {
    if ty == EngineComponentType::StaticBody.into() {
        Some(BodyKind::Static)
    } else if ty == EngineComponentType::RigidBody.into() {
        Some(BodyKind::Rigid)
    } else {
        None
    }
}
