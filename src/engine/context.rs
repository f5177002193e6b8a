//! Per-engine shared state handed to every component callback

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{Collections, EngineStage};
use crate::input::InputState;
use crate::math::Aabb;
use crate::render::{Color, RenderBuffers, RenderOp};
use crate::settings::EngineSettings;
use crate::time::TimeState;
use crate::world::{CollectionId, Entity, EntityRef};

/// Deferred structural change, applied right after the callback that
/// issued it returns
pub enum Command {
    SetActive(EntityRef, bool),
    Add(CollectionId, Box<Entity>),
    Remove(EntityRef),
    Clear(CollectionId),
    /// Arbitrary access to every collection
    Deferred(Box<dyn FnOnce(&mut Collections, &mut Context)>),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SetActive(target, value) => write!(f, "SetActive({target}, {value})"),
            Command::Add(collection, entity) => write!(f, "Add({collection}, '{}')", entity.name),
            Command::Remove(target) => write!(f, "Remove({target})"),
            Command::Clear(collection) => write!(f, "Clear({collection})"),
            Command::Deferred(_) => write!(f, "Deferred"),
        }
    }
}

/// The single camera slot
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraState {
    registered: bool,
    view: Option<Aabb>,
}

impl CameraState {
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// World-space box the camera currently shows
    pub fn view(&self) -> Option<Aabb> {
        self.view
    }

    pub fn register(&mut self, view: Aabb) {
        self.registered = true;
        self.view = Some(view);
    }

    pub fn set_view(&mut self, view: Aabb) {
        self.view = Some(view);
    }

    pub fn unregister(&mut self) {
        self.registered = false;
        self.view = None;
    }
}

/// Physics tuning copied from the settings
#[derive(Debug, Clone, Copy)]
pub struct PhysicsConfig {
    pub iterations: u32,
    pub resolve_resting_penetration: bool,
}

/// Engine state reachable from components
#[derive(Debug)]
pub struct Context {
    stage: EngineStage,
    pub time: TimeState,
    pub input: InputState,
    pub camera: CameraState,
    pub render: RenderBuffers,
    pub rng: Pcg32,
    pub physics: PhysicsConfig,
    /// Lerp visual boxes between fixed ticks
    pub interpolate: bool,
    /// Cleared to leave the game loop after the current frame
    pub running: bool,
    pub clear_color: Color,
    commands: VecDeque<Command>,
}

impl Default for Context {
    fn default() -> Self {
        let settings = EngineSettings::default();
        let time = TimeState::new(0, 1_000_000_000, settings.fixed_time_step);
        Self::new(&settings, time)
    }
}

impl Context {
    pub fn new(settings: &EngineSettings, time: TimeState) -> Self {
        Self {
            stage: EngineStage::Idle,
            time,
            input: InputState::new(),
            camera: CameraState::default(),
            render: RenderBuffers::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            physics: PhysicsConfig {
                iterations: settings.physics_iterations,
                resolve_resting_penetration: settings.resolve_resting_penetration,
            },
            interpolate: settings.interpolation,
            running: true,
            clear_color: settings.clear_color,
            commands: VecDeque::new(),
        }
    }

    #[inline]
    pub fn stage(&self) -> EngineStage {
        self.stage
    }

    pub(crate) fn set_stage(&mut self, stage: EngineStage) {
        if self.stage != stage {
            log::trace!("Stage {:?} -> {:?}", self.stage, stage);
        }
        self.stage = stage;
    }

    /// Whether collections may change structure right now
    #[inline]
    pub fn can_add_or_remove_entities(&self) -> bool {
        self.stage.can_add_or_remove_entities()
    }

    /// Fraction used to place visual boxes between fixed ticks
    #[inline]
    pub fn interpolation(&self) -> f32 {
        if self.interpolate {
            self.time.fixed_step_progress()
        } else {
            1.0
        }
    }

    pub fn push_render_op(&mut self, op: RenderOp) {
        self.render.push(op);
    }

    /// Ask the loop to stop after this frame
    pub fn quit(&mut self) {
        self.running = false;
    }

    // === Commands ===

    pub fn set_active(&mut self, target: EntityRef, value: bool) {
        self.commands.push_back(Command::SetActive(target, value));
    }

    pub fn spawn(&mut self, collection: CollectionId, entity: Entity) {
        self.commands.push_back(Command::Add(collection, Box::new(entity)));
    }

    pub fn despawn(&mut self, target: EntityRef) {
        self.commands.push_back(Command::Remove(target));
    }

    pub fn clear_collection(&mut self, collection: CollectionId) {
        self.commands.push_back(Command::Clear(collection));
    }

    /// Run `f` with access to every collection once the current callback returns
    pub fn defer(&mut self, f: impl FnOnce(&mut Collections, &mut Context) + 'static) {
        self.commands.push_back(Command::Deferred(Box::new(f)));
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    pub(crate) fn pop_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_stages() {
        let mut ctx = Context::default();
        for stage in [
            EngineStage::Idle,
            EngineStage::Setup,
            EngineStage::Init,
            EngineStage::Run,
            EngineStage::Cleanup,
            EngineStage::PreFixedUpdate,
        ] {
            ctx.set_stage(stage);
            assert!(ctx.can_add_or_remove_entities(), "{stage:?} should allow mutation");
        }
        for stage in [
            EngineStage::ProcessInput,
            EngineStage::FixedUpdate,
            EngineStage::PostFixedUpdate,
            EngineStage::Update,
            EngineStage::Render,
        ] {
            ctx.set_stage(stage);
            assert!(!ctx.can_add_or_remove_entities(), "{stage:?} should defer mutation");
        }
    }

    #[test]
    fn test_interpolation_toggle() {
        let mut ctx = Context::default();
        ctx.interpolate = false;
        assert_eq!(ctx.interpolation(), 1.0);
        ctx.interpolate = true;
        assert_eq!(ctx.interpolation(), ctx.time.fixed_step_progress());
    }

    #[test]
    fn test_camera_slot() {
        let mut camera = CameraState::default();
        assert!(!camera.is_registered());
        camera.register(Aabb::default());
        assert!(camera.is_registered());
        assert!(camera.view().is_some());
        camera.unregister();
        assert!(camera.view().is_none());
    }

    #[test]
    fn test_commands_are_fifo() {
        let mut ctx = Context::default();
        let target = EntityRef::new(
            CollectionId(0),
            crate::world::EntityId {
                index: 0,
                generation: 0,
            },
        );
        ctx.set_active(target, false);
        ctx.despawn(target);
        assert_eq!(ctx.pending_commands(), 2);
        assert!(matches!(ctx.pop_command(), Some(Command::SetActive(_, false))));
        assert!(matches!(ctx.pop_command(), Some(Command::Remove(_))));
        assert!(ctx.pop_command().is_none());
    }
}
