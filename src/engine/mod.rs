//! Game loop orchestration
//!
//! The engine owns the context and the collection registry, drives the
//! fixed-step loop and calls back into the application through [`Game`].
//!
//! Frame order:
//! time update -> input -> (if ticks owed: pre-fixed, N x fixed + physics,
//! post-fixed) -> pre/update/post -> render -> buffer swap -> submit.

pub mod collections;
pub mod context;

pub use collections::Collections;
pub use context::{CameraState, Command, Context, PhysicsConfig};

use std::time::Duration;

use crate::error::{EngineError, Result};
use crate::physics;
use crate::render::Presenter;
use crate::settings::EngineSettings;
use crate::time::{Clock, MonotonicClock, TimeState};
use crate::world::{Callback, CollectionId, Entity, EntityRef};

/// Where the engine currently is in its lifecycle or frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStage {
    Idle,
    Setup,
    Init,
    Run,
    ProcessInput,
    PreFixedUpdate,
    FixedUpdate,
    PostFixedUpdate,
    Update,
    Render,
    Cleanup,
}

impl EngineStage {
    /// Stages in which no entity iteration is in flight
    pub fn can_add_or_remove_entities(self) -> bool {
        matches!(
            self,
            EngineStage::Idle
                | EngineStage::Setup
                | EngineStage::Init
                | EngineStage::Run
                | EngineStage::Cleanup
                | EngineStage::PreFixedUpdate
        )
    }
}

/// One-shot content loader run on a background thread during init
pub type Loader<T> = Box<dyn FnOnce() -> Result<T> + Send>;

/// Application hooks
#[allow(unused_variables)]
pub trait Game {
    /// Whatever the background loader produces for `init`
    type Content: Send + 'static;

    fn loader(&mut self) -> Loader<Self::Content>;

    /// Build the world from loaded content. An error aborts `run`.
    fn init(&mut self, engine: &mut Engine, content: Self::Content) -> Result<()>;

    fn cleanup(&mut self, engine: &mut Engine) {}

    /// Feed device events into `engine.context_mut().input`
    fn process_input(&mut self, engine: &mut Engine) {}

    fn pre_fixed_update(&mut self, engine: &mut Engine) {}
    fn fixed_update(&mut self, engine: &mut Engine) {}
    fn post_fixed_update(&mut self, engine: &mut Engine) {}
    fn update(&mut self, engine: &mut Engine) {}
    fn render(&mut self, engine: &mut Engine) {}

    /// Present the published render buffer
    fn submit_render(&mut self, engine: &mut Engine) -> Result<()> {
        Ok(())
    }

    /// Called repeatedly while content is loading
    fn idling(&mut self, engine: &mut Engine) {}
}

pub struct Engine {
    ctx: Context,
    collections: Collections,
    clock: Box<dyn Clock>,
    settings: EngineSettings,
    cleaned_up: bool,
}

impl Engine {
    /// Create an engine driven by the wall clock
    pub fn setup(settings: EngineSettings) -> Result<Self> {
        Self::with_clock(settings, MonotonicClock::new())
    }

    /// Create an engine driven by `clock`
    pub fn with_clock(settings: EngineSettings, clock: impl Clock + 'static) -> Result<Self> {
        if let Err(e) = settings.validate() {
            log::error!("Engine setup failed: {e}");
            return Err(e);
        }

        let time = TimeState::new(clock.now(), clock.frequency(), settings.fixed_time_step);
        let mut ctx = Context::new(&settings, time);
        ctx.set_stage(EngineStage::Setup);

        log::info!(
            "Engine setup: step={:.5}s, physics iterations={}, clock={}Hz",
            settings.fixed_time_step,
            settings.physics_iterations,
            clock.frequency()
        );

        ctx.set_stage(EngineStage::Idle);
        Ok(Self {
            ctx,
            collections: Collections::new(),
            clock: Box::new(clock),
            settings,
            cleaned_up: false,
        })
    }

    /// Load content in the background, initialize the game and loop until
    /// `running` is cleared
    pub fn run<G: Game>(&mut self, game: &mut G) -> Result<()> {
        self.ctx.set_stage(EngineStage::Init);
        log::info!("Loading content");

        let loader = game.loader();
        let handle = std::thread::Builder::new()
            .name("content-loader".to_string())
            .spawn(loader)
            .map_err(|e| EngineError::Init(format!("failed to spawn loader thread: {e}")))?;

        while !handle.is_finished() {
            game.process_input(self);
            self.collections.apply_commands(&mut self.ctx);
            game.idling(self);
            std::thread::sleep(Duration::from_millis(1));
        }

        let content = match handle.join() {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                log::error!("Content loading failed: {e}");
                self.ctx.set_stage(EngineStage::Idle);
                return Err(e);
            }
            Err(_) => {
                log::error!("Content loader panicked");
                self.ctx.set_stage(EngineStage::Idle);
                return Err(EngineError::LoaderPanicked);
            }
        };

        if let Err(e) = game.init(self, content) {
            log::error!("Game init failed: {e}");
            self.ctx.set_stage(EngineStage::Idle);
            return Err(e);
        }
        self.collections.apply_commands(&mut self.ctx);

        self.ctx.set_stage(EngineStage::Run);
        log::info!("Entering game loop");

        // Time spent loading is not owed to the simulation
        self.ctx.time = TimeState::new(
            self.clock.now(),
            self.clock.frequency(),
            self.settings.fixed_time_step,
        );

        while self.ctx.running {
            self.frame(game);
            if let Err(e) = game.submit_render(self) {
                log::error!("Presenting frame failed: {e}");
                self.ctx.set_stage(EngineStage::Idle);
                return Err(e);
            }
        }

        log::info!("Game loop exited");
        Ok(())
    }

    /// Run one frame. Returns the number of fixed ticks simulated.
    pub fn frame<G: Game>(&mut self, game: &mut G) -> u32 {
        self.ctx.set_stage(EngineStage::Run);
        let ticks = self.ctx.time.update(self.clock.now());

        self.ctx.set_stage(EngineStage::ProcessInput);
        game.process_input(self);
        self.collections.apply_commands(&mut self.ctx);

        if ticks > 0 {
            self.ctx.set_stage(EngineStage::PreFixedUpdate);
            self.collections.process_queues(&mut self.ctx);
            self.collections.dispatch(Callback::PreFixedUpdate, &mut self.ctx);
            self.collections.record_last_positions();
            game.pre_fixed_update(self);
            self.collections.apply_commands(&mut self.ctx);

            self.ctx.set_stage(EngineStage::FixedUpdate);
            for _ in 0..ticks {
                self.collections.dispatch(Callback::FixedUpdate, &mut self.ctx);
                physics::step(&mut self.collections, &mut self.ctx);
                game.fixed_update(self);
                self.collections.apply_commands(&mut self.ctx);
            }

            self.ctx.set_stage(EngineStage::PostFixedUpdate);
            self.collections.dispatch(Callback::PostFixedUpdate, &mut self.ctx);
            game.post_fixed_update(self);
            self.collections.apply_commands(&mut self.ctx);
        }

        self.ctx.set_stage(EngineStage::Update);
        self.collections.dispatch(Callback::PreUpdate, &mut self.ctx);
        self.collections.dispatch(Callback::Update, &mut self.ctx);
        self.collections.dispatch(Callback::PostUpdate, &mut self.ctx);
        game.update(self);
        self.collections.apply_commands(&mut self.ctx);

        self.ctx.set_stage(EngineStage::Render);
        self.collections.dispatch(Callback::Render, &mut self.ctx);
        game.render(self);
        self.collections.apply_commands(&mut self.ctx);

        self.ctx.render.swap();
        ticks
    }

    /// Sort the published render buffer by order (stable) and execute it
    pub fn execute_render_ops(&mut self, presenter: &mut dyn Presenter) {
        self.ctx.render.sort_rendering();
        for op in self.ctx.render.rendering() {
            presenter.execute(op);
        }
    }

    /// Clear, execute the published buffer and present
    pub fn present(&mut self, presenter: &mut dyn Presenter) -> Result<()> {
        presenter.clear(self.ctx.clear_color);
        self.execute_render_ops(presenter);
        presenter.present()
    }

    /// Tear down the game and every collection
    pub fn cleanup<G: Game>(&mut self, game: &mut G) {
        self.ctx.set_stage(EngineStage::Cleanup);
        game.cleanup(self);
        self.collections.apply_commands(&mut self.ctx);
        self.collections.destroy_all(&mut self.ctx);
        self.ctx.set_stage(EngineStage::Idle);
        self.cleaned_up = true;
        log::info!("Engine cleaned up");
    }

    // === Accessors ===

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut Collections {
        &mut self.collections
    }

    /// Both halves at once, for code that needs to mutate entities with a context
    pub fn split_mut(&mut self) -> (&mut Collections, &mut Context) {
        (&mut self.collections, &mut self.ctx)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[inline]
    pub fn stage(&self) -> EngineStage {
        self.ctx.stage()
    }

    pub fn is_running(&self) -> bool {
        self.ctx.running
    }

    pub fn quit(&mut self) {
        self.ctx.quit();
    }

    pub fn time(&self) -> &TimeState {
        &self.ctx.time
    }

    // === Collections and entities ===

    pub fn create_collection(&mut self, name: impl Into<String>) -> CollectionId {
        self.collections.create(name)
    }

    pub fn destroy_collection(&mut self, id: CollectionId) -> bool {
        let destroyed = self.collections.destroy(id, &mut self.ctx);
        self.collections.apply_commands(&mut self.ctx);
        destroyed
    }

    pub fn add_entity(&mut self, collection: CollectionId, entity: Entity) -> Option<EntityRef> {
        let added = self.collections.add(collection, entity, &mut self.ctx);
        self.collections.apply_commands(&mut self.ctx);
        added
    }

    pub fn remove_entity(&mut self, target: EntityRef) -> bool {
        let removed = self.collections.remove(target, &mut self.ctx);
        self.collections.apply_commands(&mut self.ctx);
        removed
    }

    pub fn set_entity_active(&mut self, target: EntityRef, value: bool) -> bool {
        let changed = self.collections.set_active(target, value, &mut self.ctx);
        self.collections.apply_commands(&mut self.ctx);
        changed
    }

    pub fn entity(&self, target: EntityRef) -> Option<&Entity> {
        self.collections.entity(target)
    }

    /// Mutate an entity with the context at hand; caches are synced afterwards
    pub fn with_entity_mut<R>(
        &mut self,
        target: EntityRef,
        f: impl FnOnce(&mut Entity, &mut Context) -> R,
    ) -> Option<R> {
        let ctx = &mut self.ctx;
        let result = self.collections.with_entity_mut(target, |entity| f(entity, ctx));
        self.collections.apply_commands(&mut self.ctx);
        result
    }

    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityRef> {
        self.collections.find_entity_by_name(name)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.ctx.set_stage(EngineStage::Cleanup);
        self.collections.destroy_all(&mut self.ctx);
        self.ctx.set_stage(EngineStage::Idle);
        log::debug!("Engine dropped without explicit cleanup");
    }
}
