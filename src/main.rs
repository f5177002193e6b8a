//! Headless demo
//!
//! Loads a small walled arena on the loader thread, fills it with wandering
//! rigid bodies and runs the fixed-step loop against a recording presenter
//! until the countdown runs out.
//!
//! Usage: `topdown-engine [settings.json]`

use std::process::ExitCode;

use glam::Vec2;
use rand::Rng;

use topdown_engine::components::{Camera, RenderMode, RenderRect, RigidBody, StaticBody};
use topdown_engine::consts::UNIT_SIZE;
use topdown_engine::engine::Loader;
use topdown_engine::math::{Aabb, Hit, Vec2Ext};
use topdown_engine::render::{Color, RecordingPresenter};
use topdown_engine::timer::{Countdown, Stopwatch};
use topdown_engine::world::{Component, ComponentType, Entity, GameComponentType};
use topdown_engine::{Context, Engine, EngineError, EngineSettings, Game, Result};

/// Seconds of simulated play before the demo quits
const DEMO_SECONDS: f64 = 5.0;
const WANDERER_COUNT: usize = 12;
const WANDER_SPEED: f32 = 240.0;

/// `#` is a wall cell, `.` is floor
const ARENA: &str = "\
##############
#............#
#............#
#....##......#
#............#
#.........#..#
#.........#..#
#............#
#..##........#
#............#
#............#
#......###...#
#............#
##############";

#[derive(Debug, Clone, Copy)]
enum DemoComponent {
    Wander,
}

impl GameComponentType for DemoComponent {
    fn index(self) -> u16 {
        self as u16
    }
}

/// Picks a new heading every so often, and after every contact
struct Wander {
    retarget: Countdown,
    hits: u32,
}

impl Wander {
    fn new(interval: f64) -> Self {
        Self {
            retarget: Countdown::new(interval),
            hits: 0,
        }
    }

    fn retarget(entity: &mut Entity, ctx: &mut Context) {
        let heading = Vec2::random_on_circle(&mut ctx.rng, WANDER_SPEED);
        if let Some(body) = entity.rigid_body_mut() {
            body.vel = heading;
        }
    }
}

impl Component for Wander {
    fn component_type(&self) -> ComponentType {
        DemoComponent::Wander.component_type()
    }

    fn on_activate(&mut self, entity: &mut Entity, ctx: &mut Context) {
        Self::retarget(entity, ctx);
    }

    fn fixed_update(&mut self, entity: &mut Entity, ctx: &mut Context) {
        if self.retarget.tick(ctx.time.fixed_step()) {
            Self::retarget(entity, ctx);
            self.retarget.restart();
        }
    }

    fn on_hit(&mut self, entity: &mut Entity, ctx: &mut Context, hit: &Hit) {
        self.hits += 1;
        log::trace!("'{}' hit at {:?}, normal {:?}", entity.name, hit.pos, hit.normal);
        Self::retarget(entity, ctx);
    }

    fn cleanup(&mut self, entity: &mut Entity, _ctx: &mut Context) {
        log::debug!("'{}' bumped into things {} times", entity.name, self.hits);
    }
}

/// Wall boxes and open floor cells parsed from the arena layout
struct Arena {
    walls: Vec<Aabb>,
    floor: Vec<Vec2>,
    size: Vec2,
}

fn load_arena(layout: &str) -> Result<Arena> {
    let half = Vec2::splat(UNIT_SIZE / 2.0);
    let mut walls = Vec::new();
    let mut floor = Vec::new();
    let mut columns = 0;
    let mut rows = 0;

    for (row, line) in layout.lines().enumerate() {
        rows += 1;
        columns = columns.max(line.len());
        for (column, cell) in line.chars().enumerate() {
            let center = Vec2::new(column as f32, row as f32) * UNIT_SIZE + half;
            match cell {
                '#' => walls.push(Aabb::new(center, half)),
                '.' => floor.push(center),
                other => {
                    return Err(EngineError::Init(format!(
                        "unknown arena cell '{other}' at {row}:{column}"
                    )));
                }
            }
        }
    }

    if floor.is_empty() {
        return Err(EngineError::Init("arena has no floor".to_string()));
    }
    Ok(Arena {
        walls,
        floor,
        size: Vec2::new(columns as f32, rows as f32) * UNIT_SIZE,
    })
}

struct Demo {
    countdown: Countdown,
    alive: Stopwatch,
    presenter: RecordingPresenter,
}

impl Demo {
    fn new() -> Self {
        Self {
            countdown: Countdown::new(DEMO_SECONDS),
            alive: Stopwatch::new(),
            presenter: RecordingPresenter::new(),
        }
    }
}

impl Game for Demo {
    type Content = Arena;

    fn loader(&mut self) -> Loader<Arena> {
        Box::new(|| load_arena(ARENA))
    }

    fn init(&mut self, engine: &mut Engine, arena: Arena) -> Result<()> {
        log::info!(
            "Arena loaded: {} walls, {} floor cells",
            arena.walls.len(),
            arena.floor.len()
        );
        let level = engine.create_collection("level");
        let actors = engine.create_collection("actors");

        let screen = {
            let settings = engine.settings();
            Vec2::new(settings.screen_width as f32, settings.screen_height as f32)
        };
        let mut camera = Entity::new(arena.size / 2.0, screen / 2.0).with_name("camera");
        camera.add_component(Camera::new(), engine.context_mut());
        engine.add_entity(level, camera);

        for (i, wall) in arena.walls.iter().enumerate() {
            let mut entity = Entity::from_aabb(*wall).with_name(format!("wall{i}"));
            let ctx = engine.context_mut();
            entity.add_component(StaticBody::default(), ctx);
            entity.add_component(
                RenderRect::new(RenderMode::Both, Color::DARK_GRAY, Color::GRAY, 0),
                ctx,
            );
            engine.add_entity(level, entity);
        }

        let palette = [Color::ORANGE, Color::AQUA, Color::LIME, Color::VIVID_PINK];
        for i in 0..WANDERER_COUNT {
            let ctx = engine.context_mut();
            let cell = ctx.rng.random_range(0..arena.floor.len());
            let interval = ctx.rng.random_range(0.5..2.0);
            let mut entity = Entity::new(arena.floor[cell], Vec2::splat(UNIT_SIZE / 5.0))
                .with_name(format!("wanderer{i}"));
            entity.add_component(RigidBody::default(), ctx);
            entity.add_component(Wander::new(interval), ctx);
            entity.add_component(
                RenderRect::new(RenderMode::FillOnly, palette[i % palette.len()], Color::WHITE, 1),
                ctx,
            );
            engine.add_entity(actors, entity);
        }

        Ok(())
    }

    fn update(&mut self, engine: &mut Engine) {
        let dt = engine.time().delta_time();
        self.alive.advance(dt);
        if self.countdown.tick(dt) {
            log::info!("Demo time is up after {:.2}s", self.alive.elapsed());
            engine.quit();
        }
    }

    fn submit_render(&mut self, engine: &mut Engine) -> Result<()> {
        engine.present(&mut self.presenter)
    }

    fn cleanup(&mut self, _engine: &mut Engine) {
        self.alive.stop();
        log::info!(
            "Presented {} frames, last frame had {} ops",
            self.presenter.frames_presented,
            self.presenter.last_frame.len()
        );
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Topdown engine demo starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => EngineSettings::load_from_file(path),
        None => Ok(EngineSettings::default()),
    };
    let mut engine = match settings.and_then(Engine::setup) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut demo = Demo::new();
    let result = engine.run(&mut demo);
    engine.cleanup(&mut demo);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Demo failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_parses_walls_and_floor() {
        let arena = load_arena("###\n#.#\n###").unwrap();
        assert_eq!(arena.walls.len(), 8);
        assert_eq!(arena.floor, vec![Vec2::splat(UNIT_SIZE * 1.5)]);
        assert_eq!(arena.size, Vec2::splat(UNIT_SIZE * 3.0));
    }

    #[test]
    fn test_arena_rejects_unknown_cells() {
        assert!(load_arena("#?#").is_err());
        assert!(load_arena("###").is_err());
    }
}
