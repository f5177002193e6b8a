//! Swept AABB physics
//!
//! Runs once per fixed tick over the rigid bodies. Each body is moved in
//! `iterations` sub-steps; every sub-step sweeps the body's box against all
//! static bodies (earliest contact wins) and against all other rigid bodies
//! (relative velocity, contact reported but not resolved).
//!
//! There is no broad phase: every sweep is O(bodies).

use glam::Vec2;

use crate::components::body::{BodyKind, HitBody, collides};
use crate::engine::{Collections, Context};
use crate::math::{Aabb, Hit};
use crate::world::EntityRef;

/// Advance every rigid body by one fixed step
pub fn step(collections: &mut Collections, ctx: &mut Context) {
    let iterations = ctx.physics.iterations.max(1);
    let vel_scale = (ctx.time.fixed_step() / iterations as f64) as f32;

    let bodies = collections.all_rigid_bodies().to_vec();
    for subject in bodies {
        for _ in 0..iterations {
            if !sweep_response(collections, ctx, subject, vel_scale) {
                break;
            }
            stationary_response(collections, ctx, subject);
        }
    }
}

/// Rigid body state needed for a sweep, if the entity still takes part
fn subject_state(collections: &Collections, subject: EntityRef) -> Option<(Aabb, Vec2, u8)> {
    let entity = collections.entity(subject)?;
    if !entity.can_be_used() || !entity.is_body_active() {
        return None;
    }
    let body = entity.rigid_body()?;
    Some((entity.aabb, body.vel, body.mask))
}

/// One sub-step of movement. Returns false once the subject stops taking
/// part in physics.
fn sweep_response(collections: &mut Collections, ctx: &mut Context, subject: EntityRef, vel_scale: f32) -> bool {
    let Some((aabb, vel, mask)) = subject_state(collections, subject) else {
        return false;
    };
    let scaled_vel = vel * vel_scale;

    let hit_static = sweep_static_bodies(collections, subject, &aabb, scaled_vel, mask);
    let hit_rigid = sweep_rigid_bodies(collections, subject, &aabb, vel, vel_scale, mask);

    if hit_rigid.is_hit {
        collections.notify_hit(subject, &hit_rigid, ctx);
        if subject_state(collections, subject).is_none() {
            return false;
        }
    }

    let Some(entity) = collections.entity_mut(subject) else {
        return false;
    };

    if !hit_static.is_hit {
        entity.aabb.pos += scaled_vel;
        return true;
    }

    entity.aabb.pos = hit_static.pos;
    if hit_static.normal.x != 0.0 {
        entity.aabb.pos.y += scaled_vel.y;
        if let Some(body) = entity.rigid_body_mut() {
            body.vel.x = 0.0;
        }
    } else if hit_static.normal.y != 0.0 {
        entity.aabb.pos.x += scaled_vel.x;
        if let Some(body) = entity.rigid_body_mut() {
            body.vel.y = 0.0;
        }
    }

    collections.notify_hit(subject, &hit_static, ctx);
    true
}

/// Earliest contact against any static body the subject's mask accepts
pub fn sweep_static_bodies(
    collections: &Collections,
    subject: EntityRef,
    aabb: &Aabb,
    scaled_vel: Vec2,
    mask: u8,
) -> Hit {
    let mut result = Hit::unresolved();

    for obstacle in collections.all_static_bodies().iter() {
        if obstacle == subject {
            continue;
        }
        let Some(entity) = collections.entity(obstacle) else {
            continue;
        };
        if !entity.can_be_used() || !entity.is_body_active() {
            continue;
        }
        let Some(body) = entity.static_body() else {
            continue;
        };
        let hit_body = HitBody {
            entity: obstacle,
            kind: BodyKind::Static,
            layer: body.layer,
        };
        update_sweep_result(&mut result, hit_body, aabb, &entity.aabb, scaled_vel, mask);
    }

    result
}

/// Earliest contact against any other rigid body, using relative velocity
pub fn sweep_rigid_bodies(
    collections: &Collections,
    subject: EntityRef,
    aabb: &Aabb,
    vel: Vec2,
    vel_scale: f32,
    mask: u8,
) -> Hit {
    let mut result = Hit::unresolved();

    for other in collections.all_rigid_bodies().iter() {
        if other == subject {
            continue;
        }
        let Some(entity) = collections.entity(other) else {
            continue;
        };
        if !entity.can_be_used() || !entity.is_body_active() {
            continue;
        }
        let Some(body) = entity.rigid_body() else {
            continue;
        };
        let hit_body = HitBody {
            entity: other,
            kind: BodyKind::Rigid,
            layer: body.layer,
        };
        let relative = (vel - body.vel) * vel_scale;
        update_sweep_result(&mut result, hit_body, aabb, &entity.aabb, relative, mask);
    }

    result
}

/// Fold one obstacle into the running sweep result.
///
/// Earlier time wins. On equal times the candidate wins only if its normal
/// lies on the axis with the larger velocity component.
pub fn update_sweep_result(
    result: &mut Hit,
    hit_body: HitBody,
    subject: &Aabb,
    obstacle: &Aabb,
    vel: Vec2,
    subject_mask: u8,
) {
    if !collides(subject_mask, hit_body.layer) {
        return;
    }

    let sum = obstacle.inflated(subject.half_size);
    let mut hit = sum.ray_intersect(subject.pos, vel);
    if !hit.is_hit {
        return;
    }
    hit.hit_body = Some(hit_body);

    let replace = if hit.time < result.time {
        true
    } else if hit.time == result.time {
        (vel.x.abs() > vel.y.abs() && hit.normal.x != 0.0)
            || (vel.y.abs() > vel.x.abs() && hit.normal.y != 0.0)
    } else {
        false
    };

    if replace {
        *result = hit;
    }
}

/// Check for resting overlap with static bodies after a sub-step.
///
/// The correction is only applied when `resolve_resting_penetration` is set.
fn stationary_response(collections: &mut Collections, ctx: &Context, subject: EntityRef) {
    let Some((aabb, _, mask)) = subject_state(collections, subject) else {
        return;
    };

    let obstacles: Vec<Aabb> = collections
        .all_static_bodies()
        .iter()
        .filter_map(|obstacle| {
            let entity = collections.entity(obstacle)?;
            if !entity.can_be_used() || !entity.is_body_active() {
                return None;
            }
            let body = entity.static_body()?;
            collides(mask, body.layer).then_some(entity.aabb)
        })
        .collect();

    let resolve = ctx.physics.resolve_resting_penetration;
    let Some(entity) = collections.entity_mut(subject) else {
        return;
    };
    let mut current = aabb;

    for obstacle in obstacles {
        let diff = Aabb::minkowski_difference(&obstacle, &current);
        if !diff.contains_origin() {
            continue;
        }
        let penetration = diff.penetration();
        if penetration == Vec2::ZERO {
            continue;
        }
        if resolve {
            current.pos += penetration;
            entity.aabb.pos = current.pos;
        } else {
            log::trace!("Resting penetration {} of {} left unresolved", penetration, subject);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{RigidBody, StaticBody};
    use crate::engine::EngineStage;
    use crate::world::{CollectionId, Entity};

    const FAST: Vec2 = Vec2::new(100.0, 0.0);

    fn world() -> (Collections, Context, CollectionId) {
        let mut collections = Collections::new();
        let ctx = Context::default();
        let id = collections.create("world");
        (collections, ctx, id)
    }

    fn add_static(collections: &mut Collections, ctx: &mut Context, id: CollectionId, pos: Vec2, layer: u8) -> EntityRef {
        let mut e = Entity::new(pos, Vec2::splat(8.0));
        e.add_component(StaticBody::new(layer), ctx);
        collections.add(id, e, ctx).expect("collection exists")
    }

    fn add_rigid(
        collections: &mut Collections,
        ctx: &mut Context,
        id: CollectionId,
        pos: Vec2,
        body: RigidBody,
    ) -> EntityRef {
        let mut e = Entity::new(pos, Vec2::splat(8.0));
        e.add_component(body, ctx);
        collections.add(id, e, ctx).expect("collection exists")
    }

    fn run_tick(collections: &mut Collections, ctx: &mut Context) {
        ctx.set_stage(EngineStage::FixedUpdate);
        step(collections, ctx);
    }

    #[test]
    fn test_static_contact_snaps_and_stops_normal_axis() {
        let (mut collections, mut ctx, id) = world();
        add_static(&mut collections, &mut ctx, id, Vec2::new(17.0, 0.0), 0b10);
        let mover = add_rigid(
            &mut collections,
            &mut ctx,
            id,
            Vec2::ZERO,
            RigidBody::new(0b01, 0b1111).with_velocity(FAST),
        );

        run_tick(&mut collections, &mut ctx);

        let entity = collections.entity(mover).expect("mover exists");
        let vel = entity.rigid_body().expect("rigid body").vel;
        assert_eq!(vel.x, 0.0);
        assert_eq!(vel.y, 0.0);
        assert!((entity.aabb.pos.x - 1.0).abs() < 1e-4, "x = {}", entity.aabb.pos.x);
    }

    #[test]
    fn test_sliding_keeps_tangential_motion() {
        let (mut collections, mut ctx, id) = world();
        add_static(&mut collections, &mut ctx, id, Vec2::new(17.0, 0.0), 0b10);
        let mover = add_rigid(
            &mut collections,
            &mut ctx,
            id,
            Vec2::ZERO,
            RigidBody::new(0b01, 0b10).with_velocity(Vec2::new(100.0, 24.0)),
        );

        run_tick(&mut collections, &mut ctx);

        let entity = collections.entity(mover).expect("mover exists");
        let body = entity.rigid_body().expect("rigid body");
        assert_eq!(body.vel.x, 0.0);
        assert_eq!(body.vel.y, 24.0);
        // 0.1 per sub-step, plus the partial step up to contact
        assert!((entity.aabb.pos.y - 0.44).abs() < 1e-4, "y = {}", entity.aabb.pos.y);
        assert!((entity.aabb.pos.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_mask_filters_layers() {
        let (mut collections, mut ctx, id) = world();
        add_static(&mut collections, &mut ctx, id, Vec2::new(17.0, 0.0), 0b10);
        let mover = add_rigid(
            &mut collections,
            &mut ctx,
            id,
            Vec2::ZERO,
            RigidBody::new(0b01, 0b01).with_velocity(FAST),
        );

        run_tick(&mut collections, &mut ctx);

        let entity = collections.entity(mover).expect("mover exists");
        assert_eq!(entity.rigid_body().map(|b| b.vel), Some(FAST));
        assert!((entity.aabb.pos.x - 100.0 / 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_rigid_contact_reports_without_response() {
        let (mut collections, mut ctx, id) = world();
        let a = add_rigid(
            &mut collections,
            &mut ctx,
            id,
            Vec2::ZERO,
            RigidBody::new(0b01, 0b01).with_velocity(FAST),
        );
        add_rigid(
            &mut collections,
            &mut ctx,
            id,
            Vec2::new(17.0, 0.0),
            RigidBody::new(0b01, 0b01),
        );

        let hit = {
            let entity = collections.entity(a).expect("a exists");
            sweep_rigid_bodies(&collections, a, &entity.aabb, FAST, 1.0 / 240.0 * 3.0, 0b01)
        };
        assert!(hit.is_hit);
        assert_eq!(hit.hit_body.map(|b| b.kind), Some(BodyKind::Rigid));

        run_tick(&mut collections, &mut ctx);
        // Passes straight through: no response for rigid-rigid contacts
        let entity = collections.entity(a).expect("a exists");
        assert_eq!(entity.rigid_body().map(|b| b.vel), Some(FAST));
        assert!((entity.aabb.pos.x - 100.0 / 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_equal_time_tie_prefers_fast_axis() {
        // Moving diagonally into a corner formed by two walls
        let subject = Aabb::new(Vec2::ZERO, Vec2::splat(1.0));
        let right = Aabb::new(Vec2::new(4.0, 0.0), Vec2::new(1.0, 10.0));
        let above = Aabb::new(Vec2::new(0.0, 4.0), Vec2::new(10.0, 1.0));
        let vel = Vec2::new(4.0, 4.0);

        let body = |layer: u8| HitBody {
            entity: EntityRef::new(
                CollectionId(0),
                crate::world::EntityId {
                    index: layer as u32,
                    generation: 0,
                },
            ),
            kind: BodyKind::Static,
            layer,
        };

        let mut result = Hit::unresolved();
        update_sweep_result(&mut result, body(0b01), &subject, &right, vel, 0xFF);
        let first_time = result.time;
        update_sweep_result(&mut result, body(0b10), &subject, &above, vel, 0xFF);
        // Equal speeds on both axes: the later candidate does not replace
        assert_eq!(result.time, first_time);
        assert_eq!(result.hit_body.map(|b| b.layer), Some(0b01));

        // Both contacts at t = 0.5 again, now faster along y
        let fast_y = Vec2::new(4.0, 4.5);
        let higher = Aabb::new(Vec2::new(0.0, 4.25), Vec2::new(10.0, 1.0));
        let mut result = Hit::unresolved();
        update_sweep_result(&mut result, body(0b01), &subject, &right, fast_y, 0xFF);
        assert_eq!(result.time, 0.5);
        update_sweep_result(&mut result, body(0b10), &subject, &higher, fast_y, 0xFF);
        assert_eq!(result.time, 0.5);
        assert_eq!(result.hit_body.map(|b| b.layer), Some(0b10));
        assert_eq!(result.normal, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_resting_penetration_only_resolved_when_enabled() {
        for resolve in [false, true] {
            let (mut collections, mut ctx, id) = world();
            ctx.physics.resolve_resting_penetration = resolve;
            add_static(&mut collections, &mut ctx, id, Vec2::new(12.0, 0.0), 0b01);
            let mover = add_rigid(&mut collections, &mut ctx, id, Vec2::ZERO, RigidBody::default());

            run_tick(&mut collections, &mut ctx);

            let x = collections.entity(mover).map(|e| e.aabb.pos.x);
            if resolve {
                // Pushed out to touching: 12 - 16
                assert_eq!(x, Some(-4.0));
            } else {
                assert_eq!(x, Some(0.0));
            }
        }
    }

    #[test]
    fn test_inactive_bodies_are_ignored() {
        let (mut collections, mut ctx, id) = world();
        let wall = add_static(&mut collections, &mut ctx, id, Vec2::new(17.0, 0.0), 0b01);
        let mover = add_rigid(
            &mut collections,
            &mut ctx,
            id,
            Vec2::ZERO,
            RigidBody::default().with_velocity(FAST),
        );
        collections.set_active(wall, false, &mut ctx);

        run_tick(&mut collections, &mut ctx);
        let entity = collections.entity(mover).expect("mover exists");
        assert!((entity.aabb.pos.x - 100.0 / 60.0).abs() < 1e-4);
    }
}
