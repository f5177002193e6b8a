//! Renderable components

use crate::engine::Context;
use crate::math::Aabb;
use crate::render::Color;
use crate::world::{Component, ComponentType, EngineComponentType, Entity};

/// Which parts of a shape to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    None,
    #[default]
    FillOnly,
    OutlineOnly,
    Both,
}

/// Axis-aligned rectangle covering the entity's visual box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRect {
    pub mode: RenderMode,
    pub fill_color: Color,
    pub outline_color: Color,
    pub order: i32,
}

impl Default for RenderRect {
    fn default() -> Self {
        Self::new(RenderMode::FillOnly, Color::WHITE, Color::WHITE, 0)
    }
}

impl RenderRect {
    pub fn new(mode: RenderMode, fill_color: Color, outline_color: Color, order: i32) -> Self {
        Self {
            mode,
            fill_color,
            outline_color,
            order,
        }
    }
}

/// Move a world box into camera space, or `None` if it is off screen.
/// Without a camera the box is drawn in world space.
pub fn to_camera_space(aabb: Aabb, view: Option<Aabb>) -> Option<Aabb> {
    let Some(view) = view else {
        return Some(aabb);
    };
    if !Aabb::check_intersection(&aabb, &view) {
        return None;
    }
    Some(Aabb {
        pos: aabb.pos - view.min(),
        ..aabb
    })
}

impl Component for RenderRect {
    fn component_type(&self) -> ComponentType {
        EngineComponentType::RenderRect.into()
    }

    fn render(&mut self, entity: &mut Entity, ctx: &mut Context) {
        if self.mode == RenderMode::None {
            return;
        }
        let Some(aabb) = to_camera_space(entity.visual_aabb, ctx.camera.view()) else {
            return;
        };

        if self.mode != RenderMode::OutlineOnly {
            ctx.push_render_op(aabb.fill_op(self.fill_color, self.order));
        }
        if self.mode != RenderMode::FillOnly {
            ctx.push_render_op(aabb.outline_op(self.outline_color, self.order));
        }
    }
}
