//! Render op buffers

use glam::Vec2;

use super::Color;
use crate::error::Result;

/// What to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOpKind {
    /// Filled rectangle from its top-left corner
    RectFill { min: Vec2, size: Vec2, color: Color },
    /// Closed polyline around a rectangle (first point repeated last)
    RectOutline { points: [Vec2; 5], color: Color },
}

/// A single deferred draw call with its ordering key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOp {
    /// Lower orders are executed first
    pub order: i32,
    pub kind: RenderOpKind,
}

impl RenderOp {
    pub fn rect_fill(min: Vec2, size: Vec2, color: Color, order: i32) -> Self {
        Self {
            order,
            kind: RenderOpKind::RectFill { min, size, color },
        }
    }

    /// Outline through the corners `min` and `max`
    pub fn rect_outline(min: Vec2, max: Vec2, color: Color, order: i32) -> Self {
        let points = [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
            min,
        ];
        Self {
            order,
            kind: RenderOpKind::RectOutline { points, color },
        }
    }
}

/// Double-buffered render op lists.
///
/// Components push into the preparing buffer; `swap` publishes it and
/// clears the other one for the next frame.
#[derive(Debug, Default)]
pub struct RenderBuffers {
    buffers: [Vec<RenderOp>; 2],
    rendering: usize,
}

impl RenderBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn preparing_index(&self) -> usize {
        1 - self.rendering
    }

    pub fn push(&mut self, op: RenderOp) {
        let index = self.preparing_index();
        self.buffers[index].push(op);
    }

    pub fn swap(&mut self) {
        self.rendering = self.preparing_index();
        let next = self.preparing_index();
        self.buffers[next].clear();
    }

    /// Ops published by the last swap
    pub fn rendering(&self) -> &[RenderOp] {
        &self.buffers[self.rendering]
    }

    /// Ops pushed since the last swap
    pub fn preparing(&self) -> &[RenderOp] {
        &self.buffers[self.preparing_index()]
    }

    /// Stable sort of the published buffer by order
    pub fn sort_rendering(&mut self) {
        self.buffers[self.rendering].sort_by_key(|op| op.order);
    }
}

/// Presentation collaborator. Implemented by the application's graphics layer.
pub trait Presenter {
    fn clear(&mut self, color: Color);
    fn execute(&mut self, op: &RenderOp);
    fn present(&mut self) -> Result<()>;
}

/// Headless presenter that keeps the last presented frame
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pending: Vec<RenderOp>,
    clear_color: Option<Color>,
    /// Ops of the most recently presented frame, in execution order
    pub last_frame: Vec<RenderOp>,
    pub frames_presented: u64,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_clear_color(&self) -> Option<Color> {
        self.clear_color
    }
}

impl Presenter for RecordingPresenter {
    fn clear(&mut self, color: Color) {
        self.clear_color = Some(color);
        self.pending.clear();
    }

    fn execute(&mut self, op: &RenderOp) {
        self.pending.push(*op);
    }

    fn present(&mut self) -> Result<()> {
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames_presented += 1;
        Ok(())
    }
}
