//! Render operations and the presentation seam
//!
//! Components never draw. They push `RenderOp`s into the preparing buffer
//! during the Render stage; after the buffers swap, the application hands the
//! finished buffer to a `Presenter`.

pub mod color;
pub mod op;

pub use color::Color;
pub use op::{Presenter, RecordingPresenter, RenderBuffers, RenderOp, RenderOpKind};
