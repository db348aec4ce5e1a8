//! Renderer collaborator interface.
//!
//! The scene and terrain code never talk to a GPU API directly; they bind
//! materials, set named uniforms and submit index ranges through
//! [`RenderBackend`]. [`CommandRecorder`] captures those calls for replay,
//! inspection and tests.

mod backend;
mod recorder;

pub use backend::{RenderBackend, Uniform};
pub use recorder::{CommandRecorder, RenderCommand};
