//! Scene component registry: the renderable, light, camera and terrain state
//! a render pipeline queries every frame.
//!
//! [`RenderScene`] owns dense per-kind stores addressed by [`Component`]
//! handles. Entities and their transforms live in the [`Universe`]; the
//! scene mirrors transforms of the entities it renders by draining the
//! universe's move notifications, and picks up resource readiness from the
//! resource manager's channel. Both are drained on the frame thread.

mod camera;
mod debug;
mod entity;
mod error;
mod light;
mod renderable;
mod scene;
mod serialize;
mod universe;

pub use camera::{Camera, MAX_SLOT_LENGTH};
pub use debug::{DebugLine, DebugLines};
pub use entity::{Component, ComponentKind, Entity};
pub use error::SceneError;
pub use light::{Light, LightType};
pub use renderable::{ModelInstance, Pose, Renderable};
pub use scene::{RayHit, RenderScene, RenderableInfo, TerrainInfo};
pub use serialize::{FieldCursor, FieldStream, FieldValue, SceneReader, SceneWriter};
pub use universe::Universe;
