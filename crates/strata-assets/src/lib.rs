//! Resource-manager collaborator: typed handles, ref-counted loading,
//! readiness notifications, and the texture/material/model data the scene
//! and terrain code read once a resource is ready.
//!
//! Loading mechanics (file IO, decoding) live outside this crate. The
//! [`AssetCache`] only tracks requests and accepts finished data through its
//! `provide_*` methods, broadcasting a [`ReadinessEvent`] for every state
//! transition.

mod cache;
mod error;
mod geometry;
mod handle;
mod material;
mod model;

pub use cache::{AssetCache, ResourceManager};
pub use error::AssetError;
pub use geometry::{Geometry, Mesh};
pub use handle::{
    MaterialHandle, ModelHandle, ReadinessEvent, ResourceId, ResourceState, TextureHandle,
};
pub use material::{Material, Texture};
pub use model::Model;
