//! Resource cache error types.

/// Errors returned when feeding data into the [`AssetCache`](crate::AssetCache).
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Data was provided for a path nobody requested.
    #[error("resource was never requested: {0}")]
    NotRequested(String),

    /// Data was provided for a slot that has since been fully unloaded.
    #[error("resource is no longer referenced: {0}")]
    Unreferenced(String),
}
