//! Scene persistence error types.

/// Errors that can occur when loading or saving a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The stream has no entry with the expected name.
    #[error("missing scene entry `{0}`")]
    MissingEntry(String),

    /// An array ran out of items while a record was still being read.
    #[error("array `{0}` ended before all fields were read")]
    UnexpectedEnd(String),

    /// An array holds more items than its count implies.
    #[error("array `{name}` has {remaining} unread items")]
    TrailingItems { name: String, remaining: usize },

    #[error("expected {expected} field, found {found}")]
    FieldType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid count {0}")]
    InvalidCount(i32),

    /// A record names an entity the universe does not contain.
    #[error("scene references unknown entity {0}")]
    UnknownEntity(u32),

    #[error("unknown light type {0}")]
    UnknownLightType(i32),

    #[error("failed to read scene: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write scene: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("failed to parse scene: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("failed to serialize scene: {0}")]
    SerializeError(#[source] ron::Error),
}
