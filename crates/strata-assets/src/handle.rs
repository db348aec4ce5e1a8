//! Typed resource handles and readiness notifications.

/// Lifecycle state of a resource slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResourceState {
    /// No outstanding reference; the slot holds no data.
    #[default]
    Empty,
    /// Requested but data (or a dependency) has not arrived yet.
    Loading,
    /// Data is available.
    Ready,
    /// The loader reported a failure for this path.
    Failed,
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Slot index inside the owning store.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

typed_handle!(
    /// Handle to a loaded model.
    ModelHandle
);
typed_handle!(
    /// Handle to a loaded material.
    MaterialHandle
);
typed_handle!(
    /// Handle to a loaded texture.
    TextureHandle
);

/// Untyped resource identity, used for notifications and generic queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Model(ModelHandle),
    Material(MaterialHandle),
    Texture(TextureHandle),
}

impl From<ModelHandle> for ResourceId {
    fn from(h: ModelHandle) -> Self {
        ResourceId::Model(h)
    }
}

impl From<MaterialHandle> for ResourceId {
    fn from(h: MaterialHandle) -> Self {
        ResourceId::Material(h)
    }
}

impl From<TextureHandle> for ResourceId {
    fn from(h: TextureHandle) -> Self {
        ResourceId::Texture(h)
    }
}

/// Broadcast whenever a resource changes state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadinessEvent {
    pub resource: ResourceId,
    pub old_state: ResourceState,
    pub new_state: ResourceState,
}

impl ReadinessEvent {
    /// True when this event is the pending-to-ready transition.
    pub fn became_ready(&self) -> bool {
        self.old_state != ResourceState::Ready && self.new_state == ResourceState::Ready
    }
}
