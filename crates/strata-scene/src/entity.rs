//! Entity and component handles.

use std::fmt;

/// Opaque handle into the [`Universe`](crate::Universe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub u32);

impl Entity {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The closed set of component kinds owned by the render scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Renderable,
    Light,
    Camera,
    Terrain,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Renderable,
        ComponentKind::Light,
        ComponentKind::Camera,
        ComponentKind::Terrain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Renderable => "renderable",
            ComponentKind::Light => "light",
            ComponentKind::Camera => "camera",
            ComponentKind::Terrain => "terrain",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to one slot of a per-kind store.
///
/// The index is only valid until the next resize of that kind's store
/// (scene deserialization).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Component {
    pub entity: Entity,
    pub kind: ComponentKind,
    pub index: usize,
}

impl Component {
    pub fn new(entity: Entity, kind: ComponentKind, index: usize) -> Self {
        Self {
            entity,
            kind,
            index,
        }
    }
}
