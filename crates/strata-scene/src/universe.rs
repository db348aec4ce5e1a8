//! Entity/transform graph consumed by the render scene.

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::{Mat4, Vec3};

use crate::{Component, ComponentKind, Entity};

#[derive(Debug, Default)]
struct EntityData {
    matrix: Mat4,
    components: Vec<Component>,
}

/// Flat list of entities, each with a world matrix and the components
/// attached to it.
///
/// Moving an entity broadcasts it on every channel returned by
/// [`subscribe_moved`](Self::subscribe_moved).
#[derive(Default)]
pub struct Universe {
    entities: Vec<EntityData>,
    moved: Vec<Sender<Entity>>,
    created: Vec<Sender<Component>>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_entity(&mut self) -> Entity {
        self.create_entity_with_matrix(Mat4::IDENTITY)
    }

    pub fn create_entity_at(&mut self, position: Vec3) -> Entity {
        self.create_entity_with_matrix(Mat4::from_translation(position))
    }

    pub fn create_entity_with_matrix(&mut self, matrix: Mat4) -> Entity {
        let entity = Entity(self.entities.len() as u32);
        self.entities.push(EntityData {
            matrix,
            components: Vec::new(),
        });
        entity
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        (entity.0 as usize) < self.entities.len()
    }

    pub fn matrix(&self, entity: Entity) -> Option<Mat4> {
        self.entities.get(entity.0 as usize).map(|e| e.matrix)
    }

    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.matrix(entity).map(|m| m.w_axis.truncate())
    }

    /// Replaces the entity's world matrix and notifies move subscribers.
    pub fn set_matrix(&mut self, entity: Entity, matrix: Mat4) {
        let Some(data) = self.entities.get_mut(entity.0 as usize) else {
            tracing::warn!("Universe::set_matrix on unknown entity {}", entity.0);
            return;
        };
        data.matrix = matrix;
        self.moved.retain(|tx| tx.send(entity).is_ok());
    }

    /// Moves the entity, keeping its rotation and scale.
    pub fn set_position(&mut self, entity: Entity, position: Vec3) {
        if let Some(mut matrix) = self.matrix(entity) {
            matrix.w_axis = position.extend(1.0);
            self.set_matrix(entity, matrix);
        }
    }

    pub fn components(&self, entity: Entity) -> &[Component] {
        self.entities
            .get(entity.0 as usize)
            .map(|e| e.components.as_slice())
            .unwrap_or(&[])
    }

    /// Records that slot `index` of the `kind` store belongs to `entity`.
    /// Does not fire a creation event.
    pub fn attach_component(
        &mut self,
        entity: Entity,
        kind: ComponentKind,
        index: usize,
    ) -> Component {
        let component = Component::new(entity, kind, index);
        if let Some(data) = self.entities.get_mut(entity.0 as usize) {
            data.components.push(component);
        } else {
            tracing::warn!("Attaching {} to unknown entity {}", kind, entity.0);
        }
        component
    }

    /// Removes every attachment of `kind` from all entities.
    pub fn detach_kind(&mut self, kind: ComponentKind) {
        for data in &mut self.entities {
            data.components.retain(|c| c.kind != kind);
        }
    }

    pub fn notify_component_created(&mut self, component: Component) {
        self.created.retain(|tx| tx.send(component).is_ok());
    }

    pub fn subscribe_moved(&mut self) -> Receiver<Entity> {
        let (tx, rx) = unbounded();
        self.moved.push(tx);
        rx
    }

    pub fn subscribe_component_created(&mut self) -> Receiver<Component> {
        let (tx, rx) = unbounded();
        self.created.push(tx);
        rx
    }
}
