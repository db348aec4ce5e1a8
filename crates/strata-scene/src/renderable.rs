//! Renderable component and its per-instance model state.

use glam::Mat4;
use strata_assets::ModelHandle;

use crate::Entity;

/// Local bone transforms of one model instance. Identity is the bind pose.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    bones: Vec<Mat4>,
}

impl Pose {
    pub fn bones(&self) -> &[Mat4] {
        &self.bones
    }

    pub fn bones_mut(&mut self) -> &mut [Mat4] {
        &mut self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Resets to the bind pose for a skeleton of `bone_count` bones.
    pub fn reset(&mut self, bone_count: usize) {
        self.bones.clear();
        self.bones.resize(bone_count, Mat4::IDENTITY);
    }
}

/// A model placed in the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelInstance {
    pub(crate) model: Option<ModelHandle>,
    pub(crate) matrix: Mat4,
    pub(crate) pose: Pose,
}

impl ModelInstance {
    pub fn model(&self) -> Option<ModelHandle> {
        self.model
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Renderable {
    pub(crate) entity: Entity,
    pub(crate) instance: ModelInstance,
    pub(crate) layer_mask: u64,
    pub(crate) scale: f32,
}

impl Renderable {
    pub fn new(entity: Entity, matrix: Mat4) -> Self {
        Self {
            entity,
            instance: ModelInstance {
                model: None,
                matrix,
                pose: Pose::default(),
            },
            layer_mask: 1,
            scale: 1.0,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn instance(&self) -> &ModelInstance {
        &self.instance
    }

    pub fn layer_mask(&self) -> u64 {
        self.layer_mask
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}
