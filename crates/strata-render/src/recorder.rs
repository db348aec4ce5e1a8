//! A [`RenderBackend`] that records commands instead of executing them.

use strata_assets::{Geometry, MaterialHandle};

use crate::{RenderBackend, Uniform};

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    ApplyMaterial(MaterialHandle),
    SetUniform { name: String, value: Uniform },
    DrawIndexed { first_index: u32, index_count: u32 },
}

/// Records every backend call in submission order.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<RenderCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of recorded draw calls.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawIndexed { .. }))
            .count()
    }

    /// Total number of indices submitted across all draws.
    pub fn index_total(&self) -> u64 {
        self.commands
            .iter()
            .map(|c| match c {
                RenderCommand::DrawIndexed { index_count, .. } => u64::from(*index_count),
                _ => 0,
            })
            .sum()
    }

    /// The most recent value set for `name`, if any.
    pub fn last_uniform(&self, name: &str) -> Option<Uniform> {
        self.commands.iter().rev().find_map(|c| match c {
            RenderCommand::SetUniform { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Clears the recording, typically at the start of a frame.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderBackend for CommandRecorder {
    fn apply_material(&mut self, material: MaterialHandle) {
        self.commands.push(RenderCommand::ApplyMaterial(material));
    }

    fn set_uniform(&mut self, name: &str, value: Uniform) {
        self.commands.push(RenderCommand::SetUniform {
            name: name.to_string(),
            value,
        });
    }

    fn draw_indexed(&mut self, geometry: &Geometry, first_index: u32, index_count: u32) {
        if first_index + index_count > geometry.index_count() {
            tracing::warn!(
                "Draw range {}..{} exceeds geometry index count {}",
                first_index,
                first_index + index_count,
                geometry.index_count()
            );
        }
        self.commands.push(RenderCommand::DrawIndexed {
            first_index,
            index_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_records_in_order() {
        let geometry = Geometry::new(vec![Vec3::ZERO; 3], vec![0, 1, 2]);
        let mut rec = CommandRecorder::new();
        rec.apply_material(MaterialHandle(3));
        rec.set_uniform("quad_size", Uniform::Float(64.0));
        rec.draw_indexed(&geometry, 0, 3);

        assert_eq!(rec.commands().len(), 3);
        assert_eq!(rec.commands()[0], RenderCommand::ApplyMaterial(MaterialHandle(3)));
        assert_eq!(rec.draw_count(), 1);
        assert_eq!(rec.index_total(), 3);
    }

    #[test]
    fn test_last_uniform_wins() {
        let mut rec = CommandRecorder::new();
        rec.set_uniform("camera_pos", Vec3::ONE.into());
        rec.set_uniform("camera_pos", Vec3::X.into());
        assert_eq!(rec.last_uniform("camera_pos"), Some(Uniform::Vec3(Vec3::X)));
        assert_eq!(rec.last_uniform("map_size"), None);
    }

    #[test]
    fn test_clear() {
        let mut rec = CommandRecorder::new();
        rec.apply_material(MaterialHandle(0));
        rec.clear();
        assert!(rec.commands().is_empty());
    }
}
