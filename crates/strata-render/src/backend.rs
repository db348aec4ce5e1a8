use glam::{Mat4, Vec3};
use strata_assets::{Geometry, MaterialHandle};

/// A shader parameter value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform {
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

impl From<f32> for Uniform {
    fn from(v: f32) -> Self {
        Uniform::Float(v)
    }
}

impl From<Vec3> for Uniform {
    fn from(v: Vec3) -> Self {
        Uniform::Vec3(v)
    }
}

impl From<Mat4> for Uniform {
    fn from(v: Mat4) -> Self {
        Uniform::Mat4(v)
    }
}

/// Minimal draw interface consumed by terrain rendering.
pub trait RenderBackend {
    /// Binds a material (shader + textures) for subsequent draws.
    fn apply_material(&mut self, material: MaterialHandle);

    /// Sets a named uniform on the currently bound shader.
    fn set_uniform(&mut self, name: &str, value: Uniform);

    /// Draws `index_count` indices of `geometry` starting at `first_index`.
    fn draw_indexed(&mut self, geometry: &Geometry, first_index: u32, index_count: u32);
}
