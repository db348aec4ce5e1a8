//! Texture and material payloads.

use crate::TextureHandle;

/// Dimensions of a loaded texture. Pixel data stays with the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
}

impl Texture {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// A material binds a list of textures. A material only becomes ready once
/// every texture it references is ready.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Material {
    pub textures: Vec<TextureHandle>,
}

impl Material {
    pub fn new(textures: Vec<TextureHandle>) -> Self {
        Self { textures }
    }

    /// The first texture slot. Terrains read it as the heightmap.
    pub fn texture(&self, slot: usize) -> Option<TextureHandle> {
        self.textures.get(slot).copied()
    }
}
