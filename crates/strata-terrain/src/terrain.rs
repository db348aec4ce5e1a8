//! Terrain object: base patch, material binding and the quadtree built from
//! the material's heightmap.

use glam::Vec3;
use strata_assets::{
    Geometry, MaterialHandle, Mesh, ReadinessEvent, ResourceId, ResourceManager,
};
use strata_render::{RenderBackend, Uniform};

use crate::{QuadTree, generate_grid};

/// Texture slot holding the heightmap in a terrain material.
const HEIGHTMAP_SLOT: usize = 0;

/// A heightmapped terrain.
///
/// The quadtree only exists once the bound material is ready; until then the
/// terrain renders nothing.
#[derive(Debug)]
pub struct Terrain {
    geometry: Geometry,
    mesh: Mesh,
    material: Option<MaterialHandle>,
    quadtree: Option<QuadTree>,
    width: u32,
    height: u32,
    xz_scale: f32,
    y_scale: f32,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new()
    }
}

impl Terrain {
    /// Creates a terrain with the base patch generated and no material.
    pub fn new() -> Self {
        let geometry = generate_grid();
        let mesh = Mesh::new("terrain", None, 0, geometry.index_count());
        Self {
            geometry,
            mesh,
            material: None,
            quadtree: None,
            width: 0,
            height: 0,
            xz_scale: 1.0,
            y_scale: 1.0,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    pub fn quadtree(&self) -> Option<&QuadTree> {
        self.quadtree.as_ref()
    }

    /// Heightmap width read when the material became ready, 0 before.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Heightmap height read when the material became ready, 0 before.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn xz_scale(&self) -> f32 {
        self.xz_scale
    }

    pub fn set_xz_scale(&mut self, scale: f32) {
        self.xz_scale = scale;
    }

    pub fn y_scale(&self) -> f32 {
        self.y_scale
    }

    pub fn set_y_scale(&mut self, scale: f32) {
        self.y_scale = scale;
    }

    /// Binds the material at `path`, releasing the previous one.
    ///
    /// Readiness of the old material is no longer tracked; the existing
    /// quadtree stays in place until the new material is ready.
    pub fn set_material(&mut self, assets: &mut impl ResourceManager, path: &str) {
        // Load before releasing so rebinding the same path keeps it resident.
        let handle = assets.load_material(path);
        self.release(assets);
        self.material = Some(handle);
        self.mesh.material = Some(handle);
        // A material shared with another terrain may already be loaded, in
        // which case no readiness transition will follow.
        if assets.is_ready(handle.into()) {
            self.on_material_ready(&*assets);
        }
    }

    /// Drops the material reference held by this terrain.
    pub fn release(&mut self, assets: &mut impl ResourceManager) {
        if let Some(old) = self.material.take() {
            assets.unload(old.into());
        }
        self.mesh.material = None;
    }

    /// Path of the bound material, empty when none is bound.
    pub fn material_path<'a>(&self, assets: &'a impl ResourceManager) -> &'a str {
        self.material
            .and_then(|h| assets.path(h.into()))
            .unwrap_or("")
    }

    /// True when a material is bound and ready.
    pub fn is_material_ready(&self, assets: &impl ResourceManager) -> bool {
        self.material
            .is_some_and(|h| assets.is_ready(ResourceId::Material(h)))
    }

    /// Reacts to a resource notification. Events for other resources,
    /// including a previously bound material, are ignored.
    ///
    /// Returns true when the quadtree was rebuilt.
    pub fn handle_event(&mut self, event: &ReadinessEvent, assets: &impl ResourceManager) -> bool {
        match self.material {
            Some(handle) if event.resource == ResourceId::Material(handle) && event.became_ready() => {
                self.on_material_ready(assets)
            }
            _ => false,
        }
    }

    fn on_material_ready(&mut self, assets: &impl ResourceManager) -> bool {
        let heightmap = self
            .material
            .and_then(|h| assets.material(h))
            .and_then(|m| m.texture(HEIGHTMAP_SLOT))
            .and_then(|t| assets.texture(t));
        let Some(heightmap) = heightmap else {
            tracing::warn!("Terrain material is ready but has no heightmap texture");
            return false;
        };
        self.width = heightmap.width();
        self.height = heightmap.height();
        self.generate_quadtree(self.width as f32);
        true
    }

    /// Replaces the quadtree with a fresh one covering `size` units.
    pub fn generate_quadtree(&mut self, size: f32) {
        let tree = QuadTree::new(size);
        tracing::debug!(
            "Built terrain quadtree: size {}, {} nodes, depth {}",
            size,
            tree.len(),
            tree.depth()
        );
        self.quadtree = Some(tree);
    }

    /// Submits the terrain for a camera at `camera_pos`, already expressed in
    /// terrain space (divided by the XZ scale).
    ///
    /// Returns the number of draws issued.
    pub fn render(&self, backend: &mut impl RenderBackend, camera_pos: Vec3) -> usize {
        let (Some(tree), Some(material)) = (self.quadtree.as_ref(), self.material) else {
            return 0;
        };
        backend.apply_material(material);
        backend.set_uniform("map_size", Uniform::Float(tree.size()));
        backend.set_uniform("camera_pos", Uniform::Vec3(camera_pos));

        let draws = tree.select(camera_pos, self.mesh.index_count);
        for draw in &draws {
            backend.set_uniform("morph_const", Uniform::Vec3(draw.morph_const));
            backend.set_uniform("quad_size", Uniform::Float(draw.quad_size));
            backend.set_uniform("quad_min", Uniform::Vec3(draw.quad_min));
            backend.draw_indexed(
                &self.geometry,
                self.mesh.first_index + draw.first_index,
                draw.index_count,
            );
        }
        draws.len()
    }
}
