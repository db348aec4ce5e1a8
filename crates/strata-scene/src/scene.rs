//! The render scene: dense per-kind component stores plus the queries a
//! render pipeline runs every frame.

use crossbeam_channel::Receiver;
use glam::{Mat4, Vec3};
use strata_assets::{
    Geometry, MaterialHandle, Mesh, Model, ModelHandle, ReadinessEvent, ResourceId,
    ResourceManager,
};
use strata_math::{Ray, ray_sphere_intersection};
use strata_render::RenderBackend;
use strata_terrain::Terrain;

use crate::camera::Camera;
use crate::debug::DebugLines;
use crate::light::{Light, LightType};
use crate::renderable::{ModelInstance, Pose, Renderable};
use crate::serialize::{SceneReader, SceneWriter};
use crate::{Component, ComponentKind, DebugLine, Entity, SceneError, Universe};

/// Number of floats in a serialized renderable matrix.
const MATRIX_FLOATS: usize = 16;

#[derive(Debug)]
struct TerrainComponent {
    entity: Entity,
    matrix: Mat4,
    layer_mask: u64,
    terrain: Terrain,
}

/// Nearest renderable hit by [`RenderScene::cast_ray`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the (normalized) ray direction.
    pub t: f32,
    pub component: Component,
}

/// One drawable submesh of a renderable.
#[derive(Clone, Copy, Debug)]
pub struct RenderableInfo<'a> {
    pub component: Component,
    pub mesh: &'a Mesh,
    pub geometry: &'a Geometry,
    pub pose: &'a Pose,
    pub instance: &'a ModelInstance,
    pub model: &'a Model,
    pub matrix: &'a Mat4,
    pub scale: f32,
}

/// Per-frame terrain description handed to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainInfo {
    pub component: Component,
    pub material: Option<MaterialHandle>,
    pub xz_scale: f32,
    pub y_scale: f32,
    pub matrix: Mat4,
}

impl TerrainInfo {
    pub fn entity(&self) -> Entity {
        self.component.entity
    }

    pub fn index(&self) -> usize {
        self.component.index
    }
}

/// Scene registry for renderables, lights, cameras and terrains.
///
/// Component slots are never freed individually; a store only shrinks when
/// [`deserialize`](Self::deserialize) replaces it.
pub struct RenderScene {
    renderables: Vec<Renderable>,
    lights: Vec<Light>,
    cameras: Vec<Camera>,
    terrains: Vec<TerrainComponent>,
    debug_lines: DebugLines,
    moved: Receiver<Entity>,
    readiness: Receiver<ReadinessEvent>,
}

/// Renderable record read from a scene, committed once the whole scene
/// parsed.
struct StagedRenderable {
    entity: Entity,
    path: String,
    scale: f32,
    matrix: Mat4,
}

struct StagedTerrain {
    entity: Entity,
    layer_mask: u64,
    material: String,
    xz_scale: f32,
    y_scale: f32,
}

impl RenderScene {
    /// Creates an empty scene listening to `universe` moves and to the
    /// resource manager's `readiness` channel.
    pub fn new(universe: &mut Universe, readiness: Receiver<ReadinessEvent>) -> Self {
        Self {
            renderables: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
            terrains: Vec::new(),
            debug_lines: DebugLines::new(),
            moved: universe.subscribe_moved(),
            readiness,
        }
    }

    pub fn count(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Renderable => self.renderables.len(),
            ComponentKind::Light => self.lights.len(),
            ComponentKind::Camera => self.cameras.len(),
            ComponentKind::Terrain => self.terrains.len(),
        }
    }

    /// Appends a default-initialized component of `kind` to `entity` and
    /// broadcasts its creation.
    pub fn create_component(
        &mut self,
        universe: &mut Universe,
        kind: ComponentKind,
        entity: Entity,
    ) -> Component {
        let matrix = universe.matrix(entity).unwrap_or(Mat4::IDENTITY);
        let index = match kind {
            ComponentKind::Renderable => {
                self.renderables.push(Renderable::new(entity, matrix));
                self.renderables.len() - 1
            }
            ComponentKind::Light => {
                self.lights.push(Light::new(entity));
                self.lights.len() - 1
            }
            ComponentKind::Camera => {
                self.cameras.push(Camera::new(entity));
                self.cameras.len() - 1
            }
            ComponentKind::Terrain => {
                self.terrains.push(TerrainComponent {
                    entity,
                    matrix,
                    layer_mask: 1,
                    terrain: Terrain::new(),
                });
                self.terrains.len() - 1
            }
        };
        let component = universe.attach_component(entity, kind, index);
        universe.notify_component_created(component);
        component
    }

    // --- Lookup ---

    fn index_of(component: Component, kind: ComponentKind) -> Option<usize> {
        (component.kind == kind).then_some(component.index)
    }

    pub fn camera(&self, component: Component) -> Option<&Camera> {
        Self::index_of(component, ComponentKind::Camera).and_then(|i| self.cameras.get(i))
    }

    pub fn renderable(&self, component: Component) -> Option<&Renderable> {
        Self::index_of(component, ComponentKind::Renderable).and_then(|i| self.renderables.get(i))
    }

    pub fn light_data(&self, component: Component) -> Option<&Light> {
        Self::index_of(component, ComponentKind::Light).and_then(|i| self.lights.get(i))
    }

    pub fn terrain(&self, component: Component) -> Option<&Terrain> {
        self.terrain_component(component).map(|t| &t.terrain)
    }

    fn terrain_component(&self, component: Component) -> Option<&TerrainComponent> {
        Self::index_of(component, ComponentKind::Terrain).and_then(|i| self.terrains.get(i))
    }

    fn camera_mut(&mut self, component: Component, op: &str) -> Option<&mut Camera> {
        let found =
            Self::index_of(component, ComponentKind::Camera).and_then(|i| self.cameras.get_mut(i));
        if found.is_none() {
            warn_invalid(op, component);
        }
        found
    }

    fn renderable_mut(&mut self, component: Component, op: &str) -> Option<&mut Renderable> {
        let found = Self::index_of(component, ComponentKind::Renderable)
            .and_then(|i| self.renderables.get_mut(i));
        if found.is_none() {
            warn_invalid(op, component);
        }
        found
    }

    fn terrain_mut(&mut self, component: Component, op: &str) -> Option<&mut TerrainComponent> {
        let found =
            Self::index_of(component, ComponentKind::Terrain).and_then(|i| self.terrains.get_mut(i));
        if found.is_none() {
            warn_invalid(op, component);
        }
        found
    }

    /// Light at `index`, `None` past the end.
    pub fn light(&self, index: usize) -> Option<Component> {
        self.lights
            .get(index)
            .map(|l| Component::new(l.entity, ComponentKind::Light, index))
    }

    /// First camera whose slot equals `slot`.
    pub fn camera_in_slot(&self, slot: &str) -> Option<Component> {
        self.cameras
            .iter()
            .position(|c| c.slot == slot)
            .map(|i| Component::new(self.cameras[i].entity, ComponentKind::Camera, i))
    }

    // --- Cameras ---

    pub fn set_camera_fov(&mut self, camera: Component, fov: f32) {
        if let Some(c) = self.camera_mut(camera, "set_camera_fov") {
            c.fov = fov;
        }
    }

    pub fn camera_fov(&self, camera: Component) -> Option<f32> {
        self.camera(camera).map(Camera::fov)
    }

    pub fn set_camera_near(&mut self, camera: Component, near: f32) {
        if let Some(c) = self.camera_mut(camera, "set_camera_near") {
            c.near = near;
        }
    }

    pub fn camera_near(&self, camera: Component) -> Option<f32> {
        self.camera(camera).map(Camera::near)
    }

    pub fn set_camera_far(&mut self, camera: Component, far: f32) {
        if let Some(c) = self.camera_mut(camera, "set_camera_far") {
            c.far = far;
        }
    }

    pub fn camera_far(&self, camera: Component) -> Option<f32> {
        self.camera(camera).map(Camera::far)
    }

    pub fn set_camera_slot(&mut self, camera: Component, slot: &str) {
        if let Some(c) = self.camera_mut(camera, "set_camera_slot") {
            c.set_slot(slot);
        }
    }

    pub fn camera_slot(&self, camera: Component) -> Option<&str> {
        self.camera(camera).map(Camera::slot)
    }

    /// Sets the viewport size; aspect follows.
    pub fn set_camera_size(&mut self, camera: Component, width: f32, height: f32) {
        if let Some(c) = self.camera_mut(camera, "set_camera_size") {
            c.set_size(width, height);
        }
    }

    pub fn camera_width(&self, camera: Component) -> Option<f32> {
        self.camera(camera).map(Camera::width)
    }

    pub fn camera_height(&self, camera: Component) -> Option<f32> {
        self.camera(camera).map(Camera::height)
    }

    pub fn set_camera_active(&mut self, camera: Component, active: bool) {
        if let Some(c) = self.camera_mut(camera, "set_camera_active") {
            c.is_active = active;
        }
    }

    pub fn is_camera_active(&self, camera: Component) -> Option<bool> {
        self.camera(camera).map(Camera::is_active)
    }

    pub fn projection_matrix(&self, camera: Component) -> Option<Mat4> {
        self.camera(camera).map(Camera::projection_matrix)
    }

    /// World-space pick ray through pixel `(x, y)` of `camera`.
    pub fn camera_ray(&self, camera: Component, universe: &Universe, x: f32, y: f32) -> Option<Ray> {
        let c = self.camera(camera)?;
        let world = universe.matrix(c.entity)?;
        Some(c.screen_ray(&world, x, y))
    }

    // --- Renderables ---

    /// Binds the model at `path`, releasing the previous one. An empty path
    /// leaves the renderable without a model.
    pub fn set_renderable_path(
        &mut self,
        renderable: Component,
        path: &str,
        universe: &Universe,
        assets: &mut impl ResourceManager,
    ) {
        let Some(r) = self.renderable_mut(renderable, "set_renderable_path") else {
            return;
        };
        // Load before releasing so rebinding the same path keeps it resident.
        let handle = (!path.is_empty()).then(|| assets.load_model(path));
        if let Some(old) = std::mem::replace(&mut r.instance.model, handle) {
            assets.unload(old.into());
        }
        r.instance.pose = Pose::default();
        if let Some(model) = handle.and_then(|h| assets.model(h)) {
            r.instance.pose.reset(model.bone_count());
        }
        if let Some(matrix) = universe.matrix(r.entity) {
            r.instance.matrix = matrix;
        }
    }

    /// Path of the bound model, empty when none is bound.
    pub fn renderable_path<'a>(
        &self,
        renderable: Component,
        assets: &'a impl ResourceManager,
    ) -> Option<&'a str> {
        let r = self.renderable(renderable)?;
        Some(
            r.instance
                .model
                .and_then(|h| assets.path(h.into()))
                .unwrap_or(""),
        )
    }

    /// Puts the renderable on exactly one layer.
    pub fn set_renderable_layer(&mut self, renderable: Component, layer: u32) {
        if layer >= u64::BITS {
            tracing::warn!("Renderable layer {} out of range", layer);
            return;
        }
        self.set_renderable_layer_mask(renderable, 1 << layer);
    }

    pub fn set_renderable_layer_mask(&mut self, renderable: Component, mask: u64) {
        if let Some(r) = self.renderable_mut(renderable, "set_renderable_layer_mask") {
            r.layer_mask = mask;
        }
    }

    pub fn renderable_layer_mask(&self, renderable: Component) -> Option<u64> {
        self.renderable(renderable).map(Renderable::layer_mask)
    }

    pub fn set_renderable_scale(&mut self, renderable: Component, scale: f32) {
        if let Some(r) = self.renderable_mut(renderable, "set_renderable_scale") {
            r.scale = scale;
        }
    }

    pub fn renderable_scale(&self, renderable: Component) -> Option<f32> {
        self.renderable(renderable).map(Renderable::scale)
    }

    pub fn renderable_model(&self, renderable: Component) -> Option<ModelHandle> {
        self.renderable(renderable)?.instance.model
    }

    pub fn renderable_pose(&self, renderable: Component) -> Option<&Pose> {
        self.renderable(renderable).map(|r| &r.instance.pose)
    }

    pub fn renderable_pose_mut(&mut self, renderable: Component) -> Option<&mut Pose> {
        self.renderable_mut(renderable, "renderable_pose_mut")
            .map(|r| &mut r.instance.pose)
    }

    /// Every drawable submesh of loaded renderables on a layer in
    /// `layer_mask`, in registry order. Submeshes whose material is not
    /// ready are skipped.
    pub fn renderable_infos<'a, R: ResourceManager>(
        &'a self,
        assets: &'a R,
        layer_mask: u64,
    ) -> Vec<RenderableInfo<'a>> {
        let mut infos = Vec::new();
        for (index, r) in self.renderables.iter().enumerate() {
            if r.layer_mask & layer_mask == 0 {
                continue;
            }
            let Some(model) = r.instance.model.and_then(|h| assets.model(h)) else {
                continue;
            };
            let component = Component::new(r.entity, ComponentKind::Renderable, index);
            for mesh in model.meshes() {
                let ready = mesh
                    .material
                    .is_some_and(|m| assets.is_ready(ResourceId::Material(m)));
                if !ready {
                    continue;
                }
                infos.push(RenderableInfo {
                    component,
                    mesh,
                    geometry: model.geometry(),
                    pose: &r.instance.pose,
                    instance: &r.instance,
                    model,
                    matrix: &r.instance.matrix,
                    scale: r.scale,
                });
            }
        }
        infos
    }

    /// Nearest renderable hit by the ray, tested exactly against model
    /// triangles once the bounding sphere check passes.
    pub fn cast_ray(
        &self,
        assets: &impl ResourceManager,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let ray = Ray::new(origin, direction);
        let mut nearest: Option<RayHit> = None;
        for (index, r) in self.renderables.iter().enumerate() {
            let Some(model) = r.instance.model.and_then(|h| assets.model(h)) else {
                continue;
            };
            let center = r.instance.matrix.w_axis.truncate();
            let radius = model.bounding_radius() * r.scale;
            let inside = (center - origin).length_squared() < radius * radius;
            if !inside && ray_sphere_intersection(center, radius, &ray).is_none() {
                continue;
            }
            let Some(t) = model.cast_ray(&ray, &r.instance.matrix, r.scale) else {
                continue;
            };
            if nearest.is_none_or(|hit| t < hit.t) {
                nearest = Some(RayHit {
                    t,
                    component: Component::new(r.entity, ComponentKind::Renderable, index),
                });
            }
        }
        nearest
    }

    // --- Terrains ---

    pub fn set_terrain_material(
        &mut self,
        terrain: Component,
        path: &str,
        assets: &mut impl ResourceManager,
    ) {
        if let Some(t) = self.terrain_mut(terrain, "set_terrain_material") {
            t.terrain.set_material(assets, path);
        }
    }

    pub fn terrain_material_path<'a>(
        &self,
        terrain: Component,
        assets: &'a impl ResourceManager,
    ) -> Option<&'a str> {
        self.terrain(terrain).map(|t| t.material_path(assets))
    }

    pub fn set_terrain_xz_scale(&mut self, terrain: Component, scale: f32) {
        if let Some(t) = self.terrain_mut(terrain, "set_terrain_xz_scale") {
            t.terrain.set_xz_scale(scale);
        }
    }

    pub fn terrain_xz_scale(&self, terrain: Component) -> Option<f32> {
        self.terrain(terrain).map(Terrain::xz_scale)
    }

    pub fn set_terrain_y_scale(&mut self, terrain: Component, scale: f32) {
        if let Some(t) = self.terrain_mut(terrain, "set_terrain_y_scale") {
            t.terrain.set_y_scale(scale);
        }
    }

    pub fn terrain_y_scale(&self, terrain: Component) -> Option<f32> {
        self.terrain(terrain).map(Terrain::y_scale)
    }

    pub fn set_terrain_layer_mask(&mut self, terrain: Component, mask: u64) {
        if let Some(t) = self.terrain_mut(terrain, "set_terrain_layer_mask") {
            t.layer_mask = mask;
        }
    }

    pub fn terrain_layer_mask(&self, terrain: Component) -> Option<u64> {
        self.terrain_component(terrain).map(|t| t.layer_mask)
    }

    /// Terrains on a layer in `layer_mask`, in registry order.
    pub fn terrain_infos(&self, layer_mask: u64) -> Vec<TerrainInfo> {
        self.terrains
            .iter()
            .enumerate()
            .filter(|(_, t)| t.layer_mask & layer_mask != 0)
            .map(|(index, t)| TerrainInfo {
                component: Component::new(t.entity, ComponentKind::Terrain, index),
                material: t.terrain.material(),
                xz_scale: t.terrain.xz_scale(),
                y_scale: t.terrain.y_scale(),
                matrix: t.matrix,
            })
            .collect()
    }

    /// Draws the terrain described by `info` if its material is ready.
    /// `camera_pos` is in world units.
    ///
    /// Returns the number of draws issued.
    pub fn render_terrain(
        &self,
        info: &TerrainInfo,
        assets: &impl ResourceManager,
        backend: &mut impl RenderBackend,
        camera_pos: Vec3,
    ) -> usize {
        let Some(t) = self.terrain(info.component) else {
            warn_invalid("render_terrain", info.component);
            return 0;
        };
        if !t.is_material_ready(assets) {
            return 0;
        }
        t.render(backend, camera_pos / t.xz_scale())
    }

    // --- Notifications ---

    /// Applies pending entity moves to every spatial component of the moved
    /// entities. Returns the number of moves drained.
    pub fn process_entity_moves(&mut self, universe: &Universe) -> usize {
        let mut count = 0;
        while let Ok(entity) = self.moved.try_recv() {
            count += 1;
            let Some(matrix) = universe.matrix(entity) else {
                continue;
            };
            for component in universe.components(entity) {
                match component.kind {
                    ComponentKind::Renderable => {
                        if let Some(r) = self.renderables.get_mut(component.index) {
                            r.instance.matrix = matrix;
                        }
                    }
                    ComponentKind::Terrain => {
                        if let Some(t) = self.terrains.get_mut(component.index) {
                            t.matrix = matrix;
                        }
                    }
                    ComponentKind::Light | ComponentKind::Camera => {}
                }
            }
        }
        count
    }

    /// Routes pending readiness events to terrains and sizes the poses of
    /// renderables whose model just loaded. Returns the number of events
    /// drained.
    pub fn process_resource_events(&mut self, assets: &impl ResourceManager) -> usize {
        let mut count = 0;
        while let Ok(event) = self.readiness.try_recv() {
            count += 1;
            for t in &mut self.terrains {
                t.terrain.handle_event(&event, assets);
            }
            if let ResourceId::Model(handle) = event.resource
                && event.became_ready()
            {
                let bones = assets.model(handle).map_or(0, Model::bone_count);
                for r in &mut self.renderables {
                    if r.instance.model == Some(handle) {
                        r.instance.pose.reset(bones);
                    }
                }
                tracing::debug!("Model {} ready, {} bones", handle.0, bones);
            }
        }
        count
    }

    // --- Debug ---

    /// Ages debug lines by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.debug_lines.update(dt);
    }

    pub fn debug_lines(&self) -> &[DebugLine] {
        self.debug_lines.lines()
    }

    pub fn add_debug_line(&mut self, from: Vec3, to: Vec3, color: Vec3, life: f32) {
        self.debug_lines.add_line(from, to, color, life);
    }

    pub fn add_debug_cube(&mut self, min: Vec3, size: f32, color: Vec3, life: f32) {
        self.debug_lines.add_cube(min, size, color, life);
    }

    pub fn add_debug_circle(&mut self, center: Vec3, radius: f32, color: Vec3, life: f32) {
        self.debug_lines.add_circle(center, radius, color, life);
    }

    // --- Persistence ---

    /// Writes cameras, renderables, lights and terrains, in that order.
    pub fn serialize(&self, writer: &mut impl SceneWriter, assets: &impl ResourceManager) {
        writer.write_count("camera_count", self.cameras.len() as i32);
        writer.begin_array("cameras");
        for c in &self.cameras {
            writer.write_item(c.far.into());
            writer.write_item(c.near.into());
            writer.write_item(c.fov.into());
            writer.write_item(c.is_active.into());
            writer.write_item(c.width.into());
            writer.write_item(c.height.into());
            writer.write_item((c.entity.0 as i32).into());
            writer.write_item(c.slot.as_str().into());
        }
        writer.end_array();

        writer.write_count("renderable_count", self.renderables.len() as i32);
        writer.begin_array("renderables");
        for r in &self.renderables {
            let path = r
                .instance
                .model
                .and_then(|h| assets.path(h.into()))
                .unwrap_or("");
            writer.write_item((r.entity.0 as i32).into());
            writer.write_item(path.into());
            writer.write_item(r.scale.into());
            for value in r.instance.matrix.to_cols_array() {
                writer.write_item(value.into());
            }
        }
        writer.end_array();

        writer.write_count("light_count", self.lights.len() as i32);
        writer.begin_array("lights");
        for l in &self.lights {
            writer.write_item((l.entity.0 as i32).into());
            writer.write_item(l.light_type.tag().into());
        }
        writer.end_array();

        writer.write_count("terrain_count", self.terrains.len() as i32);
        writer.begin_array("terrains");
        for t in &self.terrains {
            writer.write_item((t.entity.0 as i32).into());
            writer.write_item((t.layer_mask as i64).into());
            writer.write_item(t.terrain.material_path(assets).into());
            writer.write_item(t.terrain.xz_scale().into());
            writer.write_item(t.terrain.y_scale().into());
        }
        writer.end_array();
    }

    /// Replaces every store with the records read from `reader`.
    ///
    /// All records are parsed and their entities checked against `universe`
    /// before anything is touched; on error the scene is left unchanged.
    /// Resources held by replaced components are released and the new
    /// records' resources requested.
    pub fn deserialize(
        &mut self,
        reader: &mut impl SceneReader,
        universe: &mut Universe,
        assets: &mut impl ResourceManager,
    ) -> Result<(), SceneError> {
        let cameras = read_records(reader, "camera_count", "cameras", |reader| {
            let far = reader.read_f32()?;
            let near = reader.read_f32()?;
            let fov = reader.read_f32()?;
            let is_active = reader.read_bool()?;
            let width = reader.read_f32()?;
            let height = reader.read_f32()?;
            let entity = read_entity(reader, universe)?;
            let slot = reader.read_string()?;
            let mut camera = Camera::new(entity);
            camera.far = far;
            camera.near = near;
            camera.fov = fov;
            camera.is_active = is_active;
            camera.set_size(width, height);
            camera.set_slot(&slot);
            Ok(camera)
        })?;

        let renderables = read_records(reader, "renderable_count", "renderables", |reader| {
            let entity = read_entity(reader, universe)?;
            let path = reader.read_string()?;
            let scale = reader.read_f32()?;
            let mut cols = [0.0; MATRIX_FLOATS];
            for value in &mut cols {
                *value = reader.read_f32()?;
            }
            Ok(StagedRenderable {
                entity,
                path,
                scale,
                matrix: Mat4::from_cols_array(&cols),
            })
        })?;

        let lights = read_records(reader, "light_count", "lights", |reader| {
            let entity = read_entity(reader, universe)?;
            let light_type = LightType::try_from(reader.read_i32()?)?;
            Ok(Light { entity, light_type })
        })?;

        let terrains = read_records(reader, "terrain_count", "terrains", |reader| {
            Ok(StagedTerrain {
                entity: read_entity(reader, universe)?,
                layer_mask: reader.read_i64()? as u64,
                material: reader.read_string()?,
                xz_scale: reader.read_f32()?,
                y_scale: reader.read_f32()?,
            })
        })?;

        self.commit(universe, assets, cameras, renderables, lights, terrains);
        tracing::info!(
            "Scene loaded: {} cameras, {} renderables, {} lights, {} terrains",
            self.cameras.len(),
            self.renderables.len(),
            self.lights.len(),
            self.terrains.len()
        );
        Ok(())
    }

    fn commit(
        &mut self,
        universe: &mut Universe,
        assets: &mut impl ResourceManager,
        cameras: Vec<Camera>,
        renderables: Vec<StagedRenderable>,
        lights: Vec<Light>,
        terrains: Vec<StagedTerrain>,
    ) {
        // New resources are acquired before the replaced stores release
        // theirs, so paths shared by both stay loaded.
        let renderables: Vec<Renderable> = renderables
            .into_iter()
            .map(|staged| {
                let mut r = Renderable::new(staged.entity, staged.matrix);
                r.scale = staged.scale;
                if !staged.path.is_empty() {
                    let handle = assets.load_model(&staged.path);
                    r.instance.model = Some(handle);
                    if let Some(model) = assets.model(handle) {
                        r.instance.pose.reset(model.bone_count());
                    }
                }
                r
            })
            .collect();
        let terrains: Vec<TerrainComponent> = terrains
            .into_iter()
            .map(|staged| {
                let mut terrain = Terrain::new();
                terrain.set_xz_scale(staged.xz_scale);
                terrain.set_y_scale(staged.y_scale);
                if !staged.material.is_empty() {
                    terrain.set_material(assets, &staged.material);
                }
                TerrainComponent {
                    entity: staged.entity,
                    matrix: universe.matrix(staged.entity).unwrap_or(Mat4::IDENTITY),
                    layer_mask: staged.layer_mask,
                    terrain,
                }
            })
            .collect();

        for r in std::mem::replace(&mut self.renderables, renderables) {
            if let Some(model) = r.instance.model {
                assets.unload(model.into());
            }
        }
        for mut t in std::mem::replace(&mut self.terrains, terrains) {
            t.terrain.release(assets);
        }
        self.cameras = cameras;
        self.lights = lights;

        for kind in ComponentKind::ALL {
            universe.detach_kind(kind);
        }
        for (index, c) in self.cameras.iter().enumerate() {
            universe.attach_component(c.entity, ComponentKind::Camera, index);
        }
        for (index, r) in self.renderables.iter().enumerate() {
            universe.attach_component(r.entity, ComponentKind::Renderable, index);
        }
        for (index, l) in self.lights.iter().enumerate() {
            universe.attach_component(l.entity, ComponentKind::Light, index);
        }
        for (index, t) in self.terrains.iter().enumerate() {
            universe.attach_component(t.entity, ComponentKind::Terrain, index);
        }
    }
}

fn warn_invalid(op: &str, component: Component) {
    tracing::warn!(
        "{}: invalid {} component {} on entity {}",
        op,
        component.kind,
        component.index,
        component.entity.0
    );
}

/// Reads a `count` entry followed by an array of that many records.
fn read_records<R: SceneReader, T>(
    reader: &mut R,
    count_name: &str,
    array_name: &str,
    mut read: impl FnMut(&mut R) -> Result<T, SceneError>,
) -> Result<Vec<T>, SceneError> {
    let count = reader.read_count(count_name)?;
    let count = usize::try_from(count).map_err(|_| SceneError::InvalidCount(count))?;
    reader.begin_array(array_name)?;
    let mut records = Vec::with_capacity(count.min(reader.items_remaining()));
    for _ in 0..count {
        records.push(read(reader)?);
    }
    reader.end_array()?;
    Ok(records)
}

fn read_entity(reader: &mut impl SceneReader, universe: &Universe) -> Result<Entity, SceneError> {
    let index = reader.read_i32()?;
    let entity = Entity(index as u32);
    if index < 0 || !universe.contains(entity) {
        return Err(SceneError::UnknownEntity(entity.0));
    }
    Ok(entity)
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
