//! Headless walkthrough of the scene registry: builds a small scene, flies
//! a camera over the terrain, logs the LOD draw counts per frame, picks a
//! renderable and saves the scene.

use std::path::{Path, PathBuf};

use clap::Parser;
use glam::Vec3;
use strata_assets::{
    AssetCache, Geometry, Material, MaterialHandle, Mesh, Model, ResourceManager, Texture,
};
use strata_config::{CliArgs, Config};
use strata_render::CommandRecorder;
use strata_scene::{ComponentKind, FieldStream, RenderScene, SceneError, Universe};
use strata_terrain::{MAX_DEPTH, MIN_NODE_SIZE};
use tracing::{info, warn};

const ROCK_MODEL: &str = "models/rock.mdl";
const ROCK_MATERIAL: &str = "materials/rock.mat";
const TERRAIN_MATERIAL: &str = "materials/terrain.mat";
const HEIGHTMAP: &str = "textures/heightmap.tga";

/// Axis-aligned unit cube centred on the origin.
fn cube_model(material: MaterialHandle) -> Model {
    let positions = [
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(0.5, 0.5, -0.5),
        Vec3::new(-0.5, 0.5, -0.5),
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 0, 3, 2, // -Z
        4, 5, 6, 4, 6, 7, // +Z
        0, 1, 5, 0, 5, 4, // -Y
        3, 7, 6, 3, 6, 2, // +Y
        0, 4, 7, 0, 7, 3, // -X
        1, 2, 6, 1, 6, 5, // +X
    ];
    let geometry = Geometry::new(positions.to_vec(), indices);
    let count = geometry.index_count();
    Model::new(geometry, vec![Mesh::new("rock", Some(material), 0, count)])
}

/// Stands in for the file loader: delivers every outstanding request.
fn complete_loads(assets: &mut AssetCache, config: &Config) {
    let heightmap = assets.load_texture(HEIGHTMAP);
    let rock_material = assets.load_material(ROCK_MATERIAL);
    let size = config.terrain.heightmap_size;
    let results = [
        assets
            .provide_texture(HEIGHTMAP, Texture::new(size, size))
            .map(|_| ()),
        assets
            .provide_material(TERRAIN_MATERIAL, Material::new(vec![heightmap]))
            .map(|_| ()),
        assets
            .provide_material(ROCK_MATERIAL, Material::default())
            .map(|_| ()),
    ];
    for result in results {
        if let Err(e) = result {
            warn!("Asset load failed: {e}");
        }
    }
    if let Err(e) = assets.provide_model(ROCK_MODEL, cube_model(rock_material)) {
        warn!("Asset load failed: {e}");
    }
}

fn resolve_dir(explicit: Option<&PathBuf>, fallback: Option<PathBuf>) -> PathBuf {
    explicit
        .cloned()
        .or(fallback)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn save_scene(scene: &RenderScene, assets: &AssetCache, path: &Path) -> Result<(), SceneError> {
    let mut stream = FieldStream::new();
    scene.serialize(&mut stream, assets);
    stream.save(path)
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = resolve_dir(args.config.as_ref(), Config::default_dir().ok());
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let mut universe = Universe::new();
    let mut assets = AssetCache::new();
    let mut scene = RenderScene::new(&mut universe, assets.subscribe());

    // Terrain at the origin.
    let ground = universe.create_entity();
    let terrain = scene.create_component(&mut universe, ComponentKind::Terrain, ground);
    scene.set_terrain_material(terrain, TERRAIN_MATERIAL, &mut assets);
    scene.set_terrain_xz_scale(terrain, config.terrain.xz_scale);
    scene.set_terrain_y_scale(terrain, config.terrain.y_scale);

    // A row of rocks across the terrain.
    let world_size = config.terrain.heightmap_size as f32 * config.terrain.xz_scale;
    let mut rocks = Vec::new();
    for i in 0..5 {
        let x = world_size * (i as f32 + 0.5) / 5.0;
        let rock = universe.create_entity_at(Vec3::new(x, 2.0, world_size * 0.5));
        let r = scene.create_component(&mut universe, ComponentKind::Renderable, rock);
        scene.set_renderable_path(r, ROCK_MODEL, &universe, &mut assets);
        scene.set_renderable_scale(r, 4.0 + i as f32);
        rocks.push(r);
    }

    let sun = universe.create_entity();
    scene.create_component(&mut universe, ComponentKind::Light, sun);

    let start = Vec3::new(world_size * 0.5, 20.0, world_size * 1.5);
    let eye = universe.create_entity_at(start);
    let camera = scene.create_component(&mut universe, ComponentKind::Camera, eye);
    scene.set_camera_slot(camera, &config.scene.main_camera_slot);
    scene.set_camera_fov(camera, config.scene.camera_fov);
    scene.set_camera_near(camera, config.scene.camera_near);
    scene.set_camera_far(camera, config.scene.camera_far);
    scene.set_camera_size(
        camera,
        config.window.width as f32,
        config.window.height as f32,
    );
    scene.set_camera_active(camera, true);

    complete_loads(&mut assets, &config);
    let events = scene.process_resource_events(&assets);
    info!("Processed {events} resource events");

    if let Some(tree) = scene.terrain(terrain).and_then(|t| t.quadtree()) {
        info!(
            "Terrain quadtree: size {}, {} nodes, {} leaves, depth {}",
            tree.size(),
            tree.len(),
            tree.leaves().count(),
            tree.depth()
        );
        if u32::from(MAX_DEPTH) != config.terrain.max_depth
            || MIN_NODE_SIZE != config.terrain.min_node_size
        {
            warn!(
                "Configured quadtree limits ({}, {}) differ from the selector's ({}, {})",
                config.terrain.max_depth, config.terrain.min_node_size, MAX_DEPTH, MIN_NODE_SIZE
            );
        }
    }

    // Fly from outside the terrain to its centre.
    let layer_mask = config.scene.layer_mask;
    let dt = 1.0 / 30.0;
    let mut recorder = CommandRecorder::new();
    let target = Vec3::new(world_size * 0.5, 20.0, world_size * 0.5);
    for frame in 0..args.frames {
        let t = if args.frames > 1 {
            frame as f32 / (args.frames - 1) as f32
        } else {
            1.0
        };
        let position = start.lerp(target, t);
        universe.set_position(eye, position);
        scene.process_entity_moves(&universe);

        recorder.clear();
        let mut draws = 0;
        for info in scene.terrain_infos(layer_mask) {
            draws += scene.render_terrain(&info, &assets, &mut recorder, position);
        }
        let renderables = scene.renderable_infos(&assets, layer_mask).len();
        if config.debug.show_quadtree {
            scene.add_debug_circle(position, 10.0, Vec3::X, config.debug.default_line_life);
        }
        scene.update(dt);
        info!(
            frame,
            terrain_draws = draws,
            indices = recorder.index_total(),
            renderables,
            debug_lines = scene.debug_lines().len(),
            "Frame rendered"
        );
    }

    // Pick through the centre of the viewport.
    let (cx, cy) = (config.window.width as f32 * 0.5, config.window.height as f32 * 0.5);
    match scene
        .camera_ray(camera, &universe, cx, cy)
        .and_then(|ray| scene.cast_ray(&assets, ray.origin, ray.direction))
    {
        Some(hit) => info!(
            "Picked entity {} (renderable {}) at distance {:.2}",
            hit.component.entity.0, hit.component.index, hit.t
        ),
        None => info!("Nothing under the viewport centre"),
    }

    // Cast straight down the row of rocks.
    let row = Vec3::new(-10.0, 2.0, world_size * 0.5);
    if let Some(hit) = scene.cast_ray(&assets, row, Vec3::X) {
        let first = rocks.first().copied();
        info!(
            "Row ray hit renderable {} at {:.2} (first rock: {:?})",
            hit.component.index,
            hit.t,
            first.map(|c| c.index)
        );
    }

    let data_dir = resolve_dir(
        args.data_dir.as_ref(),
        dirs::data_dir().map(|d| d.join("strata")),
    );
    let scene_path = data_dir.join(&config.scene.scene_file);
    if let Err(e) = save_scene(&scene, &assets, &scene_path) {
        warn!("Failed to save scene: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_model_bounds() {
        let mut assets = AssetCache::new();
        let material = assets.load_material(ROCK_MATERIAL);
        let model = cube_model(material);
        assert_eq!(model.geometry().index_count(), 36);
        assert!((model.bounding_radius() - 0.75f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_complete_loads_readies_everything() {
        let mut assets = AssetCache::new();
        let config = Config::default();
        let terrain = assets.load_material(TERRAIN_MATERIAL);
        let rock = assets.load_model(ROCK_MODEL);
        complete_loads(&mut assets, &config);
        assert!(assets.is_ready(terrain.into()));
        assert!(assets.is_ready(rock.into()));
    }

    #[test]
    fn test_resolve_dir_prefers_explicit() {
        let explicit = PathBuf::from("/tmp/strata");
        assert_eq!(
            resolve_dir(Some(&explicit), Some(PathBuf::from("/other"))),
            explicit
        );
        assert_eq!(resolve_dir(None, None), PathBuf::from("."));
    }

    #[test]
    fn test_save_scene_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut universe = Universe::new();
        let mut assets = AssetCache::new();
        let mut scene = RenderScene::new(&mut universe, assets.subscribe());
        let e = universe.create_entity();
        scene.create_component(&mut universe, ComponentKind::Camera, e);

        let path = dir.path().join("out").join("scene.ron");
        save_scene(&scene, &assets, &path).unwrap();
        let stream = FieldStream::load(&path).unwrap();
        assert_eq!(stream.count("camera_count"), Some(1));
    }
}
