//! Configuration sections, their defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    /// Defaults applied to newly created scene components.
    pub scene: SceneConfig,
    pub terrain: TerrainConfig,
    pub debug: DebugConfig,
}

/// Viewport the cameras render into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Vertical field of view in degrees.
    pub camera_fov: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    /// Slot tag of the camera the demo renders from.
    pub main_camera_slot: String,
    /// Layers queried when collecting renderables and terrains.
    pub layer_mask: u64,
    /// Scene file name, relative to the data directory.
    pub scene_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Heightmap width in texels, also the quadtree root size.
    pub heightmap_size: u32,
    pub xz_scale: f32,
    pub y_scale: f32,
    /// Quadtree limits reported by the demo; the LOD selector uses its own
    /// compiled-in values.
    pub max_depth: u32,
    pub min_node_size: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Lifetime in seconds of debug lines added without an explicit one.
    pub default_line_life: f32,
    pub show_quadtree: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Strata".to_string(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera_fov: 60.0,
            camera_near: 0.1,
            camera_far: 10_000.0,
            main_camera_slot: "main".to_string(),
            layer_mask: 1,
            scene_file: "scene.ron".to_string(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap_size: 1024,
            xz_scale: 1.0,
            y_scale: 1.0,
            max_depth: 8,
            min_node_size: 16.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_line_life: 1.0,
            show_quadtree: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for Strata, e.g. `~/.config/strata`.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("strata"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Returns `Some(new_config)` if the file on disk differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents =
            std::fs::read_to_string(config_dir.join(CONFIG_FILE)).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
