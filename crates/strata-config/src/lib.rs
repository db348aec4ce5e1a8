//! Runtime settings for the Strata scene tools.
//!
//! Settings persist to disk as `config.ron`, fill missing fields with
//! defaults, and accept command-line overrides through [`CliArgs`].

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, SceneConfig, TerrainConfig, WindowConfig};
pub use error::ConfigError;
