//! Configuration file loading for the CLI
//!
//! An explicit `--config` path is required to exist. Without one, a
//! `diagramkit.toml` in the working directory is used when present, and the
//! defaults otherwise.

use crate::CliError;
use diagramkit_render::RendererConfig;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "diagramkit.toml";

/// Contents of a CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub renderer: RendererConfig,
}

/// Find and load the configuration.
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, CliError> {
    if let Some(path) = explicit_path {
        info!("Loading configuration from {}", path.display());
        return load_config_file(path);
    }

    let local = Path::new(LOCAL_CONFIG);
    if local.exists() {
        info!("Loading configuration from {}", local.display());
        return load_config_file(local);
    }

    debug!("No configuration file found, using default configuration");
    Ok(CliConfig::default())
}

/// Load configuration from a TOML file.
pub fn load_config_file(path: &Path) -> Result<CliConfig, CliError> {
    if !path.exists() {
        return Err(CliError::Config(format!(
            "missing configuration file: {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| CliError::Config(e.to_string()))
}
