//! Configuration loading
//!
//! Resolution priority for each setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! CLI and environment handling live in the service binaries (clap); this
//! module owns the file layer and the merged, validated result.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::banding::ConfidenceBands;
use crate::{Error, Result};

/// Default HTTP port for the match review service
pub const DEFAULT_PORT: u16 = 5761;

/// Default database filename, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "spir.db";

/// Config file looked for in the working directory when no path is given
const LOCAL_CONFIG_FILE: &str = "spir.toml";

/// Raw TOML config file contents
///
/// All fields optional; missing values fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub bands: Option<ConfidenceBands>,
}

impl FileConfig {
    /// Parse a TOML config file
    ///
    /// # Errors
    /// Returns `Error::Config` if the file cannot be read or parsed. A file
    /// explicitly named by the operator must parse; silent fallback here
    /// would mask typos in threshold settings.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Cannot parse config file {}: {}", path.display(), e))
        })
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub bands: ConfidenceBands,
}

impl ServiceConfig {
    /// Merge CLI/env values with the config file and compiled defaults
    ///
    /// `cli_port` and `cli_database_path` carry the clap-resolved values
    /// (CLI flag or environment variable, in that order). `config_file` is
    /// an explicit file path; when `None`, `spir.toml` in the working
    /// directory is used if present.
    pub fn resolve(
        cli_port: Option<u16>,
        cli_database_path: Option<PathBuf>,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        let file = match config_file {
            Some(path) => FileConfig::load(path)?,
            None => {
                let local = Path::new(LOCAL_CONFIG_FILE);
                if local.exists() {
                    FileConfig::load(local)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let bands = file.bands.unwrap_or_default();
        bands.validate()?;

        Ok(Self {
            port: cli_port.or(file.port).unwrap_or(DEFAULT_PORT),
            database_path: cli_database_path
                .or(file.database_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            bands,
        })
    }
}
