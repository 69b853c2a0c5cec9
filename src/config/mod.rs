//! Configuration Management
//!
//! The run is configured by two values:
//! - the descriptor list, as JSON text (`DBEAVER_CONNECTIONS` / `--connections`)
//! - the DBeaver workspace directory to write into (`DBEAVER_DIR` / `--dir`)
//!
//! # Resolution Precedence
//! 1. Explicit CLI flags (highest priority)
//! 2. Environment variables
//!
//! The CLI resolves both through clap's `env` support and hands them to
//! [`Settings::new`]. Both values are required and must be non-empty.

use std::fs;
use std::path::PathBuf;

use crate::descriptor::{parse_descriptors, ConnectionDescriptor};
use crate::error::{ProvisionError, Result};

/// Environment variable holding the descriptor JSON array
pub const CONNECTIONS_ENV: &str = "DBEAVER_CONNECTIONS";

/// Environment variable holding the output directory
pub const DIR_ENV: &str = "DBEAVER_DIR";

/// Validated run configuration
#[derive(Clone)]
pub struct Settings {
    /// Raw descriptor JSON; contains passwords
    pub connections_json: String,

    /// Directory receiving `data-sources.json` and `credentials-config.json`
    pub output_dir: PathBuf,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("connections_json", &format_args!("<{} bytes>", self.connections_json.len()))
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Settings {
    /// Build settings from already-resolved values
    ///
    /// Fails with `ConfigError` naming the environment variable of the first missing value.
    pub fn new(connections_json: Option<String>, output_dir: Option<PathBuf>) -> Result<Self> {
        let connections_json = connections_json
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| missing(CONNECTIONS_ENV))?;
        let output_dir = output_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| missing(DIR_ENV))?;

        Ok(Self {
            connections_json,
            output_dir,
        })
    }

    /// Parse the configured descriptor list
    pub fn descriptors(&self) -> Result<Vec<ConnectionDescriptor>> {
        parse_descriptors(&self.connections_json)
    }

    /// Create the output directory (and parents) if needed
    pub fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            ProvisionError::io_error(
                self.output_dir.display().to_string(),
                format!("Could not create output directory: {e}"),
            )
        })
    }
}

fn missing(var: &str) -> ProvisionError {
    ProvisionError::config_error(format!(
        "{CONNECTIONS_ENV} and {DIR_ENV} are required ({var} is missing or empty)"
    ))
}
