//! Application settings loading from config.toml
//!
//! Only the export directory lives here for now. The file is optional:
//! when absent, exports land in `./exports`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings structure representing the config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory backup and spreadsheet files are written into
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from the default location (./config.toml), falling back
/// to defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    if Path::new("config.toml").exists() {
        load_settings("config.toml")
    } else {
        Ok(Settings::default())
    }
}
