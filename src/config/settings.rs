use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::container::DecodeOptions;
use crate::errors::{Result, SealError};

/// Project-level configuration, loaded from `.sqlseal.toml`.
///
/// Every field has a sensible default so SQLSeal works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Where `create` writes the container when no `--output` is given.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Maximum token age in seconds accepted by `verify` and `decrypt`.
    /// Unset means containers never expire.
    #[serde(default)]
    pub token_ttl_secs: Option<u64>,

    /// Reject containers whose version tag is not the current one.
    #[serde(default)]
    pub require_current_version: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_output_file() -> String {
    "simple_encrypted.db".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            token_ttl_secs: None,
            require_current_version: false,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".sqlseal.toml";

    /// Load settings from `<project_dir>/.sqlseal.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            SealError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.output_file.trim().is_empty() {
            return Err(SealError::ConfigError(format!(
                "output_file in {} cannot be empty",
                config_path.display()
            )));
        }

        Ok(settings)
    }

    /// Resolve the default output path against the project directory.
    pub fn output_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.output_file)
    }

    /// Convert into the decode policy used by the container layer.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            ttl: self.token_ttl_secs.map(Duration::from_secs),
            require_current_version: self.require_current_version,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
