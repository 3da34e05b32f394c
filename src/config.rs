//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/vspectl/vspectl.toml`, or the file given with `--config`
//! 3. Environment variables: `VSPECTL_*` prefix
//! 4. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::infrastructure::TextEncoding;

/// Library file name searched for when nothing else is configured.
#[cfg(windows)]
pub const DEFAULT_LIBRARY_NAME: &str = "VSPE_API.dll";
#[cfg(not(windows))]
pub const DEFAULT_LIBRARY_NAME: &str = "libvspe_api.so";

/// Unified configuration for vspectl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Path to the VSPE native library
    pub library_path: PathBuf,
    /// Activation key (empty for the free edition)
    pub activation_key: String,
    /// Encoding of strings exchanged with the library
    pub encoding: TextEncoding,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            activation_key: String::new(),
            encoding: TextEncoding::default(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub library_path: Option<PathBuf>,
    pub activation_key: Option<String>,
    pub encoding: Option<TextEncoding>,
}

/// Library next to the executable if present, otherwise the bare name
/// so the OS loader search path applies.
fn default_library_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_LIBRARY_NAME)))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_NAME))
}

/// Get the XDG config directory for vspectl.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "vspectl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("vspectl.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            library_path: overlay
                .library_path
                .clone()
                .unwrap_or_else(|| self.library_path.clone()),
            activation_key: overlay
                .activation_key
                .clone()
                .unwrap_or_else(|| self.activation_key.clone()),
            encoding: overlay.encoding.unwrap_or(self.encoding),
        }
    }

    /// Expand shell variables and tilde in the library path.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.library_path.to_string_lossy().as_ref());
        self.library_path = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; replaces the global one.
    ///   A missing explicit file is an error, a missing global file is not.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                debug!("config: explicit file {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        debug!("config: global file {}", global_path.display());
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply VSPECTL_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("VSPECTL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("library_path") {
            settings.library_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("activation_key") {
            settings.activation_key = val;
        }
        if config.get_string("encoding").is_ok() {
            settings.encoding = config.get::<TextEncoding>("encoding").map_err(config_err)?;
        }

        Ok(settings)
    }

    /// Apply command line overrides (highest precedence).
    pub fn with_overrides(mut self, library: Option<&Path>, key: Option<&str>) -> Self {
        if let Some(library) = library {
            self.library_path = PathBuf::from(expand_env_vars(&library.to_string_lossy()));
        }
        if let Some(key) = key {
            self.activation_key = key.to_string();
        }
        self
    }

    /// Render as TOML, as printed by `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {e}"),
        })
    }
}
