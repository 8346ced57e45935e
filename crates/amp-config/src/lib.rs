//! Ampshell configuration system
//!
//! Settings are read from `ampshell.toml` in the working directory and then
//! overridden by environment variables. Every section falls back to defaults,
//! so a missing or partial file is never an error for [`AmpConfig::load`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default name of the configuration file.
pub const CONFIG_FILE: &str = "ampshell.toml";

/// Content magnification used when nothing (valid) is configured.
pub const DEFAULT_SCALE: f64 = 2.0;

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AmpConfig {
    /// Native window settings
    pub window: WindowConfig,
    /// Packaged content settings
    pub content: ContentConfig,
    /// Update check settings
    pub updates: UpdateConfig,
    /// Developer settings
    pub dev: DevConfig,
}

/// Native window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial content scale factor (1, 1.5, 2, 3...)
    pub scale: f64,
    /// Window title (not shown, the window is frameless, but used by task switchers)
    pub title: String,
    /// Width of the hidden startup window in logical units
    pub initial_width: f64,
    /// Height of the hidden startup window in logical units
    pub initial_height: f64,
}

/// Packaged content configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding the built web UI
    pub root: PathBuf,
    /// Document loaded at startup, relative to `root`
    pub entry: String,
}

/// Update check configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpdateConfig {
    /// Run the update checker at the lifecycle points that request it
    pub enabled: bool,
}

/// Developer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DevConfig {
    /// Build the webview with devtools and open the inspector after load
    pub devtools: bool,
    /// Forward content console output into the shell log
    pub forward_console: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            title: "Webamp".to_string(),
            initial_width: 100.0,
            initial_height: 100.0,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("dist"),
            entry: "index.html".to_string(),
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            devtools: false,
            forward_console: true,
        }
    }
}

/// Parse a scale override. Anything that is not a finite number above zero
/// yields [`DEFAULT_SCALE`].
pub fn parse_scale_override(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => DEFAULT_SCALE,
    }
}

fn parse_flag(raw: &str) -> bool {
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

impl AmpConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `ampshell.toml` in the current directory, or
    /// return defaults if it is missing or unreadable.
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_FILE) {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) => Self::default(),
            Err(err) => {
                log::warn!("{err}; using default configuration");
                Self::default()
            }
        }
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn merge_with_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("WEBAMP_SCALE") {
            self.window.scale = parse_scale_override(&val);
        }
        if let Some(root) = var("AMPSHELL_CONTENT_ROOT") {
            self.content.root = PathBuf::from(root);
        }
        if let Some(val) = var("AMPSHELL_UPDATES") {
            self.updates.enabled = parse_flag(&val);
        }
        if let Some(val) = var("AMPSHELL_DEV") {
            self.dev.devtools = parse_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from ampshell.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    /// Absolute or working-directory-relative path of the entry document.
    pub fn entry_path(&self) -> PathBuf {
        self.content.root.join(&self.content.entry)
    }
}
