//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/scalebal/scalebal.toml`
//! 3. Local config: `<dir>/.scalebal.toml`
//! 4. Environment variables: `SCALEBAL_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{Mass, Traversal, DEFAULT_COMMENT_PREFIX, DEFAULT_SELF_MASS};

/// Balancing behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BalanceSettings {
    /// Order in which scales are balanced
    pub traversal: Traversal,
    /// Own weight of every scale, added to its total mass
    pub self_mass: Mass,
    /// Treat rejected input lines as a failure (exit code DATAERR)
    pub strict: bool,
}

impl Default for BalanceSettings {
    fn default() -> Self {
        Self {
            traversal: Traversal::default(),
            self_mass: DEFAULT_SELF_MASS,
            strict: false,
        }
    }
}

/// Input format settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputSettings {
    /// Lines starting with this prefix are comments (empty disables comments)
    pub comment_prefix: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
        }
    }
}

/// Raw balance settings for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawBalanceSettings {
    pub traversal: Option<Traversal>,
    pub self_mass: Option<Mass>,
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawInputSettings {
    pub comment_prefix: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub balance: RawBalanceSettings,
    pub input: RawInputSettings,
}

/// Unified configuration for scalebal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub balance: BalanceSettings,
    pub input: InputSettings,
}

/// Get the XDG config directory for scalebal.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "scalebal").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("scalebal.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".scalebal.toml")
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

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            balance: BalanceSettings {
                traversal: overlay.balance.traversal.unwrap_or(self.balance.traversal),
                self_mass: overlay.balance.self_mass.unwrap_or(self.balance.self_mass),
                strict: overlay.balance.strict.unwrap_or(self.balance.strict),
            },
            input: InputSettings {
                comment_prefix: overlay
                    .input
                    .comment_prefix
                    .clone()
                    .unwrap_or_else(|| self.input.comment_prefix.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.scalebal.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        let env = Config::builder()
            .add_source(
                Environment::with_prefix("SCALEBAL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;
        current.apply_overrides(&env)
    }

    /// Load only compiled defaults plus one config file.
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply explicit key overrides (`balance.traversal`, `balance.self_mass`,
    /// `balance.strict`, `input.comment_prefix`).
    ///
    /// Overrides replace values; invalid values are config errors.
    pub fn apply_overrides(mut self, config: &Config) -> Result<Self, ApplicationError> {
        if let Some(val) = present(config.get_string("balance.traversal"))? {
            self.balance.traversal = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Some(val) = present(config.get_int("balance.self_mass"))? {
            self.balance.self_mass = Mass::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("balance.self_mass must not be negative: {}", val),
            })?;
        }
        if let Some(val) = present(config.get_bool("balance.strict"))? {
            self.balance.strict = val;
        }
        if let Some(val) = present(config.get_string("input.comment_prefix"))? {
            self.input.comment_prefix = val;
        }
        Ok(self)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# scalebal configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/scalebal/scalebal.toml
#   Local:  <dir>/.scalebal.toml
#   Env:    SCALEBAL_* environment variables, e.g. SCALEBAL_BALANCE__TRAVERSAL=reverse

[balance]
# Balancing order: "dependency" (referenced scales first, cycles are errors)
# or "reverse" (reverse of first-mention order)
# traversal = "dependency"

# Own weight of every scale
# self_mass = 1

# Exit with an error when input lines are rejected
# strict = false

[input]
# Lines starting with this prefix are ignored
# comment_prefix = "#"
"##
        .to_string()
    }
}

/// A missing key is `None`; a present but malformed value is a config error.
fn present<T>(lookup: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match lookup {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
