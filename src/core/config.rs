//! TOML configuration: which extension to hunt, where the profile lives, and
//! where (if anywhere) to keep an activity log.
//!
//! Every field has a built-in default, so a missing default config file simply
//! yields [`Config::default`]. An explicitly requested file must exist.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{CleanError, Result};
use crate::platform::identity;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "AUGMENT_CLEANER_CONFIG";

/// Full configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The extension being removed and the editor that hosts it.
    pub target: TargetConfig,
    /// Overrides for the profile-rooted path templates.
    pub paths: PathsConfig,
    /// Activity log settings.
    pub logging: LoggingConfig,
}

/// Identity of the target extension and its host editor process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Publisher-qualified extension id, the prefix of its install directory.
    pub extension_id: String,
    /// Installed version, the suffix of its install directory.
    pub version: String,
    /// Process name of the running editor (as in `/proc/<pid>/comm`).
    pub process_name: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            extension_id: String::from("augment.vscode-augment"),
            version: String::from("0.521.0"),
            process_name: String::from("code"),
        }
    }
}

impl TargetConfig {
    /// Directory name the editor gives the installed extension.
    #[must_use]
    pub fn install_dir_name(&self) -> String {
        format!("{}-{}", self.extension_id, self.version)
    }
}

/// Optional path overrides. `None` means "derive from the environment".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// User profile directory (defaults to `$HOME`).
    pub profile_dir: Option<PathBuf>,
    /// Editor data directory (defaults to `<profile>/.config/Code`).
    pub editor_data_dir: Option<PathBuf>,
}

/// Activity log settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only JSONL activity log. Disabled when unset.
    pub jsonl_path: Option<PathBuf>,
}

impl Config {
    /// Default config location: `$XDG_CONFIG_HOME/augment-cleaner/config.toml`,
    /// falling back to `<home>/.config/augment-cleaner/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|value| !value.is_empty())
            .map_or_else(|| identity::home_dir().join(".config"), PathBuf::from);
        base.join("augment-cleaner").join("config.toml")
    }

    /// Load configuration from `explicit`, else `$AUGMENT_CLEANER_CONFIG`,
    /// else the default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let (path, required) = resolve_config_path(explicit, env_path, Self::default_path());
        Self::load_from(&path, required)
    }

    /// Load from a concrete path. When `required` is false a missing file
    /// yields the defaults.
    pub fn load_from(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                return Err(CleanError::MissingConfig {
                    path: path.to_path_buf(),
                });
            }
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| CleanError::io(path, e))?;
        Self::parse(&raw)
    }

    /// Parse and validate a TOML document.
    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce nonsensical path templates.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("target.extension_id", &self.target.extension_id),
            ("target.version", &self.target.version),
            ("target.process_name", &self.target.process_name),
        ];
        for (key, value) in checks {
            if value.trim().is_empty() {
                return Err(CleanError::InvalidConfig {
                    details: format!("{key} must not be empty"),
                });
            }
        }
        if self
            .target
            .extension_id
            .contains(|c: char| std::path::is_separator(c))
        {
            return Err(CleanError::InvalidConfig {
                details: String::from("target.extension_id must not contain path separators"),
            });
        }
        Ok(())
    }

    /// Profile directory after applying the override.
    #[must_use]
    pub fn profile_dir(&self) -> PathBuf {
        self.paths
            .profile_dir
            .clone()
            .unwrap_or_else(identity::home_dir)
    }

    /// Editor data directory after applying the override.
    #[must_use]
    pub fn editor_data_dir(&self, profile: &Path) -> PathBuf {
        self.paths
            .editor_data_dir
            .clone()
            .unwrap_or_else(|| profile.join(".config").join("Code"))
    }
}

/// Pick the config file to read and whether it must exist.
fn resolve_config_path(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    default_path: PathBuf,
) -> (PathBuf, bool) {
    if let Some(path) = explicit {
        return (path.to_path_buf(), true);
    }
    if let Some(path) = env_path {
        return (path, true);
    }
    (default_path, false)
}
