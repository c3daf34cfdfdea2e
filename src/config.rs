//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treemodel/treemodel.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `TREEMODEL_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{DEFAULT_CHILDREN_KEY, DEFAULT_ID_FIELD};

/// Unified configuration for treemodel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Attribute used by `find` (default: "id")
    pub id_field: String,
    /// Key holding child specs in tree documents (default: "nodes")
    pub children_key: String,
    /// Attribute shown when rendering a tree (default: "id")
    pub label_field: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            children_key: DEFAULT_CHILDREN_KEY.to_string(),
            label_field: DEFAULT_ID_FIELD.to_string(),
        }
    }
}

/// Raw settings for intermediate parsing (None means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub id_field: Option<String>,
    pub children_key: Option<String>,
    pub label_field: Option<String>,
}

/// Get the XDG config directory for treemodel.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treemodel").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treemodel.toml"))
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
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            id_field: overlay
                .id_field
                .clone()
                .unwrap_or_else(|| self.id_field.clone()),
            children_key: overlay
                .children_key
                .clone()
                .unwrap_or_else(|| self.children_key.clone()),
            label_field: overlay
                .label_field
                .clone()
                .unwrap_or_else(|| self.label_field.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional explicit config file; unlike the global file it must exist
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local)
    }

    /// Load with explicit global and local file locations.
    ///
    /// A missing global file is skipped, a missing local file is an error.
    pub fn load_from(
        global: Option<&Path>,
        local: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Local config
        if let Some(local_path) = local {
            debug!(path = %local_path.display(), "loading local config");
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current, env_source())?;

        current.validate()?;
        Ok(current)
    }

    /// Apply TREEMODEL_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("id_field") {
            settings.id_field = val;
        }
        if let Ok(val) = config.get_string("children_key") {
            settings.children_key = val;
        }
        if let Ok(val) = config.get_string("label_field") {
            settings.label_field = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        for (name, value) in [
            ("id_field", &self.id_field),
            ("children_key", &self.children_key),
            ("label_field", &self.label_field),
        ] {
            if value.trim().is_empty() {
                return Err(ApplicationError::Config {
                    message: format!("{name} must not be empty"),
                });
            }
        }
        if self.id_field == self.children_key {
            return Err(ApplicationError::Config {
                message: format!(
                    "id_field and children_key must differ (both '{}')",
                    self.id_field
                ),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treemodel configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treemodel/treemodel.toml
#   Local:  file given with --config
#   Env:    TREEMODEL_* environment variables (e.g. TREEMODEL_ID_FIELD=key)

# Attribute used to look nodes up by id
# id_field = "id"

# Key holding the children of a node in tree documents
# children_key = "nodes"

# Attribute shown for each node by `treemodel show`
# label_field = "id"
"#
        .to_string()
    }
}

/// `TREEMODEL_ID_FIELD=key` sets `id_field`; only the prefix is split off.
fn env_source() -> Environment {
    Environment::with_prefix("TREEMODEL").prefix_separator("_")
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
