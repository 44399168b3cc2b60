//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treewalk/treewalk.toml`
//! 3. Explicit config file (`--config <FILE>`)
//! 4. Environment variables: `TREEWALK_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::{TraversalMethod, TraversalOrder};

/// Traversal defaults used when the command line does not choose.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TraversalSettings {
    /// N-ary traversal implementation
    pub method: TraversalMethod,
    /// Binary traversal orders printed by `treewalk binary`
    pub orders: Vec<String>,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            method: TraversalMethod::default(),
            orders: TraversalOrder::ALL
                .iter()
                .map(|order| order.name().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySettings {
    /// Colored terminal output
    pub color: bool,
    /// Render the input tree before printing traversals
    pub tree: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            color: true,
            tree: true,
        }
    }
}

/// Raw traversal config; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTraversalSettings {
    pub method: Option<TraversalMethod>,
    pub orders: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplaySettings {
    pub color: Option<bool>,
    pub tree: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub traversal: RawTraversalSettings,
    pub display: RawDisplaySettings,
}

/// Unified configuration for treewalk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub traversal: TraversalSettings,
    pub display: DisplaySettings,
}

/// Get the XDG config directory for treewalk.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treewalk").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treewalk.toml"))
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
    /// Overlay values win where specified; arrays are replaced, not merged.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            traversal: TraversalSettings {
                method: overlay.traversal.method.unwrap_or(self.traversal.method),
                orders: overlay
                    .traversal
                    .orders
                    .clone()
                    .unwrap_or_else(|| self.traversal.orders.clone()),
            },
            display: DisplaySettings {
                color: overlay.display.color.unwrap_or(self.display.color),
                tree: overlay.display.tree.unwrap_or(self.display.tree),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file, applied over the global one
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("applying global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            debug!("applying config file {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current, None)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply TREEWALK_* environment variables as explicit overrides.
    ///
    /// `vars` replaces the process environment when given.
    fn apply_env_overrides(
        mut settings: Self,
        vars: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TREEWALK")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("traversal.orders")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("traversal.method") {
            settings.traversal.method = val.parse()?;
        }
        if let Ok(val) = config.get::<Vec<String>>("traversal.orders") {
            settings.traversal.orders = val;
        }
        if let Ok(val) = config.get_bool("display.color") {
            settings.display.color = val;
        }
        if let Ok(val) = config.get_bool("display.tree") {
            settings.display.tree = val;
        }

        Ok(settings)
    }

    /// Fails on the first order name that does not parse.
    fn validate(&self) -> Result<(), ApplicationError> {
        self.orders().map(|_| ())
    }

    /// Configured binary traversal orders, in configured sequence.
    pub fn orders(&self) -> Result<Vec<TraversalOrder>, ApplicationError> {
        self.traversal
            .orders
            .iter()
            .map(|name| name.parse::<TraversalOrder>().map_err(ApplicationError::from))
            .collect()
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treewalk configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treewalk/treewalk.toml
#   File:   treewalk --config <FILE>
#   Env:    TREEWALK_* environment variables, e.g. TREEWALK_TRAVERSAL__METHOD=recursive

[traversal]
# N-ary traversal implementation: "iterative" or "recursive"
# method = "iterative"

# Binary traversal orders printed by `treewalk binary` when no --order is given
# orders = ["level-order-left-to-right", "zigzag-level-order", "reverse-inorder"]

[display]
# Colored output (NO_COLOR is honoured as well)
# color = true

# Render the input tree before printing traversals
# tree = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn given_defaults_when_created_then_all_orders_and_iterative() {
        let settings = Settings::default();
        assert_eq!(settings.traversal.method, TraversalMethod::Iterative);
        assert_eq!(settings.orders().unwrap(), TraversalOrder::ALL.to_vec());
        assert!(settings.display.color);
        assert!(settings.display.tree);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_are_kept() {
        let overlay: RawSettings = toml::from_str(
            r#"
[traversal]
orders = ["reverse-inorder"]
"#,
        )
        .unwrap();

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.traversal.orders, vec!["reverse-inorder".to_string()]);
        assert_eq!(merged.traversal.method, TraversalMethod::Iterative);
        assert!(merged.display.tree);
    }

    #[test]
    fn given_env_vars_when_applying_overrides_then_they_replace_values() {
        let source = vars(&[
            ("TREEWALK_TRAVERSAL__METHOD", "recursive"),
            ("TREEWALK_TRAVERSAL__ORDERS", "reverse-preorder,zigzag-level-order"),
            ("TREEWALK_DISPLAY__COLOR", "false"),
        ]);

        let settings = Settings::apply_env_overrides(Settings::default(), Some(source)).unwrap();

        assert_eq!(settings.traversal.method, TraversalMethod::Recursive);
        assert_eq!(
            settings.orders().unwrap(),
            vec![TraversalOrder::ReversePreorder, TraversalOrder::ZigzagLevelOrder]
        );
        assert!(!settings.display.color);
        assert!(settings.display.tree);
    }

    #[test]
    fn given_unknown_method_in_env_when_applying_overrides_then_fails() {
        let source = vars(&[("TREEWALK_TRAVERSAL__METHOD", "sideways")]);
        let err = Settings::apply_env_overrides(Settings::default(), Some(source)).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidMethod(_))
        ));
    }

    #[test]
    fn given_settings_when_serialized_then_template_keys_match() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("[traversal]"));
        assert!(toml.contains("method = \"iterative\""));
        assert!(Settings::template().contains("[display]"));
    }
}
