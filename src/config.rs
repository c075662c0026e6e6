//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pytree/pytree.toml`
//! 3. Local config: `--config <file>`, or `./.pytree.toml` when present
//! 4. Environment variables: `PYTREE_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{AppError, AppResult};

/// How `pytree spec` renders a tree specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Python-style skeleton, e.g. `{'a': *, 'b': [*, *]}`
    #[default]
    Repr,
    /// Box-drawing tree, one node per line
    Tree,
    /// Serialized spec as JSON
    Json,
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStyle::Repr => "repr",
            RenderStyle::Tree => "tree",
            RenderStyle::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for RenderStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repr" => Ok(RenderStyle::Repr),
            "tree" => Ok(RenderStyle::Tree),
            "json" => Ok(RenderStyle::Json),
            other => Err(AppError::Config {
                message: format!("unknown style '{other}' (expected repr, tree or json)"),
            }),
        }
    }
}

/// Effective settings after all layers are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Flatten gradients of tracked leaves as extra leaves
    pub include_gradient_leaves: bool,
    /// Default output style for `pytree spec`
    pub style: RenderStyle,
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub include_gradient_leaves: Option<bool>,
    pub style: Option<RenderStyle>,
}

/// Get the XDG config directory for pytree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pytree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pytree.toml"))
}

/// Local config file looked up in the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(".pytree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> AppResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            include_gradient_leaves: overlay
                .include_gradient_leaves
                .unwrap_or(self.include_gradient_leaves),
            style: overlay.style.unwrap_or(self.style),
        }
    }

    /// Load settings from every layer.
    ///
    /// An explicit `local` path must exist; the implicit `./.pytree.toml` is
    /// optional.
    #[instrument(level = "debug")]
    pub fn load(local: Option<&Path>) -> AppResult<Self> {
        Self::load_from(global_config_path().as_deref(), local)
    }

    /// Same as [`Settings::load`] with the global config file given explicitly.
    ///
    /// A missing `global` file is skipped; `None` skips the global layer.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> AppResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!(path = %global_path.display(), "applying global config");
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Local config
        match local {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let path = local_config_path();
                if path.exists() {
                    debug!(path = %path.display(), "applying local config");
                    current = current.merge_with(&load_raw_settings(&path)?);
                }
            }
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply PYTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> AppResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("PYTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        // Absent keys inherit; present but unparsable keys are errors.
        match config.get_bool("include_gradient_leaves") {
            Ok(val) => settings.include_gradient_leaves = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        match config.get_string("style") {
            Ok(val) => settings.style = val.parse()?,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config {
            message: e.to_string(),
        })
    }

    /// Commented template for a new config file.
    pub fn template() -> String {
        r#"# pytree configuration
# Global: ~/.config/pytree/pytree.toml
# Local:  ./.pytree.toml (or pass --config <file>)

# Flatten the gradient of tracked leaves as an extra leaf
# include_gradient_leaves = false

# Default output of `pytree spec`: "repr", "tree" or "json"
# style = "repr"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> AppError {
    AppError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_defaults_when_created_then_repr_without_gradients() {
        let settings = Settings::default();
        assert!(!settings.include_gradient_leaves);
        assert_eq!(settings.style, RenderStyle::Repr);
    }

    #[test]
    fn given_partial_overlay_when_merged_then_keeps_unspecified_fields() {
        let base = Settings {
            include_gradient_leaves: true,
            style: RenderStyle::Tree,
        };
        let overlay = RawSettings {
            include_gradient_leaves: None,
            style: Some(RenderStyle::Json),
        };
        let merged = base.merge_with(&overlay);
        assert!(merged.include_gradient_leaves);
        assert_eq!(merged.style, RenderStyle::Json);
    }

    #[rstest]
    #[case("repr", RenderStyle::Repr)]
    #[case("TREE", RenderStyle::Tree)]
    #[case(" json ", RenderStyle::Json)]
    fn given_style_name_when_parsed_then_matches(#[case] raw: &str, #[case] expected: RenderStyle) {
        assert_eq!(raw.parse::<RenderStyle>().unwrap(), expected);
    }

    #[test]
    fn given_unknown_style_when_parsed_then_config_error() {
        let err = "yaml".parse::<RenderStyle>().unwrap_err();
        assert!(err.to_string().contains("unknown style 'yaml'"));
    }

    #[test]
    fn given_settings_when_serialized_then_toml_parses_back() {
        let settings = Settings {
            include_gradient_leaves: true,
            style: RenderStyle::Tree,
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("style = \"tree\""));
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.include_gradient_leaves.is_none());
        assert!(raw.style.is_none());
    }
}
