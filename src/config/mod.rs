//! Configuration management for hookstack
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. built-in defaults
//! 2. user config `~/.config/hookstack/config.{toml,json,yaml,yml}`
//! 3. repository config `hookstack.{toml,json,yaml,yml}` at the project root
//! 4. an explicit `--config <file>`
//! 5. `HOOKSTACK_` environment variables, `__` separating nested keys
//!    (`HOOKSTACK_RUN__SHOW_OUTPUT=true`)

use crate::error::Result;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "HOOKSTACK_";
const REPO_CONFIG_STEM: &str = "hookstack";

/// Effective hookstack settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub setup: SetupSettings,
    #[serde(default)]
    pub run: RunSettings,
}

/// Settings read by `hookstack setup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupSettings {
    /// Hook manager configuration file, relative to the project root
    pub config_file: String,
    /// Hook manager executable
    pub hook_manager: String,
}

impl SetupSettings {
    /// Absolute path of the hook manager configuration for `root`
    pub fn config_path(&self, root: &Path) -> PathBuf {
        root.join(&self.config_file)
    }
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self {
            config_file: ".pre-commit-config.yaml".to_string(),
            hook_manager: "pre-commit".to_string(),
        }
    }
}

/// Settings read by `hookstack run`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunSettings {
    /// Check names to skip (case-insensitive)
    #[serde(default)]
    pub skip: Vec<String>,
    /// Print tool output for passing checks too
    #[serde(default)]
    pub show_output: bool,
}

impl Settings {
    /// Load settings for a project rooted at `root`
    pub fn load(root: Option<&Path>, custom_config: Option<&Path>) -> Result<Self> {
        let settings = Self::figment(root, custom_config).extract()?;
        tracing::debug!("Loaded settings: {settings:?}");
        Ok(settings)
    }

    fn figment(root: Option<&Path>, custom_config: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if let Some(user_dir) = Self::user_config_dir() {
            figment = Self::merge_all_formats(figment, &user_dir.join("config"));
        }

        if let Some(root) = root {
            figment = Self::merge_all_formats(figment, &root.join(REPO_CONFIG_STEM));
        }

        if let Some(custom_path) = custom_config {
            figment = match custom_path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        }

        // Environment variables always have highest priority
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Merge `<stem>.toml`, `.json`, `.yaml` and `.yml`, whichever exist
    fn merge_all_formats(figment: Figment, stem: &Path) -> Figment {
        let with = |ext: &str| stem.with_extension(ext);
        figment
            .merge(Toml::file(with("toml")))
            .merge(Json::file(with("json")))
            .merge(Yaml::file(with("yaml")))
            .merge(Yaml::file(with("yml")))
    }

    fn user_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("hookstack"))
    }
}
