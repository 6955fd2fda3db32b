use crate::cube::{Measure, MissingKeyPolicy};
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How many cube files the "recent" list remembers.
pub const MAX_RECENT_CUBES: usize = 10;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Measure preselected in the aggregation form and used by the CLI when none is given
    pub default_measure: Measure,
    /// What aggregation does with facts lacking a filtered or grouped dimension
    pub missing_keys: MissingKeyPolicy,
    /// Maximum entries kept in the activity log (default: 500)
    pub activity_log_capacity: usize,
    /// Most recently loaded or saved cube files, newest first
    pub recent_cubes: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_measure: Measure::Sum,
            missing_keys: MissingKeyPolicy::Reject,
            activity_log_capacity: 500,
            recent_cubes: Vec::new(),
        }
    }
}

impl AppSettings {
    /// Moves `path` to the front of the recent list.
    pub fn remember_cube(&mut self, path: &Path) {
        let entry = path.display().to_string();
        self.recent_cubes.retain(|p| *p != entry);
        self.recent_cubes.insert(0, entry);
        self.recent_cubes.truncate(MAX_RECENT_CUBES);
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub settings: AppSettings,
}

impl AppConfig {
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AppSettings {
        &mut self.settings
    }
}

pub fn get_config_path() -> PathBuf {
    crate::utils::standard_paths().base_dir.join("config.json")
}

/// Loads the config, falling back to defaults when the file is absent or unreadable.
pub fn load_app_config() -> AppConfig {
    load_app_config_from(&get_config_path())
}

pub fn load_app_config_from(path: &Path) -> AppConfig {
    if path.exists()
        && let Ok(content) = std::fs::read_to_string(path)
    {
        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => return config,
            Err(e) => tracing::warn!("Ignoring unreadable config {}: {e}", path.display()),
        }
    }
    AppConfig::default()
}

/// # Errors
///
/// Returns error if the config directory or file cannot be written.
pub fn save_app_config(config: &AppConfig) -> Result<()> {
    save_app_config_to(config, &get_config_path())
}

pub fn save_app_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}
