// src/config/settings.rs
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{CATEGORICAL_THRESHOLD, RESULTS_INCREMENT};

const APP_DIR: &str = "cellline-explorer";
const SETTINGS_FILE: &str = "settings.ron";
const HISTORY_FILE: &str = "query_history.json";
const ENV_PREFIX: &str = "CELLLINE";
const DEFAULT_API_ROOT: &str = "http://localhost:8000/api/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Base URL every endpoint path is appended to
    pub api_root: String,
    pub results_increment: usize,
    pub categorical_threshold: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            results_increment: RESULTS_INCREMENT,
            categorical_threshold: CATEGORICAL_THRESHOLD,
            history_path: None,
        }
    }
}

impl Settings {
    /// Defaults, then the user's settings file, then `CELLLINE_*` variables
    pub fn load() -> Result<Self> {
        let path = settings_dir().map(|dir| dir.join(SETTINGS_FILE));
        if let Some(path) = &path {
            if !path.exists() {
                if let Err(e) = write_default(path) {
                    log::warn!("Could not write default settings to {}: {:#}", path.display(), e);
                }
            }
        }
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("api_root", defaults.api_root)?
            .set_default("results_increment", defaults.results_increment as i64)?
            .set_default("categorical_threshold", defaults.categorical_threshold as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        if !self.api_root.ends_with('/') {
            self.api_root.push('/');
        }
        self.results_increment = self.results_increment.max(1);
        self.categorical_threshold = self.categorical_threshold.max(1);
        self
    }

    /// Where the query history lives unless overridden
    pub fn history_file(&self) -> Option<PathBuf> {
        self.history_path.clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR).join(HISTORY_FILE)))
    }
}

fn settings_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

fn write_default(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = ron::ser::to_string_pretty(
        &Settings::default(),
        ron::ser::PrettyConfig::new()
            .new_line("\n".to_string())
            .depth_limit(4)
    )?;
    fs::write(path, content)?;
    log::info!("Wrote default settings to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("absent.ron"))).unwrap();
        assert_eq!(settings.results_increment, RESULTS_INCREMENT);
        assert_eq!(settings.categorical_threshold, CATEGORICAL_THRESHOLD);
        assert!(settings.api_root.ends_with('/'));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");
        fs::write(&path, r#"(api_root: "https://example.org/api", results_increment: 50, categorical_threshold: 6)"#).unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.api_root, "https://example.org/api/");
        assert_eq!(settings.results_increment, 50);
        assert_eq!(settings.categorical_threshold, 6);
    }

    #[test]
    fn default_file_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.ron");
        write_default(&path).unwrap();
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.api_root, DEFAULT_API_ROOT);
        assert_eq!(settings.results_increment, RESULTS_INCREMENT);
    }

    #[test]
    fn zero_increment_is_raised_to_one() {
        let settings = Settings { results_increment: 0, ..Settings::default() }.normalized();
        assert_eq!(settings.results_increment, 1);
    }
}
