//! # Configuration Module
//!
//! Data directory layout and runtime tuning.
//!
//! Everything lives in the platform data directory:
//! - Linux: `~/.local/share/moodmix/`
//! - macOS: `~/Library/Application Support/moodmix/`
//! - Windows: `%APPDATA%\moodmix\`
//!
//! | File | Contents |
//! |---|---|
//! | `config.json` | [`AppConfig`], every field optional |
//! | `hr_baselines.json` | calibrated resting heart rates |
//! | `feedback.db` | playlist feedback |

use crate::acquisition::AcquisitionConfig;
use crate::algorithm::SelectionConfig;
use crate::fusion::FusionConfig;
use crate::heart_rate::HeartRateConfig;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const BASELINES_FILE: &str = "hr_baselines.json";
pub const FEEDBACK_DB_FILE: &str = "feedback.db";

/// Returns the moodmix data directory, creating it if needed.
///
/// # Errors
///
/// Fails if the platform has no data directory or it cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let app_dir = data_dir.join("moodmix");
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Tunable behavior, loaded from `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fusion: FusionConfig,
    pub acquisition: AcquisitionConfig,
    pub selection: SelectionConfig,
    pub heart_rate: HeartRateConfig,
}

impl AppConfig {
    /// Reads `path`. A missing file gives the defaults; an unreadable or
    /// malformed one is reported and also gives the defaults.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("Could not read config {}: {e}, using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Invalid config {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to encode config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

/// Resolved file locations for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub config_path: PathBuf,
    pub baselines_path: PathBuf,
    pub feedback_db_path: PathBuf,
}

impl RuntimeConfig {
    /// Default locations inside the data directory.
    pub fn new() -> Result<Self> {
        Ok(Self::in_dir(&get_data_dir()?))
    }

    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_path: dir.join(CONFIG_FILE),
            baselines_path: dir.join(BASELINES_FILE),
            feedback_db_path: dir.join(FEEDBACK_DB_FILE),
        }
    }

    /// Resolves each path from its override, falling back to the data
    /// directory only when something is left unset.
    pub fn resolve(
        config: Option<PathBuf>,
        baselines: Option<PathBuf>,
        feedback_db: Option<PathBuf>,
    ) -> Result<Self> {
        if let (Some(config_path), Some(baselines_path), Some(feedback_db_path)) =
            (config.clone(), baselines.clone(), feedback_db.clone())
        {
            return Ok(Self {
                config_path,
                baselines_path,
                feedback_db_path,
            });
        }

        let defaults = Self::new()?;
        Ok(Self {
            config_path: config.unwrap_or(defaults.config_path),
            baselines_path: baselines.unwrap_or(defaults.baselines_path),
            feedback_db_path: feedback_db.unwrap_or(defaults.feedback_db_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json"));
        assert_eq!(config.selection.playlist_length, 20);
        assert_eq!(config.acquisition.query_limit, 30);
        assert_eq!(config.fusion.confidence_threshold, 0.7);
        assert_eq!(config.heart_rate.age, 30);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{"selection": {"max_per_artist": 3}, "heart_rate": {"age": 45}}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.selection.max_per_artist, 3);
        assert_eq!(config.selection.playlist_length, 20);
        assert_eq!(config.selection.scoring.weights.energy, 1.0);
        assert_eq!(config.heart_rate.age, 45);
        assert_eq!(config.heart_rate.default_resting_hr, 70);
    }

    #[test]
    fn test_malformed_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "selection = 3").unwrap();
        assert_eq!(AppConfig::load(&path).acquisition.genre_goal, 15);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = AppConfig::default();
        config.acquisition.tempo_band = 15.0;
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).acquisition.tempo_band, 15.0);
    }

    #[test]
    fn test_runtime_paths_in_dir() {
        let runtime = RuntimeConfig::in_dir(Path::new("/tmp/mm"));
        assert_eq!(runtime.baselines_path, Path::new("/tmp/mm/hr_baselines.json"));
        assert_eq!(runtime.feedback_db_path, Path::new("/tmp/mm/feedback.db"));

        let explicit = RuntimeConfig::resolve(
            Some("a.json".into()),
            Some("b.json".into()),
            Some("c.db".into()),
        )
        .unwrap();
        assert_eq!(explicit.config_path, PathBuf::from("a.json"));
    }
}
