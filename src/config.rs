//! Configuration for the flashcards application

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "danish-flashcards";
const LOCAL_CONFIG: &str = "flashcards.yml";

/// `<config dir>/danish-flashcards/config.yml`, the first place `load` looks.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR).join("config.yml"))
}

/// How the review screen asks for a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingMode {
    /// Six buttons, quality 0-5
    #[default]
    Scale,
    /// Hard / Medium / Easy
    ThreeButton,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Create the built-in Danish deck when the database has no decks
    #[serde(default = "default_seed_sample_deck")]
    pub seed_sample_deck: bool,

    #[serde(default)]
    pub grading_mode: GradingMode,

    #[serde(default = "default_window_width")]
    pub window_width: f32,

    #[serde(default = "default_window_height")]
    pub window_height: f32,
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("db.sqlite3")
}

fn default_seed_sample_deck() -> bool {
    true
}

fn default_window_width() -> f32 {
    500.0
}

fn default_window_height() -> f32 {
    700.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            seed_sample_deck: default_seed_sample_deck(),
            grading_mode: GradingMode::default(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [user_config_path(), Some(PathBuf::from(LOCAL_CONFIG))];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file, creating its directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("grading_mode: three_button\n").unwrap();

        assert_eq!(config.grading_mode, GradingMode::ThreeButton);
        assert!(config.seed_sample_deck);
        assert_eq!(config.window_width, 500.0);
        assert!(config.database_path.ends_with("db.sqlite3"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "database_path: /tmp/cards.sqlite3\nseed_sample_deck: false\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/cards.sqlite3"));
        assert!(!config.seed_sample_deck);
        assert_eq!(config.grading_mode, GradingMode::Scale);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        let config = Config {
            grading_mode: GradingMode::ThreeButton,
            window_height: 800.0,
            ..Config::default()
        };

        config.save(&path).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();

        assert_eq!(loaded.grading_mode, GradingMode::ThreeButton);
        assert_eq!(loaded.window_height, 800.0);
        assert_eq!(loaded.database_path, config.database_path);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let missing = PathBuf::from("/nonexistent/flashcards/config.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
