//! Persisted tool configuration
//!
//! Stored as JSON at `<config dir>/MacMeta/config.json`. Missing keys take
//! their defaults, so an empty object is a valid config.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::DIAGNOSTICS_SOURCE;
use crate::error::Result;
use crate::mods::package::{DEFAULT_DIVINE, Divine, Game};

/// Environment variable overriding [`Config::divine_path`].
pub const DIVINE_PATH_ENV: &str = "MACMETA_DIVINE_PATH";

fn default_divine_path() -> String {
    DEFAULT_DIVINE.to_string()
}

fn default_diagnostics_source() -> String {
    DIAGNOSTICS_SOURCE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the LSLib command line tool
    #[serde(default = "default_divine_path")]
    pub divine_path: String,
    /// Game passed to the packaging tool
    #[serde(default)]
    pub game: Game,
    /// Source name reported with every diagnostic
    #[serde(default = "default_diagnostics_source")]
    pub diagnostics_source: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            divine_path: default_divine_path(),
            game: Game::default(),
            diagnostics_source: default_diagnostics_source(),
        }
    }
}

impl Config {
    /// Get the config file path
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("MacMeta").join("config.json"))
    }

    /// Load config from disk, or return default
    ///
    /// A missing or unreadable file is not an error here.
    #[must_use]
    pub fn load() -> Self {
        let content = Self::config_path().and_then(|path| fs::read_to_string(path).ok());
        Self::from_json_or_default(content.as_deref()).with_env_overrides()
    }

    /// Parse config JSON, falling back to defaults when absent or invalid
    fn from_json_or_default(content: Option<&str>) -> Self {
        content
            .and_then(|content| serde_json::from_str::<Self>(content).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid config JSON.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        debug!("loaded config from {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Save config to `path` as pretty JSON
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("saved config to {}", path.display());
        Ok(())
    }

    /// The packaging tool described by this config.
    #[must_use]
    pub fn divine(&self) -> Divine {
        Divine::new(&self.divine_path, self.game)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(DIVINE_PATH_ENV) {
            if !path.is_empty() {
                self.divine_path = path;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config: Config = serde_json::from_str(r#"{ "game": "dos2de" }"#).unwrap();
        assert_eq!(config.game, Game::Dos2de);
        assert_eq!(config.divine_path, "divine.exe");
        assert_eq!(config.diagnostics_source, "BG3XML");
    }

    #[test]
    fn test_unreadable_content_falls_back_to_defaults() {
        assert_eq!(Config::from_json_or_default(None), Config::default());
        assert_eq!(Config::from_json_or_default(Some("{ not json")), Config::default());

        let config = Config::from_json_or_default(Some(r#"{ "divine_path": "/opt/divine", "game": "bg3" }"#));
        assert_eq!(config.divine_path, "/opt/divine");
        assert_eq!(config.game, Game::Bg3);
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            divine_path: "/opt/lslib/divine".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
        assert!(Config::load_from(dir.path().join("missing.json")).is_err());
    }
}
