use crate::error::{Error, Result};
use crate::lookup::{CandidatePolicy, DEFAULT_API_BASE};
use crate::store::{FileStore, KeyValueStore, UnavailableStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

const APP_DIR: &str = "wordbook";
const CONFIG_FILE: &str = "config.json";
const FAVORITES_FILE: &str = "favorites.json";

/// Color scheme for rendered entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Guesses the terminal background from `COLORFGBG`, falling back to light.
    pub fn detect() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|value| Self::from_colorfgbg(&value))
            .unwrap_or_default()
    }

    fn from_colorfgbg(value: &str) -> Option<Self> {
        let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(match background {
            0..=6 | 8 => Theme::Dark,
            _ => Theme::Light,
        })
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// User settings, stored as JSON in the platform config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    /// Favorites file; defaults to `<data dir>/wordbook/favorites.json`.
    pub store_path: Option<PathBuf>,
    pub candidates: CandidatePolicy,
    /// Unset means "follow the terminal".
    pub theme: Option<Theme>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            store_path: None,
            candidates: CandidatePolicy::default(),
            theme: None,
        }
    }
}

impl Config {
    /// `~/.config/wordbook/config.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads the user config, returning defaults if it is missing or invalid.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => return Self::default(),
        };
        serde_json::from_str(&data).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring invalid config");
            Self::default()
        })
    }

    /// Persists to the default location and returns the path written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| Error::Config("no config directory on this platform".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::Config(format!("{}: {err}", parent.display())))?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| Error::Config(err.to_string()))?;
        fs::write(path, data).map_err(|err| Error::Config(format!("{}: {err}", path.display())))
    }

    pub fn effective_theme(&self) -> Theme {
        self.theme.unwrap_or_else(Theme::detect)
    }

    pub fn favorites_path(&self) -> Option<PathBuf> {
        self.store_path
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR).join(FAVORITES_FILE)))
    }

    /// Opens the favorites store, or an always-failing one when there is no
    /// place to keep it.
    pub fn open_store(&self) -> Arc<dyn KeyValueStore> {
        match self.favorites_path() {
            Some(path) => Arc::new(FileStore::new(path)),
            None => {
                warn!("no data directory; favorites will not be kept");
                Arc::new(UnavailableStore::new("no data directory on this platform"))
            }
        }
    }
}
