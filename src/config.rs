use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::catalogue::ExerciseId;
use crate::engine::{JudgmentKeys, KeyBindingError};
use crate::session::Level;

pub const DEFAULT_TICK_RATE_MS: u64 = 25;

/// Preferences remembered between launches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub level: Level,
    pub exercise: ExerciseId,
    pub congruent_key: char,
    pub incongruent_key: char,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let keys = JudgmentKeys::default();
        Self {
            level: Level::default(),
            exercise: ExerciseId::default(),
            congruent_key: keys.congruent,
            incongruent_key: keys.incongruent,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<JudgmentKeys, KeyBindingError> {
        JudgmentKeys::new(self.congruent_key, self.incongruent_key)
    }

    /// The configured keys, or z/x when they cannot be told apart
    pub fn keys(&self) -> JudgmentKeys {
        self.validate().unwrap_or_default()
    }

    /// Replaces an unusable key pair with the defaults
    pub fn with_valid_keys(mut self) -> Self {
        if let Err(err) = self.validate() {
            tracing::warn!(%err, "resetting judgment keys to defaults");
            let keys = JudgmentKeys::default();
            self.congruent_key = keys.congruent;
            self.incongruent_key = keys.incongruent;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("flashdrill_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files yield the defaults.
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "no config file, using defaults");
                return Config::default();
            }
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.with_valid_keys(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
