// src/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::ConfigError;
use crate::save::LoadPolicy;

pub const DEFAULT_CONFIG_FILENAME: &str = "click_chess.json";
pub const DEFAULT_SAVE_FILENAME: &str = "chess_save.txt";

/// Settings for the terminal game, read from a JSON file. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reject saved games with unusable lines instead of skipping them.
    pub strict_load: bool,
    pub white_moves_first: bool,
    pub save_path: String,
    /// List legal destinations after a piece is selected.
    pub show_destinations: bool,
    /// Chess glyphs when true, ASCII letters otherwise.
    pub unicode_glyphs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strict_load: false,
            white_moves_first: true,
            save_path: DEFAULT_SAVE_FILENAME.to_string(),
            show_destinations: true,
            unicode_glyphs: true,
        }
    }
}

impl Config {
    pub fn from_json(text: &str, path: &Path) -> Result<Config, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Config::from_json(&text, path)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Config::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            other => other,
        }
    }

    pub fn load_policy(&self) -> LoadPolicy {
        if self.strict_load { LoadPolicy::Strict } else { LoadPolicy::Lenient }
    }
}
