use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::settings::{DEFAULT_DAILY_MAX, DEFAULT_PASSING, DEFAULT_QUESTIONS, DEFAULT_REWARD};

pub const APP_DIR: &str = "screentime-quiz";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup configuration. Quiz values are raw here and get clamped when
/// turned into [`crate::settings::Settings`].
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub passing_percentage: u32,
    pub questions_per_session: u32,
    pub reward_minutes: u32,
    pub daily_max_minutes: u32,
    pub daily_cap_enabled: bool,
    pub theme: String,
    pub notifications: bool,
    pub sound_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            passing_percentage: DEFAULT_PASSING,
            questions_per_session: DEFAULT_QUESTIONS,
            reward_minutes: DEFAULT_REWARD,
            daily_max_minutes: DEFAULT_DAILY_MAX,
            daily_cap_enabled: true,
            theme: "default".into(),
            notifications: true,
            sound_enabled: true,
        }
    }
}

pub fn default_path() -> PathBuf {
    let mut path = PathBuf::from(".");
    path.push(APP_DIR);
    path.push(CONFIG_FILE);
    path
}

/// Read the config file. A missing file is not an error and yields defaults.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::Io { path: path.to_path_buf(), source });
        }
    };
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
