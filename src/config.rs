use crate::error::{Error, VestigeResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the OAuth client ID
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
/// Environment variable holding the OAuth client secret
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";
/// Environment variable holding the API developer key
pub const DEVELOPER_KEY_VAR: &str = "DEVELOPER_KEY";

/// Optional settings file read from the working directory
pub const SETTINGS_FILE: &str = "vestige.toml";

/// Default credential file, relative to the working directory
pub const DEFAULT_TOKEN_FILE: &str = "calendar.dat";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google API OAuth client ID
    pub client_id: String,
    /// Google API OAuth client secret
    pub client_secret: String,
    /// Google API developer key, sent with every request
    pub developer_key: String,
    /// Optional behaviour from `vestige.toml`
    pub settings: Settings,
}

/// Settings that may be tuned in `vestige.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the OAuth token is cached between runs
    pub token_file: PathBuf,
    /// Name of the calendar receiving uncategorised events
    pub default_calendar: Option<String>,
    /// Route `Category - Task` descriptions to per-category calendars
    pub categories: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            default_calendar: None,
            categories: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when it is absent
    pub fn load(path: impl AsRef<Path>) -> VestigeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Config {
    /// Load configuration from environment and settings file
    pub fn load() -> VestigeResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let settings = Settings::load(SETTINGS_FILE)?;
        Self::from_lookup(|key| env::var(key).ok(), settings)
    }

    /// Build the configuration from any key lookup.
    ///
    /// Every required key is checked before failing, so the error names all
    /// of the missing ones at once. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F, settings: Settings) -> VestigeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut require = |key: &str| match lookup(key) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(key.to_string());
                String::new()
            }
        };

        let client_id = require(CLIENT_ID_VAR);
        let client_secret = require(CLIENT_SECRET_VAR);
        let developer_key = require(DEVELOPER_KEY_VAR);

        if !missing.is_empty() {
            return Err(Error::Environment(missing));
        }

        Ok(Config {
            client_id,
            client_secret,
            developer_key,
            settings,
        })
    }
}
