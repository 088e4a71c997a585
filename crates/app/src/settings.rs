//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` next to the binary, then from `BBOARD__*`
//! environment variables (e.g. `BBOARD__SERVER__PORT=8000`).
//!
//! See `settings.toml` for the configuration.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

#[derive(Debug, Default, Deserialize)]
pub struct Listing {
    /// Titles refused on submission. When absent the built-in list is used.
    pub banned_titles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub listing: Listing,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("BBOARD").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
