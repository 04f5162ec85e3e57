//! Gateway configuration loaded from a TOML file
//!
//! Loaded once at startup and never mutated afterwards.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default bind address when the file does not set one
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config value `{0}` must not be empty")]
    Empty(&'static str),
}

/// Backend endpoints and per-request limits
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NavConfig {
    /// Nominatim base URL; `/search` is appended
    pub nominatim_url: String,

    /// Full Valhalla route endpoint
    pub valhalla_url: String,

    /// Transitland API base; enables itinerary routing when set
    #[serde(default)]
    pub transitland_url: Option<String>,

    #[serde(default)]
    pub transitland_api_key: Option<String>,

    /// Country whose transit requests go to the itinerary backend
    #[serde(default = "default_transit_country")]
    pub transit_country: String,

    /// Applied to every outbound backend call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_transit_country() -> String {
    "us".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            nominatim_url: String::new(),
            valhalla_url: String::new(),
            transitland_url: None,
            transitland_api_key: None,
            transit_country: default_transit_country(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,

    pub nav: NavConfig,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Config {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(text)?;
        config.nav.normalize()?;
        Ok(config)
    }

    /// Replace the port of the listen address, keeping the host
    pub fn with_port(mut self, port: u16) -> Self {
        let host = self
            .listen
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| self.listen.clone());
        self.listen = format!("{host}:{port}");
        self
    }
}

impl NavConfig {
    /// Trim URLs, drop blank optional values, reject blank required ones
    fn normalize(&mut self) -> Result<(), ConfigError> {
        self.nominatim_url = self.nominatim_url.trim().trim_end_matches('/').to_string();
        self.valhalla_url = self.valhalla_url.trim().to_string();
        if self.nominatim_url.is_empty() {
            return Err(ConfigError::Empty("nav.nominatim_url"));
        }
        if self.valhalla_url.is_empty() {
            return Err(ConfigError::Empty("nav.valhalla_url"));
        }

        self.transitland_url = self
            .transitland_url
            .take()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        self.transitland_api_key = self
            .transitland_api_key
            .take()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self.transit_country = self.transit_country.trim().to_lowercase();
        Ok(())
    }
}
