use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;
use crate::routing::{RouteError, RouteTemplate};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },

    #[error("Invalid route in config: {0}")]
    Route(#[from] RouteError),
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/elmland/elmland.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("elmland").join("elmland.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - Otherwise parses and validates it.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Config::default());
        }

        Self::load_from(&path)
    }

    /// Loads and validates configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The base path starts with '/'
    /// - The history limit is non-zero
    /// - Every route template compiles with its declared kinds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.app.base_path.starts_with('/') {
            return Err(ConfigError::ValidationError {
                message: format!("base_path '{}' must start with '/'", self.app.base_path),
            });
        }

        if self.app.history_limit == 0 {
            return Err(ConfigError::ValidationError {
                message: "history_limit must be at least 1".to_string(),
            });
        }

        self.route_templates()?;
        Ok(())
    }

    /// Compile one manifest route by name.
    pub fn route_template(&self, name: &str) -> Result<RouteTemplate, ConfigError> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| ConfigError::ValidationError {
                message: format!("Route '{}' not found in config", name),
            })?;

        let mut template = RouteTemplate::parse(name, &route.path)?;
        for (param, kind) in &route.params {
            template = template.with_param_kind(param, kind.clone())?;
        }
        for query in &route.query {
            template = template.with_query(&query.name, query.kind.clone(), query.required)?;
        }
        Ok(template)
    }

    /// Compile every manifest route, in name order.
    pub fn route_templates(&self) -> Result<Vec<RouteTemplate>, ConfigError> {
        self.routes
            .keys()
            .map(|name| self.route_template(name))
            .collect()
    }
}
