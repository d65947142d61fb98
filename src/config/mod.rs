//! TOML manifest: runtime settings, logging and the route table.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{AppConfig, Config, LoggingConfig, QueryConfig, RouteConfig};
