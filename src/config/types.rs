use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::ParamKind;

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Route manifest keyed by route name.
    #[serde(default)]
    pub routes: BTreeMap<String, RouteConfig>,
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Prefix every location must carry (default: "/").
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Maximum number of entries kept in the navigation history (default: 100).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `ELMLAND_LOG` is unset (default: "info").
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Write logs to `{file}.{timestamp}.{pid}` instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

/// One `[routes.<name>]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Template such as `/users/:id`; kinds may be inline (`:id<int>`).
    pub path: String,
    /// Kinds for path parameters, overriding inline declarations.
    #[serde(default)]
    pub params: BTreeMap<String, ParamKind>,
    #[serde(default)]
    pub query: Vec<QueryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub name: String,
    #[serde(default)]
    pub kind: ParamKind,
    #[serde(default)]
    pub required: bool,
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_history_limit() -> usize {
    100
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            history_limit: default_history_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            file: None,
            ansi: default_ansi(),
        }
    }
}
