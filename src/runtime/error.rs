use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::routing::RouteError;

/// Errors detected while assembling an application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Page '{page}' renders in layout '{layout}', which is not registered")]
    LayoutNotRegistered { page: &'static str, layout: &'static str },

    #[error("Layout '{layout}' is registered twice")]
    DuplicateLayout { layout: &'static str },

    #[error("No not-found page registered")]
    NotFoundPageMissing,

    #[error("No tokio runtime available to run effects")]
    NoAsyncRuntime,

    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Which level of the application a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Shared,
    Layout,
    Page,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Shared => f.write_str("shared"),
            Tier::Layout => f.write_str("layout"),
            Tier::Page => f.write_str("page"),
        }
    }
}

/// A message or model did not have the type the receiving tier expects.
///
/// Only reachable through the untyped `dispatch_*` entry points; the
/// runtime logs and drops the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    #[error("{tier} '{name}' received a message of another type")]
    MessageMismatch { tier: Tier, name: &'static str },

    #[error("{tier} '{name}' has no model of the expected type")]
    ModelMissing { tier: Tier, name: &'static str },
}
