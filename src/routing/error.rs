use thiserror::Error;

/// Errors raised while declaring routes or rendering links.
///
/// Resolution failures are not errors; see [`NoMatch`](crate::routing::NoMatch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Invalid route template '{pattern}': {reason}")]
    InvalidTemplate { pattern: String, reason: String },

    #[error("Unknown parameter kind '{kind}'")]
    UnknownParamKind { kind: String },

    #[error("Parameter '{name}' declared twice in route '{route}'")]
    DuplicateParam { route: String, name: String },

    #[error("Route '{route}' has no path parameter named '{name}'")]
    UnknownParam { route: String, name: String },

    #[error("Route '{name}' is already registered")]
    DuplicateRoute { name: String },

    #[error("Route '{name}' is not registered")]
    UnknownRoute { name: String },

    #[error("Missing value for '{name}' when rendering route '{route}'")]
    MissingValue { route: String, name: String },

    #[error("Value '{value}' is not a valid {kind} for '{name}' in route '{route}'")]
    InvalidValue {
        route: String,
        name: String,
        kind: String,
        value: String,
    },
}
