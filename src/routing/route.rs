use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::routing::params::{FromParam, ParamValue};

/// Name given to the synthetic route handed to the not-found page.
pub const NOT_FOUND_ROUTE: &str = "not-found";

/// A resolved, fully typed location.
///
/// Fields are private: once the router produces a `Route` nothing downstream
/// can change or re-parse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    name: String,
    path: String,
    params: Vec<(String, ParamValue)>,
    query: BTreeMap<String, ParamValue>,
}

impl Route {
    pub(crate) fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        params: Vec<(String, ParamValue)>,
        query: BTreeMap<String, ParamValue>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            params,
            query,
        }
    }

    /// Route handed to the not-found page for an unresolvable location.
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::new(NOT_FOUND_ROUTE, path, Vec::new(), BTreeMap::new())
    }

    /// Name of the template that matched.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The location path this route was resolved from (without query).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_not_found(&self) -> bool {
        self.name == NOT_FOUND_ROUTE
    }

    /// Path parameters in template order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Typed path parameter, e.g. `route.get::<i64>("id")`.
    pub fn get<T: FromParam>(&self, name: &str) -> Option<T> {
        self.param(name).and_then(T::from_param)
    }

    pub fn query(&self, name: &str) -> Option<&ParamValue> {
        self.query.get(name)
    }

    /// Typed query value; `None` when the optional value was absent.
    pub fn query_get<T: FromParam>(&self, name: &str) -> Option<T> {
        self.query(name).and_then(T::from_param)
    }

    pub fn query_values(&self) -> &BTreeMap<String, ParamValue> {
        &self.query
    }

    /// True when both routes came from the same template.
    pub fn same_template(&self, other: &Route) -> bool {
        self.name == other.name
    }

    /// True when both routes select the same view with the same values.
    /// Spelling differences such as a trailing slash or an encoded
    /// character do not count; for the not-found route the path does.
    pub fn same_target(&self, other: &Route) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.query == other.query
            && (!self.is_not_found() || self.path == other.path)
    }
}

/// Why a location did not resolve to a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoMatch {
    #[error("No route matches '{path}'")]
    UnknownPath { path: String },

    #[error("Location '{location}' is outside base path '{base}'")]
    OutsideBase { location: String, base: String },

    #[error("Malformed location '{location}'")]
    Malformed { location: String },

    #[error("Route '{route}' requires query parameter '{name}'")]
    MissingQuery { route: String, name: String },

    #[error("Query parameter '{name}' of route '{route}' has untypeable value '{value}'")]
    InvalidQuery {
        route: String,
        name: String,
        value: String,
    },
}
