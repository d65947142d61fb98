//! Ordered route table: first registered template that fully matches wins.

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::config::{Config, ConfigError};
use crate::routing::error::RouteError;
use crate::routing::params::ParamValue;
use crate::routing::route::{NoMatch, Route};
use crate::routing::template::RouteTemplate;

#[derive(Debug, Clone, Default)]
pub struct Router {
    base: Vec<String>,
    templates: Vec<RouteTemplate>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router from the `[app]` and `[routes]` manifest sections.
    ///
    /// Manifest routes are registered in name order; applications that rely
    /// on registration order for overlapping templates should register those
    /// in code.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut router = Router::new().with_base_path(&config.app.base_path)?;
        for template in config.route_templates()? {
            router.register(template)?;
        }
        Ok(router)
    }

    /// Require every location to start with `base` (e.g. `/app`).
    pub fn with_base_path(mut self, base: &str) -> Result<Self, RouteError> {
        if !base.starts_with('/') {
            return Err(RouteError::InvalidTemplate {
                pattern: base.to_string(),
                reason: "base path must start with '/'".to_string(),
            });
        }
        self.base = base
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Ok(self)
    }

    pub fn base_path(&self) -> String {
        format!("/{}", self.base.join("/"))
    }

    /// Append a template. Order of registration is the tie-break order.
    pub fn register(&mut self, template: RouteTemplate) -> Result<(), RouteError> {
        if self.template(template.name()).is_some() {
            return Err(RouteError::DuplicateRoute {
                name: template.name().to_string(),
            });
        }
        self.templates.push(template);
        Ok(())
    }

    pub fn templates(&self) -> &[RouteTemplate] {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&RouteTemplate> {
        self.templates.iter().find(|t| t.name() == name)
    }

    /// Resolve a location (`/path?query#fragment`) to a route.
    ///
    /// Path templates are tried in registration order; a parameter that
    /// fails to parse makes its template fall through to the next one.
    /// Query values are typed against the template whose path matched, and a
    /// failure there is final.
    pub fn resolve(&self, location: &str) -> Result<Route, NoMatch> {
        let without_fragment = location.split_once('#').map_or(location, |(l, _)| l);
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));

        if !path.starts_with('/') {
            return Err(NoMatch::Malformed {
                location: location.to_string(),
            });
        }

        let mut segments = Vec::new();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let decoded = percent_decode_str(raw)
                .decode_utf8()
                .map_err(|_| NoMatch::Malformed {
                    location: location.to_string(),
                })?;
            segments.push(decoded.into_owned());
        }

        if !segments.starts_with(&self.base) {
            return Err(NoMatch::OutsideBase {
                location: location.to_string(),
                base: self.base_path(),
            });
        }
        let relative = &segments[self.base.len()..];

        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        for template in &self.templates {
            if let Some(params) = template.match_segments(relative) {
                let query = template.parse_query(&pairs)?;
                return Ok(Route::new(template.name(), path, params, query));
            }
        }

        Err(NoMatch::UnknownPath {
            path: path.to_string(),
        })
    }

    /// Render a link to a registered route, including the base path.
    pub fn href(
        &self,
        name: &str,
        params: &[(&str, ParamValue)],
        query: &[(&str, ParamValue)],
    ) -> Result<String, RouteError> {
        let template = self.template(name).ok_or_else(|| RouteError::UnknownRoute {
            name: name.to_string(),
        })?;
        let rendered = template.render(params, query)?;
        if self.base.is_empty() {
            return Ok(rendered);
        }
        let base = self.base_path();
        if rendered == "/" {
            Ok(base)
        } else if let Some(query) = rendered.strip_prefix("/?") {
            Ok(format!("{base}?{query}"))
        } else {
            Ok(format!("{base}{rendered}"))
        }
    }
}
