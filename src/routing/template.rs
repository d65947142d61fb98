//! Route templates: declaration, path matching, query typing and rendering.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::form_urlencoded;

use crate::routing::error::RouteError;
use crate::routing::params::{ParamKind, ParamValue};
use crate::routing::route::NoMatch;

/// Characters escaped when a value is written into a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param { name: String, kind: ParamKind },
}

/// A declared query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
}

/// A registered route shape such as `/users/:id<int>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    name: String,
    segments: Vec<Segment>,
    query: Vec<QueryField>,
}

impl RouteTemplate {
    /// Parse a template.
    ///
    /// Segments starting with `:` are parameters; an optional `<kind>` suffix
    /// declares the type (`:id<int>`, `:sort<asc|desc>`), defaulting to
    /// string. Empty segments are ignored, so `/users/` equals `/users`.
    pub fn parse(name: impl Into<String>, pattern: &str) -> Result<Self, RouteError> {
        let name = name.into();
        let invalid = |reason: &str| RouteError::InvalidTemplate {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut segments = Vec::new();
        for raw in pattern.split('/').filter(|s| !s.is_empty()) {
            if let Some(decl) = raw.strip_prefix(':') {
                let (param, kind) = match decl.split_once('<') {
                    Some((param, rest)) => {
                        let kind = rest
                            .strip_suffix('>')
                            .ok_or_else(|| invalid("unterminated '<' in parameter"))?;
                        (param, kind.parse::<ParamKind>()?)
                    }
                    None => (decl, ParamKind::String),
                };
                if !is_identifier(param) {
                    return Err(invalid("parameter names must be non-empty identifiers"));
                }
                segments.push(Segment::Param {
                    name: param.to_string(),
                    kind,
                });
            } else {
                if raw.contains([':', '<', '>', '?', '#']) {
                    return Err(invalid("literal segments may not contain ':<>?#'"));
                }
                segments.push(Segment::Literal(raw.to_string()));
            }
        }

        let template = Self {
            name,
            segments,
            query: Vec::new(),
        };
        template.check_unique()?;
        Ok(template)
    }

    /// Derive a template from a page directory, e.g. `Users/_Id` becomes
    /// `/users/:id`. Directories starting with `_` are string parameters,
    /// others are kebab-cased literals.
    pub fn from_page_dir(name: impl Into<String>, dir: &str) -> Result<Self, RouteError> {
        let mut pattern = String::new();
        for part in dir.split(['/', '\\']).filter(|s| !s.is_empty()) {
            pattern.push('/');
            match part.strip_prefix('_') {
                Some(param) if !param.is_empty() => {
                    pattern.push(':');
                    pattern.push_str(&lower_camel(param));
                }
                _ => pattern.push_str(&kebab(part)),
            }
        }
        if pattern.is_empty() {
            pattern.push('/');
        }
        Self::parse(name, &pattern)
    }

    /// Assign a kind to an existing path parameter.
    pub fn with_param_kind(mut self, param: &str, kind: ParamKind) -> Result<Self, RouteError> {
        let slot = self.segments.iter_mut().find_map(|segment| match segment {
            Segment::Param { name, kind } if name == param => Some(kind),
            _ => None,
        });
        match slot {
            Some(slot) => {
                *slot = kind;
                Ok(self)
            }
            None => Err(RouteError::UnknownParam {
                route: self.name.clone(),
                name: param.to_string(),
            }),
        }
    }

    /// Declare a query parameter.
    pub fn with_query(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        required: bool,
    ) -> Result<Self, RouteError> {
        self.query.push(QueryField {
            name: name.into(),
            kind,
            required,
        });
        self.check_unique()?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn query_fields(&self) -> &[QueryField] {
        &self.query
    }

    /// Match decoded path segments. Every literal must be equal, every
    /// parameter must parse, and no segment may be left over.
    pub fn match_segments(&self, input: &[String]) -> Option<Vec<(String, ParamValue)>> {
        if input.len() != self.segments.len() {
            return None;
        }
        let mut params = Vec::new();
        for (segment, raw) in self.segments.iter().zip(input) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != raw {
                        return None;
                    }
                }
                Segment::Param { name, kind } => {
                    params.push((name.clone(), kind.parse_value(raw)?));
                }
            }
        }
        Some(params)
    }

    /// Type the declared query parameters. Undeclared keys are ignored and
    /// an empty value counts as absent.
    pub fn parse_query(
        &self,
        pairs: &[(String, String)],
    ) -> Result<BTreeMap<String, ParamValue>, NoMatch> {
        let mut values = BTreeMap::new();
        for field in &self.query {
            let raw = pairs
                .iter()
                .find(|(key, value)| key == &field.name && !value.is_empty())
                .map(|(_, value)| value);
            match raw {
                None if field.required => {
                    return Err(NoMatch::MissingQuery {
                        route: self.name.clone(),
                        name: field.name.clone(),
                    });
                }
                None => {}
                Some(raw) => {
                    let value = field.kind.parse_value(raw).ok_or_else(|| {
                        NoMatch::InvalidQuery {
                            route: self.name.clone(),
                            name: field.name.clone(),
                            value: raw.clone(),
                        }
                    })?;
                    values.insert(field.name.clone(), value);
                }
            }
        }
        Ok(values)
    }

    /// Render a location from typed values; the inverse of resolution.
    pub fn render(
        &self,
        params: &[(&str, ParamValue)],
        query: &[(&str, ParamValue)],
    ) -> Result<String, RouteError> {
        for (key, _) in params {
            let known = self
                .segments
                .iter()
                .any(|s| matches!(s, Segment::Param { name, .. } if name == key));
            if !known {
                return Err(self.unknown(key));
            }
        }
        for (key, _) in query {
            if !self.query.iter().any(|field| field.name == *key) {
                return Err(self.unknown(key));
            }
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => {
                    path.extend(utf8_percent_encode(literal, SEGMENT));
                }
                Segment::Param { name, kind } => {
                    let value = params
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| value)
                        .ok_or_else(|| RouteError::MissingValue {
                            route: self.name.clone(),
                            name: name.clone(),
                        })?;
                    self.check_value(name, kind, value)?;
                    path.extend(utf8_percent_encode(&value.to_string(), SEGMENT));
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        for field in &self.query {
            match query.iter().find(|(key, _)| *key == field.name) {
                Some((_, value)) => {
                    self.check_value(&field.name, &field.kind, value)?;
                    serializer.append_pair(&field.name, &value.to_string());
                    has_query = true;
                }
                None if field.required => {
                    return Err(RouteError::MissingValue {
                        route: self.name.clone(),
                        name: field.name.clone(),
                    });
                }
                None => {}
            }
        }
        if has_query {
            path.push('?');
            path.push_str(&serializer.finish());
        }
        Ok(path)
    }

    fn check_value(
        &self,
        name: &str,
        kind: &ParamKind,
        value: &ParamValue,
    ) -> Result<(), RouteError> {
        if kind.accepts(value) {
            Ok(())
        } else {
            Err(RouteError::InvalidValue {
                route: self.name.clone(),
                name: name.to_string(),
                kind: kind.to_string(),
                value: value.to_string(),
            })
        }
    }

    fn unknown(&self, name: &str) -> RouteError {
        RouteError::UnknownParam {
            route: self.name.clone(),
            name: name.to_string(),
        }
    }

    fn check_unique(&self) -> Result<(), RouteError> {
        let path_names = self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        });
        let query_names = self.query.iter().map(|q| q.name.as_str());

        let mut seen = Vec::new();
        for name in path_names.chain(query_names) {
            if seen.contains(&name) {
                return Err(RouteError::DuplicateParam {
                    route: self.name.clone(),
                    name: name.to_string(),
                });
            }
            seen.push(name);
        }
        Ok(())
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            f.write_str("/")?;
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => write!(f, "/{literal}")?,
                Segment::Param { name, kind } => write!(f, "/:{name}<{kind}>")?,
            }
        }
        for (i, field) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            let marker = if field.required { "" } else { "?" };
            write!(f, "{sep}{}{marker}=<{}>", field.name, field.kind)?;
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
