//! Typed route and query parameter values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routing::error::RouteError;

/// Declared type of a path or query parameter.
///
/// Written in templates and manifests as `string`, `int`, `bool`, `uuid`
/// or an enumerated literal set such as `open|closed` (`draft|` for a set
/// of one).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamKind {
    #[default]
    String,
    Int,
    Bool,
    Uuid,
    /// One of a fixed set of literals, compared case-sensitively.
    OneOf(Vec<String>),
}

impl ParamKind {
    /// Parse a raw (already percent-decoded) value into this kind.
    ///
    /// Returns `None` when the value cannot be typed; callers decide whether
    /// that invalidates a match.
    pub fn parse_value(&self, raw: &str) -> Option<ParamValue> {
        match self {
            ParamKind::String => {
                if raw.is_empty() {
                    None
                } else {
                    Some(ParamValue::Str(raw.to_string()))
                }
            }
            ParamKind::Int => raw.parse::<i64>().ok().map(ParamValue::Int),
            ParamKind::Bool => match raw {
                "true" => Some(ParamValue::Bool(true)),
                "false" => Some(ParamValue::Bool(false)),
                _ => None,
            },
            ParamKind::Uuid => Uuid::parse_str(raw).ok().map(ParamValue::Uuid),
            ParamKind::OneOf(choices) => choices
                .iter()
                .any(|c| c == raw)
                .then(|| ParamValue::Enum(raw.to_string())),
        }
    }

    /// Whether a value was produced by (or is acceptable for) this kind.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (ParamKind::String, ParamValue::Str(s)) => !s.is_empty(),
            (ParamKind::Int, ParamValue::Int(_)) => true,
            (ParamKind::Bool, ParamValue::Bool(_)) => true,
            (ParamKind::Uuid, ParamValue::Uuid(_)) => true,
            (ParamKind::OneOf(choices), ParamValue::Enum(v)) => choices.contains(v),
            _ => false,
        }
    }
}

impl FromStr for ParamKind {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "string" | "str" => Ok(ParamKind::String),
            "int" | "i64" => Ok(ParamKind::Int),
            "bool" => Ok(ParamKind::Bool),
            "uuid" | "guid" => Ok(ParamKind::Uuid),
            _ if s.contains('|') => {
                // `draft|` is the one-literal set.
                let body = match s.strip_suffix('|') {
                    Some(single) if !single.contains('|') => single,
                    _ => s,
                };
                let choices: Vec<String> = body.split('|').map(|c| c.trim().to_string()).collect();
                if choices.iter().any(String::is_empty) {
                    return Err(RouteError::UnknownParamKind {
                        kind: s.to_string(),
                    });
                }
                Ok(ParamKind::OneOf(choices))
            }
            _ => Err(RouteError::UnknownParamKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ParamKind {
    type Error = RouteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParamKind> for String {
    fn from(kind: ParamKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::String => f.write_str("string"),
            ParamKind::Int => f.write_str("int"),
            ParamKind::Bool => f.write_str("bool"),
            ParamKind::Uuid => f.write_str("uuid"),
            ParamKind::OneOf(choices) if choices.len() == 1 => write!(f, "{}|", choices[0]),
            ParamKind::OneOf(choices) => f.write_str(&choices.join("|")),
        }
    }
}

/// A parameter value after successful typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
    Enum(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) | ParamValue::Enum(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Uuid(id) => write!(f, "{}", id.hyphenated()),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Uuid> for ParamValue {
    fn from(value: Uuid) -> Self {
        ParamValue::Uuid(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

/// Conversion out of a typed [`ParamValue`].
pub trait FromParam: Sized {
    fn from_param(value: &ParamValue) -> Option<Self>;
}

impl FromParam for i64 {
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromParam for i32 {
    fn from_param(value: &ParamValue) -> Option<Self> {
        i64::from_param(value).and_then(|n| i32::try_from(n).ok())
    }
}

impl FromParam for u32 {
    fn from_param(value: &ParamValue) -> Option<Self> {
        i64::from_param(value).and_then(|n| u32::try_from(n).ok())
    }
}

impl FromParam for u64 {
    fn from_param(value: &ParamValue) -> Option<Self> {
        i64::from_param(value).and_then(|n| u64::try_from(n).ok())
    }
}

impl FromParam for bool {
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromParam for Uuid {
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Uuid(id) => Some(*id),
            _ => None,
        }
    }
}

impl FromParam for String {
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Str(s) | ParamValue::Enum(s) => Some(s.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_parse() {
        assert_eq!("int".parse::<ParamKind>().unwrap(), ParamKind::Int);
        assert_eq!("guid".parse::<ParamKind>().unwrap(), ParamKind::Uuid);
        assert_eq!(
            "open|closed".parse::<ParamKind>().unwrap(),
            ParamKind::OneOf(vec!["open".into(), "closed".into()])
        );
        assert!("float".parse::<ParamKind>().is_err());
        assert!("a||b".parse::<ParamKind>().is_err());
    }

    #[test]
    fn single_literal_set_survives_serde() {
        let kind = ParamKind::OneOf(vec!["draft".into()]);
        assert_eq!(kind.to_string(), "draft|");

        let json = serde_json::to_string(&kind).unwrap();
        let back: ParamKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
        assert_eq!(back.parse_value("draft"), Some(ParamValue::Enum("draft".into())));

        assert!("a|b|".parse::<ParamKind>().is_err());
        assert!("|".parse::<ParamKind>().is_err());
    }

    #[test]
    fn int_rejects_non_numeric() {
        assert_eq!(ParamKind::Int.parse_value("42"), Some(ParamValue::Int(42)));
        assert_eq!(ParamKind::Int.parse_value("abc"), None);
        assert_eq!(ParamKind::Int.parse_value(""), None);
    }

    #[test]
    fn enum_only_accepts_declared_literals() {
        let kind = ParamKind::OneOf(vec!["asc".into(), "desc".into()]);
        assert_eq!(kind.parse_value("asc"), Some(ParamValue::Enum("asc".into())));
        assert_eq!(kind.parse_value("ASC"), None);
    }

    #[test]
    fn uuid_display_is_parseable() {
        let id = Uuid::new_v4();
        let rendered = ParamValue::Uuid(id).to_string();
        assert_eq!(ParamKind::Uuid.parse_value(&rendered), Some(ParamValue::Uuid(id)));
    }

    #[test]
    fn from_param_narrows_integers() {
        assert_eq!(i32::from_param(&ParamValue::Int(7)), Some(7));
        assert_eq!(u32::from_param(&ParamValue::Int(-1)), None);
        assert_eq!(String::from_param(&ParamValue::Int(1)), None);
    }
}
