//! Attribute and prop values shared between documents, markup, and widgets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single attribute or option value.
///
/// Project JSON carries attributes as plain scalars (`"variant": "primary"`,
/// `"wrap": false`, `"gap": 4`), so the enum is untagged and deserializes
/// from whichever scalar shows up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Boolean flag
    Bool(bool),

    /// Numeric value
    Num(f64),

    /// String value
    Str(String),
}

impl PropValue {
    /// Get as string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number if this is a numeric value.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            PropValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the value the way it appears in a markup attribute.
    ///
    /// Numbers drop a trailing `.0` so `gap: 4` round-trips as `gap="4"`.
    pub fn to_attr_string(&self) -> String {
        match self {
            PropValue::Str(s) => s.clone(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Num(n) => format_num(*n),
        }
    }

    /// Markup serialization: `Some(value)` for a regular attribute,
    /// `None` for a bare boolean attribute, or nothing at all.
    ///
    /// `Bool(true)` becomes a bare attribute and `Bool(false)` is omitted
    /// entirely, so attribute presence alone carries the flag.
    pub fn to_markup_attr(&self) -> MarkupAttr {
        match self {
            PropValue::Bool(true) => MarkupAttr::Bare,
            PropValue::Bool(false) => MarkupAttr::Omitted,
            other => MarkupAttr::Value(other.to_attr_string()),
        }
    }
}

/// How a [`PropValue`] serializes into a markup attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupAttr {
    /// `name="value"`
    Value(String),
    /// `name` with no value
    Bare,
    /// attribute is not emitted
    Omitted,
}

fn format_num(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Num(n)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Num(n as f64)
    }
}

/// Resolved widget props: descriptor defaults overlaid with a node's
/// attributes, recognized options coerced, everything else passed through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedProps {
    values: IndexMap<String, PropValue>,
}

impl ResolvedProps {
    /// Create an empty prop set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a prop.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a prop by name.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// String prop with a fallback default.
    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).and_then(PropValue::as_str).unwrap_or(default)
    }

    /// Boolean prop with a fallback default.
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(PropValue::as_bool).unwrap_or(default)
    }

    /// Numeric prop with a fallback default.
    pub fn num_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).and_then(PropValue::as_num).unwrap_or(default)
    }

    /// Iterate props in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of props.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the prop set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, PropValue)> for ResolvedProps {
    fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
