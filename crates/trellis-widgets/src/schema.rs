//! Editable-option schema attached to widget type descriptors.
//!
//! Each widget declares the options a builder UI may edit: the option kind,
//! allowed values for selects, and bounds for numbers. The same schema drives
//! attribute coercion when documents and markup are read back.

use serde::{Deserialize, Serialize};

use crate::props::PropValue;

/// Kind of an editable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// One value out of a declared set
    Select,
    /// Boolean flag
    Checkbox,
    /// Bounded numeric value
    Number,
}

/// One allowed value of a select option, with its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,

    /// Display label, serialized as `name` in the wire shape
    #[serde(rename = "name")]
    pub label: String,
}

/// A single editable option of a widget type.
///
/// Serializes to the builder trait shape:
/// `{ type, name, label, options?, min?, max? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    #[serde(rename = "type")]
    pub kind: OptionKind,

    pub name: String,

    pub label: String,

    /// Allowed values for `Select` options
    #[serde(rename = "options", default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,

    /// Lower bound for `Number` options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound for `Number` options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl OptionSpec {
    /// Declare a select option with its allowed `(value, label)` pairs.
    pub fn select(name: &str, label: &str, choices: &[(&str, &str)]) -> Self {
        Self {
            kind: OptionKind::Select,
            name: name.to_string(),
            label: label.to_string(),
            choices: choices
                .iter()
                .map(|(value, label)| Choice {
                    value: value.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            min: None,
            max: None,
        }
    }

    /// Declare a checkbox option.
    pub fn checkbox(name: &str, label: &str) -> Self {
        Self {
            kind: OptionKind::Checkbox,
            name: name.to_string(),
            label: label.to_string(),
            choices: Vec::new(),
            min: None,
            max: None,
        }
    }

    /// Declare a bounded number option.
    pub fn number(name: &str, label: &str, min: f64, max: f64) -> Self {
        Self {
            kind: OptionKind::Number,
            name: name.to_string(),
            label: label.to_string(),
            choices: Vec::new(),
            min: Some(min),
            max: Some(max),
        }
    }

    /// Case-insensitive match against an attribute name.
    ///
    /// Markup tag and attribute names lose their casing on the way through
    /// the host document format, while option names are authored mixed-case.
    pub fn matches(&self, attr_name: &str) -> bool {
        self.name.eq_ignore_ascii_case(attr_name)
    }

    /// Coerce an attribute value to this option's kind.
    ///
    /// Coercion is permissive: a value that does not fit the declared kind
    /// or range is returned unchanged rather than rejected, since documents
    /// may be transiently inconsistent mid-edit.
    pub fn coerce(&self, value: &PropValue) -> PropValue {
        match self.kind {
            OptionKind::Select => value.clone(),
            OptionKind::Checkbox => match value {
                PropValue::Bool(_) => value.clone(),
                PropValue::Str(s) if s.eq_ignore_ascii_case("true") => PropValue::Bool(true),
                PropValue::Str(s) if s.eq_ignore_ascii_case("false") => PropValue::Bool(false),
                other => other.clone(),
            },
            OptionKind::Number => match value {
                PropValue::Num(n) if self.in_range(*n) => value.clone(),
                PropValue::Str(s) => match s.parse::<f64>() {
                    Ok(n) if self.in_range(n) => PropValue::Num(n),
                    _ => value.clone(),
                },
                other => other.clone(),
            },
        }
    }

    fn in_range(&self, n: f64) -> bool {
        self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n <= max)
    }
}
