//! Runtime values passed to translations, interpolations and formatters.

use std::collections::HashMap;
use std::fmt;

use serde_json::Number;

/// A dynamically typed value.
///
/// Mirrors the value space of the translation templates: `undefined` and
/// `null` are distinct, numbers are always `f64`, and objects keep their
/// insertion order so that JSON output is stable.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing value; renders as an empty string
    #[default]
    Undefined,
    /// JSON `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Number, always `f64`
    Number(f64),
    /// String
    String(String),
    /// Ordered list
    Array(Vec<Value>),
    /// Members in insertion order
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Type name used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// `undefined` or `null`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Truthiness as used by the `default_falsy` formatter.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) => true,
        }
    }

    /// The number, if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a member of an object value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Converts to a JSON value.
    ///
    /// Returns `None` for `undefined`. Inside arrays `undefined` becomes
    /// `null`, inside objects the member is dropped.
    #[must_use]
    pub fn to_json(&self) -> Option<serde_json::Value> {
        let json = match self {
            Self::Undefined => return None,
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(
                items.iter().map(|item| item.to_json().unwrap_or(serde_json::Value::Null)).collect(),
            ),
            Self::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .filter_map(|(key, value)| value.to_json().map(|v| (key.clone(), v)))
                    .collect(),
            ),
        };
        Some(json)
    }

    /// Serializes the value as compact JSON. `undefined` serializes to an
    /// empty string.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_json().and_then(|json| serde_json::to_string(&json).ok()).unwrap_or_default()
    }

    /// Renders the value the way it is embedded into a translated string.
    ///
    /// - `undefined` → `""`
    /// - numbers and booleans → their textual form
    /// - strings → unchanged
    /// - `null`, arrays and objects → JSON
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Undefined => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Null | Self::Array(_) | Self::Object(_) => self.to_json_string(),
        }
    }
}

/// Formats a number the way JavaScript's `String(n)` does: no trailing `.0`
/// for integral values, exponent notation below `1e-6` and from `1e21` up.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n.is_sign_positive() { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else {
        format!("{n}")
    }
}

/// Rewrites Rust's `1.5e22` as `1.5e+22`; negative exponents keep their sign.
fn exponent_form(n: f64) -> String {
    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{mantissa}e+{exponent}"),
        _ => formatted,
    }
}

/// JSON number, as an integer when exactly representable; non-finite numbers become `null`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

/// Caller-supplied properties, keyed by name.
///
/// Used both for variant scoring and for resolving interpolation variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    /// Values by property name
    values: HashMap<String, Value>,
}

impl Properties {
    /// No properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder form of [`Properties::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value supplied for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether `name` was supplied at all, even as `undefined`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Whether no property was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<serde_json::Value> for Properties {
    /// Builds properties from a JSON object; any other JSON value yields an
    /// empty property set.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(map) => {
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
            }
            _ => Self::default(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
