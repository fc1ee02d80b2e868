//! Named formatters applied through `>name(args)` in interpolations.

mod builtin;
mod intl;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use intl::{
    DateFormatOptions,
    DateStyle,
    NumberFormatOptions,
    NumberStyle,
    format_date,
    format_number,
};

use crate::error::{
    FormatterError,
    TranslationError,
};
use crate::value::Value;

/// Signature shared by every formatter.
type FormatterFn = dyn Fn(&Value, &[Value]) -> Result<Value, FormatterError> + Send + Sync;

/// A pure function `(value, ...args) -> value`.
///
/// Any configuration (such as a default locale) is captured when the
/// formatter is created.
#[derive(Clone)]
pub struct Formatter {
    /// Shared closure
    inner: Arc<FormatterFn>,
}

impl Formatter {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FormatterError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Applies the formatter to `value`.
    ///
    /// # Errors
    /// Whatever the formatter reports about its input.
    pub fn format(&self, value: &Value, args: &[Value]) -> Result<Value, FormatterError> {
        (self.inner)(value, args)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter(<fn>)")
    }
}

/// Flat name → formatter mapping.
#[derive(Debug, Clone, Default)]
pub struct FormatterRegistry {
    /// Formatters by name
    formatters: HashMap<String, Formatter>,
}

impl FormatterRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in formatters. Locale-aware formatters
    /// default to `locale` unless a locale argument is passed explicitly.
    #[must_use]
    pub fn with_defaults(locale: &str) -> Self {
        let mut registry = Self::new();
        registry.extend(builtin::default_formatters(locale));
        registry
    }

    /// Registers `formatter`, replacing any formatter of the same name.
    pub fn insert(&mut self, name: impl Into<String>, formatter: Formatter) {
        self.formatters.insert(name.into(), formatter);
    }

    /// Registers every formatter, replacing existing ones of the same name.
    pub fn extend<I>(&mut self, formatters: I)
    where
        I: IntoIterator<Item = (String, Formatter)>,
    {
        self.formatters.extend(formatters);
    }

    /// Looks a formatter up, failing with `FormatterNotFound`.
    pub fn get(&self, name: &str) -> Result<&Formatter, TranslationError> {
        self.formatters
            .get(name)
            .ok_or_else(|| TranslationError::FormatterNotFound { name: name.to_string() })
    }

    /// Looks a formatter up without failing.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Formatter> {
        self.formatters.get(name)
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Fetches a required argument.
pub(crate) fn required_arg<'a>(
    formatter: &str,
    args: &'a [Value],
    index: usize,
    parameter: &str,
) -> Result<&'a Value, FormatterError> {
    args.get(index).filter(|value| !matches!(value, Value::Undefined)).ok_or_else(|| {
        FormatterError::InvalidParameter {
            formatter: formatter.to_string(),
            parameter: parameter.to_string(),
            message: "missing required argument".to_string(),
        }
    })
}
