//! Error types shared across the engine.

use thiserror::Error;

/// Syntax errors raised while parsing interpolations and variant specifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// No value kind matched at the start of the input
    #[error("Unknown value: `{input}`")]
    UnknownValue {
        /// Text that failed to match
        input: String,
    },
    /// A matcher was given input that starts with whitespace
    #[error("Cannot match untrimmed string: `{input}`")]
    UntrimmedString {
        /// Offending input
        input: String,
    },
    /// A quote was opened but never closed
    #[error("Unterminated string literal in `{input}`")]
    UnterminatedString {
        /// Input holding the open quote
        input: String,
    },
    /// Input continues after a complete expression, or a token appears where it cannot
    #[error("Unexpected `{token}` in `{input}`")]
    UnexpectedToken {
        /// Token text
        token: String,
        /// Whole interpolation body
        input: String,
    },
    /// A variant property name is not an identifier
    #[error("Invalid variant property key `{key}` in `{variant}`")]
    InvalidVariantPropertyKey {
        /// Offending key
        key: String,
        /// Variant specifier source
        variant: String,
    },
    /// A variant property value is not a primitive or an array of primitives
    #[error("Invalid value `{value}` for variant property `{key}` in `{variant}`")]
    InvalidVariantPropertyValue {
        /// Property name
        key: String,
        /// Offending value source
        value: String,
        /// Variant specifier source
        variant: String,
    },
    /// `$priority` is not a number
    #[error("Variant priority must be a number, found `{value}` in `{variant}`")]
    InvalidVariantPriority {
        /// Offending value source
        value: String,
        /// Variant specifier source
        variant: String,
    },
}

/// Errors raised by formatters when validating their own input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatterError {
    /// The piped value has the wrong type
    #[error("Formatter `{formatter}` expected {expected} but received {found}")]
    InvalidValue {
        /// Formatter name
        formatter: String,
        /// Accepted input
        expected: &'static str,
        /// Received value, rendered
        found: String,
    },
    /// An argument or option is malformed
    #[error("Invalid parameter `{parameter}` for formatter `{formatter}`: {message}")]
    InvalidParameter {
        /// Formatter name
        formatter: String,
        /// Argument or option name
        parameter: String,
        /// Why it was rejected
        message: String,
    },
}

/// Errors raised while compiling or resolving translations.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// A variant suffix decorates a key whose value is not a string
    #[error("Variant key `{key}` must have a string value")]
    NonStringVariant {
        /// Flattened key, suffix included
        key: String,
    },
    /// A translation tree leaf is neither a string nor a nested object
    #[error("Translation `{key}` must be a string or an object, found {found}")]
    InvalidTranslationValue {
        /// Flattened key
        key: String,
        /// JSON type of the leaf
        found: &'static str,
    },
    /// No formatter is registered under this name
    #[error("Formatter `{name}` is not registered")]
    FormatterNotFound {
        /// Requested name
        name: String,
    },
    /// A loading rule pattern is not a valid regular expression
    #[error("Invalid translation loading pattern '{pattern}': {source}")]
    InvalidLoadingRule {
        /// Pattern source
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },
    /// Template syntax error
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Formatter rejected its input
    #[error(transparent)]
    Formatter(#[from] FormatterError),
}

/// Errors raised while building an [`crate::I18n`] instance.
#[derive(Error, Debug)]
pub enum I18nError {
    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    /// Translations failed to compile
    #[error(transparent)]
    Translation(#[from] TranslationError),
}
