//! i18n-engine
//!
//! Translation template engine: `{{ … }}` variant selection, `{# … #}`
//! interpolation with formatters, and route segment translation between locales.

pub mod config;
pub mod error;
pub mod formatter;
pub mod i18n;
pub mod locale;
pub mod segment;
pub mod template;
pub mod translation;
pub mod value;
pub mod variant;

mod test_utils;

pub use error::{
    FormatterError,
    I18nError,
    TemplateError,
    TranslationError,
};
pub use formatter::{
    Formatter,
    FormatterRegistry,
};
pub use i18n::{
    I18n,
    Page,
    TranslateOptions,
};
pub use locale::LocalizeOptions;
pub use value::{
    Properties,
    Value,
};
