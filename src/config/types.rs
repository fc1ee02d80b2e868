//! Configuration types and validation

use std::collections::{
    BTreeMap,
    HashSet,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// `namespace → locale → translation tree`
pub type ConfigTranslations = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

/// `locale → primary-locale segment → translated segment`
pub type ConfigRoutes = BTreeMap<String, BTreeMap<String, String>>;

/// A single configuration problem found by [`I18nConfig::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "translationLoadingRules[0].groups[1]")
    pub field_path: String,
    /// What is wrong with the field
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for the field at `field_path`.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Errors raised while loading or validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Every problem found by validation
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// The configuration file could not be read
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`I18nConfig`]
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Renders validation errors as a numbered list.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether localized routes end with a `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrailingSlash {
    /// Append a `/` to every localized route
    Always,
    /// Leave routes as built
    #[default]
    Never,
}

/// Attaches every namespace matching one of `groups` to every route
/// matching one of `routes`. Both lists hold regular expressions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadDirective {
    /// Namespace patterns
    pub groups: Vec<String>,
    /// Route patterns
    pub routes: Vec<String>,
}

/// Contents of `i18n.config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nConfig {
    /// Locale whose routes carry no prefix and whose segments key every dictionary
    pub primary_locale: String,
    /// Every other supported locale
    pub secondary_locales: Vec<String>,

    /// Locale consulted when a key is missing in the requested locale.
    /// Defaults to the primary locale.
    pub fallback_locale: Option<String>,

    /// Prefix primary-locale routes with the locale as well.
    pub show_primary_locale: bool,
    /// Trailing slash policy for localized routes
    pub trailing_slash: TrailingSlash,

    /// Translation trees
    pub translations: ConfigTranslations,
    /// Extra namespaces to search on matching routes
    pub translation_loading_rules: Vec<LoadDirective>,

    /// Segment dictionaries keyed by secondary locale.
    pub routes: ConfigRoutes,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            primary_locale: "en".to_string(),
            secondary_locales: Vec::new(),
            fallback_locale: None,
            show_primary_locale: false,
            trailing_slash: TrailingSlash::default(),
            translations: ConfigTranslations::new(),
            translation_loading_rules: Vec::new(),
            routes: ConfigRoutes::new(),
        }
    }
}

impl I18nConfig {
    /// Primary locale followed by the secondary locales.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        std::iter::once(self.primary_locale.as_str())
            .chain(self.secondary_locales.iter().map(String::as_str))
            .collect()
    }

    /// The configured fallback locale, or the primary locale.
    #[must_use]
    pub fn fallback_locale(&self) -> &str {
        self.fallback_locale.as_deref().unwrap_or(&self.primary_locale)
    }

    /// # Errors
    /// - Empty or duplicated locale
    /// - Unknown fallback locale or route locale
    /// - Invalid regular expression in a loading rule
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.primary_locale.is_empty() {
            errors.push(ValidationError::new(
                "primaryLocale",
                "The primary locale cannot be empty. Example: \"en\"",
            ));
        }

        let mut seen = HashSet::new();
        for (index, locale) in self.secondary_locales.iter().enumerate() {
            let field_path = format!("secondaryLocales[{index}]");
            if locale.is_empty() {
                errors.push(ValidationError::new(field_path, "Locales cannot be empty"));
            } else if *locale == self.primary_locale {
                errors.push(ValidationError::new(
                    field_path,
                    format!("'{locale}' is already the primary locale"),
                ));
            } else if !seen.insert(locale.as_str()) {
                errors.push(ValidationError::new(field_path, format!("Duplicate locale '{locale}'")));
            }
        }

        let locales = self.locales();

        if let Some(fallback) = &self.fallback_locale
            && !locales.contains(&fallback.as_str())
        {
            errors.push(ValidationError::new(
                "fallbackLocale",
                format!("Unknown locale '{fallback}'. Expected one of: {}", locales.join(", ")),
            ));
        }

        for (index, rule) in self.translation_loading_rules.iter().enumerate() {
            let patterns = rule
                .groups
                .iter()
                .enumerate()
                .map(|(i, pattern)| (format!("translationLoadingRules[{index}].groups[{i}]"), pattern))
                .chain(rule.routes.iter().enumerate().map(|(i, pattern)| {
                    (format!("translationLoadingRules[{index}].routes[{i}]"), pattern)
                }));
            for (field_path, pattern) in patterns {
                if let Err(e) = regex::Regex::new(pattern) {
                    errors.push(ValidationError::new(
                        field_path,
                        format!("Invalid regular expression '{pattern}': {e}"),
                    ));
                }
            }
        }

        for locale in self.routes.keys() {
            if !locales.contains(&locale.as_str()) {
                errors.push(ValidationError::new(
                    format!("routes.{locale}"),
                    format!("Segment translations given for unknown locale '{locale}'"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn validate_default_config() {
        let config = I18nConfig::default();

        assert_that!(config.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_empty_config() {
        let config: I18nConfig = serde_json::from_str("{}").unwrap();

        assert_that!(config.primary_locale, eq("en"));
        assert_that!(config.show_primary_locale, eq(false));
        assert_that!(config.trailing_slash, eq(TrailingSlash::Never));
        assert_that!(config.fallback_locale(), eq("en"));
    }

    #[rstest]
    fn deserialize_full_config() {
        let json = r#"{
            "primaryLocale": "en",
            "secondaryLocales": ["fr"],
            "fallbackLocale": "fr",
            "trailingSlash": "always",
            "translations": { "common": { "en": { "hello": "Hello" } } },
            "translationLoadingRules": [{ "groups": ["^shared$"], "routes": ["^/about"] }],
            "routes": { "fr": { "about": "a-propos" } }
        }"#;

        let config: I18nConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.locales(), vec!["en", "fr"]);
        assert_that!(config.fallback_locale(), eq("fr"));
        assert_that!(config.trailing_slash, eq(TrailingSlash::Always));
        assert_that!(config.translation_loading_rules, len(eq(1)));
        assert_that!(config.routes["fr"]["about"], eq("a-propos"));
        assert_that!(config.validate(), ok(anything()));
    }

    #[rstest]
    fn validate_empty_primary_locale() {
        let config = I18nConfig { primary_locale: String::new(), ..I18nConfig::default() };

        assert_that!(
            config.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("primaryLocale")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    #[rstest]
    fn validate_duplicate_and_primary_secondary_locales() {
        let config = I18nConfig {
            secondary_locales: vec!["fr".to_string(), "en".to_string(), "fr".to_string()],
            ..I18nConfig::default()
        };

        assert_that!(
            config.validate(),
            err(elements_are![
                field!(ValidationError.field_path, eq("secondaryLocales[1]")),
                all![
                    field!(ValidationError.field_path, eq("secondaryLocales[2]")),
                    field!(ValidationError.message, contains_substring("Duplicate"))
                ]
            ])
        );
    }

    #[rstest]
    fn validate_unknown_fallback_and_route_locale() {
        let mut routes = ConfigRoutes::new();
        routes.insert("de".to_string(), BTreeMap::new());
        let config = I18nConfig {
            fallback_locale: Some("es".to_string()),
            routes,
            ..I18nConfig::default()
        };

        assert_that!(
            config.validate(),
            err(elements_are![
                field!(ValidationError.field_path, eq("fallbackLocale")),
                field!(ValidationError.field_path, eq("routes.de"))
            ])
        );
    }

    #[rstest]
    fn validate_invalid_loading_rule_pattern() {
        let config = I18nConfig {
            translation_loading_rules: vec![LoadDirective {
                groups: vec!["^ok$".to_string()],
                routes: vec!["(unclosed".to_string()],
            }],
            ..I18nConfig::default()
        };

        assert_that!(
            config.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("translationLoadingRules[0].routes[0]")),
                field!(ValidationError.message, contains_substring("(unclosed"))
            ]])
        );
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let config = I18nConfig {
            primary_locale: String::new(),
            fallback_locale: Some("xx".to_string()),
            ..I18nConfig::default()
        };

        let errors = config.validate().unwrap_err();
        let error_message = format!("{}", ConfigError::ValidationErrors(errors));

        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. primaryLocale"));
        assert_that!(error_message, contains_substring("2. fallbackLocale"));
    }
}
