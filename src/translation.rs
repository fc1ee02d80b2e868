//! Compiled translations grouped by namespace and locale.
//!
//! Translation trees are flattened into dot-joined keys. Keys carrying a
//! `{{ … }}` suffix contribute a [`Variant`] to their logical key instead of
//! its default string.

use std::collections::{
    BTreeMap,
    HashMap,
};

use regex::Regex;

use crate::config::{
    ConfigTranslations,
    LoadDirective,
};
use crate::error::TranslationError;
use crate::formatter::FormatterRegistry;
use crate::template::interpolate;
use crate::value::Properties;
use crate::variant::{
    Variant,
    select_variant,
    split_variant_key,
};

/// Namespace searched on every route.
pub const COMMON_NAMESPACE: &str = "common";

/// Default string and variants of one logical key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedTranslation {
    /// Value of the undecorated key
    pub default: Option<String>,
    /// Variants in declaration order
    pub variants: Vec<Variant>,
}

impl ComputedTranslation {
    /// Folds `other` into `self` without dropping either side.
    fn merge(&mut self, other: Self) {
        if other.default.is_some() {
            self.default = other.default;
        }
        self.variants.extend(other.variants);
    }

    /// The winning variant's value, else the default.
    #[must_use]
    pub fn resolve(&self, properties: &Properties) -> Option<&str> {
        select_variant(&self.variants, properties)
            .map(|variant| variant.value.as_str())
            .or(self.default.as_deref())
    }
}

/// `key → translation` for one (namespace, locale) pair.
pub type ComputedTranslations = HashMap<String, ComputedTranslation>;

/// `namespace → locale → translations`
pub type CompiledTranslations = BTreeMap<String, BTreeMap<String, ComputedTranslations>>;

/// Flattens a translation tree and parses its variant specifiers.
pub fn compute_translations(tree: &serde_json::Value) -> Result<ComputedTranslations, TranslationError> {
    let mut computed = ComputedTranslations::new();
    match tree {
        serde_json::Value::Object(entries) => {
            flatten_into(&mut computed, "", entries)?;
            Ok(computed)
        }
        other => Err(TranslationError::InvalidTranslationValue { key: String::new(), found: json_type(other) }),
    }
}

/// Adds every leaf under `prefix` to `computed`.
fn flatten_into(
    computed: &mut ComputedTranslations,
    prefix: &str,
    entries: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), TranslationError> {
    for (key, value) in entries {
        if let Some((name, specifier)) = split_variant_key(key) {
            let serde_json::Value::String(text) = value else {
                return Err(TranslationError::NonStringVariant { key: join_key(prefix, key) });
            };
            let variant = Variant::parse(specifier, text.as_str())?;
            computed.entry(join_key(prefix, name)).or_default().variants.push(variant);
            continue;
        }

        let path = join_key(prefix, key);
        match value {
            serde_json::Value::String(text) => {
                computed.entry(path).or_default().default = Some(text.clone());
            }
            serde_json::Value::Object(children) => flatten_into(computed, &path, children)?,
            other => {
                return Err(TranslationError::InvalidTranslationValue { key: path, found: json_type(other) });
            }
        }
    }
    Ok(())
}

/// `prefix.key`, or `key` at the root.
fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() { key.to_string() } else { format!("{prefix}.{key}") }
}

/// JSON type name used in errors.
const fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A load directive with its patterns compiled.
#[derive(Debug, Clone)]
pub struct LoadingRule {
    /// Namespace patterns
    groups: Vec<Regex>,
    /// Route patterns
    routes: Vec<Regex>,
}

impl LoadingRule {
    /// Compiles both pattern lists.
    pub fn compile(directive: &LoadDirective) -> Result<Self, TranslationError> {
        Ok(Self { groups: compile_patterns(&directive.groups)?, routes: compile_patterns(&directive.routes)? })
    }

    /// Whether any route pattern matches `route`.
    fn applies_to(&self, route: &str) -> bool {
        self.routes.iter().any(|pattern| pattern.is_match(route))
    }

    /// Whether any group pattern matches `namespace`.
    fn loads(&self, namespace: &str) -> bool {
        self.groups.iter().any(|pattern| pattern.is_match(namespace))
    }
}

/// Compiles regular expressions, failing on the first invalid one.
fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, TranslationError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .map_err(|source| TranslationError::InvalidLoadingRule { pattern: pattern.clone(), source })
        })
        .collect()
}

/// Owns every compiled translation and the namespace loading rules.
#[derive(Debug, Clone, Default)]
pub struct TranslationBank {
    /// Every compiled tree
    translations: CompiledTranslations,
    /// Rules in the order they were added
    loading_rules: Vec<LoadingRule>,
}

impl TranslationBank {
    /// An empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles the configured translations and loading rules.
    pub fn from_config(
        translations: &ConfigTranslations,
        directives: &[LoadDirective],
    ) -> Result<Self, TranslationError> {
        let mut bank = Self::new();
        bank.add_translations(Self::compile(translations)?);
        bank.add_loading_rules(Self::compile_loading_rules(directives)?);
        Ok(bank)
    }

    /// Compiles every (namespace, locale) tree without touching any bank.
    pub fn compile(translations: &ConfigTranslations) -> Result<CompiledTranslations, TranslationError> {
        let mut compiled = CompiledTranslations::new();
        for (namespace, locales) in translations {
            let by_locale = compiled.entry(namespace.clone()).or_default();
            for (locale, tree) in locales {
                let computed = compute_translations(tree)?;
                tracing::debug!(
                    namespace = namespace.as_str(),
                    locale = locale.as_str(),
                    keys = computed.len(),
                    "Compiled translations"
                );
                by_locale.insert(locale.clone(), computed);
            }
        }
        Ok(compiled)
    }

    /// Compiles every directive, failing on the first invalid pattern.
    pub fn compile_loading_rules(directives: &[LoadDirective]) -> Result<Vec<LoadingRule>, TranslationError> {
        directives.iter().map(LoadingRule::compile).collect()
    }

    /// Merges compiled translations into the bank.
    ///
    /// An incoming default replaces the existing one; incoming variants are
    /// appended after the existing variants of the same key.
    pub fn add_translations(&mut self, compiled: CompiledTranslations) {
        for (namespace, locales) in compiled {
            let by_locale = self.translations.entry(namespace).or_default();
            for (locale, computed) in locales {
                let existing = by_locale.entry(locale).or_default();
                for (key, translation) in computed {
                    existing.entry(key).or_default().merge(translation);
                }
            }
        }
    }

    /// Appends rules after the existing ones.
    pub fn add_loading_rules(&mut self, rules: Vec<LoadingRule>) {
        self.loading_rules.extend(rules);
    }

    /// Namespaces attached to `route` by loading rules, in rule order and
    /// without duplicates.
    #[must_use]
    pub fn route_namespaces(&self, route: &str) -> Vec<&str> {
        let mut namespaces: Vec<&str> = Vec::new();
        for rule in self.loading_rules.iter().filter(|rule| rule.applies_to(route)) {
            for namespace in self.translations.keys().filter(|namespace| rule.loads(namespace)) {
                if !namespaces.contains(&namespace.as_str()) {
                    namespaces.push(namespace);
                }
            }
        }
        namespaces
    }

    /// Known namespaces, sorted.
    #[must_use]
    pub fn namespaces(&self) -> Vec<&str> {
        self.translations.keys().map(String::as_str).collect()
    }

    /// Finds `key` in `locale`, searching the loaded namespaces of `route`,
    /// then the namespace named after `route`, then the common namespace.
    #[must_use]
    pub fn find(&self, key: &str, route: &str, locale: &str) -> Option<&ComputedTranslation> {
        let loaded = self.route_namespaces(route);
        loaded.into_iter().chain([route, COMMON_NAMESPACE]).find_map(|namespace| {
            let found = self.translations.get(namespace)?.get(locale)?.get(key)?;
            tracing::trace!(key, route, locale, namespace, "Resolved translation");
            Some(found)
        })
    }

    /// Translates `key`.
    ///
    /// Falls back to `fallback_locale` when the key is absent in `locale`,
    /// and to the raw key when no default or variant applies.
    pub fn get(
        &self,
        key: &str,
        route: &str,
        locale: &str,
        fallback_locale: Option<&str>,
        properties: &Properties,
        formatters: &FormatterRegistry,
    ) -> Result<String, TranslationError> {
        let translation = self.find(key, route, locale).or_else(|| {
            fallback_locale
                .filter(|fallback| *fallback != locale)
                .and_then(|fallback| self.find(key, route, fallback))
        });

        match translation.and_then(|translation| translation.resolve(properties)) {
            Some(text) => interpolate(text, properties, formatters),
            None => Ok(key.to_string()),
        }
    }
}
