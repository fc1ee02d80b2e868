//! The `I18n` facade: owns every bank and exposes `t` and `l`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{
    PoisonError,
    RwLock,
    RwLockReadGuard,
    RwLockWriteGuard,
};

use crate::config::{
    self,
    ConfigError,
    ConfigRoutes,
    ConfigTranslations,
    I18nConfig,
    LoadDirective,
    ValidationError,
};
use crate::error::{
    I18nError,
    TranslationError,
};
use crate::formatter::{
    Formatter,
    FormatterRegistry,
};
use crate::locale::{
    LocalizeOptions,
    PageContext,
    RoutingSettings,
    localize_route,
    resolve_page,
};
use crate::segment::SegmentBank;
use crate::translation::TranslationBank;
use crate::value::Properties;

/// Options of [`I18n::t`]. Unset fields fall back to the root route, the
/// primary locale and the configured fallback locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Route whose namespaces are searched
    pub route: Option<String>,
    /// Lookup locale
    pub locale: Option<String>,
    /// Locale tried when the key is missing in `locale`
    pub fallback_locale: Option<String>,
}

/// Mutable state behind the [`I18n`] lock.
#[derive(Debug)]
struct Banks {
    /// Compiled translations and loading rules
    translations: TranslationBank,
    /// Segment dictionaries and their mirrors
    segments: SegmentBank,
    /// One registry per locale so locale-aware formatters default to it
    formatters: HashMap<String, FormatterRegistry>,
}

impl Banks {
    /// Registry of `locale`, or of the primary locale for unknown locales.
    fn formatters_for(&self, locale: &str, primary_locale: &str) -> Option<&FormatterRegistry> {
        self.formatters.get(locale).or_else(|| self.formatters.get(primary_locale))
    }
}

/// Translation engine for one site.
///
/// Lookups take a shared lock; `add_*` calls compile their input first and
/// then swap it in under the exclusive lock, so a failed extension leaves
/// the banks untouched and readers never see a partial merge.
#[derive(Debug)]
pub struct I18n {
    /// Locale and routing configuration
    settings: RoutingSettings,
    /// Default fallback locale of `t`
    fallback_locale: String,
    /// Everything `add_*` can extend
    banks: RwLock<Banks>,
}

impl I18n {
    /// Validates `config` and compiles every translation.
    pub fn new(config: I18nConfig) -> Result<Self, I18nError> {
        config.validate().map_err(ConfigError::ValidationErrors)?;

        let translations =
            TranslationBank::from_config(&config.translations, &config.translation_loading_rules)?;
        let segments = SegmentBank::new(config.primary_locale.clone(), &config.routes);
        let locales: Vec<String> = config.locales().into_iter().map(str::to_string).collect();
        let formatters = locales
            .iter()
            .map(|locale| (locale.clone(), FormatterRegistry::with_defaults(locale)))
            .collect();

        tracing::debug!(
            primary_locale = config.primary_locale.as_str(),
            locales = locales.len(),
            namespaces = translations.namespaces().len(),
            "Initialized i18n"
        );

        Ok(Self {
            fallback_locale: config.fallback_locale().to_string(),
            settings: RoutingSettings {
                primary_locale: config.primary_locale,
                locales,
                show_primary_locale: config.show_primary_locale,
                trailing_slash: config.trailing_slash,
            },
            banks: RwLock::new(Banks { translations, segments, formatters }),
        })
    }

    /// Loads `i18n.config.json` from `dir`, or the default configuration
    /// when the file is absent.
    pub fn from_dir(dir: &Path) -> Result<Self, I18nError> {
        let config = config::load_from_dir(dir)?.unwrap_or_default();
        Self::new(config)
    }

    /// Locale whose routes carry no prefix.
    #[must_use]
    pub fn primary_locale(&self) -> &str {
        &self.settings.primary_locale
    }

    /// Primary locale first, then the secondary locales.
    #[must_use]
    pub fn locales(&self) -> &[String] {
        &self.settings.locales
    }

    /// Locale `t` falls back to by default.
    #[must_use]
    pub fn fallback_locale(&self) -> &str {
        &self.fallback_locale
    }

    /// Shared access, recovering from poisoning.
    fn read(&self) -> RwLockReadGuard<'_, Banks> {
        self.banks.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access, recovering from poisoning.
    fn write(&self) -> RwLockWriteGuard<'_, Banks> {
        self.banks.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Context of the page served at `url_path`.
    #[must_use]
    pub fn page(&self, url_path: &str) -> Page<'_> {
        let context = resolve_page(url_path, &self.settings, &self.read().segments);
        tracing::debug!(url_path, locale = context.locale.as_str(), route = context.route.as_str(), "Resolved page");
        Page { i18n: self, context }
    }

    /// Translates `key`, selecting the best variant for `properties` and
    /// expanding its interpolations.
    pub fn t(&self, key: &str, properties: &Properties, options: &TranslateOptions) -> Result<String, TranslationError> {
        let route = options.route.as_deref().unwrap_or("/");
        let locale = options.locale.as_deref().unwrap_or(&self.settings.primary_locale);
        let fallback_locale = options.fallback_locale.as_deref().unwrap_or(&self.fallback_locale);

        let banks = self.read();
        let empty = FormatterRegistry::new();
        let formatters = banks.formatters_for(locale, &self.settings.primary_locale).unwrap_or(&empty);
        banks.translations.get(key, route, locale, Some(fallback_locale), properties, formatters)
    }

    /// Localizes `route` for a page rendered in the primary locale.
    #[must_use]
    pub fn l(&self, route: &str, parameters: &Properties, options: &LocalizeOptions) -> String {
        self.localize(route, parameters, options, &self.settings.primary_locale)
    }

    /// Localizes `route` for a page rendered in `page_locale`.
    fn localize(&self, route: &str, parameters: &Properties, options: &LocalizeOptions, page_locale: &str) -> String {
        localize_route(route, parameters, options, page_locale, &self.settings, &self.read().segments)
    }

    /// Compiles and merges additional translations.
    pub fn add_translations(&self, translations: &ConfigTranslations) -> Result<(), TranslationError> {
        let compiled = TranslationBank::compile(translations)?;
        self.write().translations.add_translations(compiled);
        tracing::debug!(namespaces = translations.len(), "Added translations");
        Ok(())
    }

    /// Compiles and appends loading rules after the existing ones.
    pub fn add_translation_loading_rules(&self, directives: &[LoadDirective]) -> Result<(), TranslationError> {
        let rules = TranslationBank::compile_loading_rules(directives)?;
        self.write().translations.add_loading_rules(rules);
        tracing::debug!(rules = directives.len(), "Added translation loading rules");
        Ok(())
    }

    /// Merges segment translations and rebuilds every cross-locale mirror.
    pub fn add_routes(&self, routes: &ConfigRoutes) -> Result<(), ConfigError> {
        let errors: Vec<ValidationError> = routes
            .keys()
            .filter(|locale| !self.settings.locales.contains(locale))
            .map(|locale| {
                ValidationError::new(
                    format!("routes.{locale}"),
                    format!("Segment translations given for unknown locale '{locale}'"),
                )
            })
            .collect();
        if !errors.is_empty() {
            return Err(ConfigError::ValidationErrors(errors));
        }

        self.write().segments.add_routes(routes);
        Ok(())
    }

    /// Registers formatters for every locale, replacing same-named ones.
    pub fn add_formatters<I>(&self, formatters: I)
    where
        I: IntoIterator<Item = (String, Formatter)>,
    {
        let formatters: Vec<(String, Formatter)> = formatters.into_iter().collect();
        let mut banks = self.write();
        for registry in banks.formatters.values_mut() {
            registry.extend(formatters.iter().cloned());
        }
        tracing::debug!(count = formatters.len(), "Added formatters");
    }

    /// Looks a formatter up for `locale`, failing with `FormatterNotFound`.
    pub fn formatter(&self, name: &str, locale: &str) -> Result<Formatter, TranslationError> {
        let banks = self.read();
        banks
            .formatters_for(locale, &self.settings.primary_locale)
            .ok_or_else(|| TranslationError::FormatterNotFound { name: name.to_string() })?
            .get(name)
            .cloned()
    }
}

/// Lookups bound to the locale and route of one page.
#[derive(Debug)]
pub struct Page<'a> {
    /// Engine the page reads from
    i18n: &'a I18n,
    /// Resolved locale and route
    context: PageContext,
}

impl Page<'_> {
    /// Locale the page renders in.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.context.locale
    }

    /// Route in primary-locale segments; doubles as the route namespace.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.context.route
    }

    /// [`I18n::t`] with the page route and locale.
    pub fn t(&self, key: &str, properties: &Properties) -> Result<String, TranslationError> {
        let options = TranslateOptions {
            route: Some(self.context.route.clone()),
            locale: Some(self.context.locale.clone()),
            fallback_locale: None,
        };
        self.i18n.t(key, properties, &options)
    }

    /// [`I18n::l`] targeting the page locale by default.
    #[must_use]
    pub fn l(&self, route: &str, parameters: &Properties, options: &LocalizeOptions) -> String {
        self.i18n.localize(route, parameters, options, &self.context.locale)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use std::thread;

    use googletest::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::{
        routes,
        translations,
    };
    use crate::value::Value;

    fn config() -> I18nConfig {
        serde_json::from_value(json!({
            "primaryLocale": "en",
            "secondaryLocales": ["fr"],
            "translations": {
                "common": {
                    "en": { "title": "Title", "price": "{# amount>intl_format_number({ style: 'currency', currency: 'EUR' }) #}" },
                    "fr": { "title": "Titre", "price": "{# amount>intl_format_number({ style: 'currency', currency: 'EUR' }) #}" }
                },
                "/about": { "en": { "heading": "About us" }, "fr": { "heading": "À propos" } }
            },
            "routes": { "fr": { "about": "a-propos" } }
        }))
        .unwrap()
    }

    #[googletest::test]
    fn invalid_config_is_rejected() {
        let config = I18nConfig { fallback_locale: Some("de".to_string()), ..config() };

        let result = I18n::new(config);

        assert!(matches!(result, Err(I18nError::Config(ConfigError::ValidationErrors(_)))));
    }

    #[googletest::test]
    fn malformed_translation_aborts_initialization() {
        let mut config = config();
        config.translations.insert(
            "broken".to_string(),
            [("en".to_string(), json!({ "key{{ n: {} }}": "x" }))].into_iter().collect(),
        );

        let result = I18n::new(config);

        assert!(matches!(result, Err(I18nError::Translation(_))));
    }

    #[googletest::test]
    fn page_context_drives_t_and_l() {
        let i18n = I18n::new(config()).unwrap();

        let page = i18n.page("/fr/a-propos");
        let heading = page.t("heading", &Properties::new()).unwrap();
        let title = page.t("title", &Properties::new()).unwrap();
        let link = page.l("/about", &Properties::new(), &LocalizeOptions::default());

        expect_that!(page.locale(), eq("fr"));
        expect_that!(page.route(), eq("/about"));
        expect_that!(heading.as_str(), eq("À propos"));
        expect_that!(title.as_str(), eq("Titre"));
        expect_that!(link.as_str(), eq("/fr/a-propos"));
    }

    #[googletest::test]
    fn locale_aware_formatters_default_to_the_lookup_locale() {
        let i18n = I18n::new(config()).unwrap();
        let properties = Properties::new().with("amount", 1234.5);

        let english = i18n.t("price", &properties, &TranslateOptions::default()).unwrap();
        let french = i18n.page("/fr").t("price", &properties).unwrap();

        expect_that!(english.as_str(), eq("€1,234.50"));
        expect_that!(french.as_str(), eq("1\u{202f}234,50\u{a0}€"));
    }

    #[googletest::test]
    fn runtime_extensions() {
        let i18n = I18n::new(config()).unwrap();
        let extra_translations = translations(json!({
            "common": { "en": { "greeting": "{# name>shout #}", "title{{ n: 1 }}": "One title" } }
        }));
        let extra_routes = routes(json!({ "fr": { "team": "equipe" } }));

        i18n.add_translations(&extra_translations).unwrap();
        i18n.add_routes(&extra_routes).unwrap();
        i18n.add_formatters([(
            "shout".to_string(),
            Formatter::new(|value, _| Ok(Value::String(format!("{}!", value.to_display_string())))),
        )]);

        let greeting = i18n.t("greeting", &Properties::new().with("name", "Ada"), &TranslateOptions::default()).unwrap();
        let link = i18n.l("/team", &Properties::new(), &LocalizeOptions {
            target_locale: Some("fr".to_string()),
            ..LocalizeOptions::default()
        });

        let title = i18n.t("title", &Properties::new(), &TranslateOptions::default()).unwrap();
        let one_title = i18n.t("title", &Properties::new().with("n", 1.0), &TranslateOptions::default()).unwrap();

        expect_that!(greeting.as_str(), eq("Ada!"));
        expect_that!(title.as_str(), eq("Title"));
        expect_that!(one_title.as_str(), eq("One title"));
        expect_that!(link.as_str(), eq("/fr/equipe"));
        expect_that!(i18n.formatter("shout", "fr").is_ok(), eq(true));
    }

    #[googletest::test]
    fn failed_extension_leaves_banks_untouched() {
        let i18n = I18n::new(config()).unwrap();
        let bad_translations = translations(json!({
            "common": { "en": { "title": "Changed", "bad{{ x }}": "y" } }
        }));
        let bad_routes = routes(json!({ "de": { "about": "uber" } }));

        let translation_result = i18n.add_translations(&bad_translations);
        let route_result = i18n.add_routes(&bad_routes);
        let rule_result =
            i18n.add_translation_loading_rules(&[LoadDirective { groups: vec!["(".to_string()], routes: vec![] }]);

        assert!(translation_result.is_err());
        assert!(route_result.is_err());
        assert!(rule_result.is_err());
        let title = i18n.t("title", &Properties::new(), &TranslateOptions::default()).unwrap();
        expect_that!(title.as_str(), eq("Title"));
    }

    #[googletest::test]
    fn registry_lookup_fails_for_unknown_formatter() {
        let i18n = I18n::new(config()).unwrap();

        let result = i18n.formatter("missing", "en");

        assert!(matches!(result, Err(TranslationError::FormatterNotFound { name }) if name == "missing"));
    }

    #[googletest::test]
    fn concurrent_reads_and_extension() {
        let i18n = Arc::new(I18n::new(config()).unwrap());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let i18n = Arc::clone(&i18n);
                thread::spawn(move || {
                    (0..100)
                        .map(|_| i18n.t("title", &Properties::new(), &TranslateOptions::default()).unwrap())
                        .all(|title| title == "Title")
                })
            })
            .collect();
        i18n.add_translations(&translations(json!({ "common": { "en": { "extra": "Extra" } } }))).unwrap();

        for reader in readers {
            expect_that!(reader.join().unwrap(), eq(true));
        }
        let extra = i18n.t("extra", &Properties::new(), &TranslateOptions::default()).unwrap();
        expect_that!(extra.as_str(), eq("Extra"));
    }

    #[googletest::test]
    fn from_dir_reads_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(config::CONFIG_FILE_NAME),
            r#"{"primaryLocale": "fr", "translations": {"common": {"fr": {"hello": "Bonjour"}}}}"#,
        )
        .unwrap();

        let i18n = I18n::from_dir(temp_dir.path()).unwrap();
        let hello = i18n.t("hello", &Properties::new(), &TranslateOptions::default()).unwrap();

        expect_that!(i18n.primary_locale(), eq("fr"));
        expect_that!(hello.as_str(), eq("Bonjour"));
    }

    #[googletest::test]
    fn from_dir_without_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let i18n = I18n::from_dir(temp_dir.path()).unwrap();

        expect_that!(i18n.primary_locale(), eq("en"));
        expect_that!(i18n.fallback_locale(), eq("en"));
    }
}
