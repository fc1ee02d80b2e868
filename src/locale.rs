//! Locale detection and route localization.

use crate::config::TrailingSlash;
use crate::segment::SegmentBank;
use crate::value::{
    Properties,
    Value,
};

/// Routing-related settings shared by every lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSettings {
    /// Locale whose routes carry no prefix
    pub primary_locale: String,
    /// Primary locale first, then the secondary locales
    pub locales: Vec<String>,
    /// Prefix primary-locale routes as well
    pub show_primary_locale: bool,
    /// Trailing slash policy
    pub trailing_slash: TrailingSlash,
}

impl RoutingSettings {
    /// Whether `segment` names a configured locale.
    fn is_locale(&self, segment: &str) -> bool {
        self.locales.iter().any(|locale| locale == segment)
    }
}

/// Non-empty `/`-separated segments of the path part of `route`.
#[must_use]
pub fn split_segments(route: &str) -> Vec<&str> {
    let path = route.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Locale whose dictionary knows the most of `segments` as untranslated
/// segments.
///
/// Returns `None` when the best score is shared, including when nothing
/// matches at all.
#[must_use]
pub fn detect_route_locale<'a>(segments: &[&str], locales: &'a [String], bank: &SegmentBank) -> Option<&'a str> {
    let mut best: Option<&str> = None;
    let mut best_score = 0;
    let mut tied = true;

    for locale in locales {
        let score = segments.iter().filter(|segment| bank.knows(locale, segment)).count();
        if score > best_score {
            best = Some(locale.as_str());
            best_score = score;
            tied = false;
        } else if score == best_score {
            tied = true;
        }
    }

    let detected = if tied { None } else { best };
    tracing::debug!(?segments, ?detected, "Detected route locale");
    detected
}

/// Locale and primary-locale route of the page being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Locale the page renders in
    pub locale: String,
    /// Path expressed in primary-locale segments, e.g. `/about`
    pub route: String,
}

/// Derives the page locale (prefix, then segment detection, then primary)
/// and the page route in primary-locale segments.
#[must_use]
pub fn resolve_page(url_path: &str, settings: &RoutingSettings, bank: &SegmentBank) -> PageContext {
    let mut segments = split_segments(url_path);
    let prefix = segments.first().copied().filter(|first| settings.is_locale(first));
    if prefix.is_some() {
        segments.remove(0);
    }

    let locale = prefix
        .or_else(|| detect_route_locale(&segments, &settings.locales, bank))
        .unwrap_or(&settings.primary_locale)
        .to_string();

    let route = join_path(
        segments
            .iter()
            .map(|segment| translate_segment(bank, segment, &locale, &settings.primary_locale)),
    );

    PageContext { locale, route }
}

/// Options of [`localize_route`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizeOptions {
    /// Locale to translate into; defaults to the page locale
    pub target_locale: Option<String>,
    /// Locale the route is written in; detected when absent
    pub route_locale: Option<String>,
    /// Overrides the configured `showPrimaryLocale`
    pub show_primary_locale: Option<bool>,
    /// Appended as a percent-encoded query string
    pub query: Vec<(String, String)>,
}

/// Translates `route` segment by segment into the target locale.
///
/// `[name]` and `[...name]` placeholders are replaced by the matching
/// parameter; placeholders without a parameter are kept.
#[must_use]
pub fn localize_route(
    route: &str,
    parameters: &Properties,
    options: &LocalizeOptions,
    page_locale: &str,
    settings: &RoutingSettings,
    bank: &SegmentBank,
) -> String {
    let mut segments = split_segments(route);
    let prefix = segments.first().copied().filter(|first| settings.is_locale(first));
    if prefix.is_some() {
        segments.remove(0);
    }

    let source = options
        .route_locale
        .as_deref()
        .or(prefix)
        .or_else(|| detect_route_locale(&segments, &settings.locales, bank))
        .unwrap_or(&settings.primary_locale);
    let target = options.target_locale.as_deref().unwrap_or(page_locale);

    let translated = segments
        .iter()
        .map(|segment| translate_segment(bank, segment, source, target))
        .map(|segment| substitute_parameter(&segment, parameters).unwrap_or(segment));

    let show_primary = options.show_primary_locale.unwrap_or(settings.show_primary_locale);
    let locale_prefix = (target != settings.primary_locale || show_primary).then(|| target.to_string());

    let mut path = join_path(locale_prefix.into_iter().chain(translated));
    if settings.trailing_slash == TrailingSlash::Always && !path.ends_with('/') {
        path.push('/');
    }

    if !options.query.is_empty() {
        path.push('?');
        for (i, (key, value)) in options.query.iter().enumerate() {
            if i > 0 {
                path.push('&');
            }
            path.push_str(&format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)));
        }
    }

    path
}

/// `segment` in locale `to`, or unchanged when no translation exists.
fn translate_segment(bank: &SegmentBank, segment: &str, from: &str, to: &str) -> String {
    if from == to {
        return segment.to_string();
    }
    bank.get(segment, from, to).unwrap_or(segment).to_string()
}

/// Value of a `[name]`/`[...name]` placeholder; `None` keeps the segment.
fn substitute_parameter(segment: &str, parameters: &Properties) -> Option<String> {
    let name = segment.strip_prefix('[')?.strip_suffix(']')?;
    let name = name.strip_prefix("...").unwrap_or(name);
    match parameters.get(name)? {
        Value::Undefined => None,
        Value::Array(items) => {
            Some(items.iter().map(Value::to_display_string).collect::<Vec<_>>().join("/"))
        }
        value => Some(value.to_display_string()),
    }
}

/// Joins segments into an absolute path, skipping empty ones.
fn join_path(segments: impl IntoIterator<Item = String>) -> String {
    let mut path = String::from("/");
    for segment in segments.into_iter().filter(|segment| !segment.is_empty()) {
        if path.len() > 1 {
            path.push('/');
        }
        path.push_str(&segment);
    }
    path
}
