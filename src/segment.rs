//! Route segment translations between every pair of locales.

use std::collections::{
    BTreeMap,
    HashMap,
};

use crate::config::ConfigRoutes;

/// `untranslated segment → other locale → translated segment`
type SegmentTable = HashMap<String, HashMap<String, String>>;

/// Translates single path segments between locales.
///
/// Built from dictionaries keyed by primary-locale segment. Every pair of
/// locales sharing a primary segment is mirrored in both directions, so a
/// secondary-locale segment translates to the primary locale and to every
/// other secondary locale.
#[derive(Debug, Clone, Default)]
pub struct SegmentBank {
    /// Locale the dictionaries are keyed by
    primary_locale: String,
    /// Raw dictionaries as added
    routes: ConfigRoutes,
    /// Mirrors keyed by the locale of the untranslated segment
    segments: BTreeMap<String, SegmentTable>,
}

impl SegmentBank {
    /// Builds the mirrors of `routes`.
    #[must_use]
    pub fn new(primary_locale: impl Into<String>, routes: &ConfigRoutes) -> Self {
        let mut bank = Self { primary_locale: primary_locale.into(), ..Self::default() };
        bank.add_routes(routes);
        bank
    }

    /// Merges `routes` into the dictionaries and rebuilds every mirror.
    pub fn add_routes(&mut self, routes: &ConfigRoutes) {
        for (locale, dictionary) in routes {
            self.routes
                .entry(locale.clone())
                .or_default()
                .extend(dictionary.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self.rebuild();
        tracing::debug!(
            locales = self.segments.len(),
            segments = self.segments.values().map(HashMap::len).sum::<usize>(),
            "Rebuilt segment translations"
        );
    }

    /// Recomputes every mirror from the raw dictionaries.
    fn rebuild(&mut self) {
        // primary segment → locale → segment in that locale
        let mut groups: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();
        for (locale, dictionary) in &self.routes {
            if *locale == self.primary_locale {
                continue;
            }
            for (primary_segment, translated) in dictionary {
                let group = groups.entry(primary_segment).or_default();
                group.insert(&self.primary_locale, primary_segment);
                group.insert(locale, translated);
            }
        }

        let mut segments: BTreeMap<String, SegmentTable> = BTreeMap::new();
        for group in groups.values() {
            for (from_locale, from_segment) in group {
                let table = segments.entry((*from_locale).to_string()).or_default();
                let targets = table.entry((*from_segment).to_string()).or_default();
                for (to_locale, to_segment) in group {
                    if from_locale != to_locale {
                        targets.insert((*to_locale).to_string(), (*to_segment).to_string());
                    }
                }
            }
        }
        self.segments = segments;
    }

    /// Translation of `segment` from `segment_locale` into `target_locale`.
    #[must_use]
    pub fn get(&self, segment: &str, segment_locale: &str, target_locale: &str) -> Option<&str> {
        self.segments.get(segment_locale)?.get(segment)?.get(target_locale).map(String::as_str)
    }

    /// Locales whose dictionary knows `segment` as an untranslated segment.
    #[must_use]
    pub fn get_segment_locales(&self, segment: &str) -> Vec<&str> {
        self.segments
            .iter()
            .filter(|(_, table)| table.contains_key(segment))
            .map(|(locale, _)| locale.as_str())
            .collect()
    }

    /// Whether `segment` is a known untranslated segment in `locale`.
    #[must_use]
    pub fn knows(&self, locale: &str, segment: &str) -> bool {
        self.segments.get(locale).is_some_and(|table| table.contains_key(segment))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::test_utils::routes;

    fn bank() -> SegmentBank {
        let routes = routes(json!({
            "fr": { "about": "a-propos", "blog": "blogue", "team": "equipe" },
            "es": { "about": "acerca", "blog": "blog" }
        }));
        SegmentBank::new("en", &routes)
    }

    #[rstest]
    #[case::primary_to_secondary("about", "en", "fr", Some("a-propos"))]
    #[case::secondary_to_primary("a-propos", "fr", "en", Some("about"))]
    #[case::secondary_to_secondary("a-propos", "fr", "es", Some("acerca"))]
    #[case::reverse_secondary("acerca", "es", "fr", Some("a-propos"))]
    #[case::unknown_in_target("team", "en", "es", None)]
    #[case::wrong_source_locale("a-propos", "en", "fr", None)]
    #[case::same_locale("about", "en", "en", None)]
    fn translates_segments(
        #[case] segment: &str,
        #[case] from: &str,
        #[case] to: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_that!(bank().get(segment, from, to), eq(expected));
    }

    #[googletest::test]
    fn segment_locales() {
        let bank = bank();

        assert_eq!(bank.get_segment_locales("blog"), vec!["en", "es"]);
        assert_eq!(bank.get_segment_locales("blogue"), vec!["fr"]);
        expect_that!(bank.get_segment_locales("unknown").is_empty(), eq(true));
        expect_that!(bank.knows("fr", "equipe"), eq(true));
    }

    #[googletest::test]
    fn add_routes_rebuilds_mirrors() {
        let mut bank = bank();
        let extra = routes(json!({ "es": { "team": "equipo" } }));

        bank.add_routes(&extra);

        expect_that!(bank.get("equipe", "fr", "es"), some(eq("equipo")));
        expect_that!(bank.get("equipo", "es", "en"), some(eq("team")));
        expect_that!(bank.get("acerca", "es", "fr"), some(eq("a-propos")));
    }
}
