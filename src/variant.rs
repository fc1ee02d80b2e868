//! Variant specifiers: `key{{ prop: value, prop2: [v1, v2], $priority: n }}`.
//!
//! A variant is an alternate rendering of a translation key. Its properties
//! are scored against the caller's properties; the best-scoring variant
//! replaces the key's default string.

use crate::error::TemplateError;
use crate::template::ast::{
    Expr,
    Interpolation,
};
use crate::template::matcher::match_variable;
use crate::template::parser::parse_interpolation;
use crate::template::scanner::{
    find_top_level,
    split_top_level,
};
use crate::value::{
    Properties,
    Value,
};

/// Reserved property holding the variant's priority.
pub const PRIORITY_PROPERTY: &str = "$priority";

/// Score awarded to a strictly equal candidate.
const EXACT_MATCH_SCORE: f64 = 1000.0;

/// Splits `name{{ n: 1 }}` into `("name", " n: 1 ")`.
///
/// Returns `None` when `key` carries no variant suffix.
#[must_use]
pub fn split_variant_key(key: &str) -> Option<(&str, &str)> {
    let body = key.strip_suffix("}}")?;
    let open = body.find("{{")?;
    Some((body.get(..open)?, body.get(open + 2..)?))
}

/// Value a variant property may declare.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Boolean literal
    Bool(bool),
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
}

impl Primitive {
    /// `None` for arrays and objects.
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Undefined => Some(Self::Undefined),
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(Self::Number(*n)),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Strict equality: same kind and same value, `NaN` never equal.
    #[allow(clippy::float_cmp)]
    fn strictly_equals(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Undefined, Value::Undefined) | (Self::Null, Value::Null) => true,
            (Self::Bool(a), Value::Bool(b)) => a == b,
            (Self::Number(a), Value::Number(b)) => a == b,
            (Self::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    /// Contribution of this candidate against `actual`, or `None` when the
    /// candidate neither matches nor is numerically comparable.
    #[allow(clippy::float_arithmetic)]
    fn score_against(&self, actual: &Value) -> Option<f64> {
        if self.strictly_equals(actual) {
            return Some(EXACT_MATCH_SCORE);
        }
        match (self, actual) {
            (Self::Number(candidate), Value::Number(actual)) => {
                Some((EXACT_MATCH_SCORE / (actual - candidate)).abs() - 1.0)
            }
            _ => None,
        }
    }
}

/// One `name: value` or `name: [values]` constraint. Scalar values are
/// stored as a single-element list.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantProperty {
    /// Property name
    pub name: String,
    /// Accepted candidates
    pub values: Vec<Primitive>,
}

impl VariantProperty {
    /// Best candidate score, or `None` when the caller did not supply the
    /// property.
    ///
    /// A supplied property with no comparable candidate yields negative
    /// infinity; any `NaN` candidate makes the result `NaN`.
    fn score(&self, properties: &Properties) -> Option<f64> {
        if !properties.contains(&self.name) {
            return None;
        }
        let actual = properties.get(&self.name).unwrap_or(&Value::Undefined);

        let best = self
            .values
            .iter()
            .filter_map(|candidate| candidate.score_against(actual))
            .fold(f64::NEG_INFINITY, |best, score| if score.is_nan() || score > best { score } else { best });
        Some(best)
    }
}

/// A parsed variant and the translation value it renders to.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Specifier text between `{{` and `}}`
    pub raw: String,
    /// `$priority`, 0 when absent
    pub priority: f64,
    /// Constraints in declaration order
    pub properties: Vec<VariantProperty>,
    /// Translation rendered when this variant wins
    pub value: String,
}

impl Variant {
    /// Parses the specifier `raw` of a variant rendering to `value`.
    pub fn parse(raw: &str, value: impl Into<String>) -> Result<Self, TemplateError> {
        let mut priority = 0.0;
        let mut properties = Vec::new();

        for entry in split_top_level(raw, ',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let Some(colon) = find_top_level(entry, ':') else {
                return Err(TemplateError::InvalidVariantPropertyKey {
                    key: entry.to_string(),
                    variant: raw.to_string(),
                });
            };
            let key = entry.get(..colon).unwrap_or_default().trim();
            let source = entry.get(colon + 1..).unwrap_or_default().trim();

            if !is_identifier(key) {
                return Err(TemplateError::InvalidVariantPropertyKey {
                    key: key.to_string(),
                    variant: raw.to_string(),
                });
            }

            if key == PRIORITY_PROPERTY {
                priority = parse_priority(source, raw)?;
                continue;
            }

            let values = parse_property_values(source).ok_or_else(|| TemplateError::InvalidVariantPropertyValue {
                key: key.to_string(),
                value: source.to_string(),
                variant: raw.to_string(),
            })?;
            properties.push(VariantProperty { name: key.to_string(), values });
        }

        Ok(Self { raw: raw.to_string(), priority, properties, value: value.into() })
    }

    /// Sum of per-property maxima plus priority.
    ///
    /// Properties the caller did not supply are skipped.
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn calculate_matching_score(&self, properties: &Properties) -> f64 {
        self.properties.iter().filter_map(|property| property.score(properties)).sum::<f64>() + self.priority
    }
}

/// Whether `key` is one whole identifier.
fn is_identifier(key: &str) -> bool {
    matches!(match_variable(key), Ok(Some(matched)) if matched.end() == key.len())
}

/// `$priority` must be a plain number literal.
fn parse_priority(source: &str, variant: &str) -> Result<f64, TemplateError> {
    parse_interpolation(source)
        .ok()
        .and_then(|parsed| parsed.as_plain_literal().and_then(Value::as_number))
        .ok_or_else(|| TemplateError::InvalidVariantPriority {
            value: source.to_string(),
            variant: variant.to_string(),
        })
}

/// A primitive literal or an array of primitive literals.
fn parse_property_values(source: &str) -> Option<Vec<Primitive>> {
    let parsed = parse_interpolation(source).ok()?;
    if let Some(literal) = parsed.as_plain_literal() {
        return Primitive::from_value(literal).map(|primitive| vec![primitive]);
    }
    match &parsed.value {
        Expr::Array(items) if parsed.alias.is_none() && parsed.formatters.is_empty() => items
            .iter()
            .map(|item| Interpolation::as_plain_literal(item).and_then(Primitive::from_value))
            .collect(),
        _ => None,
    }
}

/// Picks the variant with the strictly greatest positive score; ties keep
/// the earlier variant.
#[must_use]
pub fn select_variant<'a>(variants: &'a [Variant], properties: &Properties) -> Option<&'a Variant> {
    let mut best: Option<(&Variant, f64)> = None;
    for variant in variants {
        let score = variant.calculate_matching_score(properties);
        if score > best.map_or(0.0, |(_, best_score)| best_score) {
            best = Some((variant, score));
        }
    }
    best.map(|(variant, _)| variant)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_arithmetic)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn variants() -> Vec<Variant> {
        [
            ("n: -2", "n=-2"),
            ("n: 2", "n=2"),
            ("n: 2, x: 'text'", "n=2&x=text"),
            ("n: 3", "n=3"),
            ("n: [4, 'text', true]", "n=4|text|true"),
        ]
        .into_iter()
        .map(|(raw, value)| Variant::parse(raw, value).unwrap())
        .collect()
    }

    fn selected(variants: &[Variant], properties: &Properties) -> Option<String> {
        select_variant(variants, properties).map(|variant| variant.value.clone())
    }

    #[rstest]
    #[case("greeting{{ n: 1 }}", Some(("greeting", " n: 1 ")))]
    #[case("nested.key{{n:1}}", Some(("nested.key", "n:1")))]
    #[case("greeting", None)]
    #[case("greeting}}", None)]
    fn splits_variant_keys(#[case] key: &str, #[case] expected: Option<(&str, &str)>) {
        assert_eq!(split_variant_key(key), expected);
    }

    #[googletest::test]
    fn parses_properties_and_priority() {
        let variant = Variant::parse("n: [1, 'a', null], flag: true, $priority: 10", "value").unwrap();

        expect_that!(variant.priority, eq(10.0));
        expect_that!(variant.properties.len(), eq(2));
        expect_that!(variant.properties[0].name.as_str(), eq("n"));
        assert_eq!(
            variant.properties[0].values,
            vec![Primitive::Number(1.0), Primitive::String("a".to_string()), Primitive::Null]
        );
        assert_eq!(variant.properties[1].values, vec![Primitive::Bool(true)]);
    }

    #[googletest::test]
    fn commas_inside_strings_and_arrays_do_not_split() {
        let variant = Variant::parse("label: 'a, b', n: [1, 2]", "value").unwrap();

        expect_that!(variant.properties.len(), eq(2));
        assert_eq!(variant.properties[0].values, vec![Primitive::String("a, b".to_string())]);
    }

    #[rstest]
    #[case::object_value("n: { a: 1 }")]
    #[case::nested_array("n: [[1]]")]
    #[case::formatter("n: 1>upper")]
    #[case::unparsable("n: ?")]
    fn rejects_non_primitive_values(#[case] raw: &str) {
        let result = Variant::parse(raw, "value");

        assert!(matches!(result, Err(TemplateError::InvalidVariantPropertyValue { .. })), "{result:?}");
    }

    #[rstest]
    #[case::missing_colon("n")]
    #[case::not_an_identifier("'n': 1")]
    #[case::empty_key(": 1")]
    fn rejects_invalid_keys(#[case] raw: &str) {
        let result = Variant::parse(raw, "value");

        assert!(matches!(result, Err(TemplateError::InvalidVariantPropertyKey { .. })), "{result:?}");
    }

    #[rstest]
    #[case("$priority: 'high'")]
    #[case("$priority: [1]")]
    fn rejects_non_numeric_priority(#[case] raw: &str) {
        let result = Variant::parse(raw, "value");

        assert!(matches!(result, Err(TemplateError::InvalidVariantPriority { .. })), "{result:?}");
    }

    #[rstest]
    #[case::exact(2.0, 1000.0)]
    #[case::distance_one(3.0, 999.0)]
    #[case::distance_minus_two(0.0, 499.0)]
    fn numeric_decay(#[case] input: f64, #[case] expected: f64) {
        let variant = Variant::parse("n: 2", "value").unwrap();

        let score = variant.calculate_matching_score(&Properties::new().with("n", input));

        assert_that!(score, approx_eq(expected));
    }

    #[googletest::test]
    fn decay_is_not_symmetric_around_the_input() {
        let minus_two = Variant::parse("n: -2", "value").unwrap();
        let two = Variant::parse("n: 2", "value").unwrap();
        let properties = Properties::new().with("n", 1);

        expect_that!(minus_two.calculate_matching_score(&properties), near(1000.0 / 3.0 - 1.0, 1e-9));
        expect_that!(two.calculate_matching_score(&properties), eq(999.0));
    }

    #[googletest::test]
    fn unsupplied_properties_are_skipped() {
        let variant = Variant::parse("n: 2, x: 'text'", "value").unwrap();

        let score = variant.calculate_matching_score(&Properties::new().with("n", 2));

        expect_that!(score, eq(1000.0));
    }

    #[googletest::test]
    fn supplied_but_incomparable_property_disqualifies() {
        let variant = Variant::parse("x: 'text'", "value").unwrap();

        let score = variant.calculate_matching_score(&Properties::new().with("x", "other"));

        expect_that!(score, eq(f64::NEG_INFINITY));
    }

    #[rstest]
    #[case::closest_wins_at_one(Properties::new().with("n", 1), Some("n=2"))]
    #[case::exact_beats_compound(Properties::new().with("n", 2), Some("n=2"))]
    #[case::compound_when_both_match(Properties::new().with("n", 2).with("x", "text"), Some("n=2&x=text"))]
    #[case::array_number(Properties::new().with("n", 4), Some("n=4|text|true"))]
    #[case::array_string(Properties::new().with("n", "text"), Some("n=4|text|true"))]
    #[case::array_boolean(Properties::new().with("n", true), Some("n=4|text|true"))]
    #[case::no_properties(Properties::new(), None)]
    #[case::unrelated_property(Properties::new().with("other", 1), None)]
    fn selection(#[case] properties: Properties, #[case] expected: Option<&str>) {
        assert_eq!(selected(&variants(), &properties).as_deref(), expected);
    }

    #[googletest::test]
    fn priority_overrides_an_equal_match() {
        let variants = vec![
            Variant::parse("n: 3", "plain").unwrap(),
            Variant::parse("n: 3, $priority: 100", "prioritized").unwrap(),
        ];

        let winner = selected(&variants, &Properties::new().with("n", 3));

        assert_eq!(winner.as_deref(), Some("prioritized"));
        expect_that!(variants[1].calculate_matching_score(&Properties::new().with("n", 3)), eq(1100.0));
    }

    #[googletest::test]
    fn priority_alone_can_select_a_variant() {
        let variants = vec![Variant::parse("$priority: 1", "always").unwrap()];

        let winner = selected(&variants, &Properties::new());

        assert_eq!(winner.as_deref(), Some("always"));
    }
}
