//! Formatters registered by default.

use super::intl::{
    DateFormatOptions,
    NumberFormatOptions,
    format_date,
    format_number,
};
use super::{
    Formatter,
    required_arg,
};
use crate::error::FormatterError;
use crate::value::Value;

/// Built-in formatters; `intl_*` default to `locale`.
pub(super) fn default_formatters(locale: &str) -> Vec<(String, Formatter)> {
    let number_locale = locale.to_string();
    let date_locale = locale.to_string();

    vec![
        ("upper".to_string(), Formatter::new(|value, _| Ok(map_text(value, str::to_uppercase)))),
        ("uppercase".to_string(), Formatter::new(|value, _| Ok(map_text(value, str::to_uppercase)))),
        ("lower".to_string(), Formatter::new(|value, _| Ok(map_text(value, str::to_lowercase)))),
        ("lowercase".to_string(), Formatter::new(|value, _| Ok(map_text(value, str::to_lowercase)))),
        ("capitalize".to_string(), Formatter::new(|value, _| Ok(map_text(value, capitalize)))),
        ("json".to_string(), Formatter::new(json)),
        ("default_nullish".to_string(), Formatter::new(default_nullish)),
        ("default_falsy".to_string(), Formatter::new(default_falsy)),
        ("default_non_string".to_string(), Formatter::new(default_non_string)),
        (
            "intl_format_number".to_string(),
            Formatter::new(move |value, args| intl_format_number(value, args, &number_locale)),
        ),
        (
            "intl_format_date".to_string(),
            Formatter::new(move |value, args| intl_format_date(value, args, &date_locale)),
        ),
    ]
}

/// Applies `f` to the displayed form of `value`; `undefined` stays `undefined`.
fn map_text(value: &Value, f: impl Fn(&str) -> String) -> Value {
    if matches!(value, Value::Undefined) {
        return Value::Undefined;
    }
    Value::String(f(&value.to_display_string()))
}

/// Uppercases the first character only.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// `json(pretty = false)`
fn json(value: &Value, args: &[Value]) -> Result<Value, FormatterError> {
    let pretty = match args.first() {
        None | Some(Value::Undefined) => false,
        Some(Value::Bool(pretty)) => *pretty,
        Some(other) => {
            return Err(FormatterError::InvalidParameter {
                formatter: "json".to_string(),
                parameter: "pretty".to_string(),
                message: format!("expected a boolean, received {}", other.type_name()),
            });
        }
    };
    let Some(json) = value.to_json() else {
        return Ok(Value::Undefined);
    };
    let text = if pretty { serde_json::to_string_pretty(&json) } else { serde_json::to_string(&json) };
    Ok(text.map_or(Value::Undefined, Value::String))
}

/// `default_nullish(default)`: replaces `undefined` and `null`.
fn default_nullish(value: &Value, args: &[Value]) -> Result<Value, FormatterError> {
    let fallback = required_arg("default_nullish", args, 0, "default")?;
    Ok(if value.is_nullish() { fallback.clone() } else { value.clone() })
}

/// `default_falsy(default)`: replaces any falsy value.
fn default_falsy(value: &Value, args: &[Value]) -> Result<Value, FormatterError> {
    let fallback = required_arg("default_falsy", args, 0, "default")?;
    Ok(if value.is_truthy() { value.clone() } else { fallback.clone() })
}

/// `default_non_string(default)`: replaces anything but a string.
fn default_non_string(value: &Value, args: &[Value]) -> Result<Value, FormatterError> {
    let fallback = required_arg("default_non_string", args, 0, "default")?;
    Ok(if matches!(value, Value::String(_)) { value.clone() } else { fallback.clone() })
}

/// Locale passed explicitly as argument `index`, or the registration default.
fn locale_arg<'a>(
    formatter: &str,
    args: &'a [Value],
    index: usize,
    default: &'a str,
) -> Result<&'a str, FormatterError> {
    match args.get(index) {
        None | Some(Value::Undefined) => Ok(default),
        Some(Value::String(locale)) => Ok(locale),
        Some(other) => Err(FormatterError::InvalidParameter {
            formatter: formatter.to_string(),
            parameter: "locale".to_string(),
            message: format!("expected a string, received {}", other.type_name()),
        }),
    }
}

/// `intl_format_number(options?, locale?)`
fn intl_format_number(value: &Value, args: &[Value], default_locale: &str) -> Result<Value, FormatterError> {
    /// Name used in errors
    const NAME: &str = "intl_format_number";

    let number = match value {
        Value::Number(n) => *n,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid_value(NAME, "a number", value))?,
        other => return Err(invalid_value(NAME, "a number", other)),
    };
    let options = NumberFormatOptions::from_value(NAME, args.first().unwrap_or(&Value::Undefined))?;
    let locale = locale_arg(NAME, args, 1, default_locale)?;

    format_number(number, locale, &options).map(Value::String)
}

/// `intl_format_date(options?, locale?)`
fn intl_format_date(value: &Value, args: &[Value], default_locale: &str) -> Result<Value, FormatterError> {
    /// Name used in errors
    const NAME: &str = "intl_format_date";

    let options = DateFormatOptions::from_value(NAME, args.first().unwrap_or(&Value::Undefined))?;
    let locale = locale_arg(NAME, args, 1, default_locale)?;

    format_date(value, locale, options).map(Value::String)
}

/// Wrong input type for `formatter`.
fn invalid_value(formatter: &str, expected: &'static str, found: &Value) -> FormatterError {
    FormatterError::InvalidValue {
        formatter: formatter.to_string(),
        expected,
        found: found.type_name().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::formatter::FormatterRegistry;

    fn apply(name: &str, value: Value, args: &[Value]) -> Result<Value, FormatterError> {
        FormatterRegistry::with_defaults("en").get(name).unwrap().format(&value, args)
    }

    #[rstest]
    #[case("upper", Value::from("hello"), Value::from("HELLO"))]
    #[case("uppercase", Value::from("hello"), Value::from("HELLO"))]
    #[case("lower", Value::from("HeLLo"), Value::from("hello"))]
    #[case("lowercase", Value::from("HeLLo"), Value::from("hello"))]
    #[case("capitalize", Value::from("élan vital"), Value::from("Élan vital"))]
    #[case("capitalize", Value::from(""), Value::from(""))]
    #[case("upper", Value::Undefined, Value::Undefined)]
    #[case("upper", Value::Number(12.0), Value::from("12"))]
    fn text_formatters(#[case] name: &str, #[case] value: Value, #[case] expected: Value) {
        assert_eq!(apply(name, value, &[]).unwrap(), expected);
    }

    #[googletest::test]
    fn uppercase_of_object_uppercases_its_json() {
        let value = Value::Object(vec![("object".to_string(), Value::from("value"))]);

        let result = apply("uppercase", value, &[]).unwrap();

        assert_eq!(result, Value::from(r#"{"OBJECT":"VALUE"}"#));
    }

    #[googletest::test]
    fn json_formatter_compact_and_pretty() {
        let value = Value::Object(vec![("a".to_string(), Value::Number(1.0))]);

        let compact = apply("json", value.clone(), &[]).unwrap();
        let pretty = apply("json", value, &[Value::Bool(true)]).unwrap();

        assert_eq!(compact, Value::from(r#"{"a":1}"#));
        assert_eq!(pretty, Value::from("{\n  \"a\": 1\n}"));
    }

    #[googletest::test]
    fn json_rejects_non_boolean_flag() {
        let result = apply("json", Value::Null, &[Value::from("yes")]);

        assert!(matches!(result, Err(FormatterError::InvalidParameter { .. })));
    }

    #[rstest]
    #[case("default_nullish", Value::Null, Value::from("fallback"))]
    #[case("default_nullish", Value::Undefined, Value::from("fallback"))]
    #[case("default_nullish", Value::Number(0.0), Value::Number(0.0))]
    #[case("default_falsy", Value::Number(0.0), Value::from("fallback"))]
    #[case("default_falsy", Value::from(""), Value::from("fallback"))]
    #[case("default_falsy", Value::from("set"), Value::from("set"))]
    #[case("default_non_string", Value::Number(1.0), Value::from("fallback"))]
    #[case("default_non_string", Value::from("text"), Value::from("text"))]
    fn default_formatters(#[case] name: &str, #[case] value: Value, #[case] expected: Value) {
        assert_eq!(apply(name, value, &[Value::from("fallback")]).unwrap(), expected);
    }

    #[googletest::test]
    fn default_formatters_require_an_argument() {
        let result = apply("default_nullish", Value::Null, &[]);

        assert!(matches!(result, Err(FormatterError::InvalidParameter { .. })));
    }

    #[googletest::test]
    fn number_formatter_rejects_non_numbers() {
        let result = apply("intl_format_number", Value::Bool(true), &[]);

        assert!(matches!(result, Err(FormatterError::InvalidValue { expected: "a number", .. })));
    }

    #[googletest::test]
    fn number_formatter_uses_explicit_locale_over_registration_locale() {
        let options = Value::Object(vec![
            ("style".to_string(), Value::from("currency")),
            ("currency".to_string(), Value::from("EUR")),
        ]);

        let english = apply("intl_format_number", Value::Number(1234.5), &[options.clone()]).unwrap();
        let french =
            apply("intl_format_number", Value::Number(1234.5), &[options, Value::from("fr")]).unwrap();

        assert_eq!(english, Value::from("€1,234.50"));
        assert_eq!(french, Value::from("1\u{202f}234,50\u{a0}€"));
    }

    #[googletest::test]
    fn locale_argument_must_be_a_string() {
        let result = apply("intl_format_number", Value::Number(1.0), &[Value::Undefined, Value::Number(1.0)]);

        assert!(matches!(result, Err(FormatterError::InvalidParameter { parameter, .. }) if parameter == "locale"));
    }
}
