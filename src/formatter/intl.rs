//! Locale-aware number and date rendering for the `intl_*` formatters,
//! backed by ICU4X compiled CLDR data.
//!
//! Dates are rendered in UTC.

use chrono::{
    DateTime,
    Datelike,
    NaiveDate,
    NaiveDateTime,
    Utc,
};
use fixed_decimal::{
    Decimal,
    FloatPrecision,
    SignedRoundingMode,
    UnsignedRoundingMode,
};
use icu::calendar::Date;
use icu::datetime::DateTimeFormatter;
use icu::datetime::fieldsets::{
    self,
    enums::DateFieldSet,
};
use icu::datetime::options::YearStyle;
use icu::decimal::DecimalFormatter;
use icu::decimal::options::{
    DecimalFormatterOptions,
    GroupingStrategy,
};
use icu::experimental::dimension::currency::CurrencyCode;
use icu::experimental::dimension::currency::formatter::CurrencyFormatter;
use icu::experimental::dimension::currency::options::CurrencyFormatterOptions;
use icu::experimental::dimension::percent::formatter::PercentFormatter;
use icu::experimental::dimension::percent::options::PercentFormatterOptions;
use icu::locale::Locale;
use tinystr::TinyAsciiStr;

use crate::error::FormatterError;
use crate::value::Value;

/// Formatter name used in number errors
const NUMBER_FORMATTER: &str = "intl_format_number";
/// Formatter name used in date errors
const DATE_FORMATTER: &str = "intl_format_date";
/// Upper bound for either fraction digit option
const MAX_FRACTION_DIGITS: i16 = 20;

/// `style` option of `intl_format_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberStyle {
    /// Plain number
    #[default]
    Decimal,
    /// Amount in `currency`
    Currency,
    /// Ratio rendered as a percentage
    Percent,
}

/// Options accepted by `intl_format_number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormatOptions {
    /// Rendering style
    pub style: NumberStyle,
    /// ISO 4217 code, required for the currency style
    pub currency: Option<String>,
    /// Pad with zeros up to this many fraction digits
    pub minimum_fraction_digits: Option<i16>,
    /// Round to at most this many fraction digits
    pub maximum_fraction_digits: Option<i16>,
    /// Only the decimal style honours `false`; currency and percent keep
    /// the locale grouping.
    pub use_grouping: bool,
}

impl Default for NumberFormatOptions {
    fn default() -> Self {
        Self {
            style: NumberStyle::Decimal,
            currency: None,
            minimum_fraction_digits: None,
            maximum_fraction_digits: None,
            use_grouping: true,
        }
    }
}

impl NumberFormatOptions {
    /// Reads options from an object value; `undefined` yields the defaults.
    pub fn from_value(formatter: &str, value: &Value) -> Result<Self, FormatterError> {
        let entries = match value {
            Value::Undefined => return Ok(Self::default()),
            Value::Object(entries) => entries,
            other => return Err(invalid_options(formatter, other)),
        };

        let mut options = Self::default();
        for (key, value) in entries {
            match key.as_str() {
                "style" => {
                    options.style = match value.as_str() {
                        Some("decimal") => NumberStyle::Decimal,
                        Some("currency") => NumberStyle::Currency,
                        Some("percent") => NumberStyle::Percent,
                        _ => return Err(invalid_option(formatter, key, value)),
                    };
                }
                "currency" => {
                    let code = value.as_str().ok_or_else(|| invalid_option(formatter, key, value))?;
                    options.currency = Some(code.to_ascii_uppercase());
                }
                "minimumFractionDigits" => {
                    options.minimum_fraction_digits = Some(digit_count(formatter, key, value)?);
                }
                "maximumFractionDigits" => {
                    options.maximum_fraction_digits = Some(digit_count(formatter, key, value)?);
                }
                "useGrouping" => {
                    options.use_grouping = match value {
                        Value::Bool(b) => *b,
                        _ => return Err(invalid_option(formatter, key, value)),
                    };
                }
                _ => {}
            }
        }

        if options.style == NumberStyle::Currency && options.currency.is_none() {
            return Err(FormatterError::InvalidParameter {
                formatter: formatter.to_string(),
                parameter: "currency".to_string(),
                message: "currency code is required with currency style".to_string(),
            });
        }
        Ok(options)
    }

    /// `(minimum, maximum)` fraction digits after applying style defaults.
    fn fraction_digits(&self) -> Result<(i16, i16), FormatterError> {
        let (default_min, default_max) = match self.style {
            NumberStyle::Decimal => (0, 3),
            NumberStyle::Percent => (0, 0),
            NumberStyle::Currency => {
                let digits = self.currency.as_deref().map_or(2, currency_digits);
                (digits, digits)
            }
        };

        match (self.minimum_fraction_digits, self.maximum_fraction_digits) {
            (None, None) => Ok((default_min, default_max)),
            (Some(min), None) => Ok((min, default_max.max(min))),
            (None, Some(max)) => Ok((default_min.min(max), max)),
            (Some(min), Some(max)) if min <= max => Ok((min, max)),
            (Some(_), Some(_)) => Err(FormatterError::InvalidParameter {
                formatter: NUMBER_FORMATTER.to_string(),
                parameter: "minimumFractionDigits".to_string(),
                message: "must not exceed maximumFractionDigits".to_string(),
            }),
        }
    }
}

/// An integer option between 0 and [`MAX_FRACTION_DIGITS`].
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn digit_count(formatter: &str, key: &str, value: &Value) -> Result<i16, FormatterError> {
    match value {
        Value::Number(n) if n.fract() == 0.0 && (0.0..=f64::from(MAX_FRACTION_DIGITS)).contains(n) => {
            Ok(*n as i16)
        }
        _ => Err(FormatterError::InvalidParameter {
            formatter: formatter.to_string(),
            parameter: key.to_string(),
            message: format!("expected an integer between 0 and {MAX_FRACTION_DIGITS}"),
        }),
    }
}

/// Error for an options argument that is not an object.
fn invalid_options(formatter: &str, value: &Value) -> FormatterError {
    FormatterError::InvalidParameter {
        formatter: formatter.to_string(),
        parameter: "options".to_string(),
        message: format!("expected an object, received {}", value.type_name()),
    }
}

/// Error for a recognised option holding an unsupported value.
fn invalid_option(formatter: &str, key: &str, value: &Value) -> FormatterError {
    FormatterError::InvalidParameter {
        formatter: formatter.to_string(),
        parameter: key.to_string(),
        message: format!("unsupported value `{}`", value.to_display_string()),
    }
}

/// ISO 4217 minor units of currencies without subunits; every other
/// currency uses two.
fn currency_digits(code: &str) -> i16 {
    match code {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF" | "UGX" | "UYI"
        | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

/// Parses a BCP 47 tag, accepting `_` as a separator.
fn parse_locale(formatter: &str, locale: &str) -> Result<Locale, FormatterError> {
    locale.replace('_', "-").parse::<Locale>().map_err(|e| FormatterError::InvalidParameter {
        formatter: formatter.to_string(),
        parameter: "locale".to_string(),
        message: format!("invalid locale `{locale}`: {e}"),
    })
}

/// Error for locale data ICU4X could not load.
fn data_error(formatter: &str, locale: &str, error: impl std::fmt::Display) -> FormatterError {
    FormatterError::InvalidParameter {
        formatter: formatter.to_string(),
        parameter: "locale".to_string(),
        message: format!("no formatting data for `{locale}`: {error}"),
    }
}

/// Rounds half away from zero to `max` fraction digits, then keeps at
/// least `min` of them.
fn apply_fraction_digits(decimal: &mut Decimal, min: i16, max: i16) {
    if *decimal.magnitude_range().start() < -max {
        decimal.round_with_mode(-max, SignedRoundingMode::Unsigned(UnsignedRoundingMode::HalfExpand));
    }
    decimal.trim_end();
    decimal.pad_end(-min);
}

/// Formats `n` for `locale`.
pub fn format_number(n: f64, locale: &str, options: &NumberFormatOptions) -> Result<String, FormatterError> {
    let (min_digits, max_digits) = options.fraction_digits()?;
    let icu_locale = parse_locale(NUMBER_FORMATTER, locale)?;

    if n.is_nan() {
        return Ok("NaN".to_string());
    }
    let Ok(mut decimal) = Decimal::try_from_f64(n, FloatPrecision::RoundTrip) else {
        return Ok(if n < 0.0 { "-∞" } else { "∞" }.to_string());
    };

    match options.style {
        NumberStyle::Decimal => {
            let mut decimal_options = DecimalFormatterOptions::default();
            if !options.use_grouping {
                decimal_options.grouping_strategy = Some(GroupingStrategy::Never);
            }
            let formatter = DecimalFormatter::try_new(icu_locale.into(), decimal_options)
                .map_err(|e| data_error(NUMBER_FORMATTER, locale, e))?;
            apply_fraction_digits(&mut decimal, min_digits, max_digits);
            Ok(formatter.format(&decimal).to_string())
        }
        NumberStyle::Percent => {
            let formatter = PercentFormatter::try_new(icu_locale.into(), PercentFormatterOptions::default())
                .map_err(|e| data_error(NUMBER_FORMATTER, locale, e))?;
            decimal.multiply_pow10(2);
            apply_fraction_digits(&mut decimal, min_digits, max_digits);
            Ok(formatter.format(&decimal).to_string())
        }
        NumberStyle::Currency => {
            let code = options.currency.as_deref().unwrap_or_default();
            let currency = TinyAsciiStr::<3>::try_from_str(code)
                .map(CurrencyCode)
                .map_err(|_| FormatterError::InvalidParameter {
                    formatter: NUMBER_FORMATTER.to_string(),
                    parameter: "currency".to_string(),
                    message: format!("`{code}` is not a three-letter currency code"),
                })?;
            let formatter = CurrencyFormatter::try_new(icu_locale.into(), CurrencyFormatterOptions::default())
                .map_err(|e| data_error(NUMBER_FORMATTER, locale, e))?;
            apply_fraction_digits(&mut decimal, min_digits, max_digits);
            Ok(formatter.format_fixed_decimal(&decimal, currency).to_string())
        }
    }
}

/// `dateStyle` option of `intl_format_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// Numeric, e.g. `1/15/24`
    Short,
    /// Abbreviated month
    Medium,
    /// Full month name
    Long,
    /// Full month name and weekday
    Full,
}

/// Options accepted by `intl_format_date`. Without a `dateStyle` the date
/// renders in the locale's numeric form with a four-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateFormatOptions {
    /// Requested style, if any
    pub date_style: Option<DateStyle>,
}

impl DateFormatOptions {
    /// Reads the options object of `intl_format_date`.
    ///
    /// # Errors
    /// A non-object argument or an unknown `dateStyle`.
    pub fn from_value(formatter: &str, value: &Value) -> Result<Self, FormatterError> {
        let entries = match value {
            Value::Undefined => return Ok(Self::default()),
            Value::Object(entries) => entries,
            other => return Err(invalid_options(formatter, other)),
        };

        let mut options = Self::default();
        if let Some((key, value)) = entries.iter().find(|(key, _)| key == "dateStyle") {
            options.date_style = Some(match value.as_str() {
                Some("short") => DateStyle::Short,
                Some("medium") => DateStyle::Medium,
                Some("long") => DateStyle::Long,
                Some("full") => DateStyle::Full,
                _ => return Err(invalid_option(formatter, key, value)),
            });
        }
        Ok(options)
    }

    /// CLDR field set matching the style; `full` adds the weekday.
    fn field_set(self) -> DateFieldSet {
        match self.date_style {
            None => DateFieldSet::YMD(fieldsets::YMD::short().with_year_style(YearStyle::Full)),
            Some(DateStyle::Short) => DateFieldSet::YMD(fieldsets::YMD::short()),
            Some(DateStyle::Medium) => DateFieldSet::YMD(fieldsets::YMD::medium()),
            Some(DateStyle::Long) => DateFieldSet::YMD(fieldsets::YMD::long()),
            Some(DateStyle::Full) => DateFieldSet::YMDE(fieldsets::YMDE::long()),
        }
    }
}

/// Formats a date given as an ISO-8601 string or a millisecond timestamp.
pub fn format_date(value: &Value, locale: &str, options: DateFormatOptions) -> Result<String, FormatterError> {
    let invalid_date = || FormatterError::InvalidValue {
        formatter: DATE_FORMATTER.to_string(),
        expected: "an ISO-8601 date or a millisecond timestamp",
        found: value.to_display_string(),
    };
    let naive = parse_date(value).ok_or_else(invalid_date)?;
    let month = u8::try_from(naive.month()).map_err(|_| invalid_date())?;
    let day = u8::try_from(naive.day()).map_err(|_| invalid_date())?;
    let date = Date::try_new_iso(naive.year(), month, day).map_err(|_| invalid_date())?;

    let icu_locale = parse_locale(DATE_FORMATTER, locale)?;
    let formatter = DateTimeFormatter::<DateFieldSet>::try_new(icu_locale.into(), options.field_set())
        .map_err(|e| data_error(DATE_FORMATTER, locale, e))?;
    Ok(formatter.format(&date).to_string())
}

/// Calendar date of `value` in UTC.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(ms) if ms.is_finite() && ms.fract() == 0.0 => {
            DateTime::from_timestamp_millis(*ms as i64).map(|dt| dt.date_naive())
        }
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc).date_naive())
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
                .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
                .ok()
        }
        _ => None,
    }
}
