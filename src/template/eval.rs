//! Evaluation of parsed interpolations and expansion of `{# … #}` spans.

use std::ops::Range;

use super::ast::{
    Expr,
    Interpolation,
};
use super::parser::parse_interpolation;
use crate::error::{
    FormatterError,
    TranslationError,
};
use crate::formatter::FormatterRegistry;
use crate::value::{
    Properties,
    Value,
};

/// Opens an interpolation span
const OPEN: &str = "{#";
/// Closes an interpolation span
const CLOSE: &str = "#}";

impl Interpolation {
    /// Evaluates the node against `properties`.
    ///
    /// A formatter that is not registered collapses the whole interpolation
    /// to `undefined`. Errors raised by a formatter itself propagate.
    pub fn evaluate(&self, properties: &Properties, formatters: &FormatterRegistry) -> Result<Value, FormatterError> {
        let mut value = match &self.value {
            Expr::Literal(value) => value.clone(),
            Expr::Variable(name) => {
                let key = self.alias.as_deref().unwrap_or(name);
                properties.get(key).cloned().unwrap_or_default()
            }
            Expr::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(key, member)| Ok((key.clone(), member.evaluate(properties, formatters)?)))
                    .collect::<Result<_, FormatterError>>()?,
            ),
            Expr::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.evaluate(properties, formatters))
                    .collect::<Result<_, _>>()?,
            ),
        };

        for call in &self.formatters {
            let Some(formatter) = formatters.find(&call.name) else {
                tracing::warn!(formatter = %call.name, interpolation = %self.raw, "Formatter not registered");
                return Ok(Value::Undefined);
            };
            let args = call
                .args
                .iter()
                .map(|arg| arg.evaluate(properties, formatters))
                .collect::<Result<Vec<_>, _>>()?;
            value = formatter.format(&value, &args)?;
        }

        Ok(value)
    }
}

/// Byte ranges of every non-overlapping `{# … #}` span, in order.
///
/// A span closes at the first `#}` after a non-empty body; bodies do not
/// cross line breaks and spans do not nest.
#[must_use]
pub fn find_interpolation_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text.get(cursor..).and_then(|rest| rest.find(OPEN)) {
        let start = cursor + offset;
        let body_start = start + OPEN.len();
        let line_end = text
            .get(body_start..)
            .and_then(|rest| rest.find('\n'))
            .map_or(text.len(), |i| body_start + i);

        let line = text.get(body_start..line_end).unwrap_or_default();

        // the body holds at least one character
        let close = line
            .char_indices()
            .nth(1)
            .and_then(|(skip, _)| line.get(skip..)?.find(CLOSE).map(|i| skip + i));

        match close {
            Some(body_len) => {
                let end = body_start + body_len + CLOSE.len();
                spans.push(start..end);
                cursor = end;
            }
            None => cursor = start + 1,
        }
    }

    spans
}

/// Expands every `{# … #}` span of `text`.
///
/// Each span is parsed and evaluated on its own; the results are rendered
/// with [`Value::to_display_string`] and spliced back to front so earlier
/// ranges stay valid.
pub fn interpolate(
    text: &str,
    properties: &Properties,
    formatters: &FormatterRegistry,
) -> Result<String, TranslationError> {
    let spans = find_interpolation_spans(text);
    if spans.is_empty() {
        return Ok(text.to_string());
    }

    let mut output = text.to_string();
    for span in spans.into_iter().rev() {
        let body = text
            .get(span.start + OPEN.len()..span.end - CLOSE.len())
            .unwrap_or_default();
        let rendered = parse_interpolation(body)?.evaluate(properties, formatters)?.to_display_string();
        output.replace_range(span, &rendered);
    }
    Ok(output)
}
