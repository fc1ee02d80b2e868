//! Primitive matchers.
//!
//! Each matcher recognizes one kind of value at the very start of its input
//! and reports the consumed range plus captures. Matchers never skip
//! whitespace: input must be trimmed by the caller, otherwise
//! [`TemplateError::UntrimmedString`] is returned.

use std::ops::Range;

use super::scanner::{
    DepthScanner,
    ScanEventKind,
};
use crate::error::TemplateError;

/// A successful match.
///
/// `captures[0]` is always the whole consumed substring; further captures
/// depend on the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched<'a> {
    /// Consumed bytes, always starting at 0
    pub range: Range<usize>,
    /// Whole match followed by matcher-specific groups
    pub captures: Vec<&'a str>,
}

impl<'a> Matched<'a> {
    /// A match of the first `end` bytes with no extra captures.
    fn whole(input: &'a str, end: usize) -> Self {
        Self { range: 0..end, captures: vec![input.get(..end).unwrap_or_default()] }
    }

    /// The consumed substring.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.captures.first().copied().unwrap_or_default()
    }

    /// Byte offset just past the match.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.range.end
    }
}

/// `Ok(None)` when the input does not start with the matcher's kind.
pub type MatchResult<'a> = Result<Option<Matched<'a>>, TemplateError>;

/// Rejects input with leading whitespace.
fn ensure_trimmed(input: &str) -> Result<(), TemplateError> {
    if input.starts_with(char::is_whitespace) {
        return Err(TemplateError::UntrimmedString { input: input.to_string() });
    }
    Ok(())
}

/// ASCII letter, `_` or `$`.
pub(crate) const fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

/// Identifier start character or ASCII digit.
pub(crate) const fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Matches `keyword` when it is not immediately followed by an identifier character.
fn match_keyword<'a>(input: &'a str, keyword: &str) -> MatchResult<'a> {
    ensure_trimmed(input)?;
    let Some(rest) = input.strip_prefix(keyword) else {
        return Ok(None);
    };
    if rest.starts_with(is_identifier_char) {
        return Ok(None);
    }
    Ok(Some(Matched::whole(input, keyword.len())))
}

/// Matches the `undefined` keyword.
pub fn match_undefined(input: &str) -> MatchResult<'_> {
    match_keyword(input, "undefined")
}

/// Matches the `null` keyword.
pub fn match_null(input: &str) -> MatchResult<'_> {
    match_keyword(input, "null")
}

/// Matches `true` or `false`.
pub fn match_boolean(input: &str) -> MatchResult<'_> {
    if let Some(matched) = match_keyword(input, "true")? {
        return Ok(Some(matched));
    }
    match_keyword(input, "false")
}

/// Matches `-?\d+(\.\d+)?`.
///
/// Captures: `[whole, integer part, fraction digits]`, the last one empty
/// when there is no fraction.
pub fn match_number(input: &str) -> MatchResult<'_> {
    ensure_trimmed(input)?;
    let bytes = input.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == digits_start {
        return Ok(None);
    }
    let integer_end = end;

    let mut fraction = "";
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        let fraction_start = end + 1;
        end = fraction_start;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        fraction = input.get(fraction_start..end).unwrap_or_default();
    }

    let mut matched = Matched::whole(input, end);
    matched.captures.push(input.get(..integer_end).unwrap_or_default());
    matched.captures.push(fraction);
    Ok(Some(matched))
}

/// Matches an identifier `[A-Za-z_$][\w$]*`.
pub fn match_variable(input: &str) -> MatchResult<'_> {
    ensure_trimmed(input)?;
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, ch)) if is_identifier_start(ch) => {}
        _ => return Ok(None),
    }
    let end = chars.find(|(_, ch)| !is_identifier_char(*ch)).map_or(input.len(), |(i, _)| i);
    Ok(Some(Matched::whole(input, end)))
}

/// Matches a `'…'`, `"…"` or `` `…` `` string literal.
///
/// The first occurrence of the opening quote terminates the string; there
/// is no escape processing. Captures: `[whole, quote, content]`.
pub fn match_string(input: &str) -> MatchResult<'_> {
    ensure_trimmed(input)?;
    let Some(quote) = input.chars().next().filter(|c| matches!(c, '\'' | '"' | '`')) else {
        return Ok(None);
    };
    let body_start = quote.len_utf8();
    let Some(body_len) = input.get(body_start..).and_then(|body| body.find(quote)) else {
        return Ok(None);
    };
    let body_end = body_start + body_len;
    let mut matched = Matched::whole(input, body_end + quote.len_utf8());
    matched.captures.push(input.get(..body_start).unwrap_or_default());
    matched.captures.push(input.get(body_start..body_end).unwrap_or_default());
    Ok(Some(matched))
}

/// Matches a balanced collection starting with `open`.
fn match_balanced(input: &str, open: char) -> MatchResult<'_> {
    ensure_trimmed(input)?;
    if !input.starts_with(open) {
        return Ok(None);
    }
    let close = DepthScanner::new(input)
        .find(|event| event.kind == ScanEventKind::Close && event.depth == 0)
        .map(|event| event.index + event.ch.len_utf8());
    let Some(end) = close else {
        return Ok(None);
    };
    let mut matched = Matched::whole(input, end);
    matched.captures.push(input.get(1..end - 1).unwrap_or_default());
    Ok(Some(matched))
}

/// Matches a balanced `{…}` object literal. Captures: `[whole, inner]`.
pub fn match_object(input: &str) -> MatchResult<'_> {
    match_balanced(input, '{')
}

/// Matches a balanced `[…]` array literal. Captures: `[whole, inner]`.
pub fn match_array(input: &str) -> MatchResult<'_> {
    match_balanced(input, '[')
}
