//! Tokenizer for interpolation bodies.

use super::matcher::{
    match_number,
    match_string,
    match_variable,
};
use crate::error::TemplateError;

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Identifier, including the `undefined`/`null`/`true`/`false` keywords
    Ident,
    /// Numeric literal
    Number,
    /// Quoted string; `text` keeps the quotes
    Str,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `>`
    Gt,
}

/// A token borrowing its text from the interpolation body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    /// Category
    pub(crate) kind: TokenKind,
    /// Source text
    pub(crate) text: &'a str,
    /// Byte offset of the first character
    pub(crate) start: usize,
    /// Byte offset past the last character
    pub(crate) end: usize,
}

impl Token<'_> {
    /// String literal content without its quotes.
    pub(crate) fn unquoted(&self) -> &str {
        let mut chars = self.text.chars();
        chars.next();
        chars.next_back();
        chars.as_str()
    }
}

/// Single-character token kind of `ch`.
const fn punctuation(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        ',' => TokenKind::Comma,
        ':' => TokenKind::Colon,
        '>' => TokenKind::Gt,
        _ => return None,
    };
    Some(kind)
}

/// Splits `source` into tokens, skipping whitespace between them.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(rest) = source.get(pos..) {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        pos += rest.len() - trimmed.len();

        let Some(first) = trimmed.chars().next() else {
            break;
        };

        let (kind, len) = if let Some(kind) = punctuation(first) {
            (kind, first.len_utf8())
        } else if let Some(matched) = match_number(trimmed)? {
            (TokenKind::Number, matched.end())
        } else if let Some(matched) = match_variable(trimmed)? {
            (TokenKind::Ident, matched.end())
        } else if let Some(matched) = match_string(trimmed)? {
            (TokenKind::Str, matched.end())
        } else if matches!(first, '\'' | '"' | '`') {
            return Err(TemplateError::UnterminatedString { input: source.to_string() });
        } else {
            return Err(TemplateError::UnknownValue { input: source.to_string() });
        };

        let end = pos + len;
        tokens.push(Token { kind, text: source.get(pos..end).unwrap_or_default(), start: pos, end });
        pos = end;
    }

    Ok(tokens)
}
