//! Recursive-descent parser for interpolation bodies.
//!
//! ```text
//! interpolation := value alias? formatter*
//! value         := undefined | null | boolean | number | identifier | string | object | array
//! alias         := "(" identifier ")"
//! formatter     := ">" identifier ( "(" interpolation ("," interpolation)* ")" )?
//! object        := "{" ( key ":" interpolation ("," key ":" interpolation)* )? "}"
//! array         := "[" ( interpolation ("," interpolation)* )? "]"
//! ```

use super::ast::{
    Expr,
    FormatterCall,
    Interpolation,
};
use super::lexer::{
    Token,
    TokenKind,
    tokenize,
};
use super::matcher::{
    match_array,
    match_object,
};
use crate::error::TemplateError;
use crate::value::Value;

/// Parses a single interpolation body such as `price>intl_format_number({ style: 'currency' })`.
pub fn parse_interpolation(source: &str) -> Result<Interpolation, TemplateError> {
    let source = source.trim();
    let tokens = tokenize(source)?;
    let mut parser = Parser { source, tokens, pos: 0 };

    let interpolation = parser.interpolation()?;
    if let Some(token) = parser.peek() {
        return Err(parser.unexpected(token));
    }
    Ok(interpolation)
}

/// Recursive-descent parser over a token buffer.
struct Parser<'a> {
    /// Interpolation body
    source: &'a str,
    /// Every token of `source`
    tokens: Vec<Token<'a>>,
    /// Index of the next unread token
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Next token without consuming it.
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    /// Kind of the token `offset` places ahead.
    fn peek_kind_at(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    /// Consumes the next token.
    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Consumes the next token if it is of `kind`.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind_at(0) == Some(kind) {
            self.pos += 1;
            return true;
        }
        false
    }

    /// `UnknownValue` for the whole body.
    fn unknown_value(&self) -> TemplateError {
        TemplateError::UnknownValue { input: self.source.to_string() }
    }

    /// `UnexpectedToken` for `token`.
    fn unexpected(&self, token: Token<'_>) -> TemplateError {
        TemplateError::UnexpectedToken {
            token: token.text.to_string(),
            input: self.source.to_string(),
        }
    }

    /// Consumes a token of `kind`, failing with `UnknownValue` at end of
    /// input (an unclosed construct) and `UnexpectedToken` otherwise.
    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, TemplateError> {
        match self.next() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.unexpected(token)),
            None => Err(self.unknown_value()),
        }
    }

    /// `value(alias)>formatters…`
    fn interpolation(&mut self) -> Result<Interpolation, TemplateError> {
        let start = self.peek().map_or(self.source.len(), |t| t.start);

        let value = self.value()?;
        let alias = self.alias();
        let formatters = self.formatters()?;

        let end = self
            .pos
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .map_or(start, |t| t.end);
        let raw = self.source.get(start..end).unwrap_or_default().to_string();

        Ok(Interpolation { raw, value, alias, formatters })
    }

    /// Dispatches on the next token in the order
    /// undefined → null → boolean → number → identifier → string → object → array.
    fn value(&mut self) -> Result<Expr, TemplateError> {
        let Some(token) = self.next() else {
            return Err(self.unknown_value());
        };

        match token.kind {
            TokenKind::Ident => Ok(match token.text {
                "undefined" => Expr::Literal(Value::Undefined),
                "null" => Expr::Literal(Value::Null),
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                name => Expr::Variable(name.to_string()),
            }),
            TokenKind::Number => token
                .text
                .parse::<f64>()
                .map(|n| Expr::Literal(Value::Number(n)))
                .map_err(|_| self.unknown_value()),
            TokenKind::Str => Ok(Expr::Literal(Value::String(token.unquoted().to_string()))),
            TokenKind::LBrace => {
                self.ensure_balanced(token, match_object)?;
                self.object()
            }
            TokenKind::LBracket => {
                self.ensure_balanced(token, match_array)?;
                self.array()
            }
            _ => Err(self.unknown_value()),
        }
    }

    /// Checks that the construct opened by `open` closes before the input ends.
    fn ensure_balanced(
        &self,
        open: Token<'_>,
        matcher: fn(&str) -> super::matcher::MatchResult<'_>,
    ) -> Result<(), TemplateError> {
        let rest = self.source.get(open.start..).unwrap_or_default();
        match matcher(rest)? {
            Some(_) => Ok(()),
            None => Err(self.unknown_value()),
        }
    }

    /// Members after `{`, up to and including `}`.
    fn object(&mut self) -> Result<Expr, TemplateError> {
        let mut members = Vec::new();
        if self.eat(TokenKind::RBrace) {
            return Ok(Expr::Object(members));
        }
        loop {
            let key = match self.next() {
                Some(token) if matches!(token.kind, TokenKind::Ident | TokenKind::Number) => {
                    token.text.to_string()
                }
                Some(token) if token.kind == TokenKind::Str => token.unquoted().to_string(),
                Some(token) => return Err(self.unexpected(token)),
                None => return Err(self.unknown_value()),
            };
            self.expect(TokenKind::Colon)?;
            members.push((key, self.interpolation()?));

            if self.eat(TokenKind::RBrace) {
                return Ok(Expr::Object(members));
            }
            self.expect(TokenKind::Comma)?;
            // trailing comma
            if self.eat(TokenKind::RBrace) {
                return Ok(Expr::Object(members));
            }
        }
    }

    /// Items after `[`, up to and including `]`.
    fn array(&mut self) -> Result<Expr, TemplateError> {
        self.list(TokenKind::RBracket).map(Expr::Array)
    }

    /// Comma-separated interpolations up to and including `close`.
    fn list(&mut self, close: TokenKind) -> Result<Vec<Interpolation>, TemplateError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.interpolation()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(TokenKind::Comma)?;
            if self.eat(close) {
                return Ok(items);
            }
        }
    }

    /// `(identifier)` directly after the value.
    fn alias(&mut self) -> Option<String> {
        let is_alias = self.peek_kind_at(0) == Some(TokenKind::LParen)
            && self.peek_kind_at(1) == Some(TokenKind::Ident)
            && self.peek_kind_at(2) == Some(TokenKind::RParen);
        if !is_alias {
            return None;
        }
        self.pos += 1;
        let name = self.next().map(|t| t.text.to_string());
        self.pos += 1;
        name
    }

    /// Chain of `>name(args)` calls.
    fn formatters(&mut self) -> Result<Vec<FormatterCall>, TemplateError> {
        let mut formatters = Vec::new();
        while self.eat(TokenKind::Gt) {
            let name = self.expect(TokenKind::Ident)?.text.to_string();
            let args = if self.eat(TokenKind::LParen) { self.list(TokenKind::RParen)? } else { Vec::new() };
            formatters.push(FormatterCall { name, args });
        }
        Ok(formatters)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn literal(source: &str) -> Value {
        match parse_interpolation(source).unwrap().value {
            Expr::Literal(value) => value,
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[rstest]
    #[case("undefined", Value::Undefined)]
    #[case("null", Value::Null)]
    #[case("true", Value::Bool(true))]
    #[case("false", Value::Bool(false))]
    #[case("42", Value::Number(42.0))]
    #[case("-2.5", Value::Number(-2.5))]
    #[case("'text'", Value::String("text".to_string()))]
    #[case("\"it's\"", Value::String("it's".to_string()))]
    #[case("`back`", Value::String("back".to_string()))]
    fn parses_literals(#[case] source: &str, #[case] expected: Value) {
        assert_eq!(literal(source), expected);
    }

    #[googletest::test]
    fn parses_variable_with_alias_and_formatters() {
        let interpolation = parse_interpolation(" value(amount)>upper>fmt(1, other) ").unwrap();

        expect_that!(interpolation.raw.as_str(), eq("value(amount)>upper>fmt(1, other)"));
        expect_that!(interpolation.alias.as_deref(), some(eq("amount")));
        expect_that!(interpolation.formatters.len(), eq(2));
        expect_that!(interpolation.formatters[0].name.as_str(), eq("upper"));
        expect_that!(interpolation.formatters[0].args.len(), eq(0));
        expect_that!(interpolation.formatters[1].args.len(), eq(2));
        expect_that!(interpolation.formatters[1].args[1].raw.as_str(), eq("other"));
        assert_eq!(interpolation.value, Expr::Variable("value".to_string()));
    }

    #[googletest::test]
    fn parses_nested_object_and_array() {
        let interpolation =
            parse_interpolation("{ style: 'currency', 'the list': [1, x>upper], nested: { a: null } }")
                .unwrap();

        let Expr::Object(members) = interpolation.value else {
            panic!("expected object");
        };
        expect_that!(members.len(), eq(3));
        expect_that!(members[1].0.as_str(), eq("the list"));

        let Expr::Array(items) = &members[1].1.value else {
            panic!("expected array");
        };
        expect_that!(items.len(), eq(2));
        expect_that!(items[1].raw.as_str(), eq("x>upper"));
        expect_that!(items[1].formatters.len(), eq(1));
    }

    #[googletest::test]
    fn nested_formatter_arguments_are_interpolations() {
        let interpolation = parse_interpolation("a>outer(b>inner('x'), [c])").unwrap();
        let args = &interpolation.formatters[0].args;

        expect_that!(args.len(), eq(2));
        expect_that!(args[0].formatters[0].name.as_str(), eq("inner"));
        expect_that!(args[1].raw.as_str(), eq("[c]"));
    }

    #[googletest::test]
    fn parenthesis_after_formatter_name_is_argument_list_not_alias() {
        let interpolation = parse_interpolation("value>fmt(locale)").unwrap();

        expect_that!(interpolation.alias.as_deref(), none());
        expect_that!(interpolation.formatters[0].args.len(), eq(1));
    }

    #[googletest::test]
    fn empty_collections_and_trailing_commas() {
        let empty = parse_interpolation("{}").unwrap();
        let trailing = parse_interpolation("[1, 2,]").unwrap();

        assert_eq!(empty.value, Expr::Object(vec![]));
        let Expr::Array(items) = trailing.value else {
            panic!("expected array");
        };
        expect_that!(items.len(), eq(2));
    }

    #[rstest]
    #[case::unbalanced_object("{ a: 1")]
    #[case::unbalanced_array("[1, 2")]
    #[case::unclosed_arguments("value>fmt(1")]
    #[case::empty("")]
    #[case::operator_only(">fmt")]
    fn unknown_value(#[case] source: &str) {
        let result = parse_interpolation(source);

        assert!(matches!(result, Err(TemplateError::UnknownValue { .. })), "{result:?}");
    }

    #[rstest]
    #[case::trailing_identifier("value other")]
    #[case::missing_formatter_name("value>'x'")]
    #[case::bad_object_key("{ [a]: 1 }")]
    fn unexpected_token(#[case] source: &str) {
        let result = parse_interpolation(source);

        assert!(matches!(result, Err(TemplateError::UnexpectedToken { .. })), "{result:?}");
    }
}
