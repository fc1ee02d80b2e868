//! Syntax tree of a parsed interpolation.
//!
//! The tree is built from text and owns all of its children, so it is
//! acyclic by construction.

use crate::value::Value;

/// `value(alias)>formatter(args)…`
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    /// Source text this node was parsed from
    pub raw: String,
    /// Value before formatters
    pub value: Expr,
    /// Overrides the property name a variable is looked up under
    pub alias: Option<String>,
    /// Applied left to right
    pub formatters: Vec<FormatterCall>,
}

/// Value position of an interpolation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `undefined`, `null`, booleans, numbers and quoted strings
    Literal(Value),
    /// Identifier resolved against the caller's properties
    Variable(String),
    /// `{ key: interpolation, … }`
    Object(Vec<(String, Interpolation)>),
    /// `[interpolation, …]`
    Array(Vec<Interpolation>),
}

/// `>name(arg, …)`
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterCall {
    /// Registry name
    pub name: String,
    /// Arguments, evaluated before the call
    pub args: Vec<Interpolation>,
}

impl Interpolation {
    /// Whether the node is a bare literal with no alias and no formatters.
    #[must_use]
    pub fn as_plain_literal(&self) -> Option<&Value> {
        match &self.value {
            Expr::Literal(value) if self.alias.is_none() && self.formatters.is_empty() => {
                Some(value)
            }
            _ => None,
        }
    }
}
