//! The template micro-language: `{# … #}` interpolations and the
//! primitives the variant specifier parser shares with them.

pub mod ast;
pub mod eval;
pub(crate) mod lexer;
pub mod matcher;
pub mod parser;
pub mod scanner;

pub use ast::{
    Expr,
    FormatterCall,
    Interpolation,
};
pub use eval::{
    find_interpolation_spans,
    interpolate,
};
pub use parser::parse_interpolation;
pub use scanner::{
    DepthScanner,
    ScanEvent,
    ScanEventKind,
};
