//! Errors surfaced by the lexer, parser, and validator.
//!
//! Evaluation itself never fails: a query that matches nothing simply
//! returns an empty node list (see [`crate::eval`]).

use thiserror::Error;

/// A failure while turning source text into a token stream.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("line {line}, col {col}: control character U+{code:04X} is not allowed in a string literal")]
    ControlCharacterInString { line: usize, col: usize, code: u32 },

    #[error("line {line}, col {col}: invalid escape sequence '\\{ch}'")]
    InvalidEscape { line: usize, col: usize, ch: char },

    #[error("line {line}, col {col}: unpaired UTF-16 surrogate in \\u escape")]
    UnpairedSurrogate { line: usize, col: usize },

    #[error("line {line}, col {col}: \\u escape must be followed by 4 hex digits")]
    InvalidUnicodeEscape { line: usize, col: usize },

    #[error("line {line}, col {col}: unterminated string literal")]
    UnterminatedString { line: usize, col: usize },

    #[error("line {line}, col {col}: unexpected character '{ch}'")]
    UnexpectedChar { line: usize, col: usize, ch: char },

    #[error("unexpected end of input while lexing")]
    UnexpectedEof,
}

/// A failure while turning a token stream into a query tree, or a static
/// check rejected after the tree was built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("JSONPath expressions must not have leading or trailing whitespace")]
    SurroundingWhitespace,

    #[error("line {line}, col {col}: unexpected token {found:?}")]
    UnexpectedToken {
        line: usize,
        col: usize,
        found: String,
    },

    #[error("parse error near the end of the expression")]
    UnexpectedEof,

    #[error("unknown named operator `{0}`")]
    UnknownNamedOperator(String),

    #[error("negative zero (-0) is not allowed as an array index")]
    NegativeZeroIndex,

    #[error("array indices must be integers, got `{0}`")]
    NonIntegerIndex(String),

    #[error("array index {0} exceeds the maximum safe integer range (2^53 - 1)")]
    IndexOutOfRange(i64),

    #[error("a slice step of an empty literal is not a valid integer")]
    InvalidSlice,

    #[error("comparisons require a singular query on both sides; `{0}` may produce more than one node")]
    NonSingularQuery(String),

    #[error("function `{name}` expects {expected} argument(s), got {got}")]
    FunctionArity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("function `{name}` does not accept a bare multi-value path for argument {index}")]
    FunctionArgumentType { name: String, index: usize },

    #[error("a bare literal cannot be the body of a filter or an operand of &&, ||, or !")]
    LiteralInBooleanPosition,
}
