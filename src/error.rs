//! Error types for the non-value error channels.
//!
//! Runtime errors travel as [`crate::value::Value::Error`](crate::value::Value)
//! and never appear here. The parser accumulates [`ParseError`]s; the macro
//! expansion pass aborts with an [`ExpandError`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected token to be {expected}, got {found} instead")]
    UnexpectedToken { expected: String, found: String },
    #[error("could not parse {literal:?} as an atom")]
    BadAtom { literal: String },
    #[error("could not parse {literal:?} as an integer")]
    BadInteger { literal: String },
    #[error("illegal character {literal:?}")]
    IllegalCharacter { literal: String },
    #[error("unexpected end of input")]
    UnexpectedEof,
}

impl ParseError {
    /// True when the input simply stopped short. The REPL uses this to keep
    /// buffering instead of reporting the form as broken.
    pub fn is_eof(&self) -> bool {
        matches!(self, ParseError::UnexpectedEof)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("macros must return AST nodes")]
    NotQuote,
    #[error("macro {name} expects {expected} arguments, got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("macro expansion failed: {0}")]
    Failed(String),
}
