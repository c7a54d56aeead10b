//! A tree-walking interpreter for a small Lisp dialect modeled on the core
//! of Common Lisp.
//!
//! A source text is lexed and parsed into a cons-cell tree rooted at a
//! [`Program`], then evaluated in two passes: macro definitions are scanned
//! out and every macro call is expanded, and the remaining expressions are
//! evaluated in source order against a lexically scoped environment.
//!
//! ```
//! use sigil::{Environment, eval, parse};
//!
//! let (mut program, errors) = parse("(+ 1 2)");
//! assert!(errors.is_empty());
//! let env = Environment::new();
//! assert_eq!(eval::eval_program(&mut program, &env).to_string(), "3");
//! ```

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod preprocess;
pub mod repl_complete;
pub mod symbol;
pub mod util;
pub mod value;

pub use env::{EnvRef, Environment};
pub use error::{ExpandError, ParseError};
pub use node::{Node, NodeRef, Program};
pub use value::Value;

use crate::{lexer::Lexer, parser::Parser};

/// Lexes and parses `input`. The returned program is only meaningful when
/// the error list is empty; callers must check before evaluating.
pub fn parse(input: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    let errors = parser.errors().to_vec();
    (program, errors)
}
