//! Rustyline helper for the REPL: tab-completion over reserved words and
//! builtin names, and a validator that keeps the editor open while parens
//! are unbalanced.

use rustyline::Context;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};

use crate::{builtins::BUILTINS, lexer::KEYWORDS, symbol::SPECIAL_FORMS};

pub struct LispHelper {
    candidates: Vec<String>,
}

impl LispHelper {
    pub fn new() -> Self {
        let mut candidates: Vec<String> = KEYWORDS
            .keys()
            .chain(SPECIAL_FORMS.keys())
            .chain(BUILTINS.keys())
            .map(|name| name.to_string())
            .collect();
        candidates.sort();
        candidates.dedup();
        LispHelper { candidates }
    }
}

impl Default for LispHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl rustyline::Helper for LispHelper {}

impl Hinter for LispHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for LispHelper {}

impl Validator for LispHelper {
    fn validate(
        &self,
        ctx: &mut ValidationContext,
    ) -> Result<ValidationResult, rustyline::error::ReadlineError> {
        let mut depth = 0i32;
        for ch in ctx.input().chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
        if depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

impl Completer for LispHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), rustyline::error::ReadlineError> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || matches!(c, '(' | '\'' | '`' | ','))
            .map_or(0, |i| i + 1);
        let word = &line[start..pos];
        let matches = self
            .candidates
            .iter()
            .filter(|candidate| candidate.starts_with(word))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate.clone(),
            })
            .collect();
        Ok((start, matches))
    }
}
