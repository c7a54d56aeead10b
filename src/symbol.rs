//! Special forms.

use std::{collections::HashMap, fmt::Display, str::FromStr, sync::LazyLock};

pub static SPECIAL_FORMS: LazyLock<HashMap<&'static str, SpecialForm>> = LazyLock::new(|| {
    HashMap::from([
        ("quote", SpecialForm::Quote),
        ("backquote", SpecialForm::Backquote),
        ("unquote", SpecialForm::Unquote),
        ("lambda", SpecialForm::Lambda),
        ("if", SpecialForm::If),
        ("setq", SpecialForm::Setq),
    ])
});

/// A special form is a head whose arguments are not uniformly evaluated
/// before application. Special forms are their own AST variant rather than
/// symbols, so `(setq lambda 5)` binds a variable named `lambda` without
/// touching the syntax of `lambda` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    /// `(quote x)` returns `x` unevaluated. `'x` is equivalent.
    Quote,
    /// `(backquote x)` returns `x` with every `(unquote e)` inside it
    /// replaced by the value of `e`. `` `x `` is equivalent.
    Backquote,
    /// `(unquote e)` marks a substitution point inside a backquote.
    /// `,e` is equivalent. Meaningless outside a backquote.
    Unquote,
    /// `(lambda (p1 p2 ...) body)` produces a closure over the current
    /// environment.
    Lambda,
    /// `(if c then else)` evaluates `then` when `c` is not nil, `else`
    /// otherwise. The `else` branch may be omitted.
    If,
    /// `(setq name e)` binds `name` to the value of `e` in the current
    /// frame and returns the resulting symbol object.
    Setq,
}

impl FromStr for SpecialForm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SPECIAL_FORMS
            .get(value.to_lowercase().as_str())
            .copied()
            .ok_or_else(|| format!("{value} is not a special form"))
    }
}

impl Display for SpecialForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecialForm::Quote => write!(f, "quote"),
            SpecialForm::Backquote => write!(f, "backquote"),
            SpecialForm::Unquote => write!(f, "unquote"),
            SpecialForm::Lambda => write!(f, "lambda"),
            SpecialForm::If => write!(f, "if"),
            SpecialForm::Setq => write!(f, "setq"),
        }
    }
}
