//! Builtin functions.
//!
//! Builtins live in a fixed table consulted after environment lookup fails,
//! so a user binding of `+` shadows the builtin. Each builtin owns its own
//! arity and type checks and reports failures as error values.

use std::{collections::HashMap, sync::LazyLock};

use crate::{env::EnvRef, eval, util::vectorize, value::Value};

pub type BuiltinFn = fn(&EnvRef, &[Value]) -> Value;

#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

pub static BUILTINS: LazyLock<HashMap<&'static str, Builtin>> = LazyLock::new(|| {
    HashMap::from([
        ("+", Builtin { name: "+", func: add }),
        ("-", Builtin { name: "-", func: subtract }),
        ("*", Builtin { name: "*", func: multiply }),
        ("/", Builtin { name: "/", func: divide }),
        ("=", Builtin { name: "=", func: equal }),
        ("/=", Builtin { name: "/=", func: not_equal }),
        ("<", Builtin { name: "<", func: less_than }),
        ("<=", Builtin { name: "<=", func: less_or_equal }),
        (">", Builtin { name: ">", func: greater_than }),
        (">=", Builtin { name: ">=", func: greater_or_equal }),
        ("apply", Builtin { name: "apply", func: apply }),
    ])
});

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name.to_lowercase().as_str())
}

fn integer_args(name: &str, args: &[Value]) -> Result<Vec<i64>, Value> {
    args.iter()
        .map(|arg| match arg {
            Value::Integer(value) => Ok(*value),
            other => Err(Value::Error(format!(
                "argument to `{name}` must be INTEGER, got {}",
                other.type_name()
            ))),
        })
        .collect()
}

fn missing_args() -> Value {
    Value::Error("wrong number of arguments. got=0, want=1".to_string())
}

fn add(_env: &EnvRef, args: &[Value]) -> Value {
    match integer_args("+", args) {
        Ok(ints) => Value::Integer(ints.iter().sum()),
        Err(err) => err,
    }
}

fn subtract(_env: &EnvRef, args: &[Value]) -> Value {
    let ints = match integer_args("-", args) {
        Ok(ints) => ints,
        Err(err) => return err,
    };
    match ints.as_slice() {
        [] => missing_args(),
        [single] => Value::Integer(-single),
        [first, rest @ ..] => Value::Integer(rest.iter().fold(*first, |diff, value| diff - value)),
    }
}

fn multiply(_env: &EnvRef, args: &[Value]) -> Value {
    match integer_args("*", args) {
        Ok(ints) => Value::Integer(ints.iter().product()),
        Err(err) => err,
    }
}

fn divide(_env: &EnvRef, args: &[Value]) -> Value {
    let ints = match integer_args("/", args) {
        Ok(ints) => ints,
        Err(err) => return err,
    };
    match ints.as_slice() {
        [] => missing_args(),
        // The unary form is the reciprocal, which truncates to zero for
        // every operand other than 1 and -1.
        [single] => {
            if *single == 0 {
                Value::Error("division by zero".to_string())
            } else {
                Value::Integer(1 / single)
            }
        }
        [first, rest @ ..] => {
            let mut quotient = *first;
            for value in rest {
                if *value == 0 {
                    return Value::Error("division by zero".to_string());
                }
                quotient /= value;
            }
            Value::Integer(quotient)
        }
    }
}

/// `=` and `/=` compare every later argument against the first one.
fn all_against_first(name: &str, args: &[Value], holds: fn(i64, i64) -> bool) -> Value {
    let ints = match integer_args(name, args) {
        Ok(ints) => ints,
        Err(err) => return err,
    };
    match ints.as_slice() {
        [] => missing_args(),
        [first, rest @ ..] => {
            if rest.iter().all(|value| holds(*first, *value)) {
                Value::True
            } else {
                Value::Nil
            }
        }
    }
}

/// Order comparisons chain adjacent pairs: `(< 1 2 3)` is `1<2` and `2<3`.
fn chain(name: &str, args: &[Value], holds: fn(i64, i64) -> bool) -> Value {
    let ints = match integer_args(name, args) {
        Ok(ints) => ints,
        Err(err) => return err,
    };
    if ints.is_empty() {
        return missing_args();
    }
    if ints.windows(2).all(|pair| holds(pair[0], pair[1])) {
        Value::True
    } else {
        Value::Nil
    }
}

fn equal(_env: &EnvRef, args: &[Value]) -> Value {
    all_against_first("=", args, |first, value| first == value)
}

fn not_equal(_env: &EnvRef, args: &[Value]) -> Value {
    all_against_first("/=", args, |first, value| first != value)
}

fn less_than(_env: &EnvRef, args: &[Value]) -> Value {
    chain("<", args, |a, b| a < b)
}

fn less_or_equal(_env: &EnvRef, args: &[Value]) -> Value {
    chain("<=", args, |a, b| a <= b)
}

fn greater_than(_env: &EnvRef, args: &[Value]) -> Value {
    chain(">", args, |a, b| a > b)
}

fn greater_or_equal(_env: &EnvRef, args: &[Value]) -> Value {
    chain(">=", args, |a, b| a >= b)
}

/// `(apply f args)` calls `f` on the elements of the quoted list `args`,
/// each evaluated in the calling environment, or on no arguments when
/// `args` is nil.
fn apply(env: &EnvRef, args: &[Value]) -> Value {
    if args.len() != 2 {
        return Value::Error(format!(
            "wrong number of arguments. got={}, want=2",
            args.len()
        ));
    }
    let arg_nodes = match &args[1] {
        Value::Nil => Vec::new(),
        Value::Quote(expr) => {
            if expr.borrow().is_nil() {
                Vec::new()
            } else {
                match vectorize(expr.clone()) {
                    Ok(nodes) => nodes,
                    Err(message) => return Value::Error(message),
                }
            }
        }
        other => {
            return Value::Error(format!(
                "second argument to `apply` must be a quoted list, got {}",
                other.type_name()
            ));
        }
    };

    let mut call_args = Vec::with_capacity(arg_nodes.len());
    for node in arg_nodes {
        let value = eval::eval(&node, env);
        if value.is_error() {
            return value;
        }
        call_args.push(value);
    }
    eval::apply_function(env, &args[0], &call_args)
}
