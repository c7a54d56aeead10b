//! The evaluator.
//!
//! [`eval_program`] is the entry point: it runs the macro pass over the
//! program, then evaluates the remaining expressions in source order.
//! Runtime failures are [`Value::Error`] values that short-circuit; any
//! evaluation step that receives one returns it unchanged.

use std::rc::Rc;

use log::trace;

use crate::{
    builtins,
    env::{EnvRef, Environment},
    node::{Node, NodeRef, PrefixOp, Program},
    preprocess,
    symbol::SpecialForm,
    util::vectorize,
    value::{Function, Value},
};

/// Runs the macro pass (definition scan + expansion), then evaluates every
/// remaining top-level expression. Returns the last value, or the first
/// error, which also aborts the rest of the program.
pub fn eval_program(program: &mut Program, env: &EnvRef) -> Value {
    preprocess::define_macros(program, env);
    if let Err(err) = preprocess::expand_macros(program, env) {
        return Value::Error(err.to_string());
    }

    let mut result = Value::Nil;
    for expression in &program.expressions {
        result = eval(expression, env);
        if result.is_error() {
            return result;
        }
    }
    result
}

pub fn eval(node: &NodeRef, env: &EnvRef) -> Value {
    // The evaluator recurses without tail-call optimization; grow the stack
    // instead of overflowing it on deep programs.
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
        trace!("eval {}", node.borrow());
        let expression = node.borrow().clone();
        match expression {
            Node::Integer(value) => Value::Integer(value),
            Node::Nil => Value::Nil,
            Node::True => Value::True,
            Node::Symbol(name) => eval_symbol(&name, env),
            Node::Prefix { op, right } => eval_prefix(op, &right, env),
            Node::Pair(car, cdr) => eval_list(&car, &cdr, env),
            other => Value::Error(format!("unknown expression type: {other}")),
        }
    })
}

fn eval_symbol(name: &str, env: &EnvRef) -> Value {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(name) {
        return Value::Builtin(builtin);
    }
    Value::Error(format!("symbol not found: {name}"))
}

fn eval_prefix(op: PrefixOp, right: &NodeRef, env: &EnvRef) -> Value {
    let value = eval(right, env);
    if value.is_error() {
        return value;
    }
    match (op, &value) {
        (PrefixOp::Plus, Value::Integer(_)) => value,
        (PrefixOp::Minus, Value::Integer(operand)) => Value::Integer(-operand),
        (op, other) => Value::Error(format!("unknown operator: {op} {}", other.type_name())),
    }
}

/// Evaluates a cons cell: special forms dispatch on the head atom, anything
/// else is a call. The head is evaluated to a callable, the cdr chain is
/// evaluated left to right into an argument vector, and the callable is
/// applied.
fn eval_list(car: &NodeRef, cdr: &NodeRef, env: &EnvRef) -> Value {
    if let Node::SpecialForm(form) = &*car.borrow() {
        return eval_special_form(*form, cdr, env);
    }

    let function = eval(car, env);
    if function.is_error() {
        return function;
    }
    let args = match eval_args(cdr, env) {
        Ok(args) => args,
        Err(err) => return err,
    };
    apply_function(env, &function, &args)
}

fn eval_args(list: &NodeRef, env: &EnvRef) -> Result<Vec<Value>, Value> {
    let mut args = Vec::new();
    let mut rest = list.clone();
    loop {
        let next = match &*rest.borrow() {
            Node::Nil => None,
            Node::Pair(car, cdr) => Some((car.clone(), cdr.clone())),
            other => return Err(Value::Error(format!("arguments must be a list, got {other}"))),
        };
        let Some((car, cdr)) = next else {
            return Ok(args);
        };
        let value = eval(&car, env);
        if value.is_error() {
            return Err(value);
        }
        args.push(value);
        rest = cdr;
    }
}

pub fn apply_function(env: &EnvRef, function: &Value, args: &[Value]) -> Value {
    match function {
        Value::Function(function) => {
            if function.params.len() != args.len() {
                return Value::Error(format!(
                    "function expects {} arguments, but got {}",
                    function.params.len(),
                    args.len()
                ));
            }
            let call_env = Environment::new_enclosed(function.env.clone());
            for (param, arg) in function.params.iter().zip(args) {
                call_env.borrow_mut().set(param, arg.clone());
            }
            eval(&function.body, &call_env)
        }
        Value::Builtin(builtin) => (builtin.func)(env, args),
        // The symbol object returned by setq applies as whatever it binds,
        // so ((setq f (lambda (x) x)) 1) works.
        Value::Symbol { value, .. } => apply_function(env, value, args),
        other => Value::Error(format!("not a function: {}", other.type_name())),
    }
}

fn eval_special_form(form: SpecialForm, rest: &NodeRef, env: &EnvRef) -> Value {
    match form {
        SpecialForm::Quote => eval_quote(rest),
        SpecialForm::Backquote => eval_backquote(rest, env),
        SpecialForm::Unquote => {
            Value::Error("unquote is only meaningful inside backquote".to_string())
        }
        SpecialForm::Lambda => eval_lambda(rest, env),
        SpecialForm::If => eval_if(rest, env),
        SpecialForm::Setq => eval_setq(rest, env),
    }
}

/// Extracts the sole operand of a one-argument form.
fn single_operand(rest: &NodeRef) -> Result<NodeRef, Value> {
    let operands = vectorize(rest.clone()).map_err(Value::Error)?;
    match operands.as_slice() {
        [operand] => Ok(operand.clone()),
        _ => Err(Value::Error(format!(
            "wrong number of arguments. got={}, want=1",
            operands.len()
        ))),
    }
}

fn eval_quote(rest: &NodeRef) -> Value {
    match single_operand(rest) {
        Ok(expr) => Value::Quote(expr),
        Err(err) => err,
    }
}

/// `(backquote x)`: walk `x` and replace every `(unquote e)` cons by the
/// syntax projection of evaluating `e` in the current environment. The
/// template is copied first so re-evaluation (a backquote inside a closure
/// body) starts from the original syntax each time.
fn eval_backquote(rest: &NodeRef, env: &EnvRef) -> Value {
    let template = match single_operand(rest) {
        Ok(template) => template,
        Err(err) => return err,
    };
    let template: NodeRef = template.borrow().deep_copy().into();

    let is_unquote = |car: &Node| matches!(car, Node::SpecialForm(SpecialForm::Unquote));
    let mut substitute = |call: NodeRef| -> Result<NodeRef, Value> {
        let (_, operands) = call.borrow().as_pair().map_err(Value::Error)?;
        let operand = single_operand(&operands)?;
        let value = eval(&operand, env);
        if value.is_error() {
            return Err(value);
        }
        project(value)
    };

    match crate::node::modify(template, &is_unquote, &mut substitute) {
        Ok(substituted) => Value::Quote(substituted),
        Err(err) => err,
    }
}

/// Converts an unquoted value back into syntax. Only integers and quotes
/// have a syntactic image; anything else aborts the backquote.
fn project(value: Value) -> Result<NodeRef, Value> {
    match value {
        Value::Integer(value) => Ok(Node::Integer(value).into()),
        Value::Quote(expr) => Ok(expr),
        other => Err(Value::Error(format!(
            "cannot splice {} into syntax",
            other.type_name()
        ))),
    }
}

fn eval_lambda(rest: &NodeRef, env: &EnvRef) -> Value {
    let (params_node, tail) = match rest.borrow().as_pair() {
        Ok(pair) => pair,
        Err(_) => {
            return Value::Error(format!("cdr of lambda must be a cons cell, got {}", rest.borrow()));
        }
    };
    let (body, _) = match tail.borrow().as_pair() {
        Ok(pair) => pair,
        Err(_) => {
            return Value::Error(format!("cdr of lambda must be a cons cell, got {}", tail.borrow()));
        }
    };
    let params = match lambda_params(&params_node) {
        Ok(params) => params,
        Err(message) => return Value::Error(message),
    };
    Value::Function(Rc::new(Function {
        params,
        body,
        env: env.clone(),
    }))
}

fn lambda_params(node: &NodeRef) -> Result<Vec<String>, String> {
    if node.borrow().is_nil() {
        return Ok(Vec::new());
    }
    let elements =
        vectorize(node.clone()).map_err(|_| format!("parameters must be a list, got {}", node.borrow()))?;
    elements
        .iter()
        .map(|param| {
            param
                .borrow()
                .as_symbol()
                .map_err(|_| format!("parameter must be a symbol, got {}", param.borrow()))
        })
        .collect()
}

fn eval_if(rest: &NodeRef, env: &EnvRef) -> Value {
    let operands = match vectorize(rest.clone()) {
        Ok(operands) => operands,
        Err(message) => return Value::Error(message),
    };
    if operands.len() != 2 && operands.len() != 3 {
        return Value::Error(format!(
            "wrong number of arguments. got={}, want=2 or 3",
            operands.len()
        ));
    }

    let condition = eval(&operands[0], env);
    if condition.is_error() {
        return condition;
    }
    if condition.is_truthy() {
        eval(&operands[1], env)
    } else if let Some(alternative) = operands.get(2) {
        eval(alternative, env)
    } else {
        Value::Nil
    }
}

fn eval_setq(rest: &NodeRef, env: &EnvRef) -> Value {
    let operands = match vectorize(rest.clone()) {
        Ok(operands) => operands,
        Err(message) => return Value::Error(message),
    };
    if operands.len() != 2 {
        return Value::Error(format!(
            "wrong number of arguments. got={}, want=2",
            operands.len()
        ));
    }
    let name = match operands[0].borrow().as_symbol() {
        Ok(name) => name,
        Err(message) => return Value::Error(message),
    };
    let value = eval(&operands[1], env);
    if value.is_error() {
        return value;
    }
    env.borrow_mut().set(&name, value.clone());
    Value::Symbol {
        name,
        value: Box::new(value),
    }
}
