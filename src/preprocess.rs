//! The macro pass.
//!
//! Runs between parsing and evaluation. Top-level `(defmacro ...)` forms are
//! extracted into the environment and deleted from the program; the
//! remaining tree is then rewritten by replacing every call whose head names
//! a macro with the expansion its body produces. Expansion happens once,
//! before any evaluation, so rebinding a macro's name later cannot change
//! already-expanded call sites.

use std::rc::Rc;

use log::debug;

use crate::{
    env::{EnvRef, Environment},
    error::ExpandError,
    eval,
    node::{Node, NodeRef, Program},
    util::vectorize,
    value::{Macro, Value},
};

/// Scans the top-level expressions for `(defmacro name (params) body)`
/// forms, binds each macro in `env`, and removes the forms from the
/// program. Malformed definitions are dropped without binding anything.
pub fn define_macros(program: &mut Program, env: &EnvRef) {
    let mut definitions = Vec::new();
    for (index, expression) in program.expressions.iter().enumerate() {
        if is_macro_definition(expression) {
            add_macro(expression, env);
            definitions.push(index);
        }
    }
    // Delete back to front so the remaining indices stay valid.
    for index in definitions.into_iter().rev() {
        program.expressions.remove(index);
    }
}

fn is_macro_definition(expression: &NodeRef) -> bool {
    match &*expression.borrow() {
        Node::Pair(car, _) => {
            matches!(&*car.borrow(), Node::Symbol(name) if name.eq_ignore_ascii_case("defmacro"))
        }
        _ => false,
    }
}

fn add_macro(expression: &NodeRef, env: &EnvRef) {
    let Some((name, params, body)) = macro_parts(expression) else {
        debug!("skipping malformed defmacro: {}", expression.borrow());
        return;
    };
    debug!("defining macro {name}");
    let definition = Value::Macro(Rc::new(Macro {
        params,
        body,
        env: env.clone(),
    }));
    env.borrow_mut().set(&name, definition);
}

/// Pulls name, parameter names and body out of a
/// `(defmacro name (params...) body)` form.
fn macro_parts(expression: &NodeRef) -> Option<(String, Vec<String>, NodeRef)> {
    let operands = vectorize(expression.clone()).ok()?;
    let [_, name, params, body] = operands.as_slice() else {
        return None;
    };
    let name = name.borrow().as_symbol().ok()?;
    let params = if params.borrow().is_nil() {
        Vec::new()
    } else {
        vectorize(params.clone())
            .ok()?
            .iter()
            .map(|param| param.borrow().as_symbol().ok())
            .collect::<Option<Vec<_>>>()?
    };
    Some((name, params, body.clone()))
}

/// Rewrites every macro call in the program with its expansion. A call head
/// counts as a macro when the environment binds that symbol to a macro
/// value.
pub fn expand_macros(program: &mut Program, env: &EnvRef) -> Result<(), ExpandError> {
    let is_macro_call = |car: &Node| match car {
        Node::Symbol(name) => matches!(env.borrow().get(name), Some(Value::Macro(_))),
        _ => false,
    };
    let mut expand = |call: NodeRef| expand_call(call, env);
    program.modify(&is_macro_call, &mut expand)
}

fn expand_call(call: NodeRef, env: &EnvRef) -> Result<NodeRef, ExpandError> {
    let (car, cdr) = call.borrow().as_pair().map_err(ExpandError::Failed)?;
    let name = car.borrow().as_symbol().map_err(ExpandError::Failed)?;
    let Some(Value::Macro(definition)) = env.borrow().get(&name) else {
        return Err(ExpandError::Failed(format!("{name} is not a macro")));
    };

    // Arguments are passed unevaluated, each wrapped as a quote.
    let args = quote_args(&cdr);
    if args.len() != definition.params.len() {
        return Err(ExpandError::Arity {
            name,
            expected: definition.params.len(),
            found: args.len(),
        });
    }

    debug!("expanding macro {name}");
    let call_env = Environment::new_enclosed(definition.env.clone());
    for (param, arg) in definition.params.iter().zip(args) {
        call_env.borrow_mut().set(param, arg);
    }

    match eval::eval(&definition.body, &call_env) {
        Value::Quote(expansion) => Ok(expansion.borrow().deep_copy().into()),
        Value::Error(message) => Err(ExpandError::Failed(message)),
        _ => Err(ExpandError::NotQuote),
    }
}

fn quote_args(list: &NodeRef) -> Vec<Value> {
    let mut args = Vec::new();
    let mut rest = list.clone();
    loop {
        let next = match &*rest.borrow() {
            Node::Pair(car, cdr) => {
                args.push(Value::Quote(car.clone()));
                Some(cdr.clone())
            }
            _ => None,
        };
        match next {
            Some(cdr) => rest = cdr,
            None => break,
        }
    }
    args
}
