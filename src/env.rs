//! The environment module.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

/// A lexical environment frame: a name-to-value mapping plus an optional
/// link to the enclosing frame. Closures hold shared references upward, so
/// the chain is acyclic by construction.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<EnvRef>,
}

/// Bindings are case-insensitive: keys are folded to a canonical case.
fn env_key(name: &str) -> String {
    name.to_uppercase()
}

impl Environment {
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn new_enclosed(outer: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }))
    }

    /// Looks `name` up in this frame, then along the outer chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(&env_key(name)) {
            Some(value) => Some(value.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds `name` in this frame. Never touches the outer chain.
    pub fn set(&mut self, name: &str, value: Value) -> Value {
        self.store.insert(env_key(name), value.clone());
        value
    }
}
