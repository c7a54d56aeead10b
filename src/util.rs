//! Utility functions.

use crate::node::{Node, NodeRef};

/// Collects the elements of a proper list into a vector. A dotted tail is
/// rejected.
pub fn vectorize(list: NodeRef) -> Result<Vec<NodeRef>, String> {
    let mut elements = Vec::new();
    let mut rest = list;
    loop {
        let next = match &*rest.borrow() {
            Node::Pair(car, cdr) => {
                elements.push(car.clone());
                Some(cdr.clone())
            }
            _ => None,
        };
        match next {
            Some(cdr) => rest = cdr,
            None => break,
        }
    }
    if !rest.borrow().is_nil() {
        return Err("not a proper list".to_string());
    }
    Ok(elements)
}
