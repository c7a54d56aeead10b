//! The cons-cell AST.
//!
//! Every parsed form is a [`Node`]; the only composite variant is
//! [`Node::Pair`]. Proper lists are `Pair` chains terminated by
//! [`Node::Nil`]; dotted tails simply carry something else in the `cdr`.

use std::{
    cell::RefCell,
    fmt::{self, Display},
    rc::Rc,
};

use crate::symbol::SpecialForm;

pub type NodeRef = Rc<RefCell<Node>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Integer literal, e.g. `42`.
    Integer(i64),
    /// Ordinary identifier. Spelling is preserved; environment lookup
    /// case-folds.
    Symbol(String),
    /// Syntactic head that is not an identifier; see [`SpecialForm`].
    SpecialForm(SpecialForm),
    /// A sign bound to the atom that follows, e.g. `-5`. Not a call.
    Prefix { op: PrefixOp, right: NodeRef },
    /// The empty list, and the false value.
    Nil,
    /// The truth constant `t`.
    True,
    /// A cons cell.
    Pair(NodeRef, NodeRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Plus,
    Minus,
}

impl Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Plus => write!(f, "+"),
            PrefixOp::Minus => write!(f, "-"),
        }
    }
}

impl Node {
    pub fn as_pair(&self) -> Result<(NodeRef, NodeRef), String> {
        match self {
            Node::Pair(car, cdr) => Ok((car.clone(), cdr.clone())),
            _ => Err(format!("{self} is not a pair")),
        }
    }

    pub fn as_symbol(&self) -> Result<String, String> {
        match self {
            Node::Symbol(name) => Ok(name.clone()),
            _ => Err(format!("{self} is not a symbol")),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Node::Nil)
    }

    /// Structural copy. Substitution passes copy before they mutate, so a
    /// template inside a closure body survives repeated evaluation intact.
    pub fn deep_copy(&self) -> Node {
        match self {
            Node::Pair(car, cdr) => Node::Pair(
                car.borrow().deep_copy().into(),
                cdr.borrow().deep_copy().into(),
            ),
            Node::Prefix { op, right } => Node::Prefix {
                op: *op,
                right: right.borrow().deep_copy().into(),
            },
            _ => self.clone(),
        }
    }
}

impl From<Node> for NodeRef {
    fn from(value: Node) -> Self {
        Rc::new(RefCell::new(value))
    }
}

impl<T> FromIterator<T> for Node
where
    T: Into<NodeRef>,
{
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        let items: Vec<_> = iter.into_iter().collect();
        let mut list = Node::Nil;
        for item in items.into_iter().rev() {
            list = Node::Pair(item.into(), list.into());
        }
        list
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Integer(value) => write!(f, "{value}"),
            Node::Symbol(name) => write!(f, "{name}"),
            Node::SpecialForm(form) => write!(f, "{form}"),
            Node::Prefix { op, right } => write!(f, "{op}{}", right.borrow()),
            Node::Nil => write!(f, "nil"),
            Node::True => write!(f, "t"),
            Node::Pair(car, cdr) => {
                write!(f, "({}", car.borrow())?;
                let mut rest = cdr.clone();
                loop {
                    let next = match &*rest.borrow() {
                        Node::Nil => None,
                        Node::Pair(car, cdr) => {
                            write!(f, " {}", car.borrow())?;
                            Some(cdr.clone())
                        }
                        tail => {
                            write!(f, " . {tail}")?;
                            None
                        }
                    };
                    match next {
                        Some(cdr) => rest = cdr,
                        None => break,
                    }
                }
                write!(f, ")")
            }
        }
    }
}

/// The root of a parsed source text. Expressions keep their source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub expressions: Vec<NodeRef>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            expressions: Vec::new(),
        }
    }

    /// Runs [`modify`] over every top-level expression, in order, rebinding
    /// each root with the walker's result.
    pub fn modify<P, T, E>(&mut self, predicate: &P, transform: &mut T) -> Result<(), E>
    where
        P: Fn(&Node) -> bool,
        T: FnMut(NodeRef) -> Result<NodeRef, E>,
    {
        for slot in self.expressions.iter_mut() {
            *slot = modify(slot.clone(), predicate, transform)?;
        }
        Ok(())
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, expression) in self.expressions.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", expression.borrow())?;
        }
        Ok(())
    }
}

/// Generic rewriting traversal.
///
/// Descends `car` then `cdr`; a cons whose `car` satisfies `predicate` is
/// replaced wholesale by `transform(cons)` and not descended further.
/// Non-cons nodes terminate the recursion. Rewrites happen in place; the
/// returned ref is the (possibly replaced) root for the caller to rebind.
pub fn modify<P, T, E>(node: NodeRef, predicate: &P, transform: &mut T) -> Result<NodeRef, E>
where
    P: Fn(&Node) -> bool,
    T: FnMut(NodeRef) -> Result<NodeRef, E>,
{
    let children = match &*node.borrow() {
        Node::Pair(car, cdr) => Some((car.clone(), cdr.clone())),
        _ => None,
    };
    let Some((car, cdr)) = children else {
        return Ok(node);
    };

    if predicate(&car.borrow()) {
        return transform(node);
    }

    let car = modify(car, predicate, transform)?;
    let cdr = modify(cdr, predicate, transform)?;
    if let Node::Pair(car_slot, cdr_slot) = &mut *node.borrow_mut() {
        *car_slot = car;
        *cdr_slot = cdr;
    }
    Ok(node)
}
