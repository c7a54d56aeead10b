//! The parser module.
//!
//! Consumes tokens through a current/peek window and produces a
//! [`Program`]. Errors are accumulated rather than returned: a failed form
//! is abandoned (it yields no expression) and parsing picks up from the
//! following tokens. Callers must check [`Parser::errors`] before handing
//! the program to the evaluator.

use std::str::FromStr;

use log::debug;

use crate::{
    error::ParseError,
    lexer::{Lexer, Token, TokenKind},
    node::{Node, NodeRef, PrefixOp, Program},
    symbol::SpecialForm,
};

pub struct Parser {
    lexer: Lexer,
    cur: Token,
    peek: Token,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Parser {
        let mut parser = Parser {
            lexer,
            cur: Token::new(TokenKind::Eof, ""),
            peek: Token::new(TokenKind::Eof, ""),
            errors: Vec::new(),
        };
        // Load the cur/peek window.
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    fn record(&mut self, error: ParseError) {
        debug!("parse error: {error}");
        self.errors.push(error);
    }

    fn next_token(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn expect_cur(&mut self, kind: TokenKind) -> bool {
        if self.cur_is(kind) {
            self.next_token();
            return true;
        }
        self.record(ParseError::UnexpectedToken {
            expected: kind.to_string(),
            found: self.cur.kind.to_string(),
        });
        false
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();
        while !self.cur_is(TokenKind::Eof) {
            if let Some(expression) = self.parse_sexpression() {
                program.expressions.push(expression);
            }
        }
        program
    }

    fn parse_sexpression(&mut self) -> Option<NodeRef> {
        if self.cur_is_reader_prefix() {
            self.parse_data_mode()
        } else {
            self.parse_code_mode()
        }
    }

    /// True for the punctuation prefixes `'`, `` ` `` and `,`. The reserved
    /// spelling `quote` shares the `'` token kind but is an atom, not a
    /// reader prefix; the literal tells them apart.
    fn cur_is_reader_prefix(&self) -> bool {
        match self.cur.kind {
            TokenKind::Backquote | TokenKind::Comma => true,
            TokenKind::Quote => self.cur.literal == "'",
            _ => false,
        }
    }

    /// Desugars `'x`, `` `x `` and `,x` into `(quote x)`, `(backquote x)`
    /// and `(unquote x)` with a special-form head.
    fn parse_data_mode(&mut self) -> Option<NodeRef> {
        let form = match self.cur.kind {
            TokenKind::Quote => SpecialForm::Quote,
            TokenKind::Backquote => SpecialForm::Backquote,
            TokenKind::Comma => SpecialForm::Unquote,
            _ => unreachable!("caller checked for a reader prefix"),
        };
        self.next_token();

        let expression = self.parse_sexpression()?;
        Some(
            Node::Pair(
                Node::SpecialForm(form).into(),
                Node::Pair(expression, Node::Nil.into()).into(),
            )
            .into(),
        )
    }

    fn parse_code_mode(&mut self) -> Option<NodeRef> {
        if self.cur_is(TokenKind::LParen) {
            self.parse_list()
        } else {
            self.parse_atom()
        }
    }

    /// Parses the remainder of a parenthesized form. Empty lists become nil;
    /// `(a . b)` keeps the dotted tail; `(a b c)` builds the same tree as
    /// `(a . (b . (c . nil)))`.
    fn parse_list(&mut self) -> Option<NodeRef> {
        self.next_token();

        if self.cur_is(TokenKind::RParen) {
            self.next_token();
            return Some(Node::Nil.into());
        }

        let car = self.parse_sexpression()?;

        if self.cur_is(TokenKind::RParen) {
            self.next_token();
            return Some(Node::Pair(car, Node::Nil.into()).into());
        }

        let cons = if self.cur_is(TokenKind::Dot) {
            self.next_token();
            let cdr = self.parse_sexpression()?;
            Node::Pair(car, cdr)
        } else {
            Node::Pair(car, self.parse_continuous_sexpression()?)
        };

        if !self.expect_cur(TokenKind::RParen) {
            return None;
        }
        Some(cons.into())
    }

    fn parse_continuous_sexpression(&mut self) -> Option<NodeRef> {
        if self.cur_is(TokenKind::RParen) {
            return Some(Node::Nil.into());
        }
        let car = self.parse_sexpression()?;
        let cdr = self.parse_continuous_sexpression()?;
        Some(Node::Pair(car, cdr).into())
    }

    fn parse_atom(&mut self) -> Option<NodeRef> {
        let atom = self.parse_atom_by_kind();
        self.next_token();
        atom
    }

    fn parse_atom_by_kind(&mut self) -> Option<NodeRef> {
        match self.cur.kind {
            TokenKind::Plus | TokenKind::Minus => self.parse_prefix_atom(),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::Symbol => {
                // The spelled-out forms of the reader prefixes act as their
                // special form, so `(backquote (a (unquote b)))` means
                // exactly `(a ,b)`. Other special-form spellings never lex
                // as plain symbols; they have keyword kinds of their own.
                let atom = match SpecialForm::from_str(&self.cur.literal) {
                    Ok(form) => Node::SpecialForm(form),
                    Err(_) => Node::Symbol(self.cur.literal.clone()),
                };
                Some(atom.into())
            }
            TokenKind::Nil => Some(Node::Nil.into()),
            TokenKind::True => Some(Node::True.into()),
            TokenKind::Lambda => Some(Node::SpecialForm(SpecialForm::Lambda).into()),
            TokenKind::If => Some(Node::SpecialForm(SpecialForm::If).into()),
            TokenKind::Setq => Some(Node::SpecialForm(SpecialForm::Setq).into()),
            // Only the spelled keyword reaches here; `'` never leaves data
            // mode.
            TokenKind::Quote => Some(Node::SpecialForm(SpecialForm::Quote).into()),
            // defmacro and apply stay ordinary symbols: the first is
            // consumed by the macro definition scan, the second resolves to
            // a builtin.
            TokenKind::Defmacro | TokenKind::Apply => {
                Some(Node::Symbol(self.cur.literal.clone()).into())
            }
            TokenKind::Eof => {
                self.record(ParseError::UnexpectedEof);
                None
            }
            TokenKind::Illegal => {
                let literal = self.cur.literal.clone();
                self.record(ParseError::IllegalCharacter { literal });
                None
            }
            _ => {
                let literal = self.cur.literal.clone();
                self.record(ParseError::BadAtom { literal });
                None
            }
        }
    }

    fn parse_prefix_atom(&mut self) -> Option<NodeRef> {
        let op = if self.cur_is(TokenKind::Plus) {
            PrefixOp::Plus
        } else {
            PrefixOp::Minus
        };
        self.next_token();

        let right = self.parse_atom_by_kind()?;
        Some(Node::Prefix { op, right }.into())
    }

    fn parse_integer_literal(&mut self) -> Option<NodeRef> {
        match self.cur.literal.parse::<i64>() {
            Ok(value) => Some(Node::Integer(value).into()),
            Err(_) => {
                let literal = self.cur.literal.clone();
                self.record(ParseError::BadInteger { literal });
                None
            }
        }
    }
}
