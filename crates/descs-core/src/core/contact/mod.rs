//! # Contact Expression Module
//!
//! A small predicate language declaring, at runtime, when two residues are
//! "in contact".
//!
//! ## Overview
//!
//! Expressions compare arithmetic combinations of inter-residue distances
//! against each other or against numeric literals, and combine comparisons
//! with `NOT`, `AND` and `OR`:
//!
//! ```text
//! AND(DIST:CA;CA < 8.0, OR(DISTANCE:SCC <= 6.5, DIST:N;O < 3.5))
//! ```
//!
//! `DIST:X;Y` is the distance between atom `X` of the first residue and atom
//! `Y` of the second; `DIST:X` is shorthand for `DIST:X;X`. Atom names are the
//! real atom names of the molecule type or its virtual atoms (see
//! [`crate::core::topology::VirtualAtom`]). Keywords and atom names are
//! case-insensitive and whitespace is ignored.
//!
//! An expression is parsed once into an immutable tree that is shared
//! read-only between threads; [`ContactEvaluator`] instances carry the small
//! amount of per-evaluation state.

mod ast;
mod eval;
mod parser;

pub use ast::{ArithmeticOp, AtomRef, ComparisonOp, EPSILON, Expr, Term};
pub use eval::ContactEvaluator;

use crate::core::models::residue::{MoleculeType, Residue};
use crate::core::topology::{Capabilities, capabilities};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SyntaxErrorKind {
    #[error("the expression is empty")]
    Empty,
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("expected '{0}'")]
    Expected(char),
    #[error("a comparison operator is required")]
    MissingComparison,
    #[error("only one comparison operator is allowed per comparison")]
    MultipleComparisons,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("empty atom name")]
    EmptyAtomName,
    #[error("unexpected input after the end of the expression")]
    TrailingInput,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ExpressionError {
    #[error("Syntax error at position {position}: {kind}")]
    Syntax {
        position: usize,
        kind: SyntaxErrorKind,
    },
    #[error("Unknown atom '{name}' for molecule type {molecule_type}")]
    UnknownAtom {
        name: String,
        molecule_type: MoleculeType,
    },
}

/// A parsed contact predicate for one molecule type.
///
/// Cloning is cheap: clones share the same parsed tree.
#[derive(Debug, Clone)]
pub struct ContactExpression {
    text: String,
    molecule_type: MoleculeType,
    root: Arc<Expr>,
}

impl ContactExpression {
    pub fn parse(text: &str, molecule_type: MoleculeType) -> Result<Self, ExpressionError> {
        let root = parser::parse(text, molecule_type)?;
        Ok(Self {
            text: text.trim().to_string(),
            molecule_type,
            root: Arc::new(root),
        })
    }

    /// Checks an expression without keeping it.
    ///
    /// # Return
    ///
    /// `Ok(true)` for a well-formed expression and `Ok(false)` for a syntax
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::UnknownAtom`] when the expression names an atom
    /// the molecule type does not know.
    pub fn validate(text: &str, molecule_type: MoleculeType) -> Result<bool, ExpressionError> {
        match parser::parse(text, molecule_type) {
            Ok(_) => Ok(true),
            Err(ExpressionError::Syntax { position, kind }) => {
                debug!("Expression '{}' is not valid at position {}: {}", text, position, kind);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Evaluates the predicate for one residue pair.
    ///
    /// Convenience wrapper creating a throw-away [`ContactEvaluator`]; hot loops
    /// should keep an evaluator per thread instead.
    pub fn evaluate(&self, first: &Residue, second: &Residue) -> bool {
        self.evaluator().evaluate(first, second)
    }

    pub fn evaluator(&self) -> ContactEvaluator<'_> {
        ContactEvaluator::new(self)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn molecule_type(&self) -> MoleculeType {
        self.molecule_type
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    pub(crate) fn capabilities(&self) -> &'static Capabilities {
        capabilities(self.molecule_type)
    }
}

impl fmt::Display for ContactExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
