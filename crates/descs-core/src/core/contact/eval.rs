use super::ast::{AtomRef, Expr, Term};
use super::ContactExpression;
use crate::core::models::residue::Residue;
use crate::core::topology::VirtualAtom;
use nalgebra::Point3;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    First,
    Second,
}

#[derive(Debug)]
struct MissingAtom {
    atom: String,
    residue: String,
}

/// A reusable evaluator bound to one parsed expression.
///
/// The parsed tree is borrowed and never mutated; the evaluator only owns a
/// cache of virtual-atom positions for the residue pair being evaluated, so
/// each worker thread keeps its own instance.
#[derive(Debug)]
pub struct ContactEvaluator<'e> {
    expression: &'e ContactExpression,
    virtual_cache: HashMap<(Side, VirtualAtom), Option<Point3<f64>>>,
}

impl<'e> ContactEvaluator<'e> {
    pub fn new(expression: &'e ContactExpression) -> Self {
        Self {
            expression,
            virtual_cache: HashMap::new(),
        }
    }

    /// Evaluates the predicate for the ordered pair `(first, second)`.
    ///
    /// A referenced atom absent from either residue makes the pair a
    /// non-contact.
    pub fn evaluate(&mut self, first: &Residue, second: &Residue) -> bool {
        self.virtual_cache.clear();
        let expression = self.expression;
        match self.expr(expression.root(), first, second) {
            Ok(result) => result,
            Err(missing) => {
                trace!(
                    "Atom {} missing on residue {}; treating {} / {} as no contact.",
                    missing.atom,
                    missing.residue,
                    first.label(),
                    second.label()
                );
                false
            }
        }
    }

    // AND/OR evaluate both operands: a missing atom anywhere in the tree
    // means no contact, whatever the operand order.
    fn expr(&mut self, expr: &Expr, first: &Residue, second: &Residue) -> Result<bool, MissingAtom> {
        Ok(match expr {
            Expr::Comparison { op, left, right } => {
                let l = self.term(left, first, second)?;
                let r = self.term(right, first, second)?;
                op.apply(l, r)
            }
            Expr::Not(inner) => !self.expr(inner, first, second)?,
            Expr::And(a, b) => {
                let a = self.expr(a, first, second)?;
                let b = self.expr(b, first, second)?;
                a && b
            }
            Expr::Or(a, b) => {
                let a = self.expr(a, first, second)?;
                let b = self.expr(b, first, second)?;
                a || b
            }
        })
    }

    fn term(&mut self, term: &Term, first: &Residue, second: &Residue) -> Result<f64, MissingAtom> {
        Ok(match term {
            Term::Literal(value) => *value,
            Term::Distance { left, right } => {
                let a = self.position(left, first, Side::First)?;
                let b = self.position(right, second, Side::Second)?;
                (a - b).norm()
            }
            Term::Arithmetic { op, left, right } => {
                let l = self.term(left, first, second)?;
                let r = self.term(right, first, second)?;
                op.apply(l, r)
            }
        })
    }

    fn position(
        &mut self,
        atom: &AtomRef,
        residue: &Residue,
        side: Side,
    ) -> Result<Point3<f64>, MissingAtom> {
        let position = match atom {
            AtomRef::Real(name) => residue.position(name),
            AtomRef::Virtual(virtual_atom) => {
                let caps = self.expression.capabilities();
                *self
                    .virtual_cache
                    .entry((side, *virtual_atom))
                    .or_insert_with(|| caps.virtual_position(residue, *virtual_atom))
            }
        };
        position.ok_or_else(|| MissingAtom {
            atom: atom.to_string(),
            residue: residue.label(),
        })
    }
}
