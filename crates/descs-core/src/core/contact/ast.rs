use crate::core::topology::VirtualAtom;
use std::fmt;

/// Absolute tolerance used by every comparison operator.
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Less,
    LessEqual,
    Equal,
    GreaterEqual,
    Greater,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Less => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::Equal => "=",
            ComparisonOp::GreaterEqual => ">=",
            ComparisonOp::Greater => ">",
        }
    }

    /// Compares two values with [`EPSILON`] tolerance: values closer than
    /// the tolerance are equal and therefore neither less nor greater.
    pub fn apply(self, left: f64, right: f64) -> bool {
        let equal = (left - right).abs() <= EPSILON;
        match self {
            ComparisonOp::Less => left < right && !equal,
            ComparisonOp::LessEqual => left < right || equal,
            ComparisonOp::Equal => equal,
            ComparisonOp::GreaterEqual => left > right || equal,
            ComparisonOp::Greater => left > right && !equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
}

impl ArithmeticOp {
    pub fn symbol(self) -> char {
        match self {
            ArithmeticOp::Add => '+',
            ArithmeticOp::Sub => '-',
            ArithmeticOp::Mul => '*',
        }
    }

    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            ArithmeticOp::Add => left + right,
            ArithmeticOp::Sub => left - right,
            ArithmeticOp::Mul => left * right,
        }
    }
}

/// An atom named in a distance term, resolved against the molecule type at
/// parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomRef {
    Real(String),
    Virtual(VirtualAtom),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Literal(f64),
    /// Distance between `left` on the first residue and `right` on the second.
    Distance { left: AtomRef, right: AtomRef },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Term>,
        right: Box<Term>,
    },
}

impl Term {
    /// Unary minus, represented as `0 - term`.
    pub fn negate(term: Term) -> Term {
        Term::Arithmetic {
            op: ArithmeticOp::Sub,
            left: Box::new(Term::Literal(0.0)),
            right: Box::new(term),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Comparison {
        op: ComparisonOp,
        left: Term,
        right: Term,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl fmt::Display for AtomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomRef::Real(name) => f.write_str(name),
            AtomRef::Virtual(atom) => write!(f, "{}", atom),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(value) => write!(f, "{}", value),
            Term::Distance { left, right } => write!(f, "DIST:{};{}", left, right),
            Term::Arithmetic { op, left, right } => {
                write!(f, "({}{}{})", left, op.symbol(), right)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Comparison { op, left, right } => {
                write!(f, "{}{}{}", left, op.symbol(), right)
            }
            Expr::Not(inner) => write!(f, "NOT({})", inner),
            Expr::And(a, b) => write!(f, "AND({},{})", a, b),
            Expr::Or(a, b) => write!(f, "OR({},{})", a, b),
        }
    }
}
