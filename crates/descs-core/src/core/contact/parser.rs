use super::ast::{ArithmeticOp, AtomRef, ComparisonOp, Expr, Term};
use super::{ExpressionError, SyntaxErrorKind};
use crate::core::models::residue::MoleculeType;
use crate::core::topology::{Capabilities, canonical_atom_name, capabilities};

const COMPARISON_TOKENS: [(&str, ComparisonOp); 5] = [
    ("<=", ComparisonOp::LessEqual),
    (">=", ComparisonOp::GreaterEqual),
    ("<", ComparisonOp::Less),
    (">", ComparisonOp::Greater),
    ("=", ComparisonOp::Equal),
];

/// Parses a contact expression into its tree.
///
/// Whitespace is insignificant and keywords and atom names are
/// case-insensitive, so the parser works on the upper-cased text with all
/// whitespace removed. Error positions index into that normalised text.
pub(crate) fn parse(text: &str, molecule_type: MoleculeType) -> Result<Expr, ExpressionError> {
    let chars: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if chars.is_empty() {
        return Err(syntax(0, SyntaxErrorKind::Empty));
    }

    let mut parser = Parser {
        chars,
        pos: 0,
        molecule_type,
        caps: capabilities(molecule_type),
    };
    let expr = parser.expr()?;
    if parser.pos < parser.chars.len() {
        return Err(syntax(parser.pos, SyntaxErrorKind::TrailingInput));
    }
    Ok(expr)
}

fn syntax(position: usize, kind: SyntaxErrorKind) -> ExpressionError {
    ExpressionError::Syntax { position, kind }
}

// How far into the input an attempt got before failing.
fn reach(err: &ExpressionError) -> usize {
    match err {
        ExpressionError::Syntax { position, .. } => *position,
        ExpressionError::UnknownAtom { .. } => usize::MAX,
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    molecule_type: MoleculeType,
    caps: &'static Capabilities,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, keyword: &str) -> bool {
        let mut offset = self.pos;
        for expected in keyword.chars() {
            if self.chars.get(offset) != Some(&expected) {
                return false;
            }
            offset += 1;
        }
        true
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.starts_with(keyword) {
            self.pos += keyword.chars().count();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ExpressionError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(syntax(self.pos, SyntaxErrorKind::Expected(expected))),
            None => Err(syntax(self.pos, SyntaxErrorKind::UnexpectedEnd)),
        }
    }

    fn unexpected(&self) -> ExpressionError {
        match self.peek() {
            Some(c) => syntax(self.pos, SyntaxErrorKind::UnexpectedChar(c)),
            None => syntax(self.pos, SyntaxErrorKind::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> Result<Expr, ExpressionError> {
        if self.eat_keyword("NOT(") {
            let inner = self.expr()?;
            self.expect(')')?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        if self.eat_keyword("AND(") {
            let (a, b) = self.binary_arguments()?;
            return Ok(Expr::And(Box::new(a), Box::new(b)));
        }
        if self.eat_keyword("OR(") {
            let (a, b) = self.binary_arguments()?;
            return Ok(Expr::Or(Box::new(a), Box::new(b)));
        }
        if self.peek() == Some('(') {
            return self.parenthesized_expr_or_comparison();
        }
        self.comparison()
    }

    fn binary_arguments(&mut self) -> Result<(Expr, Expr), ExpressionError> {
        let first = self.expr()?;
        self.expect(',')?;
        let second = self.expr()?;
        self.expect(')')?;
        Ok((first, second))
    }

    // A leading '(' opens either a grouped boolean expression or a grouped
    // arithmetic term such as `(DIST:CA;CA + 1) < 5`. Try the former first
    // and rewind on a syntax error.
    fn parenthesized_expr_or_comparison(&mut self) -> Result<Expr, ExpressionError> {
        let start = self.pos;
        self.pos += 1;
        let grouped = self.expr().and_then(|inner| {
            self.expect(')')?;
            Ok(inner)
        });
        match grouped {
            Ok(inner) => Ok(inner),
            Err(err @ ExpressionError::UnknownAtom { .. }) => Err(err),
            Err(grouped_err) => {
                self.pos = start;
                let grouped_reach = reach(&grouped_err);
                self.comparison().map_err(|comparison_err| {
                    if grouped_reach > reach(&comparison_err) {
                        grouped_err
                    } else {
                        comparison_err
                    }
                })
            }
        }
    }

    fn comparison(&mut self) -> Result<Expr, ExpressionError> {
        let left = self.term()?;
        let op = self
            .comparison_op()
            .ok_or_else(|| syntax(self.pos, SyntaxErrorKind::MissingComparison))?;
        let right = self.term()?;
        if self.comparison_op().is_some() {
            return Err(syntax(self.pos, SyntaxErrorKind::MultipleComparisons));
        }
        Ok(Expr::Comparison { op, left, right })
    }

    fn comparison_op(&mut self) -> Option<ComparisonOp> {
        COMPARISON_TOKENS
            .iter()
            .find(|(token, _)| self.starts_with(token))
            .map(|&(token, op)| {
                self.pos += token.len();
                op
            })
    }

    fn term(&mut self) -> Result<Term, ExpressionError> {
        let mut left = self.product()?;
        loop {
            let op = match self.peek() {
                Some('+') => ArithmeticOp::Add,
                Some('-') => ArithmeticOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.product()?;
            left = Term::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn product(&mut self) -> Result<Term, ExpressionError> {
        let mut left = self.factor()?;
        while self.peek() == Some('*') {
            self.pos += 1;
            let right = self.factor()?;
            left = Term::Arithmetic {
                op: ArithmeticOp::Mul,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Term, ExpressionError> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some('-') => {
                self.pos += 1;
                Ok(Term::negate(self.factor()?))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.term()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('D') if self.starts_with("DIST") => self.distance(),
            _ => Err(self.unexpected()),
        }
    }

    fn number(&mut self) -> Result<Term, ExpressionError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map(Term::Literal)
            .map_err(|_| syntax(start, SyntaxErrorKind::InvalidNumber(literal)))
    }

    fn distance(&mut self) -> Result<Term, ExpressionError> {
        if !self.eat_keyword("DISTANCE") {
            self.eat_keyword("DIST");
        }
        self.expect(':')?;
        let left = self.atom()?;
        let right = if self.peek() == Some(';') {
            self.pos += 1;
            self.atom()?
        } else {
            left.clone()
        };
        Ok(Term::Distance { left, right })
    }

    fn atom(&mut self) -> Result<AtomRef, ExpressionError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '\'' || c == '_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(syntax(start, SyntaxErrorKind::EmptyAtomName));
        }
        let token: String = self.chars[start..self.pos].iter().collect();

        if let Some(virtual_atom) = self.caps.virtual_atom(&token) {
            return Ok(AtomRef::Virtual(virtual_atom));
        }
        let name = canonical_atom_name(&token);
        if self.caps.is_known_atom(&name) {
            Ok(AtomRef::Real(name))
        } else {
            Err(ExpressionError::UnknownAtom {
                name: token,
                molecule_type: self.molecule_type,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::topology::VirtualAtom;

    fn protein(text: &str) -> Result<Expr, ExpressionError> {
        parse(text, MoleculeType::Protein)
    }

    fn syntax_kind(result: Result<Expr, ExpressionError>) -> SyntaxErrorKind {
        match result {
            Err(ExpressionError::Syntax { kind, .. }) => kind,
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    fn real(name: &str) -> AtomRef {
        AtomRef::Real(name.to_string())
    }

    #[test]
    fn parses_simple_distance_comparison() {
        let expr = protein("dist:ca;cb < 6.5").unwrap();
        assert_eq!(
            expr,
            Expr::Comparison {
                op: ComparisonOp::Less,
                left: Term::Distance {
                    left: real("CA"),
                    right: real("CB")
                },
                right: Term::Literal(6.5),
            }
        );
    }

    #[test]
    fn single_atom_distance_uses_the_same_atom_on_both_residues() {
        for text in ["DIST:CA<8", "DISTANCE:CA<8", "DISTANCE:CA;CA<8"] {
            match protein(text).unwrap() {
                Expr::Comparison {
                    left: Term::Distance { left, right },
                    ..
                } => {
                    assert_eq!(left, real("CA"));
                    assert_eq!(right, real("CA"));
                }
                other => panic!("unexpected tree {:?}", other),
            }
        }
    }

    #[test]
    fn virtual_atoms_resolve_per_molecule_type() {
        match parse("DIST:SCC;BBC <= 7", MoleculeType::Protein).unwrap() {
            Expr::Comparison {
                left: Term::Distance { left, right },
                ..
            } => {
                assert_eq!(left, AtomRef::Virtual(VirtualAtom::SideChainCentroid));
                assert_eq!(right, AtomRef::Virtual(VirtualAtom::BackboneCentroid));
            }
            other => panic!("unexpected tree {:?}", other),
        }
        assert!(matches!(
            parse("DIST:SCC;SCC<7", MoleculeType::Rna),
            Err(ExpressionError::UnknownAtom { .. })
        ));
        assert!(parse("DIST:BC;PC<7", MoleculeType::Dna).is_ok());
    }

    #[test]
    fn arithmetic_respects_precedence_and_unary_minus() {
        let expr = protein("1 + 2 * 3 - -4 = 11").unwrap();
        assert_eq!(expr.to_string(), "((1+(2*3))-(0-4))=11");
    }

    #[test]
    fn accepts_nested_boolean_operators_and_redundant_parentheses() {
        let texts = [
            "AND(DIST:CA;CA<8, OR(DIST:CB;CB<6, NOT(DIST:N;O>3.5)))",
            "((DIST:CA;CA < 8))",
            "NOT((AND((DIST:CA<8),(DIST:CB<6))))",
            "(DIST:CA;CA + 1) * 2 < 20",
            "((1 + 2)) < 5",
            "(1) < (2)",
            "1.2=1.2",
        ];
        for text in texts {
            assert!(protein(text).is_ok(), "'{}' should parse", text);
        }
    }

    #[test]
    fn rejects_bare_terms_without_comparison() {
        assert_eq!(syntax_kind(protein("DIST:CA;CA")), SyntaxErrorKind::MissingComparison);
        assert_eq!(syntax_kind(protein("3.5")), SyntaxErrorKind::MissingComparison);
    }

    #[test]
    fn rejects_wrong_boolean_arity() {
        assert!(protein("AND(DIST:CA<8)").is_err());
        assert!(protein("OR(DIST:CA<8, DIST:CB<8, DIST:N<8)").is_err());
        assert!(protein("NOT(DIST:CA<8, DIST:CB<8)").is_err());
    }

    #[test]
    fn rejects_unbalanced_parentheses_and_trailing_input() {
        assert!(protein("((DIST:CA<8)").is_err());
        assert_eq!(syntax_kind(protein("(DIST:CA<8))")), SyntaxErrorKind::TrailingInput);
        assert_eq!(syntax_kind(protein("DIST:CA<8 DIST:CB<8")), SyntaxErrorKind::TrailingInput);
    }

    #[test]
    fn rejects_chained_comparisons() {
        assert_eq!(
            syntax_kind(protein("1 < DIST:CA < 8")),
            SyntaxErrorKind::MultipleComparisons
        );
    }

    #[test]
    fn rejects_malformed_distance_syntax() {
        assert_eq!(syntax_kind(protein("DIST CA<8")), SyntaxErrorKind::Expected(':'));
        assert_eq!(syntax_kind(protein("DIST:<8")), SyntaxErrorKind::EmptyAtomName);
        assert_eq!(syntax_kind(protein("DIST:CA;<8")), SyntaxErrorKind::EmptyAtomName);
    }

    #[test]
    fn rejects_empty_input_and_bad_numbers() {
        assert_eq!(syntax_kind(protein("   ")), SyntaxErrorKind::Empty);
        assert_eq!(
            syntax_kind(protein("1.2.3 < 4")),
            SyntaxErrorKind::InvalidNumber("1.2.3".into())
        );
    }

    #[test]
    fn unknown_atoms_are_reported_with_their_token() {
        match protein("DIST:CA;XYZ < 5") {
            Err(ExpressionError::UnknownAtom { name, molecule_type }) => {
                assert_eq!(name, "XYZ");
                assert_eq!(molecule_type, MoleculeType::Protein);
            }
            other => panic!("expected UnknownAtom, got {:?}", other),
        }
    }

    #[test]
    fn nucleic_atom_names_with_primes_and_aliases_are_accepted() {
        match parse("DIST:C4';O1P < 9", MoleculeType::Rna).unwrap() {
            Expr::Comparison {
                left: Term::Distance { left, right },
                ..
            } => {
                assert_eq!(left, real("C4'"));
                assert_eq!(right, real("OP1"));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }
}
