use super::comparator::DuplexMatch;
use std::fmt::Debug;

/// Decides the final verdict of a comparison from its duplex matches.
///
/// `duplexes_a` and `duplexes_b` are the number of duplexes each descriptor
/// was partitioned into; `matches` holds one record per assigned duplex pair.
pub trait SimilarityVerifier: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn is_similar(&self, matches: &[DuplexMatch], duplexes_a: usize, duplexes_b: usize) -> bool;
}

/// Similar only when both descriptors have the same number of duplexes and
/// every one of them is matched and accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllDuplexes;

impl SimilarityVerifier for AllDuplexes {
    fn name(&self) -> &'static str {
        "all-duplexes"
    }

    fn is_similar(&self, matches: &[DuplexMatch], duplexes_a: usize, duplexes_b: usize) -> bool {
        let accepted = matches.iter().filter(|m| m.accepted).count();
        duplexes_a > 0 && duplexes_a == duplexes_b && accepted == duplexes_a
    }
}

/// Similar when accepted matches cover more than `fraction` of the larger
/// descriptor's duplexes.
#[derive(Debug, Clone, Copy)]
pub struct MajorityOfDuplexes {
    pub fraction: f64,
}

impl SimilarityVerifier for MajorityOfDuplexes {
    fn name(&self) -> &'static str {
        "majority-of-duplexes"
    }

    fn is_similar(&self, matches: &[DuplexMatch], duplexes_a: usize, duplexes_b: usize) -> bool {
        let largest = duplexes_a.max(duplexes_b);
        if largest == 0 {
            return false;
        }
        let accepted = matches.iter().filter(|m| m.accepted).count();
        accepted as f64 / largest as f64 > self.fraction
    }
}

/// Configuration-level selection of a built-in verifier.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VerifierKind {
    #[default]
    AllDuplexes,
    MajorityOfDuplexes { fraction: f64 },
}

impl VerifierKind {
    pub fn into_verifier(self) -> Box<dyn SimilarityVerifier> {
        match self {
            VerifierKind::AllDuplexes => Box::new(AllDuplexes),
            VerifierKind::MajorityOfDuplexes { fraction } => Box::new(MajorityOfDuplexes { fraction }),
        }
    }
}
