use super::assignment;
use super::config::CompareConfig;
use super::descriptor::Descriptor;
use super::error::EngineError;
use super::verifier::SimilarityVerifier;
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::{MIN_SUPERPOSITION_POINTS, Superposition};
use itertools::Itertools;
use nalgebra::{DMatrix, Point3};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Assignment cost of a duplex pair that cannot be superposed.
pub const INCOMPATIBLE_COST: f64 = 1.0e6;

/// One assigned duplex pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplexMatch {
    /// Duplex index in the first descriptor.
    pub first: usize,
    /// Duplex index in the second descriptor.
    pub second: usize,
    /// RMSD after superposition, `None` when the pair is incompatible.
    pub rmsd: Option<f64>,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub similar: bool,
    /// Residue positions `(in first, in second)` of every accepted duplex
    /// match, central element first and each pair listed once.
    pub correspondence: Vec<(usize, usize)>,
    /// Fit of the second descriptor onto the first over the correspondence.
    pub superposition: Option<Superposition>,
    pub duplex_matches: Vec<DuplexMatch>,
    pub total_cost: f64,
    /// Number of duplexes of each descriptor.
    pub duplexes: (usize, usize),
}

impl ComparisonResult {
    pub fn rmsd(&self) -> Option<f64> {
        self.superposition.as_ref().map(|s| s.rmsd)
    }
}

/// Compares descriptors by optimal duplex assignment and superposition.
#[derive(Debug)]
pub struct DescriptorComparator {
    config: CompareConfig,
    verifier: Box<dyn SimilarityVerifier>,
}

impl DescriptorComparator {
    pub fn new(config: &CompareConfig) -> Self {
        Self {
            config: config.clone(),
            verifier: config.verifier.into_verifier(),
        }
    }

    pub fn with_verifier(config: &CompareConfig, verifier: Box<dyn SimilarityVerifier>) -> Self {
        Self {
            config: config.clone(),
            verifier,
        }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn verifier(&self) -> &dyn SimilarityVerifier {
        self.verifier.as_ref()
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Uncomparable`] when the descriptors differ in
    /// molecule type or element size from each other or from the
    /// configuration.
    #[instrument(skip_all, name = "compare_descriptors", fields(first = %first.origin(), second = %second.origin()))]
    pub fn compare(&self, first: &Descriptor, second: &Descriptor) -> Result<ComparisonResult, EngineError> {
        self.check_comparable(first)?;
        self.check_comparable(second)?;

        let first_residues: Vec<&Residue> = first.residues().collect();
        let second_residues: Vec<&Residue> = second.residues().collect();
        let first_duplexes = duplexes(first);
        let second_duplexes = duplexes(second);

        let pairs: Vec<(usize, usize)> = (0..first_duplexes.len())
            .cartesian_product(0..second_duplexes.len())
            .collect();
        let score = |&(i, j): &(usize, usize)| {
            self.duplex_rmsd(
                (first, first_residues.as_slice(), first_duplexes[i].as_slice()),
                (second, second_residues.as_slice(), second_duplexes[j].as_slice()),
            )
        };
        #[cfg(feature = "parallel")]
        let scores: Vec<Option<f64>> = pairs.par_iter().map(score).collect();
        #[cfg(not(feature = "parallel"))]
        let scores: Vec<Option<f64>> = pairs.iter().map(score).collect();

        let costs = DMatrix::from_row_iterator(
            first_duplexes.len(),
            second_duplexes.len(),
            scores.iter().map(|s| s.unwrap_or(INCOMPATIBLE_COST)),
        );
        let assignment = assignment::solve(&costs);

        let duplex_matches: Vec<DuplexMatch> = assignment
            .pairs()
            .map(|(i, j)| {
                let rmsd = scores[i * second_duplexes.len() + j];
                DuplexMatch {
                    first: i,
                    second: j,
                    rmsd,
                    accepted: rmsd.is_some_and(|r| r <= self.config.duplex_rmsd_threshold),
                }
            })
            .collect();

        let counts = (first_duplexes.len(), second_duplexes.len());
        let similar = self.verifier.is_similar(&duplex_matches, counts.0, counts.1);

        let correspondence: Vec<(usize, usize)> = duplex_matches
            .iter()
            .filter(|m| m.accepted)
            .flat_map(|m| {
                first_duplexes[m.first]
                    .iter()
                    .copied()
                    .zip(second_duplexes[m.second].iter().copied())
            })
            .unique()
            .collect();
        let (reference, mobile) = self.alignment_points(
            correspondence
                .iter()
                .map(|&(p, q)| (first_residues[p], second_residues[q])),
        );
        let superposition = Superposition::fit(&mobile, &reference);

        debug!(
            similar,
            verifier = self.verifier.name(),
            accepted = duplex_matches.iter().filter(|m| m.accepted).count(),
            cost = assignment.cost,
            "Descriptor comparison done."
        );
        Ok(ComparisonResult {
            similar,
            correspondence,
            superposition,
            duplex_matches,
            total_cost: assignment.cost,
            duplexes: counts,
        })
    }

    fn check_comparable(&self, descriptor: &Descriptor) -> Result<(), EngineError> {
        if descriptor.molecule_type() != self.config.molecule_type {
            return Err(EngineError::Uncomparable(format!(
                "descriptor {} is {} but the comparison expects {}",
                descriptor.origin(),
                descriptor.molecule_type(),
                self.config.molecule_type
            )));
        }
        if descriptor.element_size() != self.config.element_size {
            return Err(EngineError::Uncomparable(format!(
                "descriptor {} has element size {} but the comparison expects {}",
                descriptor.origin(),
                descriptor.element_size(),
                self.config.element_size
            )));
        }
        Ok(())
    }

    /// RMSD of the best fit of the second duplex onto the first, or `None`
    /// when the duplexes differ in size or contact pattern, or share too few
    /// alignment atoms.
    fn duplex_rmsd(
        &self,
        (first, first_residues, first_duplex): (&Descriptor, &[&Residue], &[usize]),
        (second, second_residues, second_duplex): (&Descriptor, &[&Residue], &[usize]),
    ) -> Option<f64> {
        if first_duplex.len() != second_duplex.len() {
            return None;
        }
        let mismatches = (0..first_duplex.len())
            .tuple_combinations()
            .filter(|&(p, q)| {
                first.contacts().get(first_duplex[p], first_duplex[q])
                    != second.contacts().get(second_duplex[p], second_duplex[q])
            })
            .count();
        if mismatches > self.config.max_contact_mismatches {
            return None;
        }

        let (reference, mobile) = self.alignment_points(
            first_duplex
                .iter()
                .zip(second_duplex)
                .map(|(&p, &q)| (first_residues[p], second_residues[q])),
        );
        if reference.len() < MIN_SUPERPOSITION_POINTS {
            return None;
        }
        Superposition::fit(&mobile, &reference).map(|s| s.rmsd)
    }

    /// Positions of every alignment atom present in both residues of each
    /// pair, as `(first, second)` point lists.
    fn alignment_points<'r>(
        &self,
        pairs: impl Iterator<Item = (&'r Residue, &'r Residue)>,
    ) -> (Vec<Point3<f64>>, Vec<Point3<f64>>) {
        let mut reference = Vec::new();
        let mut mobile = Vec::new();
        for (a, b) in pairs {
            for name in &self.config.alignment_atoms {
                if let (Some(pa), Some(pb)) = (a.position(name), b.position(name)) {
                    reference.push(pa);
                    mobile.push(pb);
                }
            }
        }
        (reference, mobile)
    }
}

/// Residue positions of each duplex: the central element alone, or the
/// central element followed by each further element.
fn duplexes(descriptor: &Descriptor) -> Vec<Vec<usize>> {
    let k = descriptor.element_size();
    let central = 0..k;
    match descriptor.elements().len() {
        0 => Vec::new(),
        1 => vec![central.collect()],
        n => (1..n)
            .map(|e| central.clone().chain(e * k..(e + 1) * k).collect())
            .collect(),
    }
}

/// A copy of `descriptor` as a structure moved by `superposition`.
pub fn aligned_structure(descriptor: &Descriptor, superposition: &Superposition) -> Structure {
    let mut structure = descriptor.to_structure();
    structure.map_positions(|p| superposition.apply(p));
    structure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::MoleculeType;
    use crate::engine::builder::DescriptorBuilder;
    use crate::engine::config::{BuildConfigBuilder, CompareConfigBuilder, DescriptorMode};
    use crate::engine::progress::ProgressReporter;
    use crate::engine::test_support::{helix_chain, structure_of};
    use crate::engine::verifier::VerifierKind;
    use crate::core::contact::ContactExpression;
    use nalgebra::{Rotation3, Vector3};

    const EXPRESSION: &str = "DIST:CA;CA < 6.5";

    fn build(element_size: usize, mode: DescriptorMode) -> Vec<Descriptor> {
        let config = BuildConfigBuilder::new()
            .molecule_type(MoleculeType::Protein)
            .element_size(element_size)
            .contact_expression(EXPRESSION)
            .mode(mode)
            .workers(2)
            .build()
            .unwrap();
        let mut builder = DescriptorBuilder::new(config).unwrap();
        let structure = structure_of(vec![helix_chain('A', 1, 20, &[])]);
        builder.build(&structure, 0, &ProgressReporter::new()).unwrap();
        builder.into_descriptors()
    }

    fn compare_config(element_size: usize, mismatches: usize, threshold: f64) -> CompareConfig {
        CompareConfigBuilder::new()
            .molecule_type(MoleculeType::Protein)
            .element_size(element_size)
            .contact_expression(EXPRESSION)
            .alignment_atoms("N CA C O")
            .duplex_rmsd_threshold(threshold)
            .max_contact_mismatches(mismatches)
            .build()
            .unwrap()
    }

    fn transformed(descriptor: &Descriptor, f: impl Fn(&Point3<f64>) -> Point3<f64>) -> Descriptor {
        let mut structure = descriptor.to_structure();
        structure.map_positions(f);
        let expression = ContactExpression::parse(EXPRESSION, MoleculeType::Protein).unwrap();
        Descriptor::from_structure(&structure, &expression).unwrap()
    }

    #[test]
    fn identical_descriptors_are_similar_with_zero_rmsd() {
        let descriptors = build(5, DescriptorMode::Window);
        let comparator = DescriptorComparator::new(&compare_config(5, 0, 0.5));

        let result = comparator.compare(&descriptors[3], &descriptors[3]).unwrap();
        assert!(result.similar);
        assert_eq!(result.duplexes, (1, 1));
        assert_eq!(result.correspondence, (0..5).map(|i| (i, i)).collect::<Vec<_>>());
        assert!(result.rmsd().unwrap() < 1e-6);
        assert!(result.total_cost < 1e-6);
    }

    #[test]
    fn rigid_motion_is_recovered_by_the_superposition() {
        let descriptors = build(5, DescriptorMode::Window);
        let rotation = Rotation3::from_euler_angles(0.3, -0.2, 1.1);
        let shift = Vector3::new(4.0, -7.0, 12.0);
        let moved = transformed(&descriptors[2], |p| rotation * p + shift);

        let comparator = DescriptorComparator::new(&compare_config(5, 0, 0.5));
        let result = comparator.compare(&descriptors[2], &moved).unwrap();
        assert!(result.similar);
        let superposition = result.superposition.unwrap();
        assert!(superposition.rmsd < 1e-6);

        let aligned = aligned_structure(&moved, &superposition);
        let original = descriptors[2].to_structure();
        for (a, b) in aligned.models()[0].residues().zip(original.models()[0].residues()) {
            let (pa, pb) = (a.position("CA").unwrap(), b.position("CA").unwrap());
            assert!((pa - pb).norm() < 1e-6);
        }
        // The input descriptor keeps its coordinates.
        assert!((moved.residues().next().unwrap().position("CA").unwrap()
            - descriptors[2].residues().next().unwrap().position("CA").unwrap())
        .norm()
            > 1.0);
    }

    #[test]
    fn contact_mismatches_make_duplexes_incompatible() {
        let descriptors = build(5, DescriptorMode::Window);
        // Stretching by 20% lifts the i+4 CA distance (6.2 Å) above the cutoff.
        let stretched = transformed(&descriptors[0], |p| Point3::from(p.coords * 1.2));
        assert_ne!(stretched.contacts(), descriptors[0].contacts());

        let strict = DescriptorComparator::new(&compare_config(5, 0, 10.0));
        let result = strict.compare(&descriptors[0], &stretched).unwrap();
        assert!(!result.similar);
        assert_eq!(result.duplex_matches[0].rmsd, None);
        assert!(!result.duplex_matches[0].accepted);
        assert!(result.correspondence.is_empty());
        assert!(result.superposition.is_none());
        assert_eq!(result.total_cost, INCOMPATIBLE_COST);

        let tolerant = DescriptorComparator::new(&compare_config(5, 10, 10.0));
        let result = tolerant.compare(&descriptors[0], &stretched).unwrap();
        assert!(result.similar);
        assert!(result.duplex_matches[0].rmsd.unwrap() > 0.1);
    }

    #[test]
    fn rmsd_above_threshold_is_rejected() {
        let descriptors = build(5, DescriptorMode::Window);
        let stretched = transformed(&descriptors[0], |p| Point3::from(p.coords * 1.05));
        let comparator = DescriptorComparator::new(&compare_config(5, 10, 1e-3));
        let result = comparator.compare(&descriptors[0], &stretched).unwrap();
        assert!(result.duplex_matches[0].rmsd.is_some());
        assert!(!result.duplex_matches[0].accepted);
        assert!(!result.similar);
    }

    #[test]
    fn mismatched_descriptors_are_uncomparable() {
        let five = build(5, DescriptorMode::Window);
        let three = build(3, DescriptorMode::Window);
        let comparator = DescriptorComparator::new(&compare_config(5, 0, 0.5));
        assert!(matches!(
            comparator.compare(&five[0], &three[0]),
            Err(EngineError::Uncomparable(_))
        ));
    }

    #[test]
    fn extended_descriptor_matches_itself_duplex_by_duplex() {
        let descriptors = build(3, DescriptorMode::Extended);
        let descriptor = descriptors
            .iter()
            .find(|d| d.origin().residue_number == 11)
            .unwrap();
        assert_eq!(duplexes(descriptor).len(), 4);
        assert_eq!(duplexes(descriptor)[1], vec![0, 1, 2, 6, 7, 8]);

        let comparator = DescriptorComparator::new(&compare_config(3, 0, 0.5));
        let result = comparator.compare(descriptor, descriptor).unwrap();
        assert!(result.similar);
        assert_eq!(result.duplexes, (4, 4));
        assert!(result.duplex_matches.iter().all(|m| m.first == m.second && m.accepted));
        for m in &result.duplex_matches {
            assert!(m.rmsd.unwrap() < 1e-6);
        }
        assert_eq!(result.correspondence.len(), 15);
    }

    #[test]
    fn duplex_count_mismatch_is_decided_by_the_verifier() {
        let window = build(3, DescriptorMode::Window);
        let extended = build(3, DescriptorMode::Extended);
        let center = |set: &[Descriptor]| {
            set.iter()
                .find(|d| d.origin().residue_number == 11)
                .cloned()
                .unwrap()
        };
        let (window, extended) = (center(&window), center(&extended));

        let comparator = DescriptorComparator::new(&compare_config(3, 0, 0.5));
        let result = comparator.compare(&extended, &window).unwrap();
        assert_eq!(result.duplexes, (4, 1));
        assert!(!result.similar);
        assert_eq!(result.duplex_matches.len(), 1);
        assert_eq!(result.duplex_matches[0].rmsd, None);

        let mut config = compare_config(3, 0, 0.5);
        config.verifier = VerifierKind::MajorityOfDuplexes { fraction: 0.5 };
        let result = DescriptorComparator::new(&config).compare(&extended, &extended).unwrap();
        assert!(result.similar);
        assert_eq!(comparator.verifier().name(), "all-duplexes");
    }

    #[derive(Debug, Default)]
    struct RecordingVerifier {
        calls: std::sync::Mutex<Vec<(usize, usize, usize)>>,
    }

    impl SimilarityVerifier for RecordingVerifier {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn is_similar(&self, matches: &[DuplexMatch], duplexes_a: usize, duplexes_b: usize) -> bool {
            self.calls.lock().unwrap().push((matches.len(), duplexes_a, duplexes_b));
            !matches.is_empty()
        }
    }

    #[test]
    fn custom_verifier_decides_the_verdict() {
        let descriptors = build(5, DescriptorMode::Window);
        let stretched = transformed(&descriptors[0], |p| Point3::from(p.coords * 1.2));
        let config = compare_config(5, 0, 10.0);
        assert!(!DescriptorComparator::new(&config).compare(&descriptors[0], &stretched).unwrap().similar);

        let comparator = DescriptorComparator::with_verifier(&config, Box::new(RecordingVerifier::default()));
        assert_eq!(comparator.verifier().name(), "recording");
        let result = comparator.compare(&descriptors[0], &stretched).unwrap();
        assert!(result.similar);
        assert!(!result.duplex_matches[0].accepted);
        assert!(result.superposition.is_none());

        let verifier = format!("{:?}", comparator.verifier());
        assert!(verifier.contains("(1, 1, 1)"), "{verifier}");
    }
}
