use super::descriptor::Descriptor;

/// Acceptance criteria applied to freshly built descriptors.
///
/// The default filter accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorFilter {
    /// Minimum number of contacting residue pairs.
    pub min_contacts: usize,
    /// Residue positions `(i, j)` within the descriptor that must be in
    /// contact. Positions past the end of a descriptor never match.
    pub required_contacts: Vec<(usize, usize)>,
    /// Minimum number of elements (windows).
    pub min_elements: usize,
}

impl DescriptorFilter {
    pub fn accepts(&self, descriptor: &Descriptor) -> bool {
        let contacts = descriptor.contacts();
        descriptor.elements().len() >= self.min_elements
            && self.required_contacts.iter().all(|&(i, j)| i != j && contacts.get(i, j))
            && contacts.count() >= self.min_contacts
    }

    pub fn is_permissive(&self) -> bool {
        self.min_contacts == 0 && self.required_contacts.is_empty() && self.min_elements <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contact::ContactExpression;
    use crate::core::models::residue::{MoleculeType, Residue};
    use crate::engine::descriptor::{ContactMatrix, DescriptorOrigin};
    use crate::engine::test_support::helix_chain;

    fn window_descriptor() -> Descriptor {
        let chain = helix_chain('A', 1, 6, &[]);
        let expression = ContactExpression::parse("DIST:CA;CA < 6.5", MoleculeType::Protein).unwrap();
        let element = chain.residues().to_vec();
        let residues: Vec<&Residue> = element.iter().collect();
        let contacts = ContactMatrix::compute(&residues, &mut expression.evaluator());
        let origin = DescriptorOrigin::of(1, 'A', &chain.residues()[2]);
        Descriptor::new(origin, MoleculeType::Protein, 6, vec![element], contacts).unwrap()
    }

    #[test]
    fn default_filter_accepts_everything() {
        let filter = DescriptorFilter::default();
        assert!(filter.is_permissive());
        assert!(filter.accepts(&window_descriptor()));

        // Every descriptor has at least one element.
        let single_element = DescriptorFilter {
            min_elements: 1,
            ..DescriptorFilter::default()
        };
        assert!(single_element.is_permissive());
        assert!(single_element.accepts(&window_descriptor()));
    }

    #[test]
    fn min_contacts_counts_unordered_pairs() {
        let descriptor = window_descriptor();
        let count = descriptor.contact_count();
        let at_limit = DescriptorFilter {
            min_contacts: count,
            ..Default::default()
        };
        let above = DescriptorFilter {
            min_contacts: count + 1,
            ..Default::default()
        };
        assert!(at_limit.accepts(&descriptor));
        assert!(!above.accepts(&descriptor));
    }

    #[test]
    fn required_contacts_must_all_be_present() {
        let descriptor = window_descriptor();
        let present = DescriptorFilter {
            required_contacts: vec![(0, 1), (4, 0)],
            ..Default::default()
        };
        let absent = DescriptorFilter {
            required_contacts: vec![(0, 1), (0, 5)],
            ..Default::default()
        };
        let out_of_range = DescriptorFilter {
            required_contacts: vec![(0, 42)],
            ..Default::default()
        };
        assert!(present.accepts(&descriptor));
        assert!(!absent.accepts(&descriptor));
        assert!(!out_of_range.accepts(&descriptor));
    }

    #[test]
    fn min_elements_rejects_single_window_descriptors() {
        let filter = DescriptorFilter {
            min_elements: 2,
            ..Default::default()
        };
        assert!(!filter.is_permissive());
        assert!(!filter.accepts(&window_descriptor()));
    }
}
