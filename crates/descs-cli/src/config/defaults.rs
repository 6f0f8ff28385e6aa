use descs::core::models::residue::MoleculeType;

pub struct DefaultsConfig {
    pub molecule_type: MoleculeType,
    pub element_size: usize,
    pub contact_expression: String,
    pub min_contacts: usize,
    pub min_elements: usize,
    pub duplex_rmsd_threshold: f64,
    pub max_contact_mismatches: usize,
    pub majority_fraction: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            molecule_type: MoleculeType::Protein,
            element_size: 5,
            contact_expression: "DIST:CA;CA < 8.0".to_string(),
            min_contacts: 0,
            min_elements: 0,
            duplex_rmsd_threshold: 1.0,
            max_contact_mismatches: 0,
            majority_fraction: 0.5,
        }
    }
}

impl DefaultsConfig {
    /// Alignment atoms used when neither the config file nor the command line
    /// names any.
    pub fn alignment_atoms(molecule_type: MoleculeType) -> &'static str {
        match molecule_type {
            MoleculeType::Protein => "N CA C O",
            MoleculeType::Rna | MoleculeType::Dna => "P C4' C1' O3'",
        }
    }
}
