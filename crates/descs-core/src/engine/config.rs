use super::filter::DescriptorFilter;
use super::verifier::VerifierKind;
use crate::core::models::residue::MoleculeType;
use crate::core::topology::accepted_alignment_atoms;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// How many windows make up one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescriptorMode {
    /// One window of `element_size` residues around each valid center.
    #[default]
    Window,
    /// The central window plus the windows of every non-redundant valid
    /// center in contact with it.
    Extended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub molecule_type: MoleculeType,
    pub element_size: usize,
    pub contact_expression: String,
    pub mode: DescriptorMode,
    pub filter: DescriptorFilter,
    pub workers: usize,
}

impl BuildConfig {
    pub fn neighborhood(&self) -> usize {
        (self.element_size - 1) / 2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    pub molecule_type: MoleculeType,
    pub element_size: usize,
    /// Used to recompute the contact map of descriptors read back from files.
    pub contact_expression: String,
    pub alignment_atoms: Vec<String>,
    pub duplex_rmsd_threshold: f64,
    pub max_contact_mismatches: usize,
    pub verifier: VerifierKind,
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn validate_element_size(element_size: usize) -> Result<usize, ConfigError> {
    if element_size == 0 || element_size % 2 == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "element_size",
            reason: format!("must be a positive odd number, got {}", element_size),
        });
    }
    Ok(element_size)
}

#[derive(Default)]
pub struct BuildConfigBuilder {
    molecule_type: Option<MoleculeType>,
    element_size: Option<usize>,
    contact_expression: Option<String>,
    mode: Option<DescriptorMode>,
    filter: Option<DescriptorFilter>,
    workers: Option<usize>,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn molecule_type(mut self, molecule_type: MoleculeType) -> Self {
        self.molecule_type = Some(molecule_type);
        self
    }
    pub fn element_size(mut self, size: usize) -> Self {
        self.element_size = Some(size);
        self
    }
    pub fn contact_expression(mut self, expression: impl Into<String>) -> Self {
        self.contact_expression = Some(expression.into());
        self
    }
    pub fn mode(mut self, mode: DescriptorMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn filter(mut self, filter: DescriptorFilter) -> Self {
        self.filter = Some(filter);
        self
    }
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<BuildConfig, ConfigError> {
        let workers = self.workers.unwrap_or_else(default_workers);
        if workers == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "workers",
                reason: "at least one worker is required".into(),
            });
        }
        Ok(BuildConfig {
            molecule_type: self
                .molecule_type
                .ok_or(ConfigError::MissingParameter("molecule_type"))?,
            element_size: validate_element_size(
                self.element_size
                    .ok_or(ConfigError::MissingParameter("element_size"))?,
            )?,
            contact_expression: self
                .contact_expression
                .ok_or(ConfigError::MissingParameter("contact_expression"))?,
            mode: self.mode.unwrap_or_default(),
            filter: self.filter.unwrap_or_default(),
            workers,
        })
    }
}

#[derive(Default)]
pub struct CompareConfigBuilder {
    molecule_type: Option<MoleculeType>,
    element_size: Option<usize>,
    contact_expression: Option<String>,
    alignment_atoms: Option<String>,
    duplex_rmsd_threshold: Option<f64>,
    max_contact_mismatches: Option<usize>,
    verifier: Option<VerifierKind>,
}

impl CompareConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn molecule_type(mut self, molecule_type: MoleculeType) -> Self {
        self.molecule_type = Some(molecule_type);
        self
    }
    pub fn element_size(mut self, size: usize) -> Self {
        self.element_size = Some(size);
        self
    }
    pub fn contact_expression(mut self, expression: impl Into<String>) -> Self {
        self.contact_expression = Some(expression.into());
        self
    }
    /// Whitespace or newline delimited atom names; unknown names are dropped
    /// when the configuration is built.
    pub fn alignment_atoms(mut self, atoms: impl Into<String>) -> Self {
        self.alignment_atoms = Some(atoms.into());
        self
    }
    pub fn duplex_rmsd_threshold(mut self, threshold: f64) -> Self {
        self.duplex_rmsd_threshold = Some(threshold);
        self
    }
    pub fn max_contact_mismatches(mut self, mismatches: usize) -> Self {
        self.max_contact_mismatches = Some(mismatches);
        self
    }
    pub fn verifier(mut self, verifier: VerifierKind) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn build(self) -> Result<CompareConfig, ConfigError> {
        let molecule_type = self
            .molecule_type
            .ok_or(ConfigError::MissingParameter("molecule_type"))?;
        let atoms_text = self
            .alignment_atoms
            .ok_or(ConfigError::MissingParameter("alignment_atoms"))?;
        let alignment_atoms = accepted_alignment_atoms(&atoms_text, molecule_type);
        if alignment_atoms.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "alignment_atoms",
                reason: format!("no known {} atom names in '{}'", molecule_type, atoms_text),
            });
        }

        let threshold = self
            .duplex_rmsd_threshold
            .ok_or(ConfigError::MissingParameter("duplex_rmsd_threshold"))?;
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "duplex_rmsd_threshold",
                reason: format!("must be a non-negative number, got {}", threshold),
            });
        }

        let verifier = self.verifier.unwrap_or_default();
        if let VerifierKind::MajorityOfDuplexes { fraction } = verifier {
            if !(0.0..1.0).contains(&fraction) {
                return Err(ConfigError::InvalidParameter {
                    name: "majority_fraction",
                    reason: format!("must lie in [0, 1), got {}", fraction),
                });
            }
        }

        Ok(CompareConfig {
            molecule_type,
            element_size: validate_element_size(
                self.element_size
                    .ok_or(ConfigError::MissingParameter("element_size"))?,
            )?,
            contact_expression: self
                .contact_expression
                .ok_or(ConfigError::MissingParameter("contact_expression"))?,
            alignment_atoms,
            duplex_rmsd_threshold: threshold,
            max_contact_mismatches: self.max_contact_mismatches.unwrap_or(0),
            verifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_config_requires_core_parameters() {
        let err = BuildConfigBuilder::new()
            .element_size(5)
            .contact_expression("DIST:CA<8")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("molecule_type"));

        let err = BuildConfigBuilder::new()
            .molecule_type(MoleculeType::Protein)
            .element_size(5)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("contact_expression"));
    }

    #[test]
    fn build_config_rejects_even_element_sizes_and_zero_workers() {
        let base = || {
            BuildConfigBuilder::new()
                .molecule_type(MoleculeType::Protein)
                .contact_expression("DIST:CA<8")
        };
        assert!(matches!(
            base().element_size(4).build(),
            Err(ConfigError::InvalidParameter { name: "element_size", .. })
        ));
        assert!(matches!(
            base().element_size(5).workers(0).build(),
            Err(ConfigError::InvalidParameter { name: "workers", .. })
        ));
    }

    #[test]
    fn build_config_fills_defaults() {
        let config = BuildConfigBuilder::new()
            .molecule_type(MoleculeType::Rna)
            .element_size(7)
            .contact_expression("DIST:P<10")
            .build()
            .unwrap();
        assert_eq!(config.mode, DescriptorMode::Window);
        assert_eq!(config.filter, DescriptorFilter::default());
        assert!(config.workers >= 1);
        assert_eq!(config.neighborhood(), 3);
    }

    #[test]
    fn compare_config_filters_alignment_atoms() {
        let config = CompareConfigBuilder::new()
            .molecule_type(MoleculeType::Protein)
            .element_size(5)
            .contact_expression("DIST:CA<8")
            .alignment_atoms("N CA C O P")
            .duplex_rmsd_threshold(1.5)
            .build()
            .unwrap();
        assert_eq!(config.alignment_atoms, vec!["N", "CA", "C", "O"]);
        assert_eq!(config.verifier, VerifierKind::AllDuplexes);
        assert_eq!(config.max_contact_mismatches, 0);
    }

    #[test]
    fn compare_config_rejects_unusable_values() {
        let base = || {
            CompareConfigBuilder::new()
                .molecule_type(MoleculeType::Protein)
                .element_size(5)
                .contact_expression("DIST:CA<8")
                .duplex_rmsd_threshold(1.0)
        };
        assert!(matches!(
            base().alignment_atoms("P OP1").build(),
            Err(ConfigError::InvalidParameter { name: "alignment_atoms", .. })
        ));
        assert!(matches!(
            base()
                .alignment_atoms("CA")
                .verifier(VerifierKind::MajorityOfDuplexes { fraction: 1.5 })
                .build(),
            Err(ConfigError::InvalidParameter { name: "majority_fraction", .. })
        ));
        assert_eq!(
            base().build().unwrap_err(),
            ConfigError::MissingParameter("alignment_atoms")
        );
    }
}
