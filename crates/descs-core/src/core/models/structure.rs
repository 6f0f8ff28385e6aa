use super::chain::Chain;
use super::residue::{MoleculeType, Residue};
use crate::core::topology::capabilities;
use nalgebra::Point3;
use tracing::debug;

/// A single model (conformer) of a structure: an ordered list of chains.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// The model serial number (1-based, as in the source file).
    pub number: usize,
    pub(crate) chains: Vec<Chain>,
}

impl Model {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            chains: Vec::new(),
        }
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, index: usize) -> Option<&Chain> {
        self.chains.get(index)
    }

    pub fn push_chain(&mut self, chain: Chain) {
        self.chains.push(chain);
    }

    /// Total number of residues across all chains.
    pub fn residue_count(&self) -> usize {
        self.chains.iter().map(Chain::len).sum()
    }

    /// Length of the longest chain, in residues.
    pub fn max_chain_len(&self) -> usize {
        self.chains.iter().map(Chain::len).max().unwrap_or(0)
    }

    pub fn residues(&self) -> impl Iterator<Item = &Residue> {
        self.chains.iter().flat_map(|chain| chain.residues.iter())
    }

    /// Returns a copy of this model restricted to complete residues of the
    /// given molecule type. Chains left without residues are dropped.
    pub fn retain_complete(&self, molecule_type: MoleculeType) -> Model {
        let caps = capabilities(molecule_type);
        let chains = self
            .chains
            .iter()
            .filter_map(|chain| {
                let residues: Vec<Residue> = chain
                    .residues
                    .iter()
                    .filter(|residue| {
                        let complete = caps.is_complete(residue);
                        if !complete && residue.molecule_type == Some(molecule_type) {
                            debug!(
                                model = self.number,
                                chain = %chain.id,
                                "Skipping incomplete residue {}.",
                                residue.label()
                            );
                        }
                        complete
                    })
                    .cloned()
                    .collect();
                (!residues.is_empty()).then(|| Chain {
                    id: chain.id,
                    residues,
                })
            })
            .collect();
        Model {
            number: self.number,
            chains,
        }
    }

    pub(crate) fn map_positions(&mut self, f: &impl Fn(&Point3<f64>) -> Point3<f64>) {
        for chain in &mut self.chains {
            for residue in &mut chain.residues {
                for atom in residue.atoms_mut() {
                    atom.position = f(&atom.position);
                }
            }
        }
    }
}

/// A complete macromolecular structure: an ordered list of models.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub(crate) models: Vec<Model>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_models(models: Vec<Model>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn model(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    pub fn push_model(&mut self, model: Model) {
        self.models.push(model);
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn atom_count(&self) -> usize {
        self.models
            .iter()
            .flat_map(Model::residues)
            .map(|residue| residue.atoms().len())
            .sum()
    }

    pub(crate) fn map_positions(&mut self, f: impl Fn(&Point3<f64>) -> Point3<f64>) {
        for model in &mut self.models {
            model.map_positions(&f);
        }
    }
}
