use super::atom::Atom;
use super::chain::Chain;
use super::residue::Residue;
use super::structure::{Model, Structure};

/// Incrementally assembles a [`Structure`] from a stream of records.
///
/// Readers call `start_model`/`start_chain`/`start_residue` whenever the
/// corresponding identifier changes and `add_atom` for each atom record. A
/// residue or atom arriving before its parent container implicitly opens one
/// (model 1, chain `'A'`), so malformed but recoverable input never panics.
#[derive(Debug, Default)]
pub struct StructureBuilder {
    structure: Structure,
    current_model: Option<usize>,
    current_chain: Option<usize>,
    current_residue: Option<usize>,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_model(&mut self, number: usize) -> &mut Self {
        self.structure.models.push(Model::new(number));
        self.current_model = Some(self.structure.models.len() - 1);
        self.current_chain = None;
        self.current_residue = None;
        self
    }

    pub fn start_chain(&mut self, id: char) -> &mut Self {
        let model_idx = self.ensure_model();
        let model = &mut self.structure.models[model_idx];
        model.chains.push(Chain::new(id));
        self.current_chain = Some(model.chains.len() - 1);
        self.current_residue = None;
        self
    }

    pub fn start_residue(
        &mut self,
        number: isize,
        insertion_code: Option<char>,
        name: &str,
    ) -> &mut Self {
        let model_idx = self.ensure_model();
        let chain_idx = self.ensure_chain();
        let chain = &mut self.structure.models[model_idx].chains[chain_idx];
        chain.residues.push(Residue::new(number, name).with_insertion_code(insertion_code));
        self.current_residue = Some(chain.residues.len() - 1);
        self
    }

    /// Adds a fully-formed residue to the current chain.
    pub fn push_residue(&mut self, residue: Residue) -> &mut Self {
        let model_idx = self.ensure_model();
        let chain_idx = self.ensure_chain();
        let chain = &mut self.structure.models[model_idx].chains[chain_idx];
        chain.residues.push(residue);
        self.current_residue = Some(chain.residues.len() - 1);
        self
    }

    pub fn add_atom(&mut self, atom: Atom) -> &mut Self {
        let model_idx = self.ensure_model();
        let chain_idx = self.ensure_chain();
        let residue_idx = match self.current_residue {
            Some(idx) => idx,
            None => {
                self.start_residue(0, None, "UNK");
                self.structure.models[model_idx].chains[chain_idx].residues.len() - 1
            }
        };
        self.structure.models[model_idx].chains[chain_idx].residues[residue_idx].add_atom(atom);
        self
    }

    pub fn build(self) -> Structure {
        self.structure
    }

    fn ensure_model(&mut self) -> usize {
        match self.current_model {
            Some(idx) => idx,
            None => {
                self.start_model(1);
                self.structure.models.len() - 1
            }
        }
    }

    fn ensure_chain(&mut self) -> usize {
        match self.current_chain {
            Some(idx) => idx,
            None => {
                self.start_chain('A');
                let model_idx = self.ensure_model();
                self.structure.models[model_idx].chains.len() - 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn builds_nested_models_chains_and_residues_in_order() {
        let mut builder = StructureBuilder::new();
        builder
            .start_model(1)
            .start_chain('A')
            .start_residue(1, None, "GLY")
            .add_atom(Atom::new("CA", Point3::origin()))
            .start_residue(2, Some('A'), "ALA")
            .add_atom(Atom::new("CA", Point3::new(3.8, 0.0, 0.0)))
            .start_chain('B')
            .start_residue(1, None, "U")
            .add_atom(Atom::new("P", Point3::origin()))
            .start_model(2)
            .start_chain('A');
        let structure = builder.build();

        assert_eq!(structure.models().len(), 2);
        let model = &structure.models()[0];
        assert_eq!(model.chains().len(), 2);
        assert_eq!(model.chains()[0].residues()[1].insertion_code, Some('A'));
        assert_eq!(model.chains()[1].residues()[0].name, "U");
        assert!(structure.models()[1].chains()[0].is_empty());
    }

    #[test]
    fn atoms_without_open_containers_create_implicit_ones() {
        let mut builder = StructureBuilder::new();
        builder.add_atom(Atom::new("CA", Point3::origin()));
        let structure = builder.build();

        assert_eq!(structure.models().len(), 1);
        assert_eq!(structure.models()[0].number, 1);
        assert_eq!(structure.models()[0].chains()[0].id, 'A');
        assert_eq!(structure.models()[0].chains()[0].residues()[0].name, "UNK");
        assert_eq!(structure.atom_count(), 1);
    }
}
