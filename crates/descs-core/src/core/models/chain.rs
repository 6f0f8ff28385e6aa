use super::residue::Residue;

#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: char,                       // Chain identifier (e.g., 'A', 'B')
    pub(crate) residues: Vec<Residue>,  // Residues in sequence order
}

impl Chain {
    pub fn new(id: char) -> Self {
        Self {
            id,
            residues: Vec::new(),
        }
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn residue(&self, index: usize) -> Option<&Residue> {
        self.residues.get(index)
    }

    pub fn push_residue(&mut self, residue: Residue) {
        self.residues.push(residue);
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}
