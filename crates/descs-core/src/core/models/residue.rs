use super::atom::Atom;
use crate::core::topology::{canonical_atom_name, classify_residue};
use nalgebra::Point3;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The polymer family a residue belongs to.
///
/// Contact predicates, completeness checks and chain connectivity are all
/// defined per molecule type (see [`crate::core::topology::capabilities`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoleculeType {
    Protein,
    Rna,
    Dna,
}

impl MoleculeType {
    pub fn is_nucleic(self) -> bool {
        matches!(self, MoleculeType::Rna | MoleculeType::Dna)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid molecule type '{0}'. Expected 'protein', 'rna' or 'dna'.")]
pub struct ParseMoleculeTypeError(pub String);

impl FromStr for MoleculeType {
    type Err = ParseMoleculeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protein" | "aa" => Ok(MoleculeType::Protein),
            "rna" => Ok(MoleculeType::Rna),
            "dna" => Ok(MoleculeType::Dna),
            _ => Err(ParseMoleculeTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MoleculeType::Protein => "Protein",
                MoleculeType::Rna => "RNA",
                MoleculeType::Dna => "DNA",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub number: isize,                         // Residue sequence number from source file
    pub insertion_code: Option<char>,          // PDB insertion code, if any
    pub name: String,                          // Name of the residue (e.g., "ALA", "G")
    pub molecule_type: Option<MoleculeType>,   // None for ligands, water and unknown residues
    atoms: Vec<Atom>,                          // Atoms in insertion order
    atom_name_map: HashMap<String, usize>,     // Map from canonical atom name to its index
}

impl Residue {
    pub fn new(number: isize, name: &str) -> Self {
        let name = name.trim().to_ascii_uppercase();
        Self {
            number,
            insertion_code: None,
            molecule_type: classify_residue(&name),
            name,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub fn with_insertion_code(mut self, code: Option<char>) -> Self {
        self.insertion_code = code.filter(|c| !c.is_whitespace());
        self
    }

    /// Adds an atom under its canonical name.
    ///
    /// Returns `false` and leaves the residue untouched when an atom with the
    /// same canonical name is already present (alternate locations keep the
    /// first conformer).
    pub fn add_atom(&mut self, mut atom: Atom) -> bool {
        let canonical = canonical_atom_name(&atom.name);
        if self.atom_name_map.contains_key(&canonical) {
            return false;
        }
        atom.name = canonical.clone();
        self.atom_name_map.insert(canonical, self.atoms.len());
        self.atoms.push(atom);
        true
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub(crate) fn atoms_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        self.atoms.iter_mut()
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        let index = match self.atom_name_map.get(name) {
            Some(&index) => index,
            None => *self.atom_name_map.get(&canonical_atom_name(name))?,
        };
        self.atoms.get(index)
    }

    pub fn position(&self, name: &str) -> Option<Point3<f64>> {
        self.atom(name).map(|atom| atom.position)
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom(name).is_some()
    }

    /// Short human-readable label such as `ALA15` or `G7A`.
    pub fn label(&self) -> String {
        match self.insertion_code {
            Some(code) => format!("{}{}{}", self.name, self.number, code),
            None => format!("{}{}", self.name, self.number),
        }
    }
}
