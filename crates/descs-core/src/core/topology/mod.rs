//! # Topology Module
//!
//! Static chemical knowledge about the residues descriptors are built from.
//!
//! ## Overview
//!
//! Each supported [`MoleculeType`] owns one immutable [`Capabilities`] record.
//! The record answers every residue-level question the engine asks: which atoms
//! must be present for a residue to be complete, whether two residues are
//! chemically bonded along the chain, where a virtual atom (a centroid) lies,
//! and which atom names a contact expression or alignment list may mention.
//! Records are looked up once per residue with [`capabilities`] and passed
//! around as `&'static Capabilities`.
//!
//! ## Key Components
//!
//! - [`Capabilities`] - Per-molecule-type table of atom sets and predicates
//! - [`VirtualAtom`] - Derived atom positions usable in contact expressions
//! - [`canonical_atom_name`] - Alias normalisation applied when atoms are stored
//! - [`accepted_alignment_atoms`] - Filtering of user-provided alignment atom lists

mod tables;

use crate::core::models::residue::{MoleculeType, Residue};
use crate::core::utils::geometry::centroid;
use itertools::Itertools;
use nalgebra::Point3;
use std::fmt;
use tables::*;
use tracing::warn;

const PEPTIDE_BOND_MAX_LENGTH: f64 = 1.8;
const PHOSPHODIESTER_BOND_MAX_LENGTH: f64 = 2.0;

/// An atom position derived from several real atoms of a residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualAtom {
    /// Side-chain centroid (`SCC`). Glycine falls back to its CA.
    SideChainCentroid,
    /// Centroid of N, CA and C (`BBC`).
    BackboneCentroid,
    /// Centroid of the nucleobase heavy atoms (`BC`).
    BaseCentroid,
    /// Centroid of the five sugar ring atoms (`RC`).
    RiboseCentroid,
    /// Centroid of P, OP1 and OP2 (`PC`).
    PhosphateCentroid,
}

impl VirtualAtom {
    pub fn token(self) -> &'static str {
        match self {
            VirtualAtom::SideChainCentroid => "SCC",
            VirtualAtom::BackboneCentroid => "BBC",
            VirtualAtom::BaseCentroid => "BC",
            VirtualAtom::RiboseCentroid => "RC",
            VirtualAtom::PhosphateCentroid => "PC",
        }
    }
}

impl fmt::Display for VirtualAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Residue-level behaviour of one molecule type.
#[derive(Debug)]
pub struct Capabilities {
    pub molecule_type: MoleculeType,
    /// Atoms every complete residue of this type carries.
    pub backbone_atoms: &'static [&'static str],
    /// Virtual atoms expressions may reference for this type.
    pub virtual_atoms: &'static [VirtualAtom],
    specificity_atoms: fn(&str) -> Option<&'static [&'static str]>,
    is_connected: fn(&Residue, &Residue) -> bool,
    virtual_position: fn(&Residue, VirtualAtom) -> Option<Point3<f64>>,
    is_known_atom: fn(&str) -> bool,
}

impl Capabilities {
    /// Residue-specific atoms (side chain or base) required for completeness.
    /// `None` when the residue name does not belong to this molecule type.
    pub fn specificity_atoms(&self, residue_name: &str) -> Option<&'static [&'static str]> {
        (self.specificity_atoms)(residue_name)
    }

    /// Whether `next` is chemically bonded to `prev` along the chain.
    pub fn is_connected(&self, prev: &Residue, next: &Residue) -> bool {
        (self.is_connected)(prev, next)
    }

    pub fn virtual_position(&self, residue: &Residue, atom: VirtualAtom) -> Option<Point3<f64>> {
        (self.virtual_position)(residue, atom)
    }

    pub fn is_known_atom(&self, name: &str) -> bool {
        (self.is_known_atom)(name)
    }

    /// Resolves a virtual atom token (`SCC`, `BC`, ...) supported by this type.
    pub fn virtual_atom(&self, token: &str) -> Option<VirtualAtom> {
        self.virtual_atoms
            .iter()
            .copied()
            .find(|atom| atom.token() == token)
    }

    /// A residue is complete when it has this molecule type and carries every
    /// backbone and specificity atom.
    pub fn is_complete(&self, residue: &Residue) -> bool {
        if residue.molecule_type != Some(self.molecule_type) {
            return false;
        }
        let Some(specific) = self.specificity_atoms(&residue.name) else {
            return false;
        };
        self.backbone_atoms
            .iter()
            .chain(specific.iter())
            .all(|name| residue.has_atom(name))
    }
}

static PROTEIN: Capabilities = Capabilities {
    molecule_type: MoleculeType::Protein,
    backbone_atoms: PROTEIN_BACKBONE,
    virtual_atoms: &[VirtualAtom::SideChainCentroid, VirtualAtom::BackboneCentroid],
    specificity_atoms: protein_side_chain,
    is_connected: protein_connected,
    virtual_position: protein_virtual_position,
    is_known_atom: protein_known_atom,
};

static RNA: Capabilities = Capabilities {
    molecule_type: MoleculeType::Rna,
    backbone_atoms: RNA_BACKBONE,
    virtual_atoms: NUCLEIC_VIRTUAL_ATOMS,
    specificity_atoms: rna_base,
    is_connected: nucleic_connected,
    virtual_position: nucleic_virtual_position,
    is_known_atom: nucleic_known_atom,
};

static DNA: Capabilities = Capabilities {
    molecule_type: MoleculeType::Dna,
    backbone_atoms: DNA_BACKBONE,
    virtual_atoms: NUCLEIC_VIRTUAL_ATOMS,
    specificity_atoms: dna_base,
    is_connected: nucleic_connected,
    virtual_position: nucleic_virtual_position,
    is_known_atom: nucleic_known_atom,
};

const NUCLEIC_VIRTUAL_ATOMS: &[VirtualAtom] = &[
    VirtualAtom::BaseCentroid,
    VirtualAtom::RiboseCentroid,
    VirtualAtom::PhosphateCentroid,
];

/// Returns the capability record for a molecule type.
pub fn capabilities(molecule_type: MoleculeType) -> &'static Capabilities {
    match molecule_type {
        MoleculeType::Protein => &PROTEIN,
        MoleculeType::Rna => &RNA,
        MoleculeType::Dna => &DNA,
    }
}

/// Classifies a residue by its (upper-case) name.
pub fn classify_residue(name: &str) -> Option<MoleculeType> {
    if PROTEIN_SIDE_CHAINS.contains_key(name) {
        Some(MoleculeType::Protein)
    } else if RNA_RESIDUES.contains(name) {
        Some(MoleculeType::Rna)
    } else if DNA_RESIDUES.contains(name) {
        Some(MoleculeType::Dna)
    } else {
        None
    }
}

/// Trims and upper-cases an atom name and resolves legacy aliases
/// (`O1P` → `OP1`, `C1*` → `C1'`, `OT2` → `OXT`, ...).
pub fn canonical_atom_name(name: &str) -> String {
    let normalized = name.trim().to_ascii_uppercase();
    match ATOM_NAME_ALIASES.get(normalized.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => normalized,
    }
}

/// Parses a whitespace or newline delimited list of alignment atom names,
/// keeping the names known to the molecule type in their first-seen order.
/// Unknown names are logged and dropped.
pub fn accepted_alignment_atoms(text: &str, molecule_type: MoleculeType) -> Vec<String> {
    let caps = capabilities(molecule_type);
    text.split_whitespace()
        .map(canonical_atom_name)
        .filter(|name| {
            let known = caps.is_known_atom(name);
            if !known {
                warn!(
                    "Ignoring alignment atom '{}': not a known {} atom name.",
                    name, molecule_type
                );
            }
            known
        })
        .unique()
        .collect()
}

fn protein_side_chain(residue_name: &str) -> Option<&'static [&'static str]> {
    PROTEIN_SIDE_CHAINS.get(residue_name).copied()
}

fn rna_base(residue_name: &str) -> Option<&'static [&'static str]> {
    if RNA_RESIDUES.contains(residue_name) {
        NUCLEIC_BASES.get(residue_name).copied()
    } else {
        None
    }
}

fn dna_base(residue_name: &str) -> Option<&'static [&'static str]> {
    if DNA_RESIDUES.contains(residue_name) {
        NUCLEIC_BASES.get(residue_name).copied()
    } else {
        None
    }
}

fn bond_within(prev: &Residue, from: &str, next: &Residue, to: &str, max_length: f64) -> bool {
    match (prev.position(from), next.position(to)) {
        (Some(a), Some(b)) => (a - b).norm() <= max_length,
        _ => false,
    }
}

fn protein_connected(prev: &Residue, next: &Residue) -> bool {
    bond_within(prev, "C", next, "N", PEPTIDE_BOND_MAX_LENGTH)
}

fn nucleic_connected(prev: &Residue, next: &Residue) -> bool {
    bond_within(prev, "O3'", next, "P", PHOSPHODIESTER_BOND_MAX_LENGTH)
}

fn centroid_of(residue: &Residue, names: &[&str]) -> Option<Point3<f64>> {
    let points: Option<Vec<Point3<f64>>> = names.iter().map(|name| residue.position(name)).collect();
    centroid(&points?)
}

fn protein_virtual_position(residue: &Residue, atom: VirtualAtom) -> Option<Point3<f64>> {
    match atom {
        VirtualAtom::SideChainCentroid => match protein_side_chain(&residue.name) {
            Some([]) => residue.position("CA"),
            Some(side_chain) => centroid_of(residue, side_chain),
            None => None,
        },
        VirtualAtom::BackboneCentroid => centroid_of(residue, BACKBONE_CENTROID_ATOMS),
        _ => None,
    }
}

fn nucleic_virtual_position(residue: &Residue, atom: VirtualAtom) -> Option<Point3<f64>> {
    match atom {
        VirtualAtom::BaseCentroid => centroid_of(residue, NUCLEIC_BASES.get(residue.name.as_str())?),
        VirtualAtom::RiboseCentroid => centroid_of(residue, RIBOSE_ATOMS),
        VirtualAtom::PhosphateCentroid => centroid_of(residue, PHOSPHATE_ATOMS),
        _ => None,
    }
}

fn protein_known_atom(name: &str) -> bool {
    PROTEIN_ATOMS.contains(name)
}

fn nucleic_known_atom(name: &str) -> bool {
    NUCLEIC_ATOMS.contains(name)
}
