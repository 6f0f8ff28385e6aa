use phf::{Map, Set, phf_map, phf_set};

pub const PROTEIN_BACKBONE: &[&str] = &["N", "CA", "C", "O"];

pub const RNA_BACKBONE: &[&str] = &[
    "O5'", "C5'", "C4'", "O4'", "C3'", "O3'", "C1'", "C2'", "O2'",
];

pub const DNA_BACKBONE: &[&str] = &["O5'", "C5'", "C4'", "O4'", "C3'", "O3'", "C1'", "C2'"];

pub const BACKBONE_CENTROID_ATOMS: &[&str] = &["N", "CA", "C"];
pub const RIBOSE_ATOMS: &[&str] = &["C1'", "C2'", "C3'", "C4'", "O4'"];
pub const PHOSPHATE_ATOMS: &[&str] = &["P", "OP1", "OP2"];

#[rustfmt::skip]
pub static PROTEIN_SIDE_CHAINS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "ALA" => &["CB"],
    "ARG" => &["CB", "CG", "CD", "NE", "CZ", "NH1", "NH2"],
    "ASN" => &["CB", "CG", "OD1", "ND2"],
    "ASP" => &["CB", "CG", "OD1", "OD2"],
    "CYS" => &["CB", "SG"],
    "GLN" => &["CB", "CG", "CD", "OE1", "NE2"],
    "GLU" => &["CB", "CG", "CD", "OE1", "OE2"],
    "GLY" => &[],
    "HIS" => &["CB", "CG", "ND1", "CD2", "CE1", "NE2"],
    "ILE" => &["CB", "CG1", "CG2", "CD1"],
    "LEU" => &["CB", "CG", "CD1", "CD2"],
    "LYS" => &["CB", "CG", "CD", "CE", "NZ"],
    "MET" => &["CB", "CG", "SD", "CE"],
    "MSE" => &["CB", "CG", "SE", "CE"],
    "PHE" => &["CB", "CG", "CD1", "CD2", "CE1", "CE2", "CZ"],
    "PRO" => &["CB", "CG", "CD"],
    "SER" => &["CB", "OG"],
    "THR" => &["CB", "OG1", "CG2"],
    "TRP" => &["CB", "CG", "CD1", "CD2", "NE1", "CE2", "CE3", "CZ2", "CZ3", "CH2"],
    "TYR" => &["CB", "CG", "CD1", "CD2", "CE1", "CE2", "CZ", "OH"],
    "VAL" => &["CB", "CG1", "CG2"],
};

#[rustfmt::skip]
pub static NUCLEIC_BASES: Map<&'static str, &'static [&'static str]> = phf_map! {
    // --- Purines ---
    "A"  => &["N9", "C8", "N7", "C5", "C6", "N6", "N1", "C2", "N3", "C4"],
    "DA" => &["N9", "C8", "N7", "C5", "C6", "N6", "N1", "C2", "N3", "C4"],
    "G"  => &["N9", "C8", "N7", "C5", "C6", "O6", "N1", "C2", "N2", "N3", "C4"],
    "DG" => &["N9", "C8", "N7", "C5", "C6", "O6", "N1", "C2", "N2", "N3", "C4"],

    // --- Pyrimidines ---
    "C"  => &["N1", "C2", "O2", "N3", "C4", "N4", "C5", "C6"],
    "DC" => &["N1", "C2", "O2", "N3", "C4", "N4", "C5", "C6"],
    "U"  => &["N1", "C2", "O2", "N3", "C4", "O4", "C5", "C6"],
    "DT" => &["N1", "C2", "O2", "N3", "C4", "O4", "C5", "C7", "C6"],
};

pub static RNA_RESIDUES: Set<&'static str> = phf_set! { "A", "C", "G", "U" };
pub static DNA_RESIDUES: Set<&'static str> = phf_set! { "DA", "DC", "DG", "DT" };

#[rustfmt::skip]
pub static PROTEIN_ATOMS: Set<&'static str> = phf_set! {
    // --- Backbone ---
    "N", "CA", "C", "O", "OXT", "H", "HA",
    // --- Side chains ---
    "CB", "CG", "CG1", "CG2", "CD", "CD1", "CD2",
    "CE", "CE1", "CE2", "CE3", "CZ", "CZ2", "CZ3", "CH2",
    "ND1", "ND2", "NE", "NE1", "NE2", "NH1", "NH2", "NZ",
    "OD1", "OD2", "OE1", "OE2", "OG", "OG1", "OH",
    "SD", "SG", "SE",
};

#[rustfmt::skip]
pub static NUCLEIC_ATOMS: Set<&'static str> = phf_set! {
    // --- Phosphate ---
    "P", "OP1", "OP2", "OP3",
    // --- Sugar ---
    "O5'", "C5'", "C4'", "O4'", "C3'", "O3'", "C2'", "O2'", "C1'",
    // --- Bases ---
    "N1", "C2", "O2", "N2", "N3", "C4", "O4", "N4", "C5", "C6",
    "O6", "N6", "N7", "C7", "C8", "N9",
};

#[rustfmt::skip]
pub static ATOM_NAME_ALIASES: Map<&'static str, &'static str> = phf_map! {
    // --- Phosphate oxygens (PDB v2 naming) ---
    "O1P" => "OP1", "O2P" => "OP2", "O3P" => "OP3",

    // --- Sugar atoms with asterisk primes ---
    "C1*" => "C1'", "C2*" => "C2'", "C3*" => "C3'", "C4*" => "C4'", "C5*" => "C5'",
    "O2*" => "O2'", "O3*" => "O3'", "O4*" => "O4'", "O5*" => "O5'",

    // --- C-Terminus ---
    "OT1" => "O", "OT2" => "OXT",
};
