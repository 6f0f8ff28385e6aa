//! Provides input/output functionality for structure file formats.
//!
//! The engine reads and writes structures through the [`traits::StructureFile`]
//! trait only. [`pdb::PdbFile`] is the bundled implementation for the
//! fixed-column PDB format.

pub mod pdb;
pub mod traits;
