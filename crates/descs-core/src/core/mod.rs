//! # Core Module
//!
//! Stateless building blocks of the descriptor library.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Models, chains, residues and atoms
//! - **Residue Knowledge** ([`topology`]) - Per-molecule-type capability tables
//! - **Contact Predicates** ([`contact`]) - Parsing and evaluation of contact expressions
//! - **File I/O** ([`io`]) - Reading and writing structure files
//! - **Geometry** ([`utils`]) - Centroids, RMSD and rigid-body superposition

pub mod contact;
pub mod io;
pub mod models;
pub mod topology;
pub mod utils;
