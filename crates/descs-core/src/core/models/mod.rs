//! # Core Models Module
//!
//! In-memory representation of macromolecular structures consumed by the
//! descriptor engine.
//!
//! ## Overview
//!
//! A [`structure::Structure`] is an ordered list of models, each model an
//! ordered list of chains, each chain an ordered list of residues holding named
//! atoms. The hierarchy is plain owned data: the engine never mutates a loaded
//! structure, it clones the parts it needs (complete residues of one model, a
//! descriptor about to be superposed).
//!
//! ## Key Components
//!
//! - [`atom`] - Named atom with 3D coordinates
//! - [`residue`] - Residue with canonical atom lookup and molecule type tag
//! - [`chain`] - Ordered residues of one chain
//! - [`structure`] - Models and the structure container
//! - [`builder`] - Incremental construction used by file readers
//!
//! ## Usage
//!
//! ```ignore
//! use descs::core::models::{atom::Atom, builder::StructureBuilder};
//!
//! let mut builder = StructureBuilder::new();
//! builder
//!     .start_model(1)
//!     .start_chain('A')
//!     .start_residue(1, None, "ALA")
//!     .add_atom(Atom::new("CA", Point3::origin()));
//! let structure = builder.build();
//! ```

pub mod atom;
pub mod builder;
pub mod chain;
pub mod residue;
pub mod structure;
