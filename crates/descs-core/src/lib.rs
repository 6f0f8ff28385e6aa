//! # descs Core Library
//!
//! Contact-based structural descriptors of proteins and nucleic acids: windows
//! of consecutive residues annotated with a user-defined contact predicate,
//! and their comparison by optimal residue correspondence and superposition.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`,
//!   `Residue`), per-molecule-type capability tables, the contact expression
//!   language, geometry helpers and structure file I/O.
//!
//! - **[`engine`]: The Logic Core.** Gap-aware residue windows, the radix
//!   residue index, the parallel descriptor builder and the descriptor
//!   comparator with its Hungarian assignment and pluggable verdict.
//!
//! - **[`workflows`]: The Public API.** File-to-file procedures for building
//!   descriptors from a structure and comparing descriptor files.

pub mod core;
pub mod engine;
pub mod workflows;
