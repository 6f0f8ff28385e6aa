//! # Engine Module
//!
//! Descriptor extraction and comparison on top of the [`crate::core`] models.
//!
//! ## Overview
//!
//! Building walks every model of a structure independently:
//!
//! 1. the model is filtered to complete residues of one molecule type;
//! 2. a [`gaps::GapsDistribution`] marks which residues can center a full
//!    window of connected residues;
//! 3. a [`index::ResidueIndex`] gives flat, radix-encoded access to residues;
//! 4. the [`builder::DescriptorBuilder`] evaluates the contact expression for
//!    every residue pair of every window on an [`pool::EvaluatorPool`] and
//!    keeps the [`descriptor::Descriptor`]s accepted by a
//!    [`filter::DescriptorFilter`].
//!
//! Comparison ([`comparator::DescriptorComparator`]) partitions descriptors
//! into duplexes, finds the cheapest duplex correspondence with the Hungarian
//! method ([`assignment`]), superposes the matched residues and asks a
//! [`verifier::SimilarityVerifier`] for the verdict.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated build and comparison parameters
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine error taxonomy wrapping the lower layers

pub mod assignment;
pub mod builder;
pub mod comparator;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod gaps;
pub mod index;
pub mod pool;
pub mod progress;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;
