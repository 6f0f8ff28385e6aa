//! # Workflows Module
//!
//! File-level entry points tying the [`crate::engine`] to a
//! [`crate::core::io::traits::StructureFile`] format.
//!
//! - **Build Workflow** ([`build`]) - Read a structure, build descriptors for
//!   every model and write them with a manifest.
//! - **Compare Workflow** ([`compare`]) - Compare one query descriptor with many
//!   target descriptors, writing aligned targets and a CSV report.
//!
//! Both workflows report progress through a
//! [`crate::engine::progress::ProgressReporter`] and log a completion line for
//! every unit of work.

pub mod build;
pub mod compare;
