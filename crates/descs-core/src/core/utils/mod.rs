//! Numerical helpers shared by the engine: centroids, RMSD and rigid-body
//! superposition.

pub mod geometry;
