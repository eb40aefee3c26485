//! # Core Module
//!
//! Fundamental building blocks shared by every analysis in the library.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, topologies, frames,
//!   periodic boxes, trajectories and atom selections
//! - **File I/O** ([`io`]) - Reading/writing annotated XYZ trajectories and exporting
//!   result tables as CSV
//! - **Numerics** ([`utils`]) - Minimum-image geometry, autocovariance estimation and
//!   nonlinear least-squares fitting

pub mod io;
pub mod models;
pub mod utils;
