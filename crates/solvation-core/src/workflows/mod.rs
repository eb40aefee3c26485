//! # Workflows Module
//!
//! The public entry points of the library.
//!
//! - **Solution** ([`solution`]) - Binds a topology, a solute selection, named solvent
//!   selections and a [`SolutionConfig`](crate::engine::config::SolutionConfig). Running it
//!   over a trajectory detects every solvation shell and computes the requested analyses.
//! - **Export** ([`export`]) - Writes shell records and analysis tables as CSV.

pub mod export;
pub mod solution;
