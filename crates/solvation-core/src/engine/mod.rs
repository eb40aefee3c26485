//! # Engine Module
//!
//! The engine turns a trajectory and a set of atom selections into `SolvationData`,
//! the table every downstream analysis is derived from.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Cutoff radii, requested analyses, network solvents
//!   and the trajectory timestep, assembled through a validating builder
//! - **Shell Detection** ([`shell`]) - Frame-parallel search for the solvents inside each
//!   solute's cutoff sphere
//! - **Solvation Data** ([`solvation_data`]) - The resulting per-frame, per-solute records
//!   and the grouped views analyses consume
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-level error types

pub mod config;
pub mod error;
pub mod progress;
pub mod shell;
pub mod solvation_data;
