//! # Core Models Module
//!
//! Data structures describing the simulated system and the atoms of interest.
//!
//! - [`atom`] - Static per-atom properties (name, type, owning residue)
//! - [`topology`] - Atoms grouped into residues, constant across a trajectory
//! - [`frame`] - Coordinates of one snapshot and its optional periodic box
//! - [`trajectory`] - A topology plus an ordered sequence of frames
//! - [`selection`] - Property filters that turn a topology into an [`selection::AtomGroup`]
//!
//! ## Usage
//!
//! ```ignore
//! use solvation::core::models::selection::Selection;
//!
//! let li = Selection::atom_type("22").select(trajectory.topology())?;
//! let pf6 = Selection::atom_type("21").by_residue().select(trajectory.topology())?;
//! ```

pub mod atom;
pub mod frame;
pub mod selection;
pub mod topology;
pub mod trajectory;
