//! Provides input/output functionality for trajectory file formats.
//!
//! Trajectories are read through the [`traits::TrajectoryFile`] interface; the
//! annotated XYZ format in [`xyz`] is the built-in implementation.

pub mod traits;
pub mod xyz;
