//! # solvation Core Library
//!
//! A library for characterizing the solvation structure of solutes (typically ions)
//! in molecular-dynamics trajectories: who sits in each solvation shell, how long
//! solvents stay there, and how solutes and solvents link up into networks.
//!
//! ## Architectural Philosophy
//!
//! The library follows a layered design, each layer depending only on the ones below it.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Topology`, `Trajectory`,
//!   `AtomGroup`), trajectory I/O, and numerical utilities such as minimum-image
//!   geometry, autocovariance and curve fitting.
//!
//! - **[`engine`]: The Shell Detector.** Configuration, error types, progress reporting
//!   and the frame-parallel detection of solvation shells that produces `SolvationData`.
//!
//! - **[`analysis`]: The Derived Views.** Speciation, coordination, pairing, residence
//!   time and networking analyses, each built from `SolvationData`.
//!
//! - **[`workflows`]: The Public API.** The `Solution` type, which ties selections,
//!   configuration and analyses together behind a `new` → `run` → read-results flow,
//!   plus CSV export of every result table.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod workflows;
