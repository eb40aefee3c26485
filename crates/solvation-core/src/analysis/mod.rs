//! # Analysis Module
//!
//! Secondary analyses derived from [`crate::engine::solvation_data::SolvationData`].
//!
//! Every analysis can be built two ways with identical results: eagerly, by listing it in
//! `SolutionConfig::analyses` before `Solution::run`, or afterwards through its
//! `from_solution` constructor.
//!
//! - [`speciation`] - Shell compositions, their frequencies and solvent co-occurrence
//! - [`coordination`] - Species-species coordination numbers and coordinating atom types
//! - [`pairing`] - Fraction of solutes paired with each solvent, free solvent, diluent
//! - [`residence`] - Solvent residence times from coordination autocovariance
//! - [`networking`] - Solute–solvent clusters linked through shared coordination

pub mod coordination;
pub mod networking;
pub mod pairing;
pub mod residence;
pub mod speciation;

/// `numerator / denominator`, or zero when the denominator is zero.
pub(crate) fn fraction(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
