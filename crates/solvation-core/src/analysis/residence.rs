use crate::core::utils::fitting::{ExponentialDecay, fit_exponential_decay};
use crate::core::utils::statistics::{mean_series, sparse_autocovariance};
use crate::engine::error::EngineError;
use crate::engine::solvation_data::SolvationData;
use crate::workflows::solution::Solution;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::f64::consts::E;
use tracing::warn;

const INITIAL_GUESS: ExponentialDecay = ExponentialDecay {
    a: 1.0,
    b: 0.1,
    c: 0.01,
};

/// Solvent residence times.
///
/// For every solvent, each (solute, residue) pair that is coordinated at least once
/// contributes a 0/1 coordination series over the trajectory. The unbiased,
/// non-demeaned autocovariances of these series are averaged and normalized to one at
/// lag zero. Two estimates are derived from that curve:
///
/// - **cutoff**: the first lag at which it drops below 1/e;
/// - **fit**: `1/b` from a least-squares fit of `a * exp(-b * t) + c`.
///
/// Both are expressed in units of the trajectory timestep. An estimate that cannot be
/// made is NaN and a warning is logged; it is never negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Residence {
    cutoff_times: BTreeMap<String, f64>,
    fit_times: BTreeMap<String, f64>,
    fit_parameters: BTreeMap<String, Option<ExponentialDecay>>,
    autocovariances: BTreeMap<String, Vec<f64>>,
}

impl Residence {
    pub fn new(data: &SolvationData, timestep: f64) -> Self {
        let mut residence = Self {
            cutoff_times: BTreeMap::new(),
            fit_times: BTreeMap::new(),
            fit_parameters: BTreeMap::new(),
            autocovariances: BTreeMap::new(),
        };

        for name in data.solvent_names() {
            let Some(acf) = normalized_autocovariance(data, name) else {
                warn!(
                    "Solvent '{}' is never coordinated; its residence time is undefined (NaN).",
                    name
                );
                residence.cutoff_times.insert(name.clone(), f64::NAN);
                residence.fit_times.insert(name.clone(), f64::NAN);
                residence.fit_parameters.insert(name.clone(), None);
                residence.autocovariances.insert(name.clone(), Vec::new());
                continue;
            };

            let cutoff = cutoff_time(&acf, timestep).unwrap_or_else(|| {
                warn!(
                    "The autocovariance of '{}' does not decay below 1/e within the trajectory; \
                     its residence time is undefined (NaN).",
                    name
                );
                f64::NAN
            });
            let (fit_time, params) = fit_time(&acf, timestep, name);

            residence.cutoff_times.insert(name.clone(), cutoff);
            residence.fit_times.insert(name.clone(), fit_time);
            residence.fit_parameters.insert(name.clone(), params);
            residence.autocovariances.insert(name.clone(), acf);
        }
        residence
    }

    pub fn from_solution(solution: &Solution) -> Result<Self, EngineError> {
        Ok(Self::new(
            solution.solvation_data()?,
            solution.config().timestep,
        ))
    }

    /// Residence times from the 1/e crossing of the autocovariance.
    pub fn residence_times(&self) -> &BTreeMap<String, f64> {
        &self.cutoff_times
    }

    /// Residence times from the exponential fit.
    pub fn residence_times_fit(&self) -> &BTreeMap<String, f64> {
        &self.fit_times
    }

    pub fn fit_parameters(&self) -> &BTreeMap<String, Option<ExponentialDecay>> {
        &self.fit_parameters
    }

    /// Normalized mean autocovariance of each solvent, indexed by lag in frames.
    pub fn autocovariances(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.autocovariances
    }
}

fn normalized_autocovariance(data: &SolvationData, solvent: &str) -> Option<Vec<f64>> {
    // Records are sorted by frame, so each pair's frames arrive in order.
    let mut contacts: BTreeMap<(usize, usize), Vec<(usize, f64)>> = BTreeMap::new();
    for r in data.records().iter().filter(|r| r.res_name == solvent) {
        contacts
            .entry((r.solute_ix, r.res_ix))
            .or_default()
            .push((r.frame, 1.0));
    }
    let acovs: Vec<Vec<f64>> = contacts
        .par_iter()
        .map(|(_, frames)| sparse_autocovariance(frames, data.n_frames()))
        .collect();
    let acf = mean_series(&acovs)?;
    let first = *acf.first()?;
    if first <= 0.0 {
        return None;
    }
    Some(acf.into_iter().map(|v| v / first).collect())
}

fn cutoff_time(acf: &[f64], timestep: f64) -> Option<f64> {
    acf.iter()
        .position(|&v| v < 1.0 / E)
        .map(|lag| lag as f64 * timestep)
}

fn fit_time(acf: &[f64], timestep: f64, name: &str) -> (f64, Option<ExponentialDecay>) {
    let lags: Vec<f64> = (0..acf.len()).map(|lag| lag as f64).collect();
    match fit_exponential_decay(&lags, acf, INITIAL_GUESS) {
        Ok(params) if params.b.is_finite() && params.b > 0.0 => (timestep / params.b, Some(params)),
        Ok(params) => {
            warn!(
                "Exponential fit for '{}' gave a non-positive decay rate ({}); \
                 its fitted residence time is undefined (NaN).",
                name, params.b
            );
            (f64::NAN, Some(params))
        }
        Err(e) => {
            warn!(
                "Exponential fit for '{}' failed: {}; its fitted residence time is undefined (NaN).",
                name, e
            );
            (f64::NAN, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::solvation_data::test_support::{names, record};

    const TOLERANCE: f64 = 1e-9;

    fn is_nan_or_non_negative(v: f64) -> bool {
        v.is_nan() || v >= 0.0
    }

    // EC residue 10 sits in the shell of solute 0 for frames 0..3 of 10.
    // acov = [3/10, 2/9, 1/8, 0, ...] -> normalized [1, 0.741, 0.417, 0, ...]
    fn transient_data() -> SolvationData {
        SolvationData::new(
            (0..3).map(|frame| record(frame, 0, "EC", 10)).collect(),
            10,
            1,
            names(&["EC", "PF6"]),
        )
        .unwrap()
    }

    #[test]
    fn cutoff_time_is_first_lag_below_inverse_e() {
        let residence = Residence::new(&transient_data(), 2.0);

        assert!((residence.residence_times()["EC"] - 6.0).abs() < TOLERANCE);
        let acf = &residence.autocovariances()["EC"];
        assert_eq!(acf.len(), 10);
        assert!((acf[0] - 1.0).abs() < TOLERANCE);
        assert!((acf[1] - (2.0 / 9.0) / 0.3).abs() < TOLERANCE);
    }

    #[test]
    fn never_coordinated_solvent_is_nan() {
        let residence = Residence::new(&transient_data(), 1.0);

        assert!(residence.residence_times()["PF6"].is_nan());
        assert!(residence.residence_times_fit()["PF6"].is_nan());
        assert!(residence.fit_parameters()["PF6"].is_none());
    }

    #[test]
    fn permanently_coordinated_solvent_does_not_decay() {
        let data = SolvationData::new(
            (0..20).map(|frame| record(frame, 0, "EC", 10)).collect(),
            20,
            1,
            names(&["EC"]),
        )
        .unwrap();
        let residence = Residence::new(&data, 1.0);

        assert!(residence.residence_times()["EC"].is_nan());
        assert!(is_nan_or_non_negative(residence.residence_times_fit()["EC"]));
    }

    #[test]
    fn residence_times_are_never_negative() {
        let records = (0..40)
            .flat_map(|frame| {
                let mut shell = vec![record(frame, 0, "EC", 10 + (frame / 4) % 3)];
                if frame % 7 < 3 {
                    shell.push(record(frame, 1, "PF6", 30));
                }
                shell
            })
            .collect();
        let data = SolvationData::new(records, 40, 2, names(&["EC", "PF6"])).unwrap();
        let residence = Residence::new(&data, 0.5);

        for (name, time) in residence
            .residence_times()
            .iter()
            .chain(residence.residence_times_fit())
        {
            assert!(is_nan_or_non_negative(*time), "{} has negative residence {}", name, time);
        }
        assert!(residence.residence_times()["EC"] > 0.0);
    }
}
