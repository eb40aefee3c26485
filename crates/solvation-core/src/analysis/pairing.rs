use super::fraction;
use crate::engine::error::EngineError;
use crate::engine::solvation_data::SolvationData;
use crate::workflows::solution::Solution;
use std::collections::{BTreeMap, BTreeSet};

/// Solute–solvent pairing statistics.
///
/// A solute is paired with a solvent when at least one residue of that solvent is in its
/// shell. A solvent residue is free when it is in no solute's shell. The diluent is the
/// set of free solvent residues; its composition is the share of each solvent in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pairing: BTreeMap<String, f64>,
    pairing_by_frame: BTreeMap<String, Vec<f64>>,
    free_solvent: BTreeMap<String, f64>,
    diluent_composition: BTreeMap<String, f64>,
    diluent_by_frame: BTreeMap<String, Vec<f64>>,
}

impl Pairing {
    /// # Arguments
    ///
    /// * `data` - Solvation data of the solution.
    /// * `solvent_residues` - Number of residues of each solvent in the system.
    pub fn new(data: &SolvationData, solvent_residues: &BTreeMap<String, usize>) -> Self {
        let n_frames = data.n_frames();
        let names = data.solvent_names();

        let mut paired: BTreeMap<&str, BTreeSet<(usize, usize)>> = BTreeMap::new();
        for r in data.records() {
            paired
                .entry(r.res_name.as_str())
                .or_default()
                .insert((r.frame, r.solute_ix));
        }

        let mut pairing_by_frame = BTreeMap::new();
        let mut pairing = BTreeMap::new();
        for name in names {
            let mut series = vec![0.0; n_frames];
            for &(frame, _) in paired.get(name.as_str()).into_iter().flatten() {
                series[frame] += 1.0;
            }
            series
                .iter_mut()
                .for_each(|v| *v = fraction(*v, data.n_solutes() as f64));
            pairing.insert(name.clone(), mean(&series));
            pairing_by_frame.insert(name.clone(), series);
        }

        let coordinated = data.coordinated_residues();
        let mut coordinated_by_frame: BTreeMap<&str, Vec<f64>> = names
            .iter()
            .map(|name| (name.as_str(), vec![0.0; n_frames]))
            .collect();
        for (name, residues) in &coordinated {
            if let Some(series) = coordinated_by_frame.get_mut(name) {
                for &(frame, _) in residues {
                    series[frame] += 1.0;
                }
            }
        }

        let total_of = |name: &str| solvent_residues.get(name).copied().unwrap_or(0) as f64;

        let free_solvent = names
            .iter()
            .map(|name| {
                let mean_coordinated = mean(&coordinated_by_frame[name.as_str()]);
                let free = 1.0 - fraction(mean_coordinated, total_of(name));
                (name.clone(), free)
            })
            .collect();

        let mut diluent_by_frame: BTreeMap<String, Vec<f64>> = names
            .iter()
            .map(|name| (name.clone(), vec![0.0; n_frames]))
            .collect();
        for frame in 0..n_frames {
            let free_counts: Vec<f64> = names
                .iter()
                .map(|name| total_of(name) - coordinated_by_frame[name.as_str()][frame])
                .collect();
            let total_free: f64 = free_counts.iter().sum();
            for (name, free) in names.iter().zip(free_counts) {
                if let Some(series) = diluent_by_frame.get_mut(name) {
                    series[frame] = fraction(free, total_free);
                }
            }
        }
        let diluent_composition = diluent_by_frame
            .iter()
            .map(|(name, series)| (name.clone(), mean(series)))
            .collect();

        Self {
            pairing,
            pairing_by_frame,
            free_solvent,
            diluent_composition,
            diluent_by_frame,
        }
    }

    pub fn from_solution(solution: &Solution) -> Result<Self, EngineError> {
        Ok(Self::new(
            solution.solvation_data()?,
            &solution.solvent_residue_counts(),
        ))
    }

    /// Fraction of solutes paired with each solvent, averaged over frames.
    pub fn pairing(&self) -> &BTreeMap<String, f64> {
        &self.pairing
    }

    pub fn pairing_by_frame(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.pairing_by_frame
    }

    /// Fraction of each solvent's residues that are in no solute's shell.
    pub fn free_solvent(&self) -> &BTreeMap<String, f64> {
        &self.free_solvent
    }

    pub fn diluent_composition(&self) -> &BTreeMap<String, f64> {
        &self.diluent_composition
    }

    pub fn diluent_by_frame(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.diluent_by_frame
    }
}

fn mean(values: &[f64]) -> f64 {
    fraction(values.iter().sum(), values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::solvation_data::test_support::{names, record};

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    // Two frames, two solutes, 4 EC residues and 2 PF6 residues.
    fn sample() -> (SolvationData, BTreeMap<String, usize>) {
        let data = SolvationData::new(
            vec![
                record(0, 0, "EC", 10),
                record(0, 0, "EC", 11),
                record(0, 1, "EC", 11),
                record(0, 1, "PF6", 20),
                record(1, 0, "EC", 12),
            ],
            2,
            2,
            names(&["EC", "PF6"]),
        )
        .unwrap();
        let counts = BTreeMap::from([("EC".to_string(), 4), ("PF6".to_string(), 2)]);
        (data, counts)
    }

    #[test]
    fn pairing_counts_each_solute_once_per_solvent() {
        let (data, counts) = sample();
        let pairing = Pairing::new(&data, &counts);

        assert!(f64_approx_equal(pairing.pairing()["EC"], 0.75));
        assert!(f64_approx_equal(pairing.pairing()["PF6"], 0.25));
        assert_eq!(pairing.pairing_by_frame()["EC"], vec![1.0, 0.5]);
    }

    #[test]
    fn free_solvent_excludes_shared_residues_once() {
        // EC: frame 0 has residues 10 and 11 coordinated, frame 1 has residue 12.
        // Mean coordinated 1.5 of 4 residues.
        let (data, counts) = sample();
        let pairing = Pairing::new(&data, &counts);

        assert!(f64_approx_equal(pairing.free_solvent()["EC"], 1.0 - 1.5 / 4.0));
        assert!(f64_approx_equal(pairing.free_solvent()["PF6"], 1.0 - 0.5 / 2.0));
    }

    #[test]
    fn diluent_composition_sums_to_one_each_frame() {
        // Frame 0 free: EC 2, PF6 1. Frame 1 free: EC 3, PF6 2.
        let (data, counts) = sample();
        let pairing = Pairing::new(&data, &counts);

        let ec = &pairing.diluent_by_frame()["EC"];
        let pf6 = &pairing.diluent_by_frame()["PF6"];
        assert!(f64_approx_equal(ec[0], 2.0 / 3.0));
        assert!(f64_approx_equal(ec[1], 3.0 / 5.0));
        for frame in 0..2 {
            assert!(f64_approx_equal(ec[frame] + pf6[frame], 1.0));
        }
        assert!(f64_approx_equal(
            pairing.diluent_composition()["EC"],
            (2.0 / 3.0 + 3.0 / 5.0) / 2.0
        ));
    }
}
