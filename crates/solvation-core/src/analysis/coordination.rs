use super::fraction;
use crate::core::models::topology::Topology;
use crate::engine::error::EngineError;
use crate::engine::solvation_data::SolvationData;
use crate::workflows::solution::Solution;
use serde::Serialize;
use std::collections::BTreeMap;

/// Atom types contributing less than this fraction of a solvent's contacts are dropped.
const COORDINATING_ATOM_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatingAtom {
    pub res_name: String,
    pub atom_type: String,
    /// Share of this solvent's coordinating contacts made through this atom type.
    pub fraction: f64,
}

/// Species-species coordination numbers.
///
/// The coordination number of a solvent is the mean number of its residues found in a
/// solute's shell, averaged over every solute and frame. This equals integrating the
/// solute-solvent RDF up to the cutoff radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordination {
    coordination_numbers: BTreeMap<String, f64>,
    by_frame: BTreeMap<String, Vec<f64>>,
    coordinating_atoms: Vec<CoordinatingAtom>,
}

impl Coordination {
    pub fn new(data: &SolvationData, topology: &Topology) -> Self {
        let n_frames = data.n_frames();
        let n_solutes = data.n_solutes() as f64;

        let mut by_frame: BTreeMap<String, Vec<f64>> = data
            .solvent_names()
            .iter()
            .map(|name| (name.clone(), vec![0.0; n_frames]))
            .collect();
        for r in data.records() {
            if let Some(series) = by_frame.get_mut(&r.res_name) {
                series[r.frame] += 1.0;
            }
        }
        for series in by_frame.values_mut() {
            for value in series.iter_mut() {
                *value = fraction(*value, n_solutes);
            }
        }

        let coordination_numbers = by_frame
            .iter()
            .map(|(name, series)| {
                let mean = fraction(series.iter().sum(), n_frames as f64);
                (name.clone(), mean)
            })
            .collect();

        Self {
            coordination_numbers,
            by_frame,
            coordinating_atoms: coordinating_atoms(data, topology),
        }
    }

    pub fn from_solution(solution: &Solution) -> Result<Self, EngineError> {
        Ok(Self::new(solution.solvation_data()?, solution.topology()))
    }

    /// Mean coordination number of each solvent.
    pub fn coordination_numbers(&self) -> &BTreeMap<String, f64> {
        &self.coordination_numbers
    }

    /// Coordination number of each solvent in each frame.
    pub fn by_frame(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.by_frame
    }

    pub fn coordinating_atoms(&self) -> &[CoordinatingAtom] {
        &self.coordinating_atoms
    }
}

fn coordinating_atoms(data: &SolvationData, topology: &Topology) -> Vec<CoordinatingAtom> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for r in data.records() {
        let Some(atom) = topology.atom(r.atom_ix) else {
            continue;
        };
        *counts
            .entry((r.res_name.as_str(), atom.atom_type.as_str()))
            .or_insert(0) += 1;
        *totals.entry(r.res_name.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((res_name, atom_type), count)| CoordinatingAtom {
            res_name: res_name.to_string(),
            atom_type: atom_type.to_string(),
            fraction: fraction(count as f64, totals[res_name] as f64),
        })
        .filter(|a| a.fraction > COORDINATING_ATOM_TOLERANCE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::engine::solvation_data::SolvationRecord;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn topology() -> Topology {
        Topology::new(vec![
            Atom::new("Li", "22", "LI", 0),
            Atom::new("Li", "22", "LI", 1),
            Atom::new("O1", "3", "EC", 2),
            Atom::new("O2", "4", "EC", 2),
            Atom::new("O1", "3", "EC", 3),
            Atom::new("O2", "4", "EC", 3),
            Atom::new("F1", "21", "PF6", 4),
        ])
        .unwrap()
    }

    fn contact(
        frame: usize,
        solute_ix: usize,
        atom_ix: usize,
        res_name: &str,
        res_ix: usize,
    ) -> SolvationRecord {
        SolvationRecord {
            frame,
            solute_ix,
            atom_ix,
            dist: 2.0,
            res_name: res_name.to_string(),
            res_ix,
        }
    }

    fn sample_data() -> SolvationData {
        SolvationData::new(
            vec![
                contact(0, 0, 2, "EC", 2),
                contact(0, 0, 4, "EC", 3),
                contact(0, 1, 5, "EC", 3),
                contact(1, 0, 2, "EC", 2),
                contact(1, 1, 6, "PF6", 4),
            ],
            2,
            2,
            vec!["EC".to_string(), "PF6".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn coordination_numbers_average_over_solutes_and_frames() {
        let coordination = Coordination::new(&sample_data(), &topology());
        let cn = coordination.coordination_numbers();

        assert!(f64_approx_equal(cn["EC"], 4.0 / 4.0));
        assert!(f64_approx_equal(cn["PF6"], 1.0 / 4.0));
    }

    #[test]
    fn coordination_by_frame_is_normalized_per_solute() {
        let coordination = Coordination::new(&sample_data(), &topology());
        let ec = &coordination.by_frame()["EC"];

        assert_eq!(ec.len(), 2);
        assert!(f64_approx_equal(ec[0], 1.5));
        assert!(f64_approx_equal(ec[1], 0.5));
    }

    #[test]
    fn coordinating_atom_fractions_sum_to_one_per_solvent() {
        let coordination = Coordination::new(&sample_data(), &topology());
        let atoms = coordination.coordinating_atoms();

        let ec_type_3 = atoms
            .iter()
            .find(|a| a.res_name == "EC" && a.atom_type == "3")
            .unwrap();
        assert!(f64_approx_equal(ec_type_3.fraction, 0.75));

        let ec_total: f64 = atoms
            .iter()
            .filter(|a| a.res_name == "EC")
            .map(|a| a.fraction)
            .sum();
        assert!(f64_approx_equal(ec_total, 1.0));
    }

    #[test]
    fn rare_coordinating_atom_types_are_dropped() {
        let mut records: Vec<SolvationRecord> = (0..300)
            .map(|frame| contact(frame, 0, 2, "EC", 2))
            .collect();
        records.push(contact(0, 1, 5, "EC", 3));
        let data = SolvationData::new(records, 300, 2, vec!["EC".to_string()]).unwrap();

        let coordination = Coordination::new(&data, &topology());

        assert_eq!(coordination.coordinating_atoms().len(), 1);
        assert_eq!(coordination.coordinating_atoms()[0].atom_type, "3");
    }
}
