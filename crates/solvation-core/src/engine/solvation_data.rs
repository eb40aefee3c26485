use super::error::EngineError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One coordinated solvent residue in the shell of one solute atom at one frame.
///
/// `atom_ix` is the residue's atom closest to the solute and `dist` its distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolvationRecord {
    pub frame: usize,
    /// Position of the solute atom within the solute group.
    pub solute_ix: usize,
    pub atom_ix: usize,
    pub dist: f64,
    pub res_name: String,
    pub res_ix: usize,
}

/// Shell composition: number of residues of each solvent, keyed by solvent name.
pub type ShellComposition = BTreeMap<String, usize>;

/// The complete solvation shell table of a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvationData {
    records: Vec<SolvationRecord>,
    n_frames: usize,
    n_solutes: usize,
    solvent_names: Vec<String>,
}

impl SolvationData {
    /// Wraps shell records; records are sorted by frame, solute, solvent and residue.
    ///
    /// `solvent_names` should list every solvent of the solution, coordinated or not.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRecord`] for a record whose frame or solute index is
    /// out of range, and [`EngineError::UnknownSolvent`] for a record naming a solvent
    /// missing from `solvent_names`.
    pub fn new(
        mut records: Vec<SolvationRecord>,
        n_frames: usize,
        n_solutes: usize,
        mut solvent_names: Vec<String>,
    ) -> Result<Self, EngineError> {
        solvent_names.sort();
        solvent_names.dedup();
        for r in &records {
            if r.frame >= n_frames || r.solute_ix >= n_solutes {
                return Err(EngineError::InvalidRecord {
                    frame: r.frame,
                    solute_ix: r.solute_ix,
                    n_frames,
                    n_solutes,
                });
            }
            if solvent_names.binary_search(&r.res_name).is_err() {
                return Err(EngineError::UnknownSolvent(r.res_name.clone()));
            }
        }
        records.sort_by(|a, b| {
            (a.frame, a.solute_ix, &a.res_name, a.res_ix)
                .cmp(&(b.frame, b.solute_ix, &b.res_name, b.res_ix))
        });
        Ok(Self {
            records,
            n_frames,
            n_solutes,
            solvent_names,
        })
    }

    pub fn records(&self) -> &[SolvationRecord] {
        &self.records
    }

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    pub fn n_solutes(&self) -> usize {
        self.n_solutes
    }

    /// Every solvent name of the solution, sorted, including never-coordinated ones.
    pub fn solvent_names(&self) -> &[String] {
        &self.solvent_names
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Composition of every non-empty shell, keyed by `(frame, solute_ix)`.
    ///
    /// Each composition lists every solvent name, with zero for absent solvents.
    pub fn shell_compositions(&self) -> BTreeMap<(usize, usize), ShellComposition> {
        let empty: ShellComposition = self
            .solvent_names
            .iter()
            .map(|name| (name.clone(), 0))
            .collect();
        let mut shells: BTreeMap<(usize, usize), ShellComposition> = BTreeMap::new();
        for r in &self.records {
            let shell = shells
                .entry((r.frame, r.solute_ix))
                .or_insert_with(|| empty.clone());
            *shell.entry(r.res_name.clone()).or_insert(0) += 1;
        }
        shells
    }

    /// Distinct `(frame, res_ix)` pairs of coordinated residues, per solvent.
    pub fn coordinated_residues(&self) -> BTreeMap<&str, BTreeSet<(usize, usize)>> {
        let mut coordinated: BTreeMap<&str, BTreeSet<(usize, usize)>> = BTreeMap::new();
        for r in &self.records {
            coordinated
                .entry(r.res_name.as_str())
                .or_default()
                .insert((r.frame, r.res_ix));
        }
        coordinated
    }

    /// A copy restricted to the given solvents.
    pub fn filter_solvents(&self, solvents: &[String]) -> SolvationData {
        let records = self
            .records
            .iter()
            .filter(|r| solvents.contains(&r.res_name))
            .cloned()
            .collect();
        let mut names: Vec<String> = self
            .solvent_names
            .iter()
            .filter(|n| solvents.contains(n))
            .cloned()
            .collect();
        names.sort();
        SolvationData {
            records,
            n_frames: self.n_frames,
            n_solutes: self.n_solutes,
            solvent_names: names,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn record(
        frame: usize,
        solute_ix: usize,
        res_name: &str,
        res_ix: usize,
    ) -> SolvationRecord {
        SolvationRecord {
            frame,
            solute_ix,
            atom_ix: res_ix * 10,
            dist: 2.0,
            res_name: res_name.to_string(),
            res_ix,
        }
    }

    pub fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{names, record};
    use super::*;

    fn sample_data() -> SolvationData {
        SolvationData::new(
            vec![
                record(1, 0, "EC", 5),
                record(0, 1, "PF6", 9),
                record(0, 0, "EC", 4),
                record(0, 0, "EC", 5),
                record(0, 0, "PF6", 9),
            ],
            2,
            2,
            names(&["EC", "PF6", "DMC"]),
        )
        .unwrap()
    }

    #[test]
    fn records_are_sorted_by_frame_solute_and_residue() {
        let data = sample_data();
        let keys: Vec<_> = data
            .records()
            .iter()
            .map(|r| (r.frame, r.solute_ix, r.res_ix))
            .collect();
        assert_eq!(keys, vec![(0, 0, 4), (0, 0, 5), (0, 0, 9), (0, 1, 9), (1, 0, 5)]);
    }

    #[test]
    fn shell_compositions_include_zero_counts() {
        let shells = sample_data().shell_compositions();
        assert_eq!(shells.len(), 3);
        let shell = &shells[&(0, 0)];
        assert_eq!(shell["EC"], 2);
        assert_eq!(shell["PF6"], 1);
        assert_eq!(shell["DMC"], 0);
    }

    #[test]
    fn coordinated_residues_are_deduplicated_across_solutes() {
        let data = sample_data();
        let coordinated = data.coordinated_residues();
        assert_eq!(coordinated["PF6"].len(), 1);
        assert_eq!(coordinated["EC"].len(), 3);
    }

    #[test]
    fn filter_solvents_keeps_only_requested_names() {
        let filtered = sample_data().filter_solvents(&names(&["PF6"]));
        assert_eq!(filtered.records().len(), 2);
        assert_eq!(filtered.solvent_names(), &["PF6".to_string()]);
        assert_eq!(filtered.n_frames(), 2);
    }

    #[test]
    fn new_rejects_records_outside_the_frame_range() {
        let result = SolvationData::new(vec![record(5, 0, "EC", 4)], 2, 1, names(&["EC"]));

        assert!(matches!(
            result,
            Err(EngineError::InvalidRecord {
                frame: 5,
                solute_ix: 0,
                n_frames: 2,
                n_solutes: 1,
            })
        ));
    }

    #[test]
    fn new_rejects_records_outside_the_solute_range() {
        let result = SolvationData::new(vec![record(0, 3, "EC", 4)], 2, 2, names(&["EC"]));

        assert!(matches!(
            result,
            Err(EngineError::InvalidRecord { solute_ix: 3, .. })
        ));
    }

    #[test]
    fn new_rejects_records_of_unlisted_solvents() {
        let result = SolvationData::new(vec![record(0, 0, "DMC", 4)], 1, 1, names(&["EC"]));

        assert!(matches!(result, Err(EngineError::UnknownSolvent(name)) if name == "DMC"));
    }
}
