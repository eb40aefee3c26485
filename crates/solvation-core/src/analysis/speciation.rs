use super::fraction;
use crate::engine::error::EngineError;
use crate::engine::solvation_data::{ShellComposition, SolvationData};
use crate::workflows::solution::Solution;
use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A distinct shell composition and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellFraction {
    pub composition: ShellComposition,
    pub count: usize,
    /// `count` divided by the number of solute instances (`n_frames * n_solutes`).
    pub fraction: f64,
}

/// Solvation shells organized by composition.
///
/// Only solute instances with at least one coordinated solvent have a shell.
#[derive(Debug, Clone, PartialEq)]
pub struct Speciation {
    solvent_names: Vec<String>,
    shells: BTreeMap<(usize, usize), ShellComposition>,
    shell_fractions: Vec<ShellFraction>,
    co_occurrence: DMatrix<f64>,
}

impl Speciation {
    pub fn new(data: &SolvationData) -> Self {
        let shells = data.shell_compositions();
        let solvent_names = data.solvent_names().to_vec();
        let instances = (data.n_frames() * data.n_solutes()) as f64;

        let mut counts: BTreeMap<&ShellComposition, usize> = BTreeMap::new();
        for composition in shells.values() {
            *counts.entry(composition).or_insert(0) += 1;
        }
        let mut shell_fractions: Vec<ShellFraction> = counts
            .into_iter()
            .map(|(composition, count)| ShellFraction {
                composition: composition.clone(),
                count,
                fraction: fraction(count as f64, instances),
            })
            .collect();
        shell_fractions.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.composition.cmp(&b.composition))
        });

        let co_occurrence = compute_co_occurrence(&shells, &solvent_names);
        debug!(
            "Speciation found {} distinct shell compositions.",
            shell_fractions.len()
        );

        Self {
            solvent_names,
            shells,
            shell_fractions,
            co_occurrence,
        }
    }

    pub fn from_solution(solution: &Solution) -> Result<Self, EngineError> {
        Ok(Self::new(solution.solvation_data()?))
    }

    /// Shell composition of every solvated solute, keyed by `(frame, solute_ix)`.
    pub fn shells(&self) -> &BTreeMap<(usize, usize), ShellComposition> {
        &self.shells
    }

    /// Distinct compositions, most frequent first.
    pub fn shell_fractions(&self) -> &[ShellFraction] {
        &self.shell_fractions
    }

    /// Fraction of solute instances whose shell matches `query`.
    ///
    /// Solvents not named in `query` are unconstrained: `[("EC", 4)]` matches shells with
    /// four EC and anything else. Name every solvent to pin down an exact shell.
    pub fn shell_fraction(&self, query: &[(&str, usize)]) -> Result<f64, EngineError> {
        self.validate_query(query)?;
        Ok(self
            .shell_fractions
            .iter()
            .filter(|s| matches_query(&s.composition, query))
            .map(|s| s.fraction)
            .sum())
    }

    /// Every `(frame, solute_ix)` whose shell matches `query`, with its composition.
    pub fn find_shells(
        &self,
        query: &[(&str, usize)],
    ) -> Result<Vec<(usize, usize, &ShellComposition)>, EngineError> {
        self.validate_query(query)?;
        Ok(self
            .shells
            .iter()
            .filter(|(_, composition)| matches_query(composition, query))
            .map(|(&(frame, solute_ix), composition)| (frame, solute_ix, composition))
            .collect())
    }

    /// Observed over expected co-occurrence of `found` in shells containing `given`.
    ///
    /// Values above one mean `found` is enriched in shells that already hold `given`.
    /// The relation is not symmetric. `None` for unknown names.
    pub fn co_occurrence(&self, given: &str, found: &str) -> Option<f64> {
        let i = self.solvent_index(given)?;
        let j = self.solvent_index(found)?;
        Some(self.co_occurrence[(i, j)])
    }

    /// Co-occurrence matrix; rows are the given solvent, columns the found solvent, both
    /// ordered as [`Speciation::solvent_names`].
    pub fn co_occurrence_matrix(&self) -> &DMatrix<f64> {
        &self.co_occurrence
    }

    pub fn solvent_names(&self) -> &[String] {
        &self.solvent_names
    }

    fn solvent_index(&self, name: &str) -> Option<usize> {
        self.solvent_names.iter().position(|n| n == name)
    }

    fn validate_query(&self, query: &[(&str, usize)]) -> Result<(), EngineError> {
        match query
            .iter()
            .find(|(name, _)| self.solvent_index(name).is_none())
        {
            Some((name, _)) => Err(EngineError::UnknownSolvent(name.to_string())),
            None => Ok(()),
        }
    }
}

fn matches_query(composition: &ShellComposition, query: &[(&str, usize)]) -> bool {
    query
        .iter()
        .all(|(name, count)| composition.get(*name).copied().unwrap_or(0) == *count)
}

fn compute_co_occurrence(
    shells: &BTreeMap<(usize, usize), ShellComposition>,
    solvent_names: &[String],
) -> DMatrix<f64> {
    let n = solvent_names.len();
    let count_of = |composition: &ShellComposition, name: &str| -> f64 {
        composition.get(name).copied().unwrap_or(0) as f64
    };

    let totals: Vec<f64> = solvent_names
        .iter()
        .map(|name| shells.values().map(|c| count_of(c, name)).sum())
        .collect();
    let grand_total: f64 = totals.iter().sum();

    let mut matrix = DMatrix::from_element(n, n, f64::NAN);
    for (i, given) in solvent_names.iter().enumerate() {
        let with_given: Vec<&ShellComposition> = shells
            .values()
            .filter(|c| count_of(c, given) > 0.0)
            .collect();
        let n_shells = with_given.len() as f64;
        let present: Vec<f64> = solvent_names
            .iter()
            .map(|name| with_given.iter().map(|c| count_of(c, name)).sum())
            .collect();
        // Slots left in those shells once one `given` molecule is set aside.
        let open_slots = present.iter().sum::<f64>() - n_shells;

        for j in 0..n {
            let expected = totals[j] / grand_total * open_slots;
            let actual = if i == j {
                present[j] - n_shells
            } else {
                present[j]
            };
            matrix[(i, j)] = actual / expected;
        }
    }
    matrix
}
