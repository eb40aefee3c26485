use super::topology::{Topology, TopologyError};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Selection has no filter; specify at least one of res-name, atom-type, atom-name or indices")]
    NoFilter,
    #[error("Selection {0} matched no atoms")]
    Empty(String),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// A static property filter over the atoms of a [`Topology`].
///
/// All filters that are set must match (logical AND). With `by_residue`, every atom of a
/// residue that contains at least one matching atom is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub res_name: Option<String>,
    pub atom_type: Option<String>,
    pub atom_name: Option<String>,
    pub indices: Option<Vec<usize>>,
    pub by_residue: bool,
}

impl Selection {
    pub fn res_name(name: &str) -> Self {
        Self {
            res_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn atom_type(atom_type: &str) -> Self {
        Self {
            atom_type: Some(atom_type.to_string()),
            ..Self::default()
        }
    }

    pub fn atom_name(name: &str) -> Self {
        Self {
            atom_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn indices(indices: Vec<usize>) -> Self {
        Self {
            indices: Some(indices),
            ..Self::default()
        }
    }

    pub fn by_residue(mut self) -> Self {
        self.by_residue = true;
        self
    }

    fn has_filter(&self) -> bool {
        self.res_name.is_some()
            || self.atom_type.is_some()
            || self.atom_name.is_some()
            || self.indices.is_some()
    }

    fn matches(&self, topology: &Topology, atom_ix: usize) -> bool {
        let Some(atom) = topology.atom(atom_ix) else {
            return false;
        };
        self.res_name.as_ref().is_none_or(|n| *n == atom.res_name)
            && self.atom_type.as_ref().is_none_or(|t| *t == atom.atom_type)
            && self.atom_name.as_ref().is_none_or(|n| *n == atom.name)
            && self.indices.as_ref().is_none_or(|ix| ix.contains(&atom_ix))
    }

    /// Applies the filter to a topology.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoFilter`] for a selection without any filter,
    /// [`SelectionError::Topology`] if an explicit index is out of range, and
    /// [`SelectionError::Empty`] if nothing matches.
    pub fn select(&self, topology: &Topology) -> Result<AtomGroup, SelectionError> {
        if !self.has_filter() {
            return Err(SelectionError::NoFilter);
        }
        if let Some(&bad) = self
            .indices
            .iter()
            .flatten()
            .find(|&&ix| ix >= topology.n_atoms())
        {
            return Err(TopologyError::AtomOutOfRange(bad).into());
        }

        let mut selected: BTreeSet<usize> = (0..topology.n_atoms())
            .filter(|&ix| self.matches(topology, ix))
            .collect();

        if self.by_residue {
            let residues: BTreeSet<usize> = selected
                .iter()
                .filter_map(|&ix| topology.atom(ix).map(|a| a.res_ix))
                .collect();
            for res_ix in residues {
                if let Some(residue) = topology.residue(res_ix) {
                    selected.extend(residue.atoms().iter().copied());
                }
            }
        }

        if selected.is_empty() {
            return Err(SelectionError::Empty(format!("{:?}", self)));
        }
        AtomGroup::from_indices(topology, selected)
    }
}

/// An ordered, duplicate-free set of atoms together with their residue indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomGroup {
    atoms: Vec<usize>,
    res_ix: Vec<usize>,
}

impl AtomGroup {
    /// Builds a group from arbitrary atom indices; indices are sorted and deduplicated.
    pub fn from_indices(
        topology: &Topology,
        indices: impl IntoIterator<Item = usize>,
    ) -> Result<Self, SelectionError> {
        let atoms: Vec<usize> = indices
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let res_ix = atoms
            .iter()
            .map(|&ix| {
                topology
                    .atom(ix)
                    .map(|a| a.res_ix)
                    .ok_or(TopologyError::AtomOutOfRange(ix))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { atoms, res_ix })
    }

    pub fn indices(&self) -> &[usize] {
        &self.atoms
    }

    /// Residue index of every atom, parallel to [`AtomGroup::indices`].
    pub fn atom_res_ix(&self) -> &[usize] {
        &self.res_ix
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, atom_ix: usize) -> bool {
        self.atoms.binary_search(&atom_ix).is_ok()
    }

    /// Distinct residue indices spanned by the group, ascending.
    pub fn residues(&self) -> Vec<usize> {
        self.res_ix
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn n_residues(&self) -> usize {
        self.residues().len()
    }

    pub fn intersects(&self, other: &AtomGroup) -> bool {
        self.atoms.iter().any(|&ix| other.contains(ix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    fn electrolyte_topology() -> Topology {
        Topology::new(vec![
            Atom::new("Li", "22", "LI", 0),
            Atom::new("Li", "22", "LI", 1),
            Atom::new("P", "20", "PF6", 2),
            Atom::new("F1", "21", "PF6", 2),
            Atom::new("C1", "1", "EC", 3),
            Atom::new("O1", "3", "EC", 3),
        ])
        .unwrap()
    }

    #[test]
    fn atom_type_selection_matches_only_that_type() {
        let group = Selection::atom_type("22")
            .select(&electrolyte_topology())
            .unwrap();
        assert_eq!(group.indices(), &[0, 1]);
        assert_eq!(group.atom_res_ix(), &[0, 1]);
    }

    #[test]
    fn by_residue_expands_to_whole_residues() {
        let group = Selection::atom_type("21")
            .by_residue()
            .select(&electrolyte_topology())
            .unwrap();
        assert_eq!(group.indices(), &[2, 3]);
        assert_eq!(group.residues(), vec![2]);
    }

    #[test]
    fn combined_filters_are_intersected() {
        let selection = Selection {
            res_name: Some("EC".to_string()),
            atom_name: Some("O1".to_string()),
            ..Selection::default()
        };
        let group = selection.select(&electrolyte_topology()).unwrap();
        assert_eq!(group.indices(), &[5]);
    }

    #[test]
    fn selection_without_filter_is_rejected() {
        let result = Selection::default().select(&electrolyte_topology());
        assert_eq!(result, Err(SelectionError::NoFilter));
    }

    #[test]
    fn selection_matching_nothing_is_rejected() {
        let result = Selection::res_name("BN").select(&electrolyte_topology());
        assert!(matches!(result, Err(SelectionError::Empty(_))));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let result = Selection::indices(vec![0, 42]).select(&electrolyte_topology());
        assert_eq!(
            result,
            Err(SelectionError::Topology(TopologyError::AtomOutOfRange(42)))
        );
    }

    #[test]
    fn groups_report_intersections() {
        let topology = electrolyte_topology();
        let li = Selection::res_name("LI").select(&topology).unwrap();
        let ec = Selection::res_name("EC").select(&topology).unwrap();
        let first_li = Selection::indices(vec![0]).select(&topology).unwrap();
        assert!(!li.intersects(&ec));
        assert!(li.intersects(&first_li));
    }
}
