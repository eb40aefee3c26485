use super::atom::Atom;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Residue {res_ix} is named both '{first}' and '{second}'")]
    ConflictingResidueName {
        res_ix: usize,
        first: String,
        second: String,
    },
    #[error("Atom index {0} is out of range")]
    AtomOutOfRange(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub res_ix: usize,
    pub name: String,
    pub(crate) atoms: Vec<usize>,
}

impl Residue {
    pub fn atoms(&self) -> &[usize] {
        &self.atoms
    }
}

/// The static part of a simulated system: its atoms and the residues they form.
///
/// Atoms are addressed by their position in the topology (`atom_ix`); residues keep the
/// index found in the source file (`res_ix`), which need not be contiguous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    atoms: Vec<Atom>,
    residues: Vec<Residue>,
    residue_lookup: HashMap<usize, usize>,
}

impl Topology {
    /// Builds a topology, grouping atoms into residues by their `res_ix`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ConflictingResidueName`] if two atoms share a residue
    /// index but disagree on the residue name.
    pub fn new(atoms: Vec<Atom>) -> Result<Self, TopologyError> {
        let mut residues: Vec<Residue> = Vec::new();
        let mut residue_lookup = HashMap::new();

        for (atom_ix, atom) in atoms.iter().enumerate() {
            match residue_lookup.get(&atom.res_ix) {
                Some(&pos) => {
                    let residue: &mut Residue = &mut residues[pos];
                    if residue.name != atom.res_name {
                        return Err(TopologyError::ConflictingResidueName {
                            res_ix: atom.res_ix,
                            first: residue.name.clone(),
                            second: atom.res_name.clone(),
                        });
                    }
                    residue.atoms.push(atom_ix);
                }
                None => {
                    residue_lookup.insert(atom.res_ix, residues.len());
                    residues.push(Residue {
                        res_ix: atom.res_ix,
                        name: atom.res_name.clone(),
                        atoms: vec![atom_ix],
                    });
                }
            }
        }

        Ok(Self {
            atoms,
            residues,
            residue_lookup,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn n_residues(&self) -> usize {
        self.residues.len()
    }

    pub fn atom(&self, atom_ix: usize) -> Option<&Atom> {
        self.atoms.get(atom_ix)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// Looks up a residue by the index it carried in the source file.
    pub fn residue(&self, res_ix: usize) -> Option<&Residue> {
        self.residue_lookup
            .get(&res_ix)
            .map(|&pos| &self.residues[pos])
    }
}
