/// Static, frame-independent description of an atom.
///
/// Coordinates live in [`super::frame::Frame`]; an `Atom` only carries the labels used
/// for selecting atoms and for attributing coordination to residues.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// The atom name (e.g., "Li", "O1").
    pub name: String,
    /// The force field atom type (e.g., "22").
    pub atom_type: String,
    /// The name of the owning residue (e.g., "EC", "PF6").
    pub res_name: String,
    /// The index of the owning residue as given by the source file.
    pub res_ix: usize,
}

impl Atom {
    /// Creates a new `Atom`.
    ///
    /// # Arguments
    ///
    /// * `name` - The atom name.
    /// * `atom_type` - The force field atom type.
    /// * `res_name` - The name of the residue the atom belongs to.
    /// * `res_ix` - The index of the residue the atom belongs to.
    pub fn new(name: &str, atom_type: &str, res_name: &str, res_ix: usize) -> Self {
        Self {
            name: name.to_string(),
            atom_type: atom_type.to_string(),
            res_name: res_name.to_string(),
            res_ix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_stores_all_labels() {
        let atom = Atom::new("O1", "3", "EC", 7);
        assert_eq!(atom.name, "O1");
        assert_eq!(atom.atom_type, "3");
        assert_eq!(atom.res_name, "EC");
        assert_eq!(atom.res_ix, 7);
    }
}
