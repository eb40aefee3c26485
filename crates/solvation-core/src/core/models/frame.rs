use nalgebra::{Point3, Vector3};

/// An orthorhombic periodic simulation box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    /// Edge lengths along x, y and z in Angstroms.
    pub lengths: Vector3<f64>,
}

impl SimulationBox {
    pub fn new(lx: f64, ly: f64, lz: f64) -> Self {
        Self {
            lengths: Vector3::new(lx, ly, lz),
        }
    }

    /// A box is usable for minimum-image wrapping only if every edge is positive.
    pub fn is_valid(&self) -> bool {
        self.lengths.iter().all(|l| l.is_finite() && *l > 0.0)
    }
}

/// Coordinates of every atom of a topology at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub positions: Vec<Point3<f64>>,
    pub simulation_box: Option<SimulationBox>,
}

impl Frame {
    pub fn new(positions: Vec<Point3<f64>>, simulation_box: Option<SimulationBox>) -> Self {
        Self {
            positions,
            simulation_box,
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_with_non_positive_edge_is_invalid() {
        assert!(SimulationBox::new(10.0, 10.0, 10.0).is_valid());
        assert!(!SimulationBox::new(10.0, 0.0, 10.0).is_valid());
        assert!(!SimulationBox::new(10.0, f64::NAN, 10.0).is_valid());
    }
}
