use super::frame::Frame;
use super::topology::Topology;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrajectoryError {
    #[error("Frame {frame} has {found} atoms but the topology has {expected}")]
    AtomCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
    #[error("Frame {frame} has a periodic box with a non-positive edge")]
    InvalidBox { frame: usize },
}

/// A topology together with an ordered series of frames.
///
/// Every frame is guaranteed to hold exactly one position per topology atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    topology: Topology,
    frames: Vec<Frame>,
}

impl Trajectory {
    pub fn new(topology: Topology, frames: Vec<Frame>) -> Result<Self, TrajectoryError> {
        for (ix, frame) in frames.iter().enumerate() {
            if frame.n_atoms() != topology.n_atoms() {
                return Err(TrajectoryError::AtomCountMismatch {
                    frame: ix,
                    expected: topology.n_atoms(),
                    found: frame.n_atoms(),
                });
            }
            if frame.simulation_box.is_some_and(|b| !b.is_valid()) {
                return Err(TrajectoryError::InvalidBox { frame: ix });
            }
        }
        Ok(Self { topology, frames })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }
}
