use super::config::{AnalysisKind, ConfigError};
use crate::core::models::selection::SelectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Selection error: {source}")]
    Selection {
        #[from]
        source: SelectionError,
    },

    #[error("At least one solvent selection is required")]
    NoSolvents,

    #[error("Selections '{first}' and '{second}' share atoms; solute and solvents must be disjoint")]
    OverlappingSelections { first: String, second: String },

    #[error("Unknown solvent '{0}'")]
    UnknownSolvent(String),

    #[error("Trajectory has {found} atoms but the selections were made on a topology with {expected}")]
    TopologyMismatch { expected: usize, found: usize },

    #[error("Trajectory contains no frames")]
    EmptyTrajectory,

    #[error("Solvation data is not available; call `run` first")]
    NotRun,

    #[error("Analysis '{0}' was not computed for this solution")]
    AnalysisUnavailable(AnalysisKind),

    #[error("No network {network} in frame {frame}")]
    NetworkNotFound { frame: usize, network: usize },

    #[error(
        "Shell record for frame {frame}, solute {solute_ix} is outside {n_frames} frames and {n_solutes} solutes"
    )]
    InvalidRecord {
        frame: usize,
        solute_ix: usize,
        n_frames: usize,
        n_solutes: usize,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
