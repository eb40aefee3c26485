use solvation::core::models::selection::Selection;
use solvation::engine::config::SolutionConfig;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct AppConfig {
    pub input_path: PathBuf,
    pub solute: Selection,
    pub solvents: BTreeMap<String, Selection>,
    pub core_config: SolutionConfig,
}
