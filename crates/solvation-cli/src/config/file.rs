use crate::error::{CliError, Result};
use serde::Deserialize;
use solvation::core::models::selection::Selection;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Key of the `[radii]` table holding the radius of solvents without an override.
pub const DEFAULT_RADIUS_KEY: &str = "default";

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSelection {
    pub res_name: Option<String>,
    pub atom_type: Option<String>,
    pub atom_name: Option<String>,
    pub indices: Option<Vec<usize>>,
    pub by_residue: Option<bool>,
}

impl From<FileSelection> for Selection {
    fn from(f: FileSelection) -> Self {
        Self {
            res_name: f.res_name,
            atom_type: f.atom_type,
            atom_name: f.atom_name,
            indices: f.indices,
            by_residue: f.by_residue.unwrap_or(false),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAnalysisConfig {
    pub classes: Option<Vec<String>>,
    pub network_solvents: Option<Vec<String>>,
    pub timestep: Option<f64>,
}

/// The TOML configuration file as written by the user; every field is optional.
///
/// ```toml
/// [solute]
/// res-name = "LI"
///
/// [solvents.PF6]
/// res-name = "PF6"
/// atom-type = "F"
///
/// [radii]
/// default = 3.0
/// PF6 = 2.6
///
/// [analysis]
/// classes = ["speciation", "networking"]
/// network-solvents = ["PF6"]
/// timestep = 2.0
/// ```
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub solute: Option<FileSelection>,
    pub solvents: Option<BTreeMap<String, FileSelection>>,
    pub radii: Option<BTreeMap<String, f64>>,
    pub analysis: Option<FileAnalysisConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_is_parsed() {
        let config = FileConfig::from_toml(
            r#"
            [solute]
            res-name = "LI"

            [solvents.EC]
            res-name = "EC"
            by-residue = true

            [solvents.PF6]
            atom-type = "F"
            indices = [10, 11, 12]

            [radii]
            default = 3.2
            PF6 = 2.6

            [analysis]
            classes = ["speciation", "residence"]
            network-solvents = ["PF6"]
            timestep = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.solute.unwrap().res_name.as_deref(), Some("LI"));
        let solvents = config.solvents.unwrap();
        assert_eq!(solvents["EC"].by_residue, Some(true));
        assert_eq!(solvents["PF6"].indices, Some(vec![10, 11, 12]));
        let radii = config.radii.unwrap();
        assert_eq!(radii[DEFAULT_RADIUS_KEY], 3.2);
        assert_eq!(radii["PF6"], 2.6);
        let analysis = config.analysis.unwrap();
        assert_eq!(analysis.timestep, Some(0.5));
        assert_eq!(analysis.network_solvents, Some(vec!["PF6".to_string()]));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml("[solute]\nresname = \"LI\"\n").is_err());
        assert!(FileConfig::from_toml("[plots]\nenabled = true\n").is_err());
    }

    #[test]
    fn selection_defaults_to_atom_level() {
        let selection: Selection = FileSelection {
            res_name: Some("EC".to_string()),
            ..Default::default()
        }
        .into();
        assert!(!selection.by_residue);
        assert_eq!(selection, Selection::res_name("EC"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
