use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue { parameter: String, reason: String },
    #[error("Unknown analysis '{0}'. Expected one of: speciation, coordination, pairing, residence, networking")]
    UnknownAnalysis(String),
}

/// The secondary analyses that can be derived from solvation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisKind {
    Speciation,
    Coordination,
    Pairing,
    Residence,
    Networking,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Speciation,
        AnalysisKind::Coordination,
        AnalysisKind::Pairing,
        AnalysisKind::Residence,
        AnalysisKind::Networking,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::Speciation => "speciation",
            AnalysisKind::Coordination => "coordination",
            AnalysisKind::Pairing => "pairing",
            AnalysisKind::Residence => "residence",
            AnalysisKind::Networking => "networking",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownAnalysis(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolutionConfig {
    /// Cutoff radius in Angstroms for solvents without an explicit override.
    pub default_radius: f64,
    /// Per-solvent cutoff radii overriding `default_radius`.
    pub radii: BTreeMap<String, f64>,
    /// Analyses computed eagerly by `Solution::run`.
    pub analyses: BTreeSet<AnalysisKind>,
    /// Solvents that link solutes into networks.
    pub network_solvents: Option<Vec<String>>,
    /// Time between consecutive frames, the unit of residence times.
    pub timestep: f64,
}

impl SolutionConfig {
    pub fn radius_for(&self, solvent: &str) -> f64 {
        self.radii
            .get(solvent)
            .copied()
            .unwrap_or(self.default_radius)
    }

    pub fn requests(&self, kind: AnalysisKind) -> bool {
        self.analyses.contains(&kind)
    }
}

#[derive(Default)]
pub struct SolutionConfigBuilder {
    default_radius: Option<f64>,
    radii: BTreeMap<String, f64>,
    analyses: BTreeSet<AnalysisKind>,
    network_solvents: Option<Vec<String>>,
    timestep: Option<f64>,
}

impl SolutionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_radius(mut self, radius: f64) -> Self {
        self.default_radius = Some(radius);
        self
    }
    pub fn radius(mut self, solvent: &str, radius: f64) -> Self {
        self.radii.insert(solvent.to_string(), radius);
        self
    }
    pub fn radii(mut self, radii: BTreeMap<String, f64>) -> Self {
        self.radii.extend(radii);
        self
    }
    pub fn analysis(mut self, kind: AnalysisKind) -> Self {
        self.analyses.insert(kind);
        self
    }
    pub fn analyses(mut self, kinds: impl IntoIterator<Item = AnalysisKind>) -> Self {
        self.analyses.extend(kinds);
        self
    }
    pub fn network_solvents(mut self, solvents: Vec<String>) -> Self {
        self.network_solvents = Some(solvents);
        self
    }
    pub fn timestep(mut self, timestep: f64) -> Self {
        self.timestep = Some(timestep);
        self
    }

    pub fn build(self) -> Result<SolutionConfig, ConfigError> {
        let default_radius = self
            .default_radius
            .ok_or(ConfigError::MissingParameter("default_radius"))?;
        ensure_positive("default_radius", default_radius)?;
        for (name, &radius) in &self.radii {
            ensure_positive(&format!("radii.{}", name), radius)?;
        }

        let timestep = self.timestep.unwrap_or(1.0);
        ensure_positive("timestep", timestep)?;

        if let Some(solvents) = &self.network_solvents {
            if solvents.is_empty() {
                return Err(ConfigError::InvalidValue {
                    parameter: "network_solvents".to_string(),
                    reason: "at least one solvent is required".to_string(),
                });
            }
        } else if self.analyses.contains(&AnalysisKind::Networking) {
            return Err(ConfigError::MissingParameter("network_solvents"));
        }

        Ok(SolutionConfig {
            default_radius,
            radii: self.radii,
            analyses: self.analyses,
            network_solvents: self.network_solvents,
            timestep,
        })
    }
}

fn ensure_positive(parameter: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter: parameter.to_string(),
            reason: format!("must be a positive finite number, got {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_with_minimal_parameters_uses_defaults() {
        let config = SolutionConfigBuilder::new()
            .default_radius(3.0)
            .build()
            .unwrap();

        assert_eq!(config.default_radius, 3.0);
        assert_eq!(config.timestep, 1.0);
        assert!(config.analyses.is_empty());
        assert!(config.network_solvents.is_none());
    }

    #[test]
    fn radius_override_takes_precedence_over_default() {
        let config = SolutionConfigBuilder::new()
            .default_radius(3.0)
            .radius("PF6", 2.6)
            .build()
            .unwrap();

        assert_eq!(config.radius_for("PF6"), 2.6);
        assert_eq!(config.radius_for("EC"), 3.0);
    }

    #[test]
    fn missing_default_radius_is_an_error() {
        let result = SolutionConfigBuilder::new().build();
        assert_eq!(
            result,
            Err(ConfigError::MissingParameter("default_radius"))
        );
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let result = SolutionConfigBuilder::new()
            .default_radius(3.0)
            .radius("EC", -1.0)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { parameter, .. }) if parameter == "radii.EC"
        ));
    }

    #[test]
    fn networking_without_network_solvents_is_rejected() {
        let result = SolutionConfigBuilder::new()
            .default_radius(3.0)
            .analysis(AnalysisKind::Networking)
            .build();
        assert_eq!(
            result,
            Err(ConfigError::MissingParameter("network_solvents"))
        );
    }

    #[test]
    fn empty_network_solvents_are_rejected() {
        let result = SolutionConfigBuilder::new()
            .default_radius(3.0)
            .network_solvents(vec![])
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn analysis_kind_parses_case_insensitively() {
        assert_eq!("Residence".parse::<AnalysisKind>(), Ok(AnalysisKind::Residence));
        assert_eq!(" networking ".parse::<AnalysisKind>(), Ok(AnalysisKind::Networking));
        assert_eq!(
            "clustering".parse::<AnalysisKind>(),
            Err(ConfigError::UnknownAnalysis("clustering".to_string()))
        );
    }
}
