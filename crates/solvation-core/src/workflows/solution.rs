use crate::analysis::coordination::Coordination;
use crate::analysis::networking::Networking;
use crate::analysis::pairing::Pairing;
use crate::analysis::residence::Residence;
use crate::analysis::speciation::Speciation;
use crate::core::models::selection::{AtomGroup, SelectionError};
use crate::core::models::topology::{Topology, TopologyError};
use crate::core::models::trajectory::Trajectory;
use crate::engine::config::{AnalysisKind, ConfigError, SolutionConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::shell::{SolventShellSpec, detect_shells};
use crate::engine::solvation_data::SolvationData;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// A computed analysis, ready to be attached to a [`Solution`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Speciation(Speciation),
    Coordination(Coordination),
    Pairing(Pairing),
    Residence(Residence),
    Networking(Networking),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::Speciation(_) => AnalysisKind::Speciation,
            AnalysisResult::Coordination(_) => AnalysisKind::Coordination,
            AnalysisResult::Pairing(_) => AnalysisKind::Pairing,
            AnalysisResult::Residence(_) => AnalysisKind::Residence,
            AnalysisResult::Networking(_) => AnalysisKind::Networking,
        }
    }
}

macro_rules! impl_from_analysis {
    ($($variant:ident),*) => {
        $(impl From<$variant> for AnalysisResult {
            fn from(analysis: $variant) -> Self {
                AnalysisResult::$variant(analysis)
            }
        })*
    };
}

impl_from_analysis!(Speciation, Coordination, Pairing, Residence, Networking);

/// The solvation structure of a solute in a set of named solvents.
///
/// Construction validates the selections; [`Solution::run`] detects shells over a
/// trajectory and computes every analysis listed in the configuration. Analyses not
/// listed can be computed later with [`Solution::compute`], or built standalone with
/// their `from_solution` constructors and attached with [`Solution::attach`].
#[derive(Debug, Clone)]
pub struct Solution {
    topology: Topology,
    solute: AtomGroup,
    solvents: BTreeMap<String, AtomGroup>,
    config: SolutionConfig,
    solvation_data: Option<SolvationData>,
    speciation: Option<Speciation>,
    coordination: Option<Coordination>,
    pairing: Option<Pairing>,
    residence: Option<Residence>,
    networking: Option<Networking>,
}

impl Solution {
    /// # Errors
    ///
    /// - [`EngineError::NoSolvents`] if `solvents` is empty.
    /// - [`EngineError::Selection`] if the solute or a solvent group is empty, or holds an
    ///   atom index beyond `topology`.
    /// - [`EngineError::OverlappingSelections`] if any two groups share an atom.
    /// - [`EngineError::UnknownSolvent`] if a radius override or network solvent names a
    ///   solvent that is not in `solvents`.
    pub fn new(
        topology: &Topology,
        solute: AtomGroup,
        solvents: BTreeMap<String, AtomGroup>,
        config: SolutionConfig,
    ) -> Result<Self, EngineError> {
        if solvents.is_empty() {
            return Err(EngineError::NoSolvents);
        }
        if solute.is_empty() {
            return Err(SelectionError::Empty("solute".to_string()).into());
        }
        if let Some(name) = solvents
            .iter()
            .find_map(|(name, group)| group.is_empty().then_some(name))
        {
            return Err(SelectionError::Empty(format!("solvent '{}'", name)).into());
        }

        let groups: Vec<(&str, &AtomGroup)> = std::iter::once(("solute", &solute))
            .chain(solvents.iter().map(|(n, g)| (n.as_str(), g)))
            .collect();
        for (_, group) in &groups {
            if let Some(&ix) = group.indices().iter().find(|&&ix| ix >= topology.n_atoms()) {
                return Err(SelectionError::from(TopologyError::AtomOutOfRange(ix)).into());
            }
        }
        for (i, (first, a)) in groups.iter().enumerate() {
            for (second, b) in &groups[i + 1..] {
                if a.intersects(b) {
                    return Err(EngineError::OverlappingSelections {
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
            }
        }

        let named = config
            .radii
            .keys()
            .chain(config.network_solvents.iter().flatten());
        for name in named {
            if !solvents.contains_key(name) {
                return Err(EngineError::UnknownSolvent(name.clone()));
            }
        }

        Ok(Self {
            topology: topology.clone(),
            solute,
            solvents,
            config,
            solvation_data: None,
            speciation: None,
            coordination: None,
            pairing: None,
            residence: None,
            networking: None,
        })
    }

    /// Detects solvation shells in every frame of `trajectory`, then computes the
    /// configured analyses.
    ///
    /// Running again replaces all previous results, attached analyses included.
    #[instrument(skip_all, name = "solution_run")]
    pub fn run(
        &mut self,
        trajectory: &Trajectory,
        reporter: &ProgressReporter,
    ) -> Result<(), EngineError> {
        if trajectory.n_frames() == 0 {
            return Err(EngineError::EmptyTrajectory);
        }
        let found = trajectory.topology().n_atoms();
        if found != self.topology.n_atoms() {
            return Err(EngineError::TopologyMismatch {
                expected: self.topology.n_atoms(),
                found,
            });
        }
        self.clear();

        info!(
            "Analyzing {} solute atoms in {} solvents over {} frames.",
            self.solute.len(),
            self.solvents.len(),
            trajectory.n_frames()
        );
        let specs: Vec<SolventShellSpec> = self
            .solvents
            .iter()
            .map(|(name, group)| SolventShellSpec {
                name,
                group,
                radius: self.config.radius_for(name),
            })
            .collect();
        let data = reporter.phase("Shell detection", || {
            detect_shells(trajectory, &self.solute, &specs, reporter)
        })?;
        reporter.report(Progress::Message(format!(
            "{} shell records across {} frames",
            data.records().len(),
            data.n_frames()
        )));
        self.solvation_data = Some(data);

        let requested: Vec<AnalysisKind> = self.config.analyses.iter().copied().collect();
        for kind in requested {
            reporter.phase(kind.name(), || self.compute(kind))?;
        }
        info!("Solution analysis complete.");
        Ok(())
    }

    /// Computes one analysis from the current solvation data and attaches it.
    ///
    /// Networking uses the configured network solvents.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRun`] before [`Solution::run`], or a configuration error
    /// when networking is requested without network solvents.
    pub fn compute(&mut self, kind: AnalysisKind) -> Result<(), EngineError> {
        let result: AnalysisResult = match kind {
            AnalysisKind::Speciation => Speciation::from_solution(self)?.into(),
            AnalysisKind::Coordination => Coordination::from_solution(self)?.into(),
            AnalysisKind::Pairing => Pairing::from_solution(self)?.into(),
            AnalysisKind::Residence => Residence::from_solution(self)?.into(),
            AnalysisKind::Networking => {
                let solvents = self
                    .config
                    .network_solvents
                    .as_deref()
                    .ok_or(ConfigError::MissingParameter("network_solvents"))?;
                Networking::from_solution(self, solvents)?.into()
            }
        };
        self.attach(result);
        Ok(())
    }

    /// Stores an analysis, replacing any previous one of the same kind.
    pub fn attach(&mut self, analysis: impl Into<AnalysisResult>) {
        match analysis.into() {
            AnalysisResult::Speciation(a) => self.speciation = Some(a),
            AnalysisResult::Coordination(a) => self.coordination = Some(a),
            AnalysisResult::Pairing(a) => self.pairing = Some(a),
            AnalysisResult::Residence(a) => self.residence = Some(a),
            AnalysisResult::Networking(a) => self.networking = Some(a),
        }
    }

    fn clear(&mut self) {
        self.solvation_data = None;
        self.speciation = None;
        self.coordination = None;
        self.pairing = None;
        self.residence = None;
        self.networking = None;
    }

    pub fn solvation_data(&self) -> Result<&SolvationData, EngineError> {
        self.solvation_data.as_ref().ok_or(EngineError::NotRun)
    }

    pub fn has_run(&self) -> bool {
        self.solvation_data.is_some()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn solute(&self) -> &AtomGroup {
        &self.solute
    }

    pub fn solvents(&self) -> &BTreeMap<String, AtomGroup> {
        &self.solvents
    }

    pub fn config(&self) -> &SolutionConfig {
        &self.config
    }

    /// Residue index of every solute atom, by position in the solute group.
    pub fn solute_res_ix(&self) -> &[usize] {
        self.solute.atom_res_ix()
    }

    /// Number of residues in each solvent group.
    pub fn solvent_residue_counts(&self) -> BTreeMap<String, usize> {
        self.solvents
            .iter()
            .map(|(name, group)| (name.clone(), group.n_residues()))
            .collect()
    }

    pub fn speciation(&self) -> Option<&Speciation> {
        self.speciation.as_ref()
    }

    pub fn coordination(&self) -> Option<&Coordination> {
        self.coordination.as_ref()
    }

    pub fn pairing(&self) -> Option<&Pairing> {
        self.pairing.as_ref()
    }

    pub fn residence(&self) -> Option<&Residence> {
        self.residence.as_ref()
    }

    pub fn networking(&self) -> Option<&Networking> {
        self.networking.as_ref()
    }

    /// Whether `kind` has been computed or attached.
    pub fn has(&self, kind: AnalysisKind) -> bool {
        match kind {
            AnalysisKind::Speciation => self.speciation.is_some(),
            AnalysisKind::Coordination => self.coordination.is_some(),
            AnalysisKind::Pairing => self.pairing.is_some(),
            AnalysisKind::Residence => self.residence.is_some(),
            AnalysisKind::Networking => self.networking.is_some(),
        }
    }
}
