pub mod analyze;
pub mod network;

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use solvation::core::io::traits::TrajectoryFile;
use solvation::core::io::xyz::XyzFile;
use solvation::core::models::selection::AtomGroup;
use solvation::core::models::trajectory::Trajectory;
use solvation::engine::progress::ProgressReporter;
use solvation::workflows::solution::Solution;
use std::collections::BTreeMap;
use tracing::info;

/// Loads the trajectory, resolves the selections and runs the solution over it.
fn run_solution(app: AppConfig, quiet: bool) -> Result<Solution> {
    info!("Loading trajectory from {:?}", &app.input_path);
    let trajectory: Trajectory =
        XyzFile::read_from_path(&app.input_path).map_err(|e| CliError::FileParsing {
            path: app.input_path.clone(),
            source: e.into(),
        })?;
    let topology = trajectory.topology();
    info!(
        "Loaded {} frames of {} atoms in {} residues.",
        trajectory.n_frames(),
        topology.n_atoms(),
        topology.n_residues()
    );

    let solute = app.solute.select(topology)?;
    let solvents = app
        .solvents
        .iter()
        .map(|(name, selection)| -> Result<(String, AtomGroup)> {
            Ok((name.clone(), selection.select(topology)?))
        })
        .collect::<Result<BTreeMap<String, AtomGroup>>>()?;
    for (name, group) in &solvents {
        info!(
            "Solvent '{}': {} atoms in {} residues, radius {:.2}.",
            name,
            group.len(),
            group.n_residues(),
            app.core_config.radius_for(name)
        );
    }

    let mut solution = Solution::new(topology, solute, solvents, app.core_config)?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    solution.run(&trajectory, &reporter)?;
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SolutionArgs;
    use crate::config::{AnalysisRequest, build_config};
    use solvation::engine::config::AnalysisKind;
    use std::path::Path;

    const TRAJECTORY: &str = "\
4
frame 0 box=10.0 10.0 10.0
Li Li LI 0 0.0 0.0 0.0
O1 OE EC 1 2.0 0.0 0.0
C1 CE EC 1 3.2 0.0 0.0
P P PF6 2 0.0 2.5 0.0
4
frame 1 box=10.0 10.0 10.0
Li Li LI 0 0.0 0.0 0.0
O1 OE EC 1 5.0 0.0 0.0
C1 CE EC 1 6.2 0.0 0.0
P P PF6 2 0.0 9.0 0.0
";

    const CONFIG: &str = r#"
[solute]
res-name = "LI"

[solvents.EC]
res-name = "EC"

[solvents.PF6]
res-name = "PF6"

[analysis]
classes = ["speciation", "pairing", "networking"]
network-solvents = ["PF6"]
"#;

    fn args(dir: &Path) -> SolutionArgs {
        let input = dir.join("traj.xyz");
        let config = dir.join("solution.toml");
        std::fs::write(&input, TRAJECTORY).unwrap();
        std::fs::write(&config, CONFIG).unwrap();
        SolutionArgs {
            input,
            config,
            default_radius: None,
            radii: vec![],
            network_solvents: vec![],
            timestep: None,
            set_values: vec![],
        }
    }

    #[test]
    fn configured_solution_runs_over_xyz_trajectory() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_config(&args(dir.path()), AnalysisRequest::Configured(&[])).unwrap();

        let solution = run_solution(app, true).unwrap();

        assert!(solution.has(AnalysisKind::Speciation));
        assert!(solution.has(AnalysisKind::Networking));
        assert!(!solution.has(AnalysisKind::Residence));
        let pairing = solution.pairing().unwrap().pairing();
        assert!((pairing["EC"] - 0.5).abs() < 1e-9);
        // PF6 at y = 9.0 is 1.0 away through the periodic boundary.
        assert!((pairing["PF6"] - 1.0).abs() < 1e-9);
        let networking = solution.networking().unwrap();
        assert_eq!(networking.network_res_ix(1, 0).unwrap(), vec![2, 0]);
    }

    #[test]
    fn missing_trajectory_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path());
        args.input = dir.path().join("absent.xyz");
        let app = build_config(&args, AnalysisRequest::Configured(&[])).unwrap();

        assert!(matches!(
            run_solution(app, true),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn selection_matching_nothing_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path());
        args.set_values = vec!["solvents.FEC.res-name=FEC".to_string()];
        let app = build_config(&args, AnalysisRequest::Configured(&[])).unwrap();

        assert!(matches!(
            run_solution(app, true),
            Err(CliError::Selection(_))
        ));
    }
}
