use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Orion Cohen, Tingzheng Hou",
    version,
    about = "solvation - Solvation-shell analysis of molecular-dynamics trajectories: speciation, coordination, ion pairing, residence times and solvent networks.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel shell detection.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect solvation shells and run the solvation analyses on a trajectory.
    Analyze(AnalyzeArgs),
    /// Print the residue indices of one solute-solvent network.
    Network(NetworkArgs),
}

/// Inputs shared by every command: the trajectory, the selections and the radii.
#[derive(Args, Debug, Clone)]
pub struct SolutionArgs {
    /// Path to the annotated XYZ trajectory.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the configuration file in TOML format (selections, radii, analyses).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the cutoff radius of solvents without an explicit radius, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub default_radius: Option<f64>,

    /// Override the cutoff radius of one solvent. Can be used multiple times.
    /// Example: --radius PF6=2.6
    #[arg(short, long = "radius", value_name = "NAME=FLOAT")]
    pub radii: Vec<String>,

    /// Solvents that link solutes into networks. Can be used multiple times.
    #[arg(short = 'n', long = "network-solvent", value_name = "NAME")]
    pub network_solvents: Vec<String>,

    /// Override the time between frames, the unit of residence times.
    #[arg(short, long, value_name = "FLOAT")]
    pub timestep: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S radii.EC=2.4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub solution: SolutionArgs,

    /// Analyses to run, replacing `analysis.classes` from the config file.
    /// One of: speciation, coordination, pairing, residence, networking.
    #[arg(short, long = "analysis", value_name = "KIND")]
    pub analyses: Vec<String>,

    /// Directory to write every result table into as CSV.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the `network` subcommand.
#[derive(Args, Debug)]
pub struct NetworkArgs {
    #[command(flatten)]
    pub solution: SolutionArgs,

    /// Frame of the network.
    #[arg(short, long, value_name = "INT")]
    pub frame: usize,

    /// Index of the network within its frame.
    #[arg(short = 'k', long, value_name = "INT")]
    pub network: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_collects_repeated_options() {
        let cli = Cli::try_parse_from([
            "solvation", "-vv", "analyze", "-i", "traj.xyz", "-c", "solution.toml", "-r",
            "PF6=2.6", "-r", "EC=2.4", "-a", "speciation", "-a", "pairing", "-o", "out",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected the analyze command");
        };
        assert_eq!(args.solution.radii, vec!["PF6=2.6", "EC=2.4"]);
        assert_eq!(args.analyses, vec!["speciation", "pairing"]);
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn network_requires_frame_and_network() {
        let result = Cli::try_parse_from([
            "solvation", "network", "-i", "traj.xyz", "-c", "solution.toml", "-f", "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from([
            "solvation", "-q", "-v", "analyze", "-i", "traj.xyz", "-c", "solution.toml",
        ]);
        assert!(result.is_err());
    }
}
