use super::defaults::DefaultsConfig;
use super::file::{DEFAULT_RADIUS_KEY, FileConfig, FileSelection};
use super::models::AppConfig;
use crate::cli::SolutionArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use solvation::core::models::selection::Selection;
use solvation::engine::config::{AnalysisKind, SolutionConfigBuilder};
use std::collections::BTreeMap;

/// Which analyses a command runs.
#[derive(Debug, Clone, Copy)]
pub enum AnalysisRequest<'a> {
    /// The analyses named on the command line, else `analysis.classes`, else the defaults.
    Configured(&'a [String]),
    /// Exactly one analysis, whatever the configuration says.
    Only(AnalysisKind),
}

/// Merges defaults, the config file, `--set` values and command-line flags, in increasing
/// order of precedence.
pub fn build_config(args: &SolutionArgs, request: AnalysisRequest) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::from_file(&args.config)?;
    let file_config = apply_set_values(file_config, &args.set_values)?;

    let solute: Selection = file_config
        .solute
        .ok_or_else(|| CliError::Config("A `[solute]` section is required.".to_string()))?
        .into();
    let solvents: BTreeMap<String, Selection> = file_config
        .solvents
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            CliError::Config("At least one `[solvents.NAME]` section is required.".to_string())
        })?
        .into_iter()
        .map(|(name, selection)| (name, selection.into()))
        .collect();

    let mut radii = file_config.radii.unwrap_or_default();
    let file_default_radius = radii.remove(DEFAULT_RADIUS_KEY);
    for radius in &args.radii {
        let (name, value) =
            parser::parse_radius(radius).map_err(|e| CliError::Argument(e.to_string()))?;
        radii.insert(name, value);
    }
    let default_radius = args
        .default_radius
        .or(file_default_radius)
        .unwrap_or(defaults.default_radius);

    let analysis_file = file_config.analysis.unwrap_or_default();
    let timestep = args
        .timestep
        .or(analysis_file.timestep)
        .unwrap_or(defaults.timestep);
    let network_solvents = if args.network_solvents.is_empty() {
        analysis_file.network_solvents
    } else {
        Some(args.network_solvents.clone())
    };

    let analyses = match request {
        AnalysisRequest::Only(kind) => vec![kind],
        AnalysisRequest::Configured(cli) => {
            let names = if cli.is_empty() {
                analysis_file.classes
            } else {
                Some(cli.to_vec())
            };
            match names {
                Some(names) => names
                    .iter()
                    .map(|name| name.parse::<AnalysisKind>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| CliError::Config(e.to_string()))?,
                None => defaults.analyses,
            }
        }
    };

    let mut builder = SolutionConfigBuilder::new()
        .default_radius(default_radius)
        .radii(radii)
        .analyses(analyses)
        .timestep(timestep);
    if let Some(solvents) = network_solvents {
        builder = builder.network_solvents(solvents);
    }
    let core_config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        input_path: args.input.clone(),
        solute,
        solvents,
        core_config,
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value_str) = parser::parse_key_value(kv_pair).map_err(|_| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;
        let path: Vec<&str> = key.split('.').collect();

        match path.as_slice() {
            ["radii", name] => {
                config
                    .radii
                    .get_or_insert_with(Default::default)
                    .insert(name.to_string(), parse_float(key, value_str)?);
            }
            ["analysis", "timestep"] => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .timestep = Some(parse_float(key, value_str)?);
            }
            ["analysis", "classes"] => {
                config.analysis.get_or_insert_with(Default::default).classes =
                    Some(parser::parse_list(value_str));
            }
            ["analysis", "network-solvents"] => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .network_solvents = Some(parser::parse_list(value_str));
            }
            ["solute", field] => {
                let selection = config.solute.get_or_insert_with(Default::default);
                set_selection_field(selection, field, key, value_str)?;
            }
            ["solvents", name, field] => {
                let selection = config
                    .solvents
                    .get_or_insert_with(Default::default)
                    .entry(name.to_string())
                    .or_default();
                set_selection_field(selection, field, key, value_str)?;
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

fn set_selection_field(
    selection: &mut FileSelection,
    field: &str,
    key: &str,
    value_str: &str,
) -> Result<()> {
    match field {
        "res-name" => selection.res_name = Some(value_str.to_string()),
        "atom-type" => selection.atom_type = Some(value_str.to_string()),
        "atom-name" => selection.atom_name = Some(value_str.to_string()),
        "by-residue" => {
            selection.by_residue = Some(value_str.parse().map_err(|_| {
                CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
            })?);
        }
        "indices" => {
            let indices = parser::parse_list(value_str)
                .iter()
                .map(|s| s.parse::<usize>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| {
                    CliError::Config(format!("Invalid index list for {}: {}", key, value_str))
                })?;
            selection.indices = Some(indices);
        }
        _ => {
            return Err(CliError::Config(format!(
                "Unsupported configuration key for --set: '{}'",
                key
            )));
        }
    }
    Ok(())
}

fn parse_float(key: &str, value_str: &str) -> Result<f64> {
    value_str
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid float value for {}: {}", key, value_str)))
}
