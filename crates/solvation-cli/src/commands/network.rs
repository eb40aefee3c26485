use super::run_solution;
use crate::cli::NetworkArgs;
use crate::config::{AnalysisRequest, build_config};
use crate::error::Result;
use crate::report::Table;
use solvation::engine::config::AnalysisKind;
use solvation::engine::error::EngineError;
use tracing::info;

pub fn run(args: NetworkArgs, quiet: bool) -> Result<()> {
    let app = build_config(
        &args.solution,
        AnalysisRequest::Only(AnalysisKind::Networking),
    )?;
    let solution = run_solution(app, quiet)?;
    let networking = solution
        .networking()
        .ok_or(EngineError::AnalysisUnavailable(AnalysisKind::Networking))?;

    let members = networking
        .networks()
        .get(&(args.frame, args.network))
        .ok_or(EngineError::NetworkNotFound {
            frame: args.frame,
            network: args.network,
        })?;
    info!(
        "Network {} of frame {} has {} members.",
        args.network,
        args.frame,
        members.len()
    );

    let mut table = Table::new(
        &format!("Network {} in frame {}", args.network, args.frame),
        ["kind", "res_ix"],
    );
    for member in members {
        table.push_row(vec![member.kind.to_string(), member.res_ix.to_string()]);
    }
    println!("{}", table);

    let res_ix: Vec<String> = networking
        .network_res_ix(args.frame, args.network)?
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("{}", res_ix.join(" "));
    Ok(())
}
