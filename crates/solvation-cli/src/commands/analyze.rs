use super::run_solution;
use crate::cli::AnalyzeArgs;
use crate::config::{AnalysisRequest, build_config};
use crate::error::Result;
use crate::report;
use solvation::workflows::export::write_solution;
use tracing::info;

pub fn run(args: AnalyzeArgs, quiet: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_config(&args.solution, AnalysisRequest::Configured(&args.analyses))?;

    println!("Analyzing solvation structure...");
    let solution = run_solution(app, quiet)?;

    for table in report::solution_tables(&solution) {
        println!("\n{}", table);
    }

    if let Some(dir) = &args.output_dir {
        let written = write_solution(&solution, dir)?;
        info!("Wrote {} CSV tables to {:?}", written.len(), dir);
        println!(
            "\n✓ {} tables written to: {}",
            written.len(),
            dir.display()
        );
    }
    Ok(())
}
