use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Target prefix shared by the core library and this binary.
const ANALYSIS_TARGET: &str = "solvation";

/// Installs the global subscriber: a compact stderr layer plus an optional plain-text
/// file layer.
///
/// `-q` silences stderr; otherwise each `-v` lowers its threshold by one level, starting
/// at WARN. The log file only records `solvation` targets, at DEBUG or finer, and closes
/// each `solution_run` span with its timing.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(level_filter(verbosity, quiet));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(&path).map_err(CliError::Io)?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_filter(file_targets(verbosity)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn file_targets(verbosity: u8) -> Targets {
    let level = level_filter(verbosity, false).max(LevelFilter::DEBUG);
    Targets::new().with_target(ANALYSIS_TARGET, level)
}
