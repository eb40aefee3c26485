use super::solution::Solution;
use crate::analysis::coordination::Coordination;
use crate::analysis::networking::Networking;
use crate::analysis::pairing::Pairing;
use crate::analysis::residence::Residence;
use crate::analysis::speciation::Speciation;
use crate::engine::solvation_data::SolvationData;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to write '{path}': {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<ExportError>,
    },
}

#[derive(Serialize)]
struct SolventValueRow<'a> {
    solvent: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct SolventFrameRow<'a> {
    solvent: &'a str,
    frame: usize,
    value: f64,
}

#[derive(Serialize)]
struct PairingRow<'a> {
    solvent: &'a str,
    pairing: f64,
    free_solvent: f64,
    diluent: f64,
}

#[derive(Serialize)]
struct ResidenceRow<'a> {
    solvent: &'a str,
    residence_cutoff: f64,
    residence_fit: f64,
}

#[derive(Serialize)]
struct NetworkRow {
    frame: usize,
    network: usize,
    kind: String,
    res_ix: usize,
}

#[derive(Serialize)]
struct NetworkSizeRow {
    frame: usize,
    size: usize,
    count: usize,
}

#[derive(Serialize)]
struct SoluteStatusRow {
    frame: Option<usize>,
    alone: f64,
    paired: f64,
    in_network: f64,
}

fn write_rows<W: Write, T: Serialize>(
    writer: W,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_series<W: Write>(
    writer: W,
    series: &std::collections::BTreeMap<String, Vec<f64>>,
) -> Result<(), ExportError> {
    write_rows(
        writer,
        series.iter().flat_map(|(solvent, values)| {
            values.iter().enumerate().map(move |(frame, &value)| SolventFrameRow {
                solvent,
                frame,
                value,
            })
        }),
    )
}

/// One row per shell record.
pub fn write_solvation_data<W: Write>(data: &SolvationData, writer: W) -> Result<(), ExportError> {
    write_rows(writer, data.records())
}

/// One row per distinct shell composition, one count column per solvent.
pub fn write_shell_fractions<W: Write>(
    speciation: &Speciation,
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let names = speciation.solvent_names();
    wtr.write_record(
        names
            .iter()
            .map(String::as_str)
            .chain(["count", "fraction"]),
    )?;
    for shell in speciation.shell_fractions() {
        let mut record: Vec<String> = names
            .iter()
            .map(|n| shell.composition.get(n).copied().unwrap_or(0).to_string())
            .collect();
        record.push(shell.count.to_string());
        record.push(shell.fraction.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Square co-occurrence matrix; the first column names the given solvent.
pub fn write_co_occurrence<W: Write>(
    speciation: &Speciation,
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let names = speciation.solvent_names();
    let matrix = speciation.co_occurrence_matrix();
    wtr.write_record(std::iter::once("given").chain(names.iter().map(String::as_str)))?;
    for (i, given) in names.iter().enumerate() {
        let mut record = vec![given.clone()];
        record.extend((0..names.len()).map(|j| matrix[(i, j)].to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_coordination_numbers<W: Write>(
    coordination: &Coordination,
    writer: W,
) -> Result<(), ExportError> {
    write_rows(
        writer,
        coordination
            .coordination_numbers()
            .iter()
            .map(|(solvent, &value)| SolventValueRow { solvent, value }),
    )
}

pub fn write_coordination_by_frame<W: Write>(
    coordination: &Coordination,
    writer: W,
) -> Result<(), ExportError> {
    write_series(writer, coordination.by_frame())
}

pub fn write_coordinating_atoms<W: Write>(
    coordination: &Coordination,
    writer: W,
) -> Result<(), ExportError> {
    write_rows(writer, coordination.coordinating_atoms())
}

pub fn write_pairing<W: Write>(pairing: &Pairing, writer: W) -> Result<(), ExportError> {
    write_rows(
        writer,
        pairing.pairing().iter().map(|(solvent, &value)| PairingRow {
            solvent,
            pairing: value,
            free_solvent: pairing.free_solvent().get(solvent).copied().unwrap_or(f64::NAN),
            diluent: pairing
                .diluent_composition()
                .get(solvent)
                .copied()
                .unwrap_or(f64::NAN),
        }),
    )
}

pub fn write_pairing_by_frame<W: Write>(pairing: &Pairing, writer: W) -> Result<(), ExportError> {
    write_series(writer, pairing.pairing_by_frame())
}

pub fn write_residence<W: Write>(residence: &Residence, writer: W) -> Result<(), ExportError> {
    write_rows(
        writer,
        residence
            .residence_times()
            .iter()
            .map(|(solvent, &cutoff)| ResidenceRow {
                solvent,
                residence_cutoff: cutoff,
                residence_fit: residence
                    .residence_times_fit()
                    .get(solvent)
                    .copied()
                    .unwrap_or(f64::NAN),
            }),
    )
}

/// One row per network member.
pub fn write_networks<W: Write>(networking: &Networking, writer: W) -> Result<(), ExportError> {
    write_rows(
        writer,
        networking
            .networks()
            .iter()
            .flat_map(|(&(frame, network), members)| {
                members.iter().map(move |m| NetworkRow {
                    frame,
                    network,
                    kind: m.kind.to_string(),
                    res_ix: m.res_ix,
                })
            }),
    )
}

pub fn write_network_sizes<W: Write>(
    networking: &Networking,
    writer: W,
) -> Result<(), ExportError> {
    write_rows(
        writer,
        networking
            .network_sizes()
            .iter()
            .flat_map(|(&frame, sizes)| {
                sizes.iter().map(move |(&size, &count)| NetworkSizeRow { frame, size, count })
            }),
    )
}

/// Per-frame solute status, followed by a row with an empty frame for the overall mean.
pub fn write_solute_status<W: Write>(
    networking: &Networking,
    writer: W,
) -> Result<(), ExportError> {
    let overall = networking.solute_status();
    write_rows(
        writer,
        networking
            .solute_status_by_frame()
            .iter()
            .enumerate()
            .map(|(frame, s)| (Some(frame), *s))
            .chain(std::iter::once((None, overall)))
            .map(|(frame, s)| SoluteStatusRow {
                frame,
                alone: s.alone,
                paired: s.paired,
                in_network: s.in_network,
            }),
    )
}

fn write_file(
    dir: &Path,
    name: &str,
    written: &mut Vec<PathBuf>,
    write: impl FnOnce(File) -> Result<(), ExportError>,
) -> Result<(), ExportError> {
    let path = dir.join(name);
    File::create(&path)
        .map_err(ExportError::from)
        .and_then(write)
        .map_err(|e| ExportError::File {
            path: path.clone(),
            source: Box::new(e),
        })?;
    debug!("Wrote {}", path.display());
    written.push(path);
    Ok(())
}

/// Writes the shell records and every available analysis of `solution` into `dir`.
///
/// Returns the paths written. The directory is created if needed.
pub fn write_solution(solution: &Solution, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if let Ok(data) = solution.solvation_data() {
        write_file(dir, "solvation_data.csv", &mut written, |f| {
            write_solvation_data(data, f)
        })?;
    }
    if let Some(s) = solution.speciation() {
        write_file(dir, "speciation.csv", &mut written, |f| {
            write_shell_fractions(s, f)
        })?;
        write_file(dir, "co_occurrence.csv", &mut written, |f| {
            write_co_occurrence(s, f)
        })?;
    }
    if let Some(c) = solution.coordination() {
        write_file(dir, "coordination.csv", &mut written, |f| {
            write_coordination_numbers(c, f)
        })?;
        write_file(dir, "coordination_by_frame.csv", &mut written, |f| {
            write_coordination_by_frame(c, f)
        })?;
        write_file(dir, "coordinating_atoms.csv", &mut written, |f| {
            write_coordinating_atoms(c, f)
        })?;
    }
    if let Some(p) = solution.pairing() {
        write_file(dir, "pairing.csv", &mut written, |f| write_pairing(p, f))?;
        write_file(dir, "pairing_by_frame.csv", &mut written, |f| {
            write_pairing_by_frame(p, f)
        })?;
    }
    if let Some(r) = solution.residence() {
        write_file(dir, "residence.csv", &mut written, |f| write_residence(r, f))?;
    }
    if let Some(n) = solution.networking() {
        write_file(dir, "networks.csv", &mut written, |f| write_networks(n, f))?;
        write_file(dir, "network_sizes.csv", &mut written, |f| {
            write_network_sizes(n, f)
        })?;
        write_file(dir, "solute_status.csv", &mut written, |f| {
            write_solute_status(n, f)
        })?;
    }
    Ok(written)
}
