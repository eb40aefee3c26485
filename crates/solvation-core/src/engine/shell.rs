use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::solvation_data::{SolvationData, SolvationRecord};
use crate::core::models::frame::Frame;
use crate::core::models::selection::AtomGroup;
use crate::core::models::topology::Topology;
use crate::core::models::trajectory::Trajectory;
use crate::core::utils::geometry::minimum_image_distance;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// A solvent group with its resolved cutoff radius.
pub struct SolventShellSpec<'a> {
    pub name: &'a str,
    pub group: &'a AtomGroup,
    pub radius: f64,
}

/// Finds, for every frame and solute atom, the solvent residues within cutoff.
///
/// A residue is coordinated when any of its selected atoms lies within the solvent's
/// radius; only the closest such atom is recorded. Frames are processed in parallel
/// and the result does not depend on the number of threads.
pub fn detect_shells(
    trajectory: &Trajectory,
    solute: &AtomGroup,
    solvents: &[SolventShellSpec<'_>],
    reporter: &ProgressReporter,
) -> Result<SolvationData, EngineError> {
    let topology = trajectory.topology();
    reporter.report(Progress::TaskStart {
        total_steps: trajectory.n_frames() as u64,
    });

    let records: Vec<SolvationRecord> = trajectory
        .frames()
        .par_iter()
        .enumerate()
        .map(|(frame_ix, frame)| {
            let frame_records = frame_shells(frame_ix, frame, topology, solute, solvents);
            reporter.report(Progress::TaskIncrement);
            frame_records
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    reporter.report(Progress::TaskFinish);
    debug!(
        "Detected {} coordinated solvent residues over {} frames.",
        records.len(),
        trajectory.n_frames()
    );

    SolvationData::new(
        records,
        trajectory.n_frames(),
        solute.len(),
        solvents.iter().map(|s| s.name.to_string()).collect(),
    )
}

fn frame_shells(
    frame_ix: usize,
    frame: &Frame,
    topology: &Topology,
    solute: &AtomGroup,
    solvents: &[SolventShellSpec<'_>],
) -> Vec<SolvationRecord> {
    let simulation_box = frame.simulation_box.as_ref();
    let mut records = Vec::new();

    for (solute_ix, &solute_atom) in solute.indices().iter().enumerate() {
        let center = &frame.positions[solute_atom];
        for solvent in solvents {
            let mut closest: BTreeMap<usize, (usize, f64)> = BTreeMap::new();
            for (&atom_ix, &res_ix) in solvent
                .group
                .indices()
                .iter()
                .zip(solvent.group.atom_res_ix())
            {
                let dist =
                    minimum_image_distance(center, &frame.positions[atom_ix], simulation_box);
                if dist > solvent.radius {
                    continue;
                }
                closest
                    .entry(res_ix)
                    .and_modify(|best| {
                        if dist < best.1 {
                            *best = (atom_ix, dist);
                        }
                    })
                    .or_insert((atom_ix, dist));
            }
            records.extend(closest.into_iter().map(|(res_ix, (atom_ix, dist))| {
                SolvationRecord {
                    frame: frame_ix,
                    solute_ix,
                    atom_ix,
                    dist,
                    res_name: solvent.name.to_string(),
                    res_ix,
                }
            }));
        }
    }

    debug_assert!(records
        .iter()
        .all(|r| topology.atom(r.atom_ix).is_some_and(|a| a.res_ix == r.res_ix)));
    records
}
