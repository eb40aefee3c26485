use crate::core::io::traits::TrajectoryFile;
use crate::core::models::atom::Atom;
use crate::core::models::frame::{Frame, SimulationBox};
use crate::core::models::topology::{Topology, TopologyError};
use crate::core::models::trajectory::{Trajectory, TrajectoryError};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const BOX_KEY: &str = "box=";
const FIELDS_PER_ATOM: usize = 7;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Inconsistent data on line {line}: {message}")]
    Inconsistency { line: usize, message: String },
    #[error("Unexpected end of file while reading {0}")]
    UnexpectedEof(String),
    #[error("File contains no frames")]
    Empty,
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Expected {expected} whitespace-separated fields, found {found}")]
    MissingFields { expected: usize, found: usize },
    #[error("Invalid integer in field '{field}' (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Box specification must be three numbers after 'box=' (found: '{0}')")]
    InvalidBox(String),
}

/// Annotated multi-frame XYZ.
///
/// Each frame is an atom count line, a comment line that may contain
/// `box=Lx Ly Lz`, then one `name type res_name res_ix x y z` line per atom.
/// The first frame defines the topology.
pub struct XyzFile;

struct LineSource<I> {
    lines: I,
    line_num: usize,
}

impl<I: Iterator<Item = io::Result<String>>> LineSource<I> {
    fn next_line(&mut self) -> Result<Option<String>, XyzError> {
        match self.lines.next() {
            Some(line) => {
                self.line_num += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn require_line(&mut self, what: &str) -> Result<String, XyzError> {
        self.next_line()?
            .ok_or_else(|| XyzError::UnexpectedEof(what.to_string()))
    }

    fn parse_error(&self, kind: XyzParseErrorKind) -> XyzError {
        XyzError::Parse {
            line: self.line_num,
            kind,
        }
    }
}

fn parse_box(comment: &str) -> Result<Option<SimulationBox>, XyzParseErrorKind> {
    let Some(start) = comment.find(BOX_KEY) else {
        return Ok(None);
    };
    let spec = comment[start + BOX_KEY.len()..].trim();
    let values: Vec<f64> = spec
        .split_whitespace()
        .take(3)
        .map(|v| v.trim_matches('"').parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| XyzParseErrorKind::InvalidBox(spec.to_string()))?;
    if values.len() != 3 {
        return Err(XyzParseErrorKind::InvalidBox(spec.to_string()));
    }
    Ok(Some(SimulationBox::new(values[0], values[1], values[2])))
}

fn parse_atom_line(line: &str) -> Result<(Atom, Point3<f64>), XyzParseErrorKind> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < FIELDS_PER_ATOM {
        return Err(XyzParseErrorKind::MissingFields {
            expected: FIELDS_PER_ATOM,
            found: fields.len(),
        });
    }
    let res_ix: usize = fields[3]
        .parse()
        .map_err(|_| XyzParseErrorKind::InvalidInt {
            field: "res_ix",
            value: fields[3].into(),
        })?;
    let coord = |field: &'static str, value: &str| -> Result<f64, XyzParseErrorKind> {
        value.parse().map_err(|_| XyzParseErrorKind::InvalidFloat {
            field,
            value: value.into(),
        })
    };
    let x = coord("x", fields[4])?;
    let y = coord("y", fields[5])?;
    let z = coord("z", fields[6])?;

    Ok((
        Atom::new(fields[0], fields[1], fields[2], res_ix),
        Point3::new(x, y, z),
    ))
}

impl TrajectoryFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Trajectory, Self::Error> {
        let mut source = LineSource {
            lines: reader.lines(),
            line_num: 0,
        };
        let mut atoms: Vec<Atom> = Vec::new();
        let mut frames: Vec<Frame> = Vec::new();

        loop {
            let count_line = loop {
                match source.next_line()? {
                    Some(line) if line.trim().is_empty() => continue,
                    other => break other,
                }
            };
            let Some(count_line) = count_line else {
                break;
            };

            let n_atoms: usize = count_line.trim().parse().map_err(|_| {
                source.parse_error(XyzParseErrorKind::InvalidAtomCount(
                    count_line.trim().to_string(),
                ))
            })?;
            let comment = source.require_line("frame comment line")?;
            let simulation_box = parse_box(&comment).map_err(|k| source.parse_error(k))?;

            let frame_ix = frames.len();
            if frame_ix > 0 && n_atoms != atoms.len() {
                return Err(XyzError::Inconsistency {
                    line: source.line_num - 1,
                    message: format!(
                        "frame {} has {} atoms, the first frame has {}",
                        frame_ix,
                        n_atoms,
                        atoms.len()
                    ),
                });
            }

            let mut positions = Vec::with_capacity(n_atoms);
            for atom_ix in 0..n_atoms {
                let line = source.require_line(&format!("atom {} of frame {}", atom_ix, frame_ix))?;
                let (atom, position) = parse_atom_line(&line).map_err(|k| source.parse_error(k))?;
                if frame_ix == 0 {
                    atoms.push(atom);
                } else if atoms[atom_ix] != atom {
                    return Err(XyzError::Inconsistency {
                        line: source.line_num,
                        message: format!(
                            "atom {} is {:?} but was {:?} in the first frame",
                            atom_ix, atom, atoms[atom_ix]
                        ),
                    });
                }
                positions.push(position);
            }
            frames.push(Frame::new(positions, simulation_box));
        }

        if frames.is_empty() {
            return Err(XyzError::Empty);
        }
        let topology = Topology::new(atoms)?;
        Ok(Trajectory::new(topology, frames)?)
    }

    fn write_to(trajectory: &Trajectory, writer: &mut impl Write) -> Result<(), Self::Error> {
        let atoms = trajectory.topology().atoms();
        for (frame_ix, frame) in trajectory.frames().iter().enumerate() {
            writeln!(writer, "{}", atoms.len())?;
            match &frame.simulation_box {
                Some(bx) => writeln!(
                    writer,
                    "frame {} {}{:.6} {:.6} {:.6}",
                    frame_ix, BOX_KEY, bx.lengths.x, bx.lengths.y, bx.lengths.z
                )?,
                None => writeln!(writer, "frame {}", frame_ix)?,
            }
            for (atom, pos) in atoms.iter().zip(&frame.positions) {
                writeln!(
                    writer,
                    "{} {} {} {} {:.6} {:.6} {:.6}",
                    atom.name, atom.atom_type, atom.res_name, atom.res_ix, pos.x, pos.y, pos.z
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_FRAMES: &str = "\
3
frame 0 box=10.0 10.0 10.0
Li 22 LI 0 0.0 0.0 0.0
O1 3 EC 1 2.0 0.0 0.0
C1 1 EC 1 3.0 0.0 0.0

3
frame 1 box=10.0 10.0 10.0
Li 22 LI 0 0.5 0.0 0.0
O1 3 EC 1 4.5 0.0 0.0
C1 1 EC 1 5.5 0.0 0.0
";

    fn read(input: &str) -> Result<Trajectory, XyzError> {
        XyzFile::read_from(&mut Cursor::new(input.as_bytes()))
    }

    #[test]
    fn reads_topology_frames_and_box() {
        let trajectory = read(TWO_FRAMES).unwrap();

        assert_eq!(trajectory.n_frames(), 2);
        assert_eq!(trajectory.topology().n_atoms(), 3);
        assert_eq!(trajectory.topology().n_residues(), 2);
        let frame = &trajectory.frames()[1];
        assert_eq!(frame.positions[1], Point3::new(4.5, 0.0, 0.0));
        assert_eq!(frame.simulation_box, Some(SimulationBox::new(10.0, 10.0, 10.0)));
    }

    #[test]
    fn frame_without_box_has_no_box() {
        let trajectory = read("1\nno box here\nLi 22 LI 0 1.0 2.0 3.0\n").unwrap();
        assert!(trajectory.frames()[0].simulation_box.is_none());
    }

    #[test]
    fn invalid_coordinate_reports_line_number() {
        let err = read("1\n\nLi 22 LI 0 1.0 abc 3.0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                line: 3,
                kind: XyzParseErrorKind::InvalidFloat { field: "y", .. }
            }
        ));
    }

    #[test]
    fn short_atom_line_is_rejected() {
        let err = read("1\n\nLi 22 LI 0 1.0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::MissingFields {
                    expected: 7,
                    found: 5
                },
                ..
            }
        ));
    }

    #[test]
    fn truncated_frame_is_unexpected_eof() {
        let err = read("2\n\nLi 22 LI 0 1.0 2.0 3.0\n").unwrap_err();
        assert!(matches!(err, XyzError::UnexpectedEof(_)));
    }

    #[test]
    fn changing_atom_labels_between_frames_is_inconsistent() {
        let input = "1\n\nLi 22 LI 0 0 0 0\n1\n\nNa 22 LI 0 0 0 0\n";
        let err = read(input).unwrap_err();
        assert!(matches!(err, XyzError::Inconsistency { line: 6, .. }));
    }

    #[test]
    fn empty_input_has_no_frames() {
        assert!(matches!(read("\n\n").unwrap_err(), XyzError::Empty));
    }

    #[test]
    fn malformed_box_is_rejected() {
        let err = read("1\nbox=10 10\nLi 22 LI 0 0 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                line: 2,
                kind: XyzParseErrorKind::InvalidBox(_)
            }
        ));
    }

    #[test]
    fn written_trajectory_reads_back_identically() {
        let trajectory = read(TWO_FRAMES).unwrap();
        let mut buffer = Vec::new();
        XyzFile::write_to(&trajectory, &mut buffer).unwrap();

        let reread = read(std::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(reread, trajectory);
    }
}
