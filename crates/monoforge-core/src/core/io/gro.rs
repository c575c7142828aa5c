use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use nalgebra::{Point3, Vector3};
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Residue and atom numbers are written modulo this value.
const GRO_NUMBER_WRAP: usize = 100_000;
const DEFAULT_TITLE: &str = "Generated by monoforge";

#[derive(Debug, Clone, PartialEq)]
pub struct GroMetadata {
    pub title: String,
}

impl Default for GroMetadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GroError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: GroParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum GroParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for an atom record (must be at least 44 chars)")]
    LineTooShort,
    #[error("Cannot infer an element from atom name '{0}'")]
    UnknownElement(String),
    #[error("Box line needs at least three values")]
    InvalidBox,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_int(line: &str, start: usize, end: usize, line_num: usize) -> Result<isize, GroError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| GroError::Parse {
        line: line_num,
        kind: GroParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

fn parse_float(line: &str, start: usize, end: usize, line_num: usize) -> Result<f64, GroError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| GroError::Parse {
        line: line_num,
        kind: GroParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

/// Infers an element from a GRO atom name such as `Si`, `SI1`, or `HW2`.
fn element_from_atom_name(name: &str) -> Option<Element> {
    let letters: String = name.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    letters
        .get(..2)
        .and_then(|two| two.parse().ok())
        .or_else(|| letters.get(..1).and_then(|one| one.parse().ok()))
}

fn truncate(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// GROMACS coordinate file (`.gro`). Coordinates and box are in nm.
pub struct GroFile;

impl MolecularFile for GroFile {
    type Metadata = GroMetadata;
    type Error = GroError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut lines = reader.lines();
        let title = lines
            .next()
            .transpose()?
            .ok_or_else(|| GroError::MissingRecord("title line".to_string()))?;
        let count_line = lines
            .next()
            .transpose()?
            .ok_or_else(|| GroError::MissingRecord("atom count line".to_string()))?;
        let count_value = count_line.trim();
        let atom_count: usize = count_value.parse().map_err(|_| GroError::Parse {
            line: 2,
            kind: GroParseErrorKind::InvalidInt {
                columns: "1-".to_string(),
                value: count_value.to_string(),
            },
        })?;

        let mut system = MolecularSystem::new();
        let mut current: Option<(isize, String, ResidueId)> = None;
        for index in 0..atom_count {
            let line_num = index + 3;
            let line = lines.next().transpose()?.ok_or_else(|| {
                GroError::MissingRecord(format!("atom {} of {}", index + 1, atom_count))
            })?;
            if line.len() < 44 {
                return Err(GroError::Parse {
                    line: line_num,
                    kind: GroParseErrorKind::LineTooShort,
                });
            }

            let residue_number = parse_int(&line, 0, 5, line_num)?;
            let residue_name = slice_and_trim(&line, 5, 10).to_string();
            let atom_name = slice_and_trim(&line, 10, 15).to_string();
            let position = Point3::new(
                parse_float(&line, 20, 28, line_num)?,
                parse_float(&line, 28, 36, line_num)?,
                parse_float(&line, 36, 44, line_num)?,
            );
            let element = element_from_atom_name(&atom_name).ok_or_else(|| GroError::Parse {
                line: line_num,
                kind: GroParseErrorKind::UnknownElement(atom_name.clone()),
            })?;

            let residue_id = match &current {
                Some((number, name, id)) if *number == residue_number && *name == residue_name => {
                    *id
                }
                _ => {
                    let id = system.add_residue(&residue_name);
                    current = Some((residue_number, residue_name, id));
                    id
                }
            };
            let mut atom = Atom::new(element, residue_id, position);
            atom.name = atom_name;
            system.add_atom_to_residue(residue_id, atom);
        }

        let box_line = lines
            .next()
            .transpose()?
            .ok_or_else(|| GroError::MissingRecord("box line".to_string()))?;
        let values: Vec<f64> = box_line
            .split_whitespace()
            .map(|v| v.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| GroError::Parse {
                line: atom_count + 3,
                kind: GroParseErrorKind::InvalidBox,
            })?;
        if values.len() < 3 {
            return Err(GroError::Parse {
                line: atom_count + 3,
                kind: GroParseErrorKind::InvalidBox,
            });
        }
        system.set_periodicity(Vector3::new(values[0], values[1], values[2]));

        Ok((
            system,
            GroMetadata {
                title: title.trim_end().to_string(),
            },
        ))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", metadata.title)?;
        writeln!(writer, "{:>5}", system.atom_count())?;

        let mut serial = 0usize;
        for (residue_index, (_, residue)) in system.residues_iter().enumerate() {
            let residue_number = (residue_index + 1) % GRO_NUMBER_WRAP;
            let residue_name = truncate(&residue.name, 5);
            for atom_id in residue.atoms() {
                let Some(atom) = system.atom(*atom_id) else {
                    continue;
                };
                serial += 1;
                writeln!(
                    writer,
                    "{:>5}{:<5}{:>5}{:>5}{:>8.3}{:>8.3}{:>8.3}",
                    residue_number,
                    residue_name,
                    truncate(&atom.name, 5),
                    serial % GRO_NUMBER_WRAP,
                    atom.position.x,
                    atom.position.y,
                    atom.position.z
                )?;
            }
        }

        let cell = system.periodicity();
        writeln!(writer, "{:>10.5}{:>10.5}{:>10.5}", cell.x, cell.y, cell.z)?;
        Ok(())
    }

    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::write_to(system, &GroMetadata::default(), writer)
    }
}
