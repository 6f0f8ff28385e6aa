use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::builder::StructureBuilder;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn char_at(line: &str, index: usize) -> Option<char> {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

fn parse_coordinate(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

#[derive(Debug, PartialEq)]
struct ResidueKey {
    number: isize,
    insertion_code: Option<char>,
    name: String,
}

/// Reader and writer for the fixed-column PDB format.
///
/// Only coordinate records are interpreted: `MODEL`/`ENDMDL` delimit models,
/// `TER` closes a chain and `ATOM`/`HETATM` carry atoms. Alternate locations
/// keep the first conformer seen. Files without `MODEL` records hold a
/// single model numbered 1.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn extension() -> &'static str {
        "pdb"
    }

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut builder = StructureBuilder::new();
        let mut atom_count = 0usize;
        let mut current_chain: Option<char> = None;
        let mut current_residue: Option<ResidueKey> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "MODEL" => {
                    let value = line.get(6..).unwrap_or("").trim();
                    let number: usize = value.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "11-14".into(),
                            value: value.into(),
                        },
                    })?;
                    builder.start_model(number);
                    current_chain = None;
                    current_residue = None;
                }
                "TER" | "ENDMDL" => {
                    current_chain = None;
                    current_residue = None;
                }
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let res_seq_str = slice_and_trim(&line, 22, 26);
                    let res_seq: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "23-26".into(),
                            value: res_seq_str.into(),
                        },
                    })?;
                    let serial = slice_and_trim(&line, 6, 11).parse().unwrap_or(0);
                    let chain_id = char_at(&line, 21).unwrap_or('A');
                    let key = ResidueKey {
                        number: res_seq,
                        insertion_code: char_at(&line, 26),
                        name: slice_and_trim(&line, 17, 20).to_string(),
                    };
                    let position = Point3::new(
                        parse_coordinate(&line, line_num, 30, 38)?,
                        parse_coordinate(&line, line_num, 38, 46)?,
                        parse_coordinate(&line, line_num, 46, 54)?,
                    );

                    if current_chain != Some(chain_id) {
                        builder.start_chain(chain_id);
                        current_chain = Some(chain_id);
                        current_residue = None;
                    }
                    if current_residue.as_ref() != Some(&key) {
                        builder.start_residue(key.number, key.insertion_code, &key.name);
                        current_residue = Some(key);
                    }

                    let mut atom = Atom::new(name, position).with_serial(serial);
                    let element = slice_and_trim(&line, 76, 78);
                    if !element.is_empty() {
                        atom = atom.with_element(element);
                    }
                    builder.add_atom(atom);
                    atom_count += 1;
                }
                _ => {}
            }
        }

        if atom_count == 0 {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok(builder.build())
    }

    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        let multi_model = structure.models().len() > 1;
        for model in structure.models() {
            if multi_model {
                writeln!(writer, "MODEL     {:>4}", model.number)?;
            }
            let mut serial = 0usize;
            for chain in model.chains() {
                for residue in chain.residues() {
                    let record_type = if residue.molecule_type.is_some() {
                        "ATOM"
                    } else {
                        "HETATM"
                    };
                    for atom in residue.atoms() {
                        serial += 1;
                        let element = atom
                            .element
                            .clone()
                            .or_else(|| {
                                atom.name
                                    .chars()
                                    .find(|c| c.is_ascii_alphabetic())
                                    .map(String::from)
                            })
                            .unwrap_or_default();
                        writeln!(
                            writer,
                            "{:<6}{:>5} {:<4} {:>3} {:1}{:>4}{:1}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                            record_type,
                            serial % 100_000,
                            atom_name_field(&atom.name),
                            residue.name,
                            chain.id,
                            residue.number,
                            residue.insertion_code.unwrap_or(' '),
                            atom.position.x,
                            atom.position.y,
                            atom.position.z,
                            1.0,
                            0.0,
                            element,
                        )?;
                    }
                }
                serial += 1;
                writeln!(writer, "TER   {:>5}", serial % 100_000)?;
            }
            if multi_model {
                writeln!(writer, "ENDMDL")?;
            }
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}

// Names shorter than four characters start in column 14.
fn atom_name_field(name: &str) -> String {
    if name.len() < 4 {
        format!(" {}", name)
    } else {
        name.to_string()
    }
}
