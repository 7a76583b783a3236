//! File input and output: the operator hand-off file, the table and
//! configuration writers, and binary persistence of enumeration results.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow;
use bincode;
use itertools::Itertools;
use serde::{de::DeserializeOwned, Serialize};

use crate::configuration::ConfigCodec;
use crate::enumeration::EnumeratedOrbit;
use crate::errors::SubSymError;
use crate::symmetry::{SiteAction, SymmetryOperation};

pub(crate) mod format;

/// Extension carried by saved enumeration results.
pub const ENUMERATION_EXT: &str = "subsym.enm";

fn enumeration_path<P: AsRef<Path>>(name: P) -> PathBuf {
    name.as_ref().with_extension(ENUMERATION_EXT)
}

/// Saves an enumeration result under `name`, with the [`ENUMERATION_EXT`]
/// extension appended, in a compact binary encoding. A later run can pick
/// the orbits back up with [`load_enumeration`] instead of re-sieving.
pub fn save_enumeration<T, P>(name: P, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let writer = BufWriter::new(File::create(enumeration_path(name))?);
    bincode::serialize_into(writer, value)?;
    Ok(())
}

/// Restores an enumeration result written by [`save_enumeration`]; `name` is
/// the save name without the extension.
pub fn load_enumeration<T, P>(name: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let reader = BufReader::new(File::open(enumeration_path(name))?);
    Ok(bincode::deserialize_from(reader)?)
}

/// Reads space-group operations from an `SGO`-format file: a stream of
/// 12-value blocks, three fractional rotation rows followed by the
/// translation, with `#` or `!` comment lines ignored.
pub fn read_sgo<P: AsRef<Path>>(path: P) -> Result<Vec<SymmetryOperation>, SubSymError> {
    let content = fs::read_to_string(&path).map_err(|err| {
        SubSymError::InputValidation(format!(
            "cannot read operator file {}: {err}",
            path.as_ref().display()
        ))
    })?;
    let values = content
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with('#') && !trimmed.starts_with('!')
        })
        .flat_map(str::split_whitespace)
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| {
                SubSymError::InputValidation(format!(
                    "operator file {} holds a non-numeric token `{tok}`",
                    path.as_ref().display()
                ))
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    if values.is_empty() || values.len() % 12 != 0 {
        return Err(SubSymError::InputValidation(format!(
            "operator file {} holds {} values, not a positive multiple of 12",
            path.as_ref().display(),
            values.len()
        )));
    }

    Ok(values
        .chunks_exact(12)
        .map(|block| SymmetryOperation {
            rotation: nalgebra::Matrix3::new(
                block[0], block[1], block[2], block[3], block[4], block[5], block[6], block[7],
                block[8],
            ),
            translation: nalgebra::Vector3::new(block[9], block[10], block[11]),
        })
        .collect_vec())
}

/// Writes the equivalent-site mapping the enumerator used: a `n o` header
/// followed by one 1-based image row per operation.
pub fn write_eqamat<P: AsRef<Path>>(action: &SiteAction, path: P) -> Result<(), anyhow::Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{} {}", action.n_sites(), action.n_operations())?;
    for q in 0..action.n_operations() {
        writeln!(
            writer,
            "{}",
            action.operation(q).iter().map(|img| img + 1).join(" ")
        )?;
    }
    Ok(())
}

/// Echoes the operator matrices in the `SGO` block format, so the written
/// file can be fed back as an operator hand-off.
pub fn write_spgmat<P: AsRef<Path>>(
    operations: &[SymmetryOperation],
    path: P,
) -> Result<(), anyhow::Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    for (q, op) in operations.iter().enumerate() {
        writeln!(writer, "# operation {}", q + 1)?;
        for row in 0..3 {
            writeln!(
                writer,
                "  {:>12.6} {:>12.6} {:>12.6}",
                op.rotation[(row, 0)],
                op.rotation[(row, 1)],
                op.rotation[(row, 2)]
            )?;
        }
        writeln!(
            writer,
            "  {:>12.6} {:>12.6} {:>12.6}",
            op.translation[0], op.translation[1], op.translation[2]
        )?;
    }
    Ok(())
}

/// Writes one decoded assignment line per orbit (1-based species labels).
pub fn write_confgl<P: AsRef<Path>>(
    orbits: &[EnumeratedOrbit],
    codec: &ConfigCodec,
    path: P,
) -> Result<(), anyhow::Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    for orbit in orbits {
        let assignment = codec.rank_to_assignment(orbit.rank)?;
        writeln!(
            writer,
            "{}",
            assignment.iter().map(|&a| u32::from(a) + 1).join(" ")
        )?;
    }
    Ok(())
}

/// Writes one degeneracy per orbit line.
pub fn write_confgd<P: AsRef<Path>>(
    orbits: &[EnumeratedOrbit],
    path: P,
) -> Result<(), anyhow::Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    for orbit in orbits {
        writeln!(writer, "{}", orbit.degeneracy)?;
    }
    Ok(())
}
