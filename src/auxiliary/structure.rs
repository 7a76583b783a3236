//! Crystal structures in the VASP POSCAR format.
//!
//! The structural collaborator of the enumeration core: it supplies the
//! lattice, the per-type symbols and counts, and the fractional coordinates
//! of the substitution sublattice, and writes decorated structures back out,
//! one per irreducible configuration.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use nalgebra::{Matrix3, Vector3};

use crate::errors::SubSymError;

#[cfg(test)]
#[path = "structure_tests.rs"]
mod structure_tests;

// ==================
// Struct definitions
// ==================

/// A periodic crystal structure: lattice vectors, atom types, and fractional
/// coordinates grouped by type.
#[derive(Clone, Debug, PartialEq)]
pub struct CrystalStructure {
    /// The header comment line.
    pub comment: String,

    /// Lattice vectors as the rows of a 3×3 matrix.
    pub lattice: Matrix3<f64>,

    /// One chemical symbol per atom type.
    pub symbols: Vec<String>,

    /// The number of atoms of each type.
    pub counts: Vec<usize>,

    /// Fractional coordinates, concatenated in type order.
    pub coordinates: Vec<Vector3<f64>>,
}

impl CrystalStructure {
    /// Reads a POSCAR-format structure file.
    pub fn from_poscar<P: AsRef<Path>>(path: P) -> Result<Self, SubSymError> {
        let content = fs::read_to_string(&path).map_err(|err| {
            SubSymError::StructuralInconsistency(format!(
                "cannot read {}: {err}",
                path.as_ref().display()
            ))
        })?;
        Self::parse(&content)
    }

    /// Parses POSCAR-format content: comment, scale, three lattice vectors,
    /// symbols, counts, `Direct`, and one fractional coordinate line per
    /// atom.
    pub fn parse(content: &str) -> Result<Self, SubSymError> {
        let bad = |msg: String| SubSymError::StructuralInconsistency(msg);
        let mut lines = content.lines();
        let mut next_line = |what: &str| {
            lines
                .next()
                .ok_or_else(|| bad(format!("file ends before the {what} line")))
        };

        let comment = next_line("comment")?.trim_end().to_string();

        let scale: f64 = next_line("scale")?
            .trim()
            .parse()
            .map_err(|_| bad("the scale line is not a number".to_string()))?;

        let mut lattice = Matrix3::zeros();
        for row in 0..3 {
            let values = parse_floats(next_line("lattice-vector")?);
            if values.len() < 3 {
                return Err(bad(format!("lattice vector {} has fewer than 3 components", row + 1)));
            }
            for (col, &v) in values.iter().take(3).enumerate() {
                lattice[(row, col)] = v * scale;
            }
        }

        let symbol_line = next_line("atom-symbol")?;
        let symbols = symbol_line
            .split_whitespace()
            .map(str::to_string)
            .collect_vec();
        if symbols.is_empty() || symbols[0].parse::<usize>().is_ok() {
            return Err(bad(
                "the atom-symbol line is missing (count-only POSCAR files are not supported)"
                    .to_string(),
            ));
        }

        let counts = next_line("atom-count")?
            .split_whitespace()
            .map(|tok| {
                tok.parse::<usize>()
                    .map_err(|_| bad(format!("atom count `{tok}` is not an integer")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if counts.len() != symbols.len() {
            return Err(bad(format!(
                "{} atom symbols but {} counts",
                symbols.len(),
                counts.len()
            )));
        }

        let mode = next_line("coordinate-mode")?.trim();
        if !mode.starts_with(['D', 'd']) {
            return Err(bad(format!(
                "coordinate mode `{mode}` is not supported; fractional (`Direct`) \
                 coordinates are required"
            )));
        }

        let n_atoms: usize = counts.iter().sum();
        let mut coordinates = Vec::with_capacity(n_atoms);
        for i in 0..n_atoms {
            let values = parse_floats(next_line("coordinate")?);
            if values.len() < 3 {
                return Err(bad(format!("coordinate line {} has fewer than 3 values", i + 1)));
            }
            coordinates.push(Vector3::new(values[0], values[1], values[2]));
        }

        Ok(Self {
            comment,
            lattice,
            symbols,
            counts,
            coordinates,
        })
    }

    /// The total number of atoms.
    pub fn n_atoms(&self) -> usize {
        self.counts.iter().sum()
    }

    /// The number of atom types.
    pub fn n_types(&self) -> usize {
        self.counts.len()
    }

    /// The coordinates of one atom type (0-based type index).
    ///
    /// # Errors
    ///
    /// [`SubSymError::StructuralInconsistency`] if the type index is out of
    /// range or the type holds no atoms.
    pub fn type_coordinates(&self, type_index: usize) -> Result<&[Vector3<f64>], SubSymError> {
        if type_index >= self.n_types() {
            return Err(SubSymError::StructuralInconsistency(format!(
                "site type {} does not exist; the structure has {} types",
                type_index + 1,
                self.n_types()
            )));
        }
        if self.counts[type_index] == 0 {
            return Err(SubSymError::StructuralInconsistency(format!(
                "site type {} ({}) holds no atoms",
                type_index + 1,
                self.symbols[type_index]
            )));
        }
        let start: usize = self.counts[..type_index].iter().sum();
        Ok(&self.coordinates[start..start + self.counts[type_index]])
    }

    /// Renders the structure in POSCAR format.
    pub fn to_poscar(&self) -> String {
        let mut out = String::new();
        writeln!(out, "{}", self.comment).expect("Writing to a string cannot fail.");
        writeln!(out, "   1.0").expect("Writing to a string cannot fail.");
        for row in 0..3 {
            writeln!(
                out,
                "  {:>22.16e} {:>22.16e} {:>22.16e}",
                self.lattice[(row, 0)],
                self.lattice[(row, 1)],
                self.lattice[(row, 2)]
            )
            .expect("Writing to a string cannot fail.");
        }
        writeln!(out, "   {}", self.symbols.iter().join(" "))
            .expect("Writing to a string cannot fail.");
        writeln!(out, "   {}", self.counts.iter().join(" "))
            .expect("Writing to a string cannot fail.");
        writeln!(out, "Direct").expect("Writing to a string cannot fail.");
        for coord in &self.coordinates {
            writeln!(
                out,
                "  {:>18.16} {:>18.16} {:>18.16}",
                coord[0], coord[1], coord[2]
            )
            .expect("Writing to a string cannot fail.");
        }
        out
    }

    /// Writes the structure to a POSCAR-format file.
    pub fn write_poscar<P: AsRef<Path>>(&self, path: P) -> Result<(), SubSymError> {
        fs::write(&path, self.to_poscar()).map_err(|err| {
            SubSymError::StructuralInconsistency(format!(
                "cannot write {}: {err}",
                path.as_ref().display()
            ))
        })
    }

    /// Builds the structure obtained by replacing the substituted type with
    /// the substituting species, each species block holding the sublattice
    /// sites its assignment claims.
    ///
    /// # Arguments
    ///
    /// * `site_type` - The 0-based index of the substituted type.
    /// * `sublattice` - The sublattice coordinates in the site order the
    ///   assignment refers to (after any orbit relabelling).
    /// * `assignment` - One 0-based species label per sublattice site.
    /// * `species_symbols` - One chemical symbol per substituting species.
    pub fn decorated(
        &self,
        site_type: usize,
        sublattice: &[Vector3<f64>],
        assignment: &[u8],
        species_symbols: &[String],
        comment: &str,
    ) -> Result<CrystalStructure, SubSymError> {
        if site_type >= self.n_types() {
            return Err(SubSymError::StructuralInconsistency(format!(
                "site type {} does not exist; the structure has {} types",
                site_type + 1,
                self.n_types()
            )));
        }

        let mut symbols = Vec::new();
        let mut counts = Vec::new();
        let mut coordinates = Vec::new();
        for t in 0..self.n_types() {
            if t == site_type {
                for (j, symbol) in species_symbols.iter().enumerate() {
                    let label = u8::try_from(j).expect("Species labels fit u8.");
                    let sites = assignment
                        .iter()
                        .positions(|&a| a == label)
                        .collect_vec();
                    symbols.push(symbol.clone());
                    counts.push(sites.len());
                    coordinates.extend(sites.into_iter().map(|site| sublattice[site]));
                }
            } else {
                symbols.push(self.symbols[t].clone());
                counts.push(self.counts[t]);
                let start: usize = self.counts[..t].iter().sum();
                coordinates.extend_from_slice(&self.coordinates[start..start + self.counts[t]]);
            }
        }

        Ok(CrystalStructure {
            comment: comment.to_string(),
            lattice: self.lattice,
            symbols,
            counts,
            coordinates,
        })
    }
}

/// Extracts the leading whitespace-separated floats of a line.
fn parse_floats(line: &str) -> Vec<f64> {
    line.split_whitespace()
        .map_while(|tok| tok.parse::<f64>().ok())
        .collect_vec()
}
