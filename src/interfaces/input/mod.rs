//! The keyed INDSOD parameter record.
//!
//! The record drives one enumeration: which atom type is substituted, by how
//! many atoms of which species, at what coordinate-matching tolerance, and
//! which output files to produce. Keys are `key = value` lines; `#` and `!`
//! open comments; booleans accept the Fortran spellings.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{self, Context};
use lazy_static::lazy_static;
use regex::Regex;

use crate::auxiliary::structure::CrystalStructure;
use crate::drivers::enumeration::{ConfigEnumerationDriver, ConfigEnumerationParams};
use crate::drivers::SubSymDriver;
use crate::errors::SubSymError;
use crate::interfaces::InputHandle;
use crate::io::format::{
    log_display, log_subtitle, log_title, subsym_output, subsym_warn, yes_no,
};
use crate::io::read_sgo;

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;

lazy_static! {
    /// Regular expression pattern for `key = value` lines.
    static ref KEY_VALUE_RE: Regex =
        Regex::new(r"^\s*([A-Za-z]+)\s*=\s*(.*)$").expect("Regex pattern invalid.");
}

/// The maximum number of substituting species an INDSOD record may declare.
const MAX_SPECIES: usize = 5;

// ==================
// Struct definitions
// ==================

/// The parsed INDSOD record.
#[derive(Clone, Debug, PartialEq)]
pub struct IndsodParams {
    /// The number of substituting species (`nsub`).
    pub nsub: usize,

    /// The species multiplicities (`subs`); the first `nsub` entries count.
    pub subs: Vec<usize>,

    /// The species symbols (`symb`).
    pub symb: Vec<String>,

    /// The coordinate-matching tolerance (`prec`).
    pub prec: f64,

    /// The 1-based substituted atom type (`site`).
    pub site: usize,

    /// Write the equivalent-site mapping (`leqa`).
    pub leqa: bool,

    /// Write the operator matrices (`lspg`).
    pub lspg: bool,

    /// Write the configuration list and degeneracies (`lcfg`).
    pub lcfg: bool,

    /// Write one structure file per irreducible configuration (`lpos`).
    pub lpos: bool,

    /// Draw a progress bar during the walk (`lpro`).
    pub lpro: bool,
}

impl Default for IndsodParams {
    fn default() -> Self {
        Self {
            nsub: 2,
            subs: Vec::new(),
            symb: Vec::new(),
            prec: 1e-5,
            site: 1,
            leqa: false,
            lspg: false,
            lcfg: true,
            lpos: false,
            lpro: false,
        }
    }
}

impl IndsodParams {
    /// Parses an INDSOD record from its textual content.
    ///
    /// # Errors
    ///
    /// [`SubSymError::InputValidation`] on malformed lines, unknown keys, or
    /// unparsable values.
    pub fn parse(content: &str) -> Result<Self, SubSymError> {
        let mut params = Self::default();
        for (lineno, raw) in content.lines().enumerate() {
            let line = raw
                .split(['#', '!'])
                .next()
                .expect("A split yields at least one piece.")
                .trim();
            if line.is_empty() {
                continue;
            }
            let captures = KEY_VALUE_RE.captures(line).ok_or_else(|| {
                SubSymError::InputValidation(format!(
                    "INDSOD line {}: `{line}` is not a `key = value` record",
                    lineno + 1
                ))
            })?;
            let key = captures[1].to_lowercase();
            let value = captures[2].trim();
            let bad = |what: &str| {
                SubSymError::InputValidation(format!(
                    "INDSOD line {}: `{value}` is not {what}",
                    lineno + 1
                ))
            };
            match key.as_str() {
                "nsub" => {
                    params.nsub = value.parse().map_err(|_| bad("an integer"))?;
                }
                "subs" => {
                    params.subs = split_values(value)
                        .map(|tok| tok.parse::<usize>().map_err(|_| bad("an integer sequence")))
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "symb" => {
                    params.symb = split_values(value).map(str::to_string).collect();
                }
                "prec" => {
                    params.prec = value.parse().map_err(|_| bad("a real number"))?;
                }
                "site" => {
                    params.site = value.parse().map_err(|_| bad("an integer"))?;
                }
                "leqa" => params.leqa = parse_bool(value).ok_or_else(|| bad("a boolean"))?,
                "lspg" => params.lspg = parse_bool(value).ok_or_else(|| bad("a boolean"))?,
                "lcfg" => params.lcfg = parse_bool(value).ok_or_else(|| bad("a boolean"))?,
                "lpos" => params.lpos = parse_bool(value).ok_or_else(|| bad("a boolean"))?,
                "lpro" => params.lpro = parse_bool(value).ok_or_else(|| bad("a boolean"))?,
                _ => {
                    return Err(SubSymError::InputValidation(format!(
                        "INDSOD line {}: unrecognised key `{key}`",
                        lineno + 1
                    )));
                }
            }
        }
        Ok(params)
    }

    /// Reads and parses an INDSOD file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SubSymError> {
        let content = fs::read_to_string(&path).map_err(|err| {
            SubSymError::InputValidation(format!(
                "cannot read {}: {err}",
                path.as_ref().display()
            ))
        })?;
        Self::parse(&content)
    }

    /// Validates the record against the structure it substitutes into.
    ///
    /// # Errors
    ///
    /// [`SubSymError::InputValidation`] or
    /// [`SubSymError::StructuralInconsistency`] on any violation.
    pub fn validate(&self, structure: &CrystalStructure) -> Result<(), SubSymError> {
        if !(2..=MAX_SPECIES).contains(&self.nsub) {
            return Err(SubSymError::InputValidation(format!(
                "nsub = {} lies outside 2..={MAX_SPECIES}",
                self.nsub
            )));
        }
        if self.subs.len() < self.nsub {
            return Err(SubSymError::InputValidation(format!(
                "subs provides {} multiplicities, nsub = {} required",
                self.subs.len(),
                self.nsub
            )));
        }
        if self.subs.len() > MAX_SPECIES {
            return Err(SubSymError::InputValidation(format!(
                "subs provides {} multiplicities, at most {MAX_SPECIES} allowed",
                self.subs.len()
            )));
        }
        if self.subs.len() > self.nsub {
            subsym_warn!(
                "subs provides {} multiplicities; only the first {} are used.",
                self.subs.len(),
                self.nsub
            );
        }
        if let Some(j) = self.subs[..self.nsub].iter().position(|&k| k == 0) {
            return Err(SubSymError::InputValidation(format!(
                "subs entry {} is zero; every substituting species needs atoms",
                j + 1
            )));
        }
        if self.symb.len() != self.nsub {
            return Err(SubSymError::InputValidation(format!(
                "symb provides {} symbols, nsub = {} required",
                self.symb.len(),
                self.nsub
            )));
        }
        if let Some(symbol) = self
            .symb
            .iter()
            .find(|symbol| symbol.is_empty() || symbol.chars().count() > 2)
        {
            return Err(SubSymError::InputValidation(format!(
                "species symbol `{symbol}` is not a one- or two-character label"
            )));
        }
        if !(self.prec > 0.0 && self.prec <= 1e-2) {
            return Err(SubSymError::InputValidation(format!(
                "prec = {:e} lies outside (0, 1e-2]",
                self.prec
            )));
        }
        if self.site == 0 || self.site > structure.n_types() {
            return Err(SubSymError::StructuralInconsistency(format!(
                "site = {} does not index a type of the structure (1..={})",
                self.site,
                structure.n_types()
            )));
        }
        let available = structure.counts[self.site - 1];
        if available == 0 {
            return Err(SubSymError::StructuralInconsistency(format!(
                "site type {} holds no atoms",
                self.site
            )));
        }
        let required: usize = self.subs[..self.nsub].iter().sum();
        if required != available {
            return Err(SubSymError::InputValidation(format!(
                "subs sums to {required}, but type {} holds {available} atoms",
                self.site
            )));
        }
        Ok(())
    }

    /// Converts the record into enumeration-driver parameters.
    pub fn to_enumeration_params(
        &self,
        directory: &Path,
    ) -> Result<ConfigEnumerationParams, anyhow::Error> {
        ConfigEnumerationParams::builder()
            .composition(&self.subs[..self.nsub])
            .species_symbols(&self.symb[..self.nsub])
            .site_type(self.site - 1)
            .prec(self.prec)
            .write_equivalence_table(self.leqa)
            .write_operator_matrices(self.lspg)
            .write_configurations(self.lcfg)
            .write_structures(self.lpos)
            .show_progress(self.lpro)
            .directory(directory.to_path_buf())
            .build()
            .context("Unable to construct configuration-enumeration parameters from INDSOD")
    }
}

impl fmt::Display for IndsodParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<5}: {}", "nsub", self.nsub)?;
        writeln!(
            f,
            "{:<5}: {}",
            "subs",
            self.subs.iter().map(usize::to_string).collect::<Vec<_>>().join(" ")
        )?;
        writeln!(f, "{:<5}: {}", "symb", self.symb.join(" "))?;
        writeln!(f, "{:<5}: {:.3e}", "prec", self.prec)?;
        writeln!(f, "{:<5}: {}", "site", self.site)?;
        writeln!(f, "{:<5}: {}", "leqa", yes_no(self.leqa))?;
        writeln!(f, "{:<5}: {}", "lspg", yes_no(self.lspg))?;
        writeln!(f, "{:<5}: {}", "lcfg", yes_no(self.lcfg))?;
        writeln!(f, "{:<5}: {}", "lpos", yes_no(self.lpos))?;
        writeln!(f, "{:<5}: {}", "lpro", yes_no(self.lpro))?;
        Ok(())
    }
}

// -----------
// IndsodInput
// -----------

/// A full input specification: the working directory and the INDSOD record
/// found in it.
#[derive(Clone, Debug)]
pub struct IndsodInput {
    /// The working directory holding `INDSOD`, `SPOSCAR` and `SGO`.
    pub directory: PathBuf,

    /// The parsed parameter record.
    pub params: IndsodParams,
}

impl IndsodInput {
    /// Locates and parses the `INDSOD` record in a working directory.
    pub fn from_directory<P: AsRef<Path>>(directory: P) -> Result<Self, anyhow::Error> {
        let directory = directory.as_ref().to_path_buf();
        let params = IndsodParams::from_file(directory.join("INDSOD"))?;
        Ok(Self { directory, params })
    }
}

impl InputHandle for IndsodInput {
    /// Handles the input: reads the structure and the operator hand-off,
    /// validates the record against them, and runs the enumeration driver.
    fn handle(&self) -> Result<(), anyhow::Error> {
        log_title("Calculation Summary");
        subsym_output!("");
        log_subtitle("INDSOD record");
        log_display(&self.params);
        subsym_output!("");

        let structure = CrystalStructure::from_poscar(self.directory.join("SPOSCAR"))
            .context("Unable to read the SPOSCAR structure file")?;
        subsym_output!(
            "Structure: {} ({} atoms over {} types)",
            structure.comment,
            structure.n_atoms(),
            structure.n_types()
        );
        self.params
            .validate(&structure)
            .context("INDSOD validation against the structure failed")?;

        let operations = read_sgo(self.directory.join("SGO"))
            .context("Unable to read the SGO operator file")?;
        subsym_output!("Operators: {}", operations.len());
        subsym_output!("");

        let params = self.params.to_enumeration_params(&self.directory)?;
        let mut driver = ConfigEnumerationDriver::builder()
            .parameters(&params)
            .structure(&structure)
            .operations(&operations)
            .build()
            .context("Unable to construct a configuration-enumeration driver")?;
        driver
            .run()
            .context("Unable to execute the configuration-enumeration driver successfully")
    }
}

// =========
// Functions
// =========

/// Splits a value field on whitespace and commas.
fn split_values(value: &str) -> impl Iterator<Item = &str> {
    value
        .split([' ', '\t', ','])
        .filter(|tok| !tok.is_empty())
}

/// Parses a Fortran-style boolean.
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        ".true." | "t" | "true" => Some(true),
        ".false." | "f" | "false" => Some(false),
        _ => None,
    }
}
