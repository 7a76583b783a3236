//! Driver for the irreducible enumeration of substitutional configurations.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::{self, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::auxiliary::structure::CrystalStructure;
use crate::configuration::Composition;
use crate::drivers::SubSymDriver;
use crate::enumeration::{EnumerationOutcome, Enumerator};
use crate::errors::SubSymError;
use crate::io::format::{
    log_display, log_subtitle, log_title, subsym_error, subsym_output, write_subtitle,
    ProgressBar, yes_no,
};
use crate::io::{
    save_enumeration, write_confgd, write_confgl, write_eqamat, write_spgmat, ENUMERATION_EXT,
};
use crate::symmetry::orbit::SitePartition;
use crate::symmetry::{SiteAction, SymmetryOperation};


// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// A structure containing control parameters for configuration enumeration.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct ConfigEnumerationParams {
    /// The multiplicities of the substituting species on the sublattice.
    #[builder(setter(custom))]
    pub composition: Vec<usize>,

    /// One chemical symbol per substituting species.
    #[builder(setter(custom))]
    pub species_symbols: Vec<String>,

    /// The 0-based index of the substituted atom type in the structure.
    #[builder(default = "0")]
    pub site_type: usize,

    /// Tolerance for matching operator images against sublattice sites, on
    /// wrapped fractional coordinates.
    #[builder(default = "1e-5")]
    pub prec: f64,

    /// Boolean indicating if the equivalent-site mapping used by the
    /// enumerator is to be written out (`EQAMAT`).
    #[builder(default = "false")]
    pub write_equivalence_table: bool,

    /// Boolean indicating if the operator matrices are to be echoed
    /// (`SPGMAT`).
    #[builder(default = "false")]
    pub write_operator_matrices: bool,

    /// Boolean indicating if the configuration list and degeneracies are to
    /// be written out (`CONFGL`, `CONFGD`).
    #[builder(default = "true")]
    pub write_configurations: bool,

    /// Boolean indicating if one decorated structure file per orbit is to be
    /// written out (`POSCAR_#####`).
    #[builder(default = "false")]
    pub write_structures: bool,

    /// Boolean indicating if a progress bar is to be drawn on standard error
    /// during the walk.
    #[builder(default = "false")]
    pub show_progress: bool,

    /// The directory output files are written into.
    #[builder(default = "PathBuf::from(\".\")")]
    pub directory: PathBuf,

    /// Optional name for saving the result as a binary `.subsym.enm` file.
    /// If `None`, the result will not be saved.
    #[builder(default = "None")]
    pub result_save_name: Option<String>,
}

impl ConfigEnumerationParams {
    /// Returns a builder to construct a [`ConfigEnumerationParams`]
    /// structure.
    pub fn builder() -> ConfigEnumerationParamsBuilder {
        ConfigEnumerationParamsBuilder::default()
    }
}

impl ConfigEnumerationParamsBuilder {
    pub fn composition(&mut self, counts: &[usize]) -> &mut Self {
        self.composition = Some(counts.to_vec());
        self
    }

    pub fn species_symbols(&mut self, symbols: &[String]) -> &mut Self {
        self.species_symbols = Some(symbols.to_vec());
        self
    }
}

impl fmt::Display for ConfigEnumerationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Substituting species: {}",
            self.species_symbols
                .iter()
                .zip(self.composition.iter())
                .map(|(symbol, count)| format!("{symbol} × {count}"))
                .join(", ")
        )?;
        writeln!(f, "Substituted site type: {}", self.site_type + 1)?;
        writeln!(f, "Site-matching tolerance: {:.3e}", self.prec)?;
        writeln!(
            f,
            "Write equivalent-site mapping: {}",
            yes_no(self.write_equivalence_table)
        )?;
        writeln!(
            f,
            "Write operator matrices: {}",
            yes_no(self.write_operator_matrices)
        )?;
        writeln!(
            f,
            "Write configurations and degeneracies: {}",
            yes_no(self.write_configurations)
        )?;
        writeln!(
            f,
            "Write one structure file per orbit: {}",
            yes_no(self.write_structures)
        )?;
        writeln!(f, "Draw progress bar: {}", yes_no(self.show_progress))?;
        writeln!(
            f,
            "Save enumeration results to file: {}",
            self.result_save_name
                .as_ref()
                .map(|name| format!("{name}.{ENUMERATION_EXT}"))
                .unwrap_or_else(|| yes_no(false).to_string())
        )?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain configuration-enumeration results.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct ConfigEnumerationResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: ConfigEnumerationParams,

    /// The emitted orbits and the total configuration count.
    pub outcome: EnumerationOutcome,
}

impl ConfigEnumerationResult {
    fn builder() -> ConfigEnumerationResultBuilder {
        ConfigEnumerationResultBuilder::default()
    }
}

impl fmt::Display for ConfigEnumerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Enumeration summary")?;
        writeln!(f)?;
        writeln!(f, "Total configurations: {}", self.outcome.total)?;
        writeln!(f, "Irreducible configurations: {}", self.outcome.orbits.len())?;
        writeln!(
            f,
            "Degeneracy sum: {}",
            self.outcome
                .orbits
                .iter()
                .map(|orbit| u128::from(orbit.degeneracy))
                .sum::<u128>()
        )?;
        if !self.outcome.complete {
            writeln!(f, "** The enumeration was cancelled; this list is partial. **")?;
        }
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for configuration enumeration over a crystal structure and a set
/// of space-group operations.
#[derive(Clone, Builder)]
pub struct ConfigEnumerationDriver<'a> {
    /// The control parameters for configuration enumeration.
    parameters: &'a ConfigEnumerationParams,

    /// The host structure the sublattice is read from.
    structure: &'a CrystalStructure,

    /// The space-group operations, fractional.
    operations: &'a [SymmetryOperation],

    /// Optional cancellation signal, polled between outer iterations.
    #[builder(default = "None")]
    cancel: Option<&'a AtomicBool>,

    /// The result of the enumeration.
    #[builder(setter(skip), default = "None")]
    result: Option<ConfigEnumerationResult>,
}

impl<'a> ConfigEnumerationDriver<'a> {
    /// Returns a builder to construct a [`ConfigEnumerationDriver`]
    /// structure.
    pub fn builder() -> ConfigEnumerationDriverBuilder<'a> {
        ConfigEnumerationDriverBuilder::default()
    }

    /// Executes the enumeration.
    fn enumerate_configurations(&mut self) -> Result<(), anyhow::Error> {
        log_title("Irreducible Configuration Enumeration");
        subsym_output!("");
        let params = self.parameters;
        log_display(params);

        let sublattice = self
            .structure
            .type_coordinates(params.site_type)?
            .to_vec();
        let composition = Composition::new(params.composition.clone())?;
        if composition.n_sites() != sublattice.len() {
            return Err(SubSymError::InputValidation(format!(
                "composition {composition} covers {} sites, but type {} holds {} atoms",
                composition.n_sites(),
                params.site_type + 1,
                sublattice.len()
            ))
            .into());
        }

        let mut action =
            SiteAction::from_operations(self.operations, &sublattice, params.prec)?;
        let partition = SitePartition::partition(&mut action, composition.counts()[0])?;
        let sublattice = partition.permute(&sublattice);

        log_subtitle("Symmetry action on the sublattice");
        subsym_output!("Sites: {}", action.n_sites());
        subsym_output!("Operations: {}", action.n_operations());
        subsym_output!(
            "Site orbits: {} (sizes {})",
            partition.n_orbits(),
            partition
                .boundaries()
                .windows(2)
                .map(|w| w[1] - w[0])
                .join(", ")
        );
        if !partition.is_identity() {
            subsym_output!("Sites were relabelled to make the orbits contiguous.");
        }
        subsym_output!("");

        let n_species = composition.n_species();
        let mut enumerator =
            Enumerator::new(&action, &partition, composition, self.cancel)?;
        subsym_output!("Total configurations: {}", enumerator.codec().total());
        subsym_output!("");

        let outcome = if params.show_progress {
            let mut bar = ProgressBar::to_stderr();
            bar.set(enumerator.codec().radices()[0]);
            enumerator.run_with_progress(|current, _| {
                let _ = bar.put(current);
            })?
        } else {
            enumerator.run()?
        };
        let codec = enumerator.codec().clone();

        log_subtitle("Irreducible configurations");
        subsym_output!("{:>8} {:>16} {:>12}  configuration", "#", "rank", "degeneracy");
        subsym_output!("{}", "┈".repeat(60));
        let mut mixed_orbits = 0_usize;
        for (index, orbit) in outcome.orbits.iter().enumerate() {
            let assignment = codec.rank_to_assignment(orbit.rank)?;
            if partition
                .species_per_orbit(&assignment, n_species)
                .iter()
                .any(|tally| tally.iter().filter(|&&count| count > 0).count() > 1)
            {
                mixed_orbits += 1;
            }
            subsym_output!(
                "{:>8} {:>16} {:>12}  {}",
                index + 1,
                orbit.rank,
                orbit.degeneracy,
                assignment.iter().map(|&a| u32::from(a) + 1).join(" ")
            );
        }
        subsym_output!("{}", "┈".repeat(60));
        subsym_output!(
            "{} irreducible configuration(s); degeneracies sum to {}.",
            outcome.orbits.len(),
            outcome
                .orbits
                .iter()
                .map(|orbit| u128::from(orbit.degeneracy))
                .sum::<u128>()
        );
        if mixed_orbits > 0 {
            subsym_output!(
                "{mixed_orbits} configuration(s) mix species within a site orbit; \
                 their degeneracies fold the stabiliser redundancy."
            );
        }
        subsym_output!("");

        if params.write_equivalence_table {
            let path = params.directory.join("EQAMAT");
            write_eqamat(&action, &path)?;
            subsym_output!("Equivalent-site mapping written to {}.", path.display());
        }
        if params.write_operator_matrices {
            let path = params.directory.join("SPGMAT");
            write_spgmat(self.operations, &path)?;
            subsym_output!("Operator matrices written to {}.", path.display());
        }
        if params.write_configurations {
            let confgl = params.directory.join("CONFGL");
            write_confgl(&outcome.orbits, &codec, &confgl)?;
            let confgd = params.directory.join("CONFGD");
            write_confgd(&outcome.orbits, &confgd)?;
            subsym_output!(
                "Configurations and degeneracies written to {} and {}.",
                confgl.display(),
                confgd.display()
            );
        }
        if params.write_structures {
            for (index, orbit) in outcome.orbits.iter().enumerate() {
                let assignment = codec.rank_to_assignment(orbit.rank)?;
                let decorated = self.structure.decorated(
                    params.site_type,
                    &sublattice,
                    &assignment,
                    &params.species_symbols,
                    &format!(
                        "configuration {} (rank {}, degeneracy {})",
                        index + 1,
                        orbit.rank,
                        orbit.degeneracy
                    ),
                )?;
                decorated
                    .write_poscar(params.directory.join(format!("POSCAR_{:05}", index + 1)))?;
            }
            subsym_output!(
                "{} structure file(s) written to {}.",
                outcome.orbits.len(),
                params.directory.display()
            );
        }

        let cancelled = !outcome.complete;
        let emitted = outcome.orbits.len();
        self.result = ConfigEnumerationResult::builder()
            .parameters(params.clone())
            .outcome(outcome)
            .build()
            .ok();
        if let Some(enum_res) = self.result.as_ref() {
            log_display(enum_res);
            if let Some(name) = params.result_save_name.as_ref() {
                save_enumeration(params.directory.join(name), enum_res)?;
                subsym_output!("Enumeration results saved as {name}.{ENUMERATION_EXT}.");
                subsym_output!("");
            }
        }

        if cancelled {
            subsym_error!("The enumeration was cancelled; the emitted list is partial.");
            return Err(SubSymError::Cancelled { emitted }.into());
        }
        Ok(())
    }
}

impl SubSymDriver for ConfigEnumerationDriver<'_> {
    type Outcome = ConfigEnumerationResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No configuration-enumeration results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.enumerate_configurations()
    }
}
