//! Irreducible enumeration of substitutional configurations.
//!
//! The enumerator walks the rank space of first-species placements in
//! ascending order and sieves out everything reachable from an
//! already-emitted representative, so that each orbit of configurations
//! under the symmetry action is emitted exactly once, at its minimum rank,
//! together with its exact orbit size. With two species the walk itself is
//! the whole story; with more, each surviving first-species placement roots
//! a recursion over the later species under the shrinking stabiliser of the
//! placements made so far, with a fresh sieve per level.
//!
//! All scratch state lives in the per-invocation [`Enumerator`] context;
//! repeated invocations are independent.

use std::sync::atomic::{AtomicBool, Ordering};

use bitvec::prelude::*;
use indexmap::IndexSet;
use itertools::Itertools;
use log;

use crate::combinatorics::complement;
use crate::configuration::{Composition, ConfigCodec};
use crate::errors::SubSymError;
use crate::symmetry::orbit::SitePartition;
use crate::symmetry::SiteAction;


// ==================
// Struct definitions
// ==================

/// One orbit of configurations: its canonical (minimum-rank) representative
/// and its size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnumeratedOrbit {
    /// The minimum rank over the orbit.
    pub rank: u64,

    /// The orbit size ("degeneracy").
    pub degeneracy: u64,
}

/// The outcome of an enumeration run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnumerationOutcome {
    /// Every emitted orbit, in strictly ascending representative rank.
    pub orbits: Vec<EnumeratedOrbit>,

    /// The total configuration count `N`.
    pub total: u64,

    /// `false` when the run was cancelled and the list is partial.
    pub complete: bool,
}

/// The per-invocation enumeration context.
pub struct Enumerator<'a> {
    action: &'a SiteAction,

    partition: &'a SitePartition,

    codec: ConfigCodec,

    /// Optional cancellation signal, polled between outer iterations.
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Enumerator<'a> {
    /// Prepares an enumeration: builds the codec (with its checked total and
    /// precomputed binomial table) and validates the codec round trip on a
    /// sample of ranks.
    ///
    /// # Errors
    ///
    /// [`SubSymError::InputValidation`] if the composition does not cover the
    /// action's sites, [`SubSymError::Overflow`] if `N` does not fit a `u64`,
    /// or [`SubSymError::CodecRoundtrip`] if the sample check fails.
    pub fn new(
        action: &'a SiteAction,
        partition: &'a SitePartition,
        composition: Composition,
        cancel: Option<&'a AtomicBool>,
    ) -> Result<Self, SubSymError> {
        if composition.n_sites() != action.n_sites() {
            return Err(SubSymError::InputValidation(format!(
                "composition {composition} covers {} sites, the action has {}",
                composition.n_sites(),
                action.n_sites()
            )));
        }
        let codec = ConfigCodec::new(composition)?;

        let total = codec.total();
        for rank in [0, total / 7, total / 3, total / 2, total - 1]
            .into_iter()
            .unique()
        {
            let assignment = codec.rank_to_assignment(rank)?;
            let reencoded = codec.assignment_to_rank(&assignment)?;
            if reencoded != rank {
                return Err(SubSymError::CodecRoundtrip { rank, reencoded });
            }
        }

        Ok(Self {
            action,
            partition,
            codec,
            cancel,
        })
    }

    /// The codec built for this enumeration.
    pub fn codec(&self) -> &ConfigCodec {
        &self.codec
    }

    /// Runs the enumeration without progress reporting.
    pub fn run(&mut self) -> Result<EnumerationOutcome, SubSymError> {
        self.run_with_progress(|_, _| {})
    }

    /// Runs the enumeration, invoking `progress` with
    /// `(iterations done, total iterations)` after every outer iteration.
    /// The callback must not mutate enumerator inputs.
    pub fn run_with_progress<F>(
        &mut self,
        mut progress: F,
    ) -> Result<EnumerationOutcome, SubSymError>
    where
        F: FnMut(u64, u64),
    {
        let n = self.action.n_sites();
        let k = self.codec.composition().counts().to_vec();
        let n_species = k.len();
        let c_first = self.codec.radices()[0];
        let exposed_end = self.partition.exposed_end();

        let mut sieve = bitvec![0; usize::try_from(c_first).map_err(|_| {
            SubSymError::Overflow(format!("first-species sieve of {c_first} bits"))
        })?];
        let mut orbits: Vec<EnumeratedOrbit> = Vec::new();
        let last = u8::try_from(n_species - 1).expect("Species labels fit u8.");
        let mut assignment = vec![last; n];

        log::debug!(
            "Sieving a rank space of {c_first} first-species placements under {} operations; \
             representatives are confined below site {exposed_end}.",
            self.action.n_operations()
        );

        for i1 in 0..c_first {
            if let Some(flag) = self.cancel {
                if flag.load(Ordering::Relaxed) {
                    log::warn!("Enumeration cancelled at outer iteration {i1}/{c_first}.");
                    return Ok(EnumerationOutcome {
                        orbits,
                        total: self.codec.total(),
                        complete: false,
                    });
                }
            }

            if !sieve[i1 as usize] {
                let subset = self.codec.binomials().colex_unrank(i1, n, k[0]);
                // Representative filter: the placement must touch the exposed
                // orbit prefix. The exposure policy spans at least
                // n - k₁ + 1 sites, so no placement can avoid it; the test
                // only bites if a narrower prefix were ever supplied.
                if subset[0] < exposed_end {
                    if n_species == 2 {
                        self.sweep_binary(i1, &subset, &mut sieve, &mut orbits);
                    } else {
                        let stabiliser = self.sweep_first(&subset, &mut sieve);
                        for &site in &subset {
                            assignment[site] = 0;
                        }
                        self.descend(
                            1,
                            &complement(&subset, n),
                            &stabiliser,
                            &mut assignment,
                            &mut orbits,
                        )?;
                        for &site in &subset {
                            assignment[site] = last;
                        }
                    }
                }
            }

            progress(i1 + 1, c_first);
        }

        self.finalise(&orbits)?;
        Ok(EnumerationOutcome {
            orbits,
            total: self.codec.total(),
            complete: true,
        })
    }

    /// Handles one surviving first-species placement when there are exactly
    /// two species: the placement determines the whole configuration, so its
    /// subset orbit is the configuration orbit.
    fn sweep_binary(
        &self,
        i1: u64,
        subset: &[usize],
        sieve: &mut BitVec,
        orbits: &mut Vec<EnumeratedOrbit>,
    ) {
        let mut members = IndexSet::new();
        for q in 0..self.action.n_operations() {
            let image = subset
                .iter()
                .map(|&site| self.action.image(q, site))
                .sorted_unstable()
                .collect_vec();
            let rank = self.codec.binomials().colex_rank(&image);
            sieve.set(rank as usize, true);
            members.insert(rank);
        }
        debug_assert_eq!(members.iter().min(), Some(&i1));
        orbits.push(EnumeratedOrbit {
            rank: i1,
            degeneracy: members.len() as u64,
        });
    }

    /// Marks the subset orbit of a first-species placement and returns the
    /// operations stabilising it setwise.
    fn sweep_first(&self, subset: &[usize], sieve: &mut BitVec) -> Vec<usize> {
        let mut stabiliser = Vec::new();
        for q in 0..self.action.n_operations() {
            let image = subset
                .iter()
                .map(|&site| self.action.image(q, site))
                .sorted_unstable()
                .collect_vec();
            let rank = self.codec.binomials().colex_rank(&image);
            sieve.set(rank as usize, true);
            if image == subset {
                stabiliser.push(q);
            }
        }
        stabiliser
    }

    /// Recursively places species `species` (and beyond) on the remaining
    /// sites, sieving under the stabiliser of the placements made so far.
    /// Reaches one leaf per orbit of complete configurations.
    fn descend(
        &self,
        species: usize,
        remaining: &[usize],
        ops: &[usize],
        assignment: &mut [u8],
        orbits: &mut Vec<EnumeratedOrbit>,
    ) -> Result<(), SubSymError> {
        let n_species = self.codec.composition().n_species();
        let k = self.codec.composition().counts()[species];
        let m = remaining.len();
        let count = self.codec.radices()[species];
        let label = u8::try_from(species).expect("Species labels fit u8.");
        let last = u8::try_from(n_species - 1).expect("Species labels fit u8.");

        // The stabiliser maps the remaining sites onto themselves; express
        // each operation as a permutation of positions within `remaining`.
        let induced = ops
            .iter()
            .map(|&q| {
                remaining
                    .iter()
                    .map(|&site| {
                        remaining
                            .binary_search(&self.action.image(q, site))
                            .expect("The stabiliser preserves the remaining sites.")
                    })
                    .collect_vec()
            })
            .collect_vec();

        let mut sub_sieve = bitvec![0; usize::try_from(count).map_err(|_| {
            SubSymError::Overflow(format!("species-{} sieve of {count} bits", species + 1))
        })?];

        for r in 0..count {
            if sub_sieve[r as usize] {
                continue;
            }
            let positions = self.codec.binomials().colex_unrank(r, m, k);
            let mut stab_next = Vec::new();
            for (perm, &q) in induced.iter().zip(ops) {
                let image = positions
                    .iter()
                    .map(|&p| perm[p])
                    .sorted_unstable()
                    .collect_vec();
                let rank = self.codec.binomials().colex_rank(&image);
                sub_sieve.set(rank as usize, true);
                if image == positions {
                    stab_next.push(q);
                }
            }

            let sites = positions.iter().map(|&p| remaining[p]).collect_vec();
            for &site in &sites {
                assignment[site] = label;
            }
            if species + 1 == n_species - 1 {
                // The last species fills what is left: the configuration is
                // complete.
                self.emit(assignment, orbits)?;
            } else {
                let rem_next = complement(&positions, m)
                    .into_iter()
                    .map(|p| remaining[p])
                    .collect_vec();
                self.descend(species + 1, &rem_next, &stab_next, assignment, orbits)?;
            }
            for &site in &sites {
                assignment[site] = last;
            }
        }
        Ok(())
    }

    /// Emits the orbit of a complete configuration: applies every operation,
    /// tallies the distinct image ranks, and records the minimum with the
    /// tally. Collapsing duplicate images corrects the degeneracy of orbits
    /// of sites hosting more than one species: operations that only permute
    /// like species within a site orbit reproduce the same rank.
    fn emit(
        &self,
        assignment: &[u8],
        orbits: &mut Vec<EnumeratedOrbit>,
    ) -> Result<(), SubSymError> {
        let n = assignment.len();
        let mut members = IndexSet::new();
        let mut image = vec![0_u8; n];
        for q in 0..self.action.n_operations() {
            for (i, pixel) in image.iter_mut().enumerate() {
                *pixel = assignment[self.action.image(q, i)];
            }
            members.insert(self.codec.assignment_to_rank(&image)?);
        }
        let rank = *members
            .iter()
            .min()
            .expect("The identity operation contributes a member.");
        debug_assert_eq!(rank, self.codec.assignment_to_rank(assignment)?);
        orbits.push(EnumeratedOrbit {
            rank,
            degeneracy: members.len() as u64,
        });
        Ok(())
    }

    /// Verifies the orbit-sum invariant: the degeneracies of the emitted
    /// representatives partition the full configuration count.
    fn finalise(&self, orbits: &[EnumeratedOrbit]) -> Result<(), SubSymError> {
        debug_assert!(orbits.windows(2).all(|w| w[0].rank < w[1].rank));
        let sum: u128 = orbits.iter().map(|orbit| u128::from(orbit.degeneracy)).sum();
        if sum != u128::from(self.codec.total()) {
            return Err(SubSymError::SymmetryIntegrity {
                site: 0,
                operation: 0,
                detail: format!(
                    "orbit degeneracies sum to {sum}, expected {}",
                    self.codec.total()
                ),
            });
        }
        Ok(())
    }
}
