//! Configurations of a substituted sublattice and the bijection between
//! integer ranks and assignment vectors.
//!
//! A configuration assigns one of `s` species to each of the `n` sites of the
//! substitution sublattice, with prescribed multiplicities. It is represented
//! either as an assignment vector (one species label per site) or as a single
//! rank in `[0, N)`, where `N` is the multinomial coefficient
//! $`n! / (k_1! \cdots k_s!)`$. The rank nests the colexicographic ranks of
//! the per-species site subsets in mixed radix, species 1 carrying the
//! highest-radix digit; each species chooses its sites out of those left
//! unclaimed by the species before it, and the last species fills the
//! remainder.

use itertools::Itertools;

use crate::combinatorics::{binomial, BinomialTable};
use crate::errors::SubSymError;

#[cfg(test)]
#[path = "configuration_tests.rs"]
mod configuration_tests;

// ==================
// Struct definitions
// ==================

// -----------
// Composition
// -----------

/// A validated composition vector: how many sites each substituting species
/// occupies.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Composition {
    counts: Vec<usize>,
}

impl Composition {
    /// Validates and wraps a composition vector.
    ///
    /// # Errors
    ///
    /// [`SubSymError::InputValidation`] unless there are at least two species
    /// and every multiplicity is positive.
    pub fn new(counts: Vec<usize>) -> Result<Self, SubSymError> {
        if counts.len() < 2 {
            return Err(SubSymError::InputValidation(format!(
                "a composition requires at least two species, got {}",
                counts.len()
            )));
        }
        if let Some(j) = counts.iter().position(|&k| k == 0) {
            return Err(SubSymError::InputValidation(format!(
                "species {} has multiplicity zero",
                j + 1
            )));
        }
        Ok(Self { counts })
    }

    /// The number of substitution sites, $`n = \sum_j k_j`$.
    pub fn n_sites(&self) -> usize {
        self.counts.iter().sum()
    }

    /// The number of species, `s`.
    pub fn n_species(&self) -> usize {
        self.counts.len()
    }

    /// The per-species multiplicities.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.counts.iter().join(", "))
    }
}

// -----------
// ConfigCodec
// -----------

/// The rank ↔ assignment codec for a fixed composition.
///
/// Construction precomputes the binomial table, the per-species radices
/// $`\binom{m_j}{k_j}`$ and their mixed-radix place values, and the checked
/// total `N`. The codec refuses invalid input; it never silently normalises.
#[derive(Clone, Debug)]
pub struct ConfigCodec {
    composition: Composition,

    binomials: BinomialTable,

    /// `radices[j]` is $`\binom{m_j}{k_j}`$ for the ranked species
    /// `j = 0..s-1` (the last species is determined by the others).
    radices: Vec<u64>,

    /// `places[j]` is the product of the radices after `j`; digit `j` of a
    /// rank is `(rank / places[j]) % radices[j]`.
    places: Vec<u64>,

    /// The total configuration count `N`.
    total: u64,
}

impl ConfigCodec {
    /// Builds the codec for a composition.
    ///
    /// # Errors
    ///
    /// [`SubSymError::Overflow`] if `N` does not fit a `u64`.
    pub fn new(composition: Composition) -> Result<Self, SubSymError> {
        let n = composition.n_sites();
        let s = composition.n_species();
        let max_k = composition
            .counts()
            .iter()
            .max()
            .copied()
            .expect("A composition has at least two species.");
        let binomials = BinomialTable::new(n, max_k);

        let mut radices = Vec::with_capacity(s - 1);
        let mut m = n;
        for &k in &composition.counts()[..s - 1] {
            radices.push(binomial(m, k)?);
            m -= k;
        }

        let mut places = vec![1_u64; s - 1];
        for j in (0..s - 2).rev() {
            places[j] = places[j + 1].checked_mul(radices[j + 1]).ok_or_else(|| {
                SubSymError::Overflow(format!(
                    "configuration count for composition {composition}"
                ))
            })?;
        }
        let total = places[0].checked_mul(radices[0]).ok_or_else(|| {
            SubSymError::Overflow(format!(
                "configuration count for composition {composition}"
            ))
        })?;

        Ok(Self {
            composition,
            binomials,
            radices,
            places,
            total,
        })
    }

    /// The total configuration count `N`.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// The composition this codec encodes.
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// The precomputed binomial table.
    pub fn binomials(&self) -> &BinomialTable {
        &self.binomials
    }

    /// The per-species radices $`\binom{m_j}{k_j}`$.
    pub fn radices(&self) -> &[u64] {
        &self.radices
    }

    /// The mixed-radix place values.
    pub fn places(&self) -> &[u64] {
        &self.places
    }

    /// Decodes a rank into an assignment vector (one 0-based species label
    /// per site).
    ///
    /// # Errors
    ///
    /// [`SubSymError::InputValidation`] if `rank >= N`.
    pub fn rank_to_assignment(&self, rank: u64) -> Result<Vec<u8>, SubSymError> {
        if rank >= self.total {
            return Err(SubSymError::InputValidation(format!(
                "rank {rank} lies outside [0, {})",
                self.total
            )));
        }
        let n = self.composition.n_sites();
        let s = self.composition.n_species();
        let last = u8::try_from(s - 1).expect("Species labels fit u8.");

        // Sites not yet claimed default to the last species.
        let mut assignment = vec![last; n];
        let mut remaining: Vec<usize> = (0..n).collect();
        for j in 0..s - 1 {
            let digit = (rank / self.places[j]) % self.radices[j];
            let positions =
                self.binomials
                    .colex_unrank(digit, remaining.len(), self.composition.counts()[j]);
            for &p in positions.iter().rev() {
                let site = remaining.remove(p);
                assignment[site] = u8::try_from(j).expect("Species labels fit u8.");
            }
        }
        Ok(assignment)
    }

    /// Encodes an assignment vector into its rank.
    ///
    /// # Errors
    ///
    /// [`SubSymError::InputValidation`] if the vector has the wrong length,
    /// carries a species label outside `0..s`, or its multiplicities disagree
    /// with the composition.
    pub fn assignment_to_rank(&self, assignment: &[u8]) -> Result<u64, SubSymError> {
        let n = self.composition.n_sites();
        let s = self.composition.n_species();
        if assignment.len() != n {
            return Err(SubSymError::InputValidation(format!(
                "assignment has {} sites, composition expects {n}",
                assignment.len()
            )));
        }
        let mut tallies = vec![0_usize; s];
        for (site, &label) in assignment.iter().enumerate() {
            let j = usize::from(label);
            if j >= s {
                return Err(SubSymError::InputValidation(format!(
                    "site {site} carries species label {} outside 1..={s}",
                    j + 1
                )));
            }
            tallies[j] += 1;
        }
        if tallies != self.composition.counts() {
            return Err(SubSymError::InputValidation(format!(
                "assignment multiplicities ({}) disagree with composition {}",
                tallies.iter().join(", "),
                self.composition
            )));
        }

        let mut remaining: Vec<usize> = (0..n).collect();
        let mut rank = 0_u64;
        for j in 0..s - 1 {
            let label = u8::try_from(j).expect("Species labels fit u8.");
            let sites = assignment
                .iter()
                .enumerate()
                .filter_map(|(site, &a)| (a == label).then_some(site))
                .collect_vec();
            let positions = sites
                .iter()
                .map(|site| {
                    remaining
                        .binary_search(site)
                        .expect("A counted site is still unclaimed.")
                })
                .collect_vec();
            rank += self.binomials.colex_rank(&positions) * self.places[j];
            for &p in positions.iter().rev() {
                remaining.remove(p);
            }
        }
        Ok(rank)
    }
}
