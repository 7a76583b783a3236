//! Orbit partitioning of the substitution sublattice.
//!
//! Sites are relabelled so that every orbit of the symmetry action occupies a
//! contiguous, ascending block. The irreducible enumerator then reduces its
//! representative filter to a prefix test on site labels.

use itertools::Itertools;

use crate::combinatorics::floor_search;
use crate::errors::SubSymError;
use crate::symmetry::SiteAction;

#[cfg(test)]
#[path = "orbit_tests.rs"]
mod orbit_tests;

// ==================
// Struct definitions
// ==================

/// The ordered partition of the sublattice into orbits, together with the
/// relabelling that made the orbits contiguous.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SitePartition {
    /// Orbit boundaries: orbit `b` occupies sites
    /// `boundaries[b]..boundaries[b + 1]`; the array starts at `0` and ends
    /// at the site count.
    boundaries: Vec<usize>,

    /// The relabelling applied to the action: new position `p` holds what was
    /// site `order[p]`. The identity when no relabelling was needed.
    order: Vec<usize>,

    /// How many leading orbits the enumerator's representative filter spans.
    /// Their cumulative size is at least `n - k₁ + 1`, so every possible
    /// first-species placement touches them.
    exposed_orbits: usize,
}

impl SitePartition {
    /// Partitions the sites of `action` into orbits and relabels `action` so
    /// the orbits are contiguous.
    ///
    /// # Arguments
    ///
    /// * `action` - The validated site action; rewritten in place when the
    ///   labelling changes.
    /// * `k_first` - The multiplicity of the first substituting species,
    ///   which sets the exposed-orbit prefix.
    ///
    /// # Errors
    ///
    /// [`SubSymError::SymmetryIntegrity`] if some orbit is not closed under
    /// every operation.
    pub fn partition(action: &mut SiteAction, k_first: usize) -> Result<Self, SubSymError> {
        let n = action.n_sites();
        let o = action.n_operations();
        assert!(
            (1..=n).contains(&k_first),
            "The first-species multiplicity {k_first} must lie in 1..={n}."
        );

        // Sweep once: each unseen site opens an orbit and pulls in its images
        // under every operation. The identity operation guarantees the site
        // itself is collected.
        let mut unseen = vec![true; n];
        let mut order = Vec::with_capacity(n);
        let mut boundaries = vec![0];
        for i in 0..n {
            if !unseen[i] {
                continue;
            }
            let start = order.len();
            for q in 0..o {
                let img = action.image(q, i);
                if unseen[img] {
                    unseen[img] = false;
                    order.push(img);
                }
            }
            order[start..].sort_unstable();
            boundaries.push(order.len());
        }

        let is_identity = order.iter().enumerate().all(|(p, &old)| p == old);
        if !is_identity {
            *action = action.relabelled(&order);
        }

        let partition = Self {
            boundaries,
            order,
            exposed_orbits: 0,
        };
        partition.verify_closure(action)?;

        // Expose leading orbits until they hold at least n - k₁ + 1 sites:
        // no k₁-subset can then avoid the exposed prefix.
        let threshold = n - k_first + 1;
        let exposed_orbits = partition
            .boundaries
            .iter()
            .skip(1)
            .position(|&end| end >= threshold)
            .expect("The full prefix holds every site.")
            + 1;

        Ok(Self {
            exposed_orbits,
            ..partition
        })
    }

    /// Checks that every orbit block is carried into itself by every
    /// operation of the (relabelled) action.
    fn verify_closure(&self, action: &SiteAction) -> Result<(), SubSymError> {
        for q in 0..action.n_operations() {
            for site in 0..action.n_sites() {
                let img = action.image(q, site);
                if self.orbit_of(img) != self.orbit_of(site) {
                    return Err(SubSymError::SymmetryIntegrity {
                        site,
                        operation: q,
                        detail: format!(
                            "orbit {} is not closed: site maps to {img} in orbit {}",
                            self.orbit_of(site) + 1,
                            self.orbit_of(img) + 1
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// The number of orbits.
    pub fn n_orbits(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// The orbit boundaries (`n_orbits + 1` entries, from `0` to `n`).
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// The orbit a (relabelled) site belongs to.
    pub fn orbit_of(&self, site: usize) -> usize {
        floor_search(&self.boundaries[..self.boundaries.len() - 1], site)
            .expect("Boundaries start at site 0.")
    }

    /// The number of leading orbits covered by the representative filter.
    pub fn exposed_orbits(&self) -> usize {
        self.exposed_orbits
    }

    /// One past the last site of the exposed orbit prefix.
    pub fn exposed_end(&self) -> usize {
        self.boundaries[self.exposed_orbits]
    }

    /// The relabelling that was applied to the action.
    pub fn permutation(&self) -> &[usize] {
        &self.order
    }

    /// Whether the action was already orbit-contiguous.
    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(p, &old)| p == old)
    }

    /// Rewrites an external per-site array (coordinates, metadata) under the
    /// same relabelling that was applied to the action.
    pub fn permute<T: Clone>(&self, items: &[T]) -> Vec<T> {
        assert_eq!(
            items.len(),
            self.order.len(),
            "Per-site array length disagrees with the partition."
        );
        self.order.iter().map(|&old| items[old].clone()).collect_vec()
    }

    /// Tallies, per orbit, how many sites of an assignment carry each
    /// species. Used to report which orbits host more than one species.
    pub fn species_per_orbit(&self, assignment: &[u8], n_species: usize) -> Vec<Vec<usize>> {
        let mut tallies = vec![vec![0_usize; n_species]; self.n_orbits()];
        for (site, &label) in assignment.iter().enumerate() {
            tallies[self.orbit_of(site)][usize::from(label)] += 1;
        }
        tallies
    }
}
