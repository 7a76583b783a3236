//! Symmetry action on the substitution sublattice.
//!
//! The space-group operations themselves are an input: SubSym receives them
//! as fractional rotation–translation pairs and only ever observes their
//! action on the sublattice, the equivalent-site mapping. This module builds
//! that mapping from the operators and a site list, and validates that it is
//! a permutation action containing the identity.

use itertools::Itertools;
use nalgebra::{Matrix3, Vector3};
use ndarray::{Array2, ArrayView1};

use crate::errors::SubSymError;

pub mod orbit;

#[cfg(test)]
#[path = "site_action_tests.rs"]
mod site_action_tests;

// ==================
// Struct definitions
// ==================

// -----------------
// SymmetryOperation
// -----------------

/// A space-group operation in fractional coordinates: a rotation part and a
/// translation part.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryOperation {
    /// The rotation part, acting on fractional coordinates.
    pub rotation: Matrix3<f64>,

    /// The translation part, in fractional coordinates.
    pub translation: Vector3<f64>,
}

impl SymmetryOperation {
    /// Applies the operation to a fractional position.
    pub fn apply(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * position + self.translation
    }
}

/// Componentwise distance between two fractional positions modulo lattice
/// translations.
fn wrapped_distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b)
        .iter()
        .map(|d| (d - d.round()).abs())
        .fold(0.0, f64::max)
}

// ----------
// SiteAction
// ----------

/// The equivalent-site mapping: for each operation and each sublattice site,
/// the site it is carried onto.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteAction {
    /// Row `q` is the image vector of operation `q` over all sites.
    images: Array2<usize>,
}

impl SiteAction {
    /// Wraps raw image rows after validating that each is a permutation and
    /// that the identity is among them.
    ///
    /// # Errors
    ///
    /// [`SubSymError::SymmetryIntegrity`] on any violation, carrying the
    /// offending site and operation.
    pub fn from_images(rows: Vec<Vec<usize>>) -> Result<Self, SubSymError> {
        let n_ops = rows.len();
        let n_sites = rows.first().map(Vec::len).unwrap_or_default();
        if n_ops == 0 || n_sites == 0 {
            return Err(SubSymError::SymmetryIntegrity {
                site: 0,
                operation: 0,
                detail: "the equivalent-site mapping is empty".to_string(),
            });
        }
        let mut images = Array2::zeros((n_ops, n_sites));
        for (q, row) in rows.iter().enumerate() {
            if row.len() != n_sites {
                return Err(SubSymError::SymmetryIntegrity {
                    site: 0,
                    operation: q,
                    detail: format!(
                        "operation row has {} entries, expected {n_sites}",
                        row.len()
                    ),
                });
            }
            let mut hit = vec![false; n_sites];
            for (i, &img) in row.iter().enumerate() {
                if img >= n_sites || hit[img] {
                    return Err(SubSymError::SymmetryIntegrity {
                        site: i,
                        operation: q,
                        detail: format!("image {img} is not part of a permutation of {n_sites} sites"),
                    });
                }
                hit[img] = true;
                images[(q, i)] = img;
            }
        }
        let action = Self { images };
        if action.identity_operation().is_none() {
            return Err(SubSymError::SymmetryIntegrity {
                site: 0,
                operation: 0,
                detail: "no operation acts as the identity on the sublattice".to_string(),
            });
        }
        Ok(action)
    }

    /// Builds the mapping by applying every operator to every sublattice site
    /// and locating the image in the site list modulo lattice translations.
    ///
    /// # Arguments
    ///
    /// * `operations` - The space-group operations, fractional.
    /// * `sites` - Fractional coordinates of the sublattice sites.
    /// * `prec` - Matching tolerance on wrapped fractional coordinates.
    ///
    /// # Errors
    ///
    /// [`SubSymError::SymmetryIntegrity`] if an operator fails to map the
    /// sublattice onto itself, or maps one site onto several within `prec`.
    pub fn from_operations(
        operations: &[SymmetryOperation],
        sites: &[Vector3<f64>],
        prec: f64,
    ) -> Result<Self, SubSymError> {
        let rows = operations
            .iter()
            .enumerate()
            .map(|(q, op)| {
                sites
                    .iter()
                    .enumerate()
                    .map(|(i, site)| {
                        let image = op.apply(site);
                        let matches = sites
                            .iter()
                            .positions(|candidate| wrapped_distance(candidate, &image) < prec)
                            .collect_vec();
                        match matches.as_slice() {
                            [j] => Ok(*j),
                            [] => Err(SubSymError::SymmetryIntegrity {
                                site: i,
                                operation: q,
                                detail: format!(
                                    "operation carries the site off the sublattice \
                                     (no match within {prec:.3e})"
                                ),
                            }),
                            _ => Err(SubSymError::SymmetryIntegrity {
                                site: i,
                                operation: q,
                                detail: format!(
                                    "{} sites coincide within {prec:.3e}; \
                                     tolerance too coarse",
                                    matches.len()
                                ),
                            }),
                        }
                    })
                    .collect::<Result<Vec<usize>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_images(rows)
    }

    /// The number of sublattice sites.
    pub fn n_sites(&self) -> usize {
        self.images.ncols()
    }

    /// The number of operations.
    pub fn n_operations(&self) -> usize {
        self.images.nrows()
    }

    /// The image of `site` under operation `operation`.
    pub fn image(&self, operation: usize, site: usize) -> usize {
        self.images[(operation, site)]
    }

    /// The image vector of one operation.
    pub fn operation(&self, operation: usize) -> ArrayView1<'_, usize> {
        self.images.row(operation)
    }

    /// The index of an operation acting as the identity, if present.
    pub fn identity_operation(&self) -> Option<usize> {
        (0..self.n_operations())
            .find(|&q| self.operation(q).iter().enumerate().all(|(i, &img)| i == img))
    }

    /// Rewrites the mapping under a site relabelling, where new position `p`
    /// holds what was site `order[p]`.
    ///
    /// The rewrite goes through a fresh buffer; the old table is consumed
    /// whole, never read after partial overwriting.
    pub(crate) fn relabelled(&self, order: &[usize]) -> Self {
        let n = self.n_sites();
        debug_assert_eq!(order.len(), n);
        let mut inverse = vec![0; n];
        for (p, &old) in order.iter().enumerate() {
            inverse[old] = p;
        }
        let mut images = Array2::zeros(self.images.raw_dim());
        for q in 0..self.n_operations() {
            for p in 0..n {
                images[(q, p)] = inverse[self.images[(q, order[p])]];
            }
        }
        Self { images }
    }
}
