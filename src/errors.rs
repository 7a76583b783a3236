//! Failure taxonomy for SubSym.
//!
//! Every failure the core can produce belongs to one of the kinds below.
//! Nothing is retried: [`SubSymError::Cancelled`] is the only soft failure
//! and carries a partial but internally valid enumeration.

use thiserror::Error;

/// Enumerated type for all failure kinds of the SubSym core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubSymError {
    /// A parameter file or composition failed validation.
    #[error("input validation: {0}")]
    InputValidation(String),

    /// The structure file could not be interpreted, or refers to an
    /// impossible site selection.
    #[error("structural inconsistency: {0}")]
    StructuralInconsistency(String),

    /// The equivalent-site mapping is not a permutation action, or an orbit
    /// is not closed under the operation set. This indicates a bug in the
    /// symmetry collaborator, not in the inputs.
    #[error(
        "symmetry integrity: {detail} (site {site}, operation {operation})"
    )]
    SymmetryIntegrity {
        /// The offending site label (0-based).
        site: usize,
        /// The offending operation index (0-based).
        operation: usize,
        /// Human-readable description of the violation.
        detail: String,
    },

    /// A sampled rank failed to survive the decode–encode round trip.
    #[error("codec round-trip: rank {rank} re-encoded as {reencoded}")]
    CodecRoundtrip {
        /// The rank that was decoded.
        rank: u64,
        /// The rank obtained by re-encoding the decoded configuration.
        reencoded: u64,
    },

    /// The total configuration count does not fit the rank type.
    #[error("overflow: {0} does not fit a 64-bit rank")]
    Overflow(String),

    /// The enumeration was cancelled between outer iterations. The partial
    /// list emitted so far remains valid but incomplete.
    #[error("cancelled after {emitted} emitted orbit(s)")]
    Cancelled {
        /// Number of orbit representatives emitted before cancellation.
        emitted: usize,
    },
}
