//! Interfaces between SubSym and the outside world.

use anyhow;

pub mod cli;
pub mod input;

// =================
// Trait definitions
// =================

/// A trait for handling an input specification by dispatching the drivers it
/// calls for.
pub trait InputHandle {
    /// Handles the input specification.
    fn handle(&self) -> Result<(), anyhow::Error>;
}
