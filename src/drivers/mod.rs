//! Drivers orchestrating the SubSym components.

use anyhow;

pub mod enumeration;

// =================
// Trait definitions
// =================

/// A trait for driver structures: a driver is built once, run once, and then
/// queried for its result.
pub trait SubSymDriver {
    /// The type of the calculation result from the driver.
    type Outcome;

    /// Executes the driver.
    fn run(&mut self) -> Result<(), anyhow::Error>;

    /// Returns the result of the driver.
    fn result(&self) -> Result<&Self::Outcome, anyhow::Error>;
}
