//! Formatting for the OUTSOD report and the progress collaborator.
//!
//! Everything the user reads goes through a dedicated logger target so that
//! the report file receives bare lines while the console keeps its stamped
//! diagnostics.

use std::fmt;
use std::io::{self, Write};

/// Logger target the OUTSOD file appender subscribes to.
pub(crate) const OUTPUT_TARGET: &str = "subsym-output";

/// Width of the rules framing report sections.
const REPORT_WIDTH: usize = 72;

/// Routes a report line to the OUTSOD logger.
macro_rules! subsym_output {
    ($($arg:tt)*) => {
        log::info!(target: crate::io::format::OUTPUT_TARGET, $($arg)*)
    };
}

/// Routes a warning into the OUTSOD report.
macro_rules! subsym_warn {
    ($($arg:tt)*) => {
        log::warn!(target: crate::io::format::OUTPUT_TARGET, $($arg)*)
    };
}

/// Reports an error to the console logger and into the OUTSOD report, so the
/// report records why a run stopped short.
macro_rules! subsym_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
        log::error!(target: crate::io::format::OUTPUT_TARGET, $($arg)*);
    }};
}

pub(crate) use {subsym_error, subsym_output, subsym_warn};

/// Opens a major report section: the title in capitals between full-width
/// rules.
pub(crate) fn log_title(title: &str) {
    let rule = "=".repeat(REPORT_WIDTH);
    subsym_output!("{rule}");
    subsym_output!("  {}", title.to_uppercase());
    subsym_output!("{rule}");
}

/// Logs a subsection heading, underlined to its own length.
pub(crate) fn log_subtitle(heading: &str) {
    subsym_output!("{heading}");
    subsym_output!("{}", "-".repeat(heading.chars().count()));
}

/// Writes an underlined subsection heading inside a `Display`
/// implementation, matching [`log_subtitle`].
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, heading: &str) -> fmt::Result {
    writeln!(f, "{heading}")?;
    writeln!(f, "{}", "-".repeat(heading.chars().count()))
}

/// Spells a flag the way the report spells booleans.
pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Sends a multi-line rendering to the report one line at a time, so the
/// appender stamps every line rather than only the first.
pub(crate) fn log_display<T: fmt::Display>(value: &T) {
    for line in value.to_string().lines() {
        subsym_output!("{line}");
    }
}

// ==================
// Struct definitions
// ==================

/// The progress collaborator: a fixed-width text bar of `#` (done) and `-`
/// (to come) with a trailing percentage, redrawn in place with a carriage
/// return while running and closed with a line feed on completion.
pub struct ProgressBar<W: Write> {
    total: u64,

    width: usize,

    sink: W,
}

impl ProgressBar<io::Stderr> {
    /// A bar of the conventional width drawing to standard error.
    pub fn to_stderr() -> Self {
        Self::with_sink(50, io::stderr())
    }
}

impl<W: Write> ProgressBar<W> {
    /// A bar of `width` characters drawing to `sink`.
    pub fn with_sink(width: usize, sink: W) -> Self {
        Self {
            total: 0,
            width,
            sink,
        }
    }

    /// Sets the iteration count that corresponds to 100%.
    pub fn set(&mut self, total: u64) {
        self.total = total;
    }

    /// Draws the bar for `current` completed iterations.
    pub fn put(&mut self, current: u64) -> io::Result<()> {
        let total = self.total.max(1);
        let current = current.min(total);
        let filled = usize::try_from(current * self.width as u64 / total)
            .expect("The filled width fits usize.");
        let percent = current * 100 / total;
        write!(
            self.sink,
            "[{}{}] {percent:>3}%{}",
            "#".repeat(filled),
            "-".repeat(self.width - filled),
            if current < self.total { "\r" } else { "\n" }
        )?;
        self.sink.flush()
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod format_tests;
