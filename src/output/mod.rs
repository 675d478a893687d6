//! User-facing messages of the cfgvault CLI.
//!
//! Everything here goes to stderr, so `cfgvault list` output on stdout stays
//! pipeable. Diagnostics meant for developers go through `tracing` instead.

use colored::{ColoredString, Colorize};
use std::sync::atomic::{AtomicU8, Ordering};

/// How chatty the CLI is, from `--quiet` / `--verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet = 0,
    /// Progress and results.
    Normal = 1,
    /// Also each file touched.
    Verbose = 2,
}

impl Verbosity {
    /// Level selected by the global flags; `quiet` wins over `verbose`.
    #[must_use]
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, true) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Quiet,
            2 => Self::Verbose,
            _ => Self::Normal,
        }
    }
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Sets the process-wide level.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// The process-wide level.
pub fn get_verbosity() -> Verbosity {
    Verbosity::from_u8(VERBOSITY.load(Ordering::Relaxed))
}

/// Whether a message needing `min` is currently shown.
#[must_use]
pub fn shows(min: Verbosity) -> bool {
    get_verbosity() >= min
}

fn emit(min: Verbosity, line: ColoredString) {
    if shows(min) {
        eprintln!("{line}");
    }
}

/// A finished operation, in green.
pub fn success(message: &str) {
    emit(Verbosity::Normal, message.green());
}

/// A fatal failure. Shown even with `--quiet`.
pub fn error(message: &str) {
    eprintln!("{} {message}", "Error:".red().bold());
}

/// Something skipped or suspicious. Shown even with `--quiet`.
pub fn warning(message: &str) {
    emit(Verbosity::Quiet, message.yellow().bold());
}

/// Dimmed progress note.
pub fn info(message: &str) {
    emit(Verbosity::Normal, message.dimmed());
}

/// Per-file detail, only with `--verbose`.
pub fn verbose(message: &str) {
    emit(Verbosity::Verbose, message.dimmed());
}

/// `Linked ~/.bashrc` style line: a dimmed verb followed by its subject.
pub fn action(verb: &str, subject: &str) {
    if shows(Verbosity::Normal) {
        eprintln!("{} {subject}", verb.dimmed().bold());
    }
}

/// `count` followed by `noun`, with a trailing `s` unless it is exactly one.
#[must_use]
pub fn count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
