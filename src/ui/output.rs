//! ui::output
//!
//! twit's logging and result printing.
//!
//! Every message has a [`Level`]. The level decides the stream, the prefix
//! and the verbosity at which the message is shown. Results go to stdout;
//! diagnostics go to stderr so `--json` output stays machine-readable.

use std::fmt::Display;

use serde::Serialize;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors and JSON only
    Quiet,
    Normal,
    /// Also `[debug]` lines
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Kind of message being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
    /// Command results, on stdout.
    Info,
    Debug,
}

impl Level {
    fn prefix(self) -> &'static str {
        match self {
            Level::Error => "error: ",
            Level::Warn => "warning: ",
            Level::Info => "",
            Level::Debug => "[debug] ",
        }
    }

    /// Whether a message at this level is shown at `verbosity`.
    pub fn shown_at(self, verbosity: Verbosity) -> bool {
        match self {
            Level::Error => true,
            Level::Warn | Level::Info => verbosity != Verbosity::Quiet,
            Level::Debug => verbosity == Verbosity::Debug,
        }
    }

    fn to_stdout(self) -> bool {
        self == Level::Info
    }
}

/// The line printed for `message` at `level`, without the newline.
pub fn render(level: Level, message: impl Display) -> String {
    format!("{}{}", level.prefix(), message)
}

fn emit(level: Level, message: impl Display, verbosity: Verbosity) {
    if !level.shown_at(verbosity) {
        return;
    }
    let line = render(level, message);
    if level.to_stdout() {
        println!("{}", line);
    } else {
        eprintln!("{}", line);
    }
}

/// Print a command result (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    emit(Level::Info, message, verbosity);
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    emit(Level::Debug, message, verbosity);
}

/// Print a warning (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    emit(Level::Warn, message, verbosity);
}

/// Print an error (always shown).
pub fn error(message: impl Display) {
    emit(Level::Error, message, Verbosity::Quiet);
}

/// Print `value` as pretty JSON on stdout, whatever the verbosity.
pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items, one per line.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
