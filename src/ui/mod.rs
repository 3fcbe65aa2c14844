//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting, verbosity and diagnostics
//!
//! All command output goes through this module so `--quiet` and `--debug`
//! behave the same everywhere.

pub mod output;
