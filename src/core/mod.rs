//! core
//!
//! Core domain types and configuration for twit.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, RefName
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid ref and branch names from reaching Git
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
