//! impi core library.
//!
//! This crate verifies that the import block of Go source files is split
//! into at most three groups, ordered per a scheme and sorted within each
//! group.
//!
//! High-level modules:
//! - `classify`: Maps an import path to std/local/third-party.
//! - `group`: Splits an import block into groups by line adjacency.
//! - `parse`: Reads the package clause and import declarations of a file.
//! - `models`: Records, groups, errors, and the scheme registry.
//! - `verify`: Per-file checks (declaration count, groups, order, sorting).
//! - `discover`: Package path expansion and file filters.
//! - `pipeline`: Bounded concurrent verification of many files.
//! - `config`: Discovery and effective configuration resolution.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `output`: Human/JSON reporters.
//! - `error`: Setup, parse and run error types.
//! - `utils`: Supporting helpers.
pub mod classify;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod group;
pub mod models;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod utils;
pub mod verify;
