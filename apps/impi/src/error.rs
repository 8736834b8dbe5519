//! Error taxonomy.
//!
//! Setup errors abort before any file is read. Parse errors and violations
//! stay local to one file and end up in a `VerificationError`. Run errors
//! are what `pipeline::run` hands back to the binary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unsupported verification scheme: {0}")]
    UnknownScheme(String),
    #[error("no verification scheme configured; pass --scheme or set `scheme` in impi.toml")]
    MissingScheme,
    #[error("invalid skip path pattern {pattern:?}: {source}")]
    InvalidSkipPath {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid ignore pattern {pattern:?}: {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config {} is not valid: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },
    #[error("no package paths given")]
    NoRoots,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
/// Syntax failure in the import region of a source file.
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error("could not find packages in {0}")]
    NoPackages(String),
    #[error("failed to list {}: {source}", .path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pipeline stage failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("found {count} errors")]
    Failed { count: usize, files: usize },
}

impl RunError {
    /// Process exit code for this error: 2 for setup problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Setup(_) => 2,
            _ => 1,
        }
    }
}
