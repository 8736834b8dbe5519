//! Reporters for verification failures and the end-of-run summary.
//!
//! Supports `human` (default) and `json` outputs. Human output is one
//! `path: message` line per failing file; JSON output is one object per
//! failing file per line, then a summary object.

use crate::models::{RunSummary, VerificationError};
use crate::pipeline::Reporter;
use log::{debug, warn};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::io::{self, IsTerminal, Write};

/// Colors only for human output on a terminal without `NO_COLOR`.
pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Prints each failing file to stdout as it arrives.
pub struct ConsoleReporter {
    json: bool,
    color: bool,
}

impl ConsoleReporter {
    pub fn new(output: &str) -> Self {
        Self {
            json: output == "json",
            color: use_colors(output),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, err: &VerificationError) {
        let line = if self.json {
            compose_error_json(err).to_string()
        } else {
            compose_error_line(err, self.color)
        };
        write_line(&mut io::stdout().lock(), &line);
    }
}

/// Write one line, tolerating a reader that went away (`impi ... | head`).
pub fn write_line(out: &mut impl Write, line: &str) {
    match writeln!(out, "{}", line).and_then(|_| out.flush()) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => debug!("stdout closed, dropping output"),
        Err(e) => warn!("failed to write output: {}", e),
    }
}

/// Render `path: message`, with the path in bold when `color` is set.
pub fn compose_error_line(err: &VerificationError, color: bool) -> String {
    if color {
        format!("{}: {}", err.file_path.bold(), err.message)
    } else {
        format!("{}: {}", err.file_path, err.message)
    }
}

pub fn compose_error_json(err: &VerificationError) -> JsonVal {
    json!({"file": err.file_path, "message": err.message})
}

/// Compose the summary JSON object (pure) for testing purposes.
pub fn compose_summary_json(summary: &RunSummary) -> JsonVal {
    json!({"summary": {"files": summary.files, "failed": summary.failed}})
}

/// Print the run summary; human output only gets one when something failed,
/// which `main` reports on stderr.
pub fn print_summary(summary: &RunSummary, output: &str) {
    if output == "json" {
        write_line(&mut io::stdout().lock(), &compose_summary_json(summary).to_string());
    }
}
