//! Message prefixes for diagnostics printed to stderr.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

fn colored() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}

pub fn error_prefix() -> String {
    if colored() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}
