//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "impi",
    version,
    about = "Verify Go import groups and their ordering",
    long_about = "impi checks that every Go file has at most one import declaration, split into no more than three groups (standard library, local, third party) that appear in the order of the chosen scheme and are each sorted.\n\nConfiguration precedence: CLI > impi.toml > defaults.",
    after_help = "Examples:\n  impi --local github.com/acme/app --scheme stdLocalThirdParty ./...\n  impi --scheme stdThirdPartyLocal --skip-tests --skip-path '/mocks/' ./cmd/... ./pkg/...\n  impi --ignore '*.pb.go' --ignore-generated --output json ./...",
    arg_required_else_help = true
)]
/// Top-level CLI options.
pub struct Cli {
    #[arg(value_name = "PACKAGE", required = true, help = "Package paths to verify; a trailing /... includes nested packages")]
    pub packages: Vec<String>,
    #[arg(long, help = "Prefix of the local repository")]
    pub local: Option<String>,
    #[arg(long, help = "Verification scheme to enforce: stdLocalThirdParty|stdThirdPartyLocal")]
    pub scheme: Option<String>,
    #[arg(long, help = "File pattern to ignore (base name, not path)")]
    pub ignore: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Do not verify _test.go files")]
    pub skip_tests: bool,
    #[arg(long = "skip-path", value_name = "REGEX", help = "Skip files whose path matches (repeatable)")]
    pub skip_paths: Vec<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip files carrying a 'Code generated ... DO NOT EDIT.' marker")]
    pub ignore_generated: bool,
    #[arg(long, help = "Number of concurrent verifiers (default: available CPUs)")]
    pub workers: Option<usize>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Directory to start looking for impi.toml (default: current dir)")]
    pub repo_root: Option<String>,
}

impl Cli {
    /// Flags as config overrides; unset switches defer to the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            repo_root: self.repo_root.clone(),
            local: self.local.clone(),
            scheme: self.scheme.clone(),
            ignore: self.ignore.clone(),
            skip_tests: if self.skip_tests { Some(true) } else { None },
            skip_paths: self.skip_paths.clone(),
            ignore_generated: if self.ignore_generated { Some(true) } else { None },
            workers: self.workers,
            output: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_into_overrides() {
        let cli = Cli::try_parse_from([
            "impi",
            "--local",
            "github.com/acme/app",
            "--scheme",
            "stdThirdPartyLocal",
            "--skip-tests",
            "--skip-path",
            "a",
            "--skip-path",
            "b",
            "./...",
        ])
        .unwrap();
        let ov = cli.overrides();
        assert_eq!(cli.packages, vec!["./...".to_string()]);
        assert_eq!(ov.scheme.as_deref(), Some("stdThirdPartyLocal"));
        assert_eq!(ov.skip_tests, Some(true));
        assert_eq!(ov.ignore_generated, None);
        assert_eq!(ov.skip_paths, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn scheme_name_is_passed_through_for_resolution() {
        let cli = Cli::try_parse_from(["impi", "--scheme", "stdNonStd", "./..."]).unwrap();
        assert_eq!(cli.overrides().scheme.as_deref(), Some("stdNonStd"));
    }
}
