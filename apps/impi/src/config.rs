//! Configuration discovery and effective settings resolution.
//!
//! impi reads `impi.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `local`: unset (dotted imports are then "local or third party")
//! - `scheme`: none; a scheme must come from the CLI or the config file
//! - `skipTests`, `ignoreGenerated`: false
//! - `workers`: available parallelism
//! - `output`: `human`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::SetupError;
use crate::models::scheme::{Scheme, SchemeRegistry};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CONFIG_FILES: [&str; 3] = ["impi.toml", "impi.yaml", "impi.yml"];

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Root configuration loaded from `impi.toml|yaml`.
pub struct ImpiConfig {
    pub local: Option<String>,
    pub scheme: Option<String>,
    /// Base-name glob of files to leave alone.
    pub ignore: Option<String>,
    pub skip_tests: Option<bool>,
    pub skip_paths: Option<Vec<String>>,
    pub ignore_generated: Option<bool>,
    pub workers: Option<usize>,
    pub output: Option<String>,
}

#[derive(Debug, Default, Clone)]
/// Values supplied on the command line; `None` defers to the config file.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub local: Option<String>,
    pub scheme: Option<String>,
    pub ignore: Option<String>,
    pub skip_tests: Option<bool>,
    pub skip_paths: Vec<String>,
    pub ignore_generated: Option<bool>,
    pub workers: Option<usize>,
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the run after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub local_prefix: String,
    pub scheme: Option<String>,
    pub ignore: Option<String>,
    pub skip_tests: bool,
    pub skip_paths: Vec<String>,
    pub ignore_generated: bool,
    pub workers: usize,
    pub output: String,
}

#[derive(Debug, Clone)]
/// Compiled, immutable options shared by every stage of a run.
pub struct VerifyOptions {
    pub scheme: Arc<Scheme>,
    pub local_prefix: String,
    pub skip_tests: bool,
    pub skip_paths: Vec<Regex>,
    pub ignore_generated: bool,
    pub ignore: Option<glob::Pattern>,
}

impl VerifyOptions {
    pub fn new(scheme: Arc<Scheme>, local_prefix: impl Into<String>) -> Self {
        Self {
            scheme,
            local_prefix: local_prefix.into(),
            skip_tests: false,
            skip_paths: Vec::new(),
            ignore_generated: false,
            ignore: None,
        }
    }
}

impl Effective {
    /// Resolve the scheme and compile every pattern; fails before any file
    /// is touched.
    pub fn verify_options(&self, registry: &SchemeRegistry) -> Result<VerifyOptions, SetupError> {
        let scheme = registry.resolve_name(self.scheme.as_deref().ok_or(SetupError::MissingScheme)?)?;
        let skip_paths = self
            .skip_paths
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| SetupError::InvalidSkipPath {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ignore = match self.ignore.as_deref() {
            None | Some("") => None,
            Some(p) => Some(glob::Pattern::new(p).map_err(|source| {
                SetupError::InvalidIgnorePattern {
                    pattern: p.to_string(),
                    source,
                }
            })?),
        };
        Ok(VerifyOptions {
            scheme,
            local_prefix: self.local_prefix.clone(),
            skip_tests: self.skip_tests,
            skip_paths,
            ignore_generated: self.ignore_generated,
            ignore,
        })
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when an `impi.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `ImpiConfig` from `impi.toml` or `impi.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, ImpiConfig)>, SetupError> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| SetupError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<ImpiConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<ImpiConfig>(&s).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => Ok(Some((path, cfg))),
            Err(message) => Err(SetupError::ConfigParse { path, message }),
        };
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective, SetupError> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let (config_path, cfg) = match load_config(&repo_root)? {
        Some((path, cfg)) => (Some(path), cfg),
        None => (None, ImpiConfig::default()),
    };

    let local_prefix = cli.local.clone().or(cfg.local).unwrap_or_default();
    let scheme = cli.scheme.clone().or(cfg.scheme);
    let ignore = cli.ignore.clone().or(cfg.ignore);
    let skip_tests = cli.skip_tests.or(cfg.skip_tests).unwrap_or(false);
    let skip_paths = if cli.skip_paths.is_empty() {
        cfg.skip_paths.unwrap_or_default()
    } else {
        cli.skip_paths.clone()
    };
    let ignore_generated = cli.ignore_generated.or(cfg.ignore_generated).unwrap_or(false);
    let workers = cli
        .workers
        .or(cfg.workers)
        .unwrap_or_else(default_workers)
        .max(1);
    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    Ok(Effective {
        repo_root,
        config_path,
        local_prefix,
        scheme,
        ignore,
        skip_tests,
        skip_paths,
        ignore_generated,
        workers,
        output,
    })
}

/// Number of available processing units, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn overrides_for(root: &Path) -> Overrides {
        Overrides {
            repo_root: root.to_str().map(String::from),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("impi.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
local = "github.com/acme/app"
scheme = "stdThirdPartyLocal"
skipTests = true
skipPaths = ["/vendor/", "\\.pb\\.go$"]
workers = 3
output = "json"
    "#
        )
        .unwrap();

        let eff = resolve_effective(&overrides_for(root)).unwrap();
        assert_eq!(eff.local_prefix, "github.com/acme/app");
        assert_eq!(eff.scheme.as_deref(), Some("stdThirdPartyLocal"));
        assert!(eff.skip_tests);
        assert_eq!(eff.skip_paths.len(), 2);
        assert_eq!(eff.workers, 3);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.config_path, Some(root.join("impi.toml")));
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("impi.yaml"),
            "scheme: stdLocalThirdParty\nignoreGenerated: true\n",
        )
        .unwrap();

        let eff = resolve_effective(&overrides_for(root)).unwrap();
        assert_eq!(eff.scheme.as_deref(), Some("stdLocalThirdParty"));
        assert!(eff.ignore_generated);
        assert!(!eff.skip_tests);
        assert_eq!(eff.local_prefix, "");
        assert_eq!(eff.output, "human");
        assert!(eff.workers >= 1);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("impi.toml"),
            "scheme = \"stdLocalThirdParty\"\nlocal = \"a.b/c\"\nskipPaths = [\"x\"]\nworkers = 8\n",
        )
        .unwrap();
        let cli = Overrides {
            local: Some("d.e/f".into()),
            scheme: Some("stdThirdPartyLocal".into()),
            skip_paths: vec!["y".into(), "z".into()],
            workers: Some(0),
            ..overrides_for(root)
        };
        let eff = resolve_effective(&cli).unwrap();
        assert_eq!(eff.local_prefix, "d.e/f");
        assert_eq!(eff.scheme.as_deref(), Some("stdThirdPartyLocal"));
        assert_eq!(eff.skip_paths, vec!["y".to_string(), "z".to_string()]);
        // clamped
        assert_eq!(eff.workers, 1);
    }

    #[test]
    fn test_invalid_config_is_setup_error() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("impi.toml"), "workers = \"many\"\n").unwrap();
        let err = resolve_effective(&overrides_for(root)).unwrap_err();
        assert!(matches!(err, SetupError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_scheme_in_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("impi.toml"), "scheme = \"stdNonStd\"\n").unwrap();
        let eff = resolve_effective(&overrides_for(root)).unwrap();
        let err = eff.verify_options(&SchemeRegistry::builtin()).unwrap_err();
        assert!(matches!(err, SetupError::UnknownScheme(ref name) if name == "stdNonStd"));
    }

    #[test]
    fn test_compile_rejects_bad_patterns() {
        let dir = tempdir().unwrap();
        let registry = SchemeRegistry::builtin();
        let mut eff = resolve_effective(&Overrides {
            scheme: Some("stdLocalThirdParty".into()),
            ..overrides_for(dir.path())
        })
        .unwrap();
        assert!(eff.verify_options(&registry).is_ok());

        eff.skip_paths = vec!["(".into()];
        assert!(matches!(
            eff.verify_options(&registry).unwrap_err(),
            SetupError::InvalidSkipPath { .. }
        ));

        eff.skip_paths.clear();
        eff.ignore = Some("[".into());
        assert!(matches!(
            eff.verify_options(&registry).unwrap_err(),
            SetupError::InvalidIgnorePattern { .. }
        ));

        eff.ignore = None;
        eff.scheme = None;
        assert!(matches!(
            eff.verify_options(&registry).unwrap_err(),
            SetupError::MissingScheme
        ));
    }
}
