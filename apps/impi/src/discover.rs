//! Package path expansion and candidate file filtering.
//!
//! Roots follow `go` tool package-path semantics for filesystem paths: a
//! trailing `/...` means the directory and every package beneath it. Trees
//! named `testdata` or `vendor`, or starting with `.` or `_`, are not
//! descended into by the wildcard.

use crate::config::VerifyOptions;
use crate::error::RunError;
use glob::glob;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

const WILDCARD: &str = "...";

/// Expand one root argument into package directories or plain paths.
pub fn expand_root(root: &str) -> Result<Vec<PathBuf>, RunError> {
    let Some(base) = root.strip_suffix(WILDCARD) else {
        return Ok(vec![PathBuf::from(root)]);
    };
    let base = match base.trim_end_matches('/') {
        "" if base.starts_with('/') => "/",
        "" => ".",
        b => b,
    };
    let pattern = format!("{}/**/*.go", glob::Pattern::escape(base));
    let entries = glob(&pattern).map_err(|_| RunError::NoPackages(root.to_string()))?;

    let mut packages = BTreeSet::new();
    for entry in entries {
        let file = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            RunError::Discover {
                path,
                source: e.into(),
            }
        })?;
        let dir = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from(base),
        };
        if !in_skipped_tree(Path::new(base), &dir) {
            packages.insert(dir);
        }
    }
    if packages.is_empty() {
        return Err(RunError::NoPackages(root.to_string()));
    }
    Ok(packages.into_iter().collect())
}

fn in_skipped_tree(base: &Path, dir: &Path) -> bool {
    let rel = dir.strip_prefix(base).unwrap_or(dir);
    rel.components().any(|c| match c {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            name.starts_with('.') || name.starts_with('_') || name == "testdata" || name == "vendor"
        }
        _ => false,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why a candidate file is not verified.
pub enum Skip {
    NotGo,
    Test,
    SkipPath(String),
    Ignored,
}

/// Decides which discovered files reach the workers.
pub struct FileFilter<'a> {
    options: &'a VerifyOptions,
}

impl<'a> FileFilter<'a> {
    pub fn new(options: &'a VerifyOptions) -> Self {
        Self { options }
    }

    pub fn skip_reason(&self, path: &Path) -> Option<Skip> {
        let full = path.to_string_lossy();
        if !full.ends_with(".go") {
            return Some(Skip::NotGo);
        }
        if self.options.skip_tests && full.ends_with("_test.go") {
            return Some(Skip::Test);
        }
        if let Some(re) = self.options.skip_paths.iter().find(|re| re.is_match(&full)) {
            return Some(Skip::SkipPath(re.as_str().to_string()));
        }
        let ignored = match (&self.options.ignore, path.file_name()) {
            (Some(pattern), Some(name)) => pattern.matches(&name.to_string_lossy()),
            _ => false,
        };
        if ignored {
            return Some(Skip::Ignored);
        }
        None
    }
}
