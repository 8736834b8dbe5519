//! Per-file import verification.
//!
//! A file goes through: generated-file exemption, parsing, the single
//! declaration rule, classification and grouping, then the structural
//! checks (group count, homogeneous groups, group order) and finally the
//! sort check. Structural and sort violations accumulate so one run tells
//! the author everything that is wrong with the block.

use crate::classify::classify;
use crate::config::VerifyOptions;
use crate::error::ParseError;
use crate::group::{filter_cgo, group_imports};
use crate::models::scheme::Scheme;
use crate::models::{ImportGroup, ImportRecord};
use crate::parse::parse_imports;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

/// Marker the Go toolchain recognises in generated sources.
static GENERATED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"// Code generated .* DO NOT EDIT\.").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
/// A group whose paths are not in ascending order.
pub struct UnsortedGroup {
    pub index: usize,
    pub got: Vec<String>,
    pub expected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("multiple import declarations not permitted, got {0}")]
    MultipleDeclarations(usize),
    #[error("expected no more than {max} groups, got {got}")]
    TooManyGroups { max: usize, got: usize },
    #[error("imports of different types are not allowed in the same group ({index}): {first} != {offending}")]
    MixedGroup {
        index: usize,
        first: String,
        offending: String,
    },
    #[error("import groups are not in the proper order: {}", quoted(.0))]
    GroupOrder(Vec<&'static str>),
    #[error("{}", render_unsorted(.0))]
    Unsorted(Vec<UnsortedGroup>),
}

fn quoted(names: &[&str]) -> String {
    let inner: Vec<String> = names.iter().map(|n| format!("{:?}", n)).collect();
    format!("[{}]", inner.join(" "))
}

fn render_unsorted(groups: &[UnsortedGroup]) -> String {
    groups
        .iter()
        .map(|g| {
            format!(
                "\n- Import group {} is not sorted\n-- Got:\n{}\n\n-- Expected:\n{}",
                g.index,
                g.got.join("\n"),
                g.expected.join("\n")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why a file did not verify.
pub enum FileFailure {
    Parse(ParseError),
    Violations(Vec<Violation>),
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFailure::Parse(e) => write!(f, "{}", e),
            FileFailure::Violations(vs) => {
                let parts: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                f.write_str(&parts.join("\n"))
            }
        }
    }
}

impl std::error::Error for FileFailure {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a file passed.
pub enum Verdict {
    Generated,
    NoImports,
    Passed { groups: usize },
}

/// Checks one file at a time against shared, read-only options.
pub struct Verifier<'a> {
    options: &'a VerifyOptions,
}

impl<'a> Verifier<'a> {
    pub fn new(options: &'a VerifyOptions) -> Self {
        Self { options }
    }

    fn scheme(&self) -> &Scheme {
        &self.options.scheme
    }

    /// Verify raw file contents; input that is not UTF-8 fails like a
    /// syntax error at the first bad byte.
    pub fn verify_bytes(&self, bytes: &[u8]) -> Result<Verdict, FileFailure> {
        match std::str::from_utf8(bytes) {
            Ok(src) => self.verify(src),
            Err(e) => Err(FileFailure::Parse(illegal_encoding(bytes, e.valid_up_to()))),
        }
    }

    pub fn verify(&self, src: &str) -> Result<Verdict, FileFailure> {
        if self.options.ignore_generated && GENERATED_MARKER.is_match(src) {
            return Ok(Verdict::Generated);
        }

        let decls = filter_cgo(parse_imports(src).map_err(FileFailure::Parse)?);
        if decls.is_empty() {
            return Ok(Verdict::NoImports);
        }
        if decls.len() > 1 {
            return Err(FileFailure::Violations(vec![Violation::MultipleDeclarations(
                decls.len(),
            )]));
        }

        let records: Vec<ImportRecord> = decls
            .into_iter()
            .flat_map(|d| d.imports)
            .map(|parsed| {
                let kind = classify(&parsed.path, &self.options.local_prefix);
                ImportRecord::new(parsed, kind)
            })
            .collect();
        let groups = group_imports(records);

        let mut violations = Vec::new();
        let scheme = self.scheme();
        if groups.len() > scheme.max_groups {
            violations.push(Violation::TooManyGroups {
                max: scheme.max_groups,
                got: groups.len(),
            });
        } else if !scheme.allow_mixed {
            match check_homogeneous(&groups) {
                Some(mixed) => violations.push(mixed),
                None => violations.extend(check_group_order(scheme, &groups)),
            }
        }
        violations.extend(check_sorted(&groups));

        if violations.is_empty() {
            Ok(Verdict::Passed {
                groups: groups.len(),
            })
        } else {
            Err(FileFailure::Violations(violations))
        }
    }
}

fn illegal_encoding(bytes: &[u8], offset: usize) -> ParseError {
    let prefix = &bytes[..offset];
    let line_start = prefix.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
    ParseError {
        line: prefix.iter().filter(|b| **b == b'\n').count() + 1,
        column: offset - line_start + 1,
        message: "illegal UTF-8 encoding".to_string(),
    }
}

/// First record whose kind differs from its group's first record.
fn check_homogeneous(groups: &[ImportGroup]) -> Option<Violation> {
    groups.iter().enumerate().find_map(|(index, group)| {
        let first = group.records.first()?;
        group
            .records
            .iter()
            .find(|r| r.kind != first.kind)
            .map(|r| Violation::MixedGroup {
                index,
                first: first.path.clone(),
                offending: r.path.clone(),
            })
    })
}

fn check_group_order(scheme: &Scheme, groups: &[ImportGroup]) -> Option<Violation> {
    let observed: Vec<_> = groups.iter().filter_map(|g| g.leading_kind()).collect();
    if scheme.accepts(&observed) {
        return None;
    }
    Some(Violation::GroupOrder(scheme.category_names(&observed)))
}

/// Every group must be in strictly ascending byte order; all offenders are
/// collected into one violation.
fn check_sorted(groups: &[ImportGroup]) -> Option<Violation> {
    let unsorted: Vec<UnsortedGroup> = groups
        .iter()
        .enumerate()
        .filter_map(|(index, group)| {
            let got: Vec<String> = group.paths().into_iter().map(String::from).collect();
            if got.windows(2).all(|w| w[0] < w[1]) {
                return None;
            }
            let mut expected = got.clone();
            expected.sort();
            Some(UnsortedGroup {
                index,
                got,
                expected,
            })
        })
        .collect();
    if unsorted.is_empty() {
        None
    } else {
        Some(Violation::Unsorted(unsorted))
    }
}
