//! Shared data models: import categories, parsed and classified records,
//! groups, and the per-file verification error handed to reporters.

pub mod scheme;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Category an import path falls into.
pub enum ImportKind {
    Std,
    Local,
    ThirdParty,
    /// Dotted path seen while no local prefix is configured.
    LocalOrThirdParty,
}

impl ImportKind {
    /// Human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ImportKind::Std => "Std",
            ImportKind::Local => "Local",
            ImportKind::ThirdParty => "Third party",
            ImportKind::LocalOrThirdParty => "Local or third party",
        }
    }

    /// Whether a group of this kind may stand where `expected` is allowed.
    pub fn satisfies(self, expected: ImportKind) -> bool {
        self == expected
            || (self == ImportKind::LocalOrThirdParty
                && matches!(expected, ImportKind::Local | ImportKind::ThirdParty))
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One import spec as returned by the parser, before classification.
pub struct ParsedImport {
    pub path: String,
    /// First line of the attached lead comment, or `import_line`.
    pub start_line: usize,
    pub import_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One top-level `import` declaration with its specs in source order.
/// `end_line` is the closing `)` (or the lone spec's last line).
pub struct ImportDecl {
    pub end_line: usize,
    pub imports: Vec<ParsedImport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A classified import; immutable once built.
pub struct ImportRecord {
    pub path: String,
    pub start_line: usize,
    pub import_line: usize,
    pub end_line: usize,
    pub kind: ImportKind,
}

impl ImportRecord {
    pub fn new(parsed: ParsedImport, kind: ImportKind) -> Self {
        Self {
            path: parsed.path,
            start_line: parsed.start_line,
            import_line: parsed.import_line,
            end_line: parsed.end_line,
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Contiguous run of imports with no blank or comment-only line between them.
pub struct ImportGroup {
    pub records: Vec<ImportRecord>,
}

impl ImportGroup {
    pub fn paths(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.path.as_str()).collect()
    }

    /// Kind of the first record; groups are never empty.
    pub fn leading_kind(&self) -> Option<ImportKind> {
        self.records.first().map(|r| r.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A failing file and the combined description of everything wrong with it.
pub struct VerificationError {
    #[serde(rename = "file")]
    pub file_path: String,
    pub message: String,
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_path, self.message)
    }
}

impl std::error::Error for VerificationError {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Counters for a completed run.
pub struct RunSummary {
    pub files: usize,
    pub failed: usize,
}
