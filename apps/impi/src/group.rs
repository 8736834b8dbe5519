//! Splitting an import block into groups by source-line adjacency.

use crate::models::{ImportDecl, ImportGroup, ImportRecord};

/// Path of the cgo pseudo-import, which must sit in its own declaration.
pub const CGO_PSEUDO_IMPORT: &str = "C";

/// Partition records into groups. A record starts a new group unless it
/// begins on the line right after the previous record ends; a lead comment
/// has already moved `start_line` up, so it never counts as a gap.
pub fn group_imports(records: Vec<ImportRecord>) -> Vec<ImportGroup> {
    let mut groups = Vec::new();
    let mut current = ImportGroup::default();
    let mut last_end: Option<usize> = None;

    for record in records {
        if let Some(end) = last_end {
            if record.start_line != end + 1 {
                groups.push(std::mem::take(&mut current));
            }
        }
        last_end = Some(record.end_line);
        current.records.push(record);
    }
    if !current.records.is_empty() {
        groups.push(current);
    }
    groups
}

/// Drop declarations made up only of `import "C"`. A declaration mixing the
/// pseudo-import with ordinary imports is kept.
pub fn filter_cgo(decls: Vec<ImportDecl>) -> Vec<ImportDecl> {
    decls
        .into_iter()
        .filter(|decl| {
            let only_cgo = !decl.imports.is_empty()
                && decl.imports.iter().all(|i| i.path == CGO_PSEUDO_IMPORT);
            !only_cgo
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::models::{ImportKind, ParsedImport};
    use crate::parse::parse_imports;
    use pretty_assertions::assert_eq;

    fn rec(path: &str, start: usize, end: usize) -> ImportRecord {
        ImportRecord {
            path: path.into(),
            start_line: start,
            import_line: end,
            end_line: end,
            kind: ImportKind::Std,
        }
    }

    fn paths(groups: &[ImportGroup]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|g| g.paths().into_iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn blank_line_splits_groups() {
        let groups = group_imports(vec![
            rec("fmt", 3, 3),
            rec("os", 4, 4),
            rec("github.com/a/b", 6, 6),
        ]);
        assert_eq!(
            paths(&groups),
            vec![vec!["fmt".to_string(), "os".into()], vec!["github.com/a/b".into()]]
        );
    }

    #[test]
    fn lead_comment_keeps_record_in_group() {
        // "b" is at line 5 with its comment on line 4
        let groups = group_imports(vec![rec("a", 3, 3), rec("b", 4, 5), rec("c", 6, 6)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].records.len(), 3);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_imports(Vec::new()).is_empty());
    }

    #[test]
    fn regrouping_serialized_groups_is_stable() {
        let src = r#"package p

import (
    "fmt"
    // comment
    "os"

    "github.com/x/y"
    "github.com/x/z"

    "golang.org/q"
)
"#;
        let group_src = |s: &str| {
            let decl = parse_imports(s).unwrap().remove(0);
            group_imports(
                decl.imports
                    .into_iter()
                    .map(|p| {
                        let kind = classify(&p.path, "");
                        ImportRecord::new(p, kind)
                    })
                    .collect(),
            )
        };
        let first = group_src(src);
        let mut rendered = String::from("package p\n\nimport (\n");
        for (i, g) in first.iter().enumerate() {
            if i > 0 {
                rendered.push('\n');
            }
            for p in g.paths() {
                rendered.push_str(&format!("    \"{}\"\n", p));
            }
        }
        rendered.push_str(")\n");
        let second = group_src(&rendered);
        assert_eq!(paths(&first), paths(&second));
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn cgo_only_declaration_is_filtered() {
        let imp = |p: &str, line: usize| ParsedImport {
            path: p.into(),
            start_line: line,
            import_line: line,
            end_line: line,
        };
        let decls = vec![
            ImportDecl {
                end_line: 6,
                imports: vec![imp("fmt", 4), imp("os", 5)],
            },
            ImportDecl {
                end_line: 11,
                imports: vec![imp("C", 11)],
            },
            ImportDecl {
                end_line: 15,
                imports: vec![imp("C", 13), imp("unsafe", 14)],
            },
        ];
        let kept = filter_cgo(decls);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].imports[0].path, "C");
    }
}
