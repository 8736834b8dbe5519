use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SORTED: &str = "package app\n\nimport (\n\t\"fmt\"\n\t\"os\"\n\n\t\"github.com/acme/app/internal/db\"\n\n\t\"github.com/sirupsen/logrus\"\n)\n";
const UNSORTED: &str = "package app\n\nimport (\n\t\"os\"\n\t\"fmt\"\n)\n";

fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("impi").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn tree(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().expect("create temp dir");
    for (rel, body) in files {
        let p = tmp.path().join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }
    tmp
}

#[test]
fn clean_tree_exits_zero() {
    let tmp = tree(&[("main.go", SORTED), ("internal/db/db.go", "package db\n")]);
    cmd(tmp.path())
        .args(["--local", "github.com/acme/app", "--scheme", "stdLocalThirdParty", "./..."])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn violations_are_reported_per_file() {
    let tmp = tree(&[("main.go", SORTED), ("bad/bad.go", UNSORTED)]);
    cmd(tmp.path())
        .args(["--local", "github.com/acme/app", "--scheme", "stdLocalThirdParty", "./..."])
        .assert()
        .code(1)
        .stdout(contains("bad.go: "))
        .stdout(contains("Import group 0 is not sorted"))
        .stdout(contains("main.go").not())
        .stderr(contains("impi verification failed: found 1 errors"));
}

#[test]
fn scheme_order_is_enforced() {
    let tmp = tree(&[("main.go", SORTED)]);
    cmd(tmp.path())
        .args(["--local", "github.com/acme/app", "--scheme", "stdThirdPartyLocal", "main.go"])
        .assert()
        .code(1)
        .stdout(contains(r#"import groups are not in the proper order: ["Std" "Local" "Third party"]"#));
}

#[test]
fn config_file_supplies_options() {
    let tmp = tree(&[
        ("impi.toml", "local = \"github.com/acme/app\"\nscheme = \"stdLocalThirdParty\"\nskipTests = true\n"),
        ("main.go", SORTED),
        ("main_test.go", UNSORTED),
    ]);
    cmd(tmp.path()).arg("./...").assert().success();
}

#[test]
fn json_output_has_records_and_summary() {
    let tmp = tree(&[("bad.go", UNSORTED)]);
    cmd(tmp.path())
        .args(["--scheme", "stdLocalThirdParty", "--output", "json", "."])
        .assert()
        .code(1)
        .stdout(contains("\"file\":"))
        .stdout(contains("\"summary\":{\"files\":1,\"failed\":1}"));
}

#[test]
fn ignore_pattern_and_generated_marker_skip_files() {
    let generated = format!("// Code generated by mockgen. DO NOT EDIT.\n\n{}", UNSORTED);
    let tmp = tree(&[("api.pb.go", UNSORTED), ("mock.go", generated.as_str())]);
    cmd(tmp.path())
        .args(["--scheme", "stdLocalThirdParty", "--ignore", "*.pb.go", "--ignore-generated", "."])
        .assert()
        .success();
}

#[test]
fn setup_errors_exit_two() {
    let tmp = tree(&[("main.go", SORTED)]);
    cmd(tmp.path())
        .args(["--scheme", "stdLocalThirdParty", "--skip-path", "(", "."])
        .assert()
        .code(2)
        .stderr(contains("invalid skip path pattern"));
    cmd(tmp.path()).arg(".").assert().code(2).stderr(contains("no verification scheme configured"));
    cmd(tmp.path())
        .args(["--scheme", "stdNonStd", "."])
        .assert()
        .code(2)
        .stderr(contains("unsupported verification scheme: stdNonStd"));
}

#[test]
fn unknown_scheme_in_config_exits_two() {
    let tmp = tree(&[("impi.yaml", "scheme: stdNonStd\n"), ("main.go", SORTED)]);
    cmd(tmp.path())
        .arg(".")
        .assert()
        .code(2)
        .stderr(contains("unsupported verification scheme: stdNonStd"));
}

#[test]
fn non_utf8_file_fails_verification() {
    let tmp = tree(&[("main.go", SORTED)]);
    fs::write(tmp.path().join("latin1.go"), b"package app\n\nimport \"caf\xe9\"\n").unwrap();
    cmd(tmp.path())
        .args(["--scheme", "stdLocalThirdParty", "."])
        .assert()
        .code(1)
        .stdout(contains("latin1.go: 3:12: illegal UTF-8 encoding"))
        .stdout(contains("main.go").not());
}
