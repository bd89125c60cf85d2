//! End-to-end tests: run the binary inside a scratch working directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn csvstitch(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("csvstitch").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn logger_tree() -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), "A/log1.CSV", "x,1,2,3\n");
    write(dir.path(), "B/log2.CSV", "y,4,5,6\n");
    dir
}

fn stitched(dir: &Path) -> String {
    fs::read_to_string(dir.join("stitched.csv")).unwrap()
}

// ============================================================================
// Stitching
// ============================================================================

#[test]
fn test_stitches_two_subdirectories() {
    let dir = logger_tree();

    csvstitch(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Stitching files into stitched.csv"))
        .stdout(predicate::str::contains("Appending ./A/log1.CSV"))
        .stdout(predicate::str::contains("Appending ./B/log2.CSV"));

    assert_eq!(stitched(dir.path()), "x,1,2,3\ny,4,5,6\n");
}

#[test]
fn test_banner_precedes_appends() {
    let dir = logger_tree();

    let output = csvstitch(dir.path()).arg("stitch").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    let banner = stdout.find("Stitching files into stitched.csv").unwrap();
    let first = stdout.find("Appending ./A/log1.CSV").unwrap();
    let second = stdout.find("Appending ./B/log2.CSV").unwrap();
    assert!(banner < first && first < second);
}

#[test]
fn test_root_fragment_is_excluded() {
    let dir = logger_tree();
    write(dir.path(), "TOP.CSV", "root,0,0,0\n");

    csvstitch(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("TOP.CSV").not());

    assert_eq!(stitched(dir.path()), "x,1,2,3\ny,4,5,6\n");
}

#[test]
fn test_extension_is_case_sensitive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "A/lower.csv", "lower\n");
    write(dir.path(), "A/Mixed.Csv", "mixed\n");
    write(dir.path(), "A/UPPER.CSV", "upper\n");

    csvstitch(dir.path()).assert().success();

    assert_eq!(stitched(dir.path()), "upper\n");
}

#[test]
fn test_rerun_produces_identical_output() {
    let dir = logger_tree();

    csvstitch(dir.path()).assert().success();
    let first = stitched(dir.path());
    csvstitch(dir.path()).assert().success();

    assert_eq!(first, stitched(dir.path()));
}

#[test]
fn test_empty_tree_creates_empty_output() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();

    csvstitch(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Appending").not());

    assert!(stitched(dir.path()).is_empty());
}

#[test]
fn test_quiet_suppresses_progress_lines() {
    let dir = logger_tree();

    csvstitch(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(stitched(dir.path()), "x,1,2,3\ny,4,5,6\n");
}

fn json_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_json_mode_prints_one_object_per_line() {
    let dir = logger_tree();

    let output = csvstitch(dir.path())
        .args(["--output-format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&output);
    let report = lines.iter().find(|line| line["type"] == "report").unwrap();
    assert_eq!(report["total_bytes"], 16);
    assert_eq!(report["extension"], ".CSV");
    assert_eq!(report["fragments"].as_array().unwrap().len(), 2);
}

#[test]
fn test_extension_override() {
    let dir = tempdir().unwrap();
    write(dir.path(), "A/run.LOG", "log\n");
    write(dir.path(), "A/run.CSV", "csv\n");

    csvstitch(dir.path())
        .args(["--extension", ".LOG"])
        .assert()
        .success();

    assert_eq!(stitched(dir.path()), "log\n");
}

#[test]
fn test_config_file_in_working_directory_is_used() {
    let dir = logger_tree();
    write(dir.path(), "csvstitch.toml", "[stitch]\nexclude_patterns = [\"^B$\"]\n");

    csvstitch(dir.path()).assert().success();

    assert_eq!(stitched(dir.path()), "x,1,2,3\n");
}

#[test]
fn test_invalid_config_exits_with_config_code() {
    let dir = logger_tree();
    write(dir.path(), "csvstitch.toml", "[stitch\nextension = ");

    csvstitch(dir.path()).assert().code(2);

    assert!(!dir.path().join("stitched.csv").exists());
}

#[test]
fn test_unwritable_output_fails() {
    let dir = logger_tree();
    fs::create_dir(dir.path().join("stitched.csv")).unwrap();

    csvstitch(dir.path())
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Appending").not());
}

#[cfg(unix)]
#[test]
fn test_walk_error_aborts_with_traversal_code() {
    let dir = logger_tree();
    // B/loop points back at the working directory
    std::os::unix::fs::symlink(dir.path(), dir.path().join("B/loop")).unwrap();

    csvstitch(dir.path())
        .arg("--follow-links")
        .assert()
        .code(5);

    assert_eq!(stitched(dir.path()), "x,1,2,3\ny,4,5,6\n");
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = logger_tree();

    csvstitch(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would append ./A/log1.CSV"))
        .stdout(predicate::str::contains("Would append ./B/log2.CSV"));

    assert!(!dir.path().join("stitched.csv").exists());
}

#[test]
fn test_dry_run_cannot_be_combined_with_plot() {
    let dir = logger_tree();

    csvstitch(dir.path())
        .args(["--dry-run", "plot"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Would append").not());

    assert!(!dir.path().join("stitched.svg").exists());
}

#[test]
fn test_generate_config() {
    let dir = tempdir().unwrap();

    csvstitch(dir.path())
        .arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("csvstitch.toml"));

    let content = fs::read_to_string(dir.path().join("csvstitch.toml")).unwrap();
    assert!(content.contains("extension = \".CSV\""));
}

// ============================================================================
// Plotting
// ============================================================================

#[test]
fn test_plot_renders_svg() {
    let dir = tempdir().unwrap();
    write(dir.path(), "A/log1.CSV", "12:00:00 01/06/2016,101325,21.5,4.12\n");
    write(dir.path(), "B/log2.CSV", "12:00:30 01/06/2016,101320,21.6,4.11\n");

    csvstitch(dir.path()).assert().success();
    csvstitch(dir.path())
        .args(["plot", "--title", "Garden logger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows plotted: 2"));

    let svg = fs::read_to_string(dir.path().join("stitched.svg")).unwrap();
    assert!(svg.contains("Garden logger"));
}

#[test]
fn test_plot_without_stitched_file_fails() {
    let dir = tempdir().unwrap();

    csvstitch(dir.path())
        .arg("plot")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("stitched.csv"));

    assert!(!dir.path().join("stitched.svg").exists());
}

#[test]
fn test_plot_rejects_malformed_rows() {
    let dir = logger_tree();

    csvstitch(dir.path()).assert().success();
    csvstitch(dir.path()).arg("plot").assert().code(6);
}

#[test]
fn test_plot_json_summary() {
    let dir = tempdir().unwrap();
    write(dir.path(), "A/log1.CSV", "12:00:00 01/06/2016,101325,21.5,4.12\n");

    csvstitch(dir.path()).assert().success();
    let output = csvstitch(dir.path())
        .args(["--output-format", "json", "plot"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&output);
    let summary = lines.iter().find(|line| line["type"] == "plot").unwrap();
    assert_eq!(summary["rows"], 1);
}

#[test]
fn test_plot_rejects_unplottable_range() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "A/log1.CSV",
        "12:00:00 01/06/2016,-1e308,2,3\n12:00:10 01/06/2016,1e308,2,3\n",
    );

    csvstitch(dir.path()).assert().success();
    csvstitch(dir.path())
        .arg("plot")
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .code(7);
}
