//! CLI exit status and error reporting
//!
//! Runs the built `releve_report` binary against scratch inputs.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn releve_report(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_releve_report"))
        .args(args)
        .env_remove("RELEVE_REPORT_OUTPUT_DIR")
        .env_remove("RELEVE_REPORT_ORDINATION")
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn success_exits_zero_and_prints_report_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("site.csv");
    fs::write(&input, "RELEVE_ID,SPECIES_NAME,DOMIN\n1,A,5\n30,B,3\n").unwrap();
    let out_dir = dir.path().join("out");

    let output = releve_report(&[
        path_arg(&input),
        "--no-ordination",
        "--format",
        "markdown",
        "--output-dir",
        path_arg(&out_dir),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), out_dir.join("site_report.md").display().to_string());
    assert!(out_dir.join("site_report.md").is_file());
}

#[test]
fn schema_error_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("schema.csv");
    fs::write(&input, "RELEVE_ID,SPECIES,DOMIN\n1,A,5\n").unwrap();

    let output = releve_report(&[path_arg(&input), "--no-ordination"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error [ingest]: missing required column(s): SPECIES_NAME"));
}

#[test]
fn parse_error_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(&input, "RELEVE_ID,SPECIES_NAME,DOMIN\n1,A,5\n2,B,n/a\n").unwrap();

    let output = releve_report(&[path_arg(&input), "--no-ordination"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error [ingest]: row 1"));
    assert!(!dir.path().join("reports/bad_report.html").exists());
}

#[test]
fn empty_data_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    fs::write(&input, "RELEVE_ID,SPECIES_NAME,DOMIN\n").unwrap();

    let output = releve_report(&[path_arg(&input), "--no-ordination"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error [aggregate]"));
}

#[cfg(unix)]
#[test]
fn ordination_failure_exits_one_with_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("nmds.csv");
    fs::write(&input, "RELEVE_ID,SPECIES_NAME,DOMIN\n1,A,5\n").unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{"ordination": {"program": "sh", "args": ["-c", "echo 'stress did not converge' >&2; exit 4", "nmds"]}}"#,
    )
    .unwrap();

    let output = releve_report(&[path_arg(&input), "--config", path_arg(&config)]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error [ordination]"));
    assert!(stderr.contains("stress did not converge"));
    assert!(!dir.path().join("reports/nmds_report.html").exists());
}
