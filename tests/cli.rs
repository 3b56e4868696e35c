//! Integration tests for the heatup binary.
//!
//! Each test runs in its own temp directory so a stray heatup.toml in the
//! working tree never changes the results.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn heatup_raw(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("heatup").expect("binary exists");
    cmd.current_dir(dir.path()).env_remove("NO_COLOR");
    cmd
}

fn heatup(dir: &TempDir) -> Command {
    let mut cmd = heatup_raw(dir);
    cmd.args(["--theme", "plain"]);
    cmd
}

#[test]
fn calc_water_medium() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args(["calc", "water", "--volume", "250ml", "--intensity", "medium"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated time: 2 min 21 s"))
        .stdout(predicate::str::contains("Water, 250 ml, 25.0 °C → 100.0 °C (medium heat)"));
}

#[test]
fn calc_spanish_names() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args(["calc", "agua", "-q", "250", "-i", "bajo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 min 45 s"));
}

#[test]
fn advanced_chocolate() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args(["advanced", "chocolate", "-q", "0.5l", "--initial", "10C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 min 41 s"));
}

#[test]
fn zero_volume_is_rejected() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args(["calc", "milk", "--volume", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantity must be greater than zero"));
}

#[test]
fn unknown_liquid_suggests() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args(["calc", "choc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did you mean Chocolate?"));
}

#[test]
fn curve_csv_has_requested_samples() {
    let dir = TempDir::new().expect("create temp dir");
    let output = heatup(&dir)
        .args([
            "curve", "water", "-q", "250", "--model", "exponential", "--samples", "11", "--format",
            "csv",
        ])
        .output()
        .expect("run heatup");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[0], "time_s,temperature_c");
    assert_eq!(lines[1], "0.0,25.0");
    let last: Vec<f64> = lines[11]
        .split(',')
        .map(|v| v.parse().expect("number"))
        .collect();
    assert!((last[0] - 140.625).abs() < 1e-9);
    assert!((last[1] - 99.25).abs() < 1e-6);
}

#[test]
fn curve_chart_renders() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args(["curve", "milk", "--initial", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("90.0 |"))
        .stdout(predicate::str::contains("°C +"));
}

#[test]
fn curve_rejects_too_few_samples() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args(["curve", "water", "--samples", "1"])
        .assert()
        .failure();
}

#[test]
fn curve_table_every_nth_sample() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args([
            "curve", "water", "--samples", "11", "--format", "table", "--every", "5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("70.3"))
        .stdout(predicate::str::contains("140.6"))
        .stdout(predicate::str::contains("14.1").not())
        .stdout(predicate::str::contains("Within 1 °C of 100.0 °C after 139 s"));
}

#[test]
fn curve_rejects_too_many_samples() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .args(["curve", "water", "--samples", "18446744073709551615"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--samples must be between 2 and 10000"));
}

#[test]
fn config_rejects_too_many_samples() {
    let dir = TempDir::new().expect("create temp dir");
    fs::write(
        dir.path().join("heatup.toml"),
        "[estimator]\nsample_count = 1000000\n",
    )
    .expect("write config");

    heatup(&dir)
        .args(["curve", "water"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn no_color_env_disables_escapes() {
    let dir = TempDir::new().expect("create temp dir");
    heatup_raw(&dir)
        .env("NO_COLOR", "1")
        .args(["curve", "water", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Time (s)"))
        .stdout(predicate::str::contains("\x1b").not());
}

#[test]
fn redirected_output_is_plain_by_default() {
    let dir = TempDir::new().expect("create temp dir");
    heatup_raw(&dir)
        .args(["calc", "water"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated time: 2 min 21 s"))
        .stdout(predicate::str::contains("\x1b").not());
}

#[test]
fn explicit_theme_keeps_colour_when_piped() {
    let dir = TempDir::new().expect("create temp dir");
    heatup_raw(&dir)
        .args(["--theme", "dark", "calc", "water"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b["));
}

#[test]
fn liquids_lists_catalog() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .arg("liquids")
        .assert()
        .success()
        .stdout(predicate::str::contains("Water"))
        .stdout(predicate::str::contains("Chocolate"))
        .stdout(predicate::str::contains("Leche"));
}

#[test]
fn config_file_adds_liquids() {
    let dir = TempDir::new().expect("create temp dir");
    fs::write(
        dir.path().join("heatup.toml"),
        "[[liquids]]\nname = \"Tea\"\ntarget_temperature_c = 80.0\n",
    )
    .expect("write config");

    // 400 ml * 55 °C / 8000 = 2.75 min
    heatup(&dir)
        .args(["calc", "tea", "-q", "400"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 min 45 s"));
}

#[test]
fn bad_config_is_reported() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[estimator]\nsample_count = \"many\"\n").expect("write config");

    heatup(&dir)
        .arg("--config")
        .arg(&path)
        .arg("liquids")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn dataset_summary_and_empty_state() {
    let dir = TempDir::new().expect("create temp dir");
    fs::write(
        dir.path().join("runs.csv"),
        "tiempo_s,temperatura_c\n0,25\n60,55\n120,85\n",
    )
    .expect("write dataset");

    heatup(&dir)
        .args(["dataset", "runs.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:     3"))
        .stdout(predicate::str::contains("Temperature: 25.0 - 85.0 °C"));

    heatup(&dir)
        .args(["dataset", "missing.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No reference data available"));
}

#[test]
fn session_reads_commands_from_stdin() {
    let dir = TempDir::new().expect("create temp dir");
    heatup(&dir)
        .arg("session")
        .write_stdin(concat!(
            "calc water 250\n",
            "calc water -5\n",
            "mode advanced\n",
            "calc coffee 400 95\n",
            "history\n",
            "export out.csv\n",
            "quit\n",
        ))
        .assert()
        .success()
        .stdout(predicate::str::contains("2 min 21 s"))
        .stdout(predicate::str::contains(
            "error: invalid input: quantity must be greater than zero",
        ))
        .stdout(predicate::str::contains("Estimated cooling time: 1 min 0 s"))
        .stdout(predicate::str::contains("exported 2 entries"));

    let exported = fs::read_to_string(dir.path().join("out.csv")).expect("read export");
    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains(",Coffee,400.0,95.0,,advanced,1.0"));
    assert!(lines[2].contains(",Water,250.0,25.0,medium,basic,2.34375"));
}
