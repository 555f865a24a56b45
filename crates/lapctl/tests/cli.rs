//! End-to-end tests for lapctl against a temporary image
//!
//! Each test gets its own image file and passes it with `--image`, so the
//! tests never touch `~/.laptimer`.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn image(dir: &TempDir) -> PathBuf {
    dir.path().join("laps.img")
}

fn lapctl(image: &Path, capacity: usize) -> Command {
    let mut cmd = Command::cargo_bin("lapctl").unwrap();
    cmd.env_remove("LAPTIMER_IMAGE_PATH")
        .env_remove("LAPTIMER_CAPACITY")
        .arg("--image")
        .arg(image)
        .arg("--capacity")
        .arg(capacity.to_string());
    cmd
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn init_creates_empty_image() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);

    lapctl(&path, 10)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 10 slots"));

    assert_eq!(std::fs::read(&path).unwrap(), vec![0u8; 20]);

    lapctl(&path, 10)
        .arg("totals")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sessions: 0"))
        .stdout(predicate::str::contains("Laps remaining: 10"));
}

#[test]
fn step_by_step_recording_matches_summary() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);
    lapctl(&path, 10).arg("init").assert().success();

    lapctl(&path, 10)
        .arg("new-session")
        .assert()
        .success()
        .stdout("0\n");

    lapctl(&path, 10)
        .args(["add", "0", "150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("next 1"));
    lapctl(&path, 10).args(["add", "1", "200"]).assert().success();
    lapctl(&path, 10).args(["end", "2"]).assert().success();

    let summary = json_output(lapctl(&path, 10).args(["summary", "0"]));
    assert_eq!(summary["start"], 0);
    assert_eq!(summary["summary"]["lap_count"], 2);
    assert_eq!(summary["summary"]["best"], 150);
    assert_eq!(summary["summary"]["average"], 175);
    assert_eq!(summary["summary"]["terminal"], 0);

    let totals = json_output(lapctl(&path, 10).arg("totals"));
    assert_eq!(totals["sessions"], 1);
    assert_eq!(totals["laps_recorded"], 2);
    assert_eq!(totals["laps_remaining"], 8);

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(&raw[..6], &[150, 0, 200, 0, 0, 0]);
}

#[test]
fn record_and_list_sessions() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);
    lapctl(&path, 20).arg("init").assert().success();

    lapctl(&path, 20)
        .args(["record", "1:23.45", "1:21.20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded at 0"));
    lapctl(&path, 20)
        .args(["record", "59.10", "58.75", "60.00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded at 3"));

    lapctl(&path, 20)
        .arg("sessions")
        .assert()
        .success()
        .stdout(predicate::str::contains("#0 @0: 2 laps, best 1:21.20"))
        .stdout(predicate::str::contains("#1 @3: 3 laps, best 0:58.75"));

    lapctl(&path, 20)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1  0:59.10"))
        .stdout(predicate::str::contains("3  1:00.00"));
}

#[test]
fn full_store_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);
    lapctl(&path, 4).arg("init").assert().success();
    lapctl(&path, 4).args(["record", "10", "20", "30", "40"]).assert().success();

    lapctl(&path, 4)
        .arg("new-session")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no free space"));
}

#[test]
fn out_of_range_handle_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);
    lapctl(&path, 4).arg("init").assert().success();

    lapctl(&path, 4)
        .args(["add", "4", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the store"));
}

#[test]
fn missing_session_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);
    lapctl(&path, 10).arg("init").assert().success();

    lapctl(&path, 10)
        .args(["summary", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session 0 does not exist"));
}

#[test]
fn sentinel_lap_time_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);

    lapctl(&path, 10)
        .args(["record", "1:00.00", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("end-of-session marker"));
}

#[test]
fn capacity_mismatch_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);
    lapctl(&path, 10).arg("init").assert().success();

    lapctl(&path, 12)
        .arg("totals")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 24"));
}

#[test]
fn config_file_supplies_image() {
    let dir = TempDir::new().unwrap();
    let path = image(&dir);
    let config = dir.path().join("laptimer.toml");
    std::fs::write(
        &config,
        format!(
            "[lapstore]\nimage_path = {:?}\ncapacity = 6\n",
            path.display().to_string()
        ),
    )
    .unwrap();

    Command::cargo_bin("lapctl")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 6 slots"));

    assert_eq!(std::fs::metadata(&path).unwrap().len(), 12);
}
