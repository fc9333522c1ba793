//! Smoke tests -- verify the binary runs and each subcommand behaves.

use assert_cmd::Command;

const PASSING_KPIS: &str = r#"
[[kpi]]
name = "null ratio"
value = 0.06
comparator = "less-than"
threshold = 0.1
unit = "percentage"

[[kpi]]
name = "row count"
value = 1235
comparator = "equal-to"
threshold = 1235
"#;

const FAILING_KPIS: &str = r#"
[[kpi]]
name = "row count"
value = 12
comparator = "greater-than"
threshold = 1000
"#;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("job-monitor").unwrap();
    cmd.env_remove("JOB_MONITOR_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("KPI gates"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("job-monitor"));
}

#[test]
fn test_subcommands_exist() {
    for sub in ["check", "purge", "current"] {
        cmd().args([sub, "--help"]).assert().success();
    }
}

#[test]
fn test_check_passing_kpis() {
    let dir = tempfile::TempDir::new().unwrap();
    let kpis = dir.path().join("kpis.toml");
    std::fs::write(&kpis, PASSING_KPIS).unwrap();
    let logs = dir.path().join("logs");

    cmd()
        .current_dir(dir.path())
        .arg("check")
        .arg("--kpis")
        .arg(&kpis)
        .args(["--suite", "Nightly checks", "--title", "Nightly load"])
        .arg("--folder")
        .arg(&logs)
        .assert()
        .success()
        .stdout(predicates::str::contains("Nightly checks: success"))
        .stdout(predicates::str::contains("Value: 0.06%"))
        .stdout(predicates::str::contains("Duration: "));

    assert!(logs.join("current.success").exists());
    assert!(!logs.join("current.failed").exists());
}

#[test]
fn test_check_failing_kpis_exits_nonzero() {
    let dir = tempfile::TempDir::new().unwrap();
    let kpis = dir.path().join("kpis.toml");
    std::fs::write(&kpis, FAILING_KPIS).unwrap();
    let logs = dir.path().join("logs");

    cmd()
        .current_dir(dir.path())
        .arg("check")
        .arg("--kpis")
        .arg(&kpis)
        .args(["--suite", "Volume"])
        .arg("--folder")
        .arg(&logs)
        .assert()
        .failure()
        .stdout(predicates::str::contains("Volume: failed"))
        .stderr(predicates::str::contains("run failed"));

    assert!(logs.join("current.failed").exists());
}

#[test]
fn test_current_reads_alias() {
    let dir = tempfile::TempDir::new().unwrap();
    let logs = dir.path().join("logs");
    std::fs::create_dir_all(&logs).unwrap();
    std::fs::write(logs.join("current.failed"), "[10:02] Beginning\n").unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("current")
        .arg("--folder")
        .arg(&logs)
        .assert()
        .success()
        .stdout(predicates::str::contains("Status: failed"))
        .stdout(predicates::str::contains("[10:02] Beginning"));

    cmd()
        .current_dir(dir.path())
        .args(["current", "--json"])
        .arg("--folder")
        .arg(&logs)
        .assert()
        .success()
        .stdout(predicates::str::contains("\"status\": \"failed\""));
}

#[test]
fn test_current_without_alias_fails() {
    let dir = tempfile::TempDir::new().unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("current")
        .arg("--folder")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("no current report"));
}

#[test]
fn test_purge_deletes_old_reports() {
    let dir = tempfile::TempDir::new().unwrap();
    let logs = dir.path().join("logs");
    std::fs::create_dir_all(&logs).unwrap();
    let old = logs.join("20000101_000000.log.success");
    std::fs::write(&old, "old").unwrap();
    std::fs::write(logs.join("current.success"), "current").unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("purge")
        .arg("--folder")
        .arg(&logs)
        .args(["--window-days", "7"])
        .assert()
        .success()
        .stdout(predicates::str::contains("deleted"));

    assert!(!old.exists());
    assert!(logs.join("current.success").exists());
}

#[test]
fn test_purge_missing_folder_is_not_an_error() {
    let dir = tempfile::TempDir::new().unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("purge")
        .arg("--folder")
        .arg(dir.path().join("never-created"))
        .assert()
        .success()
        .stdout(predicates::str::contains("Nothing older than 7 days"));
}

#[test]
fn test_check_json_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let kpis = dir.path().join("kpis.toml");
    std::fs::write(&kpis, PASSING_KPIS).unwrap();
    let logs = dir.path().join("logs");

    cmd()
        .current_dir(dir.path())
        .args(["check", "--json", "--suite", "Nightly checks"])
        .arg("--kpis")
        .arg(&kpis)
        .arg("--folder")
        .arg(&logs)
        .assert()
        .success()
        .stdout(predicates::str::contains("\"run_id\""))
        .stdout(predicates::str::contains("\"success\": true"))
        .stdout(predicates::str::contains("\"current_path\""))
        .stdout(predicates::str::contains("\"lines\""))
        .stdout(predicates::str::contains("\"kind\": \"span\""))
        .stdout(predicates::str::contains("Nightly checks: success"));

    assert!(logs.join("current.success").exists());
}

#[test]
fn test_check_prints_report_when_save_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let kpis = dir.path().join("kpis.toml");
    std::fs::write(&kpis, PASSING_KPIS).unwrap();
    // A plain file where the log folder's parent should be.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["check", "--suite", "Nightly checks"])
        .arg("--kpis")
        .arg(&kpis)
        .arg("--folder")
        .arg(blocker.join("logs"))
        .assert()
        .failure()
        .stdout(predicates::str::contains("Nightly checks: success"))
        .stdout(predicates::str::contains("\tKPI: row count"))
        .stderr(predicates::str::contains("blocker"));
}

#[test]
fn test_broken_config_file_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let bad = dir.path().join("broken.toml");
    std::fs::write(&bad, "[storage\nlog_folder = ").unwrap();
    let logs = dir.path().join("logs");

    cmd()
        .current_dir(dir.path())
        .env("JOB_MONITOR_CONFIG", &bad)
        .arg("purge")
        .arg("--folder")
        .arg(&logs)
        .assert()
        .success()
        .stderr(predicates::str::contains(bad.to_str().unwrap()))
        .stderr(predicates::str::contains("falling back"));
}
