//! End-to-end tests for the snapsweep binary

mod common;

use common::{CommandResult, FakeLonghorn, SweepCommand};
use serde_json::Value;

/// Run the binary off the async runtime so the fake manager keeps serving
async fn run_blocking(command: SweepCommand) -> CommandResult {
    tokio::task::spawn_blocking(move || command.execute().unwrap())
        .await
        .unwrap()
}

#[test]
fn test_config_shows_effective_values() {
    let result = SweepCommand::new()
        .env("LONGHORN_URL", "longhorn.storage.svc")
        .env("DELETE_STRINGS", "c-6fffho,kubestr")
        .args(&["config", "--stale-age-days", "21"])
        .assert_success()
        .unwrap();

    assert!(result.contains_stdout("longhorn.storage.svc"));
    assert!(result.contains_stdout("older than 21 days"));
    assert!(result.contains_stdout("kubestr"));
    assert!(result.contains_stdout("= delete"));
}

#[test]
fn test_config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapsweep.toml");
    std::fs::write(&path, "endpoint = \"from-file:9500\"\nmissing_timestamp = \"keep\"\n").unwrap();

    let result = SweepCommand::new()
        .args(&["config", "--config", path.to_str().unwrap()])
        .assert_success()
        .unwrap();

    assert!(result.contains_stdout("from-file:9500"));
    assert!(result.contains_stdout("= keep"));
}

#[test]
fn test_config_without_endpoint_shows_gap() {
    let result = SweepCommand::new().args(&["config"]).assert_success().unwrap();

    assert!(result.contains_stdout("(none)"));
    assert!(result.contains_stdout("no cluster endpoint"));
}

#[test]
fn test_legacy_age_variable_is_read() {
    let result = SweepCommand::new()
        .env("LONGHORN_URL", "longhorn.storage.svc")
        .env("DELETE_AGE_DAY", "30")
        .args(&["config"])
        .assert_success()
        .unwrap();

    assert!(result.contains_stdout("older than 30 days"));
}

#[test]
fn test_spaced_marker_list_is_trimmed() {
    let result = SweepCommand::new()
        .env("LONGHORN_URL", "longhorn.storage.svc")
        .env("DELETE_STRINGS", "c-6fffho, kubestr")
        .args(&["config"])
        .assert_success()
        .unwrap();

    assert!(result.contains_stdout(r#"["c-6fffho", "kubestr"]"#));
}

#[test]
fn test_missing_endpoint_fails() {
    let result = SweepCommand::new().args(&["run"]).assert_failure().unwrap();

    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("no cluster endpoint"));
}

#[test]
fn test_unreachable_cluster_fails() {
    let result = SweepCommand::new()
        .args(&["--endpoint", "127.0.0.1:1", "--request-timeout-secs", "2"])
        .assert_failure()
        .unwrap();

    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("Snapshot cleanup aborted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_deletes_and_purges() {
    let cluster = FakeLonghorn::start().await;
    let mut command = SweepCommand::new();
    command
        .env("LONGHORN_URL", &cluster.endpoint)
        .env("DELETE_STRINGS", "c-6fffho")
        .args(&["run", "--output", "json"]);

    let result = run_blocking(command).await;
    assert!(result.success(), "stderr: {}", result.stderr);

    let summary: Value = serde_json::from_str(&result.stdout).unwrap();
    assert_eq!(summary["deleted_orphaned"], 1);
    assert_eq!(summary["deleted_stale"], 1);
    assert_eq!(summary["snapshots_kept"], 1);
    assert_eq!(summary["purges"], 1);
    assert_eq!(summary["bytes_deleted"], 3 * 1024 * 1024);

    assert_eq!(cluster.deletes(), vec!["c-6fffho-orphan", "weekly-2020"]);
    assert_eq!(cluster.purges(), vec!["pvc-media"]);
    assert!(result.contains_stderr(
        "Deleting orphaned snapshot c-6fffho-orphan created on 2024-05-30 with size 1.0 MiB"
    ));
    assert!(result.contains_stderr(
        "Deleting stale snapshot weekly-2020 created on 2020-01-01 with size 2.0 MiB"
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_touches_nothing() {
    let cluster = FakeLonghorn::start().await;
    let mut command = SweepCommand::new();
    command
        .env("DELETE_STRINGS", "c-6fffho")
        .args(&["--endpoint", &cluster.endpoint, "run", "--dry-run"]);

    let result = run_blocking(command).await;
    assert!(result.success(), "stderr: {}", result.stderr);

    assert!(result.contains_stdout("Dry Run"));
    assert!(result.contains_stdout("Would delete:"));
    assert!(cluster.deletes().is_empty());
    assert!(cluster.purges().is_empty());
}
