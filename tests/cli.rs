use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const BIN_NAME: &str = "tally";

fn tally(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("TALLY_DATA_DIR", dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) {
    tally(dir).args(args).assert().success();
}

/// A data directory with EUR, two categories and a few January/February rows
fn seeded() -> TempDir {
    let dir = TempDir::new().unwrap();
    run(dir.path(), &["init"]);
    run(dir.path(), &["currency", "add", "EUR", "€", "--decimal-separator", ",", "--group-separator", "."]);
    run(dir.path(), &["entity", "add", "account", "Checking", "--currency", "EUR"]);
    run(dir.path(), &["entity", "add", "category", "Food"]);
    run(dir.path(), &["entity", "add", "category", "Groceries", "--parent", "Food"]);
    run(dir.path(), &["entity", "add", "category", "Rent"]);
    run(dir.path(), &["txn", "add", "Checking", "-1234.50", "-c", "Groceries", "-d", "2024-01-10"]);
    run(dir.path(), &["txn", "add", "Checking", "-20", "-c", "Food", "-d", "2024-02-03"]);
    run(dir.path(), &["txn", "add", "Checking", "-900", "-c", "Rent", "-d", "2024-02-01"]);
    dir
}

#[test]
fn init_creates_default_currency() {
    let dir = TempDir::new().unwrap();
    tally(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("USD $ (default)"));
    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("currencies.json").exists());
}

#[test]
fn currency_format_uses_stored_separators() {
    let dir = seeded();
    tally(dir.path())
        .args(["currency", "format", "EUR", "-1234567.5"])
        .assert()
        .success()
        .stdout(contains("-1.234.567,50 €"));
}

#[test]
fn report_by_period_includes_sub_categories() {
    let dir = seeded();
    tally(dir.path())
        .args(["report", "by-period", "category", "-s", "2024-01", "-l", "3", "-c", "EUR", "-f", "Food"])
        .assert()
        .success()
        .stdout(contains("Categories: Food"))
        .stdout(contains("Last quarter (Jan 2024 - Mar 2024), EUR"))
        .stdout(contains("-1.234,50"))
        .stdout(contains("Sum: -1.254,50 €"));
}

#[test]
fn report_next_and_child() {
    let dir = seeded();
    tally(dir.path())
        .args(["report", "by-period", "-s", "2024-01", "-l", "3", "-c", "EUR", "--next", "1"])
        .assert()
        .success()
        .stdout(contains("Categories: Rent"));

    tally(dir.path())
        .args(["report", "by-period", "-s", "2024-01", "-l", "3", "-c", "EUR", "--child"])
        .assert()
        .success()
        .stdout(contains("Sub-categories: Groceries"));
}

#[test]
fn report_without_entries_shows_message() {
    let dir = seeded();
    tally(dir.path())
        .args(["report", "by-period", "project", "-c", "EUR"])
        .assert()
        .success()
        .stdout(contains("No projects to report on"));
}

#[test]
fn report_to_yaml_file() {
    let dir = seeded();
    let output = dir.path().join("food.yaml");
    tally(dir.path())
        .args(["report", "by-period", "-s", "2024-01", "-l", "2", "-c", "EUR", "--format", "yaml", "-o"])
        .arg(&output)
        .assert()
        .success();

    let text = fs::read_to_string(output).unwrap();
    assert!(text.contains("filter: Food"));
    assert!(text.contains("sum: '-1254.50'") || text.contains("sum: \"-1254.50\""));
}

#[test]
fn report_rejects_length_above_cap() {
    let dir = seeded();
    tally(dir.path())
        .args(["report", "by-period", "-c", "EUR", "-l", "3000000000"])
        .assert()
        .failure()
        .stderr(contains("3000000000"));

    tally(dir.path())
        .args(["report", "by-period", "-c", "EUR", "-s", "2024-01", "-l", "1200"])
        .assert()
        .success()
        .stdout(contains("Last 100 years (Jan 2024 - Dec 2123), EUR"));
}

#[test]
fn report_rejects_out_of_range_year() {
    let dir = seeded();
    tally(dir.path())
        .args(["report", "by-period", "-c", "EUR", "-s", "300000-01"])
        .assert()
        .failure()
        .stderr(contains("Year 300000 is outside"));
}

#[test]
fn report_lengths() {
    let dir = TempDir::new().unwrap();
    tally(dir.path())
        .args(["report", "lengths"])
        .assert()
        .success()
        .stdout(contains("Last quarter").and(contains("Last 5 years")));
}

#[test]
fn csv_round_trip_between_directories() {
    let dir = seeded();
    let csv = dir.path().join("all.csv");
    tally(dir.path())
        .args(["data", "export-csv", "-o"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("Done: all.csv"));

    let other = TempDir::new().unwrap();
    run(other.path(), &["init"]);
    run(other.path(), &["currency", "add", "EUR", "€"]);
    tally(other.path())
        .args(["data", "import-csv"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("Imported 3 transactions"));

    tally(other.path())
        .args(["data", "totals", "--kind", "category", "--entity", "Rent"])
        .assert()
        .success()
        .stdout(contains("-900.00 €"));
}

#[test]
fn backup_and_restore() {
    let dir = seeded();
    tally(dir.path())
        .args(["data", "backup"])
        .assert()
        .success()
        .stdout(contains("Creating backup"));

    let backup = fs::read_dir(dir.path().join("backups"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();

    let other = TempDir::new().unwrap();
    tally(other.path())
        .args(["data", "restore", "--force"])
        .arg(&backup)
        .assert()
        .success()
        .stdout(contains("Restored 3 transactions"));

    tally(other.path())
        .args(["txn", "list"])
        .assert()
        .success()
        .stdout(contains("Groceries"));
}

#[test]
fn failed_import_exits_with_error() {
    let dir = seeded();
    let bad = dir.path().join("bad.csv");
    fs::write(&bad, "Date,Account,Currency,Amount\n2024-01-01,Checking,XYZ,1\n").unwrap();

    tally(dir.path())
        .args(["data", "import-csv"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(contains("Unable to import transactions from bad.csv : "));
}

#[test]
fn upload_without_authorization_asks_for_it() {
    let dir = seeded();
    let config = dir.path().join("config.json");
    let mut settings: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    settings["upload"]["dropbox"]["enabled"] = serde_json::Value::Bool(true);
    fs::write(&config, settings.to_string()).unwrap();

    tally(dir.path())
        .args(["data", "backup"])
        .assert()
        .failure()
        .stderr(contains("Dropbox needs to be authorized again"));
}
