use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = "\
Date,Description,Category,Amount
2025-01-06,Starbucks,Coffee,-5.00
2025-01-07,Blue Bottle,Coffee,-3.00
2025-01-10,Payroll,Income,1000.00
2025-01-12,Netflix,Subscriptions,-15.49
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Run the binary in an isolated home and working directory so neither a
/// real settings file nor a stray `.env` leaks into the test.
fn buddy(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("budget-buddy").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("GROQ_API_KEY")
        .env_remove("BUDGET_BUDDY_MODEL");
    cmd
}

#[test]
fn summary_prints_category_totals_without_credential() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "jan.csv", SAMPLE);

    buddy(dir.path())
        .arg("summary")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Category Totals"))
        .stdout(predicate::str::contains("Coffee"))
        .stdout(predicate::str::contains("$8.00"))
        .stdout(predicate::str::contains("Mon"));
}

#[test]
fn global_flags_before_subcommand() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "jan.csv", SAMPLE);

    buddy(dir.path())
        .args(["-v", "--model", "llama-3.1-8b-instant", "summary"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Category Totals"));
}

#[test]
fn summary_reports_missing_columns() {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        &dir,
        "bad.csv",
        "Date,Description,Category\n2025-01-06,Starbucks,Coffee\n",
    );

    buddy(dir.path())
        .arg("summary")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required column"))
        .stderr(predicate::str::contains("Amount"));
}

#[test]
fn summary_reports_bad_amount_with_line() {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        &dir,
        "bad.csv",
        "Date,Description,Category,Amount\n2025-01-06,Starbucks,Coffee,five\n",
    );

    buddy(dir.path())
        .arg("summary")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Line 2"));
}

#[test]
fn advice_requires_credential() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "jan.csv", SAMPLE);

    buddy(dir.path())
        .arg("advice")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROQ_API_KEY is not set"));
}

#[test]
fn dashboard_requires_credential_before_drawing() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "jan.csv", SAMPLE);

    buddy(dir.path())
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROQ_API_KEY is not set"));
}

#[test]
fn credential_from_dotenv_file_is_accepted() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "jan.csv", SAMPLE);
    write_file(&dir, ".env", "GROQ_API_KEY=gsk_from_dotenv\n");

    // Form validation runs after the credential check, so reaching it proves
    // the key was picked up from .env.
    buddy(dir.path())
        .args(["goal", "--amount", "0", "--by", "2999-01-01"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a goal greater than 0."))
        .stderr(predicate::str::contains("GROQ_API_KEY").not());
}

#[test]
fn deals_rejects_zero_age() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "jan.csv", SAMPLE);

    buddy(dir.path())
        .env("GROQ_API_KEY", "gsk_test")
        .args(["deals", "--occupation", "Nurse", "--age", "0"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter an age greater than 0."));
}

#[test]
fn goal_rejects_past_target_date() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "jan.csv", SAMPLE);

    buddy(dir.path())
        .env("GROQ_API_KEY", "gsk_test")
        .args(["goal", "--amount", "2500", "--by", "2001-01-01"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in the past"));
}

#[test]
fn completions_mention_subcommands() {
    let dir = TempDir::new().unwrap();
    buddy(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("budget-buddy"))
        .stdout(predicate::str::contains("subscriptions"));
}
