//! Black-box tests of the `deeptrace` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn deeptrace(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("deeptrace").unwrap_or_else(|_| unreachable!());
    cmd.current_dir(dir.path())
        .env_remove("DEEPTRACE_DB_PATH")
        .env_remove("DEEPTRACE_PROMPT_DIR")
        .env_remove("OPENAI_API_KEY")
        .env_remove("DEEPTRACE_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn temp() -> TempDir {
    TempDir::new().unwrap_or_else(|_| unreachable!())
}

#[test]
fn test_help_lists_commands() {
    let dir = temp();
    deeptrace(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("research"))
        .stdout(predicate::str::contains("reports"))
        .stdout(predicate::str::contains("init-prompts"));
}

#[test]
fn test_init_then_list_empty() {
    let dir = temp();
    let db = dir.path().join("data").join("reports.db");

    deeptrace(&dir)
        .arg("--db-path")
        .arg(&db)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized report database"));
    assert!(db.exists());

    deeptrace(&dir)
        .arg("--db-path")
        .arg(&db)
        .args(["reports", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved reports."));

    deeptrace(&dir)
        .arg("--db-path")
        .arg(&db)
        .args(["reports", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_second_init_needs_force() {
    let dir = temp();
    deeptrace(&dir).arg("init").assert().success();
    assert!(dir.path().join(".deeptrace/reports.db").exists());

    deeptrace(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    deeptrace(&dir).args(["init", "--force"]).assert().success();
}

#[test]
fn test_db_path_from_env() {
    let dir = temp();
    let db = dir.path().join("env.db");
    deeptrace(&dir)
        .env("DEEPTRACE_DB_PATH", &db)
        .arg("init")
        .assert()
        .success();
    assert!(db.exists());
}

#[test]
fn test_list_without_init_fails() {
    let dir = temp();
    deeptrace(&dir)
        .args(["reports", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_show_unknown_report() {
    let dir = temp();
    deeptrace(&dir).arg("init").assert().success();
    deeptrace(&dir)
        .args(["reports", "show", "deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("report not found: deadbeef"));
}

#[test]
fn test_init_prompts_into_directory() {
    let dir = temp();
    let prompts = dir.path().join("prompts");

    deeptrace(&dir)
        .arg("init-prompts")
        .arg(&prompts)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 5 prompt template(s)"));

    for name in ["planner.md", "search.md", "writer.md", "email.md", "clarifier.md"] {
        assert!(prompts.join(name).exists(), "missing {name}");
    }

    deeptrace(&dir)
        .arg("init-prompts")
        .arg(&prompts)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn test_research_rejects_unknown_mode() {
    let dir = temp();
    deeptrace(&dir)
        .args(["research", "anything", "--mode", "exhaustive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown research mode"));
}

#[test]
fn test_research_requires_api_key() {
    let dir = temp();
    deeptrace(&dir)
        .args(["research", "rust web frameworks", "--no-save"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not configured"));
}
