use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with an isolated data directory and no config file
fn cmdforge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cmdforge").unwrap();
    cmd.env_remove("CMDFORGE_DATA_DIR")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

fn seed_history(dir: &TempDir, entries: &[&str]) {
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("history.json"), json_array(entries)).unwrap();
}

fn json_array(entries: &[&str]) -> String {
    let quoted: Vec<String> = entries.iter().map(|e| format!("{:?}", e)).collect();
    format!("[{}]", quoted.join(","))
}

fn history_file(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("data").join("history.json")).unwrap_or_default()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    cmdforge(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_empty_history() {
    let dir = TempDir::new().unwrap();
    cmdforge(&dir)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No history yet"));
}

#[test]
fn test_history_list_filters_case_insensitively() {
    let dir = TempDir::new().unwrap();
    seed_history(&dir, &["Show disk usage", "list files", "find large FILES"]);

    cmdforge(&dir)
        .args(["history", "list", "files"])
        .assert()
        .success()
        .stdout("list files\nfind large FILES\n");
}

#[test]
fn test_history_remove_entry() {
    let dir = TempDir::new().unwrap();
    seed_history(&dir, &["list files", "show disk usage"]);

    cmdforge(&dir)
        .args(["history", "remove", "list files"])
        .assert()
        .success();

    cmdforge(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout("show disk usage\n");
}

#[test]
fn test_history_clear_twice() {
    let dir = TempDir::new().unwrap();
    seed_history(&dir, &["list files"]);

    for _ in 0..2 {
        cmdforge(&dir)
            .args(["history", "clear"])
            .assert()
            .success()
            .stderr(predicate::str::contains("History cleared"));
    }
    assert_eq!(history_file(&dir), "[]");
}

#[test]
fn test_data_dir_from_environment() {
    let dir = TempDir::new().unwrap();
    seed_history(&dir, &["tail the app log"]);

    let mut cmd = Command::cargo_bin("cmdforge").unwrap();
    cmd.env("CMDFORGE_DATA_DIR", dir.path().join("data"))
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .args(["history", "list"])
        .assert()
        .success()
        .stdout("tail the app log\n");
}

#[test]
fn test_blank_request_is_rejected() {
    let dir = TempDir::new().unwrap();
    seed_history(&dir, &["older request"]);

    cmdforge(&dir)
        .args(["generate", "--no-context", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Type a request first"));

    assert_eq!(history_file(&dir), r#"["older request"]"#);
}

#[test]
fn test_missing_credential_names_the_variable() {
    let dir = TempDir::new().unwrap();

    cmdforge(&dir)
        .env_remove("ANTHROPIC_API_KEY")
        .args(["--provider", "claude", "generate", "--no-context", "list", "files"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));

    assert_eq!(history_file(&dir), "");
}

#[test]
fn test_unknown_provider() {
    let dir = TempDir::new().unwrap();

    cmdforge(&dir)
        .args(["--provider", "gemini", "generate", "list files"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown provider 'gemini'"));
}

#[test]
fn test_info_shows_providers() {
    let dir = TempDir::new().unwrap();

    cmdforge(&dir)
        .env_remove("OPENAI_API_KEY")
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("claude"))
        .stdout(predicate::str::contains("openai: not configured"))
        .stdout(predicate::str::contains("ollama: configured"));
}
