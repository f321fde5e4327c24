use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cmd() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("llmcount").unwrap();
    cmd.arg("--color").arg("never");
    cmd
}

/// Helper: write a config whose usage file lives in `dir`, returning the
/// config path.
fn isolated_config(dir: &std::path::Path) -> std::path::PathBuf {
    let usage = dir.join("usage.json");
    let config = dir.join("llmcount.toml");
    std::fs::write(
        &config,
        format!("[usage]\nstate_file = {:?}\n", usage.display().to_string()),
    )
    .unwrap();
    config
}

// -----------------------------------------------------------------------
// General CLI tests
// -----------------------------------------------------------------------

#[test]
fn help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("count"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("sample"))
        .stdout(predicate::str::contains("usage"));
}

#[test]
fn missing_explicit_config_is_an_error() {
    cmd()
        .args(["--config", "/nonexistent/llmcount.toml", "count", "--text", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

// -----------------------------------------------------------------------
// Init command tests
// -----------------------------------------------------------------------

#[test]
fn init_creates_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("llmcount.toml");
    cmd()
        .args(["init", "--path", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(path.exists());
}

#[test]
fn init_errors_on_existing_without_force() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("llmcount.toml");
    cmd()
        .args(["init", "--path", path.to_str().unwrap()])
        .assert()
        .success();

    cmd()
        .args(["init", "--path", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cmd()
        .args(["init", "--path", path.to_str().unwrap(), "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overwrote config"));
}

// -----------------------------------------------------------------------
// Count command tests
// -----------------------------------------------------------------------

#[test]
fn count_ranks_inline_text() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["count", "--text", "the cat sat on the mat the cat ran"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"1\s+the\s+3").unwrap())
        .stdout(predicate::str::is_match(r"2\s+cat\s+2").unwrap())
        .stdout(predicate::str::is_match(r"3\s+sat\s+1").unwrap());
}

#[test]
fn count_reads_file_as_json() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    let input = dir.path().join("input.txt");
    std::fs::write(&input, "Rust rust RUST go Go").unwrap();

    let output = cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["count", input.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["topWords"][0]["word"], "rust");
    assert_eq!(value["topWords"][0]["count"], 3);
    assert_eq!(value["topWords"][1]["word"], "go");
}

#[test]
fn count_reads_stdin_and_honours_flags() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["count", "--top", "1", "--min-len", "3"])
        .write_stdin("a a a a the the cat")
        .assert()
        .success()
        .stdout(predicate::str::contains("the"))
        .stdout(predicate::str::contains("cat").not());
}

#[test]
fn count_rejects_ranking_longer_than_ten() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["count", "--text", "a b c", "--top", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 10"));
}

#[test]
fn count_empty_text() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["count", "--text", "   "])
        .assert()
        .success()
        .stdout(predicate::str::contains("No words found."));
}

// -----------------------------------------------------------------------
// Models / sample tests
// -----------------------------------------------------------------------

#[test]
fn models_lists_registry() {
    cmd()
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-4o"))
        .stdout(predicate::str::contains("claude-3-haiku-20240307"))
        .stdout(predicate::str::contains("gemini-1.5-flash"));
}

#[test]
fn models_filters_by_provider() {
    cmd()
        .args(["models", "--provider", "anthropic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("claude"))
        .stdout(predicate::str::contains("gpt").not());
}

#[test]
fn models_rejects_unknown_provider() {
    cmd()
        .args(["models", "--provider", "acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown provider"));
}

#[test]
fn sample_titles() {
    cmd()
        .args(["sample", "--titles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Art of Machine Learning"))
        .stdout(predicate::str::contains("The Future of Space Exploration"));
}

// -----------------------------------------------------------------------
// Usage and analyze tests
// -----------------------------------------------------------------------

#[test]
fn usage_reports_and_resets() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    std::fs::write(
        dir.path().join("usage.json"),
        r#"{"date":"2000-01-01","count":100}"#,
    )
    .unwrap();

    // A record from another day reads as zero.
    cmd()
        .args(["--config", config.to_str().unwrap(), "usage"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"used:\s+0").unwrap())
        .stdout(predicate::str::is_match(r"limit:\s+100").unwrap());

    cmd()
        .args(["--config", config.to_str().unwrap(), "usage", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("usage reset"));
    let raw = std::fs::read_to_string(dir.path().join("usage.json")).unwrap();
    assert!(raw.contains("\"count\":0"));
}

#[test]
fn analyze_rejects_unknown_model() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["analyze", "--text", "hello hello", "--model", "gpt-99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported model 'gpt-99'"));
}

#[test]
fn analyze_without_key_reports_auth_error() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    cmd()
        .env_remove("OPENAI_API_KEY")
        .args(["--config", config.to_str().unwrap()])
        .args(["analyze", "--text", "hello hello", "--model", "gpt-4o"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
    // A failed call does not consume quota.
    assert!(!dir.path().join("usage.json").exists());
}

#[test]
fn analyze_refuses_when_quota_is_spent() {
    let dir = tempdir().unwrap();
    let config = isolated_config(dir.path());
    let today = chrono::Local::now().date_naive();
    std::fs::write(
        dir.path().join("usage.json"),
        format!(r#"{{"date":"{today}","count":100}}"#),
    )
    .unwrap();

    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["analyze", "--sample"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("daily usage quota"));
}
