//! CLI-level tests run against the built binary.
//!
//! These never reach an external service: they cover startup failures
//! (missing credential, missing index, invalid config) that are reported
//! before any network call would happen.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn docchat_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docchat");
    path
}

fn run_docchat(
    config_path: &Path,
    api_key: Option<&str>,
    args: &[&str],
) -> (String, String, bool) {
    let binary = docchat_binary();
    let mut cmd = Command::new(&binary);
    cmd.arg("--config").arg(config_path).args(args);

    match api_key {
        Some(key) => {
            cmd.env("GOOGLE_API_KEY", key);
        }
        None => {
            cmd.env_remove("GOOGLE_API_KEY");
        }
    }

    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docchat binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_content = format!(
        r#"[index]
path = "{}/docchat.index.json"
"#,
        root.display()
    );
    let config_path = root.join("docchat.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

#[test]
fn missing_api_key_fails_fast() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_docchat(&config_path, None, &["ask", "anything"]);
    assert!(!success, "expected failure: stdout={}", stdout);
    assert!(
        stderr.contains("GOOGLE_API_KEY"),
        "stderr should name the missing variable: {}",
        stderr
    );
}

#[test]
fn ask_without_index_reports_index_not_found() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_docchat(&config_path, Some("test-key"), &["ask", "anything"]);
    assert!(!success, "expected failure: stdout={}", stdout);
    assert!(
        stderr.contains("no index found"),
        "stderr should mention the missing index: {}",
        stderr
    );
    assert!(stderr.contains("docchat build"));
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("docchat.toml");
    fs::write(
        &config_path,
        "[chunking]\nchunk_size = 100\nchunk_overlap = 500\n",
    )
    .unwrap();

    let (_, stderr, success) = run_docchat(&config_path, Some("test-key"), &["ask", "anything"]);
    assert!(!success);
    assert!(stderr.contains("chunk_overlap"), "stderr: {}", stderr);
}

#[test]
fn missing_config_file_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("absent.toml");

    // With defaults the index path is ./docchat.index.json, which does not
    // exist, so the failure is the missing index, not the missing config.
    let (_, stderr, success) = run_docchat(&config_path, Some("test-key"), &["ask", "anything"]);
    assert!(!success);
    assert!(stderr.contains("no index found"), "stderr: {}", stderr);
}

#[test]
fn build_rejects_unsupported_file() {
    let (tmp, config_path) = setup_test_env();
    let bad = tmp.path().join("notes.docx");
    fs::write(&bad, "not supported").unwrap();

    let (_, stderr, success) = run_docchat(
        &config_path,
        Some("test-key"),
        &["build", bad.to_str().unwrap()],
    );
    assert!(!success);
    assert!(stderr.contains("unsupported file type"), "stderr: {}", stderr);
}
