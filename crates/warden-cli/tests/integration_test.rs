//! Integration tests for warden.
//!
//! These wire configuration layering, the tool registry, a scripted approver
//! and session recording together, and drive the binary for exit codes.

use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use warden_core::{
    build_effective_config_with_env, ApprovalRequest, ApprovalResponse, Approver, CliOverrides,
    ConfigStore, SettingsHandle,
};
use warden_tools::{ToolContext, ToolRegistry};

/// Answers every prompt the same way and remembers what it was asked.
struct ScriptedApprover {
    answer: ApprovalResponse,
    asked: Mutex<Vec<ApprovalRequest>>,
}

impl ScriptedApprover {
    fn new(answer: ApprovalResponse) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::new(Vec::new()),
        })
    }

    fn asked(&self) -> Vec<ApprovalRequest> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Approver for ScriptedApprover {
    async fn confirm(&self, request: &ApprovalRequest) -> ApprovalResponse {
        self.asked.lock().unwrap().push(request.clone());
        self.answer
    }
}

fn registry() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    warden_tools::register_all(&mut tools);
    tools
}

fn write_config(dir: &Path, yaml: &str) -> ConfigStore {
    let path = dir.join("config.yaml");
    std::fs::write(&path, yaml).unwrap();
    ConfigStore::with_path(path)
}

fn context(
    workspace: &Path,
    store: &ConfigStore,
    env: Vec<(&str, &str)>,
    approver: Arc<ScriptedApprover>,
) -> ToolContext {
    let env = env
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()));
    let settings = build_effective_config_with_env(store, &CliOverrides::default(), env).unwrap();
    ToolContext {
        working_dir: workspace.to_path_buf(),
        settings: Arc::new(SettingsHandle::new(settings)),
        approver,
        ..Default::default()
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_allowlisted_command_runs_without_prompt() {
    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();
    let store = write_config(
        dir.path(),
        "native_command_allowlist:\n  - echo\n",
    );
    let approver = ScriptedApprover::new(ApprovalResponse::Deny);
    let ctx = context(&workspace, &store, vec![], approver.clone());

    let result = registry()
        .invoke("bash", serde_json::json!({"command": "echo hello"}), &ctx)
        .await;

    assert!(!result.is_error, "{}", result.output);
    assert!(result.output.contains("hello"));
    assert!(approver.asked().is_empty());
}

#[tokio::test]
async fn test_unlisted_command_declined_by_user() {
    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();
    let store = write_config(dir.path(), "default_provider: openai\n");
    let approver = ScriptedApprover::new(ApprovalResponse::Deny);
    let ctx = context(&workspace, &store, vec![], approver.clone());

    let result = registry()
        .invoke(
            "bash",
            serde_json::json!({"command": "touch marker"}),
            &ctx,
        )
        .await;

    assert!(result.cancelled);
    assert!(!result.is_error);
    assert_eq!(approver.asked().len(), 1);
    assert!(!workspace.join("marker").exists());
}

#[tokio::test]
async fn test_dangerous_command_blocked_even_when_auto_approved() {
    let dir = TempDir::new().unwrap();
    let store = write_config(dir.path(), "default_provider: openai\n");
    let approver = ScriptedApprover::new(ApprovalResponse::Approve);
    let ctx = context(
        dir.path(),
        &store,
        vec![("WARDEN_AUTO_APPROVE_NATIVE_COMMANDS", "true")],
        approver.clone(),
    );
    assert!(ctx.settings().auto_approve_native_commands);

    let result = registry()
        .invoke("bash", serde_json::json!({"command": "rm -rf /"}), &ctx)
        .await;

    assert!(result.is_error);
    assert!(result.output.contains("dangerous pattern"), "{}", result.output);
    assert!(approver.asked().is_empty());
}

#[tokio::test]
async fn test_edit_flow_respects_auto_approve_from_env() {
    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();
    let store = write_config(dir.path(), "auto_approve_edits: false\n");
    let approver = ScriptedApprover::new(ApprovalResponse::Deny);
    let tools = registry();

    // File says prompt; the user declines.
    let ctx = context(&workspace, &store, vec![], approver.clone());
    let result = tools
        .invoke(
            "write",
            serde_json::json!({"path": "notes.txt", "content": "draft"}),
            &ctx,
        )
        .await;
    assert!(result.cancelled);
    assert!(!workspace.join("notes.txt").exists());

    // Environment overrides the file; no prompt.
    let ctx = context(
        &workspace,
        &store,
        vec![("WARDEN_AUTO_APPROVE_EDITS", "yes")],
        approver.clone(),
    );
    let result = tools
        .invoke(
            "write",
            serde_json::json!({"path": "notes.txt", "content": "draft"}),
            &ctx,
        )
        .await;
    assert!(!result.is_error, "{}", result.output);
    assert_eq!(
        std::fs::read_to_string(workspace.join("notes.txt")).unwrap(),
        "draft"
    );
    assert_eq!(approver.asked().len(), 1);
}

#[tokio::test]
async fn test_escape_attempt_is_blocked_before_prompt() {
    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();
    let store = write_config(dir.path(), "auto_approve_edits: true\n");
    let approver = ScriptedApprover::new(ApprovalResponse::Approve);
    let ctx = context(&workspace, &store, vec![], approver.clone());

    let result = registry()
        .invoke(
            "write",
            serde_json::json!({"path": "../outside.txt", "content": "x"}),
            &ctx,
        )
        .await;

    assert!(result.is_error);
    assert!(result.output.starts_with("Blocked:"), "{}", result.output);
    assert!(!dir.path().join("outside.txt").exists());
}

fn warden(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_warden"))
        .env_clear()
        .env("HOME", dir)
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_config_validate_exit_codes() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yaml");
    let config_arg = config.to_str().unwrap();

    std::fs::write(&config, "default_provider: openai\n").unwrap();
    let output = warden(dir.path(), &["--config", config_arg, "config", "validate"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("API key for default provider 'openai' is missing"));

    std::fs::write(
        &config,
        "default_provider: openai\napi_keys:\n  openai: sk-abcdefghijklmnopqrstuvwxyz0123\n",
    )
    .unwrap();
    let output = warden(dir.path(), &["--config", config_arg, "config", "validate"]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "{}",
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn test_config_show_masks_keys() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "api_keys:\n  groq: gsk_secretsecretsecret\n").unwrap();

    let output = warden(
        dir.path(),
        &["--config", config.to_str().unwrap(), "config", "show"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("****cret"));
    assert!(!stdout.contains("gsk_secretsecretsecret"));
}

#[test]
fn test_run_records_session_that_search_finds() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yaml");
    let config_arg = config.to_str().unwrap();
    std::fs::write(&config, "default_provider: openai\n").unwrap();
    std::fs::write(dir.path().join("readme.txt"), "parser overview").unwrap();

    let output = warden(dir.path(), &["--config", config_arg, "session", "new"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();

    let output = warden(
        dir.path(),
        &[
            "--config",
            config_arg,
            "run",
            "read",
            "--args",
            r#"{"path":"readme.txt"}"#,
            "--session",
            &id,
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("parser overview"));

    let output = warden(
        dir.path(),
        &["--config", config_arg, "session", "search", &id, "parser"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[tool]"), "{stdout}");
    assert!(stdout.contains("parser overview"), "{stdout}");

    let output = warden(
        dir.path(),
        &["--config", config_arg, "session", "search", &id, "readme"],
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("[user]"));
}

#[test]
fn test_run_rejects_path_like_session_id() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "default_provider: openai\n").unwrap();
    std::fs::write(dir.path().join("a.txt"), "x").unwrap();
    std::fs::write(dir.path().join("x.jsonl"), "").unwrap();

    let output = warden(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "run",
            "read",
            "--args",
            r#"{"path":"a.txt"}"#,
            "--session",
            "../../../x",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid session id"));
    assert_eq!(std::fs::read_to_string(dir.path().join("x.jsonl")).unwrap(), "");
}
