use super::{builtin_registry, load_settings, ExitCodeError};
use crate::approver::TerminalApprover;
use crate::cli::Cli;
use anyhow::Context;
use console::style;
use std::sync::Arc;
use warden_core::SettingsHandle;
use warden_session::{Part, SessionEntry, SessionStore};
use warden_tools::{ToolContext, ToolResult};

pub async fn run(
    cli: &Cli,
    tool: &str,
    args: &str,
    session_id: Option<&str>,
) -> anyhow::Result<()> {
    let settings = load_settings(cli)?;
    let args: serde_json::Value =
        serde_json::from_str(args).context("--args must be a JSON object")?;
    if !args.is_object() {
        anyhow::bail!("--args must be a JSON object");
    }

    let cwd = std::env::current_dir()?;
    let store = SessionStore::new();
    let mut session = match session_id {
        Some(id) => Some(store.load(&cwd, id).await?),
        None => None,
    };

    let ctx = ToolContext {
        working_dir: cwd,
        session_id: session_id.unwrap_or_default().to_string(),
        settings: Arc::new(SettingsHandle::new(settings)),
        approver: Arc::new(TerminalApprover),
        ..Default::default()
    };

    let invocation_id = ulid::Ulid::new().to_string();
    if let Some(session) = session.as_mut() {
        let call = Part::FunctionCall {
            name: tool.to_string(),
            args: args.clone(),
        };
        store
            .append_event(session, SessionEntry::event(&invocation_id, "user", vec![call]))
            .await?;
    }

    let result = builtin_registry().invoke(tool, args, &ctx).await;

    if let Some(session) = session.as_mut() {
        let response = Part::FunctionResponse {
            name: tool.to_string(),
            response: serde_json::to_value(&result)?,
        };
        store
            .append_event(
                session,
                SessionEntry::event(&invocation_id, "tool", vec![response]),
            )
            .await?;
    }

    report(&result)
}

fn report(result: &ToolResult) -> anyhow::Result<()> {
    if result.cancelled {
        eprintln!("{}", style(&result.output).yellow());
        return Err(ExitCodeError::new(1, String::new()).into());
    }
    if result.is_error {
        return Err(ExitCodeError::new(1, format!("{} {}", style("✗").red(), result.output)).into());
    }

    println!("{}", result.output);
    if let Some(warning) = result.metadata.get("warning").and_then(|w| w.as_str()) {
        eprintln!("{} {}", style("warning:").yellow().bold(), warning);
    }
    Ok(())
}
