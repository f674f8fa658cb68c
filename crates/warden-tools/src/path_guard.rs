//! Path safety checks shared by the filesystem tools.
//!
//! Containment is decided on the resolved path; the dangerous-pattern scan is
//! purely textual and runs on the input as given.

use crate::error::ToolError;
use crate::traits::ToolContext;
use std::io;
use std::path::{Component, Path, PathBuf};
use warden_core::patterns::find_dangerous_path;
use warden_core::SecurityConfig;

/// Outcome of a path check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVerdict {
    pub is_safe: bool,
    pub reason: Option<String>,
}

impl PathVerdict {
    fn allow() -> Self {
        Self {
            is_safe: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            is_safe: false,
            reason: Some(reason.into()),
        }
    }
}

/// Check `path` against the workspace boundary and the dangerous path patterns.
///
/// `strict` turns both checks on regardless of `security`.
pub fn check_path(path: &str, strict: bool, security: &SecurityConfig, workspace: &Path) -> PathVerdict {
    if path.trim().is_empty() {
        return PathVerdict::deny("Path is empty");
    }
    if path.contains('\0') {
        return PathVerdict::deny("Path contains a null byte");
    }

    let pattern_check = strict || security.path_validation;
    let containment_check = strict || security.workspace_restriction;
    if !pattern_check && !containment_check {
        return PathVerdict::allow();
    }

    if containment_check {
        if let Err(reason) = check_containment(path, workspace) {
            return PathVerdict::deny(reason);
        }
    }

    if pattern_check {
        let normalized = path.replace('\\', "/");
        if let Some(pattern) = find_dangerous_path(&normalized) {
            return PathVerdict::deny(format!(
                "Path '{path}' matches dangerous pattern '{}': {}",
                pattern.source(),
                pattern.description()
            ));
        }
    }

    PathVerdict::allow()
}

fn check_containment(path: &str, workspace: &Path) -> Result<(), String> {
    if has_drive_prefix(path) {
        return Err(format!("Path '{path}' is outside the workspace"));
    }

    let workspace = workspace
        .canonicalize()
        .map_err(|e| format!("Cannot resolve workspace '{}': {e}", workspace.display()))?;
    let candidate = absolutize(Path::new(path), &workspace);
    let resolved = resolve_lenient(&candidate).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
            format!("Invalid path '{path}': {e}")
        }
        _ => format!("Cannot resolve path '{path}': {e}"),
    })?;

    if resolved.starts_with(&workspace) {
        return Ok(());
    }
    if path.starts_with('/') || path.starts_with('\\') {
        Err(format!("Absolute path '{path}' is outside the workspace"))
    } else {
        Err(format!("Path '{path}' resolves outside the workspace"))
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Path a tool should operate on: `raw` as given if absolute, else under `working_dir`.
pub fn resolve_target(raw: &str, working_dir: &Path) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

/// Run the path check for a tool invocation and return the path to use.
pub(crate) fn checked_path(ctx: &ToolContext, raw: &str) -> Result<PathBuf, ToolError> {
    let settings = ctx.settings();
    let verdict = check_path(raw, false, &settings.security, &ctx.working_dir);
    if !verdict.is_safe {
        let reason = verdict.reason.unwrap_or_else(|| format!("Path '{raw}' is not allowed"));
        tracing::warn!(path = raw, %reason, "Path rejected");
        return Err(ToolError::Blocked(reason));
    }
    Ok(resolve_target(raw, &ctx.working_dir))
}

fn absolutize(path: &Path, workspace: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&workspace.join(path))
    }
}

/// Canonicalize the longest existing ancestor and re-attach the rest, so
/// paths that do not exist yet still resolve.
///
/// Only a missing entry moves the walk up. Any other lookup failure, and any
/// symlink that cannot be followed, is an error.
fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut tail = PathBuf::new();

    loop {
        match std::fs::symlink_metadata(&existing) {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let name = existing
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no existing ancestor"))?
            .to_owned();
        tail = if tail.as_os_str().is_empty() {
            PathBuf::from(name)
        } else {
            PathBuf::from(name).join(&tail)
        };
        existing = existing
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no existing ancestor"))?
            .to_path_buf();
    }

    let base = existing.canonicalize()?;
    Ok(if tail.as_os_str().is_empty() {
        base
    } else {
        base.join(tail)
    })
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir => out.push(component.as_os_str()),
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::Normal(seg) => out.push(seg),
        }
    }
    out
}
