//! Shell command safety check.

use regex::Regex;
use warden_core::patterns::{find_dangerous_command, risky_command_patterns};
use warden_core::Settings;

/// Outcome of a command check.
///
/// `allowlisted` is kept alongside the verdict so callers can decide whether
/// to ask for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandVerdict {
    pub is_safe: bool,
    pub reason: String,
    pub is_warning: bool,
    pub allowlisted: bool,
}

impl CommandVerdict {
    fn allow(allowlisted: bool) -> Self {
        Self {
            is_safe: true,
            reason: String::new(),
            is_warning: false,
            allowlisted,
        }
    }
}

/// Classify `command` under `settings`.
///
/// Dangerous patterns always block, even with command validation off. Risky
/// patterns never block; they only set `is_warning`.
pub fn check_command(command: &str, settings: &Settings) -> CommandVerdict {
    if let Some(pattern) = find_dangerous_command(command) {
        return CommandVerdict {
            is_safe: false,
            reason: format!(
                "Command matches dangerous pattern '{}': {}",
                pattern.source(),
                pattern.description()
            ),
            is_warning: false,
            allowlisted: false,
        };
    }

    if !settings.security.command_validation {
        return CommandVerdict::allow(false);
    }

    let risky = risky_command_patterns(settings.security.risky_command_patterns.as_deref())
        .into_iter()
        .find(|pattern| pattern.search(command).unwrap_or(true));
    let allowlisted = is_allowlisted(command, &settings.native_command_allowlist);

    match risky {
        Some(pattern) => CommandVerdict {
            is_safe: true,
            reason: format!(
                "Command matches risky pattern '{}': {}",
                pattern.source(),
                pattern.description()
            ),
            is_warning: true,
            allowlisted,
        },
        None => CommandVerdict::allow(allowlisted),
    }
}

/// Whether any allowlist entry, read as a regex, matches `command` from its start.
///
/// Only the start is anchored: `git status` also admits `git status; rm x`.
/// Entries that fail to compile are logged and skipped.
pub fn is_allowlisted(command: &str, allowlist: &[String]) -> bool {
    allowlist.iter().any(|entry| match Regex::new(&format!("^(?:{entry})")) {
        Ok(regex) => regex.is_match(command),
        Err(e) => {
            tracing::warn!(entry = %entry, error = %e, "Ignoring invalid allowlist entry");
            false
        }
    })
}
