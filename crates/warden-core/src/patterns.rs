//! Built-in pattern sets for classifying paths and shell commands.
//!
//! Dangerous patterns are always fatal. Risky command patterns only ever
//! produce a warning and a confirmation prompt.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// A regex with a human-readable description.
///
/// Compilation failures are kept rather than dropped so callers can fail
/// safe: a pattern that cannot be evaluated is treated as a match.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    description: String,
    compiled: Result<Regex, regex::Error>,
}

impl Pattern {
    pub fn new(source: impl Into<String>, description: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source);
        if let Err(e) = &compiled {
            tracing::error!(pattern = %source, error = %e, "Failed to compile pattern");
        }
        Self {
            source,
            description: description.into(),
            compiled,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_valid(&self) -> bool {
        self.compiled.is_ok()
    }

    /// Unanchored search of `text`.
    pub fn search(&self, text: &str) -> Result<bool, regex::Error> {
        match &self.compiled {
            Ok(regex) => Ok(regex.is_match(text)),
            Err(e) => Err(e.clone()),
        }
    }
}

fn compile(list: &[(&str, &str)]) -> Vec<Pattern> {
    list.iter()
        .map(|(source, description)| Pattern::new(*source, *description))
        .collect()
}

/// Paths that must never be touched, matched against the `/`-normalised input.
pub static DANGEROUS_PATH_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile(&[
        (r"\.\./", "parent directory traversal"),
        (r"(^|/)\.\.$", "trailing parent directory reference"),
        (r"^~(/|$)", "home directory reference"),
        (r"^/etc(/|$)", "system configuration directory"),
        (r"^/var(/|$)", "system variable data directory"),
        (r"^/dev(/|$)", "device files"),
        (r"^/root(/|$)", "root user's home directory"),
        (r"^/proc(/|$)", "process information filesystem"),
        (r"^/sys(/|$)", "kernel sysfs filesystem"),
    ])
});

/// `/home/` is dangerous unless the path is inside the caller's own home.
pub static HOME_PATH_PATTERN: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"^/home(/|$)", "another user's home directory"));

/// Commands blocked under every configuration.
pub static DANGEROUS_COMMAND_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile(&[
        (
            r#"\brm\s+(?:--?[a-zA-Z-]+\s+)*(?:-[a-zA-Z]*[rR][a-zA-Z]*|--recursive)(?:\s+--?[a-zA-Z-]*)*\s+["']?(?:/\*?|~/?|\$HOME/?|\$\{HOME\}/?)["']?(?:\s|;|&|\||$)"#,
            "recursive delete from the root or home directory",
        ),
        (
            r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
            "fork bomb",
        ),
        (r"\bdd\b[^|;&]*\bof=/dev/", "raw disk write with dd"),
        (r"\bmkfs(\.[a-z0-9]+)?\b", "filesystem creation"),
        (
            r">\s*/dev/(sd|hd|vd|xvd|nvme|disk|mmcblk)",
            "redirect onto a block device",
        ),
        (
            r">\s*/(etc|boot|bin|sbin|usr|lib|lib64)(/|\s|$)",
            "redirect into a system directory",
        ),
        (r">\s*/(\s|$)", "redirect onto the root filesystem"),
    ])
});

/// Commands that run only after a warning and, absent auto-approval, confirmation.
pub static RISKY_COMMAND_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    compile(&[
        (r"\bchmod\s+.*(-[a-zA-Z]*R|--recursive)", "recursive permission change"),
        (r"\bchown\s+.*(-[a-zA-Z]*R|--recursive)", "recursive ownership change"),
        (
            r"\b(?:mv|cp)\s+.+\s+/(?:\s*$|\s*[;&|])",
            "move or copy into the root directory",
        ),
        (
            r"\bcurl\b.*\|\s*(?:sudo\s+)?(?:ba|z|da|k)?sh\b",
            "remote script piped into a shell (curl)",
        ),
        (
            r"\bwget\b.*\|\s*(?:sudo\s+)?(?:ba|z|da|k)?sh\b",
            "remote script piped into a shell (wget)",
        ),
        (
            r"\b(?:npm|pnpm)\s+(?:install|i|add)\b.*\s(?:-g|--global)\b",
            "global npm package install",
        ),
        (r"\byarn\s+global\s+add\b", "global yarn package install"),
        (
            r"\bsudo\s+(?:pip3?|gem|npm)\s+install\b",
            "system-wide package install",
        ),
        (r"\bcargo\s+install\b", "global cargo install"),
        (
            r"\b(?:apt|apt-get|yum|dnf|zypper|brew)\s+(?:-\S+\s+)*install\b",
            "system package install",
        ),
        (
            r"\b(?:apt|apt-get|yum|dnf|zypper|brew)\s+(?:-\S+\s+)*(?:remove|purge|autoremove|uninstall|erase)\b",
            "system package removal",
        ),
        (r"\bpacman\s+-R", "system package removal"),
        (r"\bpip3?\s+uninstall\b", "python package removal"),
        (r"\b(?:npm|pnpm|yarn)\s+(?:uninstall|remove)\b", "node package removal"),
    ])
});

/// First dangerous command pattern found in `command`.
///
/// A pattern that cannot be evaluated counts as found.
pub fn find_dangerous_command(command: &str) -> Option<&'static Pattern> {
    DANGEROUS_COMMAND_PATTERNS
        .iter()
        .find(|pattern| pattern.search(command).unwrap_or(true))
}

/// First dangerous path pattern matching an already `/`-normalised path.
pub fn find_dangerous_path(normalized: &str) -> Option<&'static Pattern> {
    if let Some(pattern) = DANGEROUS_PATH_PATTERNS
        .iter()
        .find(|pattern| pattern.search(normalized).unwrap_or(true))
    {
        return Some(pattern);
    }
    let home = &*HOME_PATH_PATTERN;
    if home.search(normalized).unwrap_or(true) && !is_own_home(normalized) {
        return Some(home);
    }
    None
}

fn is_own_home(normalized: &str) -> bool {
    dirs::home_dir().is_some_and(|home| Path::new(normalized).starts_with(home))
}

/// Risky patterns in effect: the configured list when present, else the built-ins.
///
/// Configured entries that fail to compile are logged and skipped.
pub fn risky_command_patterns(configured: Option<&[String]>) -> Vec<Pattern> {
    match configured {
        Some(sources) => sources
            .iter()
            .map(|source| Pattern::new(source.as_str(), format!("matches '{source}'")))
            .filter(Pattern::is_valid)
            .collect(),
        None => RISKY_COMMAND_PATTERNS.clone(),
    }
}
