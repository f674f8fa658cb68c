//! Semantic checks over effective settings.
//!
//! Every check runs independently and appends to a shared [`ValidationResult`];
//! only errors make the result invalid.

use crate::config::Settings;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Errors and warnings collected by [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Models each known provider ships.
const PROVIDER_MODELS: &[(&str, &[&str])] = &[
    (
        "openai",
        &[
            "gpt-4o",
            "gpt-4o-mini",
            "gpt-4-turbo",
            "gpt-4",
            "gpt-3.5-turbo",
            "o1",
            "o1-mini",
            "o3-mini",
        ],
    ),
    (
        "ai_studio",
        &[
            "gemini-1.5-pro",
            "gemini-1.5-flash",
            "gemini-2.0-flash",
            "gemini-2.0-flash-lite",
            "gemini-2.5-pro",
            "gemini-2.5-flash",
        ],
    ),
    (
        "groq",
        &[
            "llama-3.3-70b-versatile",
            "llama-3.1-8b-instant",
            "llama3-70b-8192",
            "llama3-8b-8192",
            "mixtral-8x7b-32768",
            "gemma2-9b-it",
        ],
    ),
    (
        "anthropic",
        &[
            "claude-3-5-sonnet-latest",
            "claude-3-5-haiku-latest",
            "claude-3-opus-latest",
            "claude-3-7-sonnet-latest",
            "claude-sonnet-4-20250514",
            "claude-opus-4-20250514",
        ],
    ),
];

fn compile_map(list: &[(&'static str, &str)]) -> BTreeMap<&'static str, Vec<Regex>> {
    let mut map: BTreeMap<&'static str, Vec<Regex>> = BTreeMap::new();
    for (provider, source) in list {
        match Regex::new(source) {
            Ok(regex) => map.entry(*provider).or_default().push(regex),
            Err(e) => tracing::error!(pattern = source, error = %e, "Failed to compile pattern"),
        }
    }
    map
}

/// Naming conventions for models outside the catalog: fine-tunes, dated
/// snapshots, preview and long-context or vision variants.
static DYNAMIC_MODEL_PATTERNS: Lazy<BTreeMap<&'static str, Vec<Regex>>> = Lazy::new(|| {
    compile_map(&[
        ("openai", r"^ft:"),
        ("openai", r"^gpt-4o(-mini)?-\d{4}-\d{2}-\d{2}$"),
        ("openai", r"-vision"),
        ("ai_studio", r"^gemini-.+-(exp|latest|preview)"),
        ("ai_studio", r"-vision"),
        ("anthropic", r"^claude-.+-\d{8}$"),
        ("groq", r"-(32k|128k|vision-preview)$"),
    ])
});

static API_KEY_FORMATS: Lazy<BTreeMap<&'static str, Vec<Regex>>> = Lazy::new(|| {
    compile_map(&[
        ("openai", r"^sk-[A-Za-z0-9_-]{20,}$"),
        ("anthropic", r"^sk-ant-[A-Za-z0-9_-]{20,}$"),
        ("groq", r"^gsk_[A-Za-z0-9]{20,}$"),
        ("ai_studio", r"^AIza[0-9A-Za-z_-]{35}$"),
    ])
});

const CHAINING_TOKENS: &[&str] = &[";", "|", "&&", "||", "`"];

/// Run every check against `settings`.
pub fn validate(settings: &Settings) -> ValidationResult {
    let mut result = ValidationResult::default();
    check_model(settings, &mut result);
    check_api_keys(settings, &mut result);
    check_allowlist(settings, &mut result);
    check_native_commands(settings, &mut result);
    check_security_flags(settings, &mut result);
    result
}

fn check_model(settings: &Settings, result: &mut ValidationResult) {
    let provider = settings.default_provider.as_str();
    let model = settings.default_model.as_str();

    let Some((_, models)) = PROVIDER_MODELS.iter().find(|(name, _)| *name == provider) else {
        result.warn(format!(
            "Unknown provider '{provider}'; model '{model}' cannot be checked"
        ));
        return;
    };
    if models.contains(&model) {
        return;
    }
    let dynamic = DYNAMIC_MODEL_PATTERNS
        .get(provider)
        .is_some_and(|patterns| patterns.iter().any(|p| p.is_match(model)));
    if !dynamic {
        result.error(format!(
            "Model '{model}' is not available for provider '{provider}'"
        ));
    }
}

fn check_api_keys(settings: &Settings, result: &mut ValidationResult) {
    let keys = settings.api_keys.to_map();
    let provider = settings.default_provider.as_str();

    if keys.is_empty() {
        result.warn("No API keys found");
        result.error(format!(
            "API key for default provider '{provider}' is missing"
        ));
        return;
    }

    match keys.get(provider) {
        Some(key) if !key.trim().is_empty() => {}
        Some(_) => result.error(format!(
            "API key for default provider '{provider}' is blank"
        )),
        None => result.error(format!(
            "API key for default provider '{provider}' is missing"
        )),
    }

    for (name, key) in &keys {
        if key.trim().is_empty() {
            continue;
        }
        if let Some(formats) = API_KEY_FORMATS.get(name.as_str()) {
            if !formats.iter().any(|format| format.is_match(key)) {
                result.warn(format!(
                    "API key for '{name}' does not match the expected format"
                ));
            }
        }
    }
}

fn check_allowlist(settings: &Settings, result: &mut ValidationResult) {
    let suspicious: Vec<&str> = settings
        .native_command_allowlist
        .iter()
        .map(String::as_str)
        .filter(|entry| {
            entry.chars().count() < 3 || CHAINING_TOKENS.iter().any(|t| entry.contains(t))
        })
        .collect();

    if !suspicious.is_empty() {
        let listed = suspicious
            .iter()
            .map(|entry| format!("'{entry}'"))
            .collect::<Vec<_>>()
            .join(", ");
        result.warn(format!(
            "Allowlist entries are too short or contain shell chaining: {listed}"
        ));
    }
}

fn check_native_commands(settings: &Settings, result: &mut ValidationResult) {
    let native = &settings.native_commands;
    if let Some(timeout) = native.default_timeout {
        if timeout <= 0 {
            result.error(format!(
                "native_commands.default_timeout must be positive, got {timeout}"
            ));
        }
    }
    if let Some(dir) = &native.default_working_directory {
        if !dir.exists() {
            result.warn(format!(
                "native_commands.default_working_directory '{}' does not exist",
                dir.display()
            ));
        }
    }
}

fn check_security_flags(settings: &Settings, result: &mut ValidationResult) {
    if settings.auto_approve_native_commands {
        result.warn("auto_approve_native_commands is enabled: shell commands run without confirmation");
    }
    if settings.auto_approve_edits {
        result.warn("auto_approve_edits is enabled: file changes are applied without confirmation");
    }
}
