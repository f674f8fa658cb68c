//! Builds the effective settings from four layers.
//!
//! Precedence, lowest to highest: built-in defaults, the YAML config file,
//! `WARDEN_*` environment variables, explicit CLI overrides. Each layer is
//! deep-merged over the previous one as a JSON value before the final typed
//! construction.

use crate::allowlist::sanitize_allowlist;
use crate::config::{ConfigStore, Settings};
use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "WARDEN_";

/// Separator between nested field names in an environment variable.
pub const ENV_NESTED_DELIMITER: &str = "__";

/// Variable naming the config file; read by the CLI, not merged as a setting.
pub const CONFIG_PATH_ENV: &str = "WARDEN_CONFIG";

/// Bare provider key variables. Earlier entries win for the same provider.
const PROVIDER_KEY_VARS: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai"),
    ("ANTHROPIC_API_KEY", "anthropic"),
    ("GROQ_API_KEY", "groq"),
    ("GEMINI_API_KEY", "ai_studio"),
    ("GOOGLE_API_KEY", "ai_studio"),
];

/// Values supplied on the command line. `None` leaves lower layers untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub auto_approve_edits: Option<bool>,
    pub auto_approve_native_commands: Option<bool>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub max_tool_calls: Option<u32>,
    pub verbosity: Option<u8>,
}

impl CliOverrides {
    fn to_overlay(&self) -> Value {
        let mut map = Map::new();
        if let Some(provider) = &self.provider {
            map.insert("default_provider".into(), Value::from(provider.as_str()));
        }
        if let Some(model) = &self.model {
            map.insert("default_model".into(), Value::from(model.as_str()));
        }
        if let Some(flag) = self.auto_approve_edits {
            map.insert("auto_approve_edits".into(), Value::from(flag));
        }
        if let Some(flag) = self.auto_approve_native_commands {
            map.insert("auto_approve_native_commands".into(), Value::from(flag));
        }
        if let Some(n) = self.max_tokens {
            map.insert("max_tokens".into(), Value::from(n));
        }
        if let Some(t) = self.temperature {
            map.insert("temperature".into(), Value::from(t));
        }
        if let Some(n) = self.max_tool_calls {
            map.insert("max_tool_calls".into(), Value::from(n));
        }
        if let Some(v) = self.verbosity {
            map.insert("verbosity".into(), Value::from(v));
        }
        Value::Object(map)
    }
}

/// Build settings using the process environment.
pub fn build_effective_config(
    store: &ConfigStore,
    cli: &CliOverrides,
) -> Result<Settings, ConfigError> {
    let env = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
    build_effective_config_with_env(store, cli, env)
}

/// Build settings from an explicit set of environment variables.
///
/// Only the final typed construction can fail; problems reading or parsing
/// the config file are logged and that layer is treated as empty.
pub fn build_effective_config_with_env<I>(
    store: &ConfigStore,
    cli: &CliOverrides,
    env: I,
) -> Result<Settings, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let defaults = serde_json::to_value(Settings::default())?;

    let mut merged = defaults.clone();
    deep_merge(&mut merged, load_file_layer(store));
    deep_merge(&mut merged, env_overlay(env, &defaults));
    deep_merge(&mut merged, cli.to_overlay());

    let mut settings: Settings = serde_json::from_value(merged)?;
    settings.native_command_allowlist = sanitize_allowlist(&settings.native_command_allowlist);
    tracing::debug!(
        provider = %settings.default_provider,
        model = %settings.default_model,
        "Built effective configuration"
    );
    Ok(settings)
}

/// Merge `overlay` into `base`.
///
/// Objects merge recursively and any other value replaces the base value
/// wholesale. A `null` in the overlay only lands when the key is absent from
/// the base.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(_) if value.is_null() => {}
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    Some(existing) => *existing = value,
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn empty_layer() -> Value {
    Value::Object(Map::new())
}

fn load_file_layer(store: &ConfigStore) -> Value {
    match store.read() {
        Ok(Some(content)) => parse_file_layer(&content, store.path()),
        Ok(None) => {
            match store.ensure_exists() {
                Ok(_) => tracing::info!(
                    path = %store.path().display(),
                    "Created config file from template"
                ),
                Err(e) => tracing::warn!(
                    path = %store.path().display(),
                    error = %e,
                    "Could not create config file"
                ),
            }
            empty_layer()
        }
        Err(e) => {
            tracing::warn!(path = %store.path().display(), error = %e, "Could not read config file");
            empty_layer()
        }
    }
}

fn parse_file_layer(content: &str, path: &Path) -> Value {
    match serde_yaml::from_str::<Value>(content) {
        Ok(value @ Value::Object(_)) => value,
        Ok(Value::Null) => empty_layer(),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Config file is not a mapping; ignoring it");
            empty_layer()
        }
        Err(source) => {
            let e = ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            };
            tracing::warn!("{e}; ignoring config file");
            empty_layer()
        }
    }
}

fn env_overlay<I>(env: I, defaults: &Value) -> Value
where
    I: IntoIterator<Item = (String, String)>,
{
    // Sorted so that overlapping variables always apply in the same order.
    let vars: BTreeMap<String, String> = env.into_iter().collect();

    let mut api_keys = Map::new();
    for (var, provider) in PROVIDER_KEY_VARS {
        if let Some(key) = vars.get(*var).filter(|v| !v.trim().is_empty()) {
            api_keys
                .entry(provider.to_string())
                .or_insert_with(|| Value::from(key.as_str()));
        }
    }

    let mut overlay = empty_layer();
    if !api_keys.is_empty() {
        deep_merge(&mut overlay, nest(&["api_keys".to_string()], Value::Object(api_keys)));
    }

    for (name, raw) in &vars {
        let Some(rest) = strip_env_prefix(name) else {
            continue;
        };
        if name.eq_ignore_ascii_case(CONFIG_PATH_ENV) {
            continue;
        }
        let path: Vec<String> = rest
            .split(ENV_NESTED_DELIMITER)
            .map(str::to_ascii_lowercase)
            .collect();
        if path.iter().any(String::is_empty) {
            tracing::warn!(variable = %name, "Ignoring malformed environment override");
            continue;
        }
        let value = coerce_env_value(defaults, &path, raw);
        deep_merge(&mut overlay, nest(&path, value));
    }

    if let Value::Object(map) = &mut overlay {
        let empty_keys = map
            .get("api_keys")
            .and_then(Value::as_object)
            .is_some_and(Map::is_empty);
        if empty_keys {
            map.remove("api_keys");
        }
    }
    overlay
}

fn strip_env_prefix(name: &str) -> Option<&str> {
    let head = name.get(..ENV_PREFIX.len())?;
    if head.eq_ignore_ascii_case(ENV_PREFIX) {
        name.get(ENV_PREFIX.len()..).filter(|rest| !rest.is_empty())
    } else {
        None
    }
}

fn nest(path: &[String], value: Value) -> Value {
    path.iter().rev().fold(value, |inner, key| {
        let mut map = Map::new();
        map.insert(key.clone(), inner);
        Value::Object(map)
    })
}

/// Interpret a raw environment string using the type of the default at `path`.
///
/// Values that cannot be coerced stay strings, so the typed construction
/// reports them instead of silently dropping them.
fn coerce_env_value(defaults: &Value, path: &[String], raw: &str) -> Value {
    if path.first().is_some_and(|head| head == "api_keys") && path.len() > 1 {
        return Value::from(raw);
    }
    let default = path
        .iter()
        .try_fold(defaults, |value, key| value.get(key.as_str()));
    match default {
        Some(Value::String(_)) => Value::from(raw),
        Some(Value::Bool(_)) => parse_bool(raw).map_or_else(|| Value::from(raw), Value::from),
        Some(Value::Number(_)) => parse_number(raw).unwrap_or_else(|| Value::from(raw)),
        _ => match serde_yaml::from_str::<Value>(raw) {
            Ok(Value::Null) | Err(_) => Value::from(raw),
            Ok(parsed) => parsed,
        },
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_with(dir: &TempDir, yaml: &str) -> ConfigStore {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        ConfigStore::with_path(path)
    }

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_deep_merge_recurses_and_replaces() {
        let mut base = json!({"a": {"x": 1, "y": 2}, "list": [1, 2], "keep": "v"});
        deep_merge(&mut base, json!({"a": {"y": 3, "z": 4}, "list": [9]}));
        assert_eq!(base, json!({"a": {"x": 1, "y": 3, "z": 4}, "list": [9], "keep": "v"}));
    }

    #[test]
    fn test_deep_merge_null_only_fills_absent_keys() {
        let mut base = json!({"model": "gpt-4o"});
        deep_merge(&mut base, json!({"model": null, "extra": null}));
        assert_eq!(base, json!({"model": "gpt-4o", "extra": null}));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "default_provider: groq\nsecurity:\n  path_validation: false\n");
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), env(&[])).unwrap();
        assert_eq!(settings.default_provider, "groq");
        assert!(!settings.security.path_validation);
        assert!(settings.security.workspace_restriction);
        assert_eq!(settings.default_model, "gpt-4o");
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "default_provider: file_p\ndefault_model: file_m\nmax_tokens: 100\n");
        let cli = CliOverrides {
            provider: Some("cli_p".to_string()),
            ..Default::default()
        };
        let vars = env(&[
            ("WARDEN_DEFAULT_PROVIDER", "env_p"),
            ("WARDEN_DEFAULT_MODEL", "env_m"),
        ]);

        let settings = build_effective_config_with_env(&store, &cli, vars).unwrap();
        assert_eq!(settings.default_provider, "cli_p");
        assert_eq!(settings.default_model, "env_m");
        assert_eq!(settings.max_tokens, 100);
    }

    #[test]
    fn test_missing_file_is_created_and_defaults_used() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("sub").join("config.yaml"));
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(store.path().exists());
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "default_provider: [unclosed\n  : :");
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_null_in_file_keeps_default() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "default_model: null\n");
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), env(&[])).unwrap();
        assert_eq!(settings.default_model, "gpt-4o");
    }

    #[test]
    fn test_nested_env_overrides_are_typed() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "");
        let vars = env(&[
            ("WARDEN_SECURITY__PATH_VALIDATION", "false"),
            ("WARDEN_MAX_TOKENS", "1000"),
            ("WARDEN_TEMPERATURE", "0.25"),
            ("WARDEN_NATIVE_COMMANDS__DEFAULT_TIMEOUT", "30"),
            ("WARDEN_NATIVE_COMMAND_ALLOWLIST", r#"["git status", "ls -la"]"#),
            ("UNRELATED", "ignored"),
        ]);
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), vars).unwrap();
        assert!(!settings.security.path_validation);
        assert_eq!(settings.max_tokens, 1000);
        assert!((settings.temperature - 0.25).abs() < f32::EPSILON);
        assert_eq!(settings.native_commands.default_timeout, Some(30));
        assert_eq!(settings.native_command_allowlist, vec!["git status", "ls -la"]);
    }

    #[test]
    fn test_env_type_violation_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "");
        let vars = env(&[("WARDEN_MAX_TOKENS", "lots")]);
        let result = build_effective_config_with_env(&store, &CliOverrides::default(), vars);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_file_type_violation_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "max_tool_calls: many\n");
        let result = build_effective_config_with_env(&store, &CliOverrides::default(), env(&[]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bare_provider_key_vars() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "api_keys:\n  openai: sk-file\n  anthropic: sk-ant-file\n");
        let vars = env(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("GOOGLE_API_KEY", "AIza-google"),
            ("GROQ_API_KEY", ""),
        ]);
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), vars).unwrap();
        assert_eq!(settings.api_keys.get("openai"), Some("sk-env"));
        assert_eq!(settings.api_keys.get("anthropic"), Some("sk-ant-file"));
        assert_eq!(settings.api_keys.get("ai_studio"), Some("AIza-google"));
        assert_eq!(settings.api_keys.get("groq"), None);
    }

    #[test]
    fn test_prefixed_key_var_beats_bare_var() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "");
        let vars = env(&[
            ("OPENAI_API_KEY", "sk-bare"),
            ("WARDEN_API_KEYS__OPENAI", "sk-prefixed"),
            ("WARDEN_API_KEYS__MISTRAL", "12345"),
        ]);
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), vars).unwrap();
        assert_eq!(settings.api_keys.get("openai"), Some("sk-prefixed"));
        assert_eq!(settings.api_keys.get("mistral"), Some("12345"));
    }

    #[test]
    fn test_empty_api_keys_overlay_is_dropped() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "api_keys:\n  groq: gsk_file\n");
        let vars = env(&[("WARDEN_API_KEYS", "{}")]);
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), vars).unwrap();
        assert_eq!(settings.api_keys.get("groq"), Some("gsk_file"));
    }

    #[test]
    fn test_allowlist_is_sanitized_on_build() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            "native_command_allowlist:\n  - git status\n  - rm -rf /\n  - ''\n  - ls\n",
        );
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), env(&[])).unwrap();
        assert_eq!(settings.native_command_allowlist, vec!["git status", "ls"]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "default_model: gpt-4o-mini\nauto_approve_edits: true\n");
        let cli = CliOverrides {
            verbosity: Some(3),
            temperature: Some(0.2),
            ..Default::default()
        };
        let vars = env(&[("WARDEN_SECURITY__COMMAND_VALIDATION", "no")]);

        let first = build_effective_config_with_env(&store, &cli, vars.clone()).unwrap();
        let second = build_effective_config_with_env(&store, &cli, vars).unwrap();
        assert_eq!(first, second);
        assert!(!first.security.command_validation);
        assert_eq!(first.verbosity, 3);
    }

    #[test]
    fn test_config_path_variable_is_not_a_setting() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "");
        let vars = env(&[("WARDEN_CONFIG", "/somewhere/config.yaml")]);
        let settings =
            build_effective_config_with_env(&store, &CliOverrides::default(), vars).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
