use crate::error::ConfigError;
use crate::security::{NativeCommandConfig, SecurityConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Template written to disk the first time the config file is missing.
const BUNDLED_TEMPLATE: &str = include_str!("../templates/config.yaml");

/// Providers with a dedicated field in [`ApiKeys`].
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "ai_studio", "groq", "anthropic"];

/// API keys by provider name.
///
/// The four well-known providers have fixed fields; any other provider name
/// lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_studio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Option<String>>,
}

impl ApiKeys {
    /// Key configured for `provider`, if any.
    pub fn get(&self, provider: &str) -> Option<&str> {
        match provider {
            "openai" => self.openai.as_deref(),
            "ai_studio" => self.ai_studio.as_deref(),
            "groq" => self.groq.as_deref(),
            "anthropic" => self.anthropic.as_deref(),
            other => self.extra.get(other).and_then(|key| key.as_deref()),
        }
    }

    /// Set the key for `provider`.
    pub fn set(&mut self, provider: &str, key: impl Into<String>) {
        let key = Some(key.into());
        match provider {
            "openai" => self.openai = key,
            "ai_studio" => self.ai_studio = key,
            "groq" => self.groq = key,
            "anthropic" => self.anthropic = key,
            other => {
                self.extra.insert(other.to_string(), key);
            }
        }
    }

    /// Flat view of every provider that has a key set (blank keys included).
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let known = [
            ("openai", &self.openai),
            ("ai_studio", &self.ai_studio),
            ("groq", &self.groq),
            ("anthropic", &self.anthropic),
        ];
        known
            .into_iter()
            .filter_map(|(name, key)| key.as_ref().map(|k| (name.to_string(), k.clone())))
            .chain(
                self.extra
                    .iter()
                    .filter_map(|(name, key)| key.as_ref().map(|k| (name.clone(), k.clone()))),
            )
            .collect()
    }

    /// Whether no provider has a key set.
    pub fn is_empty(&self) -> bool {
        self.to_map().is_empty()
    }
}

/// Effective settings after layering defaults, file, environment and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_provider: String,
    pub default_model: String,
    pub api_keys: ApiKeys,
    /// Skip the confirmation prompt for file writes, edits and deletes.
    pub auto_approve_edits: bool,
    /// Skip the confirmation prompt for shell commands.
    pub auto_approve_native_commands: bool,
    /// Regexes matched against the start of a command; a match means the
    /// command does not need confirmation unless it is also risky.
    pub native_command_allowlist: Vec<String>,
    pub security: SecurityConfig,
    pub native_commands: NativeCommandConfig,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_tool_calls: u32,
    pub verbosity: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            default_model: "gpt-4o".to_string(),
            api_keys: ApiKeys::default(),
            auto_approve_edits: false,
            auto_approve_native_commands: false,
            native_command_allowlist: Vec::new(),
            security: SecurityConfig::default(),
            native_commands: NativeCommandConfig::default(),
            max_tokens: 4096,
            temperature: 0.7,
            max_tool_calls: 25,
            verbosity: 1,
        }
    }
}

impl Settings {
    /// Copy of the settings with every API key masked, for display.
    pub fn redacted(&self) -> Self {
        let mut out = self.clone();
        let mut keys = ApiKeys::default();
        for (provider, key) in self.api_keys.to_map() {
            keys.set(&provider, mask_secret(&key));
        }
        out.api_keys = keys;
        out
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Location of the per-user YAML config file and the template used to create it.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    template: Option<String>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Store at `~/.config/warden/config.yaml`.
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Store at an explicit path, using the bundled template.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            template: Some(BUNDLED_TEMPLATE.to_string()),
        }
    }

    /// Replace the template used when the file is created. `None` falls back
    /// to a document rendered from [`Settings::default`].
    pub fn with_template(mut self, template: Option<String>) -> Self {
        self.template = template;
        self
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("warden");
        path.push("config.yaml");
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Contents for a freshly created config file.
    pub fn template(&self) -> Result<String, ConfigError> {
        match &self.template {
            Some(template) => Ok(template.clone()),
            None => Settings::default().to_yaml(),
        }
    }

    /// Create the file from the template if it does not exist yet.
    ///
    /// Returns `true` when the file was created.
    pub fn ensure_exists(&self) -> Result<bool, ConfigError> {
        if self.path.exists() {
            return Ok(false);
        }
        self.write_template()?;
        Ok(true)
    }

    /// Overwrite the file with the template.
    pub fn reset(&self) -> Result<(), ConfigError> {
        self.write_template()
    }

    /// Raw file contents, `None` when the file does not exist.
    pub fn read(&self) -> Result<Option<String>, ConfigError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_template(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.template()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_api_keys_known_and_extra_providers() {
        let parsed: ApiKeys = serde_json::from_value(serde_json::json!({
            "openai": "sk-one",
            "mistral": "m-key",
            "groq": null
        }))
        .unwrap();

        assert_eq!(parsed.get("openai"), Some("sk-one"));
        assert_eq!(parsed.get("mistral"), Some("m-key"));
        assert_eq!(parsed.get("groq"), None);
        assert_eq!(parsed.get("anthropic"), None);

        let map = parsed.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["mistral"], "m-key");
    }

    #[test]
    fn test_api_keys_blank_key_counts_as_present() {
        let mut keys = ApiKeys::default();
        assert!(keys.is_empty());
        keys.set("openai", "");
        assert!(!keys.is_empty());
        assert_eq!(keys.get("openai"), Some(""));
    }

    #[test]
    fn test_settings_backward_compatible_defaults() {
        let legacy = r#"{"default_provider":"groq"}"#;
        let parsed: Settings = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.default_provider, "groq");
        assert_eq!(parsed.default_model, "gpt-4o");
        assert!(parsed.security.command_validation);
        assert!(parsed.native_command_allowlist.is_empty());
    }

    #[test]
    fn test_settings_rejects_wrong_numeric_type() {
        let result: Result<Settings, _> =
            serde_json::from_value(serde_json::json!({"max_tokens": "lots"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_redacted_masks_keys() {
        let mut settings = Settings::default();
        settings.api_keys.set("openai", "sk-abcdefghijklmnop1234");
        settings.api_keys.set("custom", "short");

        let redacted = settings.redacted();
        assert_eq!(redacted.api_keys.get("openai"), Some("****1234"));
        assert_eq!(redacted.api_keys.get("custom"), Some("****"));
        assert_eq!(settings.api_keys.get("custom"), Some("short"));
    }

    #[test]
    fn test_bundled_template_parses_to_defaults() {
        let parsed: serde_json::Value = serde_yaml::from_str(BUNDLED_TEMPLATE).unwrap();
        let settings: Settings = serde_json::from_value(parsed).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_ensure_exists_creates_once() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("nested").join("config.yaml"));

        assert!(store.ensure_exists().unwrap());
        assert!(store.path().exists());
        assert!(!store.ensure_exists().unwrap());
    }

    #[test]
    fn test_missing_template_falls_back_to_defaults_document() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("config.yaml")).with_template(None);
        store.ensure_exists().unwrap();

        let content = store.read().unwrap().unwrap();
        assert!(content.contains("default_provider: openai"));
    }

    #[test]
    fn test_reset_overwrites_file() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("config.yaml"));
        std::fs::write(store.path(), "default_provider: groq\n").unwrap();

        store.reset().unwrap();
        let content = store.read().unwrap().unwrap();
        assert!(!content.contains("groq\n"));
    }
}
