//! Error types for the warden-core crate.

use std::path::PathBuf;

/// Errors raised while locating, creating or building the effective configuration.
///
/// Only `Invalid` escapes `build_effective_config`; the file-layer variants are
/// logged and swallowed there, but are surfaced by `ConfigStore` operations that
/// the user asks for explicitly (e.g. `config reset`).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The merged configuration could not be turned into typed settings.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    /// The configuration file exists but is not valid YAML.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
