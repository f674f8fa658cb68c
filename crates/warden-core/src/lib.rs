//! warden-core: layered settings, validation, safety patterns and the
//! confirmation policy shared by every tool.

pub mod allowlist;
pub mod config;
mod error;
pub mod handle;
pub mod layers;
pub mod patterns;
pub mod permission;
pub mod security;
pub mod validation;

pub use allowlist::sanitize_allowlist;
pub use config::{ApiKeys, ConfigStore, Settings, KNOWN_PROVIDERS};
pub use error::ConfigError;
pub use handle::SettingsHandle;
pub use layers::{build_effective_config, build_effective_config_with_env, CliOverrides};
pub use permission::{
    requires_confirmation, ActionKind, ApprovalRequest, ApprovalResponse, Approver, AutoApprover,
};
pub use security::{NativeCommandConfig, SecurityConfig};
pub use validation::{validate, ValidationResult};
