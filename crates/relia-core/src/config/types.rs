//! Configuration type definitions.
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! kind = "file"
//! data_dir = "/var/lib/relia"
//!
//! [auth]
//! user_id = "engineer-42"
//!
//! [store]
//! reload_after_delete = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults;
use crate::errors::ConfigError;

/// Main configuration loaded from TOML config files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReliaConfig {
    /// Where project records are persisted.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Identity used for persistence calls.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Project store behaviour.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Supported persistence backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Local JSON file under `data_dir`.
    File,
    /// PostgREST-style HTTP service at `base_url`.
    Rest,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::File => "file",
            BackendKind::Rest => "rest",
        }
    }
}

/// Backend configuration (`[backend]`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BackendConfig {
    /// One of: file, rest. Default: file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Data directory for the file backend. Default: `~/.relia`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Service root for the rest backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Public API key for the rest backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds. Default: 30.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBackend` for an unknown `kind`.
    pub fn kind(&self) -> Result<BackendKind, ConfigError> {
        let kind = self.kind.as_deref().unwrap_or(defaults::DEFAULT_BACKEND);
        match kind.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "rest" => Ok(BackendKind::Rest),
            _ => Err(ConfigError::InvalidBackend {
                kind: kind.to_string(),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(defaults::DEFAULT_TIMEOUT_SECS))
    }
}

/// Identity configuration (`[auth]`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthConfig {
    /// Owner id used for every persistence call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Bearer token for the rest backend. Prefer `RELIA_ACCESS_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Project store configuration (`[store]`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoreConfig {
    /// Refetch the whole list after a successful delete. Default: true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_after_delete: Option<bool>,
}

impl StoreConfig {
    pub fn reload_after_delete(&self) -> bool {
        self.reload_after_delete
            .unwrap_or(defaults::DEFAULT_RELOAD_AFTER_DELETE)
    }
}
