//! Configuration loading and merging logic.
//!
//! Loads `~/.relia/config.toml` and `./.relia/config.toml`, merges them
//! (working directory wins), applies environment overrides and validates
//! the result. Missing files are not errors; unreadable or malformed ones are.

use std::fs;
use std::path::Path;

use crate::config::types::{AuthConfig, BackendConfig, ReliaConfig, StoreConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

pub const ACCESS_TOKEN_ENV: &str = "RELIA_ACCESS_TOKEN";
pub const USER_ID_ENV: &str = "RELIA_USER_ID";

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or parsed, or if
/// validation fails.
pub fn load_hierarchy() -> Result<ReliaConfig, ConfigError> {
    let mut config = ReliaConfig::default();

    if let Some(home_dir) = dirs::home_dir()
        && let Some(user_config) = load_config_file(&home_dir.join(".relia").join("config.toml"))?
    {
        config = merge_configs(config, user_config);
    }

    let cwd = std::env::current_dir()?;
    if let Some(local_config) = load_config_file(&cwd.join(".relia").join("config.toml"))? {
        config = merge_configs(config, local_config);
    }

    config = apply_env_overrides(config, |key| std::env::var(key).ok());

    validate_config(&config)?;

    Ok(config)
}

/// Load a configuration file, returning `None` if it does not exist.
pub fn load_config_file(path: &Path) -> Result<Option<ReliaConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::IoError { source: e }),
    };

    let config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    tracing::debug!(event = "core.config.file_loaded", path = %path.display());

    Ok(Some(config))
}

/// Merge two configurations, with override_config taking precedence.
///
/// Fields are replaced only when the override sets them.
pub fn merge_configs(base: ReliaConfig, override_config: ReliaConfig) -> ReliaConfig {
    ReliaConfig {
        backend: BackendConfig {
            kind: override_config.backend.kind.or(base.backend.kind),
            data_dir: override_config.backend.data_dir.or(base.backend.data_dir),
            base_url: override_config.backend.base_url.or(base.backend.base_url),
            api_key: override_config.backend.api_key.or(base.backend.api_key),
            timeout_secs: override_config
                .backend
                .timeout_secs
                .or(base.backend.timeout_secs),
        },
        auth: AuthConfig {
            user_id: override_config.auth.user_id.or(base.auth.user_id),
            access_token: override_config.auth.access_token.or(base.auth.access_token),
        },
        store: StoreConfig {
            reload_after_delete: override_config
                .store
                .reload_after_delete
                .or(base.store.reload_after_delete),
        },
    }
}

/// Apply `RELIA_ACCESS_TOKEN` / `RELIA_USER_ID`; empty values are ignored.
pub fn apply_env_overrides(
    mut config: ReliaConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ReliaConfig {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(ACCESS_TOKEN_ENV) {
        config.auth.access_token = Some(token);
    }
    if let Some(user_id) = non_empty(USER_ID_ENV) {
        config.auth.user_id = Some(user_id);
    }
    config
}
