//! Configuration validation.

use crate::config::types::{BackendKind, ReliaConfig};
use crate::errors::ConfigError;

/// Backend kinds accepted in `[backend] kind`.
pub const VALID_BACKENDS: &[&str] = &["file", "rest"];

/// Validate the merged configuration.
///
/// # Errors
///
/// - `InvalidBackend` for an unknown backend kind
/// - `InvalidConfiguration` when the rest backend lacks `base_url`, when
///   `timeout_secs` is zero, or when `user_id` is blank
pub fn validate_config(config: &ReliaConfig) -> Result<(), ConfigError> {
    let kind = config.backend.kind()?;

    if kind == BackendKind::Rest
        && config
            .backend
            .base_url
            .as_deref()
            .is_none_or(|url| url.trim().is_empty())
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "backend.base_url is required for the rest backend".to_string(),
        });
    }

    if config.backend.timeout_secs == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "backend.timeout_secs must be greater than zero".to_string(),
        });
    }

    if let Some(user_id) = &config.auth.user_id
        && user_id.trim().is_empty()
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "auth.user_id must not be blank".to_string(),
        });
    }

    Ok(())
}
