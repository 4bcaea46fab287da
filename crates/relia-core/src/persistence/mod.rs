pub mod file;
pub mod memory;
pub mod ports;
pub mod rest;

use std::sync::Arc;

pub use file::FileProjectRepository;
pub use memory::InMemoryProjectRepository;
pub use ports::ProjectRepository;
pub use rest::{RestProjectRepository, RestSettings};

use crate::config::{BackendKind, ReliaConfig};
use crate::errors::ConfigError;
use crate::state::DispatchError;

/// Build the persistence collaborator selected by `[backend] kind`.
///
/// # Errors
///
/// Returns a config error for an unknown kind or a rest backend without
/// `base_url`, and a project error if the HTTP client cannot be built.
pub fn repository_from_config(
    config: &ReliaConfig,
) -> Result<Arc<dyn ProjectRepository>, DispatchError> {
    match config.backend.kind()? {
        BackendKind::File => {
            let data_dir = config
                .backend
                .data_dir
                .clone()
                .unwrap_or_else(FileProjectRepository::default_data_dir);
            tracing::debug!(
                event = "core.persistence.backend_selected",
                backend = "file",
                data_dir = %data_dir.display()
            );
            Ok(Arc::new(FileProjectRepository::new(data_dir)))
        }
        BackendKind::Rest => {
            let base_url = config.backend.base_url.clone().ok_or_else(|| {
                ConfigError::InvalidConfiguration {
                    message: "backend.base_url is required for the rest backend".to_string(),
                }
            })?;
            tracing::debug!(
                event = "core.persistence.backend_selected",
                backend = "rest",
                base_url = %base_url
            );
            let repository = RestProjectRepository::new(RestSettings {
                base_url,
                api_key: config.backend.api_key.clone(),
                access_token: config.auth.access_token.clone(),
                timeout: config.backend.timeout(),
            })?;
            Ok(Arc::new(repository))
        }
    }
}
