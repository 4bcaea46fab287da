use crate::errors::{ConfigError, ReliaError};
use crate::projects::errors::ProjectError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ReliaError for DispatchError {
    fn error_code(&self) -> &'static str {
        match self {
            DispatchError::Project(e) => e.error_code(),
            DispatchError::Config(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            DispatchError::Project(e) => e.is_user_error(),
            DispatchError::Config(e) => e.is_user_error(),
        }
    }
}
