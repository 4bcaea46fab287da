use crate::errors::ReliaError;

use super::types::ProjectId;

/// Failures surfaced by project operations and the persistence collaborator.
///
/// Variants carry owned data only, so errors clone cheaply.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectError {
    #[error("Project name must not be empty")]
    InvalidName,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("Project '{id}' not found")]
    NotFound { id: ProjectId },

    #[error("Persistence failure: {message}")]
    Persistence { message: String },
}

impl ProjectError {
    /// Whether re-invoking the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProjectError::Transport { .. })
    }
}

impl ReliaError for ProjectError {
    fn error_code(&self) -> &'static str {
        match self {
            ProjectError::InvalidName => "PROJECT_INVALID_NAME",
            ProjectError::NotAuthenticated => "PROJECT_NOT_AUTHENTICATED",
            ProjectError::Transport { .. } => "PROJECT_TRANSPORT_FAILED",
            ProjectError::NotFound { .. } => "PROJECT_NOT_FOUND",
            ProjectError::Persistence { .. } => "PROJECT_PERSISTENCE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        // Exhaustive match ensures new variants force an explicit classification.
        match self {
            ProjectError::InvalidName
            | ProjectError::NotAuthenticated
            | ProjectError::NotFound { .. } => true,

            ProjectError::Transport { .. } | ProjectError::Persistence { .. } => false,
        }
    }
}
