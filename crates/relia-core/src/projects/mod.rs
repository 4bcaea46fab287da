pub mod catalog;
pub mod errors;
pub mod types;

// Re-export commonly used types at module level
pub use catalog::ProjectCatalog;
pub use errors::ProjectError;
pub use types::{NewProject, OwnerId, Project, ProjectId};
