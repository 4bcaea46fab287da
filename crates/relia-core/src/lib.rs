//! relia-core: Project lifecycle coordination for reliability studies
//!
//! This library owns the signed-in user's project list, the current project
//! and the first-run onboarding flag. It is used by the CLI and by any UI
//! that drives a session.
//!
//! # Main Entry Points
//!
//! - [`state`] - The [`ProjectStore`] and its command dispatch
//! - [`persistence`] - File, rest and in-memory backends
//! - [`config`] - Configuration management
//! - [`identity`] - Who the current owner is

pub mod config;
pub mod errors;
pub mod events;
pub mod identity;
pub mod logging;
pub mod persistence;
pub mod projects;
pub mod state;

// Re-export commonly used types at crate root for convenience
pub use config::ReliaConfig;
pub use errors::{ConfigError, ReliaError};
pub use identity::{IdentityProvider, SessionIdentity};
pub use persistence::{
    FileProjectRepository, InMemoryProjectRepository, ProjectRepository, RestProjectRepository,
    RestSettings, repository_from_config,
};
pub use projects::{NewProject, OwnerId, Project, ProjectCatalog, ProjectError, ProjectId};
pub use state::{
    Command, DispatchError, Event, LoadOutcome, ProjectStore, ProjectsSnapshot, Store,
    StoreOptions,
};

// Re-export logging initialization
pub use logging::init_logging;
