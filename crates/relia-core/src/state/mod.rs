pub mod dispatch;
pub mod errors;
pub mod events;
pub mod project_store;
pub mod store;
pub mod types;

pub use errors::DispatchError;
pub use events::Event;
pub use project_store::{LoadOutcome, ProjectStore, ProjectsSnapshot, StoreOptions};
pub use store::Store;
pub use types::Command;
