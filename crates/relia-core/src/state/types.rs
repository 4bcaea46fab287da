use serde::{Deserialize, Serialize};

use crate::projects::ProjectId;

/// All operations that can be dispatched through the project store.
///
/// Commands use owned types so they can be serialized, queued, and sent
/// across boundaries (e.g. from a UI thread to the runtime).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Refetch the current user's project list.
    LoadProjects,
    /// Create a project. Blank optional fields are treated as absent.
    CreateProject {
        name: String,
        description: Option<String>,
        /// Upload the project originates from, if any.
        source_file_name: Option<String>,
    },
    /// Delete a project, then reconcile the local list.
    DeleteProject { id: ProjectId },
    /// Change the current project. `None` clears the selection.
    SelectProject { id: Option<ProjectId> },
    /// Show or hide the first-run onboarding dialog.
    SetOnboarding { visible: bool },
}
