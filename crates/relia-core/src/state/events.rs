use serde::{Deserialize, Serialize};

use crate::projects::ProjectId;

/// All state changes the project store can make.
///
/// Each variant describes _what happened_, not what should happen. Only
/// successful state changes produce events; failures use the `Result`
/// error channel, and a load that lost the race to a newer commit changes
/// nothing and so emits nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The project list was replaced by a fetched one.
    ProjectsLoaded { count: usize },
    /// A project was created and prepended to the list.
    ProjectCreated { id: ProjectId, name: String },
    /// A project was deleted remotely and removed from the list.
    ProjectDeleted { id: ProjectId },
    /// The current project changed (`None`: no project is current).
    CurrentProjectChanged { id: Option<ProjectId> },
    /// The onboarding dialog visibility flag changed.
    OnboardingChanged { visible: bool },
}
