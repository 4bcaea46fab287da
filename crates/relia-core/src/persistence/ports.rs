use crate::projects::{NewProject, OwnerId, Project, ProjectError, ProjectId};

/// The persistence collaborator: the only I/O boundary of the project store.
///
/// Implementations map their native failures onto [`ProjectError`]:
/// connectivity problems become `Transport`, rejected credentials become
/// `NotAuthenticated`, an unknown id on delete becomes `NotFound`, anything
/// else becomes `Persistence`.
#[async_trait::async_trait]
pub trait ProjectRepository: Send + Sync {
    /// All projects owned by `owner`, newest first.
    async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>, ProjectError>;

    /// Store a new project; the backend assigns id, timestamps and owner.
    async fn create_project(
        &self,
        owner: &OwnerId,
        request: &NewProject,
    ) -> Result<Project, ProjectError>;

    async fn delete_project(&self, owner: &OwnerId, id: &ProjectId) -> Result<(), ProjectError>;
}
