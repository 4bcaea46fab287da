use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use super::ports::ProjectRepository;
use crate::projects::{NewProject, OwnerId, Project, ProjectError, ProjectId};

/// Process-local backend keeping every owner's records in one list.
///
/// Records are kept newest first, so listing is a plain owner filter.
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    records: Mutex<Vec<Project>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository; `projects` must already be newest first.
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            records: Mutex::new(projects),
        }
    }

    /// Number of stored records across all owners.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>, ProjectError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .filter(|p| p.owner_id() == owner)
            .cloned()
            .collect())
    }

    async fn create_project(
        &self,
        owner: &OwnerId,
        request: &NewProject,
    ) -> Result<Project, ProjectError> {
        let project =
            Project::materialize(ProjectId::generate(), owner.clone(), request, Utc::now());
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, project.clone());
        Ok(project)
    }

    async fn delete_project(&self, owner: &OwnerId, id: &ProjectId) -> Result<(), ProjectError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let index = records
            .iter()
            .position(|p| p.id() == id && p.owner_id() == owner)
            .ok_or_else(|| ProjectError::NotFound { id: id.clone() })?;
        records.remove(index);
        Ok(())
    }
}
