use super::errors::ProjectError;
use super::types::{Project, ProjectId};

/// Encapsulates the project list with enforced invariants.
///
/// Key invariant: `current` is either `None` or the id of an entry in
/// `projects`. Every mutation ends in [`ProjectCatalog::reconcile`], which is
/// the single place the invariant is enforced.
///
/// Projects are ordered newest first, matching the persistence collaborator.
#[derive(Clone, Debug, Default)]
pub struct ProjectCatalog {
    /// Known projects, newest first (private to enforce invariants).
    projects: Vec<Project>,
    /// Id of the current project, if any.
    current: Option<ProjectId>,
}

impl ProjectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from existing data.
    ///
    /// If `current` doesn't match any project, no project is current.
    #[cfg(test)]
    pub(crate) fn from_data(projects: Vec<Project>, current: Option<ProjectId>) -> Self {
        let mut catalog = Self { projects, current };
        catalog.reconcile();
        catalog
    }

    /// Replace the whole list with a freshly fetched one.
    ///
    /// The current selection survives if its id is still present; otherwise
    /// the newest project becomes current (or none, for an empty list).
    pub fn replace_all(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        self.reconcile();
        self.select_newest_if_unset();
    }

    /// Prepend a newly created project and make it current.
    ///
    /// An existing entry with the same id is replaced rather than duplicated.
    pub fn insert_newest(&mut self, project: Project) {
        self.projects.retain(|p| p.id() != project.id());
        self.current = Some(project.id().clone());
        self.projects.insert(0, project);
        self.reconcile();
    }

    /// Remove a project by id.
    ///
    /// If the removed project was current, no project is current afterwards.
    /// Another project is never selected here; callers decide that.
    pub fn remove(&mut self, id: &ProjectId) -> Option<Project> {
        let index = self.projects.iter().position(|p| p.id() == id)?;
        let removed = self.projects.remove(index);
        self.reconcile();
        Some(removed)
    }

    /// Select a project by id, or clear the selection with `None`.
    ///
    /// # Errors
    /// Returns `ProjectError::NotFound` if no project matches the id.
    pub fn select(&mut self, id: Option<&ProjectId>) -> Result<(), ProjectError> {
        match id {
            Some(id) if self.get(id).is_none() => Err(ProjectError::NotFound { id: id.clone() }),
            Some(id) => {
                self.current = Some(id.clone());
                Ok(())
            }
            None => {
                self.current = None;
                Ok(())
            }
        }
    }

    /// Make the newest project current when nothing is selected.
    pub fn select_newest_if_unset(&mut self) {
        if self.current.is_none() {
            self.current = self.projects.first().map(|p| p.id().clone());
        }
    }

    /// Drop a current id that no longer names a known project.
    pub fn reconcile(&mut self) {
        if let Some(current) = &self.current
            && !self.projects.iter().any(|p| p.id() == current)
        {
            self.current = None;
        }
    }

    /// Get the current project, if any.
    pub fn current(&self) -> Option<&Project> {
        self.current.as_ref().and_then(|id| self.get(id))
    }

    /// Get the current project's id, if any.
    pub fn current_id(&self) -> Option<&ProjectId> {
        self.current.as_ref()
    }

    pub fn get(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id() == id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }
}
