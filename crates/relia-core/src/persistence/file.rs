use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::ports::ProjectRepository;
use crate::projects::{NewProject, OwnerId, Project, ProjectError, ProjectId};

const PROJECTS_FILE: &str = "projects.json";

/// On-disk document (`<data_dir>/projects.json`).
///
/// Records of every owner live in one list, newest first.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectsDocument {
    #[serde(default)]
    projects: Vec<Project>,
}

/// Backend storing project records in a local JSON file.
///
/// Read-modify-write cycles are serialized within the process and every
/// write replaces the file atomically (temp file + rename), so a crash never
/// leaves a half-written document behind.
#[derive(Debug)]
pub struct FileProjectRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileProjectRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(PROJECTS_FILE),
            write_lock: Mutex::new(()),
        }
    }

    /// Default location: `~/.relia/projects.json`, falling back to `./.relia`.
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".relia")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<ProjectsDocument, ProjectError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ProjectsDocument::default());
            }
            Err(e) => {
                tracing::error!(
                    event = "core.persistence.file_read_failed",
                    path = %self.path.display(),
                    error = %e
                );
                return Err(ProjectError::Persistence {
                    message: format!(
                        "Failed to read projects file ({}): {}",
                        self.path.display(),
                        e
                    ),
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            // ERROR (not warn): the file exists but is corrupted, resetting it
            // silently would lose every project record.
            tracing::error!(
                event = "core.persistence.file_parse_failed",
                path = %self.path.display(),
                error = %e
            );
            ProjectError::Persistence {
                message: format!(
                    "Projects file corrupted ({}). Delete {} to reset.",
                    e,
                    self.path.display()
                ),
            }
        })
    }

    async fn write_document(&self, document: &ProjectsDocument) -> Result<(), ProjectError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ProjectError::Persistence {
                    message: format!("Failed to create directory ({}): {}", parent.display(), e),
                })?;
        }

        let json =
            serde_json::to_string_pretty(document).map_err(|e| ProjectError::Persistence {
                message: format!("Failed to serialize projects: {}", e),
            })?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| ProjectError::Persistence {
                message: format!(
                    "Failed to write projects file ({}): {}",
                    temp_path.display(),
                    e
                ),
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| ProjectError::Persistence {
                message: format!(
                    "Failed to replace projects file ({}): {}",
                    self.path.display(),
                    e
                ),
            })?;

        tracing::debug!(
            event = "core.persistence.file_saved",
            path = %self.path.display(),
            count = document.projects.len()
        );

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectRepository for FileProjectRepository {
    async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>, ProjectError> {
        let document = self.read_document().await?;
        Ok(document
            .projects
            .into_iter()
            .filter(|p| p.owner_id() == owner)
            .collect())
    }

    async fn create_project(
        &self,
        owner: &OwnerId,
        request: &NewProject,
    ) -> Result<Project, ProjectError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.read_document().await?;
        let project =
            Project::materialize(ProjectId::generate(), owner.clone(), request, Utc::now());
        document.projects.insert(0, project.clone());
        self.write_document(&document).await?;

        Ok(project)
    }

    async fn delete_project(&self, owner: &OwnerId, id: &ProjectId) -> Result<(), ProjectError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.read_document().await?;
        let original_len = document.projects.len();
        document
            .projects
            .retain(|p| !(p.id() == id && p.owner_id() == owner));

        if document.projects.len() == original_len {
            return Err(ProjectError::NotFound { id: id.clone() });
        }

        self.write_document(&document).await
    }
}
