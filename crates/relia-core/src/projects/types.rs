use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ProjectError;

/// Opaque project identifier assigned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier (used by the local adapters).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of the authenticated user owning a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named container for one reliability analysis, owned by exactly one user.
///
/// Projects are only materialized by persistence adapters: the id, the
/// timestamps and the owner are never chosen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Originating upload, if the project was created from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_file_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_id: OwnerId,
}

impl Project {
    /// Build the record a backend stores for a validated creation request.
    pub(crate) fn materialize(
        id: ProjectId,
        owner_id: OwnerId,
        request: &NewProject,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            source_file_name: request.source_file_name.clone(),
            created_at: now,
            updated_at: now,
            owner_id,
        }
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn source_file_name(&self) -> Option<&str> {
        self.source_file_name.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}

/// Test utilities for creating projects without a backend.
///
/// Public so integration tests and downstream crates can build fixtures.
#[doc(hidden)]
pub mod test_helpers {
    use super::*;

    /// Create a project owned by `owner` with the given id and name.
    pub fn make_test_project(id: &str, name: &str, owner: &str) -> Project {
        let request = NewProject {
            name: name.to_string(),
            description: None,
            source_file_name: None,
        };
        Project::materialize(
            ProjectId::new(id),
            OwnerId::new(owner),
            &request,
            Utc::now(),
        )
    }
}

/// A validated request to create a project.
///
/// Construction trims surrounding whitespace, rejects blank names and folds
/// blank optional fields to `None`, so a `NewProject` never needs to be
/// re-checked before it reaches a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NewProjectFields")]
pub struct NewProject {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_file_name: Option<String>,
}

impl NewProject {
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidName` if `name` is empty after trimming.
    pub fn new(name: &str, description: Option<&str>) -> Result<Self, ProjectError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::InvalidName);
        }

        Ok(Self {
            name: name.to_string(),
            description: normalize_optional(description),
            source_file_name: None,
        })
    }

    pub fn with_source_file_name(mut self, file_name: Option<&str>) -> Self {
        self.source_file_name = normalize_optional(file_name);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn source_file_name(&self) -> Option<&str> {
        self.source_file_name.as_deref()
    }
}

/// Wire shape of [`NewProject`]; deserialization goes through
/// [`NewProject::new`] so a decoded request is validated like any other.
#[derive(Deserialize)]
struct NewProjectFields {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source_file_name: Option<String>,
}

impl TryFrom<NewProjectFields> for NewProject {
    type Error = ProjectError;

    fn try_from(fields: NewProjectFields) -> Result<Self, Self::Error> {
        Ok(NewProject::new(&fields.name, fields.description.as_deref())?
            .with_source_file_name(fields.source_file_name.as_deref()))
    }
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
