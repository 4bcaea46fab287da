//! PostgREST-style HTTP backend.
//!
//! Talks to a `projects` table exposed under `{base_url}/rest/v1/projects`.
//! The server assigns ids, timestamps and the owner (from the bearer token);
//! the client filters by owner when listing so a shared service key never
//! leaks other users' records.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};

use super::ports::ProjectRepository;
use crate::projects::{NewProject, OwnerId, Project, ProjectError, ProjectId};

const PROJECTS_PATH: &str = "rest/v1/projects";

/// Connection settings for [`RestProjectRepository`].
#[derive(Debug, Clone)]
pub struct RestSettings {
    pub base_url: String,
    /// Public API key sent as `apikey` header.
    pub api_key: Option<String>,
    /// User access token; falls back to the API key when absent.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

pub struct RestProjectRepository {
    client: reqwest::Client,
    settings: RestSettings,
}

impl RestProjectRepository {
    /// # Errors
    ///
    /// Returns `ProjectError::Transport` if the HTTP client cannot be built.
    pub fn new(settings: RestSettings) -> Result<Self, ProjectError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProjectError::Transport {
                message: format!("build http client: {e}"),
            })?;

        Ok(Self { client, settings })
    }

    fn projects_url(&self) -> String {
        format!(
            "{}/{PROJECTS_PATH}",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match &self.settings.api_key {
            Some(key) => builder.header("apikey", key),
            None => builder,
        };
        match self
            .settings
            .access_token
            .as_ref()
            .or(self.settings.api_key.as_ref())
        {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn list_request(&self, owner: &OwnerId) -> RequestBuilder {
        let builder = self.client.get(self.projects_url()).query(&[
            ("select", "*".to_string()),
            ("owner_id", format!("eq.{owner}")),
            ("order", "created_at.desc".to_string()),
        ]);
        self.authorize(builder)
    }

    fn create_request(&self, request: &NewProject) -> RequestBuilder {
        let builder = self
            .client
            .post(self.projects_url())
            .header("Prefer", "return=representation")
            .json(request);
        self.authorize(builder)
    }

    fn delete_request(&self, owner: &OwnerId, id: &ProjectId) -> RequestBuilder {
        let builder = self
            .client
            .delete(self.projects_url())
            .header("Prefer", "return=representation")
            .query(&[
                ("id", format!("eq.{id}")),
                ("owner_id", format!("eq.{owner}")),
            ]);
        self.authorize(builder)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        action: &str,
    ) -> Result<Vec<Project>, ProjectError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| send_error(&e, action))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                event = "core.persistence.rest_request_rejected",
                action = action,
                status = status.as_u16()
            );
            return Err(status_error(status, &body, action));
        }

        resp.json::<Vec<Project>>()
            .await
            .map_err(|e| ProjectError::Persistence {
                message: format!("{action}: parse response: {e}"),
            })
    }
}

#[async_trait::async_trait]
impl ProjectRepository for RestProjectRepository {
    async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>, ProjectError> {
        self.send(self.list_request(owner), "list projects").await
    }

    async fn create_project(
        &self,
        _owner: &OwnerId,
        request: &NewProject,
    ) -> Result<Project, ProjectError> {
        let mut rows = self
            .send(self.create_request(request), "create project")
            .await?;
        if rows.is_empty() {
            return Err(ProjectError::Persistence {
                message: "create project: empty representation".to_string(),
            });
        }
        Ok(rows.swap_remove(0))
    }

    async fn delete_project(&self, owner: &OwnerId, id: &ProjectId) -> Result<(), ProjectError> {
        let rows = self
            .send(self.delete_request(owner, id), "delete project")
            .await?;
        if rows.is_empty() {
            return Err(ProjectError::NotFound { id: id.clone() });
        }
        Ok(())
    }
}

/// Classify a failure to get any HTTP response at all.
fn send_error(error: &reqwest::Error, action: &str) -> ProjectError {
    if error.is_decode() || error.is_builder() {
        ProjectError::Persistence {
            message: format!("{action}: {error}"),
        }
    } else {
        ProjectError::Transport {
            message: format!("{action}: {error}"),
        }
    }
}

/// Classify a non-success HTTP status.
fn status_error(status: StatusCode, body: &str, action: &str) -> ProjectError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProjectError::NotAuthenticated,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ProjectError::Transport {
                message: format!("{action}: HTTP {status}"),
            }
        }
        _ => ProjectError::Persistence {
            message: format!("{action}: HTTP {status}: {body}"),
        },
    }
}
