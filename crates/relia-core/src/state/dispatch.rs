use tracing::{debug, error, info, warn};

use crate::errors::ReliaError;
use crate::projects::NewProject;
use crate::state::errors::DispatchError;
use crate::state::events::Event;
use crate::state::project_store::ProjectStore;
use crate::state::store::Store;
use crate::state::types::Command;

/// Routes commands to the project store's operations.
///
/// Every event returned here was also published to subscribers, in the
/// same order.
#[async_trait::async_trait]
impl Store for ProjectStore {
    type Error = DispatchError;

    async fn dispatch(&self, cmd: Command) -> Result<Vec<Event>, DispatchError> {
        debug!(event = "core.state.dispatch_started", command = ?cmd);

        let result: Result<Vec<Event>, DispatchError> = match cmd {
            Command::LoadProjects => self
                .load_with_events()
                .await
                .map(|(_, events)| events)
                .map_err(DispatchError::from),
            Command::CreateProject {
                name,
                description,
                source_file_name,
            } => match NewProject::new(&name, description.as_deref()) {
                Ok(request) => self
                    .create_with_events(request.with_source_file_name(source_file_name.as_deref()))
                    .await
                    .map(|(_, events)| events)
                    .map_err(DispatchError::from),
                Err(e) => Err(e.into()),
            },
            Command::DeleteProject { id } => self
                .delete_with_events(&id)
                .await
                .map_err(DispatchError::from),
            Command::SelectProject { id } => self
                .select_with_events(id.as_ref())
                .map_err(DispatchError::from),
            Command::SetOnboarding { visible } => Ok(self.set_onboarding_with_events(visible)),
        };

        match &result {
            Ok(events) => info!(
                event = "core.state.dispatch_completed",
                event_count = events.len()
            ),
            Err(e) if e.is_user_error() => warn!(
                event = "core.state.dispatch_failed",
                error = %e,
                error_code = e.error_code()
            ),
            Err(e) => error!(
                event = "core.state.dispatch_failed",
                error = %e,
                error_code = e.error_code()
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identity::SessionIdentity;
    use crate::persistence::InMemoryProjectRepository;
    use crate::projects::types::test_helpers::make_test_project;
    use crate::projects::{ProjectError, ProjectId};
    use crate::state::StoreOptions;

    fn store(projects: Vec<crate::projects::Project>) -> ProjectStore {
        ProjectStore::new(
            Arc::new(InMemoryProjectRepository::with_projects(projects)),
            Arc::new(SessionIdentity::signed_in("user-1")),
            StoreOptions::default(),
        )
    }

    #[test]
    fn test_project_store_implements_store_trait() {
        fn assert_store<T: Store>(_s: &T) {}
        assert_store(&store(Vec::new()));
    }

    #[tokio::test]
    async fn test_dispatch_load_projects() {
        let store = store(vec![make_test_project("p1", "A", "user-1")]);

        let events = store.dispatch(Command::LoadProjects).await.unwrap();

        assert_eq!(
            events,
            vec![
                Event::ProjectsLoaded { count: 1 },
                Event::CurrentProjectChanged {
                    id: Some(ProjectId::new("p1"))
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_create_carries_source_file_name() {
        let store = store(Vec::new());
        store.dispatch(Command::LoadProjects).await.unwrap();

        store
            .dispatch(Command::CreateProject {
                name: "Line A Study".to_string(),
                description: None,
                source_file_name: Some("line-a.xlsx".to_string()),
            })
            .await
            .unwrap();

        let current = store.current_project().unwrap();
        assert_eq!(current.source_file_name(), Some("line-a.xlsx"));
    }

    #[tokio::test]
    async fn test_dispatch_create_rejects_blank_name() {
        let store = store(Vec::new());

        let result = store
            .dispatch(Command::CreateProject {
                name: "   ".to_string(),
                description: None,
                source_file_name: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(DispatchError::Project(ProjectError::InvalidName))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_delete_reloads() {
        let store = store(vec![
            make_test_project("p2", "B", "user-1"),
            make_test_project("p1", "A", "user-1"),
        ]);
        store.dispatch(Command::LoadProjects).await.unwrap();

        let events = store
            .dispatch(Command::DeleteProject {
                id: ProjectId::new("p2"),
            })
            .await
            .unwrap();

        assert_eq!(
            events,
            vec![
                Event::ProjectDeleted {
                    id: ProjectId::new("p2")
                },
                Event::CurrentProjectChanged { id: None },
                Event::ProjectsLoaded { count: 1 },
                Event::CurrentProjectChanged {
                    id: Some(ProjectId::new("p1"))
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_select_unknown_fails() {
        let store = store(Vec::new());

        let result = store
            .dispatch(Command::SelectProject {
                id: Some(ProjectId::new("missing")),
            })
            .await;

        assert!(matches!(
            result,
            Err(DispatchError::Project(ProjectError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_set_onboarding() {
        let store = store(Vec::new());

        let events = store
            .dispatch(Command::SetOnboarding { visible: true })
            .await
            .unwrap();

        assert_eq!(events, vec![Event::OnboardingChanged { visible: true }]);
        assert!(store.show_onboarding());
    }
}
