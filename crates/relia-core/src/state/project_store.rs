//! The project lifecycle coordinator.
//!
//! [`ProjectStore`] owns the user's project list, the current project and the
//! first-run onboarding flag, and is the only writer of that state. UI
//! collaborators read snapshots or subscribe to [`Event`]s and trigger
//! operations; they never mutate the list directly.
//!
//! # Concurrency
//!
//! Operations suspend only inside the persistence collaborator call. Each
//! one then commits under a single lock, so commits are serialized in
//! completion order and never interleave. The lock is never held across an
//! `.await`.
//!
//! Loads are guarded by a ticket. A load draws its ticket when it starts;
//! create and delete draw theirs when they commit. A finished load is
//! applied only if its ticket is newer than the last committed one, so a
//! slow response can never overwrite state that a later operation already
//! established.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info};

use super::events::Event;
use crate::config::StoreConfig;
use crate::events::log_operation_failed;
use crate::identity::IdentityProvider;
use crate::persistence::ProjectRepository;
use crate::projects::{NewProject, OwnerId, Project, ProjectCatalog, ProjectError, ProjectId};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Behaviour switches for [`ProjectStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Refetch the full list after every successful delete. When disabled,
    /// the store reconciles locally instead.
    pub reload_after_delete: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            reload_after_delete: true,
        }
    }
}

impl From<&StoreConfig> for StoreOptions {
    fn from(config: &StoreConfig) -> Self {
        Self {
            reload_after_delete: config.reload_after_delete(),
        }
    }
}

/// Owned read view of the store for UI collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectsSnapshot {
    pub projects: Vec<Project>,
    pub current_project: Option<Project>,
    pub is_loading: bool,
    pub show_onboarding: bool,
}

/// Result of a load that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched list replaced the local one.
    Applied { count: usize },
    /// A newer operation committed first; the fetched list was dropped.
    Discarded,
}

#[derive(Debug)]
struct SessionState {
    catalog: ProjectCatalog,
    show_onboarding: bool,
    /// Set until the first load settles; the first load is issued on mount.
    awaiting_first_load: bool,
    loads_in_flight: usize,
    last_ticket: u64,
    committed_ticket: u64,
}

/// Selection and onboarding as they were before a commit.
struct Observed {
    current: Option<ProjectId>,
    show_onboarding: bool,
}

impl SessionState {
    fn new() -> Self {
        Self {
            catalog: ProjectCatalog::new(),
            show_onboarding: false,
            awaiting_first_load: true,
            loads_in_flight: 0,
            last_ticket: 0,
            committed_ticket: 0,
        }
    }

    fn is_loading(&self) -> bool {
        self.awaiting_first_load || self.loads_in_flight > 0
    }

    fn issue_ticket(&mut self) -> u64 {
        self.last_ticket += 1;
        self.last_ticket
    }

    /// Record a mutation commit; older in-flight loads become stale.
    fn commit_mutation(&mut self) {
        self.committed_ticket = self.issue_ticket();
    }

    fn end_load(&mut self) {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
        self.awaiting_first_load = false;
    }

    fn observe(&self) -> Observed {
        Observed {
            current: self.catalog.current_id().cloned(),
            show_onboarding: self.show_onboarding,
        }
    }

    fn changes_since(&self, before: &Observed) -> Vec<Event> {
        let mut events = Vec::new();
        let current = self.catalog.current_id();
        if current != before.current.as_ref() {
            events.push(Event::CurrentProjectChanged {
                id: current.cloned(),
            });
        }
        if self.show_onboarding != before.show_onboarding {
            events.push(Event::OnboardingChanged {
                visible: self.show_onboarding,
            });
        }
        events
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-flight load. Dropping it without [`LoadSlot::release`] (the load
/// future was cancelled) still frees the slot so `is_loading` settles.
struct LoadSlot<'a> {
    state: &'a Mutex<SessionState>,
    released: bool,
}

impl LoadSlot<'_> {
    fn release(mut self, state: &mut SessionState) {
        state.end_load();
        self.released = true;
    }
}

impl Drop for LoadSlot<'_> {
    fn drop(&mut self) {
        if !self.released {
            lock(self.state).end_load();
            debug!(event = "core.store.load_abandoned");
        }
    }
}

/// Single source of truth for the signed-in user's projects.
pub struct ProjectStore {
    repository: Arc<dyn ProjectRepository>,
    identity: Arc<dyn IdentityProvider>,
    options: StoreOptions,
    state: Mutex<SessionState>,
    events: broadcast::Sender<Event>,
}

impl ProjectStore {
    /// Create the store for a freshly mounted session.
    ///
    /// The store starts empty with `is_loading() == true`; the mounting
    /// caller is expected to issue the first [`ProjectStore::load`].
    pub fn new(
        repository: Arc<dyn ProjectRepository>,
        identity: Arc<dyn IdentityProvider>,
        options: StoreOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            repository,
            identity,
            options,
            state: Mutex::new(SessionState::new()),
            events,
        }
    }

    /// Receive every event committed from now on, in commit order.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Projects, newest first.
    pub fn projects(&self) -> Vec<Project> {
        lock(&self.state).catalog.projects().to_vec()
    }

    pub fn current_project(&self) -> Option<Project> {
        lock(&self.state).catalog.current().cloned()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).is_loading()
    }

    pub fn show_onboarding(&self) -> bool {
        lock(&self.state).show_onboarding
    }

    /// All readable state, taken atomically.
    pub fn snapshot(&self) -> ProjectsSnapshot {
        let state = lock(&self.state);
        ProjectsSnapshot {
            projects: state.catalog.projects().to_vec(),
            current_project: state.catalog.current().cloned(),
            is_loading: state.is_loading(),
            show_onboarding: state.show_onboarding,
        }
    }

    /// Fetch the full project list for the signed-in user.
    ///
    /// On success the list is replaced; the current project is kept if it
    /// still exists, otherwise the newest project becomes current; the
    /// onboarding flag becomes "the list is empty". A result that lost the
    /// race to a newer commit is dropped and reported as
    /// [`LoadOutcome::Discarded`].
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without an identity, otherwise whatever the
    /// persistence collaborator reports. State is left untouched apart from
    /// the loading flag.
    pub async fn load(&self) -> Result<LoadOutcome, ProjectError> {
        self.load_with_events().await.map(|(outcome, _)| outcome)
    }

    /// Create a project named `name` and make it current.
    ///
    /// # Errors
    ///
    /// `InvalidName` for a blank name (no network call is made),
    /// `NotAuthenticated` without an identity, otherwise whatever the
    /// persistence collaborator reports. No state changes on failure.
    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, ProjectError> {
        let request = NewProject::new(name, description).inspect_err(|e| {
            log_operation_failed("core.store.create_failed", e);
        })?;
        self.create_project_with(request).await
    }

    /// Create a project from an already validated request.
    ///
    /// # Errors
    ///
    /// See [`ProjectStore::create_project`].
    pub async fn create_project_with(&self, request: NewProject) -> Result<Project, ProjectError> {
        self.create_with_events(request)
            .await
            .map(|(project, _)| project)
    }

    /// Delete a project remotely, drop it locally, then reconcile.
    ///
    /// If the deleted project was current, no project is current as soon as
    /// the delete commits; reconciliation may then pick another one.
    ///
    /// # Errors
    ///
    /// If the persistence collaborator fails, its error is returned and
    /// nothing changes locally. If the delete succeeds but the reconciling
    /// reload fails, the local removal stays and the reload error is returned.
    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), ProjectError> {
        self.delete_with_events(id).await.map(|_| ())
    }

    /// Change the current project without any network call.
    ///
    /// # Errors
    ///
    /// `NotFound` if the project is no longer in the list.
    pub fn set_current_project(&self, project: Option<&Project>) -> Result<(), ProjectError> {
        self.select_with_events(project.map(Project::id)).map(|_| ())
    }

    /// Override the onboarding flag (dialog dismissal or retry).
    pub fn set_show_onboarding(&self, visible: bool) {
        self.set_onboarding_with_events(visible);
    }

    fn owner(&self) -> Result<OwnerId, ProjectError> {
        self.identity
            .current_owner()
            .ok_or(ProjectError::NotAuthenticated)
    }

    fn publish(&self, events: &[Event]) {
        for event in events {
            // No subscribers is fine; snapshots remain authoritative.
            let _ = self.events.send(event.clone());
        }
    }

    fn begin_load(&self) -> (u64, LoadSlot<'_>) {
        let mut state = lock(&self.state);
        state.loads_in_flight += 1;
        let ticket = state.issue_ticket();
        (
            ticket,
            LoadSlot {
                state: &self.state,
                released: false,
            },
        )
    }

    pub(crate) async fn load_with_events(
        &self,
    ) -> Result<(LoadOutcome, Vec<Event>), ProjectError> {
        let (ticket, slot) = self.begin_load();
        debug!(event = "core.store.load_started", ticket = ticket);

        let result = match self.owner() {
            Ok(owner) => self.repository.list_projects(&owner).await,
            Err(e) => Err(e),
        };

        let mut state = lock(&self.state);
        slot.release(&mut state);

        let projects = result.inspect_err(|e| log_operation_failed("core.store.load_failed", e))?;

        if ticket <= state.committed_ticket {
            info!(
                event = "core.store.load_discarded",
                ticket = ticket,
                committed_ticket = state.committed_ticket
            );
            return Ok((LoadOutcome::Discarded, Vec::new()));
        }

        let before = state.observe();
        let count = projects.len();
        state.committed_ticket = ticket;
        state.catalog.replace_all(projects);
        state.show_onboarding = state.catalog.is_empty();

        let mut events = vec![Event::ProjectsLoaded { count }];
        events.extend(state.changes_since(&before));
        self.publish(&events);

        info!(
            event = "core.store.load_completed",
            ticket = ticket,
            count = count,
            show_onboarding = state.show_onboarding
        );

        Ok((LoadOutcome::Applied { count }, events))
    }

    pub(crate) async fn create_with_events(
        &self,
        request: NewProject,
    ) -> Result<(Project, Vec<Event>), ProjectError> {
        let owner = self.owner().inspect_err(|e| log_operation_failed("core.store.create_failed", e))?;
        debug!(event = "core.store.create_started", name = request.name());

        let project = self
            .repository
            .create_project(&owner, &request)
            .await
            .inspect_err(|e| log_operation_failed("core.store.create_failed", e))?;

        let mut state = lock(&self.state);
        let before = state.observe();
        state.commit_mutation();
        state.catalog.insert_newest(project.clone());
        state.show_onboarding = false;

        let mut events = vec![Event::ProjectCreated {
            id: project.id().clone(),
            name: project.name().to_string(),
        }];
        events.extend(state.changes_since(&before));
        self.publish(&events);

        info!(
            event = "core.store.create_completed",
            project_id = %project.id(),
            count = state.catalog.len()
        );

        Ok((project, events))
    }

    pub(crate) async fn delete_with_events(
        &self,
        id: &ProjectId,
    ) -> Result<Vec<Event>, ProjectError> {
        let owner = self.owner().inspect_err(|e| log_operation_failed("core.store.delete_failed", e))?;
        debug!(event = "core.store.delete_started", project_id = %id);

        self.repository
            .delete_project(&owner, id)
            .await
            .inspect_err(|e| log_operation_failed("core.store.delete_failed", e))?;

        let mut events = {
            let mut state = lock(&self.state);
            let before = state.observe();
            state.commit_mutation();
            state.catalog.remove(id);

            if !self.options.reload_after_delete {
                state.catalog.select_newest_if_unset();
                if state.catalog.is_empty() {
                    state.show_onboarding = true;
                }
            }

            let mut events = vec![Event::ProjectDeleted { id: id.clone() }];
            events.extend(state.changes_since(&before));
            self.publish(&events);

            info!(
                event = "core.store.delete_completed",
                project_id = %id,
                count = state.catalog.len()
            );
            events
        };

        if self.options.reload_after_delete {
            let (_, reload_events) = self.load_with_events().await?;
            events.extend(reload_events);
        }

        Ok(events)
    }

    pub(crate) fn select_with_events(
        &self,
        id: Option<&ProjectId>,
    ) -> Result<Vec<Event>, ProjectError> {
        let mut state = lock(&self.state);
        let before = state.observe();
        state
            .catalog
            .select(id)
            .inspect_err(|e| log_operation_failed("core.store.select_failed", e))?;

        let events = state.changes_since(&before);
        self.publish(&events);
        debug!(
            event = "core.store.selection_changed",
            project_id = ?state.catalog.current_id().map(ProjectId::as_str)
        );
        Ok(events)
    }

    pub(crate) fn set_onboarding_with_events(&self, visible: bool) -> Vec<Event> {
        let mut state = lock(&self.state);
        let before = state.observe();
        state.show_onboarding = visible;

        let events = state.changes_since(&before);
        self.publish(&events);
        events
    }
}
