//! End-to-end behaviour of the project store against a scriptable backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use relia_core::projects::types::test_helpers::make_test_project;
use relia_core::{
    Event, IdentityProvider, LoadOutcome, NewProject, OwnerId, Project, ProjectError, ProjectId,
    ProjectRepository, ProjectStore, SessionIdentity, StoreOptions,
};
use tokio::sync::oneshot;

const OWNER: &str = "user-1";

/// A list call held open until the test releases it.
struct ListGate {
    started: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl ListGate {
    async fn wait_started(&mut self) {
        (&mut self.started).await.unwrap();
    }

    fn release(self) {
        let _ = self.release.send(());
    }
}

/// Backend whose responses, failures and timing are driven by the test.
///
/// A gated list call snapshots the records when it starts and returns that
/// snapshot when released, like a slow response from a remote service.
#[derive(Default)]
struct ScriptedRepository {
    records: Mutex<Vec<Project>>,
    next_ids: Mutex<VecDeque<&'static str>>,
    list_gates: Mutex<VecDeque<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
    list_failures: Mutex<VecDeque<ProjectError>>,
    create_failures: Mutex<VecDeque<ProjectError>>,
    delete_failures: Mutex<VecDeque<ProjectError>>,
    create_calls: AtomicUsize,
}

impl ScriptedRepository {
    fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            records: Mutex::new(projects),
            ..Self::default()
        }
    }

    fn gate_next_list(&self) -> ListGate {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.list_gates
            .lock()
            .unwrap()
            .push_back((started_tx, release_rx));
        ListGate {
            started: started_rx,
            release: release_tx,
        }
    }

    fn assign_next_id(&self, id: &'static str) {
        self.next_ids.lock().unwrap().push_back(id);
    }

    fn fail_next_list(&self, error: ProjectError) {
        self.list_failures.lock().unwrap().push_back(error);
    }

    fn fail_next_create(&self, error: ProjectError) {
        self.create_failures.lock().unwrap().push_back(error);
    }

    fn fail_next_delete(&self, error: ProjectError) {
        self.delete_failures.lock().unwrap().push_back(error);
    }

    /// Simulate a change made by another client.
    fn insert_remote(&self, project: Project) {
        self.records.lock().unwrap().insert(0, project);
    }

    fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProjectRepository for ScriptedRepository {
    async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>, ProjectError> {
        let failure = self.list_failures.lock().unwrap().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        let snapshot: Vec<Project> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.owner_id() == owner)
            .cloned()
            .collect();

        let gate = self.list_gates.lock().unwrap().pop_front();
        if let Some((started, release)) = gate {
            let _ = started.send(());
            let _ = release.await;
        }

        Ok(snapshot)
    }

    async fn create_project(
        &self,
        owner: &OwnerId,
        request: &NewProject,
    ) -> Result<Project, ProjectError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.create_failures.lock().unwrap().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        let id = self
            .next_ids
            .lock()
            .unwrap()
            .pop_front()
            .map(ProjectId::from)
            .unwrap_or_else(ProjectId::generate);
        let project = make_test_project(id.as_str(), request.name(), owner.as_str());
        self.records.lock().unwrap().insert(0, project.clone());
        Ok(project)
    }

    async fn delete_project(&self, owner: &OwnerId, id: &ProjectId) -> Result<(), ProjectError> {
        let failure = self.delete_failures.lock().unwrap().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        let mut records = self.records.lock().unwrap();
        let index = records
            .iter()
            .position(|p| p.id() == id && p.owner_id() == owner)
            .ok_or_else(|| ProjectError::NotFound { id: id.clone() })?;
        records.remove(index);
        Ok(())
    }
}

struct Harness {
    repository: Arc<ScriptedRepository>,
    identity: Arc<SessionIdentity>,
    store: Arc<ProjectStore>,
}

fn harness_with(projects: Vec<Project>, options: StoreOptions) -> Harness {
    let repository = Arc::new(ScriptedRepository::with_projects(projects));
    let identity = Arc::new(SessionIdentity::signed_in(OWNER));
    let store = Arc::new(ProjectStore::new(
        repository.clone(),
        identity.clone() as Arc<dyn IdentityProvider>,
        options,
    ));
    Harness {
        repository,
        identity,
        store,
    }
}

fn harness(projects: Vec<Project>) -> Harness {
    harness_with(projects, StoreOptions::default())
}

fn project(id: &str) -> Project {
    make_test_project(id, &format!("Project {id}"), OWNER)
}

fn ids(projects: &[Project]) -> Vec<&str> {
    projects.iter().map(|p| p.id().as_str()).collect()
}

fn current_id(store: &ProjectStore) -> Option<String> {
    store.current_project().map(|p| p.id().to_string())
}

// --- Scenarios ---

#[tokio::test]
async fn scenario_empty_load_shows_onboarding() {
    let h = harness(Vec::new());
    assert!(h.store.is_loading());

    let outcome = h.store.load().await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied { count: 0 });
    assert!(h.store.show_onboarding());
    assert!(h.store.current_project().is_none());
    assert!(!h.store.is_loading());
}

#[tokio::test]
async fn scenario_create_first_project() {
    let h = harness(Vec::new());
    h.store.load().await.unwrap();
    h.repository.assign_next_id("p1");

    let created = h.store.create_project("Line A Study", None).await.unwrap();

    assert_eq!(created.id().as_str(), "p1");
    assert_eq!(created.name(), "Line A Study");
    assert_eq!(ids(&h.store.projects()), vec!["p1"]);
    assert_eq!(current_id(&h.store).as_deref(), Some("p1"));
    assert!(!h.store.show_onboarding());
}

#[tokio::test]
async fn scenario_delete_last_project() {
    let h = harness(Vec::new());
    h.store.load().await.unwrap();
    h.repository.assign_next_id("p1");
    h.store.create_project("Line A Study", None).await.unwrap();

    let mut reload = h.repository.gate_next_list();
    let store = h.store.clone();
    let delete = tokio::spawn(async move { store.delete_project(&ProjectId::new("p1")).await });

    reload.wait_started().await;
    assert!(h.store.current_project().is_none());
    assert!(h.store.projects().is_empty());

    reload.release();
    delete.await.unwrap().unwrap();

    assert!(h.store.projects().is_empty());
    assert!(h.store.show_onboarding());
    assert!(!h.store.is_loading());
}

#[tokio::test]
async fn scenario_refresh_preserves_selection() {
    let h = harness(vec![project("p1"), project("p2")]);
    h.store.load().await.unwrap();
    let p2 = h.store.projects()[1].clone();
    h.store.set_current_project(Some(&p2)).unwrap();

    h.store.load().await.unwrap();

    assert_eq!(ids(&h.store.projects()), vec!["p1", "p2"]);
    assert_eq!(current_id(&h.store).as_deref(), Some("p2"));
}

// --- Properties ---

#[tokio::test]
async fn empty_load_resets_prior_state() {
    let h = harness(vec![project("p1")]);
    h.store.load().await.unwrap();
    assert_eq!(current_id(&h.store).as_deref(), Some("p1"));

    h.repository.records.lock().unwrap().clear();
    h.store.load().await.unwrap();

    assert!(h.store.show_onboarding());
    assert!(h.store.current_project().is_none());
    assert!(h.store.projects().is_empty());
}

#[tokio::test]
async fn non_empty_load_after_empty_load_hides_onboarding() {
    let h = harness(Vec::new());
    h.store.load().await.unwrap();
    assert!(h.store.show_onboarding());

    // Created from another device between the two loads.
    h.repository.insert_remote(project("p1"));
    let outcome = h.store.load().await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied { count: 1 });
    assert!(!h.store.show_onboarding());
    assert_eq!(current_id(&h.store).as_deref(), Some("p1"));
}

#[tokio::test]
async fn load_selects_newest_when_nothing_current() {
    let h = harness(vec![project("p3"), project("p2"), project("p1")]);

    h.store.load().await.unwrap();

    assert_eq!(current_id(&h.store).as_deref(), Some("p3"));
    assert!(!h.store.show_onboarding());
}

#[tokio::test]
async fn load_replaces_vanished_selection_with_newest() {
    let h = harness(vec![project("p2"), project("p1")]);
    h.store.load().await.unwrap();
    let p1 = h.store.projects()[1].clone();
    h.store.set_current_project(Some(&p1)).unwrap();

    h.repository.records.lock().unwrap().retain(|p| p.id().as_str() != "p1");
    h.store.load().await.unwrap();

    assert_eq!(current_id(&h.store).as_deref(), Some("p2"));
}

#[tokio::test]
async fn blank_name_is_rejected_without_network_call() {
    let h = harness(vec![project("p1")]);
    h.store.load().await.unwrap();
    let before = h.store.snapshot();

    let result = h.store.create_project(" \t\n ", Some("ignored")).await;

    assert_eq!(result, Err(ProjectError::InvalidName));
    assert_eq!(h.repository.create_calls(), 0);
    assert_eq!(h.store.snapshot(), before);
}

#[tokio::test]
async fn create_clears_onboarding_even_if_shown() {
    let h = harness(vec![project("p1")]);
    h.store.load().await.unwrap();
    h.store.set_show_onboarding(true);

    h.store.create_project("Second", None).await.unwrap();

    assert!(!h.store.show_onboarding());
}

#[tokio::test]
async fn create_trims_name_and_blank_description() {
    let h = harness(Vec::new());
    h.store.load().await.unwrap();

    let created = h.store.create_project("  Pumps  ", Some("   ")).await.unwrap();

    assert_eq!(created.name(), "Pumps");
    assert_eq!(h.repository.create_calls(), 1);
}

#[tokio::test]
async fn deleting_current_clears_selection_before_reload_finishes() {
    let h = harness(vec![project("p2"), project("p1")]);
    h.store.load().await.unwrap();
    assert_eq!(current_id(&h.store).as_deref(), Some("p2"));

    let mut reload = h.repository.gate_next_list();
    let store = h.store.clone();
    let delete = tokio::spawn(async move { store.delete_project(&ProjectId::new("p2")).await });

    reload.wait_started().await;
    assert!(h.store.current_project().is_none());
    assert!(h.store.is_loading());

    reload.release();
    delete.await.unwrap().unwrap();

    assert_eq!(current_id(&h.store).as_deref(), Some("p1"));
    assert!(!h.store.is_loading());
}

#[tokio::test]
async fn back_to_back_loads_agree() {
    let h = harness(vec![project("p2"), project("p1")]);

    h.store.load().await.unwrap();
    let first = h.store.snapshot();
    h.store.load().await.unwrap();
    let second = h.store.snapshot();

    assert_eq!(first.projects, second.projects);
    assert_eq!(first.current_project, second.current_project);
}

// --- Ordering ---

#[tokio::test]
async fn slow_load_does_not_overwrite_newer_load() {
    let h = harness(vec![project("p1")]);

    let mut slow = h.repository.gate_next_list();
    let store = h.store.clone();
    let slow_load = tokio::spawn(async move { store.load().await });
    slow.wait_started().await;

    h.repository.insert_remote(project("p2"));
    let fast = h.store.load().await.unwrap();
    assert_eq!(fast, LoadOutcome::Applied { count: 2 });

    slow.release();
    let outcome = slow_load.await.unwrap().unwrap();

    assert_eq!(outcome, LoadOutcome::Discarded);
    assert_eq!(ids(&h.store.projects()), vec!["p2", "p1"]);
    assert_eq!(current_id(&h.store).as_deref(), Some("p2"));
    assert!(!h.store.is_loading());
}

#[tokio::test]
async fn load_started_before_create_does_not_drop_created_project() {
    let h = harness(Vec::new());

    let mut slow = h.repository.gate_next_list();
    let store = h.store.clone();
    let slow_load = tokio::spawn(async move { store.load().await });
    slow.wait_started().await;

    h.repository.assign_next_id("p1");
    h.store.create_project("Fresh", None).await.unwrap();

    slow.release();
    let outcome = slow_load.await.unwrap().unwrap();

    assert_eq!(outcome, LoadOutcome::Discarded);
    assert_eq!(ids(&h.store.projects()), vec!["p1"]);
    assert_eq!(current_id(&h.store).as_deref(), Some("p1"));
    assert!(!h.store.show_onboarding());
}

#[tokio::test]
async fn cancelled_load_still_clears_loading_flag() {
    let h = harness(Vec::new());

    let mut gate = h.repository.gate_next_list();
    let store = h.store.clone();
    let load = tokio::spawn(async move { store.load().await });
    gate.wait_started().await;
    assert!(h.store.is_loading());

    load.abort();
    assert!(load.await.unwrap_err().is_cancelled());

    assert!(!h.store.is_loading());
    assert!(h.store.projects().is_empty());
}

// --- Failures ---

#[tokio::test]
async fn failed_load_keeps_state_and_clears_loading() {
    let h = harness(vec![project("p1")]);
    h.store.load().await.unwrap();
    let before = h.store.snapshot();

    h.repository.fail_next_list(ProjectError::Transport {
        message: "timed out".to_string(),
    });
    let result = h.store.load().await;

    assert!(matches!(result, Err(ProjectError::Transport { .. })));
    assert_eq!(h.store.snapshot(), before);
}

#[tokio::test]
async fn failed_first_load_leaves_onboarding_hidden() {
    let h = harness(Vec::new());
    h.repository.fail_next_list(ProjectError::Persistence {
        message: "HTTP 500".to_string(),
    });

    assert!(h.store.load().await.is_err());

    assert!(!h.store.is_loading());
    assert!(!h.store.show_onboarding());
}

#[tokio::test]
async fn signed_out_operations_fail_without_state_change() {
    let h = harness(vec![project("p1")]);
    h.store.load().await.unwrap();
    let before = h.store.snapshot();
    h.identity.sign_out();

    assert_eq!(h.store.load().await, Err(ProjectError::NotAuthenticated));
    assert_eq!(
        h.store.create_project("New", None).await,
        Err(ProjectError::NotAuthenticated)
    );
    assert_eq!(
        h.store.delete_project(&ProjectId::new("p1")).await,
        Err(ProjectError::NotAuthenticated)
    );
    assert_eq!(h.repository.create_calls(), 0);
    assert_eq!(h.store.snapshot(), before);
}

#[tokio::test]
async fn failed_create_changes_nothing() {
    let h = harness(Vec::new());
    h.store.load().await.unwrap();
    let before = h.store.snapshot();

    h.repository.fail_next_create(ProjectError::Persistence {
        message: "HTTP 409".to_string(),
    });
    let result = h.store.create_project("Dup", None).await;

    assert!(matches!(result, Err(ProjectError::Persistence { .. })));
    assert_eq!(h.store.snapshot(), before);
    assert!(h.store.show_onboarding());
}

#[tokio::test]
async fn failed_delete_changes_nothing() {
    let h = harness(vec![project("p1")]);
    h.store.load().await.unwrap();
    let before = h.store.snapshot();

    h.repository.fail_next_delete(ProjectError::Transport {
        message: "connection reset".to_string(),
    });
    let result = h.store.delete_project(&ProjectId::new("p1")).await;

    assert!(matches!(result, Err(ProjectError::Transport { .. })));
    assert_eq!(h.store.snapshot(), before);
}

#[tokio::test]
async fn failed_reload_after_delete_keeps_local_removal() {
    let h = harness(vec![project("p2"), project("p1")]);
    h.store.load().await.unwrap();

    h.repository.fail_next_list(ProjectError::Transport {
        message: "timed out".to_string(),
    });
    let result = h.store.delete_project(&ProjectId::new("p2")).await;

    assert!(matches!(result, Err(ProjectError::Transport { .. })));
    assert_eq!(ids(&h.store.projects()), vec!["p1"]);
    assert!(h.store.current_project().is_none());
    assert!(!h.store.is_loading());
}

#[tokio::test]
async fn deleting_unknown_project_is_not_found() {
    let h = harness(vec![project("p1")]);
    h.store.load().await.unwrap();

    let result = h.store.delete_project(&ProjectId::new("missing")).await;

    assert!(matches!(result, Err(ProjectError::NotFound { .. })));
    assert_eq!(ids(&h.store.projects()), vec!["p1"]);
}

// --- Local reconciliation ---

#[tokio::test]
async fn delete_without_reload_makes_no_list_call() {
    let h = harness_with(
        vec![project("p2"), project("p1")],
        StoreOptions {
            reload_after_delete: false,
        },
    );
    h.store.load().await.unwrap();

    // A list call would fail; local reconciliation must not make one.
    h.repository.fail_next_list(ProjectError::Transport {
        message: "unreachable".to_string(),
    });
    h.store.delete_project(&ProjectId::new("p2")).await.unwrap();

    assert_eq!(ids(&h.store.projects()), vec!["p1"]);
    assert_eq!(current_id(&h.store).as_deref(), Some("p1"));
}

// --- Events ---

#[tokio::test]
async fn subscribers_see_lifecycle_in_commit_order() {
    let h = harness(Vec::new());
    let mut events = h.store.subscribe();

    h.store.load().await.unwrap();
    h.repository.assign_next_id("p1");
    h.store.create_project("Line A Study", None).await.unwrap();
    h.store.delete_project(&ProjectId::new("p1")).await.unwrap();

    let p1 = ProjectId::new("p1");
    let expected = vec![
        Event::ProjectsLoaded { count: 0 },
        Event::OnboardingChanged { visible: true },
        Event::ProjectCreated {
            id: p1.clone(),
            name: "Line A Study".to_string(),
        },
        Event::CurrentProjectChanged {
            id: Some(p1.clone()),
        },
        Event::OnboardingChanged { visible: false },
        Event::ProjectDeleted { id: p1 },
        Event::CurrentProjectChanged { id: None },
        Event::ProjectsLoaded { count: 0 },
        Event::OnboardingChanged { visible: true },
    ];

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(received, expected);
}

#[tokio::test]
async fn manual_selection_and_onboarding_are_local() {
    let h = harness(vec![project("p2"), project("p1")]);
    h.store.load().await.unwrap();
    let mut events = h.store.subscribe();

    let p1 = h.store.projects()[1].clone();
    h.store.set_current_project(Some(&p1)).unwrap();
    h.store.set_show_onboarding(true);
    h.store.set_show_onboarding(false);

    assert_eq!(
        events.try_recv().unwrap(),
        Event::CurrentProjectChanged {
            id: Some(ProjectId::new("p1"))
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        Event::OnboardingChanged { visible: true }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        Event::OnboardingChanged { visible: false }
    );
    assert!(events.try_recv().is_err());
}
