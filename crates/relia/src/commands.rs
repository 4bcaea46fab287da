use std::sync::Arc;

use clap::ArgMatches;
use tracing::{error, info};

use relia_core::config::ReliaConfig;
use relia_core::events;
use relia_core::{
    Command, Event, IdentityProvider, OwnerId, ProjectId, ProjectStore, SessionIdentity, Store,
    StoreOptions, repository_from_config,
};

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> ReliaConfig {
    match ReliaConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.relia/config.toml and ./.relia/config.toml for syntax errors.",
                e
            );
            events::log_operation_failed("cli.config.load_failed", &e);
            ReliaConfig::default()
        }
    }
}

/// Mount a fresh store for this invocation and run its initial load.
async fn mount_store() -> Result<ProjectStore, Box<dyn std::error::Error>> {
    let config = load_config_with_warning();
    let repository = repository_from_config(&config)?;
    let identity: Arc<dyn IdentityProvider> = Arc::new(SessionIdentity::new(
        config.auth.user_id.as_deref().map(OwnerId::new),
    ));

    events::log_session_mounted(&config, identity.current_owner().as_ref());
    let store = ProjectStore::new(repository, identity, StoreOptions::from(&config.store));

    if let Err(e) = store.dispatch(Command::LoadProjects).await {
        eprintln!("Failed to load projects: {}", e);
        if matches!(
            e,
            relia_core::DispatchError::Project(relia_core::ProjectError::NotAuthenticated)
        ) {
            eprintln!("Tip: Set [auth] user_id in ~/.relia/config.toml or export RELIA_USER_ID.");
        }
        events::log_operation_failed("cli.load_failed", &e);
        close_store(&store);
        return Err(e.into());
    }

    Ok(store)
}

fn close_store(store: &ProjectStore) {
    let snapshot = store.snapshot();
    events::log_session_closed(snapshot.projects.len(), snapshot.show_onboarding);
}

pub async fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("list", sub_matches)) => handle_list_command(sub_matches).await,
        Some(("status", sub_matches)) => handle_status_command(sub_matches).await,
        Some(("create", sub_matches)) => handle_create_command(sub_matches).await,
        Some(("delete", sub_matches)) => handle_delete_command(sub_matches).await,
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

async fn handle_list_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    info!(event = "cli.list_started", json_output = json_output);

    let store = mount_store().await?;
    let projects = store.projects();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if projects.is_empty() {
        println!("No projects yet. Create one with `relia create <name>`.");
    } else {
        println!("Projects:");
        let current = store.current_project();
        let formatter = crate::table::TableFormatter::new(&projects);
        formatter.print_table(&projects, current.as_ref());
    }

    info!(event = "cli.list_completed", count = projects.len());
    close_store(&store);

    Ok(())
}

#[derive(serde::Serialize)]
struct StatusResponse {
    project_count: usize,
    current_project: Option<relia_core::Project>,
    show_onboarding: bool,
}

async fn handle_status_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    let store = mount_store().await?;
    let snapshot = store.snapshot();

    if json_output {
        let response = StatusResponse {
            project_count: snapshot.projects.len(),
            current_project: snapshot.current_project,
            show_onboarding: snapshot.show_onboarding,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("Projects:   {}", snapshot.projects.len());
        match &snapshot.current_project {
            Some(project) => println!("Current:    {} ({})", project.name(), project.id()),
            None => println!("Current:    none"),
        }
        println!(
            "Onboarding: {}",
            if snapshot.show_onboarding {
                "pending"
            } else {
                "done"
            }
        );
    }

    info!(
        event = "cli.status_completed",
        count = snapshot.projects.len()
    );
    close_store(&store);

    Ok(())
}

async fn handle_create_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("Name argument is required")?;
    let description = matches.get_one::<String>("description").cloned();
    let source_file_name = matches.get_one::<String>("source-file").cloned();

    info!(event = "cli.create_started", name = name.as_str());

    let store = mount_store().await?;

    let result = match store
        .dispatch(Command::CreateProject {
            name: name.clone(),
            description,
            source_file_name,
        })
        .await
    {
        Ok(emitted) => {
            for event in &emitted {
                if let Event::ProjectCreated { id, name } = event {
                    println!("Created project '{}' ({})", name, id);
                }
            }
            info!(event = "cli.create_completed");
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to create project: {}", e);
            events::log_operation_failed("cli.create_failed", &e);
            Err(e.into())
        }
    };

    close_store(&store);
    result
}

async fn handle_delete_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = matches
        .get_one::<String>("id")
        .ok_or("Id argument is required")?;
    let id = ProjectId::new(id.as_str());

    info!(event = "cli.delete_started", project_id = %id);

    let store = mount_store().await?;

    let result = match store
        .dispatch(Command::DeleteProject { id: id.clone() })
        .await
    {
        Ok(_) => {
            println!("Deleted project {}", id);
            if store.show_onboarding() {
                println!("No projects left. Create one with `relia create <name>`.");
            }
            info!(event = "cli.delete_completed", project_id = %id);
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to delete project '{}': {}", id, e);
            events::log_operation_failed("cli.delete_failed", &e);
            Err(e.into())
        }
    };

    close_store(&store);
    result
}
