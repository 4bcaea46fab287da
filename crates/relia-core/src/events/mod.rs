//! Session-level log events.
//!
//! Hosts emit these around a mounted [`ProjectStore`](crate::ProjectStore);
//! the store uses [`log_operation_failed`] for its own failures so every
//! failure line carries the same `error_code` field.

use tracing::{error, info, warn};

use crate::config::ReliaConfig;
use crate::errors::ReliaError;
use crate::projects::OwnerId;

/// A session was mounted against the configured backend.
pub fn log_session_mounted(config: &ReliaConfig, owner: Option<&OwnerId>) {
    let backend = config
        .backend
        .kind()
        .map(|kind| kind.as_str())
        .unwrap_or("invalid");

    info!(
        event = "core.session.mount_completed",
        version = env!("CARGO_PKG_VERSION"),
        backend = backend,
        signed_in = owner.is_some(),
        reload_after_delete = config.store.reload_after_delete()
    );
}

/// A session was dropped by its host.
pub fn log_session_closed(project_count: usize, show_onboarding: bool) {
    info!(
        event = "core.session.close_completed",
        project_count = project_count,
        show_onboarding = show_onboarding
    );
}

/// Log a failed operation. User errors are warnings; everything else is an
/// error.
pub fn log_operation_failed(event: &'static str, error: &dyn ReliaError) {
    if error.is_user_error() {
        warn!(event = event, error = %error, error_code = error.error_code());
    } else {
        error!(event = event, error = %error, error_code = error.error_code());
    }
}
