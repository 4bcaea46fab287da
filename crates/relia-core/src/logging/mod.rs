use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Extra filter directives, e.g. `RELIA_LOG=relia_core::persistence=debug`.
pub const LOG_ENV: &str = "RELIA_LOG";

/// Build the filter directives for a session.
///
/// The base level covers both `relia` and `relia_core` targets: errors only
/// when `quiet`, info otherwise. Directives from `overrides` are appended so
/// a more specific target can be raised or lowered.
pub fn filter_directives(quiet: bool, overrides: Option<&str>) -> String {
    let base = if quiet { "relia=error" } else { "relia=info" };
    match overrides.map(str::trim).filter(|extra| !extra.is_empty()) {
        Some(extra) => format!("{base},{extra}"),
        None => base.to_string(),
    }
}

/// Initialize JSON logging to stderr.
///
/// An unparsable `RELIA_LOG` is reported once on stderr and ignored. Calling
/// this twice keeps the first subscriber.
pub fn init_logging(quiet: bool) {
    let overrides = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(quiet, overrides.as_deref());

    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Warning: ignoring {LOG_ENV} ({e}).");
        EnvFilter::new(filter_directives(quiet, None))
    });

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .try_init();
}
