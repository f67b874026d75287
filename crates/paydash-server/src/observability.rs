// Tracing initialization with a configurable and reloadable log level.
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();

/// Picks the filter directive: a usable `RUST_LOG` wins over `configured`.
fn select_directive<'a>(rust_log: Option<&'a str>, configured: &'a str) -> &'a str {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() && EnvFilter::try_new(directive).is_ok() => {
            directive
        }
        _ => configured,
    }
}

fn rust_log() -> Option<String> {
    std::env::var("RUST_LOG").ok()
}

pub fn init_tracing() {
    init_tracing_with_level("info");
}

pub fn init_tracing_with_level(level: &str) {
    let rust_log = rust_log();
    let base_filter = EnvFilter::new(select_directive(rust_log.as_deref(), level));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer())
        .try_init();
}

/// Apply a new logging level at runtime if the reload handle is configured.
pub fn apply_logging_level(level: &str) {
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|f| {
            *f = EnvFilter::new(level);
        });
    }
}

/// Apply the `logging.level` setting unless `RUST_LOG` overrides it.
pub fn apply_configured_level(level: &str) {
    let rust_log = rust_log();
    apply_logging_level(select_directive(rust_log.as_deref(), level));
}
