#[cfg(feature = "logging")]
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "logging")]
use tracing_appender::non_blocking::WorkerGuard;
#[cfg(feature = "logging")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "logging")]
static TRACING_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

#[cfg(feature = "logging")]
const DEFAULT_FILTER: &str = "info";

#[cfg(feature = "logging")]
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Debug builds log to stderr. Release builds run without a console and log to an hourly
/// rolling file under `./logs`.
#[cfg(feature = "logging")]
pub fn init_tracing() {
    let initialized = if cfg!(debug_assertions) {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_level(true)
            .with_target(true)
            .try_init()
            .is_ok()
    } else {
        let file_appender = tracing_appender::rolling::hourly("./logs", "output.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let ok = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_level(true)
            .with_target(true)
            .try_init()
            .is_ok();

        store_tracing_guard(guard);
        ok
    };

    if initialized {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "tracing initialized");
    }
}

#[cfg(feature = "logging")]
fn store_tracing_guard(guard: WorkerGuard) {
    *TRACING_GUARD
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some(guard);
}

#[cfg(not(feature = "logging"))]
pub fn init_tracing() {}
