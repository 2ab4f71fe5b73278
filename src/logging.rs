use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppError, AppResult};

/// Structured logs on stderr, filtered by `RUST_LOG` (default `warn`) so
/// command output on stdout stays machine-readable.
pub fn init() -> AppResult<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| AppError::Configuration(format!("failed to initialize tracing: {err}")))
}
