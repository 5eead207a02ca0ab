//! Logging setup for the zkauth service binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Default filter if `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "zkauth_service=debug,info";

/// Installs a `tracing-subscriber` registry with human-readable formatting and a filter
/// from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
///
/// Fails if a global subscriber is already installed.
pub fn initialize_tracing() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_line_number(false),
        )
        .with(filter)
        .try_init()?;
    Ok(())
}
