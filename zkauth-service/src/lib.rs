#![deny(missing_docs)]
//! This crate implements the zkauth admission service.
//!
//! Transactions may authenticate with a zero-knowledge proof that the sender holds a valid
//! OIDC token, instead of a conventional signature. The service decides whether such
//! transactions may be included in a block.
//!
//! # Overview
//!
//! The service:
//! - Loads the Groth16 verification key of the zkauth circuit at startup
//! - Keeps the OIDC provider's signing keys fresh by fetching its JWK set periodically
//! - Rebuilds the public signal of every ZK-authenticated message and verifies its proof
//! - Derives account addresses from address seeds and issuers
//!
//! The main entry point is [`start`]. It serves the HTTP API until the provided shutdown signal
//! fires.
use std::sync::Arc;

use axum::extract::FromRef;
use eyre::Context as _;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use zkauth_core::IssuerAliases;

use crate::{
    config::ZkAuthServiceConfig,
    services::{
        admission::TxAdmissionGate,
        jwk_registry::{JwkRegistry, http::HttpJwkSource},
        proof_verifier::ProofVerifier,
    },
};

pub(crate) mod api;
pub mod config;
pub mod metrics;
pub mod services;
pub mod telemetry;

#[derive(Clone)]
pub(crate) struct AppState {
    gate: TxAdmissionGate,
    registry: JwkRegistry,
    aliases: Arc<IssuerAliases>,
}

impl FromRef<AppState> for TxAdmissionGate {
    fn from_ref(input: &AppState) -> Self {
        input.gate.clone()
    }
}

impl FromRef<AppState> for JwkRegistry {
    fn from_ref(input: &AppState) -> Self {
        input.registry.clone()
    }
}

impl FromRef<AppState> for Arc<IssuerAliases> {
    fn from_ref(input: &AppState) -> Self {
        Arc::clone(&input.aliases)
    }
}

/// Main entry point for the zkauth service.
///
/// Loads the verification key, fetches the provider's JWK set and starts:
/// - The Axum HTTP server for the API endpoints
/// - The periodic JWK refresh task
///
/// The function blocks until the shutdown signal is triggered or the server stops.
///
/// # Errors
/// Returns an error if:
/// - The verification key cannot be loaded
/// - The server cannot bind to the configured address
/// - The initial JWK fetch fails outside of the `dev` environment
pub async fn start(
    config: ZkAuthServiceConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> eyre::Result<()> {
    tracing::info!("starting zkauth-service with config: {config:#?}");

    tracing::info!("init proof verifier..");
    let verifier = ProofVerifier::load(&config.verification_key_path)
        .context("while loading verification key")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("while binding tcp listener")?;

    tracing::info!("init JWK registry..");
    let source = HttpJwkSource::new(config.jwk_provider_url.clone())?;
    let registry = JwkRegistry::new(Arc::new(source));

    let cancellation_token = spawn_shutdown_task(shutdown_signal);

    tracing::info!(
        "fetching initial JWK set from {}..",
        config.jwk_provider_url
    );
    if let Err(err) = registry
        .fetch(config.fetch_timeout, &cancellation_token)
        .await
    {
        if config.environment.is_dev() {
            tracing::warn!("starting without provider keys: {err}");
        } else {
            cancellation_token.cancel();
            return Err(err).context("while fetching initial JWK set");
        }
    }
    tracing::info!("registry knows {} provider keys", registry.len());

    tracing::info!(
        "starting JWK refresh task with interval: {}",
        humantime::format_duration(config.fetch_interval)
    );
    let refresh_task = registry.spawn_refresh_task(
        config.fetch_interval,
        config.fetch_timeout,
        cancellation_token.clone(),
    );

    let app_state = AppState {
        gate: TxAdmissionGate::new(registry.clone(), verifier),
        registry,
        aliases: Arc::new(IssuerAliases::with_aliases(config.issuer_aliases.clone())),
    };
    let router = api::routes(app_state);

    let axum_cancel_token = cancellation_token.clone();
    let server = tokio::spawn(async move {
        tracing::info!(
            "starting axum server on {}",
            listener
                .local_addr()
                .map(|x| x.to_string())
                .unwrap_or(String::from("invalid addr"))
        );
        let axum_shutdown_signal = axum_cancel_token.clone();
        let axum_result = axum::serve(listener, router)
            .with_graceful_shutdown(async move { axum_shutdown_signal.cancelled().await })
            .await;
        tracing::info!("axum server shutdown");
        if let Err(err) = axum_result {
            tracing::error!("got error from axum: {err:?}");
        }
        // axum may stop on its own, take the rest of the service with it
        axum_cancel_token.cancel();
    });

    tracing::info!("everything started successfully - now waiting for shutdown...");
    cancellation_token.cancelled().await;

    tracing::info!(
        "waiting for shutdown of services (max wait time {:?})..",
        config.max_wait_time_shutdown
    );
    match tokio::time::timeout(config.max_wait_time_shutdown, async move {
        tokio::join!(server, refresh_task)
    })
    .await
    {
        Ok(_) => tracing::info!("successfully finished shutdown in time"),
        Err(_) => tracing::warn!("could not finish shutdown in time"),
    }

    Ok(())
}

/// Spawns a task that cancels the returned token once `shutdown_signal` resolves.
///
/// Cancelling the token from inside the service ends the task as well.
pub fn spawn_shutdown_task(
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> CancellationToken {
    let cancellation_token = CancellationToken::new();
    let task_token = cancellation_token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_signal => {
                tracing::info!("Received EXTERNAL shutdown");
                task_token.cancel();
            }
            _ = task_token.cancelled() => {
                tracing::info!("Received INTERNAL shutdown");
            }
        }
    });
    cancellation_token
}

/// Returns cargo package name, cargo package version, and the git hash of the repository that
/// was used to build the binary.
pub fn version_info() -> String {
    format!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or(git_version::git_version!(fallback = "UNKNOWN"))
    )
}

/// The default shutdown signal for the zkauth-service. Triggered when pressing CTRL+C on most systems.
pub async fn default_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
