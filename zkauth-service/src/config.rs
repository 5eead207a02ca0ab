//! Configuration types and CLI/environment parsing for the zkauth service.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use zkauth_core::IssuerAlias;
use zkauth_types::Params;

/// The environment the service is running in.
///
/// Behavior intended for `dev` only (like starting without a reachable provider) checks
/// [`Environment::is_dev`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Production environment.
    Prod,
    /// Development environment.
    Dev,
}

impl Environment {
    /// Returns `true` for the `dev` environment.
    pub fn is_dev(&self) -> bool {
        matches!(self, Environment::Dev)
    }
}

/// The configuration of the zkauth service.
///
/// It can be configured via environment variables or command line arguments using `clap`.
#[derive(Parser, Debug, Clone)]
pub struct ZkAuthServiceConfig {
    /// The environment of the zkauth service (either `prod` or `dev`).
    #[clap(long, env = "ZKAUTH_SERVICE_ENVIRONMENT", default_value = "prod")]
    pub environment: Environment,

    /// The bind addr of the AXUM server
    #[clap(long, env = "ZKAUTH_SERVICE_BIND_ADDR", default_value = "0.0.0.0:4321")]
    pub bind_addr: SocketAddr,

    /// The URL of the OIDC provider's JWK set.
    #[clap(
        long,
        env = "ZKAUTH_SERVICE_JWK_PROVIDER_URL",
        default_value = "https://www.googleapis.com/oauth2/v3/certs"
    )]
    pub jwk_provider_url: String,

    /// Interval between two fetches of the provider's JWK set.
    #[clap(
        long,
        env = "ZKAUTH_SERVICE_FETCH_INTERVAL",
        default_value = "1h",
        value_parser = humantime::parse_duration
    )]
    pub fetch_interval: Duration,

    /// Max time a single fetch of the JWK set may take.
    #[clap(
        long,
        env = "ZKAUTH_SERVICE_FETCH_TIMEOUT",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    pub fetch_timeout: Duration,

    /// The location of the snarkjs `verification_key.json` of the zkauth circuit.
    #[clap(long, env = "ZKAUTH_SERVICE_VERIFICATION_KEY_PATH")]
    pub verification_key_path: PathBuf,

    /// Additional issuer aliases as `alias=canonical`.
    ///
    /// `accounts.google.com=https://accounts.google.com` is always present.
    #[clap(
        long = "issuer-alias",
        env = "ZKAUTH_SERVICE_ISSUER_ALIASES",
        value_delimiter = ','
    )]
    pub issuer_aliases: Vec<IssuerAlias>,

    /// Max wait time the service waits for its workers during shutdown.
    #[clap(
        long,
        env = "ZKAUTH_SERVICE_MAX_WAIT_TIME_SHUTDOWN",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    pub max_wait_time_shutdown: Duration,
}

impl ZkAuthServiceConfig {
    /// The persisted module parameters this configuration corresponds to.
    pub fn params(&self) -> Params {
        Params {
            fetch_interval_secs: self.fetch_interval.as_secs(),
        }
    }
}
