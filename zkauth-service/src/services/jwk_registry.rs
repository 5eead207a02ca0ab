//! Registry of OIDC provider signing keys.
//!
//! The registry keeps an immutable snapshot `kid -> ProviderKey` behind a lock. Readers clone
//! the `Arc` of the current snapshot and never wait for a fetch. A fetch builds a new snapshot
//! from the old one and swaps it in.
//!
//! Merging is first-write-wins and keys are never evicted. A failed fetch leaves the snapshot
//! untouched, so admission keeps working with the last known keys.
//!
//! Current [`JwkSource`] implementations:
//! - http (fetches the JWK set with `reqwest`)
//! - test (serves a switchable in-memory JWK set)

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use zkauth_types::jwk::{JwkSet, ProviderKey};

use crate::metrics::{METRICS_JWK_FETCH_FAILURE, METRICS_JWK_FETCH_SUCCESS, METRICS_JWK_KEYS};

pub mod http;

/// Dyn trait for the key source. Must be `Send` + `Sync` to work with Axum.
pub type JwkSourceService = Arc<dyn JwkSource + Send + Sync>;

type Snapshot = Arc<HashMap<String, ProviderKey>>;

/// A source of the provider's current JWK set.
#[async_trait]
pub trait JwkSource {
    /// Loads the current JWK set.
    async fn fetch_jwk_set(&self) -> eyre::Result<JwkSet>;
}

/// Errors returned by [`JwkRegistry::fetch`].
#[derive(Debug, thiserror::Error)]
pub enum JwkRegistryError {
    /// The fetch did not finish within the timeout.
    #[error("fetching JWK set timed out after {0:?}")]
    Timeout(Duration),
    /// The fetch was cancelled.
    #[error("fetching JWK set was cancelled")]
    Cancelled,
    /// The source failed.
    #[error(transparent)]
    Source(#[from] eyre::Report),
}

/// The key registry. Cheap to clone, all clones share the snapshot.
#[derive(Clone)]
pub struct JwkRegistry {
    source: JwkSourceService,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl JwkRegistry {
    /// Creates an empty registry fetching from `source`.
    pub fn new(source: JwkSourceService) -> Self {
        Self {
            source,
            snapshot: Arc::default(),
        }
    }

    /// Returns the key with the given id.
    pub fn get(&self, kid: &str) -> Option<ProviderKey> {
        self.snapshot.read().get(kid).cloned()
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<HashMap<String, ProviderKey>> {
        Arc::clone(&self.snapshot.read())
    }

    /// Returns the ids of all known keys, sorted.
    pub fn list_kids(&self) -> Vec<String> {
        let mut kids = self.snapshot().keys().cloned().collect::<Vec<_>>();
        kids.sort();
        kids
    }

    /// Number of known keys.
    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    /// Returns `true` if no key is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merges `keys` into the registry and returns how many were new.
    ///
    /// A kid that is already known keeps its key.
    pub fn insert_keys(&self, keys: impl IntoIterator<Item = ProviderKey>) -> usize {
        let mut snapshot = self.snapshot.write();
        let mut next = HashMap::clone(&snapshot);
        let mut added = 0;
        for key in keys {
            match next.entry(key.kid.clone()) {
                Entry::Occupied(existing) if existing.get() != &key => {
                    tracing::warn!("provider re-issued kid {} - keeping first key", key.kid);
                }
                Entry::Occupied(_) => {
                    tracing::trace!("kid {} already known", key.kid);
                }
                Entry::Vacant(vacant) => {
                    tracing::debug!("new provider key: {}", key.kid);
                    vacant.insert(key);
                    added += 1;
                }
            }
        }
        if added > 0 {
            *snapshot = Arc::new(next);
        }
        metrics::gauge!(METRICS_JWK_KEYS).set(snapshot.len() as f64);
        added
    }

    /// Fetches the JWK set from the source and merges the usable keys.
    ///
    /// Returns the number of newly added keys. Entries that are not usable RSA keys are
    /// skipped. On failure the registry is left untouched.
    #[instrument(level = "debug", skip_all)]
    pub async fn fetch(
        &self,
        timeout: Duration,
        cancellation_token: &CancellationToken,
    ) -> Result<usize, JwkRegistryError> {
        let result = tokio::select! {
            _ = cancellation_token.cancelled() => Err(JwkRegistryError::Cancelled),
            fetched = tokio::time::timeout(timeout, self.source.fetch_jwk_set()) => match fetched {
                Ok(Ok(set)) => Ok(set),
                Ok(Err(err)) => Err(JwkRegistryError::Source(err)),
                Err(_) => Err(JwkRegistryError::Timeout(timeout)),
            },
        };
        let set = match result {
            Ok(set) => set,
            Err(err) => {
                tracing::warn!("could not fetch JWK set: {err:?}");
                metrics::counter!(METRICS_JWK_FETCH_FAILURE).increment(1);
                return Err(err);
            }
        };
        let keys = set
            .keys
            .into_iter()
            .filter_map(|jwk| {
                ProviderKey::try_from(jwk)
                    .inspect_err(|err| tracing::debug!("skipping JWK: {err}"))
                    .ok()
            })
            .collect::<Vec<_>>();
        let added = self.insert_keys(keys);
        metrics::counter!(METRICS_JWK_FETCH_SUCCESS).increment(1);
        tracing::debug!("fetched JWK set, {added} new keys, {} total", self.len());
        Ok(added)
    }

    /// Spawns a task that fetches once per `interval` until `cancellation_token` is cancelled.
    ///
    /// The first fetch happens one interval after spawning. Ticks missed while a fetch is
    /// running are skipped.
    pub fn spawn_refresh_task(
        &self,
        interval: Duration,
        timeout: Duration,
        cancellation_token: CancellationToken,
    ) -> JoinHandle<()> {
        let registry = self.clone();
        let mut interval =
            tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // failures are logged in fetch, the old snapshot stays in place
                        let _ = registry.fetch(timeout, &cancellation_token).await;
                    }
                    _ = cancellation_token.cancelled() => {
                        tracing::info!("stopping JWK refresh task");
                        break;
                    }
                }
            }
        })
    }
}
