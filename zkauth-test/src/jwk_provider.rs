//! A mock OIDC provider serving a JWK set on `GET /certs`.
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use eyre::Context as _;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use zkauth_types::jwk::JwkSet;

#[derive(Clone, Default)]
struct ProviderState {
    keys: Arc<Mutex<JwkSet>>,
    failing: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
}

/// Handle to a running mock provider. The server stops when the handle is dropped.
pub struct MockJwkProvider {
    url: String,
    state: ProviderState,
    server: JoinHandle<()>,
}

impl MockJwkProvider {
    /// Binds a random local port and serves `keys`.
    pub async fn start(keys: JwkSet) -> eyre::Result<Self> {
        let state = ProviderState {
            keys: Arc::new(Mutex::new(keys)),
            ..Default::default()
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("while binding mock provider")?;
        let url = format!("http://{}/certs", listener.local_addr()?);
        let router = Router::new()
            .route("/certs", get(certs))
            .with_state(state.clone());
        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                tracing::error!("mock provider stopped: {err:?}");
            }
        });
        Ok(Self { url, state, server })
    }

    /// The URL of the JWK endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replaces the served key set.
    pub fn set_keys(&self, keys: JwkSet) {
        *self.state.keys.lock() = keys;
    }

    /// Makes the endpoint answer `500` while `failing` is set.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for MockJwkProvider {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn certs(State(state): State<ProviderState>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        (StatusCode::INTERNAL_SERVER_ERROR, "provider unavailable").into_response()
    } else {
        Json(state.keys.lock().clone()).into_response()
    }
}
