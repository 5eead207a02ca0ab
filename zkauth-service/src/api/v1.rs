//! Version 1 (v1) API Routes
//!
//! - `POST /admit` – runs the admission gate on a transaction
//! - `POST /address` – derives the account address for a seed and issuer
//! - `GET /jwk` – lists the ids of all known provider keys
//! - `GET /jwk/{kid}` – returns a single provider key
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use eyre::Context as _;
use tracing::instrument;
use zkauth_core::IssuerAliases;
use zkauth_types::{
    api::v1::{
        Admission, AdmitRequest, DeriveAddressRequest, DeriveAddressResponse, JwkListResponse,
    },
    jwk::ProviderKey,
};

use crate::{
    AppState,
    api::errors::{ApiErrors, ApiResult},
    services::{admission::TxAdmissionGate, jwk_registry::JwkRegistry},
};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/admit", post(admit))
        .route("/address", post(derive_address))
        .route("/jwk", get(list_keys))
        .route("/jwk/{kid}", get(read_key))
}

/// Admission verifies pairings, so it runs on the blocking pool.
#[instrument(level = "debug", skip_all)]
async fn admit(
    State(gate): State<TxAdmissionGate>,
    Json(AdmitRequest { height, tx }): Json<AdmitRequest>,
) -> ApiResult<Json<Admission>> {
    let admission = tokio::task::spawn_blocking(move || gate.admit(height, &tx))
        .await
        .context("while running admission")?;
    Ok(Json(admission))
}

#[instrument(level = "debug", skip_all)]
async fn derive_address(
    State(aliases): State<Arc<IssuerAliases>>,
    Json(request): Json<DeriveAddressRequest>,
) -> ApiResult<Json<DeriveAddressResponse>> {
    let address = aliases.derive_address(&request.address_seed, &request.issuer)?;
    Ok(Json(DeriveAddressResponse { address }))
}

#[instrument(level = "debug", skip_all)]
async fn list_keys(State(registry): State<JwkRegistry>) -> ApiResult<Json<JwkListResponse>> {
    Ok(Json(JwkListResponse {
        kids: registry.list_kids(),
    }))
}

async fn read_key(
    State(registry): State<JwkRegistry>,
    Path(kid): Path<String>,
) -> ApiResult<Json<ProviderKey>> {
    let key = registry
        .get(&kid)
        .ok_or_else(|| ApiErrors::NotFound(format!("unknown kid: {kid}")))?;
    Ok(Json(key))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt as _;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt as _;
    use zkauth_test::{TestProver, ZkExecBuilder, fixtures};
    use zkauth_types::{AddressSeed, api::v1::RejectReason, jwk::JwkSet};

    use super::*;
    use crate::{
        api,
        services::{jwk_registry::test::TestJwkSource, proof_verifier::ProofVerifier},
    };

    fn app(prover: &TestProver) -> Router {
        let registry = JwkRegistry::new(Arc::new(TestJwkSource::new(JwkSet::default())));
        registry.insert_keys([ProviderKey::try_from(fixtures::google_jwk()).unwrap()]);
        let verifier = ProofVerifier::new(prover.verifying_key()).unwrap();
        api::routes(AppState {
            gate: TxAdmissionGate::new(registry.clone(), verifier),
            registry,
            aliases: Arc::new(IssuerAliases::default()),
        })
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    fn post_json(uri: &str, body: impl serde::Serialize) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn admit_accepts_and_rejects() {
        let prover = TestProver::new(11);
        let tx = ZkExecBuilder::default().signed_tx(&prover);

        let (status, body) = call(
            app(&prover),
            post_json(
                "/api/v1/admit",
                AdmitRequest {
                    height: 10,
                    tx: tx.clone(),
                },
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json::<Admission>(&body), Admission::Accept);

        let (status, body) = call(
            app(&prover),
            post_json("/api/v1/admit", AdmitRequest { height: 11, tx }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json::<serde_json::Value>(&body),
            serde_json::json!({"status": "reject", "reason": "expired_signature"})
        );
        assert_eq!(
            json::<Admission>(&body),
            Admission::Reject(RejectReason::ExpiredSignature)
        );
    }

    #[tokio::test]
    async fn derive_address_endpoint() {
        let prover = TestProver::new(12);
        let request = DeriveAddressRequest {
            address_seed: AddressSeed::new(fixtures::ADDRESS_SEED),
            issuer: "accounts.google.com".to_owned(),
        };
        let (status, body) = call(app(&prover), post_json("/api/v1/address", request)).await;
        assert_eq!(status, StatusCode::OK);
        let expected = zkauth_core::derive_address(
            &AddressSeed::new(fixtures::ADDRESS_SEED),
            fixtures::GOOGLE_ISSUER,
        )
        .unwrap();
        assert_eq!(json::<DeriveAddressResponse>(&body).address, expected);

        let request = DeriveAddressRequest {
            address_seed: AddressSeed::new(""),
            issuer: fixtures::GOOGLE_ISSUER.to_owned(),
        };
        let (status, _) = call(app(&prover), post_json("/api/v1/address", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn jwk_endpoints() {
        let prover = TestProver::new(13);
        let (status, body) = call(app(&prover), get("/api/v1/jwk")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json::<JwkListResponse>(&body).kids,
            vec![fixtures::GOOGLE_KID.to_owned()]
        );

        let (status, body) = call(app(&prover), get("/api/v1/jwk/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json::<ProviderKey>(&body).n, fixtures::GOOGLE_MODULUS);

        let (status, _) = call(app(&prover), get("/api/v1/jwk/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_and_info() {
        let prover = TestProver::new(14);
        let response = app(&prover).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"healthy");

        let (status, body) = call(app(&prover), get("/info")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().starts_with("zkauth-service "));
    }
}
