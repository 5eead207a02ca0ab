//! Metrics emitted by the zkauth service.
//!
//! No exporter is installed by this crate, the embedding binary decides where they go.

/// Transactions accepted by the admission gate.
pub const METRICS_ADMISSION_ACCEPTED: &str = "zkauth.admission.accepted";
/// Transactions rejected by the admission gate, labeled with [`METRICS_LABEL_REASON`].
pub const METRICS_ADMISSION_REJECTED: &str = "zkauth.admission.rejected";
/// Successful fetches of the provider's JWK set.
pub const METRICS_JWK_FETCH_SUCCESS: &str = "zkauth.jwk.fetch.success";
/// Failed or cancelled fetches of the provider's JWK set.
pub const METRICS_JWK_FETCH_FAILURE: &str = "zkauth.jwk.fetch.failure";
/// Number of provider keys in the registry.
pub const METRICS_JWK_KEYS: &str = "zkauth.jwk.keys";

/// Label holding the reject reason code.
pub const METRICS_LABEL_REASON: &str = "reason";

/// Describe all metrics used by the service.
///
/// This calls the `describe_*` functions from the `metrics` crate to set metadata on the different metrics.
pub fn describe_metrics() {
    metrics::describe_counter!(
        METRICS_ADMISSION_ACCEPTED,
        metrics::Unit::Count,
        "Number of transactions accepted by the admission gate"
    );
    metrics::describe_counter!(
        METRICS_ADMISSION_REJECTED,
        metrics::Unit::Count,
        "Number of transactions rejected by the admission gate"
    );
    metrics::describe_counter!(
        METRICS_JWK_FETCH_SUCCESS,
        metrics::Unit::Count,
        "Number of successful JWK set fetches"
    );
    metrics::describe_counter!(
        METRICS_JWK_FETCH_FAILURE,
        metrics::Unit::Count,
        "Number of failed JWK set fetches"
    );
    metrics::describe_gauge!(
        METRICS_JWK_KEYS,
        metrics::Unit::Count,
        "Number of provider keys known to the registry"
    );
}
