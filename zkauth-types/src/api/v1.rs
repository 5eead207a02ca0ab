//! # v1 API types
//!
//! Data transfer objects for the version 1 zkauth API: transaction admission, address
//! derivation and provider key inspection.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, AddressSeed, tx::Tx};

/// A request to run the admission gate on a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmitRequest {
    /// The height of the block the transaction is considered for.
    pub height: u64,
    /// The transaction.
    pub tx: Tx,
}

/// Stable reason codes for rejected transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The transaction does not expose per-message signer keys.
    UnsupportedTxShape,
    /// The number of messages and signer keys differ.
    SignerCountMismatch,
    /// The signature's max block height is below the current height.
    ExpiredSignature,
    /// The kid from the JWT header is not in the registry.
    UnknownSigningKey,
    /// The proof does not parse or does not verify.
    InvalidProof,
    /// The JWT header exceeds the maximum length.
    HeaderTooLong,
    /// The address seed is not a canonical field element.
    InvalidAddressSeed,
    /// Issuer, header or signer key cannot be decoded or encoded.
    MalformedInputs,
    /// The stored provider modulus cannot be used.
    InvalidProviderKey,
}

impl RejectReason {
    /// Returns the reason code as used on the wire and in metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::UnsupportedTxShape => "unsupported_tx_shape",
            RejectReason::SignerCountMismatch => "signer_count_mismatch",
            RejectReason::ExpiredSignature => "expired_signature",
            RejectReason::UnknownSigningKey => "unknown_signing_key",
            RejectReason::InvalidProof => "invalid_proof",
            RejectReason::HeaderTooLong => "header_too_long",
            RejectReason::InvalidAddressSeed => "invalid_address_seed",
            RejectReason::MalformedInputs => "malformed_inputs",
            RejectReason::InvalidProviderKey => "invalid_provider_key",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verdict of the admission gate.
///
/// Serialized as `{"status":"accept"}` or `{"status":"reject","reason":"<code>"}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AdmissionRepr", try_from = "AdmissionRepr")]
pub enum Admission {
    /// The transaction may be included.
    Accept,
    /// The transaction is rejected as a whole.
    Reject(RejectReason),
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AdmissionStatus {
    Accept,
    Reject,
}

#[derive(Serialize, Deserialize)]
struct AdmissionRepr {
    status: AdmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<RejectReason>,
}

impl From<Admission> for AdmissionRepr {
    fn from(value: Admission) -> Self {
        match value {
            Admission::Accept => AdmissionRepr {
                status: AdmissionStatus::Accept,
                reason: None,
            },
            Admission::Reject(reason) => AdmissionRepr {
                status: AdmissionStatus::Reject,
                reason: Some(reason),
            },
        }
    }
}

impl TryFrom<AdmissionRepr> for Admission {
    type Error = &'static str;

    fn try_from(value: AdmissionRepr) -> Result<Self, Self::Error> {
        match (value.status, value.reason) {
            (AdmissionStatus::Accept, None) => Ok(Admission::Accept),
            (AdmissionStatus::Reject, Some(reason)) => Ok(Admission::Reject(reason)),
            (AdmissionStatus::Accept, Some(_)) => Err("accepted admission must not carry a reason"),
            (AdmissionStatus::Reject, None) => Err("rejected admission requires a reason"),
        }
    }
}

/// A request to derive the account address of an OIDC subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveAddressRequest {
    /// The address seed.
    pub address_seed: AddressSeed,
    /// The issuer, aliases are normalized.
    pub issuer: String,
}

/// The derived address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveAddressResponse {
    /// The account address.
    pub address: Address,
}

/// The key ids currently known to the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkListResponse {
    /// Sorted key ids.
    pub kids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_wire_format() {
        assert_eq!(
            serde_json::to_string(&Admission::Accept).unwrap(),
            r#"{"status":"accept"}"#
        );
        assert_eq!(
            serde_json::to_string(&Admission::Reject(RejectReason::ExpiredSignature)).unwrap(),
            r#"{"status":"reject","reason":"expired_signature"}"#
        );
        let reject: Admission =
            serde_json::from_str(r#"{"status":"reject","reason":"invalid_proof"}"#).unwrap();
        assert_eq!(reject, Admission::Reject(RejectReason::InvalidProof));
        assert!(serde_json::from_str::<Admission>(r#"{"status":"reject"}"#).is_err());
        assert!(
            serde_json::from_str::<Admission>(r#"{"status":"accept","reason":"invalid_proof"}"#)
                .is_err()
        );
    }

    #[test]
    fn reason_codes_match_serde() {
        let all = [
            RejectReason::UnsupportedTxShape,
            RejectReason::SignerCountMismatch,
            RejectReason::ExpiredSignature,
            RejectReason::UnknownSigningKey,
            RejectReason::InvalidProof,
            RejectReason::HeaderTooLong,
            RejectReason::InvalidAddressSeed,
            RejectReason::MalformedInputs,
            RejectReason::InvalidProviderKey,
        ];
        for reason in all {
            assert_eq!(
                serde_json::to_string(&reason).unwrap(),
                format!("\"{reason}\"")
            );
        }
    }
}
