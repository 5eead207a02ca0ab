//! The single public input of the zkauth circuit.
use ark_bn254::Fr;
use num_bigint::BigUint;
use tracing::instrument;

use crate::encoding::{self, EncodingError};

/// Maximum length of the issuer string in bytes.
pub const MAX_ISSUER_LEN: usize = 32;
/// Maximum length of the base64url JWT header segment in bytes.
pub const MAX_HEADER_LEN: usize = 992;

/// Computes the all-inputs hash the proof is verified against.
///
/// The digest is the Poseidon hash of
/// `[eph_high, eph_low, address_seed, max_height, issuer_hash, header_hash, modulus_hash]`.
/// The order is part of the circuit. `issuer` is the decoded issuer, `header` the base64url
/// header segment as transmitted.
#[instrument(level = "trace", skip_all)]
pub fn compute_all_inputs_hash(
    eph_pubkey: &[u8],
    modulus: &BigUint,
    max_height: u64,
    issuer: &str,
    header: &str,
    address_seed: &str,
) -> Result<Fr, EncodingError> {
    if header.len() > MAX_HEADER_LEN {
        return Err(EncodingError::HeaderTooLong(header.len()));
    }
    let address_seed = ark_serde_compat::fr_from_decimal(address_seed)
        .map_err(|_| EncodingError::InvalidAddressSeed)?;
    let (eph_high, eph_low) = encoding::split_key_to_field_pair(eph_pubkey)?;
    let issuer_hash = encoding::hash_ascii_to_field(issuer.as_bytes(), MAX_ISSUER_LEN)?;
    let header_hash = encoding::hash_ascii_to_field(header.as_bytes(), MAX_HEADER_LEN)?;
    let modulus_hash = encoding::hash_modulus(modulus)?;
    Ok(poseidon::hash(&[
        eph_high,
        eph_low,
        address_seed,
        Fr::from(max_height),
        issuer_hash,
        header_hash,
        modulus_hash,
    ])?)
}
