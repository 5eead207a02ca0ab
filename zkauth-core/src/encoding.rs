//! Packing of byte strings, signer keys and RSA moduli into BN254 scalars.
//!
//! The layouts here are fixed by the zkauth circuit. Changing any of them changes every
//! public signal and invalidates all existing proofs.
use ark_bn254::Fr;
use ark_ff::PrimeField as _;
use num_bigint::BigUint;
use poseidon::PoseidonError;

/// Number of bytes packed into one field element.
pub const CHUNK_SIZE: usize = 31;
/// Bit width of one RSA modulus limb.
pub const LIMB_BITS: usize = 121;
/// Number of limbs an RSA modulus is split into.
pub const NUM_LIMBS: usize = 17;
/// Maximum length of a signer key, the high part must fit into one chunk.
pub const MAX_KEY_LEN: usize = CHUNK_SIZE + KEY_LOW_LEN;

const KEY_LOW_LEN: usize = 16;

/// Errors when encoding inputs of the public signal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The input does not fit the declared maximum.
    #[error("input of size {size} exceeds maximum of {max}")]
    OversizeInput {
        /// Actual size of the input.
        size: usize,
        /// Allowed maximum.
        max: usize,
    },
    /// The declared maximum size is zero, which encodes to no elements.
    #[error("maximum size must be positive")]
    ZeroMaxSize,
    /// Hashing the encoded elements failed.
    #[error(transparent)]
    UnsupportedArity(#[from] PoseidonError),
    /// The JWT header exceeds the maximum length.
    #[error("header of {0} bytes exceeds maximum")]
    HeaderTooLong(usize),
    /// The address seed is not a canonical decimal field element.
    #[error("invalid address seed")]
    InvalidAddressSeed,
}

/// Encodes `input` into `ceil(max_size / 31)` field elements.
///
/// The input is zero-padded to `max_size` bytes and the padded buffer is reversed. It is then
/// cut into 31-byte chunks from the left, every chunk is reversed back and the order of the
/// chunks is reversed. Each chunk is read big-endian. For `max_size` not divisible by 31 the
/// first element is the short chunk holding the leading bytes.
pub fn encode_ascii_to_field(input: &[u8], max_size: usize) -> Result<Vec<Fr>, EncodingError> {
    if max_size == 0 {
        return Err(EncodingError::ZeroMaxSize);
    }
    if input.len() > max_size {
        return Err(EncodingError::OversizeInput {
            size: input.len(),
            max: max_size,
        });
    }
    let mut buf = input.to_vec();
    buf.resize(max_size, 0);
    buf.reverse();
    let mut elements = buf
        .chunks(CHUNK_SIZE)
        .map(|chunk| {
            let mut chunk = chunk.to_vec();
            chunk.reverse();
            Fr::from_be_bytes_mod_order(&chunk)
        })
        .collect::<Vec<_>>();
    elements.reverse();
    Ok(elements)
}

/// Encodes `input` with [`encode_ascii_to_field`] and hashes the elements.
pub fn hash_ascii_to_field(input: &[u8], max_size: usize) -> Result<Fr, EncodingError> {
    let elements = encode_ascii_to_field(input, max_size)?;
    Ok(poseidon::hash(&elements)?)
}

/// Splits a signer key into `(high, low)`.
///
/// `low` holds the last 16 bytes, `high` everything before. Both are read big-endian, keys
/// shorter than 16 bytes have a zero `high` part.
pub fn split_key_to_field_pair(key: &[u8]) -> Result<(Fr, Fr), EncodingError> {
    if key.len() > MAX_KEY_LEN {
        return Err(EncodingError::OversizeInput {
            size: key.len(),
            max: MAX_KEY_LEN,
        });
    }
    let (high, low) = key.split_at(key.len().saturating_sub(KEY_LOW_LEN));
    Ok((
        Fr::from_be_bytes_mod_order(high),
        Fr::from_be_bytes_mod_order(low),
    ))
}

/// Splits an RSA modulus into 17 little-endian limbs of 121 bits.
pub fn modulus_to_limbs(modulus: &BigUint) -> Result<[Fr; NUM_LIMBS], EncodingError> {
    let bits = modulus.bits();
    let max_bits = (LIMB_BITS * NUM_LIMBS) as u64;
    if bits > max_bits {
        return Err(EncodingError::OversizeInput {
            size: bits as usize,
            max: max_bits as usize,
        });
    }
    let mask = (BigUint::from(1u8) << LIMB_BITS) - 1u8;
    Ok(std::array::from_fn(|i| {
        Fr::from((modulus >> (LIMB_BITS * i)) & &mask)
    }))
}

/// Hashes the 17 limbs of an RSA modulus.
pub fn hash_modulus(modulus: &BigUint) -> Result<Fr, EncodingError> {
    let limbs = modulus_to_limbs(modulus)?;
    Ok(poseidon::hash(&limbs)?)
}
