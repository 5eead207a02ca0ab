//! circom-compatible Poseidon hash over the BN254 scalar field.
//!
//! The permutation and its parameters match circomlib's `Poseidon(n)` template for
//! `n` in `1..=16`. On top of that, [`hash`] folds up to 32 inputs into a two-level
//! tree the same way the zkauth circuit does.
use ark_bn254::Fr;

mod params;
mod poseidon;

pub use params::{MAX_INPUTS, PoseidonParams};
pub use poseidon::Poseidon;

/// Maximum number of elements [`hash`] accepts.
pub const MAX_FOLDED_INPUTS: usize = 2 * MAX_INPUTS;

/// Errors returned by the Poseidon hash functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoseidonError {
    /// The number of inputs is not supported.
    #[error("unsupported number of inputs: {0}")]
    UnsupportedArity(usize),
}

/// Hashes up to 32 field elements.
///
/// Up to 16 elements are hashed directly with the matching width. For 17 to 32 elements
/// the first 16 and the remainder are hashed separately and the two digests are hashed
/// again. Any other folding produces a digest the circuit does not accept.
pub fn hash(inputs: &[Fr]) -> Result<Fr, PoseidonError> {
    match inputs.len() {
        0 => Err(PoseidonError::UnsupportedArity(0)),
        n if n <= MAX_INPUTS => Poseidon::with_inputs(n)?.hash(inputs),
        n if n <= MAX_FOLDED_INPUTS => {
            let (left, right) = inputs.split_at(MAX_INPUTS);
            let left = Poseidon::with_inputs(left.len())?.hash(left)?;
            let right = Poseidon::with_inputs(right.len())?.hash(right)?;
            Poseidon::with_inputs(2)?.hash(&[left, right])
        }
        n => Err(PoseidonError::UnsupportedArity(n)),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    fn fr(s: &str) -> Fr {
        Fr::from_str(s).unwrap()
    }

    fn range(n: u64) -> Vec<Fr> {
        (1..=n).map(Fr::from).collect()
    }

    #[test]
    fn hash_rejects_empty_and_oversized_inputs() {
        assert_eq!(hash(&[]), Err(PoseidonError::UnsupportedArity(0)));
        assert_eq!(hash(&range(33)), Err(PoseidonError::UnsupportedArity(33)));
    }

    #[test]
    fn hash_up_to_sixteen_is_direct() {
        let inputs = range(16);
        let direct = Poseidon::with_inputs(16).unwrap().hash(&inputs).unwrap();
        assert_eq!(hash(&inputs).unwrap(), direct);
    }

    #[test]
    fn hash_folds_seventeen_inputs() {
        let inputs = range(17);
        assert_eq!(
            hash(&inputs).unwrap(),
            fr("8770585823063767024216894608354098830177643380596531891106165958687580947979")
        );
        let left = hash(&inputs[..16]).unwrap();
        let right = hash(&inputs[16..]).unwrap();
        assert_eq!(hash(&inputs).unwrap(), hash(&[left, right]).unwrap());
    }

    #[test]
    fn hash_fold_differs_from_sequential_accumulation() {
        let inputs = range(20);
        let sequential = inputs[1..]
            .iter()
            .fold(inputs[0], |acc, x| hash(&[acc, *x]).unwrap());
        assert_ne!(hash(&inputs).unwrap(), sequential);
    }

    #[test]
    fn hash_is_order_sensitive() {
        let mut inputs = range(7);
        let first = hash(&inputs).unwrap();
        assert_eq!(first, hash(&inputs).unwrap());
        inputs.swap(0, 6);
        assert_ne!(first, hash(&inputs).unwrap());
    }
}
