use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::find_poseidon_ark_and_mds;
use ark_ff::PrimeField as _;

/// Maximum number of inputs of a single Poseidon instance.
pub const MAX_INPUTS: usize = 16;

const FULL_ROUNDS: usize = 8;

// indexed by `t - 2`, taken from the circomlib parameter set
const PARTIAL_ROUNDS: [usize; MAX_INPUTS] = [
    56, 57, 56, 60, 60, 63, 64, 63, 60, 66, 60, 65, 70, 60, 64, 68,
];

static PARAMS: [OnceLock<PoseidonParams>; MAX_INPUTS] = [const { OnceLock::new() }; MAX_INPUTS];

/// A struct representing the parameters of a Poseidon instance with state size `t`.
#[derive(Clone, Debug)]
pub struct PoseidonParams {
    /// The state size.
    pub t: usize,
    /// The number of full rounds, split evenly before and after the partial rounds.
    pub rounds_f: usize,
    /// The number of partial rounds.
    pub rounds_p: usize,
    /// One row of `t` round constants per round.
    pub round_constants: Vec<Vec<Fr>>,
    /// The `t x t` MDS matrix.
    pub mds: Vec<Vec<Fr>>,
}

impl PoseidonParams {
    /// Returns the parameters for state size `t`, generating them on first use.
    ///
    /// Returns `None` if `t` is not in `2..=17`.
    pub fn for_width(t: usize) -> Option<&'static Self> {
        if !(2..=MAX_INPUTS + 1).contains(&t) {
            return None;
        }
        Some(PARAMS[t - 2].get_or_init(|| Self::generate(t)))
    }

    // Grain LFSR with rate t-1 and no skipped matrices reproduces the circomlib constants
    fn generate(t: usize) -> Self {
        let rounds_p = PARTIAL_ROUNDS[t - 2];
        let (round_constants, mds) = find_poseidon_ark_and_mds::<Fr>(
            u64::from(Fr::MODULUS_BIT_SIZE),
            t - 1,
            FULL_ROUNDS as u64,
            rounds_p as u64,
            0,
        );
        debug_assert_eq!(round_constants.len(), FULL_ROUNDS + rounds_p);
        debug_assert_eq!(mds.len(), t);
        Self {
            t,
            rounds_f: FULL_ROUNDS,
            rounds_p,
            round_constants,
            mds,
        }
    }
}
