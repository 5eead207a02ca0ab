use ark_bn254::Fr;
use ark_ff::Field as _;

use crate::{PoseidonError, PoseidonParams, params::MAX_INPUTS};

/// A struct representing the Poseidon permutation.
#[derive(Clone, Debug)]
pub struct Poseidon {
    /// The parameter set containing the parameters for the Poseidon permutation.
    pub params: &'static PoseidonParams,
}

impl Poseidon {
    /// Creates a new instance of the Poseidon permutation with given parameters.
    pub fn new(params: &'static PoseidonParams) -> Self {
        Self { params }
    }

    /// Creates the instance hashing exactly `n` inputs (state size `n + 1`).
    pub fn with_inputs(n: usize) -> Result<Self, PoseidonError> {
        if n == 0 || n > MAX_INPUTS {
            return Err(PoseidonError::UnsupportedArity(n));
        }
        PoseidonParams::for_width(n + 1)
            .map(Self::new)
            .ok_or(PoseidonError::UnsupportedArity(n))
    }

    /// Returns the state size.
    pub fn width(&self) -> usize {
        self.params.t
    }

    /// Returns the number of rounds in the Poseidon permutation.
    pub fn num_rounds(&self) -> usize {
        self.params.rounds_f + self.params.rounds_p
    }

    /// Returns the number of S-boxes used in the Poseidon permutation.
    pub fn num_sbox(&self) -> usize {
        self.params.rounds_f * self.params.t + self.params.rounds_p
    }

    fn single_sbox(input: &mut Fr) {
        let input2 = input.square();
        let input4 = input2.square();
        *input *= input4;
    }

    fn add_round_constants(&self, state: &mut [Fr], round: usize) {
        state
            .iter_mut()
            .zip(self.params.round_constants[round].iter())
            .for_each(|(s, c)| *s += c);
    }

    fn matmul_mds(&self, state: &mut [Fr]) {
        let result = self
            .params
            .mds
            .iter()
            .map(|row| row.iter().zip(state.iter()).map(|(m, s)| *m * s).sum())
            .collect::<Vec<Fr>>();
        state.copy_from_slice(&result);
    }

    /// Performs the Poseidon permutation in place.
    ///
    /// # Panics
    /// Panics if `state.len()` does not match the state size of the parameters.
    pub fn permutation_in_place(&self, state: &mut [Fr]) {
        assert_eq!(state.len(), self.params.t, "invalid state size");
        let half_full = self.params.rounds_f / 2;
        let partial_end = half_full + self.params.rounds_p;
        for round in 0..self.num_rounds() {
            self.add_round_constants(state, round);
            if round < half_full || round >= partial_end {
                state.iter_mut().for_each(Self::single_sbox);
            } else {
                Self::single_sbox(&mut state[0]);
            }
            self.matmul_mds(state);
        }
    }

    /// Performs the Poseidon permutation and returns the new state.
    pub fn permutation(&self, input: &[Fr]) -> Vec<Fr> {
        let mut state = input.to_vec();
        self.permutation_in_place(&mut state);
        state
    }

    /// Hashes exactly `t - 1` inputs. The state is initialized with `[0, inputs..]` and the
    /// first element of the permuted state is the digest.
    pub fn hash(&self, inputs: &[Fr]) -> Result<Fr, PoseidonError> {
        if inputs.len() + 1 != self.params.t {
            return Err(PoseidonError::UnsupportedArity(inputs.len()));
        }
        let mut state = Vec::with_capacity(self.params.t);
        state.push(Fr::from(0u64));
        state.extend_from_slice(inputs);
        self.permutation_in_place(&mut state);
        Ok(state[0])
    }
}
