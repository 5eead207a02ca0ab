//! A Groth16 prover for a circuit with a single public input.
//!
//! The circuit only asserts that a witness equals the public input, so it proves knowledge of
//! nothing. Its proofs still bind to exactly one public signal, which is all the admission path
//! can observe.
use std::path::{Path, PathBuf};

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, ProvingKey, VerifyingKey};
use ark_relations::{
    lc,
    r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError, Variable},
};
use ark_serde_compat::groth16::{Groth16Proof, Groth16VerificationKey};
use ark_std::rand::{SeedableRng as _, rngs::StdRng};
use parking_lot::Mutex;

#[derive(Clone, Copy)]
struct PublicSignalCircuit {
    signal: Option<Fr>,
}

impl ConstraintSynthesizer<Fr> for PublicSignalCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let public =
            cs.new_input_variable(|| self.signal.ok_or(SynthesisError::AssignmentMissing))?;
        let witness =
            cs.new_witness_variable(|| self.signal.ok_or(SynthesisError::AssignmentMissing))?;
        cs.enforce_constraint(lc!() + witness, lc!() + Variable::One, lc!() + public)?;
        Ok(())
    }
}

/// Proving key and rng for the single-input test circuit.
pub struct TestProver {
    pk: ProvingKey<Bn254>,
    rng: Mutex<StdRng>,
}

impl TestProver {
    /// Runs a deterministic setup from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let pk = Groth16::<Bn254>::generate_random_parameters_with_reduction(
            PublicSignalCircuit { signal: None },
            &mut rng,
        )
        .expect("setup of test circuit works");
        Self {
            pk,
            rng: Mutex::new(rng),
        }
    }

    /// The verifying key of the circuit.
    pub fn verifying_key(&self) -> VerifyingKey<Bn254> {
        self.pk.vk.clone()
    }

    /// The verifying key as snarkjs `verification_key.json`.
    pub fn verification_key_json(&self) -> String {
        serde_json::to_string_pretty(&Groth16VerificationKey::from(self.verifying_key()))
            .expect("can serialize verification key")
    }

    /// Writes `verification_key.json` into `dir` and returns its path.
    pub fn write_verification_key(&self, dir: &Path) -> PathBuf {
        let path = dir.join("verification_key.json");
        std::fs::write(&path, self.verification_key_json()).expect("can write verification key");
        path
    }

    /// Proves the circuit for `signal`.
    pub fn prove(&self, signal: Fr) -> Proof<Bn254> {
        let mut rng = self.rng.lock();
        Groth16::<Bn254>::create_random_proof_with_reduction(
            PublicSignalCircuit {
                signal: Some(signal),
            },
            &self.pk,
            &mut *rng,
        )
        .expect("can prove test circuit")
    }

    /// Proves the circuit for `signal` and returns the snarkjs proof JSON.
    pub fn prove_json(&self, signal: Fr) -> Vec<u8> {
        serde_json::to_vec(&Groth16Proof::from(self.prove(signal))).expect("can serialize proof")
    }
}
