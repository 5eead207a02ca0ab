//! Groth16 verification of zkauth proofs.
//!
//! The circuit has exactly one public input, the all-inputs hash. The verifying key is loaded
//! once at startup from a snarkjs `verification_key.json` and prepared for pairing checks.

use std::{path::Path, sync::Arc};

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serde_compat::groth16::{Groth16Proof, Groth16VerificationKey};
use eyre::Context as _;

/// Errors returned by the [`ProofVerifier`].
#[derive(Debug, thiserror::Error)]
pub enum ProofVerifierError {
    /// The proof does not verify against the public signal.
    #[error("proof verification failed")]
    VerificationFailed,
    /// The verifying key is unusable.
    #[error("invalid verification key: {0}")]
    InvalidVerificationKey(String),
    /// The proof bytes are not a snarkjs Groth16 proof over BN254.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}

/// Verifies proofs against the prepared verifying key. Cheap to clone.
#[derive(Clone)]
pub struct ProofVerifier {
    vk: Arc<PreparedVerifyingKey<Bn254>>,
}

impl ProofVerifier {
    /// Prepares `vk`. The key must have exactly one public input.
    pub fn new(vk: VerifyingKey<Bn254>) -> Result<Self, ProofVerifierError> {
        if vk.gamma_abc_g1.len() != 2 {
            return Err(ProofVerifierError::InvalidVerificationKey(format!(
                "expected 1 public input but key has {}",
                vk.gamma_abc_g1.len().saturating_sub(1)
            )));
        }
        Ok(Self {
            vk: Arc::new(ark_groth16::prepare_verifying_key(&vk)),
        })
    }

    /// Parses a snarkjs verification key document.
    pub fn from_json(json: &[u8]) -> Result<Self, ProofVerifierError> {
        let vk = serde_json::from_slice::<Groth16VerificationKey>(json)
            .map_err(|err| ProofVerifierError::InvalidVerificationKey(err.to_string()))?;
        vk.validate()
            .map_err(|err| ProofVerifierError::InvalidVerificationKey(err.to_string()))?;
        Self::new(vk.into())
    }

    /// Loads the verification key from `path`.
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        tracing::info!("loading verification key from {}", path.display());
        let json = std::fs::read(path).context("while reading verification key")?;
        Self::from_json(&json).context("while parsing verification key")
    }

    /// Parses the proof carried in a transaction.
    pub fn parse_proof(bytes: &[u8]) -> Result<Proof<Bn254>, ProofVerifierError> {
        let proof = serde_json::from_slice::<Groth16Proof>(bytes)
            .map_err(|err| ProofVerifierError::MalformedProof(err.to_string()))?;
        if !proof.is_groth16_bn128() {
            return Err(ProofVerifierError::MalformedProof(format!(
                "expected groth16/bn128 but got {}/{}",
                proof.protocol, proof.curve
            )));
        }
        Ok(proof.into())
    }

    /// Verifies `proof` for the single public input `signal`.
    pub fn verify(&self, proof: &Proof<Bn254>, signal: Fr) -> Result<(), ProofVerifierError> {
        match Groth16::<Bn254>::verify_proof(&self.vk, proof, &[signal]) {
            Ok(true) => Ok(()),
            Ok(false) => Err(ProofVerifierError::VerificationFailed),
            Err(err) => {
                tracing::debug!("pairing check errored: {err}");
                Err(ProofVerifierError::VerificationFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use zkauth_test::TestProver;

    use super::*;

    #[test]
    fn verifies_proof_for_its_signal() {
        let prover = TestProver::new(7);
        let verifier = ProofVerifier::from_json(prover.verification_key_json().as_bytes()).unwrap();
        let proof = ProofVerifier::parse_proof(&prover.prove_json(Fr::from(42u64))).unwrap();
        verifier.verify(&proof, Fr::from(42u64)).unwrap();
        assert!(matches!(
            verifier.verify(&proof, Fr::from(43u64)),
            Err(ProofVerifierError::VerificationFailed)
        ));
    }

    #[test]
    fn proof_from_other_setup_fails() {
        let verifier = ProofVerifier::new(TestProver::new(1).verifying_key()).unwrap();
        let proof = TestProver::new(2).prove(Fr::from(5u64));
        assert!(verifier.verify(&proof, Fr::from(5u64)).is_err());
    }

    #[test]
    fn rejects_garbage_proof() {
        assert!(matches!(
            ProofVerifier::parse_proof(b"not json"),
            Err(ProofVerifierError::MalformedProof(_))
        ));
    }

    #[test]
    fn rejects_foreign_protocol() {
        let prover = TestProver::new(3);
        let mut proof =
            serde_json::from_slice::<serde_json::Value>(&prover.prove_json(Fr::from(1u64)))
                .unwrap();
        proof["protocol"] = "plonk".into();
        let bytes = serde_json::to_vec(&proof).unwrap();
        assert!(matches!(
            ProofVerifier::parse_proof(&bytes),
            Err(ProofVerifierError::MalformedProof(_))
        ));
    }

    #[test]
    fn rejects_key_with_wrong_input_count() {
        let mut vk = TestProver::new(4).verifying_key();
        vk.gamma_abc_g1.push(vk.gamma_abc_g1[0]);
        assert!(matches!(
            ProofVerifier::new(vk),
            Err(ProofVerifierError::InvalidVerificationKey(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let prover = TestProver::new(5);
        let path = prover.write_verification_key(dir.path());
        let verifier = ProofVerifier::load(&path).unwrap();
        verifier
            .verify(&prover.prove(Fr::from(9u64)), Fr::from(9u64))
            .unwrap();
        assert!(ProofVerifier::load(dir.path().join("missing.json")).is_err());
    }
}
