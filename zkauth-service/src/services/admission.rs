//! The transaction admission gate.
//!
//! Every ZK-authenticated message of a transaction must carry a proof that verifies against the
//! public signal rebuilt from the message, its signer key and the registered provider key. The
//! first failing message rejects the whole transaction. Messages of any other kind pass
//! through, and a transaction that passes the gate is handed to the next [`AdmissionStage`].

use std::sync::Arc;

use tracing::instrument;
use zkauth_core::{
    EncodingError,
    encoding::{LIMB_BITS, NUM_LIMBS},
    public_signal::MAX_HEADER_LEN,
};
use zkauth_types::{
    EphemeralPublicKey,
    api::v1::{Admission, RejectReason},
    jwk::{JwtHeader, decode_base64url},
    tx::{Msg, MsgZkExec, Tx},
};

use crate::{
    metrics::{METRICS_ADMISSION_ACCEPTED, METRICS_ADMISSION_REJECTED, METRICS_LABEL_REASON},
    services::{jwk_registry::JwkRegistry, proof_verifier::ProofVerifier},
};

/// A step of the admission pipeline running after the ZK checks.
pub trait AdmissionStage: Send + Sync {
    /// Decides whether `tx` may be included at block `height`.
    fn admit(&self, height: u64, tx: &Tx) -> Admission;
}

/// Accepts every transaction.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl AdmissionStage for AcceptAll {
    fn admit(&self, _height: u64, _tx: &Tx) -> Admission {
        Admission::Accept
    }
}

/// Checks the ZK-authenticated messages of transactions.
#[derive(Clone)]
pub struct TxAdmissionGate {
    registry: JwkRegistry,
    verifier: ProofVerifier,
    next: Arc<dyn AdmissionStage>,
}

impl TxAdmissionGate {
    /// Creates a gate that hands accepted transactions to [`AcceptAll`].
    pub fn new(registry: JwkRegistry, verifier: ProofVerifier) -> Self {
        Self {
            registry,
            verifier,
            next: Arc::new(AcceptAll),
        }
    }

    /// Replaces the stage that runs after the ZK checks.
    pub fn with_next_stage(mut self, next: Arc<dyn AdmissionStage>) -> Self {
        self.next = next;
        self
    }

    /// Runs the gate on `tx` for a block at `height`.
    #[instrument(level = "debug", skip(self, tx))]
    pub fn admit(&self, height: u64, tx: &Tx) -> Admission {
        let admission = match self.check(height, tx) {
            Ok(()) => self.next.admit(height, tx),
            Err(reason) => Admission::Reject(reason),
        };
        match admission {
            Admission::Accept => {
                tracing::debug!("accepted tx");
                metrics::counter!(METRICS_ADMISSION_ACCEPTED).increment(1);
            }
            Admission::Reject(reason) => {
                tracing::debug!("rejected tx: {reason}");
                metrics::counter!(
                    METRICS_ADMISSION_REJECTED,
                    METRICS_LABEL_REASON => reason.as_str()
                )
                .increment(1);
            }
        }
        admission
    }

    fn check(&self, height: u64, tx: &Tx) -> Result<(), RejectReason> {
        let pubkeys = tx
            .signer_pubkeys()
            .ok_or(RejectReason::UnsupportedTxShape)?;
        let msgs = tx.msgs();
        if msgs.len() != pubkeys.len() {
            tracing::trace!("{} msgs but {} signers", msgs.len(), pubkeys.len());
            return Err(RejectReason::SignerCountMismatch);
        }
        for (msg, pubkey) in msgs.iter().zip(pubkeys) {
            if let Msg::ZkExec(msg) = msg {
                self.check_zk_exec(height, msg, pubkey)?;
            }
        }
        Ok(())
    }

    fn check_zk_exec(
        &self,
        height: u64,
        msg: &MsgZkExec,
        pubkey: &EphemeralPublicKey,
    ) -> Result<(), RejectReason> {
        let signature = &msg.signature;
        let inputs = &signature.inputs;
        if signature.max_block_height < height {
            return Err(RejectReason::ExpiredSignature);
        }
        if inputs.header_base64.len() > MAX_HEADER_LEN {
            return Err(RejectReason::HeaderTooLong);
        }

        let issuer = decode_base64url(&inputs.iss_base64)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(RejectReason::MalformedInputs)?;
        let header = JwtHeader::decode(&inputs.header_base64).map_err(|err| {
            tracing::trace!("cannot decode header: {err}");
            RejectReason::MalformedInputs
        })?;

        let key = self
            .registry
            .get(&header.kid)
            .ok_or(RejectReason::UnknownSigningKey)?;
        let modulus = key.modulus().map_err(|err| {
            tracing::warn!("registered key {} is unusable: {err}", key.kid);
            RejectReason::InvalidProviderKey
        })?;
        if modulus.bits() > (LIMB_BITS * NUM_LIMBS) as u64 {
            tracing::warn!("registered key {} has a {} bit modulus", key.kid, modulus.bits());
            return Err(RejectReason::InvalidProviderKey);
        }

        let signal = zkauth_core::compute_all_inputs_hash(
            pubkey.as_bytes(),
            &modulus,
            signature.max_block_height,
            &issuer,
            &inputs.header_base64,
            inputs.address_seed.as_str(),
        )
        .map_err(|err| match err {
            EncodingError::HeaderTooLong(_) => RejectReason::HeaderTooLong,
            EncodingError::InvalidAddressSeed => RejectReason::InvalidAddressSeed,
            err => {
                tracing::trace!("cannot encode inputs: {err}");
                RejectReason::MalformedInputs
            }
        })?;

        let proof = ProofVerifier::parse_proof(&inputs.proof).map_err(|err| {
            tracing::trace!("{err}");
            RejectReason::InvalidProof
        })?;
        self.verifier
            .verify(&proof, signal)
            .map_err(|_| RejectReason::InvalidProof)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ark_bn254::Fr;
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
    use zkauth_test::{
        TestProver, ZkExecBuilder, fixtures,
        tx::{bank_send, signed_tx},
    };
    use zkauth_types::jwk::{JwkSet, ProviderKey};

    use super::*;
    use crate::services::jwk_registry::test::TestJwkSource;

    struct Setup {
        prover: TestProver,
        registry: JwkRegistry,
        gate: TxAdmissionGate,
    }

    fn setup() -> Setup {
        let prover = TestProver::new(42);
        let registry = JwkRegistry::new(Arc::new(TestJwkSource::new(JwkSet::default())));
        registry.insert_keys([ProviderKey::try_from(fixtures::google_jwk()).unwrap()]);
        let verifier = ProofVerifier::new(prover.verifying_key()).unwrap();
        let gate = TxAdmissionGate::new(registry.clone(), verifier);
        Setup {
            prover,
            registry,
            gate,
        }
    }

    fn reject(reason: RejectReason) -> Admission {
        Admission::Reject(reason)
    }

    fn tx_without_proof(builder: &ZkExecBuilder) -> Tx {
        signed_tx(vec![(
            Msg::ZkExec(builder.build_with_proof(vec![])),
            builder.signer(),
        )])
    }

    #[test]
    fn accepts_valid_proof() {
        let setup = setup();
        let tx = ZkExecBuilder::default().signed_tx(&setup.prover);
        assert_eq!(setup.gate.admit(3, &tx), Admission::Accept);
    }

    #[test]
    fn unsigned_tx_is_unsupported() {
        let setup = setup();
        let tx = Tx::Unsigned {
            msgs: vec![bank_send()],
        };
        assert_eq!(
            setup.gate.admit(1, &tx),
            reject(RejectReason::UnsupportedTxShape)
        );
    }

    #[test]
    fn signer_count_must_match() {
        let setup = setup();
        let Tx::Signed { msgs, mut pubkeys } = ZkExecBuilder::default().signed_tx(&setup.prover)
        else {
            unreachable!()
        };
        pubkeys.push(fixtures::eph_pubkey());
        let tx = Tx::Signed { msgs, pubkeys };
        assert_eq!(
            setup.gate.admit(1, &tx),
            reject(RejectReason::SignerCountMismatch)
        );
    }

    #[test]
    fn expires_strictly_after_max_height() {
        let setup = setup();
        let tx = ZkExecBuilder::default()
            .max_block_height(10)
            .signed_tx(&setup.prover);
        assert_eq!(setup.gate.admit(10, &tx), Admission::Accept);
        assert_eq!(
            setup.gate.admit(11, &tx),
            reject(RejectReason::ExpiredSignature)
        );
    }

    #[test]
    fn malformed_issuer_or_header() {
        let setup = setup();
        let builder = ZkExecBuilder::default();
        let mut msg = builder.build_with_proof(vec![]);
        msg.signature.inputs.iss_base64 = "not base64!".to_owned();
        let tx = signed_tx(vec![(Msg::ZkExec(msg), builder.signer())]);
        assert_eq!(
            setup.gate.admit(1, &tx),
            reject(RejectReason::MalformedInputs)
        );

        let builder = ZkExecBuilder::default().header_base64(&URL_SAFE_NO_PAD.encode("not json"));
        assert_eq!(
            setup.gate.admit(1, &tx_without_proof(&builder)),
            reject(RejectReason::MalformedInputs)
        );
    }

    #[test]
    fn unknown_kid() {
        let setup = setup();
        let tx = ZkExecBuilder::default()
            .provider_key("2", fixtures::GOOGLE_MODULUS)
            .signed_tx(&setup.prover);
        assert_eq!(
            setup.gate.admit(1, &tx),
            reject(RejectReason::UnknownSigningKey)
        );
    }

    #[test]
    fn unusable_provider_key() {
        let setup = setup();
        let wide = URL_SAFE_NO_PAD.encode([0xff; 258]);
        setup.registry.insert_keys([
            ProviderKey {
                kid: "bad".to_owned(),
                n: "!!".to_owned(),
                e: "AQAB".to_owned(),
                alg: "RS256".to_owned(),
            },
            ProviderKey {
                kid: "wide".to_owned(),
                n: wide,
                e: "AQAB".to_owned(),
                alg: "RS256".to_owned(),
            },
        ]);
        for kid in ["bad", "wide"] {
            let builder = ZkExecBuilder::default().header_base64(&fixtures::header_base64(kid));
            assert_eq!(
                setup.gate.admit(1, &tx_without_proof(&builder)),
                reject(RejectReason::InvalidProviderKey)
            );
        }
    }

    #[test]
    fn header_too_long() {
        let setup = setup();
        let header = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"alg":"RS256","kid":"1","typ":"{}"}}"#,
            "x".repeat(800)
        ));
        let builder = ZkExecBuilder::default().header_base64(&header);
        assert_eq!(
            setup.gate.admit(1, &tx_without_proof(&builder)),
            reject(RejectReason::HeaderTooLong)
        );
    }

    #[test]
    fn header_length_is_checked_before_decoding() {
        let setup = setup();
        let unknown_kid = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"alg":"RS256","kid":"unknown","typ":"{}"}}"#,
            "x".repeat(800)
        ));
        let not_json = URL_SAFE_NO_PAD.encode("x".repeat(800));
        for header in [unknown_kid, not_json] {
            assert!(header.len() > MAX_HEADER_LEN);
            let builder = ZkExecBuilder::default().header_base64(&header);
            assert_eq!(
                setup.gate.admit(1, &tx_without_proof(&builder)),
                reject(RejectReason::HeaderTooLong)
            );
        }
    }

    #[test]
    fn invalid_address_seed() {
        let setup = setup();
        for seed in [
            "12a",
            "",
            "21888242871839275222246405745257275088548364400416034343698204186575808495617",
        ] {
            let builder = ZkExecBuilder::default().address_seed(seed);
            assert_eq!(
                setup.gate.admit(1, &tx_without_proof(&builder)),
                reject(RejectReason::InvalidAddressSeed)
            );
        }
    }

    #[test]
    fn oversize_signer_key() {
        let setup = setup();
        let builder = ZkExecBuilder::default().eph_pubkey(EphemeralPublicKey::new(vec![7; 48]));
        assert_eq!(
            setup.gate.admit(1, &tx_without_proof(&builder)),
            reject(RejectReason::MalformedInputs)
        );
    }

    #[test]
    fn invalid_proof() {
        let setup = setup();
        let builder = ZkExecBuilder::default();
        let wrong_signal = builder.build_with_proof(setup.prover.prove_json(Fr::from(1u64)));
        let garbage = builder.build_with_proof(b"{}".to_vec());
        for msg in [wrong_signal, garbage] {
            let tx = signed_tx(vec![(Msg::ZkExec(msg), builder.signer())]);
            assert_eq!(
                setup.gate.admit(1, &tx),
                reject(RejectReason::InvalidProof)
            );
        }
    }

    #[test]
    fn proof_is_bound_to_signer_key() {
        let setup = setup();
        let builder = ZkExecBuilder::default();
        let msg = builder.build(&setup.prover);
        let other_signer = EphemeralPublicKey::new(vec![9; 33]);
        let tx = signed_tx(vec![(Msg::ZkExec(msg), other_signer)]);
        assert_eq!(
            setup.gate.admit(1, &tx),
            reject(RejectReason::InvalidProof)
        );
    }

    #[test]
    fn non_zk_messages_pass_through() {
        let setup = setup();
        let tx = signed_tx(vec![(bank_send(), fixtures::eph_pubkey())]);
        assert_eq!(setup.gate.admit(1, &tx), Admission::Accept);
    }

    #[test]
    fn any_failing_message_rejects_the_tx() {
        let setup = setup();
        let valid = ZkExecBuilder::default();
        let other = ZkExecBuilder::default().eph_pubkey(EphemeralPublicKey::new(vec![3; 33]));
        let expired = ZkExecBuilder::default().max_block_height(0);

        let ok = signed_tx(vec![
            (Msg::ZkExec(valid.build(&setup.prover)), valid.signer()),
            (bank_send(), fixtures::eph_pubkey()),
            (Msg::ZkExec(other.build(&setup.prover)), other.signer()),
        ]);
        assert_eq!(setup.gate.admit(5, &ok), Admission::Accept);

        let mixed = signed_tx(vec![
            (Msg::ZkExec(valid.build(&setup.prover)), valid.signer()),
            (Msg::ZkExec(expired.build(&setup.prover)), expired.signer()),
        ]);
        assert_eq!(
            setup.gate.admit(5, &mixed),
            reject(RejectReason::ExpiredSignature)
        );
    }

    #[derive(Default)]
    struct CountingStage(AtomicUsize);

    impl AdmissionStage for CountingStage {
        fn admit(&self, _height: u64, _tx: &Tx) -> Admission {
            self.0.fetch_add(1, Ordering::SeqCst);
            Admission::Reject(RejectReason::UnsupportedTxShape)
        }
    }

    #[test]
    fn next_stage_runs_only_after_zk_checks() {
        let setup = setup();
        let stage = Arc::new(CountingStage::default());
        let gate = setup.gate.clone().with_next_stage(stage.clone());

        let expired = ZkExecBuilder::default()
            .max_block_height(0)
            .signed_tx(&setup.prover);
        assert_eq!(gate.admit(1, &expired), reject(RejectReason::ExpiredSignature));
        assert_eq!(stage.0.load(Ordering::SeqCst), 0);

        let valid = ZkExecBuilder::default().signed_tx(&setup.prover);
        assert_eq!(
            gate.admit(1, &valid),
            reject(RejectReason::UnsupportedTxShape)
        );
        assert_eq!(stage.0.load(Ordering::SeqCst), 1);
    }
}
