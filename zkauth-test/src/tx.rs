//! Builders for ZK-authenticated transactions.
use ark_bn254::Fr;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use num_bigint::BigUint;
use zkauth_types::{
    AddressSeed, EphemeralPublicKey,
    jwk::decode_base64url,
    tx::{Msg, MsgZkExec, Tx, ZkAuthInputs, ZkAuthSignature},
};

use crate::{TestProver, fixtures};

/// Builds [`MsgZkExec`] messages, by default for the fixture provider key and issuer.
#[derive(Clone, Debug)]
pub struct ZkExecBuilder {
    eph_pubkey: EphemeralPublicKey,
    issuer: String,
    header_base64: String,
    address_seed: String,
    max_block_height: u64,
    modulus: String,
    payload: Vec<u8>,
}

impl Default for ZkExecBuilder {
    fn default() -> Self {
        Self {
            eph_pubkey: fixtures::eph_pubkey(),
            issuer: fixtures::GOOGLE_ISSUER.to_owned(),
            header_base64: fixtures::HEADER_BASE64.to_owned(),
            address_seed: fixtures::ADDRESS_SEED.to_owned(),
            max_block_height: 10,
            modulus: fixtures::GOOGLE_MODULUS.to_owned(),
            payload: b"payload".to_vec(),
        }
    }
}

impl ZkExecBuilder {
    /// Sets the signer key the proof is bound to.
    pub fn eph_pubkey(mut self, eph_pubkey: EphemeralPublicKey) -> Self {
        self.eph_pubkey = eph_pubkey;
        self
    }

    /// Sets the decoded issuer.
    pub fn issuer(mut self, issuer: &str) -> Self {
        self.issuer = issuer.to_owned();
        self
    }

    /// Sets the base64url JWT header segment.
    pub fn header_base64(mut self, header_base64: &str) -> Self {
        self.header_base64 = header_base64.to_owned();
        self
    }

    /// Uses a header naming `kid` signed with the given base64url `modulus`.
    pub fn provider_key(mut self, kid: &str, modulus: &str) -> Self {
        self.header_base64 = fixtures::header_base64(kid);
        self.modulus = modulus.to_owned();
        self
    }

    /// Sets the address seed.
    pub fn address_seed(mut self, address_seed: &str) -> Self {
        self.address_seed = address_seed.to_owned();
        self
    }

    /// Sets the maximum block height.
    pub fn max_block_height(mut self, max_block_height: u64) -> Self {
        self.max_block_height = max_block_height;
        self
    }

    /// The signer key the message must be paired with.
    pub fn signer(&self) -> EphemeralPublicKey {
        self.eph_pubkey.clone()
    }

    /// The public signal the configured inputs produce.
    pub fn public_signal(&self) -> Fr {
        let modulus = BigUint::from_bytes_be(
            &decode_base64url(&self.modulus).expect("fixture modulus is base64url"),
        );
        zkauth_core::compute_all_inputs_hash(
            self.eph_pubkey.as_bytes(),
            &modulus,
            self.max_block_height,
            &self.issuer,
            &self.header_base64,
            &self.address_seed,
        )
        .expect("fixture inputs encode")
    }

    /// Builds the message with a valid proof.
    pub fn build(&self, prover: &TestProver) -> MsgZkExec {
        self.build_with_proof(prover.prove_json(self.public_signal()))
    }

    /// Builds the message with the given proof bytes.
    pub fn build_with_proof(&self, proof: Vec<u8>) -> MsgZkExec {
        MsgZkExec {
            signature: ZkAuthSignature {
                inputs: ZkAuthInputs {
                    proof,
                    iss_base64: URL_SAFE_NO_PAD.encode(&self.issuer),
                    header_base64: self.header_base64.clone(),
                    address_seed: AddressSeed::new(self.address_seed.clone()),
                },
                max_block_height: self.max_block_height,
            },
            payload: self.payload.clone(),
        }
    }

    /// Builds a signed transaction containing only this message.
    pub fn signed_tx(&self, prover: &TestProver) -> Tx {
        signed_tx(vec![(Msg::ZkExec(self.build(prover)), self.signer())])
    }
}

/// Builds a signed transaction from messages and their signer keys.
pub fn signed_tx(msgs: Vec<(Msg, EphemeralPublicKey)>) -> Tx {
    let (msgs, pubkeys) = msgs.into_iter().unzip();
    Tx::Signed { msgs, pubkeys }
}

/// A non-ZK bank transfer message.
pub fn bank_send() -> Msg {
    Msg::Other {
        type_url: "/cosmos.bank.v1beta1.MsgSend".to_owned(),
        value: vec![0x0a, 0x03, 0x61, 0x62, 0x63],
    }
}
