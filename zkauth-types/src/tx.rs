//! Transactions as seen by the admission gate.
//!
//! The gate only cares about the declared signer keys and about ZK-authenticated execution
//! messages. Every other ledger message is carried as an opaque [`Msg::Other`].

use serde::{Deserialize, Serialize};

use crate::{AddressSeed, EphemeralPublicKey, base64_bytes};

/// Client-built inputs of a ZK-auth signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkAuthInputs {
    /// The snarkjs Groth16 proof JSON.
    #[serde(with = "base64_bytes")]
    pub proof: Vec<u8>,
    /// The issuer string, base64url encoded.
    pub iss_base64: String,
    /// The JWT header segment as transmitted, base64url encoded.
    pub header_base64: String,
    /// The address seed committed to by the proof.
    pub address_seed: AddressSeed,
}

/// A ZK-auth signature. Permanently invalid once the block height exceeds `max_block_height`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkAuthSignature {
    /// The inputs the proof was generated for.
    pub inputs: ZkAuthInputs,
    /// The last block height at which the signature is valid.
    pub max_block_height: u64,
}

/// A ZK-authenticated execution message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgZkExec {
    /// The signature authorizing the execution.
    pub signature: ZkAuthSignature,
    /// The opaque payload executed on success.
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
}

/// A message contained in a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    /// A ZK-authenticated execution.
    ZkExec(MsgZkExec),
    /// Any other ledger message.
    Other {
        /// The type url of the message.
        type_url: String,
        /// The encoded message.
        #[serde(with = "base64_bytes")]
        value: Vec<u8>,
    },
}

/// A transaction submitted for admission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tx {
    /// A transaction exposing one declared signer key per message.
    Signed {
        /// The messages.
        msgs: Vec<Msg>,
        /// The declared signer keys, matched to `msgs` by position.
        pubkeys: Vec<EphemeralPublicKey>,
    },
    /// A transaction without signer information.
    Unsigned {
        /// The messages.
        msgs: Vec<Msg>,
    },
}

impl Tx {
    /// Returns the messages of the transaction.
    pub fn msgs(&self) -> &[Msg] {
        match self {
            Tx::Signed { msgs, .. } | Tx::Unsigned { msgs } => msgs,
        }
    }

    /// Returns the declared signer keys, `None` for unsigned transactions.
    pub fn signer_pubkeys(&self) -> Option<&[EphemeralPublicKey]> {
        match self {
            Tx::Signed { pubkeys, .. } => Some(pubkeys),
            Tx::Unsigned { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zk_exec() -> Msg {
        Msg::ZkExec(MsgZkExec {
            signature: ZkAuthSignature {
                inputs: ZkAuthInputs {
                    proof: b"{}".to_vec(),
                    iss_base64: "aHR0cHM6Ly9hY2NvdW50cy5nb29nbGUuY29t".to_owned(),
                    header_base64: "eyJhbGciOiJSUzI1NiIsImtpZCI6IjEiLCJ0eXAiOiJKV1QifQ".to_owned(),
                    address_seed: AddressSeed::new("1"),
                },
                max_block_height: 10,
            },
            payload: vec![1, 2, 3],
        })
    }

    #[test]
    fn signed_tx_json_shape() {
        let tx = Tx::Signed {
            msgs: vec![zk_exec()],
            pubkeys: vec![EphemeralPublicKey::new(vec![2; 33])],
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["kind"], "signed");
        assert_eq!(value["msgs"][0]["type"], "zk_exec");
        assert_eq!(value["msgs"][0]["signature"]["max_block_height"], 10);
        assert_eq!(value["msgs"][0]["signature"]["inputs"]["proof"], "e30=");
        assert_eq!(value["msgs"][0]["payload"], "AQID");
        let back: Tx = serde_json::from_value(value).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn other_msg_and_unsigned() {
        let json = r#"{"kind":"unsigned","msgs":[{"type":"other","type_url":"/bank.MsgSend","value":"AAE="}]}"#;
        let tx: Tx = serde_json::from_str(json).unwrap();
        assert!(tx.signer_pubkeys().is_none());
        assert_eq!(
            tx.msgs(),
            &[Msg::Other {
                type_url: "/bank.MsgSend".to_owned(),
                value: vec![0, 1],
            }]
        );
    }

    #[test]
    fn unknown_msg_type_is_rejected() {
        let json = r#"{"kind":"unsigned","msgs":[{"type":"teleport"}]}"#;
        assert!(serde_json::from_str::<Tx>(json).is_err());
    }
}
