//! snarkjs JSON documents for Groth16 over BN254 (`bn128` in snarkjs terms).
use ark_bn254::Bn254;
use serde::{Deserialize, Serialize};

/// The `protocol` tag snarkjs writes for Groth16.
pub const PROTOCOL_GROTH16: &str = "groth16";
/// The `curve` tag snarkjs writes for BN254.
pub const CURVE_BN128: &str = "bn128";

fn default_protocol() -> String {
    PROTOCOL_GROTH16.to_owned()
}

fn default_curve() -> String {
    CURVE_BN128.to_owned()
}

/// A proof in the Groth16 SNARK.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Groth16Proof {
    /// The `A` element in `G1`.
    #[serde(rename = "pi_a")]
    #[serde(serialize_with = "crate::serialize_bn254_g1")]
    #[serde(deserialize_with = "crate::deserialize_bn254_g1")]
    pub a: ark_bn254::G1Affine,
    /// The `B` element in `G2`.
    #[serde(rename = "pi_b")]
    #[serde(serialize_with = "crate::serialize_bn254_g2")]
    #[serde(deserialize_with = "crate::deserialize_bn254_g2")]
    pub b: ark_bn254::G2Affine,
    /// The `C` element in `G1`.
    #[serde(rename = "pi_c")]
    #[serde(serialize_with = "crate::serialize_bn254_g1")]
    #[serde(deserialize_with = "crate::deserialize_bn254_g1")]
    pub c: ark_bn254::G1Affine,
    /// Proof system tag, `groth16`.
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Curve tag, `bn128`.
    #[serde(default = "default_curve")]
    pub curve: String,
}

impl Groth16Proof {
    /// Returns `true` if the document claims to be a Groth16 proof over BN254.
    pub fn is_groth16_bn128(&self) -> bool {
        self.protocol == PROTOCOL_GROTH16 && self.curve == CURVE_BN128
    }
}

impl From<Groth16Proof> for ark_groth16::Proof<Bn254> {
    fn from(value: Groth16Proof) -> Self {
        Self {
            a: value.a,
            b: value.b,
            c: value.c,
        }
    }
}

impl From<ark_groth16::Proof<Bn254>> for Groth16Proof {
    fn from(value: ark_groth16::Proof<Bn254>) -> Self {
        Self {
            a: value.a,
            b: value.b,
            c: value.c,
            protocol: default_protocol(),
            curve: default_curve(),
        }
    }
}

/// A Groth16 verification key as written by `snarkjs zkey export verificationkey`.
///
/// Only the fields needed for verification are kept, `vk_alphabeta_12` is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Groth16VerificationKey {
    /// Proof system tag, `groth16`.
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Curve tag, `bn128`.
    #[serde(default = "default_curve")]
    pub curve: String,
    /// Number of public inputs.
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    #[serde(rename = "vk_alpha_1")]
    #[serde(serialize_with = "crate::serialize_bn254_g1")]
    #[serde(deserialize_with = "crate::deserialize_bn254_g1")]
    pub alpha_1: ark_bn254::G1Affine,
    #[serde(rename = "vk_beta_2")]
    #[serde(serialize_with = "crate::serialize_bn254_g2")]
    #[serde(deserialize_with = "crate::deserialize_bn254_g2")]
    pub beta_2: ark_bn254::G2Affine,
    #[serde(rename = "vk_gamma_2")]
    #[serde(serialize_with = "crate::serialize_bn254_g2")]
    #[serde(deserialize_with = "crate::deserialize_bn254_g2")]
    pub gamma_2: ark_bn254::G2Affine,
    #[serde(rename = "vk_delta_2")]
    #[serde(serialize_with = "crate::serialize_bn254_g2")]
    #[serde(deserialize_with = "crate::deserialize_bn254_g2")]
    pub delta_2: ark_bn254::G2Affine,
    /// One element per public input plus the constant term.
    #[serde(rename = "IC")]
    #[serde(serialize_with = "crate::serialize_bn254_g1_sequence")]
    #[serde(deserialize_with = "crate::deserialize_bn254_g1_sequence")]
    pub ic: Vec<ark_bn254::G1Affine>,
}

/// Errors returned by [`Groth16VerificationKey::validate`].
#[derive(Debug, thiserror::Error)]
pub enum VerificationKeyError {
    #[error("expected groth16/bn128 but got {protocol}/{curve}")]
    UnsupportedProtocol { protocol: String, curve: String },
    #[error("nPublic is {n_public} but IC has {ic} elements")]
    InconsistentIc { n_public: usize, ic: usize },
}

impl Groth16VerificationKey {
    /// Checks the protocol tags and that `IC` has `nPublic + 1` elements.
    pub fn validate(&self) -> Result<(), VerificationKeyError> {
        if self.protocol != PROTOCOL_GROTH16 || self.curve != CURVE_BN128 {
            return Err(VerificationKeyError::UnsupportedProtocol {
                protocol: self.protocol.clone(),
                curve: self.curve.clone(),
            });
        }
        if self.ic.len() != self.n_public + 1 {
            return Err(VerificationKeyError::InconsistentIc {
                n_public: self.n_public,
                ic: self.ic.len(),
            });
        }
        Ok(())
    }
}

impl From<Groth16VerificationKey> for ark_groth16::VerifyingKey<Bn254> {
    fn from(value: Groth16VerificationKey) -> Self {
        Self {
            alpha_g1: value.alpha_1,
            beta_g2: value.beta_2,
            gamma_g2: value.gamma_2,
            delta_g2: value.delta_2,
            gamma_abc_g1: value.ic,
        }
    }
}

impl From<ark_groth16::VerifyingKey<Bn254>> for Groth16VerificationKey {
    fn from(value: ark_groth16::VerifyingKey<Bn254>) -> Self {
        Self {
            protocol: default_protocol(),
            curve: default_curve(),
            n_public: value.gamma_abc_g1.len().saturating_sub(1),
            alpha_1: value.alpha_g1,
            beta_2: value.beta_g2,
            gamma_2: value.gamma_g2,
            delta_2: value.delta_g2,
            ic: value.gamma_abc_g1,
        }
    }
}
