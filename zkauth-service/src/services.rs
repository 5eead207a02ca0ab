//! Core services that make up the zkauth admission path.
//!
//! This module exposes the services used by the API and the admission gate:
//!
//! - [`jwk_registry`] – keeps the provider's signing keys fresh and serves lookups by kid.
//! - [`proof_verifier`] – checks Groth16 proofs against the loaded verification key.
//! - [`admission`] – runs the ZK checks on transactions and hands them to the next stage.

pub mod admission;
pub mod jwk_registry;
pub mod proof_verifier;
