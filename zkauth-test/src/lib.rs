//! Test harness for zkauth.
//!
//! - **fixtures**: a Google-style provider key, JWT header and address seed.
//! - **jwk_provider**: an axum server serving a JWK set that can be switched to fail.
//! - **prover**: a one-public-input Groth16 circuit producing real proofs and keys.
//! - **tx**: builders for ZK-authenticated transactions.
pub mod fixtures;
pub mod jwk_provider;
pub mod prover;
pub mod tx;

pub use jwk_provider::MockJwkProvider;
pub use prover::TestProver;
pub use tx::ZkExecBuilder;
