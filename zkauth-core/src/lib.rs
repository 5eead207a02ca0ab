//! Pure building blocks of zkauth admission.
//!
//! Modules include:
//! - **encoding**: packing strings, signer keys and RSA moduli into BN254 scalars.
//! - **public_signal**: the single public input the zkauth circuit is verified against.
//! - **address**: deterministic account addresses for OIDC subjects.
pub mod address;
pub mod encoding;
pub mod public_signal;

pub use address::{AddressError, IssuerAlias, IssuerAliases, derive_address};
pub use encoding::EncodingError;
pub use public_signal::compute_all_inputs_hash;
