//! Versioned request and response types of the zkauth service API.

pub mod v1;
