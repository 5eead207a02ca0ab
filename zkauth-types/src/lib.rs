#![deny(missing_docs)]
//! Core type definitions for zkauth.
//!
//! This crate groups together the strongly-typed values and message
//! structures shared by the admission core and the service. It provides:
//!
//! * Thin wrappers around primitive values such as addresses, address seeds and
//!   ephemeral public keys, with consistent serialization and display implementations.
//! * OIDC provider keys as fetched from a JWK endpoint (see [`jwk`] module).
//! * Transactions and their sub-messages as seen by the admission gate (see [`tx`] module).
//! * API versioned types for client/server communication (see [`api`] module).

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

pub mod api;
pub mod jwk;
pub mod tx;

/// Default interval between two provider key fetches, in seconds.
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 3600;

/// A 32-byte account address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 32]);

/// Error when parsing an [`Address`] from a string.
#[derive(Debug, thiserror::Error)]
#[error("invalid address, expected 0x-prefixed hex of 32 bytes")]
pub struct InvalidAddress;

impl Address {
    /// Creates a new `Address` by wrapping 32 bytes.
    pub fn new(value: [u8; 32]) -> Self {
        Self(value)
    }

    /// Converts the address to its bytes.
    pub fn into_inner(self) -> [u8; 32] {
        self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").ok_or(InvalidAddress)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidAddress)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A decimal-string-encoded integer unique per OIDC subject. Opaque beyond being hashed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressSeed(String);

impl AddressSeed {
    /// Creates a new `AddressSeed` by wrapping the decimal string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the decimal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the seed into the decimal string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AddressSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The raw bytes of a transaction's declared signing key, supplied fresh per session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EphemeralPublicKey(#[serde(with = "base64_bytes")] Vec<u8>);

impl EphemeralPublicKey {
    /// Creates a new `EphemeralPublicKey` from raw bytes.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self(value.into())
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for EphemeralPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Persisted module parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Interval between two provider key fetches, in seconds.
    pub fetch_interval_secs: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            fetch_interval_secs: DEFAULT_FETCH_INTERVAL_SECS,
        }
    }
}

impl Params {
    /// Returns the fetch interval as [`Duration`].
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs)
    }
}

/// Serde helpers encoding raw bytes as standard base64 strings.
pub mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize as _, Deserializer, Serializer, de};

    /// Serializes bytes as a base64 string.
    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    /// Deserializes bytes from a base64 string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(de::Error::custom)
    }
}
