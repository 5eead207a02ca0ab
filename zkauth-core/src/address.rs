//! Account addresses of OIDC subjects.
//!
//! An address is bound to the address seed and the issuer. Issuers are normalized through an
//! alias table first, so that e.g. Google's bare `accounts.google.com` and its URL form map
//! to the same account.
use std::{collections::HashMap, str::FromStr, sync::LazyLock};

use zkauth_types::{Address, AddressSeed};

/// The BLAKE3 key derivation context of account addresses.
pub const ADDRESS_DERIVATION_CONTEXT: &str = "zkauth 2026-10-17 account address derivation";

static DEFAULT_ALIASES: LazyLock<IssuerAliases> = LazyLock::new(IssuerAliases::default);

/// Errors when deriving an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The seed is empty after trimming whitespace.
    #[error("address seed must not be empty")]
    EmptySeed,
    /// The issuer is longer than its length prefix can express.
    #[error("issuer of {0} bytes is too long")]
    IssuerTooLong(usize),
}

/// Error when parsing an [`IssuerAlias`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid issuer alias {0:?}, expected alias=canonical")]
pub struct InvalidIssuerAlias(String);

/// One entry of the alias table, parsed from `alias=canonical`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerAlias {
    /// The issuer as it may appear in a request.
    pub alias: String,
    /// The issuer used for derivation.
    pub canonical: String,
}

impl FromStr for IssuerAlias {
    type Err = InvalidIssuerAlias;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (alias, canonical) = s
            .split_once('=')
            .ok_or_else(|| InvalidIssuerAlias(s.to_owned()))?;
        let (alias, canonical) = (alias.trim(), canonical.trim());
        if alias.is_empty() || canonical.is_empty() {
            return Err(InvalidIssuerAlias(s.to_owned()));
        }
        Ok(Self {
            alias: alias.to_owned(),
            canonical: canonical.to_owned(),
        })
    }
}

/// Lookup table normalizing issuers before address derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerAliases(HashMap<String, String>);

impl Default for IssuerAliases {
    fn default() -> Self {
        Self(HashMap::from([(
            "accounts.google.com".to_owned(),
            "https://accounts.google.com".to_owned(),
        )]))
    }
}

impl Extend<IssuerAlias> for IssuerAliases {
    fn extend<T: IntoIterator<Item = IssuerAlias>>(&mut self, iter: T) {
        self.0.extend(
            iter.into_iter()
                .map(|IssuerAlias { alias, canonical }| (alias, canonical)),
        );
    }
}

impl IssuerAliases {
    /// Creates the built-in table extended with `aliases`. Later entries win.
    pub fn with_aliases(aliases: impl IntoIterator<Item = IssuerAlias>) -> Self {
        let mut table = Self::default();
        table.extend(aliases);
        table
    }

    /// Returns the canonical form of `issuer`, or `issuer` itself if it has no alias.
    pub fn normalize<'a>(&'a self, issuer: &'a str) -> &'a str {
        self.0.get(issuer).map(String::as_str).unwrap_or(issuer)
    }

    /// Derives the address of `seed` under the normalized `issuer`.
    ///
    /// The address is BLAKE3 in key derivation mode over
    /// `u16_be(len(issuer)) || issuer || seed`. The length prefix keeps the concatenation
    /// unambiguous. Whitespace is only considered when rejecting blank seeds, the seed bytes are
    /// hashed as given.
    pub fn derive_address(&self, seed: &AddressSeed, issuer: &str) -> Result<Address, AddressError> {
        let seed = seed.as_str();
        if seed.trim().is_empty() {
            return Err(AddressError::EmptySeed);
        }
        let issuer = self.normalize(issuer);
        let issuer_len =
            u16::try_from(issuer.len()).map_err(|_| AddressError::IssuerTooLong(issuer.len()))?;
        let mut hasher = blake3::Hasher::new_derive_key(ADDRESS_DERIVATION_CONTEXT);
        hasher.update(&issuer_len.to_be_bytes());
        hasher.update(issuer.as_bytes());
        hasher.update(seed.as_bytes());
        Ok(Address::new(*hasher.finalize().as_bytes()))
    }
}

/// Derives an address using the built-in alias table.
pub fn derive_address(seed: &AddressSeed, issuer: &str) -> Result<Address, AddressError> {
    DEFAULT_ALIASES.derive_address(seed, issuer)
}
