//! OIDC provider signing keys.
//!
//! A provider serves a [`JwkSet`]. Only RSA entries with modulus and exponent can be used to
//! build a public signal, those are converted into [`ProviderKey`]s.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// The key type of RSA keys.
pub const KTY_RSA: &str = "RSA";

/// Errors when converting a [`Jwk`] into a [`ProviderKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwkError {
    /// Only RSA keys are supported.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),
    /// A required member of the JWK is absent or empty.
    #[error("missing {0}")]
    MissingComponent(&'static str),
    /// A member is not valid base64url.
    #[error("invalid base64url in {0}")]
    InvalidBase64(&'static str),
    /// The JWT header segment does not decode to a header object.
    #[error("invalid JWT header: {0}")]
    InvalidHeader(String),
}

/// A single entry of a JWK set as served by the provider. Unknown members are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key id.
    #[serde(default)]
    pub kid: Option<String>,
    /// Key type, `RSA` for usable keys.
    #[serde(default)]
    pub kty: String,
    /// RSA modulus, base64url.
    #[serde(default)]
    pub n: Option<String>,
    /// RSA public exponent, base64url.
    #[serde(default)]
    pub e: Option<String>,
    /// Signature algorithm, e.g. `RS256`.
    #[serde(default)]
    pub alg: Option<String>,
    /// Intended key use, e.g. `sig`.
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
}

/// The document served by a provider's JWK endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// All keys currently published by the provider.
    pub keys: Vec<Jwk>,
}

/// A usable provider signing key, unique by `kid` within a registry snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderKey {
    /// Key id.
    pub kid: String,
    /// RSA modulus, base64url without padding.
    pub n: String,
    /// RSA public exponent, base64url without padding.
    pub e: String,
    /// Signature algorithm.
    pub alg: String,
}

impl ProviderKey {
    /// Decodes the RSA modulus as big-endian unsigned integer.
    pub fn modulus(&self) -> Result<BigUint, JwkError> {
        let bytes = decode_base64url(&self.n).map_err(|_| JwkError::InvalidBase64("n"))?;
        if bytes.is_empty() {
            return Err(JwkError::MissingComponent("n"));
        }
        Ok(BigUint::from_bytes_be(&bytes))
    }
}

impl TryFrom<Jwk> for ProviderKey {
    type Error = JwkError;

    fn try_from(jwk: Jwk) -> Result<Self, Self::Error> {
        if jwk.kty != KTY_RSA {
            return Err(JwkError::UnsupportedKeyType(jwk.kty));
        }
        let non_empty = |value: Option<String>, name| {
            value
                .map(|v| v.trim_end_matches('=').to_owned())
                .filter(|v| !v.is_empty())
                .ok_or(JwkError::MissingComponent(name))
        };
        let key = ProviderKey {
            kid: non_empty(jwk.kid, "kid")?,
            n: non_empty(jwk.n, "n")?,
            e: non_empty(jwk.e, "e")?,
            alg: jwk.alg.unwrap_or_else(|| "RS256".to_owned()),
        };
        key.modulus()?;
        decode_base64url(&key.e).map_err(|_| JwkError::InvalidBase64("e"))?;
        Ok(key)
    }
}

/// The decoded header segment of a JWT.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Signature algorithm.
    pub alg: String,
    /// Id of the provider key that signed the token.
    pub kid: String,
    /// Token type, usually `JWT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl JwtHeader {
    /// Decodes the base64url header segment as transmitted in the token.
    pub fn decode(segment: &str) -> Result<Self, JwkError> {
        let bytes = decode_base64url(segment).map_err(|_| JwkError::InvalidBase64("header"))?;
        serde_json::from_slice(&bytes).map_err(|err| JwkError::InvalidHeader(err.to_string()))
    }
}

/// Decodes base64url, tolerating trailing `=` padding.
pub fn decode_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s.trim_end_matches('='))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE_LIKE_SET: &str = r#"{
        "keys": [
            {"alg":"RS256","e":"AQAB","kid":"1","kty":"RSA","n":"6lq9MQ-q6hcxr7kOUp-tHlHtdcDsVLwVIw13iXUCvuDOeCi0VSuxCCUY6UmMjy53dX00ih2E4Y4UvlrmmurK0eG26b-HMNNAvCGsVXHU3RcRhVoHDaOwHwU72j7bpHn9XbP3Q3jebX6KIfNbei2MiR0Wyb8RZHE-aZhRYO8_-k9G2GycTpvc-2GBsP8VHLUKKfAs2B6sW3q3ymU6M0L-cFXkZ9fHkn9ejs-sqZPhMJxtBPBxoUIUQFTgv4VXTSv914f_YkNw-EjuwbgwXMvpyr06EyfImxHoxsZkFYB-qBYHtaMxTnFsZBr6fn8Ha2JqT1hoP7Z5r5wxDu3GQhKkHw","use":"sig"},
            {"kty":"EC","kid":"ec-1","crv":"P-256","x":"abc","y":"def"},
            {"kty":"RSA","kid":"no-modulus","e":"AQAB"}
        ]
    }"#;

    #[test]
    fn parse_set_and_filter_rsa() {
        let set: JwkSet = serde_json::from_str(GOOGLE_LIKE_SET).unwrap();
        assert_eq!(set.keys.len(), 3);
        let results = set
            .keys
            .into_iter()
            .map(ProviderKey::try_from)
            .collect::<Vec<_>>();
        let key = results[0].as_ref().unwrap();
        assert_eq!(key.kid, "1");
        assert_eq!(key.alg, "RS256");
        assert_eq!(key.modulus().unwrap().bits(), 2048);
        assert_eq!(
            results[1],
            Err(JwkError::UnsupportedKeyType("EC".to_owned()))
        );
        assert_eq!(results[2], Err(JwkError::MissingComponent("n")));
    }

    #[test]
    fn trailing_padding_is_trimmed() {
        let key = ProviderKey::try_from(Jwk {
            kid: Some("k".to_owned()),
            kty: KTY_RSA.to_owned(),
            n: Some("AQID==".to_owned()),
            e: Some("AQAB".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(key.n, "AQID");
        assert_eq!(key.modulus().unwrap(), BigUint::from(0x010203u32));
    }

    #[test]
    fn decode_jwt_header() {
        let header =
            JwtHeader::decode("eyJhbGciOiJSUzI1NiIsImtpZCI6IjEiLCJ0eXAiOiJKV1QifQ").unwrap();
        assert_eq!(
            header,
            JwtHeader {
                alg: "RS256".to_owned(),
                kid: "1".to_owned(),
                typ: Some("JWT".to_owned()),
            }
        );
        // {"alg":"RS256"}
        assert!(matches!(
            JwtHeader::decode("eyJhbGciOiJSUzI1NiJ9"),
            Err(JwkError::InvalidHeader(_))
        ));
        assert_eq!(
            JwtHeader::decode("%%%"),
            Err(JwkError::InvalidBase64("header"))
        );
    }

    #[test]
    fn invalid_modulus_is_rejected() {
        let result = ProviderKey::try_from(Jwk {
            kid: Some("k".to_owned()),
            kty: KTY_RSA.to_owned(),
            n: Some("not base64!".to_owned()),
            e: Some("AQAB".to_owned()),
            ..Default::default()
        });
        assert_eq!(result, Err(JwkError::InvalidBase64("n")));
    }
}
