use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use zkauth_types::{
    EphemeralPublicKey,
    jwk::{Jwk, JwkSet, KTY_RSA},
};

/// Key id of the fixture provider key.
pub const GOOGLE_KID: &str = "1";
/// 2048-bit RSA modulus of the fixture provider key, base64url.
pub const GOOGLE_MODULUS: &str = "6lq9MQ-q6hcxr7kOUp-tHlHtdcDsVLwVIw13iXUCvuDOeCi0VSuxCCUY6UmMjy53dX00ih2E4Y4UvlrmmurK0eG26b-HMNNAvCGsVXHU3RcRhVoHDaOwHwU72j7bpHn9XbP3Q3jebX6KIfNbei2MiR0Wyb8RZHE-aZhRYO8_-k9G2GycTpvc-2GBsP8VHLUKKfAs2B6sW3q3ymU6M0L-cFXkZ9fHkn9ejs-sqZPhMJxtBPBxoUIUQFTgv4VXTSv914f_YkNw-EjuwbgwXMvpyr06EyfImxHoxsZkFYB-qBYHtaMxTnFsZBr6fn8Ha2JqT1hoP7Z5r5wxDu3GQhKkHw";
/// The issuer of the fixture tokens.
pub const GOOGLE_ISSUER: &str = "https://accounts.google.com";
/// `{"alg":"RS256","kid":"1","typ":"JWT"}`, base64url.
pub const HEADER_BASE64: &str = "eyJhbGciOiJSUzI1NiIsImtpZCI6IjEiLCJ0eXAiOiJKV1QifQ";
/// A canonical address seed.
pub const ADDRESS_SEED: &str =
    "2455937816256448139232531453880118833510874847675649348355284726183344259587";

/// An RSA JWK with exponent `AQAB`.
pub fn rsa_jwk(kid: &str, modulus: &str) -> Jwk {
    Jwk {
        kid: Some(kid.to_owned()),
        kty: KTY_RSA.to_owned(),
        n: Some(modulus.to_owned()),
        e: Some("AQAB".to_owned()),
        alg: Some("RS256".to_owned()),
        key_use: Some("sig".to_owned()),
    }
}

/// The fixture provider key as served by the provider.
pub fn google_jwk() -> Jwk {
    rsa_jwk(GOOGLE_KID, GOOGLE_MODULUS)
}

/// A JWK set containing only [`google_jwk`].
pub fn google_jwk_set() -> JwkSet {
    JwkSet {
        keys: vec![google_jwk()],
    }
}

/// The base64url JWT header segment for `kid`.
pub fn header_base64(kid: &str) -> String {
    let header = serde_json::json!({ "alg": "RS256", "kid": kid, "typ": "JWT" });
    URL_SAFE_NO_PAD.encode(header.to_string())
}

/// A 33-byte compressed-point-like signer key `[0x02, 1, 2, .., 32]`.
pub fn eph_pubkey() -> EphemeralPublicKey {
    EphemeralPublicKey::new(std::iter::once(2u8).chain(1..=32).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_for_fixture_kid() {
        // serde_json orders object keys alphabetically
        assert_eq!(header_base64(GOOGLE_KID), HEADER_BASE64);
    }
}
