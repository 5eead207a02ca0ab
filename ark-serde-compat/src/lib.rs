//! Serde helpers for BN254 values in the circom/snarkjs JSON representation.
//!
//! Field elements are decimal strings. Points are projective coordinates, `[x, y, z]` for
//! G1 and `[[x0, x1], [y0, y1], [z0, z1]]` for G2. Deserialized points are checked to be on
//! the curve and in the prime-order subgroup.
//!
//! The [`groth16`] module builds the snarkjs proof and verification key documents on top.

use std::str::FromStr;

use ark_ec::{
    AffineRepr as _, CurveGroup as _,
    short_weierstrass::{self, SWCurveConfig},
};
use serde::{Serializer, de, ser::SerializeSeq as _};

pub mod groth16;

/// Errors while decoding a BN254 value from its string representation.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// A coordinate or scalar is not a canonical decimal field element.
    #[error("invalid field element: {0}")]
    InvalidFieldElement(String),
    /// The point does not satisfy the curve equation.
    #[error("point is not on the curve")]
    NotOnCurve,
    /// The point is not in the prime-order subgroup.
    #[error("point is not in the correct subgroup")]
    NotInSubgroup,
}

/// Serializes a scalar field element as decimal string.
pub fn serialize_bn254_fr<S: Serializer>(f: &ark_bn254::Fr, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&f.to_string())
}

/// Serializes element of G1 using serializer
pub fn serialize_bn254_g1<S: Serializer>(
    p: &ark_bn254::G1Affine,
    ser: S,
) -> Result<S::Ok, S::Error> {
    let strings = g1_to_strings_projective(p);
    let mut seq = ser.serialize_seq(Some(strings.len()))?;
    for ele in strings {
        seq.serialize_element(&ele)?;
    }
    seq.end()
}

/// Serializes element of G2 using serializer
pub fn serialize_bn254_g2<S: Serializer>(
    p: &ark_bn254::G2Affine,
    ser: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = ser.serialize_seq(Some(3))?;
    match p.xy() {
        Some((x, y)) => {
            seq.serialize_element(&[x.c0.to_string(), x.c1.to_string()])?;
            seq.serialize_element(&[y.c0.to_string(), y.c1.to_string()])?;
            seq.serialize_element(&["1", "0"])?;
        }
        None => {
            seq.serialize_element(&["0", "0"])?;
            seq.serialize_element(&["1", "0"])?;
            seq.serialize_element(&["0", "0"])?;
        }
    }
    seq.end()
}

/// Serializes a sequence of G1 elements, e.g. the `IC` of a verification key.
pub fn serialize_bn254_g1_sequence<S: Serializer>(
    ps: &[ark_bn254::G1Affine],
    ser: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = ser.serialize_seq(Some(ps.len()))?;
    for p in ps {
        seq.serialize_element(&g1_to_strings_projective(p))?;
    }
    seq.end()
}

/// Deserializes a scalar field element from a decimal string.
pub fn deserialize_bn254_fr<'de, D>(deserializer: D) -> Result<ark_bn254::Fr, D::Error>
where
    D: de::Deserializer<'de>,
{
    deserializer.deserialize_str(Bn254FrVisitor)
}

pub fn deserialize_bn254_g1<'de, D>(deserializer: D) -> Result<ark_bn254::G1Affine, D::Error>
where
    D: de::Deserializer<'de>,
{
    deserializer.deserialize_seq(Bn254G1Visitor)
}

pub fn deserialize_bn254_g2<'de, D>(deserializer: D) -> Result<ark_bn254::G2Affine, D::Error>
where
    D: de::Deserializer<'de>,
{
    deserializer.deserialize_seq(Bn254G2Visitor)
}

pub fn deserialize_bn254_g1_sequence<'de, D>(
    deserializer: D,
) -> Result<Vec<ark_bn254::G1Affine>, D::Error>
where
    D: de::Deserializer<'de>,
{
    deserializer.deserialize_seq(Bn254G1SeqVisitor)
}

const FR_MODULUS_DECIMAL: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Parses a canonical decimal field element. Rejects signs, leading zeros and values that
/// are not reduced modulo the field order.
pub fn fr_from_decimal(s: &str) -> Result<ark_bn254::Fr, SerializationError> {
    let invalid = || SerializationError::InvalidFieldElement(s.to_owned());
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if s.len() > 1 && s.starts_with('0') {
        return Err(invalid());
    }
    // equal length digit strings compare like the numbers they encode
    let modulus_len = FR_MODULUS_DECIMAL.len();
    if s.len() > modulus_len || (s.len() == modulus_len && s >= FR_MODULUS_DECIMAL) {
        return Err(invalid());
    }
    ark_bn254::Fr::from_str(s).map_err(|_| invalid())
}

fn fq(s: &str) -> Result<ark_bn254::Fq, SerializationError> {
    ark_bn254::Fq::from_str(s).map_err(|_| SerializationError::InvalidFieldElement(s.to_owned()))
}

fn g1_to_strings_projective(p: &ark_bn254::G1Affine) -> Vec<String> {
    if let Some((x, y)) = p.xy() {
        vec![x.to_string(), y.to_string(), "1".to_owned()]
    } else {
        //point at infinity
        vec!["0".to_owned(), "1".to_owned(), "0".to_owned()]
    }
}

fn check_point<C: SWCurveConfig>(
    p: short_weierstrass::Affine<C>,
) -> Result<short_weierstrass::Affine<C>, SerializationError> {
    if p.is_zero() {
        Ok(p)
    } else if !p.is_on_curve() {
        Err(SerializationError::NotOnCurve)
    } else if !p.is_in_correct_subgroup_assuming_on_curve() {
        Err(SerializationError::NotInSubgroup)
    } else {
        Ok(p)
    }
}

fn g1_from_strings_projective(
    x: &str,
    y: &str,
    z: &str,
) -> Result<ark_bn254::G1Affine, SerializationError> {
    let p = ark_bn254::G1Projective::new_unchecked(fq(x)?, fq(y)?, fq(z)?).into_affine();
    check_point(p)
}

fn g2_from_strings_projective(
    [x0, x1]: &[String; 2],
    [y0, y1]: &[String; 2],
    [z0, z1]: &[String; 2],
) -> Result<ark_bn254::G2Affine, SerializationError> {
    let x = ark_bn254::Fq2::new(fq(x0)?, fq(x1)?);
    let y = ark_bn254::Fq2::new(fq(y0)?, fq(y1)?);
    let z = ark_bn254::Fq2::new(fq(z0)?, fq(z1)?);
    let p = ark_bn254::G2Projective::new_unchecked(x, y, z).into_affine();
    check_point(p)
}

struct Bn254FrVisitor;

impl de::Visitor<'_> for Bn254FrVisitor {
    type Value = ark_bn254::Fr;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal string representing a BN254 scalar field element")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        fr_from_decimal(v).map_err(E::custom)
    }
}

struct Bn254G1Visitor;

impl<'de> de::Visitor<'de> for Bn254G1Visitor {
    type Value = ark_bn254::G1Affine;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence of 3 strings, representing a projective point on G1")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let x = seq
            .next_element::<String>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let y = seq
            .next_element::<String>()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let z = seq
            .next_element::<String>()?
            .ok_or_else(|| de::Error::invalid_length(2, &self))?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(4, &self));
        }
        g1_from_strings_projective(&x, &y, &z)
            .map_err(|err| de::Error::custom(format!("invalid point on G1: {err}")))
    }
}

struct Bn254G2Visitor;

impl<'de> de::Visitor<'de> for Bn254G2Visitor {
    type Value = ark_bn254::G2Affine;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str(
            "a sequence of 3 pairs of strings, representing a projective point on G2",
        )
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let x = seq
            .next_element::<[String; 2]>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let y = seq
            .next_element::<[String; 2]>()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let z = seq
            .next_element::<[String; 2]>()?
            .ok_or_else(|| de::Error::invalid_length(2, &self))?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(4, &self));
        }
        g2_from_strings_projective(&x, &y, &z)
            .map_err(|err| de::Error::custom(format!("invalid point on G2: {err}")))
    }
}

struct Bn254G1SeqVisitor;

impl<'de> de::Visitor<'de> for Bn254G1SeqVisitor {
    type Value = Vec<ark_bn254::G1Affine>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence of projective points on G1")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some([x, y, z]) = seq.next_element::<[String; 3]>()? {
            values.push(
                g1_from_strings_projective(&x, &y, &z)
                    .map_err(|err| de::Error::custom(format!("invalid point on G1: {err}")))?,
            );
        }
        Ok(values)
    }
}
