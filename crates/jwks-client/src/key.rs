//! JWK decoding and verification-key material.
//!
//! A raw JWK entry is a JSON object whose meaning depends on its `kty`
//! parameter. This module decodes one entry into a [`Jwk`]: the validated
//! public material plus a ready-to-use [`jsonwebtoken::DecodingKey`].
//!
//! Supported key types:
//!
//! - **EC**: P-256, P-384, and P-521 curve points (validated on-curve)
//! - **RSA**: modulus + exponent public keys
//! - **OKP**: Ed25519 public keys
//! - **oct**: symmetric octet sequences (HMAC)
//!
//! Identity providers disagree on whether base64url values carry trailing
//! padding; both the RFC 7515 unpadded form and the padded form are accepted.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::VerifyingKey as Ed25519VerifyingKey;
use jsonwebtoken::{Algorithm, DecodingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use serde::Deserialize;

use crate::error::{JwksError, JwksResult};

/// Decodes a base64url value, accepting both the RFC 7515 unpadded form and
/// the padded form with trailing `=`.
pub(crate) fn decode_base64url(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(value.trim_end_matches('='))
}

fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// One raw key entry inside a JWK Set document.
///
/// All fields are base64url-encoded strings in the source form; which ones
/// are meaningful depends on `kty`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawJwk {
    #[serde(default)]
    pub alg: String,
    #[serde(default)]
    pub crv: String,
    #[serde(default)]
    pub e: String,
    #[serde(default)]
    pub k: String,
    #[serde(default)]
    pub kid: String,
    #[serde(default)]
    pub kty: String,
    #[serde(default)]
    pub n: String,
    #[serde(default, rename = "use")]
    pub key_use: String,
    #[serde(default)]
    pub x: String,
    #[serde(default)]
    pub y: String,
}

/// The intended use of a JWK, from the `use` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyUse {
    /// `"sig"` — signature verification.
    Signature,
    /// `"enc"` — encryption. Never authorized for signature verification.
    Encryption,
    /// Any other value, preserved verbatim.
    Other(String),
}

impl KeyUse {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "" => None,
            "sig" => Some(Self::Signature),
            "enc" => Some(Self::Encryption),
            other => Some(Self::Other(other.to_string())),
        }
    }

    /// Returns the JOSE string form of this value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Signature => "sig",
            Self::Encryption => "enc",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for KeyUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NIST elliptic curves supported for `kty = "EC"` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    /// The NIST P-256 curve (`ES256`).
    P256,
    /// The NIST P-384 curve (`ES384`).
    P384,
    /// The NIST P-521 curve (`ES512`).
    P521,
}

impl EcCurve {
    fn from_crv(crv: &str) -> Option<Self> {
        match crv {
            "P-256" => Some(Self::P256),
            "P-384" => Some(Self::P384),
            "P-521" => Some(Self::P521),
            _ => None,
        }
    }

    /// Returns the JOSE `crv` name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Size of one field element in bytes.
    fn field_size(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded public material of a verification key, tagged by key type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// An elliptic-curve point in affine coordinates, zero-padded to the
    /// curve field size.
    Ec {
        /// The named curve the point lies on.
        curve: EcCurve,
        /// Big-endian x coordinate.
        x: Vec<u8>,
        /// Big-endian y coordinate.
        y: Vec<u8>,
    },
    /// An RSA public key.
    Rsa {
        /// Big-endian modulus (`n`).
        modulus: Vec<u8>,
        /// Big-endian public exponent (`e`).
        exponent: Vec<u8>,
    },
    /// A compressed Ed25519 public point.
    Ed25519 {
        /// The 32-byte point encoding.
        point: [u8; 32],
    },
    /// A symmetric octet sequence.
    Oct {
        /// The raw secret bytes.
        secret: Vec<u8>,
    },
}

impl KeyMaterial {
    /// Returns the JOSE `kty` value for this material.
    #[must_use]
    pub fn kty(&self) -> &'static str {
        match self {
            Self::Ec { .. } => "EC",
            Self::Rsa { .. } => "RSA",
            Self::Ed25519 { .. } => "OKP",
            Self::Oct { .. } => "oct",
        }
    }

    fn to_decoding_key(&self) -> JwksResult<DecodingKey> {
        match self {
            Self::Ec { x, y, .. } => {
                DecodingKey::from_ec_components(&encode_base64url(x), &encode_base64url(y))
                    .map_err(|err| JwksError::invalid_key(err.to_string()))
            }
            Self::Rsa { modulus, exponent } => DecodingKey::from_rsa_components(
                &encode_base64url(modulus),
                &encode_base64url(exponent),
            )
            .map_err(|err| JwksError::invalid_key(err.to_string())),
            Self::Ed25519 { point } => DecodingKey::from_ed_components(&encode_base64url(point))
                .map_err(|err| JwksError::invalid_key(err.to_string())),
            Self::Oct { secret } => Ok(DecodingKey::from_secret(secret)),
        }
    }
}

/// A decoded verification key from a JWK Set.
///
/// Carries the key identifier, the optional `alg`/`use` attributes consulted
/// by lookup policy, the decoded public material, and a prebuilt
/// [`DecodingKey`] for [`jsonwebtoken::decode`].
#[derive(Clone)]
pub struct Jwk {
    kid: String,
    algorithm: Option<String>,
    key_use: Option<KeyUse>,
    material: KeyMaterial,
    decoding: DecodingKey,
}

impl Jwk {
    /// Decodes one raw JWK entry, dispatching on `kty`.
    pub(crate) fn from_raw(raw: &RawJwk) -> JwksResult<Self> {
        let material = match raw.kty.as_str() {
            "EC" => decode_ec(raw)?,
            "RSA" => decode_rsa(raw)?,
            "OKP" => decode_okp(raw)?,
            "oct" => decode_oct(raw)?,
            other => return Err(JwksError::unsupported_key_type(other)),
        };
        let decoding = material.to_decoding_key()?;
        Ok(Self {
            kid: raw.kid.clone(),
            algorithm: (!raw.alg.is_empty()).then(|| raw.alg.clone()),
            key_use: KeyUse::parse(&raw.key_use),
            material,
            decoding,
        })
    }

    /// The key identifier (`kid`).
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// The JOSE algorithm this key is bound to, if declared.
    #[must_use]
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// The declared `use` attribute, if any.
    #[must_use]
    pub fn key_use(&self) -> Option<&KeyUse> {
        self.key_use.as_ref()
    }

    /// The decoded public material.
    #[must_use]
    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    /// The decoding key to hand to [`jsonwebtoken::decode`].
    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwk")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("key_use", &self.key_use)
            .field("kty", &self.material.kty())
            .finish_non_exhaustive()
    }
}

fn decode_ec(raw: &RawJwk) -> JwksResult<KeyMaterial> {
    let curve = EcCurve::from_crv(&raw.crv).ok_or_else(|| JwksError::unsupported_curve(&raw.crv))?;
    if raw.x.is_empty() {
        return Err(JwksError::missing_assets("x"));
    }
    if raw.y.is_empty() {
        return Err(JwksError::missing_assets("y"));
    }
    let size = curve.field_size();
    let x = decode_coordinate(&raw.x, "x", size)?;
    let y = decode_coordinate(&raw.y, "y", size)?;
    validate_ec_point(curve, &x, &y)?;
    Ok(KeyMaterial::Ec { curve, x, y })
}

fn decode_rsa(raw: &RawJwk) -> JwksResult<KeyMaterial> {
    if raw.n.is_empty() {
        return Err(JwksError::missing_assets("n"));
    }
    if raw.e.is_empty() {
        return Err(JwksError::missing_assets("e"));
    }
    let modulus = decode_base64url(&raw.n)
        .map_err(|err| JwksError::invalid_key(format!("bad base64url in \"n\": {err}")))?;
    let exponent = decode_base64url(&raw.e)
        .map_err(|err| JwksError::invalid_key(format!("bad base64url in \"e\": {err}")))?;
    // Reject degenerate moduli and exponents up front.
    RsaPublicKey::new(
        BigUint::from_bytes_be(&modulus),
        BigUint::from_bytes_be(&exponent),
    )
    .map_err(|err| JwksError::invalid_key(err.to_string()))?;
    Ok(KeyMaterial::Rsa { modulus, exponent })
}

fn decode_okp(raw: &RawJwk) -> JwksResult<KeyMaterial> {
    if raw.crv != "Ed25519" {
        return Err(JwksError::unsupported_curve(&raw.crv));
    }
    if raw.x.is_empty() {
        return Err(JwksError::missing_assets("x"));
    }
    let bytes = decode_base64url(&raw.x)
        .map_err(|err| JwksError::invalid_key(format!("bad base64url in \"x\": {err}")))?;
    let point: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| JwksError::invalid_key("Ed25519 public key must be 32 bytes"))?;
    Ed25519VerifyingKey::from_bytes(&point)
        .map_err(|err| JwksError::invalid_key(err.to_string()))?;
    Ok(KeyMaterial::Ed25519 { point })
}

fn decode_oct(raw: &RawJwk) -> JwksResult<KeyMaterial> {
    if raw.k.is_empty() {
        return Err(JwksError::missing_assets("k"));
    }
    let secret = decode_base64url(&raw.k)
        .map_err(|err| JwksError::invalid_key(format!("bad base64url in \"k\": {err}")))?;
    Ok(KeyMaterial::Oct { secret })
}

/// Decodes one EC coordinate as a big-endian unsigned integer, zero-padded to
/// the curve field size.
fn decode_coordinate(value: &str, field: &'static str, size: usize) -> JwksResult<Vec<u8>> {
    let bytes = decode_base64url(value)
        .map_err(|err| JwksError::invalid_key(format!("bad base64url in {field:?}: {err}")))?;
    if bytes.len() > size {
        return Err(JwksError::invalid_key(format!(
            "{field:?} is longer than the curve field size"
        )));
    }
    let mut padded = vec![0u8; size];
    padded[size - bytes.len()..].copy_from_slice(&bytes);
    Ok(padded)
}

fn validate_ec_point(curve: EcCurve, x: &[u8], y: &[u8]) -> JwksResult<()> {
    let mut sec1 = Vec::with_capacity(1 + x.len() + y.len());
    sec1.push(0x04);
    sec1.extend_from_slice(x);
    sec1.extend_from_slice(y);
    let on_curve = match curve {
        EcCurve::P256 => p256::PublicKey::from_sec1_bytes(&sec1).is_ok(),
        EcCurve::P384 => p384::PublicKey::from_sec1_bytes(&sec1).is_ok(),
        EcCurve::P521 => p521::PublicKey::from_sec1_bytes(&sec1).is_ok(),
    };
    if on_curve {
        Ok(())
    } else {
        Err(JwksError::invalid_key("EC point is not on the named curve"))
    }
}

/// A verification key supplied by the host application rather than fetched
/// from the remote endpoint.
///
/// Given keys are merged into the key map on every refresh, so a remote
/// refresh can never silently remove them. Whether a given key overrides a
/// remote key with the same `kid` is controlled by
/// [`JwksCacheConfig::with_given_override`](crate::JwksCacheConfig::with_given_override).
///
/// # Example
///
/// ```ignore
/// let given = GivenKey::from_hmac_secret(b"top secret".to_vec()).with_algorithm("HS256");
/// let config = JwksCacheConfig::new().with_given_key("local", given);
/// ```
#[derive(Clone)]
pub struct GivenKey {
    algorithm: Option<String>,
    material: KeyMaterial,
    decoding: DecodingKey,
}

impl GivenKey {
    fn from_material(material: KeyMaterial) -> Self {
        // Re-encoding material we decoded ourselves is always valid base64url.
        let decoding = material
            .to_decoding_key()
            .expect("decoded key material re-encodes");
        Self {
            algorithm: None,
            material,
            decoding,
        }
    }

    /// Creates a given key from an RSA public key.
    #[must_use]
    pub fn from_rsa(key: &RsaPublicKey) -> Self {
        Self::from_material(KeyMaterial::Rsa {
            modulus: key.n().to_bytes_be(),
            exponent: key.e().to_bytes_be(),
        })
    }

    /// Creates a given key from a P-256 public key.
    #[must_use]
    pub fn from_p256(key: &p256::PublicKey) -> Self {
        let point = key.to_encoded_point(false);
        Self::from_material(KeyMaterial::Ec {
            curve: EcCurve::P256,
            x: point.x().expect("uncompressed point").to_vec(),
            y: point.y().expect("uncompressed point").to_vec(),
        })
    }

    /// Creates a given key from a P-384 public key.
    #[must_use]
    pub fn from_p384(key: &p384::PublicKey) -> Self {
        let point = key.to_encoded_point(false);
        Self::from_material(KeyMaterial::Ec {
            curve: EcCurve::P384,
            x: point.x().expect("uncompressed point").to_vec(),
            y: point.y().expect("uncompressed point").to_vec(),
        })
    }

    /// Creates a given key from a P-521 public key.
    #[must_use]
    pub fn from_p521(key: &p521::PublicKey) -> Self {
        let point = key.to_encoded_point(false);
        Self::from_material(KeyMaterial::Ec {
            curve: EcCurve::P521,
            x: point.x().expect("uncompressed point").to_vec(),
            y: point.y().expect("uncompressed point").to_vec(),
        })
    }

    /// Creates a given key from an Ed25519 public key.
    #[must_use]
    pub fn from_ed25519(key: &Ed25519VerifyingKey) -> Self {
        Self::from_material(KeyMaterial::Ed25519 {
            point: key.to_bytes(),
        })
    }

    /// Creates a given key from a symmetric HMAC secret.
    #[must_use]
    pub fn from_hmac_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self::from_material(KeyMaterial::Oct {
            secret: secret.into(),
        })
    }

    /// Binds this key to a JOSE algorithm, enforced on lookup.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    pub(crate) fn into_jwk(self, kid: String) -> Jwk {
        Jwk {
            kid,
            algorithm: self.algorithm,
            key_use: None,
            material: self.material,
            decoding: self.decoding,
        }
    }
}

impl fmt::Debug for GivenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GivenKey")
            .field("algorithm", &self.algorithm)
            .field("kty", &self.material.kty())
            .finish_non_exhaustive()
    }
}

/// Returns the JOSE name of a [`jsonwebtoken::Algorithm`].
#[must_use]
pub fn algorithm_name(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::HS256 => "HS256",
        Algorithm::HS384 => "HS384",
        Algorithm::HS512 => "HS512",
        Algorithm::ES256 => "ES256",
        Algorithm::ES384 => "ES384",
        Algorithm::RS256 => "RS256",
        Algorithm::RS384 => "RS384",
        Algorithm::RS512 => "RS512",
        Algorithm::PS256 => "PS256",
        Algorithm::PS384 => "PS384",
        Algorithm::PS512 => "PS512",
        Algorithm::EdDSA => "EdDSA",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // P-256 key from a Keycloak JWKS endpoint.
    const EC_X: &str = "3kqy7us0mepJJblWwj0Exg2S7PtWaJvB7SI_ptg0jrA";
    const EC_Y: &str = "S5Z8d4AfCvRL-hUd6Pv-L3tH6H9T4RIwO2tvBS0hj1A";

    fn ec_raw() -> RawJwk {
        RawJwk {
            kty: "EC".to_string(),
            crv: "P-256".to_string(),
            x: EC_X.to_string(),
            y: EC_Y.to_string(),
            kid: "ec-1".to_string(),
            alg: "ES256".to_string(),
            key_use: "sig".to_string(),
            ..RawJwk::default()
        }
    }

    #[test]
    fn test_decode_ec_p256() {
        let jwk = Jwk::from_raw(&ec_raw()).unwrap();
        assert_eq!(jwk.kid(), "ec-1");
        assert_eq!(jwk.algorithm(), Some("ES256"));
        assert_eq!(jwk.key_use(), Some(&KeyUse::Signature));
        match jwk.material() {
            KeyMaterial::Ec { curve, x, y } => {
                assert_eq!(*curve, EcCurve::P256);
                assert_eq!(x.len(), 32);
                assert_eq!(y.len(), 32);
            }
            other => panic!("unexpected material: {other:?}"),
        }
    }

    #[test]
    fn test_decode_ec_unknown_curve() {
        let mut raw = ec_raw();
        raw.crv = "BAD".to_string();
        let err = Jwk::from_raw(&raw).unwrap_err();
        assert!(matches!(err, JwksError::UnsupportedCurve { crv } if crv == "BAD"));
    }

    #[test]
    fn test_decode_ec_missing_coordinate() {
        let mut raw = ec_raw();
        raw.y = String::new();
        let err = Jwk::from_raw(&raw).unwrap_err();
        assert!(matches!(err, JwksError::MissingAssets { field: "y" }));
    }

    #[test]
    fn test_decode_ec_point_off_curve() {
        // (1, 1) does not satisfy the P-256 curve equation.
        let one = URL_SAFE_NO_PAD.encode({
            let mut buf = [0u8; 32];
            buf[31] = 1;
            buf
        });
        let mut raw = ec_raw();
        raw.x = one.clone();
        raw.y = one;
        let err = Jwk::from_raw(&raw).unwrap_err();
        assert!(matches!(err, JwksError::InvalidKey { .. }));
    }

    #[test]
    fn test_decode_ec_oversized_coordinate() {
        let mut raw = ec_raw();
        raw.x = URL_SAFE_NO_PAD.encode([1u8; 33]);
        let err = Jwk::from_raw(&raw).unwrap_err();
        assert!(matches!(err, JwksError::InvalidKey { .. }));
    }

    #[test]
    fn test_decode_rsa() {
        let raw = RawJwk {
            kty: "RSA".to_string(),
            kid: "rsa-1".to_string(),
            n: "tCwhHOxX_ylh5kVwfVqW7QIBTIsPjkjCjVCppDrynuF_3msEdtEaG64eJUz84ODFNMCC0BQ57G7wrKQVWkdSDxWUEqGk2BixBiHJRWZdofz1WOBTdPVicvHW5Zl_aIt7uXWMdOp_SODw-O2y2f05EqbFWFnR2-1y9K8KbiOp82CD72ny1Jbb_3PxTs2Z0F4ECAtTzpDteaJtjeeueRjr7040JAjQ-5fpL5D1g8x14LJyVIo-FL_y94NPFbMp7UCi69CIfVHXFO8WYFz949og-47mWRrID5lS4zpx-QLuvNhUb_lSqmylUdQB3HpRdOcYdj3xwy4MHJuu7tTaf0AmCQ"
                .to_string(),
            e: "AQAB".to_string(),
            ..RawJwk::default()
        };
        let jwk = Jwk::from_raw(&raw).unwrap();
        assert_eq!(jwk.material().kty(), "RSA");
        match jwk.material() {
            KeyMaterial::Rsa { modulus, exponent } => {
                assert_eq!(modulus.len(), 256);
                assert_eq!(exponent, &[0x01, 0x00, 0x01]);
            }
            other => panic!("unexpected material: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rsa_missing_exponent() {
        let raw = RawJwk {
            kty: "RSA".to_string(),
            kid: "rsa-1".to_string(),
            n: "tCwh".to_string(),
            ..RawJwk::default()
        };
        let err = Jwk::from_raw(&raw).unwrap_err();
        assert!(matches!(err, JwksError::MissingAssets { field: "e" }));
    }

    #[test]
    fn test_decode_okp_ed25519() {
        let signing = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
        let point = signing.verifying_key().to_bytes();
        let raw = RawJwk {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            x: URL_SAFE_NO_PAD.encode(point),
            kid: "ed-1".to_string(),
            ..RawJwk::default()
        };
        let jwk = Jwk::from_raw(&raw).unwrap();
        assert_eq!(jwk.material(), &KeyMaterial::Ed25519 { point });
    }

    #[test]
    fn test_decode_okp_wrong_curve() {
        let raw = RawJwk {
            kty: "OKP".to_string(),
            crv: "X25519".to_string(),
            x: URL_SAFE_NO_PAD.encode([7u8; 32]),
            kid: "ed-1".to_string(),
            ..RawJwk::default()
        };
        let err = Jwk::from_raw(&raw).unwrap_err();
        assert!(matches!(err, JwksError::UnsupportedCurve { crv } if crv == "X25519"));
    }

    #[test]
    fn test_decode_okp_wrong_length() {
        let raw = RawJwk {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            x: URL_SAFE_NO_PAD.encode([7u8; 31]),
            kid: "ed-1".to_string(),
            ..RawJwk::default()
        };
        let err = Jwk::from_raw(&raw).unwrap_err();
        assert!(matches!(err, JwksError::InvalidKey { .. }));
    }

    #[test]
    fn test_decode_oct_padding_equivalence() {
        let secret = b"secret-secret-secret";
        let unpadded = URL_SAFE_NO_PAD.encode(secret);
        let padded = format!("{unpadded}=");

        let decode = |k: String| {
            let raw = RawJwk {
                kty: "oct".to_string(),
                kid: "oct-1".to_string(),
                k,
                ..RawJwk::default()
            };
            Jwk::from_raw(&raw).unwrap()
        };

        let a = decode(unpadded);
        let b = decode(padded);
        assert_eq!(a.material(), b.material());
        assert_eq!(
            a.material(),
            &KeyMaterial::Oct {
                secret: secret.to_vec()
            }
        );
    }

    #[test]
    fn test_decode_unknown_kty() {
        let raw = RawJwk {
            kty: "PQC".to_string(),
            kid: "weird".to_string(),
            ..RawJwk::default()
        };
        let err = Jwk::from_raw(&raw).unwrap_err();
        assert!(matches!(err, JwksError::UnsupportedKeyType { kty } if kty == "PQC"));
    }

    #[test]
    fn test_key_use_parse() {
        assert_eq!(KeyUse::parse(""), None);
        assert_eq!(KeyUse::parse("sig"), Some(KeyUse::Signature));
        assert_eq!(KeyUse::parse("enc"), Some(KeyUse::Encryption));
        assert_eq!(
            KeyUse::parse("wrap"),
            Some(KeyUse::Other("wrap".to_string()))
        );
    }

    #[test]
    fn test_given_key_from_p256() {
        let secret = p256::SecretKey::from_slice(&[1u8; 32]).unwrap();
        let given = GivenKey::from_p256(&secret.public_key()).with_algorithm("ES256");
        let jwk = given.into_jwk("local".to_string());
        assert_eq!(jwk.kid(), "local");
        assert_eq!(jwk.algorithm(), Some("ES256"));
        assert!(matches!(
            jwk.material(),
            KeyMaterial::Ec {
                curve: EcCurve::P256,
                ..
            }
        ));
    }

    #[test]
    fn test_given_key_from_ed25519() {
        let signing = ed25519_dalek::SigningKey::from_bytes(&[9u8; 32]);
        let given = GivenKey::from_ed25519(&signing.verifying_key());
        let jwk = given.into_jwk("ed".to_string());
        assert_eq!(jwk.material().kty(), "OKP");
    }

    #[test]
    fn test_algorithm_name() {
        assert_eq!(algorithm_name(Algorithm::RS256), "RS256");
        assert_eq!(algorithm_name(Algorithm::ES384), "ES384");
        assert_eq!(algorithm_name(Algorithm::EdDSA), "EdDSA");
        assert_eq!(algorithm_name(Algorithm::HS512), "HS512");
    }
}
