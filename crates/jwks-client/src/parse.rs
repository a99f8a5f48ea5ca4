//! JWK Set document parsing.
//!
//! Decodes a `{"keys":[…]}` document into a map of key ID to decoded key.
//! A malformed entry must not deny service for the rest of the set, so
//! entries that fail to decode are skipped, not fatal; only a document whose
//! envelope is not valid JSON is rejected.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{JwksError, JwksResult};
use crate::key::{Jwk, RawJwk};

#[derive(Debug, Default, Deserialize)]
struct RawJwkSet {
    #[serde(default)]
    keys: Vec<serde_json::Value>,
}

/// Parses a JWK Set document into a `kid -> key` map.
///
/// Entries with an unknown `kty`, an unsupported curve, missing parameters,
/// bad base64url, or an off-curve point are skipped. Entries without a `kid`
/// are discarded. When the same `kid` appears more than once, the last entry
/// in array order wins.
///
/// # Errors
///
/// Returns [`JwksError::InvalidJwks`] when the envelope is not valid JSON.
pub(crate) fn parse_jwk_set(bytes: &[u8]) -> JwksResult<HashMap<String, Arc<Jwk>>> {
    let raw: RawJwkSet =
        serde_json::from_slice(bytes).map_err(|err| JwksError::invalid_jwks(err.to_string()))?;

    let mut keys = HashMap::with_capacity(raw.keys.len());
    for entry in raw.keys {
        let raw_key: RawJwk = match serde_json::from_value(entry) {
            Ok(raw_key) => raw_key,
            Err(err) => {
                tracing::debug!(error = %err, "skipping malformed JWK entry");
                continue;
            }
        };
        if raw_key.kid.is_empty() {
            tracing::debug!("skipping JWK entry without a key ID");
            continue;
        }
        match Jwk::from_raw(&raw_key) {
            Ok(jwk) => {
                keys.insert(raw_key.kid.clone(), Arc::new(jwk));
            }
            Err(err) => {
                tracing::debug!(kid = %raw_key.kid, error = %err, "skipping undecodable JWK entry");
            }
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyMaterial, KeyUse};

    #[test]
    fn test_parse_empty_set() {
        let keys = parse_jwk_set(br#"{"keys":[]}"#).unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_parse_missing_keys_field() {
        let keys = parse_jwk_set(b"{}").unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_parse_invalid_envelope() {
        let err = parse_jwk_set(b"not json at all").unwrap_err();
        assert!(matches!(err, JwksError::InvalidJwks { .. }));
    }

    #[test]
    fn test_parse_skips_unknown_curve() {
        // An entry naming an unknown curve is skipped without failing the set.
        let doc = br#"{"keys":[{"kty":"EC","crv":"BAD","x":"MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4","y":"4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM","use":"sig","kid":"1"}]}"#;
        let keys = parse_jwk_set(doc).unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_parse_skips_entry_without_kid() {
        let doc = br#"{"keys":[{"kty":"oct","k":"c2VjcmV0"}]}"#;
        let keys = parse_jwk_set(doc).unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_parse_skips_mistyped_entry() {
        let doc = br#"{"keys":[{"kty":5},{"kty":"oct","kid":"good","k":"c2VjcmV0"}]}"#;
        let keys = parse_jwk_set(doc).unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("good"));
    }

    #[test]
    fn test_parse_duplicate_kid_last_wins() {
        let doc = br#"{"keys":[
            {"kty":"oct","kid":"dup","k":"Zmlyc3Q"},
            {"kty":"oct","kid":"dup","k":"c2Vjb25k"}
        ]}"#;
        let keys = parse_jwk_set(doc).unwrap();
        assert_eq!(keys.len(), 1);
        match keys["dup"].material() {
            KeyMaterial::Oct { secret } => assert_eq!(secret, b"second"),
            other => panic!("unexpected material: {other:?}"),
        }
    }

    #[test]
    fn test_parse_google_shaped_set() {
        // Shape emitted by Google's OIDC JWKS endpoint.
        let doc = br#"{
          "keys": [
            {
              "alg": "RS256",
              "kty": "RSA",
              "n": "tCwhHOxX_ylh5kVwfVqW7QIBTIsPjkjCjVCppDrynuF_3msEdtEaG64eJUz84ODFNMCC0BQ57G7wrKQVWkdSDxWUEqGk2BixBiHJRWZdofz1WOBTdPVicvHW5Zl_aIt7uXWMdOp_SODw-O2y2f05EqbFWFnR2-1y9K8KbiOp82CD72ny1Jbb_3PxTs2Z0F4ECAtTzpDteaJtjeeueRjr7040JAjQ-5fpL5D1g8x14LJyVIo-FL_y94NPFbMp7UCi69CIfVHXFO8WYFz949og-47mWRrID5lS4zpx-QLuvNhUb_lSqmylUdQB3HpRdOcYdj3xwy4MHJuu7tTaf0AmCQ",
              "use": "sig",
              "kid": "d98f49bc6ca4581eae8dfadd494fce10ea23aab0",
              "e": "AQAB"
            },
            {
              "kid": "VlsIs1LssBo6r8EuXJo81rDEoTYpUjiMkeq_PlapKfY",
              "kty": "EC",
              "alg": "ES256",
              "use": "sig",
              "crv": "P-256",
              "x": "3kqy7us0mepJJblWwj0Exg2S7PtWaJvB7SI_ptg0jrA",
              "y": "S5Z8d4AfCvRL-hUd6Pv-L3tH6H9T4RIwO2tvBS0hj1A"
            }
          ]
        }"#;
        let keys = parse_jwk_set(doc).unwrap();
        assert_eq!(keys.len(), 2);
        let rsa = &keys["d98f49bc6ca4581eae8dfadd494fce10ea23aab0"];
        assert_eq!(rsa.algorithm(), Some("RS256"));
        assert_eq!(rsa.key_use(), Some(&KeyUse::Signature));
        assert_eq!(
            keys["VlsIs1LssBo6r8EuXJo81rDEoTYpUjiMkeq_PlapKfY"]
                .material()
                .kty(),
            "EC"
        );
    }
}
