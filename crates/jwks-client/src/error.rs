//! Error types for JWK Set operations.
//!
//! This module defines all error types that can occur while fetching,
//! decoding, and resolving JSON Web Keys.

/// Errors that can occur while fetching, decoding, and resolving JWKs.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JwksError {
    /// The JWT header does not carry a `kid` parameter.
    #[error("JWT header does not contain a \"kid\" parameter")]
    MissingKid,

    /// The JWT header does not carry an `alg` parameter.
    #[error(
        "JWT header does not contain the \"alg\" parameter required by RFC 7515 section 4.1.1"
    )]
    MissingAlg,

    /// The requested key ID was not found in the JWK Set.
    #[error("key ID {kid:?} was not found in the JWK Set")]
    KidNotFound {
        /// The key ID that was not found.
        kid: String,
    },

    /// The JWK carries an `alg` attribute that differs from the token header.
    #[error("JWK \"alg\" value {jwk_alg:?} does not match token \"alg\" value {token_alg:?}")]
    AlgMismatch {
        /// The algorithm declared by the JWK.
        jwk_alg: String,
        /// The algorithm declared by the JWT header.
        token_alg: String,
    },

    /// The JWK `use` attribute is not authorized for signature verification.
    #[error("JWK \"use\" value {key_use:?} is not authorized for signature verification")]
    UseMismatch {
        /// The `use` value carried by the JWK, or `"unspecified"`.
        key_use: String,
    },

    /// The JWK Set document could not be parsed as JSON.
    #[error("invalid JWK Set document: {message}")]
    InvalidJwks {
        /// Description of the parse failure.
        message: String,
    },

    /// The remote endpoint answered with a status the policy does not accept.
    #[error("remote JWK Set endpoint returned HTTP status {status}")]
    InvalidHttpStatus {
        /// The HTTP status code that was returned.
        status: u16,
    },

    /// A parameter required to build the verification key is absent or empty.
    #[error("JWK is missing required parameter {field:?}")]
    MissingAssets {
        /// Name of the missing JWK parameter.
        field: &'static str,
    },

    /// The JWK names an elliptic curve this crate does not support.
    #[error("JWK curve {crv:?} is not supported")]
    UnsupportedCurve {
        /// The `crv` value carried by the JWK.
        crv: String,
    },

    /// The JWK names a key type this crate does not support.
    #[error("JWK key type {kty:?} is not supported")]
    UnsupportedKeyType {
        /// The `kty` value carried by the JWK.
        kty: String,
    },

    /// The JWK parameters do not form a valid key (bad encoding, point off
    /// curve, wrong length).
    #[error("invalid JWK: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },

    /// The configured JWK Set URL could not be parsed.
    #[error("invalid JWK Set URL: {message}")]
    InvalidUrl {
        /// Description of the URL parse failure.
        message: String,
    },

    /// The HTTP request for the JWK Set failed at the transport level.
    #[error("HTTP request for JWK Set failed: {message}")]
    Http {
        /// Description of the transport failure.
        message: String,
    },

    /// A refresh did not complete within the configured timeout.
    #[error("JWK Set refresh timed out")]
    Timeout,
}

impl JwksError {
    /// Creates a new `KidNotFound` error.
    #[must_use]
    pub fn kid_not_found(kid: impl Into<String>) -> Self {
        Self::KidNotFound { kid: kid.into() }
    }

    /// Creates a new `AlgMismatch` error.
    #[must_use]
    pub fn alg_mismatch(jwk_alg: impl Into<String>, token_alg: impl Into<String>) -> Self {
        Self::AlgMismatch {
            jwk_alg: jwk_alg.into(),
            token_alg: token_alg.into(),
        }
    }

    /// Creates a new `UseMismatch` error.
    #[must_use]
    pub fn use_mismatch(key_use: impl Into<String>) -> Self {
        Self::UseMismatch {
            key_use: key_use.into(),
        }
    }

    /// Creates a new `InvalidJwks` error.
    #[must_use]
    pub fn invalid_jwks(message: impl Into<String>) -> Self {
        Self::InvalidJwks {
            message: message.into(),
        }
    }

    /// Creates a new `MissingAssets` error.
    #[must_use]
    pub fn missing_assets(field: &'static str) -> Self {
        Self::MissingAssets { field }
    }

    /// Creates a new `UnsupportedCurve` error.
    #[must_use]
    pub fn unsupported_curve(crv: impl Into<String>) -> Self {
        Self::UnsupportedCurve { crv: crv.into() }
    }

    /// Creates a new `UnsupportedKeyType` error.
    #[must_use]
    pub fn unsupported_key_type(kty: impl Into<String>) -> Self {
        Self::UnsupportedKeyType { kty: kty.into() }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Creates a new `Http` error.
    #[must_use]
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a `KidNotFound` error.
    #[must_use]
    pub fn is_kid_not_found(&self) -> bool {
        matches!(self, Self::KidNotFound { .. })
    }

    /// Returns `true` if the error was raised by a lookup policy check
    /// rather than a missing or undecodable key.
    #[must_use]
    pub fn is_policy_error(&self) -> bool {
        matches!(self, Self::AlgMismatch { .. } | Self::UseMismatch { .. })
    }

    /// Returns `true` if the error originates from the remote fetch path.
    #[must_use]
    pub fn is_refresh_error(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout | Self::InvalidHttpStatus { .. }
        )
    }
}

/// Type alias for results of JWK Set operations.
pub type JwksResult<T> = Result<T, JwksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JwksError::kid_not_found("abc123");
        assert_eq!(err.to_string(), "key ID \"abc123\" was not found in the JWK Set");

        let err = JwksError::alg_mismatch("RS256", "RS512");
        assert_eq!(
            err.to_string(),
            "JWK \"alg\" value \"RS256\" does not match token \"alg\" value \"RS512\""
        );

        let err = JwksError::unsupported_curve("P-512");
        assert_eq!(err.to_string(), "JWK curve \"P-512\" is not supported");

        let err = JwksError::missing_assets("n");
        assert_eq!(err.to_string(), "JWK is missing required parameter \"n\"");

        let err = JwksError::InvalidHttpStatus { status: 503 };
        assert_eq!(
            err.to_string(),
            "remote JWK Set endpoint returned HTTP status 503"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(JwksError::kid_not_found("x").is_kid_not_found());
        assert!(!JwksError::MissingKid.is_kid_not_found());

        assert!(JwksError::alg_mismatch("a", "b").is_policy_error());
        assert!(JwksError::use_mismatch("enc").is_policy_error());
        assert!(!JwksError::kid_not_found("x").is_policy_error());

        assert!(JwksError::Timeout.is_refresh_error());
        assert!(JwksError::http("connection refused").is_refresh_error());
        assert!(!JwksError::MissingAlg.is_refresh_error());
    }
}
