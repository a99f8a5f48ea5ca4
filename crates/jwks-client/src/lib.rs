//! # jwks-client
//!
//! A caching JWKS client that resolves JWT verification keys by key ID.
//!
//! This crate maintains an in-memory, concurrency-safe mapping from `kid`
//! to cryptographic verification key, populated from a remote JWK Set
//! endpoint and/or caller-supplied keys, and exposes a lookup suitable as
//! the key-resolution step of JWT signature validation.
//!
//! ## Overview
//!
//! - Background refresh on a fixed interval
//! - Refresh on demand when a token references an unknown `kid`, with rate
//!   limiting and coalescing to bound work triggered by forged tokens
//! - Unchanged-payload short-circuit: identical bytes never rebuild the map
//! - Caller-supplied given keys that survive every refresh
//! - `alg` and `use` policy enforcement on lookup
//! - Aggregation of several key sets with configurable precedence
//!
//! ## Modules
//!
//! - [`cache`] - The [`JwksCache`] client and key resolution
//! - [`config`] - Configuration options
//! - [`error`] - Error types
//! - [`key`] - JWK decoding and key material
//! - [`multi`] - Aggregation of several caches
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use jwks_client::{JwksCache, JwksCacheConfig};
//!
//! let config = JwksCacheConfig::new()
//!     .with_refresh_interval(Duration::from_secs(3600))
//!     .with_refresh_rate_limit(Duration::from_secs(300))
//!     .with_refresh_unknown_kid(true);
//! let cache = JwksCache::from_url("https://auth.example.com/.well-known/jwks.json", config).await?;
//!
//! let header = jsonwebtoken::decode_header(&token)?;
//! let key = cache.key_for(&header).await?;
//! let data = jsonwebtoken::decode::<Claims>(&token, key.decoding_key(), &validation)?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod multi;

mod fetch;
mod parse;
mod refresh;
mod store;

pub use cache::JwksCache;
pub use config::{
    DEFAULT_REFRESH_TIMEOUT, ErrorHandler, JwksCacheConfig, RequestFactory, StatusPolicy,
};
pub use error::{JwksError, JwksResult};
pub use fetch::RefreshStats;
pub use key::{EcCurve, GivenKey, Jwk, KeyMaterial, KeyUse, algorithm_name};
pub use multi::{MultiJwksCache, ResolveStrategy};
