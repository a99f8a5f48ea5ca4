//! Configuration for the JWKS cache.
//!
//! All options follow a builder pattern over [`JwksCacheConfig`]:
//!
//! ```ignore
//! let config = JwksCacheConfig::new()
//!     .with_refresh_interval(Duration::from_secs(3600))
//!     .with_refresh_rate_limit(Duration::from_secs(300))
//!     .with_refresh_unknown_kid(true);
//! let cache = JwksCache::from_url("https://auth.example.com/.well-known/jwks.json", config).await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::error::JwksError;
use crate::key::{GivenKey, KeyUse};

/// Default HTTP deadline for one refresh request.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(60);

/// Callback invoked with errors from background refreshes.
///
/// Invoked from the refresh worker task; it must not block.
pub type ErrorHandler = Arc<dyn Fn(&JwksError) + Send + Sync>;

/// Builds the HTTP request used for one refresh.
///
/// Overriding the factory allows adding authentication headers, a
/// `User-Agent`, or switching the method. The default is a plain GET with
/// `Accept: application/json`.
pub type RequestFactory = Arc<dyn Fn(&reqwest::Client, &Url) -> reqwest::RequestBuilder + Send + Sync>;

/// Which HTTP response statuses a refresh accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Accept `200 OK` only.
    #[default]
    RequireOk,
    /// Accept any status and attempt to parse the body.
    Any,
}

impl StatusPolicy {
    pub(crate) fn accepts(self, status: StatusCode) -> bool {
        match self {
            Self::RequireOk => status == StatusCode::OK,
            Self::Any => true,
        }
    }
}

/// Configuration for a [`JwksCache`](crate::JwksCache).
///
/// A background refresh worker is launched when `refresh_interval` is set or
/// `refresh_unknown_kid` is enabled. When pairing `refresh_unknown_kid` with
/// untrusted token sources, set `refresh_rate_limit`: without it, every
/// forged `kid` turns into a remote fetch.
#[derive(Clone, Default)]
pub struct JwksCacheConfig {
    /// HTTP client used for refreshes. A default client is built when unset.
    pub client: Option<reqwest::Client>,

    /// Caller-supplied keys merged into the key map on every refresh.
    pub given_keys: HashMap<String, GivenKey>,

    /// When `true`, given keys overwrite remote keys with the same `kid`.
    pub given_override: bool,

    /// Period of the background timer refresh. Unset disables timer
    /// refreshes.
    pub refresh_interval: Option<Duration>,

    /// Minimum wall-clock gap between two refreshes. Demand refreshes that
    /// arrive inside the gap are coalesced into one deferred refresh.
    pub refresh_rate_limit: Option<Duration>,

    /// HTTP deadline for one refresh request. Defaults to 60 seconds.
    pub refresh_timeout: Option<Duration>,

    /// When `true`, a lookup for an unknown `kid` triggers a refresh before
    /// giving up.
    pub refresh_unknown_kid: bool,

    /// Callback receiving background refresh errors. When unset, errors are
    /// logged at warn level.
    pub refresh_error_handler: Option<ErrorHandler>,

    /// Accepted values of the JWK `use` attribute. When non-empty, a key
    /// whose `use` is absent or not in the list is refused.
    pub use_whitelist: Vec<KeyUse>,

    /// Per-refresh HTTP request builder.
    pub request_factory: Option<RequestFactory>,

    /// Status-acceptance policy for refresh responses.
    pub status_policy: StatusPolicy,

    /// When `true`, construction succeeds even if the first fetch fails; the
    /// store starts empty and later refreshes can populate it.
    pub tolerate_initial_failure: bool,
}

impl JwksCacheConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP client used for refreshes.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Replaces the map of given keys.
    #[must_use]
    pub fn with_given_keys(mut self, given_keys: HashMap<String, GivenKey>) -> Self {
        self.given_keys = given_keys;
        self
    }

    /// Adds one given key under `kid`.
    #[must_use]
    pub fn with_given_key(mut self, kid: impl Into<String>, key: GivenKey) -> Self {
        self.given_keys.insert(kid.into(), key);
        self
    }

    /// Makes given keys overwrite remote keys with the same `kid`.
    #[must_use]
    pub fn with_given_override(mut self, given_override: bool) -> Self {
        self.given_override = given_override;
        self
    }

    /// Sets the background timer refresh period.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Sets the minimum gap between two refreshes.
    #[must_use]
    pub fn with_refresh_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.refresh_rate_limit = Some(rate_limit);
        self
    }

    /// Sets the HTTP deadline for one refresh request.
    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = Some(timeout);
        self
    }

    /// Enables refresh-on-unknown-`kid`.
    #[must_use]
    pub fn with_refresh_unknown_kid(mut self, refresh_unknown_kid: bool) -> Self {
        self.refresh_unknown_kid = refresh_unknown_kid;
        self
    }

    /// Sets the callback receiving background refresh errors.
    #[must_use]
    pub fn with_refresh_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.refresh_error_handler = Some(handler);
        self
    }

    /// Sets the accepted values of the JWK `use` attribute.
    #[must_use]
    pub fn with_use_whitelist(mut self, use_whitelist: Vec<KeyUse>) -> Self {
        self.use_whitelist = use_whitelist;
        self
    }

    /// Sets the per-refresh HTTP request builder.
    #[must_use]
    pub fn with_request_factory(mut self, factory: RequestFactory) -> Self {
        self.request_factory = Some(factory);
        self
    }

    /// Sets the status-acceptance policy for refresh responses.
    #[must_use]
    pub fn with_status_policy(mut self, status_policy: StatusPolicy) -> Self {
        self.status_policy = status_policy;
        self
    }

    /// Tolerates a failing first fetch at construction time.
    #[must_use]
    pub fn with_tolerate_initial_failure(mut self, tolerate: bool) -> Self {
        self.tolerate_initial_failure = tolerate;
        self
    }

    pub(crate) fn refresh_timeout(&self) -> Duration {
        self.refresh_timeout.unwrap_or(DEFAULT_REFRESH_TIMEOUT)
    }

    /// Returns `true` when a background refresh worker is needed: either a
    /// timer refresh or unknown-`kid` refresh is enabled.
    pub(crate) fn wants_worker(&self) -> bool {
        self.refresh_interval.is_some() || self.refresh_unknown_kid
    }
}

impl fmt::Debug for JwksCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwksCacheConfig")
            .field("given_keys", &self.given_keys.keys())
            .field("given_override", &self.given_override)
            .field("refresh_interval", &self.refresh_interval)
            .field("refresh_rate_limit", &self.refresh_rate_limit)
            .field("refresh_timeout", &self.refresh_timeout())
            .field("refresh_unknown_kid", &self.refresh_unknown_kid)
            .field("use_whitelist", &self.use_whitelist)
            .field("status_policy", &self.status_policy)
            .field("tolerate_initial_failure", &self.tolerate_initial_failure)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = JwksCacheConfig::default();
        assert!(config.client.is_none());
        assert!(config.given_keys.is_empty());
        assert!(!config.given_override);
        assert!(config.refresh_interval.is_none());
        assert!(config.refresh_rate_limit.is_none());
        assert_eq!(config.refresh_timeout(), Duration::from_secs(60));
        assert!(!config.refresh_unknown_kid);
        assert!(config.use_whitelist.is_empty());
        assert_eq!(config.status_policy, StatusPolicy::RequireOk);
        assert!(!config.tolerate_initial_failure);
        assert!(!config.wants_worker());
    }

    #[test]
    fn test_config_builder() {
        let config = JwksCacheConfig::new()
            .with_given_key("local", GivenKey::from_hmac_secret(b"secret".to_vec()))
            .with_given_override(true)
            .with_refresh_interval(Duration::from_secs(3600))
            .with_refresh_rate_limit(Duration::from_secs(300))
            .with_refresh_timeout(Duration::from_secs(5))
            .with_refresh_unknown_kid(true)
            .with_use_whitelist(vec![KeyUse::Signature])
            .with_status_policy(StatusPolicy::Any)
            .with_tolerate_initial_failure(true);

        assert!(config.given_keys.contains_key("local"));
        assert!(config.given_override);
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(3600)));
        assert_eq!(config.refresh_rate_limit, Some(Duration::from_secs(300)));
        assert_eq!(config.refresh_timeout(), Duration::from_secs(5));
        assert!(config.refresh_unknown_kid);
        assert_eq!(config.use_whitelist, vec![KeyUse::Signature]);
        assert_eq!(config.status_policy, StatusPolicy::Any);
        assert!(config.tolerate_initial_failure);
        assert!(config.wants_worker());
    }

    #[test]
    fn test_wants_worker_with_interval_only() {
        let config = JwksCacheConfig::new().with_refresh_interval(Duration::from_secs(60));
        assert!(config.wants_worker());
    }

    #[test]
    fn test_status_policy() {
        assert!(StatusPolicy::RequireOk.accepts(StatusCode::OK));
        assert!(!StatusPolicy::RequireOk.accepts(StatusCode::ACCEPTED));
        assert!(!StatusPolicy::RequireOk.accepts(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(StatusPolicy::Any.accepts(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
