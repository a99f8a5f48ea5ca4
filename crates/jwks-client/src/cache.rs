//! The JWKS cache: key resolution for JWT verification.
//!
//! [`JwksCache`] maintains an in-memory mapping from key ID to verification
//! key, populated from a remote JWK Set endpoint and/or caller-supplied
//! given keys, and resolves the `kid`/`alg` pair of a JWT header to a key.
//!
//! # Example
//!
//! ```ignore
//! use jwks_client::{JwksCache, JwksCacheConfig};
//!
//! let config = JwksCacheConfig::new()
//!     .with_refresh_interval(Duration::from_secs(3600))
//!     .with_refresh_unknown_kid(true)
//!     .with_refresh_rate_limit(Duration::from_secs(300));
//! let cache = JwksCache::from_url("https://auth.example.com/.well-known/jwks.json", config).await?;
//!
//! let header = jsonwebtoken::decode_header(&token)?;
//! let key = cache.key_for(&header).await?;
//! let claims = jsonwebtoken::decode::<Claims>(&token, key.decoding_key(), &validation)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use url::Url;

use crate::config::JwksCacheConfig;
use crate::error::{JwksError, JwksResult};
use crate::fetch::{Fetcher, RefreshStats};
use crate::key::{GivenKey, Jwk, KeyUse, algorithm_name};
use crate::parse::parse_jwk_set;
use crate::refresh::{RefreshRequest, RefreshWorker};
use crate::store::KeyStore;

/// A caching client for one JWK Set.
///
/// Lookups, snapshots, and refreshes may run concurrently; the key map is
/// only ever replaced atomically, so readers never observe a half-built
/// state. A background worker owns all refreshes. The worker stops when
/// [`shutdown`](Self::shutdown) is called or the cache is dropped.
pub struct JwksCache {
    store: Arc<KeyStore>,
    fetcher: Option<Arc<Fetcher>>,
    demand: Option<mpsc::Sender<RefreshRequest>>,
    shutdown: Option<watch::Sender<bool>>,
    refresh_unknown_kid: bool,
    use_whitelist: Vec<KeyUse>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache").finish_non_exhaustive()
    }
}

impl JwksCache {
    /// Creates a cache backed by a remote JWK Set endpoint.
    ///
    /// The endpoint is fetched once before this returns; a failing first
    /// fetch fails construction unless
    /// [`with_tolerate_initial_failure`](JwksCacheConfig::with_tolerate_initial_failure)
    /// is set. A background refresh worker is spawned when a refresh
    /// interval or unknown-`kid` refresh is configured.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL does not parse or the initial fetch
    /// fails and is not tolerated.
    pub async fn from_url(jwks_url: &str, mut config: JwksCacheConfig) -> JwksResult<Self> {
        let url = Url::parse(jwks_url).map_err(|err| JwksError::invalid_url(err.to_string()))?;
        // A zero interval means "no timer refresh".
        config.refresh_interval = config.refresh_interval.filter(|period| !period.is_zero());
        let client = config.client.take().unwrap_or_default();
        let given = convert_given(std::mem::take(&mut config.given_keys));
        let store = Arc::new(KeyStore::new(
            HashMap::new(),
            Vec::new(),
            given,
            config.given_override,
        ));
        let fetcher = Arc::new(Fetcher::new(
            client,
            url,
            config.request_factory.clone(),
            config.status_policy,
            config.refresh_timeout(),
            store.clone(),
        ));

        match fetcher.refresh().await {
            Ok(_) => {}
            Err(err) if config.tolerate_initial_failure => match &config.refresh_error_handler {
                Some(handler) => handler(&err),
                None => tracing::warn!(error = %err, "initial JWK Set fetch failed"),
            },
            Err(err) => return Err(err),
        }
        // The initial fetch counts against the rate limit, so a demand storm
        // right after startup is already bounded.
        let initial_refresh = Instant::now();

        let (demand, shutdown) = if config.wants_worker() {
            let (demand_tx, demand_rx) = mpsc::channel(1);
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let worker = RefreshWorker::new(
                fetcher.clone(),
                config.refresh_interval,
                config.refresh_rate_limit,
                config.refresh_error_handler.clone(),
                demand_rx,
                demand_tx.clone(),
                shutdown_rx,
                Some(initial_refresh),
            );
            tokio::spawn(worker.run());
            (Some(demand_tx), Some(shutdown_tx))
        } else {
            (None, None)
        };

        Ok(Self {
            store,
            fetcher: Some(fetcher),
            demand,
            shutdown,
            refresh_unknown_kid: config.refresh_unknown_kid,
            use_whitelist: config.use_whitelist,
        })
    }

    /// Creates a static cache from a JWK Set document.
    ///
    /// No background worker is spawned and the contents never change.
    ///
    /// # Errors
    ///
    /// Returns [`JwksError::InvalidJwks`] when the document is not valid
    /// JSON. Individual undecodable entries are skipped, not fatal.
    pub fn from_json(bytes: impl AsRef<[u8]>) -> JwksResult<Self> {
        Self::from_json_with(bytes, JwksCacheConfig::default())
    }

    /// Creates a static cache from a JWK Set document with explicit
    /// configuration (given keys and lookup policy apply; refresh options
    /// are ignored since there is no remote endpoint).
    ///
    /// # Errors
    ///
    /// Returns [`JwksError::InvalidJwks`] when the document is not valid
    /// JSON.
    pub fn from_json_with(bytes: impl AsRef<[u8]>, config: JwksCacheConfig) -> JwksResult<Self> {
        let bytes = bytes.as_ref();
        let keys = parse_jwk_set(bytes)?;
        let given = convert_given(config.given_keys);
        let store = Arc::new(KeyStore::new(
            keys,
            bytes.to_vec(),
            given,
            config.given_override,
        ));
        Ok(Self {
            store,
            fetcher: None,
            demand: None,
            shutdown: None,
            refresh_unknown_kid: false,
            use_whitelist: config.use_whitelist,
        })
    }

    /// Creates a static cache holding only caller-supplied keys.
    #[must_use]
    pub fn from_given(given: HashMap<String, GivenKey>) -> Self {
        let given = convert_given(given);
        let store = Arc::new(KeyStore::new(HashMap::new(), Vec::new(), given, false));
        Self {
            store,
            fetcher: None,
            demand: None,
            shutdown: None,
            refresh_unknown_kid: false,
            use_whitelist: Vec::new(),
        }
    }

    /// Resolves the `kid`/`alg` pair of a JWT header to a verification key.
    ///
    /// On a miss with unknown-`kid` refresh enabled, a refresh demand is
    /// submitted and awaited before the lookup is retried; when the demand
    /// slot is already occupied or the refresh is rate limited, the lookup
    /// fails fast with [`JwksError::KidNotFound`].
    ///
    /// # Errors
    ///
    /// - [`JwksError::MissingKid`] / [`JwksError::MissingAlg`] when the
    ///   header fields are absent
    /// - [`JwksError::KidNotFound`] when no key carries the requested ID
    /// - [`JwksError::AlgMismatch`] when the key declares a different `alg`
    /// - [`JwksError::UseMismatch`] when the key's `use` is refused
    pub async fn resolve(&self, kid: Option<&str>, alg: Option<&str>) -> JwksResult<Arc<Jwk>> {
        let kid = kid.ok_or(JwksError::MissingKid)?;
        let alg = alg.ok_or(JwksError::MissingAlg)?;

        if let Some(jwk) = self.store.read_key(kid).await {
            return self.check_policy(jwk, alg);
        }

        if self.refresh_unknown_kid
            && let Some(demand) = &self.demand
        {
            tracing::debug!(kid, "unknown key ID, requesting JWK Set refresh");
            let (request, completion) = RefreshRequest::demand();
            if demand.try_send(request).is_ok() {
                // Completed, rate-limited, failed, and cancelled refreshes
                // all signal or drop the handle, so this cannot hang.
                let _ = completion.await;
                if let Some(jwk) = self.store.read_key(kid).await {
                    return self.check_policy(jwk, alg);
                }
            }
        }

        Err(JwksError::kid_not_found(kid))
    }

    /// Resolves the verification key for a parsed JWT header.
    ///
    /// Convenience wrapper around [`resolve`](Self::resolve) for use with
    /// [`jsonwebtoken::decode_header`].
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn key_for(&self, header: &jsonwebtoken::Header) -> JwksResult<Arc<Jwk>> {
        self.resolve(header.kid.as_deref(), Some(algorithm_name(header.alg)))
            .await
    }

    pub(crate) fn check_policy(&self, jwk: Arc<Jwk>, token_alg: &str) -> JwksResult<Arc<Jwk>> {
        if let Some(jwk_alg) = jwk.algorithm()
            && jwk_alg != token_alg
        {
            return Err(JwksError::alg_mismatch(jwk_alg, token_alg));
        }
        // An encryption key never verifies a signature, whitelist or not.
        if jwk.key_use() == Some(&KeyUse::Encryption) {
            return Err(JwksError::use_mismatch("enc"));
        }
        if !self.use_whitelist.is_empty() {
            let allowed = jwk
                .key_use()
                .is_some_and(|key_use| self.use_whitelist.contains(key_use));
            if !allowed {
                let key_use = jwk.key_use().map_or("unspecified", KeyUse::as_str);
                return Err(JwksError::use_mismatch(key_use));
            }
        }
        Ok(jwk)
    }

    pub(crate) fn read_given(&self, kid: &str) -> Option<Arc<Jwk>> {
        self.store.read_given(kid)
    }

    /// Returns the currently known key IDs, sorted.
    pub async fn kids(&self) -> Vec<String> {
        self.store.kids().await
    }

    /// Returns the number of keys currently held.
    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    /// Returns `true` when no keys are held.
    pub async fn is_empty(&self) -> bool {
        self.store.len().await == 0
    }

    /// Returns a read-only copy of the current key map.
    pub async fn snapshot(&self) -> HashMap<String, Arc<Jwk>> {
        self.store.snapshot().await
    }

    /// Returns a copy of the last JWK Set payload.
    pub async fn raw_jwks(&self) -> Vec<u8> {
        self.store.raw_jwks().await
    }

    /// Returns refresh counters for this cache. All zero for caches without
    /// a remote endpoint.
    #[must_use]
    pub fn stats(&self) -> RefreshStats {
        self.fetcher
            .as_ref()
            .map(|fetcher| fetcher.stats())
            .unwrap_or_default()
    }

    /// Stops the background refresh worker.
    ///
    /// Idempotent; also invoked on drop. Any caller waiting on a
    /// demand-triggered refresh is released and observes the store
    /// unchanged.
    pub fn shutdown(&self) {
        if let Some(shutdown) = &self.shutdown {
            let _ = shutdown.send(true);
        }
    }
}

impl Drop for JwksCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn convert_given(given: HashMap<String, GivenKey>) -> HashMap<String, Arc<Jwk>> {
    given
        .into_iter()
        .map(|(kid, key)| {
            let jwk = Arc::new(key.into_jwk(kid.clone()));
            (kid, jwk)
        })
        .collect()
}
