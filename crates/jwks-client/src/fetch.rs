//! One refresh cycle against the remote JWK Set endpoint.
//!
//! A refresh issues one HTTP request, applies the status-acceptance policy,
//! and replaces the store contents — unless the body is byte-identical to
//! the previous payload, in which case the key map is left untouched and
//! previously handed-out keys stay valid by identity.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use url::Url;

use crate::config::{RequestFactory, StatusPolicy};
use crate::error::{JwksError, JwksResult};
use crate::parse::parse_jwk_set;
use crate::store::KeyStore;

/// What one successful refresh did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshOutcome {
    /// The payload changed and the key map was replaced.
    Replaced,
    /// The payload was byte-identical to the previous one; nothing changed.
    Unchanged,
}

/// Counters describing refresh activity since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Refresh attempts, including failures.
    pub attempts: u64,
    /// Refreshes that replaced the key map.
    pub replaced: u64,
    /// Refreshes short-circuited by an unchanged payload.
    pub unchanged: u64,
    /// Refreshes that failed.
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    attempts: AtomicU64,
    replaced: AtomicU64,
    unchanged: AtomicU64,
    failed: AtomicU64,
}

pub(crate) struct Fetcher {
    client: reqwest::Client,
    url: Url,
    request_factory: Option<RequestFactory>,
    status_policy: StatusPolicy,
    timeout: Duration,
    store: Arc<KeyStore>,
    counters: Counters,
}

impl Fetcher {
    pub(crate) fn new(
        client: reqwest::Client,
        url: Url,
        request_factory: Option<RequestFactory>,
        status_policy: StatusPolicy,
        timeout: Duration,
        store: Arc<KeyStore>,
    ) -> Self {
        Self {
            client,
            url,
            request_factory,
            status_policy,
            timeout,
            store,
            counters: Counters::default(),
        }
    }

    /// Performs one refresh cycle under the configured deadline.
    pub(crate) async fn refresh(&self) -> JwksResult<RefreshOutcome> {
        self.counters.attempts.fetch_add(1, Ordering::Relaxed);
        let result = match tokio::time::timeout(self.timeout, self.fetch_once()).await {
            Ok(result) => result,
            Err(_) => Err(JwksError::Timeout),
        };
        match &result {
            Ok(RefreshOutcome::Replaced) => {
                self.counters.replaced.fetch_add(1, Ordering::Relaxed);
            }
            Ok(RefreshOutcome::Unchanged) => {
                self.counters.unchanged.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(url = %self.url, error = %err, "JWK Set refresh failed");
            }
        }
        result
    }

    async fn fetch_once(&self) -> JwksResult<RefreshOutcome> {
        let request = match &self.request_factory {
            Some(factory) => factory(&self.client, &self.url),
            None => self
                .client
                .get(self.url.as_str())
                .header(reqwest::header::ACCEPT, "application/json"),
        };

        let response = request
            .send()
            .await
            .map_err(|err| JwksError::http(err.to_string()))?;

        let status = response.status();
        if !self.status_policy.accepts(status) {
            return Err(JwksError::InvalidHttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| JwksError::http(err.to_string()))?;

        if self.store.raw_matches(&body).await {
            tracing::trace!(url = %self.url, "JWK Set payload unchanged");
            return Ok(RefreshOutcome::Unchanged);
        }

        let keys = parse_jwk_set(&body)?;
        tracing::debug!(url = %self.url, keys = keys.len(), "JWK Set refreshed");
        self.store.replace(keys, body.to_vec()).await;
        Ok(RefreshOutcome::Replaced)
    }

    pub(crate) fn stats(&self) -> RefreshStats {
        RefreshStats {
            attempts: self.counters.attempts.load(Ordering::Relaxed),
            replaced: self.counters.replaced.load(Ordering::Relaxed),
            unchanged: self.counters.unchanged.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}
