//! Aggregation of several JWK Set caches.
//!
//! Tokens issued by more than one authority can be verified against an
//! ordered list of caches. On a `kid` collision between sets, the strategy
//! ordering decides which cache is consulted; the outcome of the selected
//! cache is final, so a policy failure there surfaces immediately rather
//! than falling through to a later set.

use std::sync::Arc;

use crate::cache::JwksCache;
use crate::error::{JwksError, JwksResult};
use crate::key::{Jwk, algorithm_name};

/// How [`MultiJwksCache`] selects among its caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Consult caches in order; the first containing the `kid` wins.
    #[default]
    FirstMatch,
    /// Consult every cache's given keys before any remote keys.
    GivenFirst,
}

/// An ordered composition of [`JwksCache`] instances.
pub struct MultiJwksCache {
    caches: Vec<Arc<JwksCache>>,
    strategy: ResolveStrategy,
}

impl MultiJwksCache {
    /// Creates an aggregator over `caches` with the default
    /// [`ResolveStrategy::FirstMatch`] strategy.
    #[must_use]
    pub fn new(caches: Vec<Arc<JwksCache>>) -> Self {
        Self {
            caches,
            strategy: ResolveStrategy::default(),
        }
    }

    /// Sets the resolve strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ResolveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Resolves a `kid`/`alg` pair against the composed caches.
    ///
    /// Each cache gets its unknown-`kid` refresh opportunity in order; only
    /// when every cache reports the `kid` as unknown does the lookup fail
    /// with [`JwksError::KidNotFound`].
    ///
    /// # Errors
    ///
    /// Same as [`JwksCache::resolve`]; a policy failure in the selected
    /// cache is returned as-is.
    pub async fn resolve(&self, kid: Option<&str>, alg: Option<&str>) -> JwksResult<Arc<Jwk>> {
        let kid = kid.ok_or(JwksError::MissingKid)?;
        let alg = alg.ok_or(JwksError::MissingAlg)?;

        if self.strategy == ResolveStrategy::GivenFirst {
            for cache in &self.caches {
                if let Some(jwk) = cache.read_given(kid) {
                    return cache.check_policy(jwk, alg);
                }
            }
        }

        for cache in &self.caches {
            match cache.resolve(Some(kid), Some(alg)).await {
                Err(err) if err.is_kid_not_found() => continue,
                outcome => return outcome,
            }
        }
        Err(JwksError::kid_not_found(kid))
    }

    /// Resolves the verification key for a parsed JWT header.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn key_for(&self, header: &jsonwebtoken::Header) -> JwksResult<Arc<Jwk>> {
        self.resolve(header.kid.as_deref(), Some(algorithm_name(header.alg)))
            .await
    }

    /// Returns the union of key IDs across all caches, sorted and
    /// deduplicated.
    pub async fn kids(&self) -> Vec<String> {
        let mut kids = Vec::new();
        for cache in &self.caches {
            kids.extend(cache.kids().await);
        }
        kids.sort();
        kids.dedup();
        kids
    }
}
