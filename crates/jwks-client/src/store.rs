//! Concurrency-safe key storage.
//!
//! The store owns the `kid -> key` map together with the raw bytes of the
//! last remote payload. The map is replaced atomically on refresh, never
//! mutated in place, so readers always observe either the previous complete
//! map or the new one. Given keys are re-applied on every replacement.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::key::Jwk;

struct StoreState {
    keys: HashMap<String, Arc<Jwk>>,
    raw: Vec<u8>,
}

/// Shared storage for decoded verification keys.
///
/// The single writer is the refresh worker; every other call site takes the
/// read side of the lock.
pub(crate) struct KeyStore {
    state: RwLock<StoreState>,
    given: HashMap<String, Arc<Jwk>>,
    given_override: bool,
}

impl KeyStore {
    /// Creates a store seeded with `initial` keys (given keys merged in).
    pub(crate) fn new(
        initial: HashMap<String, Arc<Jwk>>,
        raw: Vec<u8>,
        given: HashMap<String, Arc<Jwk>>,
        given_override: bool,
    ) -> Self {
        let mut keys = initial;
        merge_given(&mut keys, &given, given_override);
        Self {
            state: RwLock::new(StoreState { keys, raw }),
            given,
            given_override,
        }
    }

    /// Looks up a key by key ID.
    pub(crate) async fn read_key(&self, kid: &str) -> Option<Arc<Jwk>> {
        self.state.read().await.keys.get(kid).cloned()
    }

    /// Looks up a key ID among the given keys only.
    pub(crate) fn read_given(&self, kid: &str) -> Option<Arc<Jwk>> {
        self.given.get(kid).cloned()
    }

    /// Returns a read-only copy of the current key map.
    pub(crate) async fn snapshot(&self) -> HashMap<String, Arc<Jwk>> {
        self.state.read().await.keys.clone()
    }

    /// Returns the currently known key IDs, sorted.
    pub(crate) async fn kids(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut kids: Vec<String> = state.keys.keys().cloned().collect();
        kids.sort();
        kids
    }

    /// Returns the number of keys currently held.
    pub(crate) async fn len(&self) -> usize {
        self.state.read().await.keys.len()
    }

    /// Returns a defensive copy of the last remote payload.
    pub(crate) async fn raw_jwks(&self) -> Vec<u8> {
        self.state.read().await.raw.clone()
    }

    /// Returns `true` when `bytes` equals the last remote payload.
    pub(crate) async fn raw_matches(&self, bytes: &[u8]) -> bool {
        let state = self.state.read().await;
        !state.raw.is_empty() && state.raw == bytes
    }

    /// Atomically replaces the key map and raw payload.
    ///
    /// Given keys are merged into `new_keys` before the write lock is taken;
    /// whether they overwrite same-`kid` remote keys is controlled by the
    /// `given_override` flag.
    pub(crate) async fn replace(&self, mut new_keys: HashMap<String, Arc<Jwk>>, new_raw: Vec<u8>) {
        merge_given(&mut new_keys, &self.given, self.given_override);
        let mut state = self.state.write().await;
        state.keys = new_keys;
        state.raw = new_raw;
    }
}

fn merge_given(
    keys: &mut HashMap<String, Arc<Jwk>>,
    given: &HashMap<String, Arc<Jwk>>,
    given_override: bool,
) {
    for (kid, key) in given {
        if given_override || !keys.contains_key(kid) {
            keys.insert(kid.clone(), key.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::GivenKey;

    fn oct_jwk(kid: &str, secret: &[u8]) -> Arc<Jwk> {
        Arc::new(GivenKey::from_hmac_secret(secret.to_vec()).into_jwk(kid.to_string()))
    }

    fn map(entries: &[(&str, &[u8])]) -> HashMap<String, Arc<Jwk>> {
        entries
            .iter()
            .map(|(kid, secret)| (kid.to_string(), oct_jwk(kid, secret)))
            .collect()
    }

    #[tokio::test]
    async fn test_read_and_replace() {
        let store = KeyStore::new(HashMap::new(), Vec::new(), HashMap::new(), false);
        assert!(store.read_key("a").await.is_none());
        assert_eq!(store.len().await, 0);

        store.replace(map(&[("a", b"one")]), b"payload".to_vec()).await;
        assert!(store.read_key("a").await.is_some());
        assert_eq!(store.kids().await, vec!["a".to_string()]);
        assert_eq!(store.raw_jwks().await, b"payload");
    }

    #[tokio::test]
    async fn test_raw_matches() {
        let store = KeyStore::new(HashMap::new(), Vec::new(), HashMap::new(), false);
        // An empty store never matches, even against an empty body.
        assert!(!store.raw_matches(b"").await);

        store.replace(HashMap::new(), b"payload".to_vec()).await;
        assert!(store.raw_matches(b"payload").await);
        assert!(!store.raw_matches(b"other").await);
    }

    #[tokio::test]
    async fn test_given_survives_replace() {
        let given = map(&[("local", b"given")]);
        let store = KeyStore::new(HashMap::new(), Vec::new(), given, false);
        assert!(store.read_key("local").await.is_some());

        store.replace(map(&[("remote", b"r")]), Vec::new()).await;
        assert!(store.read_key("local").await.is_some());
        assert!(store.read_key("remote").await.is_some());
    }

    #[tokio::test]
    async fn test_given_without_override_defers_to_remote() {
        let given = map(&[("shared", b"given")]);
        let store = KeyStore::new(HashMap::new(), Vec::new(), given, false);

        let remote = map(&[("shared", b"remote")]);
        let expected = remote["shared"].clone();
        store.replace(remote, Vec::new()).await;

        let resolved = store.read_key("shared").await.unwrap();
        assert!(Arc::ptr_eq(&resolved, &expected));
    }

    #[tokio::test]
    async fn test_given_override_wins_over_remote() {
        let given = map(&[("shared", b"given")]);
        let expected = given["shared"].clone();
        let store = KeyStore::new(HashMap::new(), Vec::new(), given, true);

        store.replace(map(&[("shared", b"remote")]), Vec::new()).await;

        let resolved = store.read_key("shared").await.unwrap();
        assert!(Arc::ptr_eq(&resolved, &expected));
    }

    #[tokio::test]
    async fn test_read_given_ignores_remote_keys() {
        let given = map(&[("local", b"given")]);
        let store = KeyStore::new(HashMap::new(), Vec::new(), given, false);
        store.replace(map(&[("remote", b"r")]), Vec::new()).await;

        assert!(store.read_given("local").is_some());
        assert!(store.read_given("remote").is_none());
    }
}
