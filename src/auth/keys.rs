// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process signing key store.
//!
//! Holds the key set most recently fetched from the identity provider. The
//! set is swapped wholesale by [`KeyStore::replace_all`], so readers never
//! observe a partially updated map.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Mapping from key identifier (`kid`) to PEM-encoded key material.
pub type SigningKeySet = HashMap<String, String>;

struct Snapshot {
    keys: Arc<SigningKeySet>,
    replaced_at: Option<Instant>,
}

/// Signing key store.
#[derive(Clone)]
pub struct KeyStore {
    inner: Arc<RwLock<Snapshot>>,
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot {
                keys: Arc::new(SigningKeySet::new()),
                replaced_at: None,
            })),
        }
    }

    /// Look up the PEM for `kid`.
    pub async fn get(&self, kid: &str) -> Option<String> {
        self.inner.read().await.keys.get(kid).cloned()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.keys.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.keys.len()
    }

    /// Swap in a complete new key set.
    pub async fn replace_all(&self, keys: SigningKeySet) {
        let mut guard = self.inner.write().await;
        guard.keys = Arc::new(keys);
        guard.replaced_at = Some(Instant::now());
    }

    /// Time since the last [`replace_all`](Self::replace_all), if any.
    pub async fn age(&self) -> Option<Duration> {
        self.inner.read().await.replaced_at.map(|at| at.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(&str, &str)]) -> SigningKeySet {
        entries
            .iter()
            .map(|(kid, pem)| (kid.to_string(), pem.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn starts_empty() {
        let store = KeyStore::new();
        assert!(store.is_empty().await);
        assert!(store.get("any").await.is_none());
        assert!(store.age().await.is_none());
    }

    #[tokio::test]
    async fn replace_all_swaps_the_whole_set() {
        let store = KeyStore::new();
        store.replace_all(set(&[("a", "pem-a"), ("b", "pem-b")])).await;
        assert_eq!(store.len().await, 2);

        store.replace_all(set(&[("c", "pem-c")])).await;
        assert!(store.get("a").await.is_none());
        assert_eq!(store.get("c").await.as_deref(), Some("pem-c"));
        assert_eq!(store.len().await, 1);
        assert!(store.age().await.is_some());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = KeyStore::new();
        let clone = store.clone();
        clone.replace_all(set(&[("a", "pem-a")])).await;
        assert_eq!(store.get("a").await.as_deref(), Some("pem-a"));
    }
}
