//! Client-side cache of server responses.
//!
//! Entries are keyed by resource name plus the serialized query parameters.
//! A mutation invalidates every cached key of the resource it touched, so the
//! next read of any of its list views goes back to the network.

mod infinite;
mod list_view;

pub use infinite::{InfiniteList, PageRequest};
pub use list_view::{FetchTicket, ListParams, ListView};

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// `(resourceName, serializedSearchParams)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub resource: String,
    pub params: String,
}

impl CacheKey {
    /// Build a key; parameters are sorted so their order does not matter.
    pub fn new<K: AsRef<str>, V: AsRef<str>>(resource: &str, params: &[(K, V)]) -> Self {
        let mut pairs: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        pairs.sort();
        let params = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        Self {
            resource: resource.to_string(),
            params,
        }
    }

    /// Key for a resource read without parameters.
    pub fn bare(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            params: String::new(),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}?{}", self.resource, self.params)
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, serde_json::Value>,
    /// Bumped on every invalidation of a resource.
    epochs: HashMap<String, u64>,
}

/// Shared cache handle; clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct ResourceCache {
    inner: Arc<Mutex<Inner>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        let inner = self.lock();
        match inner.entries.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Current invalidation epoch of a resource.
    pub fn epoch(&self, resource: &str) -> u64 {
        self.lock().epochs.get(resource).copied().unwrap_or(0)
    }

    /// Store a value fetched when the resource was at `epoch`.
    ///
    /// Returns `false` without storing when the resource was invalidated while
    /// the fetch was in flight, since the value may predate the mutation.
    pub fn store<T: Serialize>(&self, key: &CacheKey, value: &T, epoch: u64) -> Result<bool> {
        let value = serde_json::to_value(value)?;
        let mut inner = self.lock();
        let current = inner.epochs.get(&key.resource).copied().unwrap_or(0);
        if current != epoch {
            tracing::debug!(%key, "dropping response fetched before invalidation");
            return Ok(false);
        }
        inner.entries.insert(key.clone(), value);
        Ok(true)
    }

    /// Cached value for `key`, or the result of `loader` which is then cached.
    pub async fn fetch<T, F, Fut>(&self, key: &CacheKey, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get::<T>(key)? {
            tracing::debug!(%key, "cache hit");
            return Ok(hit);
        }
        tracing::debug!(%key, "cache miss");
        let epoch = self.epoch(&key.resource);
        let value = loader().await?;
        self.store(key, &value, epoch)?;
        Ok(value)
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut inner = self.lock();
        *inner.epochs.entry(key.resource.clone()).or_insert(0) += 1;
        inner.entries.remove(key).is_some()
    }

    /// Drop every cached key of a resource. Returns how many were dropped.
    pub fn invalidate_resource(&self, resource: &str) -> usize {
        let mut inner = self.lock();
        *inner.epochs.entry(resource.to_string()).or_insert(0) += 1;
        let before = inner.entries.len();
        inner.entries.retain(|k, _| k.resource != resource);
        let dropped = before - inner.entries.len();
        tracing::debug!(resource, dropped, "invalidated resource");
        dropped
    }

    pub fn keys_for(&self, resource: &str) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .lock()
            .entries
            .keys()
            .filter(|k| k.resource == resource)
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        for epoch in inner.epochs.values_mut() {
            *epoch += 1;
        }
    }
}
