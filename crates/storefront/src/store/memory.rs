//! In-process store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError};

/// In-memory key-value store with an optional byte quota.
///
/// The quota counts the serialized size of every stored value, mirroring the
/// per-origin limit of browser storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
    quota: Option<usize>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes past `bytes` of serialized data.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Make every subsequent `save` fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn encoded_len(value: &Value) -> Result<usize, StoreError> {
    Ok(serde_json::to_vec(value)?.len())
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write to {key} rejected")));
        }

        let mut entries = self.entries.write().await;

        if let Some(limit) = self.quota {
            let mut used = encoded_len(value)?;
            for (existing_key, existing) in entries.iter() {
                if existing_key != key {
                    used += encoded_len(existing)?;
                }
            }
            if used > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_owned(),
                    limit,
                });
            }
        }

        entries.insert(key.to_owned(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        assert!(store.load("k").await.unwrap().is_none());

        store.save("k", &json!(["a", "b"])).await.unwrap();
        assert_eq!(store.load("k").await.unwrap(), Some(json!(["a", "b"])));
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_value() {
        let store = MemoryStore::new();
        store.save("k", &json!([1, 2, 3])).await.unwrap();
        store.save("k", &json!([4])).await.unwrap();
        assert_eq!(store.load("k").await.unwrap(), Some(json!([4])));
    }

    #[tokio::test]
    async fn test_quota_exceeded_propagates() {
        let store = MemoryStore::with_quota(16);
        store.save("small", &json!("abc")).await.unwrap();

        let err = store
            .save("big", &json!("this value is far too long"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { limit: 16, .. }));
        assert!(store.load("big").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fail_writes_switch() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(matches!(
            store.save("k", &json!(1)).await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_fail_writes(false);
        assert!(store.save("k", &json!(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_keys_by_prefix() {
        let store = MemoryStore::new();
        store.save("x_tr_fr_2", &json!(1)).await.unwrap();
        store.save("x_tr_fr_1", &json!(1)).await.unwrap();
        store.save("x_tr_it_1", &json!(1)).await.unwrap();
        store.save("x_products", &json!([])).await.unwrap();

        assert_eq!(
            store.keys("x_tr_fr_").await.unwrap(),
            vec!["x_tr_fr_1".to_string(), "x_tr_fr_2".to_string()]
        );

        store.remove("x_tr_fr_1").await.unwrap();
        store.remove("missing").await.unwrap();
        assert_eq!(store.keys("x_tr_").await.unwrap().len(), 2);
    }
}
