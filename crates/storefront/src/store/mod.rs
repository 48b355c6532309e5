//! Persistent key-value store shim.
//!
//! The storefront's only durability layer: whole JSON values saved under
//! string keys, the same shape as browser local storage. There are no
//! transactions; each `save` overwrites the previous value for its key.
//!
//! # Layout
//!
//! All keys share a namespaced prefix (default `atelier_v1_`):
//!
//! - `{prefix}products` - catalog, JSON array, newest first
//! - `{prefix}orders` - order history, JSON array, newest first
//! - `{prefix}subscribers` - newsletter emails, JSON array, insertion order
//! - `{prefix}auth` - reserved marker, never written
//! - `{prefix}tr_{lang}_{hash}` - one translation cache entry per key
//!
//! Bumping the prefix version invalidates everything at once.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Default namespaced key prefix.
pub const DEFAULT_PREFIX: &str = "atelier_v1_";

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing would exceed the store's capacity.
    #[error("storage quota exceeded writing {key} (limit {limit} bytes)")]
    QuotaExceeded { key: String, limit: usize },

    /// The store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A local key-value store holding JSON values.
///
/// Reads and writes are async so a network-backed store can be swapped in
/// without changing callers.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the value stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Failures (quota, I/O) must be returned, never swallowed.
    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// List all keys starting with `prefix`.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Key names for the persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    prefix: String,
}

impl StoreKeys {
    /// Create key names under the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn products(&self) -> String {
        format!("{}products", self.prefix)
    }

    #[must_use]
    pub fn orders(&self) -> String {
        format!("{}orders", self.prefix)
    }

    #[must_use]
    pub fn subscribers(&self) -> String {
        format!("{}subscribers", self.prefix)
    }

    /// Reserved auth marker. Nothing writes it.
    #[must_use]
    pub fn auth(&self) -> String {
        format!("{}auth", self.prefix)
    }

    /// Prefix shared by every translation cache entry for `lang`.
    #[must_use]
    pub fn translation_prefix(&self, lang: &str) -> String {
        format!("{}tr_{lang}_", self.prefix)
    }

    /// Key for one translation cache entry.
    #[must_use]
    pub fn translation(&self, lang: &str, hash: &str) -> String {
        format!("{}{hash}", self.translation_prefix(lang))
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keys_share_prefix() {
        let keys = StoreKeys::default();
        assert_eq!(keys.products(), "atelier_v1_products");
        assert_eq!(keys.orders(), "atelier_v1_orders");
        assert_eq!(keys.subscribers(), "atelier_v1_subscribers");
        assert_eq!(keys.auth(), "atelier_v1_auth");
    }

    #[test]
    fn test_translation_keys() {
        let keys = StoreKeys::new("atelier_v2_");
        assert_eq!(keys.translation("fr", "9a3f"), "atelier_v2_tr_fr_9a3f");
        assert!(
            keys.translation("fr", "9a3f")
                .starts_with(&keys.translation_prefix("fr"))
        );
    }
}
