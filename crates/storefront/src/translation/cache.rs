//! Two-tier translation cache: `moka` in front of the persistent store.

use std::sync::Arc;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use atelier_core::LanguageCode;

use super::hash::content_hash;
use crate::store::{KeyValueStore, StoreError, StoreKeys};

const HOT_CAPACITY: u64 = 10_000;

/// A cached translation, stored with its source so lookups can verify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub source: String,
    pub translated: String,
}

impl CacheEntry {
    /// A translation worth keeping: non-empty and different from its source.
    #[must_use]
    pub fn is_useful(&self) -> bool {
        let translated = self.translated.trim();
        !translated.is_empty() && translated != self.source.trim()
    }
}

/// Translation cache keyed by `(language, content_hash(source))`.
///
/// Entries live in the persistent store under the translation key prefix;
/// the in-process tier only saves round-trips. There is no eviction policy
/// for the persistent tier; bumping the store prefix drops everything.
#[derive(Clone)]
pub struct TranslationCache {
    store: Arc<dyn KeyValueStore>,
    keys: StoreKeys,
    hot: Cache<String, CacheEntry>,
}

impl std::fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationCache")
            .field("keys", &self.keys)
            .field("hot_entries", &self.hot.entry_count())
            .finish_non_exhaustive()
    }
}

impl TranslationCache {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StoreKeys) -> Self {
        Self {
            store,
            keys,
            hot: Cache::builder().max_capacity(HOT_CAPACITY).build(),
        }
    }

    /// Load every persisted entry for `lang` into the in-process tier, so
    /// translation-memory scans see them.
    ///
    /// Unreadable entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot list its keys.
    pub async fn warm(&self, lang: &LanguageCode) -> Result<usize, StoreError> {
        let keys = self
            .store
            .keys(&self.keys.translation_prefix(lang.as_str()))
            .await?;
        let mut loaded = 0;
        for key in keys {
            if let Some(entry) = self.load_persisted(&key).await {
                self.hot.insert(key, entry).await;
                loaded += 1;
            }
        }
        debug!(lang = %lang, loaded, "Translation cache warmed");
        Ok(loaded)
    }

    /// Cached translation of `source` into `lang`, if any.
    ///
    /// Store failures degrade to a miss.
    pub async fn get(&self, lang: &LanguageCode, source: &str) -> Option<String> {
        let key = self.key_for(lang, source);

        let entry = match self.hot.get(&key).await {
            Some(entry) => entry,
            None => {
                let entry = self.load_persisted(&key).await?;
                self.hot.insert(key, entry.clone()).await;
                entry
            }
        };

        if entry.source == source {
            Some(entry.translated)
        } else {
            debug!(lang = %lang, "Hash collision in translation cache");
            None
        }
    }

    /// Store a translation. Degenerate values (empty, or equal to the
    /// source) are refused and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent write fails; the in-process tier
    /// is left untouched in that case.
    pub async fn put(
        &self,
        lang: &LanguageCode,
        source: &str,
        translated: &str,
    ) -> Result<bool, StoreError> {
        let entry = CacheEntry {
            source: source.to_owned(),
            translated: translated.trim().to_owned(),
        };
        if !entry.is_useful() {
            return Ok(false);
        }

        let key = self.key_for(lang, source);
        self.store
            .save(&key, &serde_json::to_value(&entry)?)
            .await?;
        self.hot.insert(key, entry).await;
        Ok(true)
    }

    /// Translation memory scan: any in-process entry for `lang` whose source
    /// is exactly `source`.
    #[must_use]
    pub fn memory_lookup(&self, lang: &LanguageCode, source: &str) -> Option<String> {
        let prefix = self.keys.translation_prefix(lang.as_str());
        self.hot
            .iter()
            .find(|(key, entry)| key.starts_with(&prefix) && entry.source == source)
            .map(|(_, entry)| entry.translated)
    }

    fn key_for(&self, lang: &LanguageCode, source: &str) -> String {
        self.keys
            .translation(lang.as_str(), &content_hash(source))
    }

    async fn load_persisted(&self, key: &str) -> Option<CacheEntry> {
        match self.store.load(key).await {
            Ok(Some(value)) => match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) if entry.is_useful() => Some(entry),
                Ok(_) => None,
                Err(e) => {
                    warn!(key, error = %e, "Discarding unreadable translation entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Translation cache read failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn fr() -> LanguageCode {
        LanguageCode::parse("fr").unwrap()
    }

    fn cache_over(store: Arc<MemoryStore>) -> TranslationCache {
        TranslationCache::new(store, StoreKeys::default())
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = cache_over(Arc::new(MemoryStore::new()));
        assert!(cache.put(&fr(), "Silk shawl", "Châle en soie").await.unwrap());
        assert_eq!(
            cache.get(&fr(), "Silk shawl").await.as_deref(),
            Some("Châle en soie")
        );
        assert!(cache.get(&LanguageCode::parse("it").unwrap(), "Silk shawl").await.is_none());
    }

    #[tokio::test]
    async fn test_degenerate_values_not_written() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_over(store.clone());

        assert!(!cache.put(&fr(), "Ikat", "Ikat").await.unwrap());
        assert!(!cache.put(&fr(), "Ikat", "   ").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_persisted_entries_survive_new_cache() {
        let store = Arc::new(MemoryStore::new());
        cache_over(store.clone())
            .put(&fr(), "Brooch", "Broche ancienne")
            .await
            .unwrap();

        let fresh = cache_over(store);
        assert!(fresh.memory_lookup(&fr(), "Brooch").is_none());
        assert_eq!(fresh.warm(&fr()).await.unwrap(), 1);
        assert_eq!(
            fresh.memory_lookup(&fr(), "Brooch").as_deref(),
            Some("Broche ancienne")
        );
    }

    #[tokio::test]
    async fn test_failed_write_propagates_and_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_over(store.clone());
        store.set_fail_writes(true);

        assert!(cache.put(&fr(), "Brooch", "Broche").await.is_err());
        assert!(cache.get(&fr(), "Brooch").await.is_none());
    }

    #[tokio::test]
    async fn test_source_mismatch_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_over(store.clone());
        let key = StoreKeys::default().translation("fr", &content_hash("Lamp"));
        store
            .save(
                &key,
                &serde_json::json!({"source": "Something else", "translated": "Autre chose"}),
            )
            .await
            .unwrap();

        assert!(cache.get(&fr(), "Lamp").await.is_none());
    }
}
