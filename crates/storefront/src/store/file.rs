//! File-backed store: one JSON document per key under a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{KeyValueStore, StoreError};

const EXTENSION: &str = "json";

/// Store that keeps each key in `{dir}/{key}.json`.
///
/// Keys are expected to be made of ASCII letters, digits, `_` and `-`; any
/// other character is replaced by `_` in the file name, so keys that differ
/// only in such characters share a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                key: dir.display().to_string(),
                source,
            })?;
        Ok(Self { dir })
    }

    /// Directory holding the store's files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.{EXTENSION}"))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_owned(),
        source,
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        let path = self.path_for(key);
        debug!(key, bytes = bytes.len(), "Writing store record");

        match tokio::fs::write(&path, bytes).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::StorageFull => Err(StoreError::QuotaExceeded {
                key: key.to_owned(),
                limit: 0,
            }),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| io_error(prefix, e))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(prefix, e))? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
                && stem.starts_with(prefix)
            {
                keys.push(stem.to_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "atelier-filestore-{name}-{}",
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn test_roundtrip_through_disk() {
        let dir = scratch_dir("roundtrip");
        let store = FileStore::open(&dir).await.unwrap();

        assert!(store.load("atelier_v1_orders").await.unwrap().is_none());
        store
            .save("atelier_v1_orders", &json!([{"id": "ORD-1"}]))
            .await
            .unwrap();

        let reopened = FileStore::open(&dir).await.unwrap();
        assert_eq!(
            reopened.load("atelier_v1_orders").await.unwrap(),
            Some(json!([{"id": "ORD-1"}]))
        );
        assert_eq!(
            reopened.keys("atelier_v1_").await.unwrap(),
            vec!["atelier_v1_orders".to_string()]
        );

        reopened.remove("atelier_v1_orders").await.unwrap();
        reopened.remove("atelier_v1_orders").await.unwrap();
        assert!(reopened.load("atelier_v1_orders").await.unwrap().is_none());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = scratch_dir("corrupt");
        let store = FileStore::open(&dir).await.unwrap();
        tokio::fs::write(dir.join("broken.json"), b"{not json")
            .await
            .unwrap();

        assert!(matches!(
            store.load("broken").await,
            Err(StoreError::Serialization(_))
        ));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
