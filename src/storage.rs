//! Key-value persistence backends.
//!
//! The board keeps its whole state under one string key. `Storage` is the seam
//! the task store writes through; `FileStorage` backs the command line and
//! `MemoryStorage` backs tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Last value written under `key`, or `None` if nothing was ever stored.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut items = HashMap::new();
        items.insert(key.to_string(), value.to_string());
        MemoryStorage { items: Mutex::new(items) }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = tokio::fs::File::create(&tmp).await?;
        f.write_all(value.as_bytes()).await?;
        f.flush().await?;
        drop(f);
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), bytes = value.len(), "stored item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_read_your_writes() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("tasks").await.unwrap(), None);
        storage.set_item("tasks", "[]").await.unwrap();
        storage.set_item("tasks", "[1]").await.unwrap();
        assert_eq!(storage.get_item("tasks").await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("board"));
        assert_eq!(storage.get_item("tasks").await.unwrap(), None);

        storage.set_item("tasks", "[{\"id\":0}]").await.unwrap();
        assert!(storage.path_for("tasks").exists());
        assert!(!storage.path_for("tasks").with_extension("json.tmp").exists());
        assert_eq!(storage.get_item("tasks").await.unwrap().as_deref(), Some("[{\"id\":0}]"));
    }
}
