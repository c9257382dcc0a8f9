//! services/companion/src/adapters/store_json.rs
//!
//! A `KeyValueStore` that keeps one JSON file per key under a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mendi_core::ports::{KeyValueStore, PortError, PortResult};
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Opens the store, creating the directory if needed.
    pub async fn open(root: impl AsRef<Path>) -> PortResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot create data directory {}: {}", root.display(), e)))?;
        info!(path = %root.display(), "JSON file store ready");
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PortResult<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(PortError::InvalidInput(format!("Unsupported store key '{}'", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(format!("Failed to read {}: {}", path.display(), e))),
        }
    }

    /// Writes to a sibling temp file first, then renames over the target.
    async fn set(&self, key: &str, value: String) -> PortResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to replace {}: {}", path.display(), e)))?;
        debug!(key, "Stored entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(format!("Failed to delete {}: {}", path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mendi_core::domain::{Conversation, Message};
    use mendi_core::memory::ConversationMemory;
    use std::sync::Arc;

    #[tokio::test]
    async fn entries_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        assert_eq!(store.get("user").await.unwrap(), None);
        store.set("user", "{\"name\":\"Ana\"}".into()).await.unwrap();

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get("user").await.unwrap().as_deref(), Some("{\"name\":\"Ana\"}"));
        reopened.delete("user").await.unwrap();
        reopened.delete("user").await.unwrap();
        assert_eq!(reopened.get("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let err = store.get("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn conversations_round_trip_through_memory() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ConversationMemory::new(Arc::new(JsonFileStore::open(dir.path()).await.unwrap()));
        let mut conversation = Conversation::new("Rough day", Utc::now());
        conversation.messages = vec![Message::user("long day at work"), Message::ai("Tell me more.")];
        memory.save_conversation(&conversation).await.unwrap();

        let memory = ConversationMemory::new(Arc::new(JsonFileStore::open(dir.path()).await.unwrap()));
        let loaded = memory.conversation(conversation.id).await.unwrap().unwrap();
        assert_eq!(loaded, conversation);
    }
}
