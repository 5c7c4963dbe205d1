//! File System Chat Storage
//!
//! Information Hiding:
//! - File paths and JSON serialization format hidden from users
//! - Write-then-rename keeps every record file whole from a reader's point of view
//! - Corrupt record files are logged and treated as absent

use super::{ChatRecord, ChatStorage, StoreError};
use crate::config::StoreConfig;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const RECORD_EXTENSION: &str = "json";

/// File system storage - each chat is a pretty-printed JSON file
/// Files are stored as {root_path}/{chat_id}.json
pub struct FileSystemStorage {
    root_path: PathBuf,
}

impl FileSystemStorage {
    /// Open the store, creating the root directory if it doesn't exist.
    pub async fn new(root_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root_path = root_path.into();
        fs::create_dir_all(&root_path)
            .await
            .map_err(|source| StoreError::Write {
                path: root_path.clone(),
                source,
            })?;

        tracing::debug!("[FileSystemStorage] Using storage root {:?}", root_path);
        Ok(Self { root_path })
    }

    pub async fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(config.root_path.clone()).await
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn record_path(&self, chat_id: &str) -> PathBuf {
        self.root_path
            .join(format!("{}.{}", chat_id, RECORD_EXTENSION))
    }

    /// Hidden, unique per write, so concurrent writers never share a temp file and
    /// listings never pick one up.
    fn temp_path(&self, chat_id: &str) -> PathBuf {
        self.root_path
            .join(format!(".{}.{}.tmp", chat_id, Uuid::new_v4().simple()))
    }

    async fn write_atomic(path: &Path, temp: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(temp, path).await
    }

    /// A record only counts when it lives at the path its own id names.
    async fn read_record(path: &Path, chat_id: &str) -> Option<ChatRecord> {
        let json = match fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("[FileSystemStorage] Unreadable chat file {:?}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_str::<ChatRecord>(&json) {
            Ok(record) if record.id == chat_id => Some(record),
            Ok(record) => {
                tracing::warn!(
                    "[FileSystemStorage] Chat file {:?} holds id '{}', skipping",
                    path,
                    record.id
                );
                None
            }
            Err(e) => {
                tracing::warn!("[FileSystemStorage] Malformed chat file {:?}: {}", path, e);
                None
            }
        }
    }

    fn is_record_file(path: &Path) -> bool {
        let visible = path
            .file_name()
            .and_then(|s| s.to_str())
            .map_or(false, |name| !name.starts_with('.'));
        visible && path.extension().and_then(|s| s.to_str()) == Some(RECORD_EXTENSION)
    }
}

#[async_trait]
impl ChatStorage for FileSystemStorage {
    async fn put(&self, record: &ChatRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.id);
        let temp = self.temp_path(&record.id);
        let json = serde_json::to_string_pretty(record)?;

        if let Err(source) = Self::write_atomic(&path, &temp, json.as_bytes()).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::Write { path, source });
        }

        tracing::debug!(
            "[FileSystemStorage] Saved chat '{}' ({} messages) to {:?}",
            record.id,
            record.messages.len(),
            path
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ChatRecord>, StoreError> {
        let path = self.record_path(id);
        let record = Self::read_record(&path, id).await;

        if record.is_none() {
            tracing::debug!("[FileSystemStorage] Chat '{}' not available at {:?}", id, path);
        }
        Ok(record)
    }

    async fn scan(&self) -> Result<Vec<ChatRecord>, StoreError> {
        let read_error = |source| StoreError::Read {
            path: self.root_path.clone(),
            source,
        };

        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.root_path).await.map_err(read_error)?;

        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let path = entry.path();
            if !Self::is_record_file(&path) {
                continue;
            }
            let Some(chat_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(record) = Self::read_record(&path, chat_id).await {
                records.push(record);
            }
        }

        tracing::debug!("[FileSystemStorage] Scanned {} chats", records.len());
        Ok(records)
    }
}
