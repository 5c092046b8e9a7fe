//! Local persistence for anonymous use: two key-value namespaces with
//! different lifetimes. Each namespace holds the full entry list as one
//! serialized JSON collection; every read deserializes the whole
//! collection and every write re-serializes it. Corrupt or missing data
//! degrades to an empty list, never an error.

use std::path::{Path, PathBuf};

use tokio::{fs, sync::Mutex};
use tracing::error;

use crate::models::LogEntry;

fn decode_collection(raw: &[u8], source: &str) -> Vec<LogEntry> {
    match serde_json::from_slice(raw) {
        Ok(entries) => entries,
        Err(err) => {
            error!("failed to parse {source} collection: {err}");
            Vec::new()
        }
    }
}

/// Collection that survives restarts, stored as a JSON file on disk.
pub struct DurableStore {
    path: PathBuf,
}

impl DurableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Vec<LogEntry> {
        match fs::read(&self.path).await {
            Ok(bytes) => decode_collection(&bytes, "durable"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                error!("failed to read durable collection: {err}");
                Vec::new()
            }
        }
    }

    pub async fn save(&self, entries: &[LogEntry]) -> Result<(), std::io::Error> {
        let payload = serde_json::to_vec_pretty(entries)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, payload).await
    }
}

/// Collection scoped to the process lifetime; empty on every start and
/// gone once the process exits. Entries here must be migrated to the
/// cloud, exported, or discarded before shutdown.
#[derive(Default)]
pub struct SessionStore {
    raw: Mutex<Option<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self) -> Vec<LogEntry> {
        let guard = self.raw.lock().await;
        match guard.as_deref() {
            Some(raw) => decode_collection(raw.as_bytes(), "session"),
            None => Vec::new(),
        }
    }

    pub async fn save(&self, entries: &[LogEntry]) -> Result<(), std::io::Error> {
        let payload = serde_json::to_string(entries)?;
        *self.raw.lock().await = Some(payload);
        Ok(())
    }

    pub async fn clear(&self) {
        *self.raw.lock().await = None;
    }

    /// Full dump of the collection as indented JSON, for download.
    pub async fn export_json(&self) -> Result<String, std::io::Error> {
        let entries = self.load().await;
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}
