//! Best-effort JSON persistence of the conversation set.
//!
//! The orchestrator publishes a snapshot after every mutation; a single writer
//! task saves the latest one. Intermediate snapshots may be skipped. Failures
//! are logged and never reach the conversation flow.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tempfile::NamedTempFile;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::orchestrator::StoreSnapshot;

pub struct Archive {
    path: PathBuf,
}

/// Cheap handle used to publish snapshots to the writer task.
#[derive(Clone)]
pub struct ArchiveHandle {
    tx: Arc<watch::Sender<StoreSnapshot>>,
}

impl ArchiveHandle {
    pub fn publish(&self, snapshot: StoreSnapshot) {
        // send_replace never fails, even when the writer has stopped.
        self.tx.send_replace(snapshot);
    }
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the archived snapshot. Missing or unreadable files yield `None`.
    pub fn load(&self) -> Option<StoreSnapshot> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No conversation archive at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Could not read archive {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<StoreSnapshot>(&raw) {
            Ok(snapshot) => {
                info!(
                    "Loaded {} conversations from {}",
                    snapshot.conversations.len(),
                    self.path.display()
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!("Ignoring corrupt archive {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Starts the writer task. It runs until every handle is dropped.
    pub fn spawn_writer(self, initial: StoreSnapshot) -> ArchiveHandle {
        let (tx, mut rx) = watch::channel(initial);
        let path = self.path;

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                let target = path.clone();
                let result =
                    tokio::task::spawn_blocking(move || save(&target, &snapshot)).await;
                match result {
                    Ok(Ok(())) => debug!("Archive saved to {}", path.display()),
                    Ok(Err(e)) => warn!("Failed to save archive: {e:#}"),
                    Err(e) => warn!("Archive writer task failed: {e}"),
                }
            }
        });

        ArchiveHandle { tx: Arc::new(tx) }
    }
}

/// Writes `snapshot` atomically: a temp file in the same directory, then rename.
pub fn save(path: &Path, snapshot: &StoreSnapshot) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create archive directory {}", dir.display()))?;

    let body = serde_json::to_vec_pretty(snapshot).context("Failed to serialize archive")?;
    let mut file = NamedTempFile::new_in(dir).context("Failed to create temp file")?;
    file.write_all(&body).context("Failed to write archive")?;
    file.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::conversation::{Conversation, Stage};
    use crate::models::message::Message;

    fn snapshot_with(title: &str) -> StoreSnapshot {
        let mut conversation = Conversation::new("c1".to_string());
        conversation.push(Message::user("m1".to_string(), title));
        conversation.stage = Stage::AwaitingProfiles;
        StoreSnapshot {
            active_id: conversation.id.clone(),
            conversations: vec![conversation],
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("conversations.json");

        save(&path, &snapshot_with("hey guide me")).unwrap();
        let loaded = Archive::new(&path).load().unwrap();

        assert_eq!(loaded.active_id, "c1");
        assert_eq!(loaded.conversations[0].title, "hey guide me");
        assert_eq!(loaded.conversations[0].stage, Stage::AwaitingProfiles);
    }

    #[test]
    fn test_missing_and_corrupt_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.json");
        assert!(Archive::new(&path).load().is_none());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(Archive::new(&path).load().is_none());
    }

    #[tokio::test]
    async fn test_writer_persists_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.json");
        let handle = Archive::new(&path).spawn_writer(snapshot_with("first"));

        handle.publish(snapshot_with("second"));

        let mut loaded = None;
        for _ in 0..100 {
            if let Some(snapshot) = Archive::new(&path).load() {
                if snapshot.conversations[0].title == "second" {
                    loaded = Some(snapshot);
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(loaded.is_some(), "archive was not written");
    }
}
