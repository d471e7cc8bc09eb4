//! Debounced draft autosave.
//!
//! Editors submit immutable snapshots as the user types. A background task
//! keeps the latest snapshot per draft key and writes them all after a quiet
//! period with no newer submissions. Content identical to the last write is skipped. Dropping the
//! handle or calling `shutdown` cancels any pending write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period before a draft is written.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(4);

#[derive(Error, Debug)]
pub enum AutosaveError {
    #[error("Draft serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Autosave task is no longer running")]
    Closed,
}

/// Serialized form state at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    key: String,
    payload: String,
}

impl DraftSnapshot {
    pub fn new<T: Serialize>(key: &str, value: &T) -> Result<Self, AutosaveError> {
        Ok(Self {
            key: key.to_string(),
            payload: serde_json::to_string(value)?,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

fn draft_path(dir: &Path, key: &str) -> PathBuf {
    let safe: String = key
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    dir.join(format!("{safe}.json"))
}

pub struct DraftAutosave {
    tx: mpsc::UnboundedSender<DraftSnapshot>,
    handle: Option<JoinHandle<()>>,
    saves: Arc<AtomicUsize>,
}

impl DraftAutosave {
    /// Starts the debounce task. Must be called inside a tokio runtime.
    pub fn spawn(dir: PathBuf, quiet_period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let saves = Arc::new(AtomicUsize::new(0));
        let counter = saves.clone();
        let handle = tokio::spawn(async move {
            debounce_loop(dir, quiet_period, rx, counter).await;
        });
        Self {
            tx,
            handle: Some(handle),
            saves,
        }
    }

    /// Queues a snapshot, replacing any not-yet-written one for the same key.
    pub fn submit(&self, snapshot: DraftSnapshot) -> Result<(), AutosaveError> {
        self.tx.send(snapshot).map_err(|_| AutosaveError::Closed)
    }

    /// Number of drafts actually written.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// Stops the task, discarding any pending snapshot.
    pub fn shutdown(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for DraftAutosave {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn debounce_loop(
    dir: PathBuf,
    quiet_period: Duration,
    mut rx: mpsc::UnboundedReceiver<DraftSnapshot>,
    saves: Arc<AtomicUsize>,
) {
    let mut pending: HashMap<String, DraftSnapshot> = HashMap::new();
    let mut last_written: HashMap<String, String> = HashMap::new();

    loop {
        let next = if pending.is_empty() {
            rx.recv().await
        } else {
            match tokio::time::timeout(quiet_period, rx.recv()).await {
                Ok(msg) => msg,
                Err(_) => {
                    for (_, snapshot) in pending.drain() {
                        write_if_changed(&dir, &snapshot, &mut last_written, &saves).await;
                    }
                    continue;
                }
            }
        };

        match next {
            Some(snapshot) => {
                pending.insert(snapshot.key.clone(), snapshot);
            }
            None => break,
        }
    }
}

async fn write_if_changed(
    dir: &Path,
    snapshot: &DraftSnapshot,
    last_written: &mut HashMap<String, String>,
    saves: &AtomicUsize,
) {
    if last_written.get(&snapshot.key) == Some(&snapshot.payload) {
        tracing::trace!(key = %snapshot.key, "Draft unchanged, skipping write");
        return;
    }

    let path = draft_path(dir, &snapshot.key);
    if let Ok(existing) = tokio::fs::read_to_string(&path).await {
        if existing == snapshot.payload {
            last_written.insert(snapshot.key.clone(), snapshot.payload.clone());
            return;
        }
    }

    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, &snapshot.payload).await
    }
    .await;

    match result {
        Ok(()) => {
            last_written.insert(snapshot.key.clone(), snapshot.payload.clone());
            saves.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %snapshot.key, bytes = snapshot.payload.len(), "Draft auto-saved");
        }
        Err(e) => {
            tracing::warn!(key = %snapshot.key, error = %e, "Draft auto-save failed");
        }
    }
}

/// Reads a saved draft, if any.
pub fn load_draft<T: DeserializeOwned>(dir: &Path, key: &str) -> Result<Option<T>, AutosaveError> {
    let path = draft_path(dir, key);
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&text)?))
}

/// Removes a draft after the form is submitted.
pub fn clear_draft(dir: &Path, key: &str) -> Result<(), AutosaveError> {
    let path = draft_path(dir, key);
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InitialVisit;

    const QUIET: Duration = Duration::from_millis(50);

    fn visit(complaint: &str) -> InitialVisit {
        InitialVisit {
            chief_complaint: Some(complaint.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn writes_only_latest_snapshot_after_quiet_period() {
        let dir = tempfile::tempdir().unwrap();
        let autosave = DraftAutosave::spawn(dir.path().to_path_buf(), QUIET);

        for text in ["N", "Ne", "Neck", "Neck pain"] {
            autosave
                .submit(DraftSnapshot::new("initialVisit_p1", &visit(text)).unwrap())
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(autosave.saves(), 1);
        let saved: InitialVisit = load_draft(dir.path(), "initialVisit_p1").unwrap().unwrap();
        assert_eq!(saved.chief_complaint.as_deref(), Some("Neck pain"));
    }

    #[tokio::test]
    async fn unchanged_content_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let autosave = DraftAutosave::spawn(dir.path().to_path_buf(), QUIET);
        let snapshot = DraftSnapshot::new("draft", &visit("Low back")).unwrap();

        autosave.submit(snapshot.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        autosave.submit(snapshot).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(autosave.saves(), 1);
    }

    #[tokio::test]
    async fn drafts_for_different_keys_are_all_written() {
        let dir = tempfile::tempdir().unwrap();
        let autosave = DraftAutosave::spawn(dir.path().to_path_buf(), QUIET);

        autosave
            .submit(DraftSnapshot::new("patientForm_p1", &visit("A")).unwrap())
            .unwrap();
        autosave
            .submit(DraftSnapshot::new("initialVisit_p1", &visit("B")).unwrap())
            .unwrap();
        autosave
            .submit(DraftSnapshot::new("patientForm_p1", &visit("A2")).unwrap())
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(autosave.saves(), 2);
        let first: InitialVisit = load_draft(dir.path(), "patientForm_p1").unwrap().unwrap();
        let second: InitialVisit = load_draft(dir.path(), "initialVisit_p1").unwrap().unwrap();
        assert_eq!(first.chief_complaint.as_deref(), Some("A2"));
        assert_eq!(second.chief_complaint.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn shutdown_cancels_pending_write() {
        let dir = tempfile::tempdir().unwrap();
        let autosave = DraftAutosave::spawn(dir.path().to_path_buf(), QUIET);
        autosave
            .submit(DraftSnapshot::new("draft", &visit("pending")).unwrap())
            .unwrap();
        autosave.shutdown();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let loaded: Option<InitialVisit> = load_draft(dir.path(), "draft").unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn drop_cancels_pending_write() {
        let dir = tempfile::tempdir().unwrap();
        {
            let autosave = DraftAutosave::spawn(dir.path().to_path_buf(), QUIET);
            autosave
                .submit(DraftSnapshot::new("draft", &visit("pending")).unwrap())
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!draft_path(dir.path(), "draft").exists());
    }

    #[test]
    fn clear_draft_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = draft_path(dir.path(), "initialVisit_p1");
        std::fs::write(&path, "{}").unwrap();
        clear_draft(dir.path(), "initialVisit_p1").unwrap();
        assert!(!path.exists());
        clear_draft(dir.path(), "initialVisit_p1").unwrap();
    }

    #[test]
    fn draft_keys_are_made_path_safe() {
        let path = draft_path(Path::new("/drafts"), "../../etc/passwd");
        assert_eq!(path, PathBuf::from("/drafts/______etc_passwd.json"));
    }
}
