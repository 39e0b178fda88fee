//! Keeps the local document snapshot in line with the remote store.
//!
//! The controller is pessimistic: it never edits the snapshot to anticipate a
//! mutation. Every successful upload or delete is followed by a full re-fetch, and
//! the snapshot is only ever replaced by what the store returned.
//!
//! Two rules keep concurrent gestures from rendering out of order:
//!
//! * every `refresh` takes a generation ticket before it suspends, and its result is
//!   published only if no later-issued refresh has already published;
//! * mutations are queued, so a mutate-then-refresh chain runs to completion before
//!   the next mutation reaches the store.

use crate::error::SyncError;
use crate::models::{DocumentId, NewDocument, Snapshot};
use crate::services::metrics::record_operation;
use crate::services::store::DocumentStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[derive(Default)]
struct Published {
    generation: u64,
    snapshot: Option<Arc<Snapshot>>,
}

pub struct SyncController {
    store: Arc<dyn DocumentStore>,
    published: RwLock<Published>,
    issued: AtomicU64,
    mutations: Mutex<()>,
}

impl SyncController {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            published: RwLock::new(Published::default()),
            issued: AtomicU64::new(0),
            mutations: Mutex::new(()),
        }
    }

    /// The last published snapshot, or `None` before the first successful refresh.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.published.read().await.snapshot.clone()
    }

    pub async fn has_snapshot(&self) -> bool {
        self.published.read().await.snapshot.is_some()
    }

    /// Generation of the published snapshot; 0 until the first successful refresh.
    pub async fn generation(&self) -> u64 {
        self.published.read().await.generation
    }

    /// Fetch the full collection and publish it.
    ///
    /// On failure the previous snapshot stays published. If a refresh issued after
    /// this one has already published, this result is dropped and the newer
    /// snapshot is returned instead.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, SyncError> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let documents = match self.store.list().await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(generation = ticket, error = %e, "Refresh failed; keeping previous snapshot");
                record_operation("refresh", "error");
                return Err(e);
            }
        };

        let fresh = Arc::new(Snapshot::new(documents));
        let mut published = self.published.write().await;

        if ticket <= published.generation {
            debug!(
                generation = ticket,
                published = published.generation,
                "Discarding stale document list"
            );
            record_operation("refresh", "stale");
            return Ok(published.snapshot.clone().unwrap_or(fresh));
        }

        published.generation = ticket;
        published.snapshot = Some(fresh.clone());
        debug!(generation = ticket, documents = fresh.len(), "Published document snapshot");
        record_operation("refresh", "ok");

        Ok(fresh)
    }

    /// Upload `file` tagged with `assistant_tag`, then refresh.
    ///
    /// The tag may be empty; the store decides whether that is acceptable.
    pub async fn upload(
        &self,
        file: NewDocument,
        assistant_tag: &str,
    ) -> Result<Arc<Snapshot>, SyncError> {
        if file.bytes.is_empty() {
            return Err(SyncError::InvalidInput(format!(
                "file '{}' is empty",
                file.filename
            )));
        }

        let _queued = self.mutations.lock().await;
        let filename = file.filename.clone();

        if let Err(e) = self.store.create(file, assistant_tag).await {
            warn!(filename = %filename, assistant = %assistant_tag, error = %e, "Upload failed");
            record_operation("upload", "error");
            return Err(e);
        }

        info!(filename = %filename, assistant = %assistant_tag, "Document uploaded");
        record_operation("upload", "ok");

        self.refresh_after(format!("Uploaded {}", filename)).await
    }

    /// Delete the document with `id`, then refresh.
    ///
    /// The id is not checked against the snapshot; the store is the authority.
    pub async fn remove(&self, id: &DocumentId) -> Result<Arc<Snapshot>, SyncError> {
        let _queued = self.mutations.lock().await;

        if let Err(e) = self.store.delete(id).await {
            warn!(document_id = %id, error = %e, "Delete failed");
            record_operation("remove", "error");
            return Err(e);
        }

        info!(document_id = %id, "Document deleted");
        record_operation("remove", "ok");

        self.refresh_after(format!("Deleted document {}", id)).await
    }

    /// Refresh following an applied mutation; a failure here must not read as if
    /// the mutation itself failed.
    async fn refresh_after(&self, accepted: String) -> Result<Arc<Snapshot>, SyncError> {
        self.refresh()
            .await
            .map_err(|e| SyncError::ListNotReloaded {
                accepted,
                source: Box::new(e),
            })
    }
}
