use crate::error::{QueueError, QueueResult};
use crate::queue::operation::{self, Outcome};
use crate::queue::store::FileEntryStore;
use crate::upload::{EntryId, FileEntry, FileRef, UploadEvent, Uploader};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Entries created together by one `enqueue` call, in acceptance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub ids: Vec<EntryId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub discarded: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Discarded | Outcome::Skipped => self.discarded += 1,
        }
    }
}

/// Orchestrates batches, retries and cleanup over a shared store.
///
/// Uploads inside a batch run one after another, so each driver keeps at most
/// one request of a given batch in flight. Retries and other batches run as
/// their own tasks and may overlap with it.
pub struct QueueDriver<U: ?Sized> {
    store: FileEntryStore,
    uploader: Arc<U>,
    events: Option<Sender<UploadEvent>>,
    active: Arc<AtomicUsize>,
}

impl<U: ?Sized> Clone for QueueDriver<U> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            uploader: Arc::clone(&self.uploader),
            events: self.events.clone(),
            active: Arc::clone(&self.active),
        }
    }
}

struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<U> QueueDriver<U>
where
    U: Uploader + ?Sized,
{
    pub fn new(store: FileEntryStore, uploader: Arc<U>) -> Self {
        Self {
            store,
            uploader,
            events: None,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sends an [`UploadEvent`] on `sender` each time an upload settles.
    pub fn with_events(mut self, sender: Sender<UploadEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn store(&self) -> &FileEntryStore {
        &self.store
    }

    /// Swaps the uploader used by later operations, e.g. after the token changed.
    pub fn set_uploader(&mut self, uploader: Arc<U>) {
        self.uploader = uploader;
    }

    pub fn snapshot(&self) -> Vec<FileEntry> {
        self.store.snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    pub fn enqueue(&self, files: Vec<FileRef>) -> Batch {
        let ids = files
            .into_iter()
            .map(|file| self.store.create(Arc::new(file)))
            .collect::<Vec<_>>();
        log::info!("Queued {} file(s)", ids.len());
        Batch { ids }
    }

    pub async fn run_batch(&self, batch: Batch) -> BatchSummary {
        let _guard = ActiveGuard::enter(&self.active);
        let mut summary = BatchSummary {
            total: batch.ids.len(),
            ..Default::default()
        };

        for id in batch.ids {
            let outcome = self.run_one(id).await;
            summary.record(&outcome);
        }

        log::info!(
            "Batch complete: {}/{} uploaded, {} failed, {} discarded",
            summary.succeeded,
            summary.total,
            summary.failed,
            summary.discarded
        );
        summary
    }

    pub async fn enqueue_batch(&self, files: Vec<FileRef>) -> BatchSummary {
        let batch = self.enqueue(files);
        self.run_batch(batch).await
    }

    /// Re-runs the upload for an entry currently in `Error`.
    pub async fn retry(&self, id: EntryId) -> QueueResult<Outcome> {
        let entry = self.store.get(id).ok_or(QueueError::NotFound(id))?;
        if !entry.is_error() {
            return Err(QueueError::InvalidTransition {
                id,
                current: entry.status.label(),
                attempted: "retried",
            });
        }

        let _guard = ActiveGuard::enter(&self.active);
        log::info!("Retrying {} ({})", entry.file.name, id);
        Ok(self.run_one(id).await)
    }

    pub fn clear_successful(&self) -> usize {
        let removed = self.store.remove_where(FileEntry::is_success);
        if removed > 0 {
            log::info!("Cleared {} successful upload(s)", removed);
        }
        removed
    }

    pub fn remove_entry(&self, id: EntryId) -> QueueResult<()> {
        let entry = self.store.remove(id)?;
        log::info!("Removed {} ({})", entry.file.name, entry.status.label());
        Ok(())
    }

    async fn run_one(&self, id: EntryId) -> Outcome {
        let name = self.store.get(id).map(|entry| entry.file.name.clone());
        let outcome = operation::run(&self.store, self.uploader.as_ref(), id).await;

        if let (Some(sender), Some(name)) = (&self.events, name) {
            let event = match &outcome {
                Outcome::Succeeded => Some(UploadEvent::Uploaded { id, name }),
                Outcome::Failed(reason) => Some(UploadEvent::Failed {
                    id,
                    name,
                    reason: reason.clone(),
                }),
                Outcome::Discarded | Outcome::Skipped => None,
            };
            if let Some(event) = event {
                let _ = sender.send(event);
            }
        }
        outcome
    }
}
