use crate::error::QueueError;
use crate::queue::store::{FileEntryStore, Transition};
use crate::upload::{EntryId, Uploader};

/// How a single upload attempt ended, as seen by the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(String),
    /// The entry was removed before or during the attempt.
    Discarded,
    /// The entry was not in a state that allows dispatching.
    Skipped,
}

/// Drives one entry through dispatch, upload and settlement.
pub async fn run<U>(store: &FileEntryStore, uploader: &U, id: EntryId) -> Outcome
where
    U: Uploader + ?Sized,
{
    match store.transition(id, Transition::Dispatch) {
        Ok(()) => {}
        Err(QueueError::NotFound(_)) => return Outcome::Discarded,
        Err(e) => {
            log::debug!("Not dispatching: {}", e);
            return Outcome::Skipped;
        }
    }

    let Some(entry) = store.get(id) else {
        return Outcome::Discarded;
    };
    log::info!("Uploading {} ({})", entry.file.name, id);

    let (transition, outcome) = match uploader.upload(&entry.file).await {
        Ok(result) => {
            log::info!("Uploaded {} as {}", entry.file.name, result.remote_id);
            (Transition::Succeed(result), Outcome::Succeeded)
        }
        Err(failure) => {
            let reason = failure.message();
            log::warn!("Failed to upload {}: {}", entry.file.name, reason);
            (Transition::Fail(reason.clone()), Outcome::Failed(reason))
        }
    };

    match store.transition(id, transition) {
        Ok(()) => outcome,
        Err(QueueError::NotFound(_)) => {
            log::debug!("Discarding completion for removed entry {}", id);
            Outcome::Discarded
        }
        Err(e) => {
            log::warn!("Dropping completion for {}: {}", id, e);
            Outcome::Discarded
        }
    }
}
