use crate::error::{QueueError, QueueResult};
use crate::upload::{EntryId, EntryStatus, FileEntry, FileRef, UploadResult};
use std::sync::{Arc, Mutex, MutexGuard};

pub const PROGRESS_IDLE: u8 = 0;
pub const PROGRESS_DISPATCHED: u8 = 50;
pub const PROGRESS_DONE: u8 = 100;

/// A state change requested for one entry. Each variant carries exactly the
/// data its target status needs, so a patch can never leave an entry half-set.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Dispatch,
    Succeed(UploadResult),
    Fail(String),
}

impl Transition {
    fn name(&self) -> &'static str {
        match self {
            Transition::Dispatch => "dispatched",
            Transition::Succeed(_) => "marked successful",
            Transition::Fail(_) => "marked failed",
        }
    }
}

/// Ordered collection of queue entries. Clones share the same entries.
#[derive(Clone, Default)]
pub struct FileEntryStore {
    entries: Arc<Mutex<Vec<FileEntry>>>,
}

impl FileEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FileEntry>> {
        // A panic while holding the lock cannot leave a half-applied entry,
        // every mutation below replaces whole fields in one step.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self, file: Arc<FileRef>) -> EntryId {
        let mut entries = self.lock();
        let id = loop {
            let candidate = EntryId::new();
            if !entries.iter().any(|entry| entry.id == candidate) {
                break candidate;
            }
        };

        entries.push(FileEntry {
            id,
            file,
            status: EntryStatus::Uploading,
            progress: PROGRESS_IDLE,
        });
        id
    }

    pub fn transition(&self, id: EntryId, transition: Transition) -> QueueResult<()> {
        let mut entries = self.lock();
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(QueueError::NotFound(id))?;

        let allowed = match (&transition, &entry.status) {
            (Transition::Dispatch, EntryStatus::Uploading) => entry.progress == PROGRESS_IDLE,
            (Transition::Dispatch, EntryStatus::Error(_)) => true,
            (Transition::Succeed(_) | Transition::Fail(_), EntryStatus::Uploading) => {
                entry.progress == PROGRESS_DISPATCHED
            }
            _ => false,
        };
        if !allowed {
            return Err(QueueError::InvalidTransition {
                id,
                current: entry.status.label(),
                attempted: transition.name(),
            });
        }

        let (status, progress) = match transition {
            Transition::Dispatch => (EntryStatus::Uploading, PROGRESS_DISPATCHED),
            Transition::Succeed(result) => (EntryStatus::Success(result), PROGRESS_DONE),
            Transition::Fail(reason) => (EntryStatus::Error(reason), PROGRESS_IDLE),
        };
        entry.status = status;
        entry.progress = progress;
        Ok(())
    }

    pub fn remove(&self, id: EntryId) -> QueueResult<FileEntry> {
        let mut entries = self.lock();
        let index = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(QueueError::NotFound(id))?;
        Ok(entries.remove(index))
    }

    /// Removes every entry matching `predicate`, returning how many went away.
    pub fn remove_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&FileEntry) -> bool,
    {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|entry| !predicate(entry));
        before - entries.len()
    }

    pub fn snapshot(&self) -> Vec<FileEntry> {
        self.lock().clone()
    }

    pub fn get(&self, id: EntryId) -> Option<FileEntry> {
        self.lock().iter().find(|entry| entry.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> Arc<FileRef> {
        Arc::new(FileRef::new(name, 1024))
    }

    fn names(store: &FileEntryStore) -> Vec<String> {
        store
            .snapshot()
            .iter()
            .map(|entry| entry.file.name.clone())
            .collect()
    }

    #[test]
    fn create_appends_uploading_entries_in_order() {
        let store = FileEntryStore::new();
        let a = store.create(file("a.jpg"));
        let b = store.create(file("b.jpg"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, a);
        assert_eq!(snapshot[1].id, b);
        assert!(snapshot
            .iter()
            .all(|entry| entry.is_uploading() && entry.progress == PROGRESS_IDLE));
    }

    #[test]
    fn success_requires_dispatch_and_sets_full_progress() {
        let store = FileEntryStore::new();
        let id = store.create(file("a.jpg"));

        let early = store.transition(id, Transition::Succeed(UploadResult::new("1")));
        assert!(matches!(early, Err(QueueError::InvalidTransition { .. })));

        store.transition(id, Transition::Dispatch).unwrap();
        assert_eq!(store.get(id).unwrap().progress, PROGRESS_DISPATCHED);

        store
            .transition(id, Transition::Succeed(UploadResult::new("42")))
            .unwrap();
        let entry = store.get(id).unwrap();
        assert_eq!(entry.progress, PROGRESS_DONE);
        assert_eq!(entry.result().unwrap().remote_id, "42");
        assert!(entry.error_message().is_none());
    }

    #[test]
    fn failure_resets_progress_and_allows_redispatch() {
        let store = FileEntryStore::new();
        let id = store.create(file("a.jpg"));
        store.transition(id, Transition::Dispatch).unwrap();
        store
            .transition(id, Transition::Fail("timeout".to_string()))
            .unwrap();

        let entry = store.get(id).unwrap();
        assert_eq!(entry.progress, PROGRESS_IDLE);
        assert_eq!(entry.error_message(), Some("timeout"));
        assert!(entry.result().is_none());

        store.transition(id, Transition::Dispatch).unwrap();
        let entry = store.get(id).unwrap();
        assert!(entry.is_uploading());
        assert!(entry.error_message().is_none());
        assert_eq!(entry.progress, PROGRESS_DISPATCHED);
    }

    #[test]
    fn success_is_terminal() {
        let store = FileEntryStore::new();
        let id = store.create(file("a.jpg"));
        store.transition(id, Transition::Dispatch).unwrap();
        store
            .transition(id, Transition::Succeed(UploadResult::new("7")))
            .unwrap();

        for transition in [
            Transition::Dispatch,
            Transition::Fail("late".to_string()),
            Transition::Succeed(UploadResult::new("8")),
        ] {
            assert!(matches!(
                store.transition(id, transition),
                Err(QueueError::InvalidTransition { current: "success", .. })
            ));
        }
        assert_eq!(store.get(id).unwrap().result().unwrap().remote_id, "7");
    }

    #[test]
    fn double_dispatch_is_rejected() {
        let store = FileEntryStore::new();
        let id = store.create(file("a.jpg"));
        store.transition(id, Transition::Dispatch).unwrap();
        assert!(store.transition(id, Transition::Dispatch).is_err());
    }

    #[test]
    fn missing_ids_report_not_found() {
        let store = FileEntryStore::new();
        let id = store.create(file("a.jpg"));
        store.remove(id).unwrap();

        assert_eq!(store.remove(id), Err(QueueError::NotFound(id)));
        assert_eq!(
            store.transition(id, Transition::Dispatch),
            Err(QueueError::NotFound(id))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn removal_keeps_survivor_order() {
        let store = FileEntryStore::new();
        let ids: Vec<_> = ["a.jpg", "b.jpg", "c.jpg", "d.jpg"]
            .iter()
            .map(|name| store.create(file(name)))
            .collect();

        store.remove(ids[1]).unwrap();
        assert_eq!(names(&store), ["a.jpg", "c.jpg", "d.jpg"]);

        let removed = store.remove_where(|entry| entry.file.name == "c.jpg");
        assert_eq!(removed, 1);
        assert_eq!(names(&store), ["a.jpg", "d.jpg"]);
        assert_eq!(store.remove_where(|_| false), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clones_share_entries() {
        let store = FileEntryStore::new();
        let handle = store.clone();
        let id = handle.create(file("a.jpg"));
        assert_eq!(store.get(id).unwrap().file.name, "a.jpg");
    }
}
