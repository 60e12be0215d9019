use async_trait::async_trait;
use image_uploader::queue::{FileEntryStore, QueueDriver};
use image_uploader::upload::{EntryStatus, FileRef, UploadResult, Uploader};
use image_uploader::UploadFailure;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// Hands out queued answers per file name, optionally holding a call open
/// until the test releases it.
#[derive(Default)]
struct RemoteStub {
    answers: Mutex<HashMap<String, VecDeque<Result<UploadResult, UploadFailure>>>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    started: Mutex<Option<mpsc::UnboundedSender<String>>>,
    calls: Mutex<Vec<String>>,
}

impl RemoteStub {
    fn answer(&self, name: &str, answer: Result<UploadResult, UploadFailure>) {
        self.answers
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push_back(answer);
    }

    fn gate(&self, name: &str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gates.lock().unwrap().insert(name.to_string(), gate);
        release
    }

    fn watch_starts(&self) -> mpsc::UnboundedReceiver<String> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.started.lock().unwrap() = Some(sender);
        receiver
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Uploader for RemoteStub {
    async fn upload(&self, file: &FileRef) -> Result<UploadResult, UploadFailure> {
        self.calls.lock().unwrap().push(file.name.clone());
        if let Some(started) = self.started.lock().unwrap().as_ref() {
            let _ = started.send(file.name.clone());
        }

        let gate = self.gates.lock().unwrap().remove(&file.name);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.answers
            .lock()
            .unwrap()
            .get_mut(&file.name)
            .and_then(|answers| answers.pop_front())
            .unwrap_or_else(|| Ok(UploadResult::new(format!("auto-{}", file.name))))
    }
}

fn setup() -> (QueueDriver<RemoteStub>, Arc<RemoteStub>) {
    let remote = Arc::new(RemoteStub::default());
    let driver = QueueDriver::new(FileEntryStore::new(), Arc::clone(&remote));
    (driver, remote)
}

fn image(name: &str, size: u64) -> FileRef {
    FileRef::new(format!("/photos/{}", name), size)
}

#[tokio::test]
async fn single_file_upload_succeeds() {
    let (driver, remote) = setup();
    remote.answer("photo1.jpg", Ok(UploadResult::new("42")));

    driver
        .enqueue_batch(vec![image("photo1.jpg", 2 * 1024 * 1024)])
        .await;

    let snapshot = driver.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot[0].is_success());
    assert_eq!(snapshot[0].progress, 100);
    assert_eq!(snapshot[0].result().unwrap().remote_id, "42");
}

#[tokio::test]
async fn failure_retry_and_clear_walkthrough() {
    let (driver, remote) = setup();
    remote.answer("b.jpg", Err(UploadFailure::new("timeout")));

    let summary = driver
        .enqueue_batch(vec![image("a.jpg", 10), image("b.jpg", 10)])
        .await;
    assert_eq!((summary.succeeded, summary.failed), (1, 1));
    assert_eq!(remote.calls(), ["a.jpg", "b.jpg"]);

    let snapshot = driver.snapshot();
    assert!(snapshot[0].is_success());
    assert_eq!(
        snapshot[1].status,
        EntryStatus::Error("timeout".to_string())
    );
    assert_eq!(snapshot[1].progress, 0);

    let b = snapshot[1].id;
    let b_file = Arc::clone(&snapshot[1].file);
    driver.retry(b).await.unwrap();

    let snapshot = driver.snapshot();
    assert_eq!(snapshot[1].id, b);
    assert!(Arc::ptr_eq(&snapshot[1].file, &b_file));
    assert!(snapshot[1].is_success());
    assert_eq!(snapshot[1].progress, 100);

    assert_eq!(driver.clear_successful(), 2);
    assert!(driver.snapshot().is_empty());
    assert_eq!(driver.clear_successful(), 0);
}

#[tokio::test]
async fn removing_an_in_flight_entry_discards_its_completion() {
    let (driver, remote) = setup();
    let mut starts = remote.watch_starts();
    let release_y = remote.gate("y.jpg");

    let batch = driver.enqueue(vec![image("x.jpg", 10), image("y.jpg", 10)]);
    let (x, y) = (batch.ids[0], batch.ids[1]);

    let runner = driver.clone();
    let task = tokio::spawn(async move { runner.run_batch(batch).await });

    assert_eq!(starts.recv().await.as_deref(), Some("x.jpg"));
    assert_eq!(starts.recv().await.as_deref(), Some("y.jpg"));

    let in_flight = driver.store().get(y).unwrap();
    assert!(in_flight.is_uploading());
    assert_eq!(in_flight.progress, 50);
    assert!(driver.is_busy());

    driver.remove_entry(y).unwrap();
    release_y.send(()).unwrap();
    let summary = task.await.unwrap();

    assert_eq!(summary.discarded, 1);
    let snapshot = driver.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, x);
    assert!(snapshot[0].is_success());
    assert!(driver.store().get(y).is_none());
    assert!(!driver.is_busy());
}

#[tokio::test]
async fn later_entries_wait_untouched_while_one_uploads() {
    let (driver, remote) = setup();
    let mut starts = remote.watch_starts();
    let release_a = remote.gate("a.jpg");

    let batch = driver.enqueue(vec![image("a.jpg", 1), image("b.jpg", 1), image("c.jpg", 1)]);
    let runner = driver.clone();
    let task = tokio::spawn(async move { runner.run_batch(batch).await });

    assert_eq!(starts.recv().await.as_deref(), Some("a.jpg"));
    let progress: Vec<_> = driver.snapshot().iter().map(|e| e.progress).collect();
    assert_eq!(progress, [50, 0, 0]);

    release_a.send(()).unwrap();
    task.await.unwrap();
    assert!(driver.snapshot().iter().all(|e| e.progress == 100));
}

#[tokio::test]
async fn retry_can_overlap_a_running_batch() {
    let (driver, remote) = setup();
    remote.answer("old.jpg", Err(UploadFailure::unspecified()));
    driver.enqueue_batch(vec![image("old.jpg", 1)]).await;
    let old = driver.snapshot()[0].id;
    assert_eq!(driver.snapshot()[0].error_message(), Some("Upload failed"));

    let mut starts = remote.watch_starts();
    let release_new = remote.gate("new.jpg");
    let batch = driver.enqueue(vec![image("new.jpg", 1)]);
    let runner = driver.clone();
    let task = tokio::spawn(async move { runner.run_batch(batch).await });
    assert_eq!(starts.recv().await.as_deref(), Some("new.jpg"));

    driver.retry(old).await.unwrap();
    assert!(driver.store().get(old).unwrap().is_success());

    release_new.send(()).unwrap();
    task.await.unwrap();
    let names: Vec<_> = driver
        .snapshot()
        .iter()
        .map(|e| e.file.name.clone())
        .collect();
    assert_eq!(names, ["old.jpg", "new.jpg"]);
}
