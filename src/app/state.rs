use crate::upload::{FileEntry, Rejection, UploadEvent};
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

const MAX_NOTICES: usize = 5;
const NOTICE_LIFETIME: Duration = Duration::from_secs(6);

/// Counts over one queue snapshot, used for the overall progress bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub total: usize,
    pub uploading: usize,
    pub successful: usize,
    pub failed: usize,
}

impl QueueSummary {
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut summary, entry| {
            summary.total += 1;
            if entry.is_success() {
                summary.successful += 1;
            } else if entry.is_error() {
                summary.failed += 1;
            } else {
                summary.uploading += 1;
            }
            summary
        })
    }

    pub fn get_progress_percentage(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.successful + self.failed) as f32 / self.total as f32
        }
    }

    pub fn get_status_text(&self) -> String {
        format!(
            "Progress: {}/{} files | ✅ Uploaded: {} | ⏳ Uploading: {} | ❌ Failed: {}",
            self.successful + self.failed,
            self.total,
            self.successful,
            self.uploading,
            self.failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

impl Notice {
    pub fn from_event(event: &UploadEvent) -> Self {
        let (text, is_error) = match event {
            UploadEvent::Uploaded { name, .. } => (
                format!("{} uploaded successfully! AI analysis in progress...", name),
                false,
            ),
            UploadEvent::Failed { name, reason, .. } => {
                (format!("Failed to upload {}: {}", name, reason), true)
            }
        };
        Self {
            text,
            is_error,
            created: Instant::now(),
        }
    }
}

#[derive(Default)]
pub struct UploadState {
    pub notices: VecDeque<Notice>,
    pub rejections: Vec<Rejection>,
    pub error_message: Option<String>,
    pub show_rejections: bool,
    pub event_receiver: Option<Receiver<UploadEvent>>,
}

impl UploadState {
    pub fn with_receiver(receiver: Receiver<UploadEvent>) -> Self {
        Self {
            event_receiver: Some(receiver),
            ..Default::default()
        }
    }

    /// Moves pending upload events into the notice list. Returns true if any arrived.
    pub fn drain_events(&mut self) -> bool {
        let events: Vec<UploadEvent> = match &self.event_receiver {
            Some(receiver) => receiver.try_iter().collect(),
            None => return false,
        };

        for event in &events {
            self.push_notice(Notice::from_event(event));
        }
        !events.is_empty()
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    pub fn expire_notices(&mut self, now: Instant) {
        self.notices
            .retain(|notice| now.duration_since(notice.created) < NOTICE_LIFETIME);
    }

    pub fn set_rejections(&mut self, rejections: Vec<Rejection>) {
        self.show_rejections = !rejections.is_empty();
        self.rejections = rejections;
    }
}
