use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Identifier of a queue entry, stable across retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file admitted by the picker. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileRef {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        Self {
            path,
            name,
            size,
            mime_type,
        }
    }
}

/// What the remote service handed back for a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub remote_id: String,
    pub url: Option<String>,
    pub metadata: serde_json::Value,
}

impl UploadResult {
    pub fn new(remote_id: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            url: None,
            metadata: serde_json::Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryStatus {
    Uploading,
    Success(UploadResult),
    Error(String),
}

impl EntryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::Uploading => "uploading",
            EntryStatus::Success(_) => "success",
            EntryStatus::Error(_) => "error",
        }
    }
}

/// One tracked file moving through the upload lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub id: EntryId,
    pub file: Arc<FileRef>,
    pub status: EntryStatus,
    pub progress: u8,
}

impl FileEntry {
    pub fn is_uploading(&self) -> bool {
        matches!(self.status, EntryStatus::Uploading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, EntryStatus::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, EntryStatus::Error(_))
    }

    pub fn result(&self) -> Option<&UploadResult> {
        match &self.status {
            EntryStatus::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            EntryStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Notifications emitted by the queue driver as uploads settle.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Uploaded { id: EntryId, name: String },
    Failed { id: EntryId, name: String, reason: String },
}
