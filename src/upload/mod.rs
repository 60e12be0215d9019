mod client;
mod picker;
mod types;

pub use client::{interpret_response, ApiClient, Uploader};
pub use picker::{FilePicker, RejectReason, Rejection, Selection, SUPPORTED_EXTENSIONS};
pub use types::{EntryId, EntryStatus, FileEntry, FileRef, UploadEvent, UploadResult};
