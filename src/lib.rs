pub mod app;
pub mod config;
pub mod error;
pub mod queue;
pub mod upload;
pub mod utils;

pub use config::AppConfig;
pub use error::{ClientError, ConfigError, QueueError, UploadFailure};
pub use queue::{FileEntryStore, QueueDriver};
pub use upload::{ApiClient, FileEntry, FileRef, Uploader};
