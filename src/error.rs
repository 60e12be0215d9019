use crate::upload::EntryId;
use thiserror::Error;

pub const DEFAULT_FAILURE_MESSAGE: &str = "Upload failed";

pub type QueueResult<T> = std::result::Result<T, QueueError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("No entry with id {0}")]
    NotFound(EntryId),
    #[error("Entry {id} cannot be {attempted} while {current}")]
    InvalidTransition {
        id: EntryId,
        current: &'static str,
        attempted: &'static str,
    },
}

/// Failure reported by an uploader. Without a reason, or with a blank one,
/// it reads as the generic fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{}", reason_or_fallback(.reason))]
pub struct UploadFailure {
    pub reason: Option<String>,
}

impl UploadFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            reason: (!reason.trim().is_empty()).then_some(reason),
        }
    }

    pub fn unspecified() -> Self {
        Self::default()
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn reason_or_fallback(reason: &Option<String>) -> &str {
    reason
        .as_deref()
        .filter(|reason| !reason.trim().is_empty())
        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid access token: {0}")]
    Token(#[from] TokenError),
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token contains characters that are not allowed in a header")]
    InvalidCharacters,
    #[error("Could not find a bearer token in the pasted text")]
    Missing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
