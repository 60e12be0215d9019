use crate::config::AppConfig;
use crate::upload::types::FileRef;
use crate::utils::file_size::format_file_size;
use glob::Pattern;
use ignore::Walk;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpeg", "jpg", "png", "gif", "bmp", "webp"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("Unsupported file type")]
    UnsupportedType,
    #[error("File is larger than {0}")]
    TooLarge(String),
    #[error("Too many files, at most {0} per selection")]
    TooMany(usize),
    #[error("Not a regular file")]
    NotAFile,
    #[error("Failed to read file: {0}")]
    Unreadable(String),
}

/// A candidate that never made it into the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

#[derive(Debug, Default)]
pub struct Selection {
    pub accepted: Vec<FileRef>,
    pub rejected: Vec<Rejection>,
}

/// Screens candidate paths against the type whitelist and size/count limits.
#[derive(Debug, Clone)]
pub struct FilePicker {
    max_file_size: u64,
    max_files: usize,
    ignored: Vec<Pattern>,
}

impl FilePicker {
    pub fn new(max_file_size: u64, max_files: usize) -> Self {
        Self {
            max_file_size,
            max_files,
            ignored: Vec::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut picker = Self::new(config.max_file_size, config.max_files);
        for pattern in &config.ignore_patterns {
            picker = picker.ignore(pattern);
        }
        picker
    }

    /// Adds a glob whose matches are skipped without a rejection.
    pub fn ignore(mut self, pattern: &str) -> Self {
        let processed = if pattern.starts_with("**/") {
            pattern.to_string()
        } else {
            format!("**/{}", pattern)
        };
        match Pattern::new(&processed) {
            Ok(pattern) => self.ignored.push(pattern),
            Err(e) => log::warn!("Ignoring invalid pattern '{}': {}", pattern, e),
        }
        self
    }

    pub fn select<I, P>(&self, paths: I) -> Selection
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut selection = Selection::default();

        for path in paths {
            let path = path.as_ref();
            if self.is_ignored(path) {
                log::debug!("Skipping ignored file {:?}", path);
                continue;
            }

            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            match self.check(path) {
                Ok(file) => selection.accepted.push(file),
                Err(reason) => selection.rejected.push(Rejection { name, reason }),
            }
        }

        // Like a drop zone with a file limit: an over-limit selection is refused whole.
        if selection.accepted.len() > self.max_files {
            let refused = std::mem::take(&mut selection.accepted);
            selection
                .rejected
                .extend(refused.into_iter().map(|file| Rejection {
                    name: file.name,
                    reason: RejectReason::TooMany(self.max_files),
                }));
        }

        log::info!(
            "Selected {} file(s), rejected {}",
            selection.accepted.len(),
            selection.rejected.len()
        );
        selection
    }

    /// Walks `folder` (honouring .gitignore and hidden-file rules) and selects the images in it.
    pub fn select_folder(&self, folder: &Path) -> Selection {
        let mut paths: Vec<PathBuf> = Walk::new(folder)
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && Self::is_supported(path))
            .collect();
        paths.sort();
        self.select(paths)
    }

    fn check(&self, path: &Path) -> Result<FileRef, RejectReason> {
        if !Self::is_supported(path) {
            return Err(RejectReason::UnsupportedType);
        }

        let metadata =
            std::fs::metadata(path).map_err(|e| RejectReason::Unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(RejectReason::NotAFile);
        }
        if metadata.len() > self.max_file_size {
            return Err(RejectReason::TooLarge(format_file_size(self.max_file_size)));
        }

        Ok(FileRef::new(path, metadata.len()))
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignored
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}
