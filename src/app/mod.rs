mod state;
mod ui;

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::queue::{FileEntryStore, QueueDriver};
use crate::upload::{ApiClient, EntryId, FilePicker, Selection, Uploader};
use eframe::{egui, App};
pub use state::{Notice, QueueSummary, UploadState};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// User commands collected while rendering and applied once the frame is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    PickFiles(Vec<PathBuf>),
    PickFolder(PathBuf),
    Retry(EntryId),
    Remove(EntryId),
    ClearSuccessful,
    OpenGallery,
}

pub struct ImageUploader {
    config: AppConfig,
    token_text: String,
    active_token: Option<String>,
    picker: FilePicker,
    driver: QueueDriver<dyn Uploader>,
    runtime: Runtime,
    state: UploadState,
}

impl ImageUploader {
    pub fn new(config: AppConfig) -> Result<Self, ClientError> {
        log::info!("Initializing Image Uploader");
        let token_text = config.token.clone().unwrap_or_default();
        let client: Arc<dyn Uploader> = Arc::new(ApiClient::from_config(&config, &token_text)?);

        let (sender, receiver) = std_mpsc::channel();
        let driver = QueueDriver::new(FileEntryStore::new(), client).with_events(sender);

        Ok(Self {
            picker: FilePicker::from_config(&config),
            active_token: Some(token_text.clone()),
            token_text,
            config,
            driver,
            runtime: Runtime::new()?,
            state: UploadState::with_receiver(receiver),
        })
    }

    /// Rebuilds the API client when the token field changed since the last upload.
    fn refresh_uploader(&mut self) -> bool {
        if self.active_token.as_deref() == Some(self.token_text.as_str()) {
            return true;
        }

        match ApiClient::from_config(&self.config, &self.token_text) {
            Ok(client) => {
                log::info!("Access token changed, rebuilding API client");
                self.driver.set_uploader(Arc::new(client));
                self.active_token = Some(self.token_text.clone());
                self.state.error_message = None;
                true
            }
            Err(e) => {
                log::warn!("Cannot build API client: {}", e);
                self.state.error_message = Some(e.to_string());
                false
            }
        }
    }

    fn start_batch(&mut self, selection: Selection) {
        self.state.set_rejections(selection.rejected);
        if selection.accepted.is_empty() {
            return;
        }
        if !self.refresh_uploader() {
            return;
        }

        let batch = self.driver.enqueue(selection.accepted);
        let driver = self.driver.clone();
        self.runtime.spawn(async move {
            driver.run_batch(batch).await;
        });
    }

    fn retry(&mut self, id: EntryId) {
        if !self.refresh_uploader() {
            return;
        }

        let driver = self.driver.clone();
        self.runtime.spawn(async move {
            if let Err(e) = driver.retry(id).await {
                log::debug!("Retry ignored: {}", e);
            }
        });
    }

    pub fn apply(&mut self, command: UiCommand) {
        match command {
            UiCommand::PickFiles(paths) => {
                let selection = self.picker.select(paths);
                self.start_batch(selection);
            }
            UiCommand::PickFolder(folder) => {
                log::info!("Processing folder: {}", folder.display());
                let selection = self.picker.select_folder(&folder);
                self.start_batch(selection);
            }
            UiCommand::Retry(id) => self.retry(id),
            UiCommand::Remove(id) => {
                if let Err(e) = self.driver.remove_entry(id) {
                    log::debug!("Remove ignored: {}", e);
                }
            }
            UiCommand::ClearSuccessful => {
                self.driver.clear_successful();
            }
            UiCommand::OpenGallery => {
                if let Err(e) = open::that(&self.config.gallery_url) {
                    log::warn!("Failed to open {}: {}", self.config.gallery_url, e);
                    self.state.error_message = Some(format!("Could not open the gallery: {}", e));
                }
            }
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.state.drain_events() {
            ctx.request_repaint();
        }
        self.state.expire_notices(Instant::now());

        if self.driver.is_busy() || !self.state.notices.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl App for ImageUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        for command in self.render(ctx) {
            self.apply(command);
        }
    }
}
