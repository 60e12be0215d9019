use super::{ImageUploader, QueueSummary, UiCommand};
use crate::upload::{EntryStatus, FileEntry, SUPPORTED_EXTENSIONS};
use crate::utils::file_size::format_file_size;
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(37, 99, 235);
const SUCCESS: Color32 = Color32::from_rgb(22, 163, 74);
const FAILURE: Color32 = Color32::from_rgb(220, 50, 50);

impl ImageUploader {
    pub fn render(&mut self, ctx: &egui::Context) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        let entries = self.driver.snapshot();
        let summary = QueueSummary::from_entries(&entries);

        self.render_notices(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.heading("Upload Images");
                        ui.label(
                            RichText::new(
                                "Upload your images and let the AI analyze them automatically. \
                                 Supported formats: JPEG, PNG, GIF, BMP, WebP.",
                            )
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });
                    if summary.successful > 0 {
                        ui.with_layout(egui::Layout::right_to_left(Align::Min), |ui| {
                            if ui.button("👁 View in Gallery").clicked() {
                                commands.push(UiCommand::OpenGallery);
                            }
                        });
                    }
                });

                ui.add_space(20.0);
                self.render_token_input(ui);
                ui.add_space(10.0);
                self.render_pickers(ui, &mut commands);

                if self.state.show_rejections {
                    ui.add_space(10.0);
                    self.render_rejections(ui);
                }

                if !entries.is_empty() {
                    ui.add_space(20.0);
                    Self::render_queue(ui, &entries, &summary, &mut commands);
                }

                if let Some(error) = &self.state.error_message {
                    ui.add_space(10.0);
                    ui.vertical_centered(|ui| {
                        ui.colored_label(FAILURE, error);
                    });
                }
                ui.add_space(20.0);
            });
        });

        commands
    }

    fn render_token_input(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Access token");
                ui.label("ℹ").on_hover_text_at_pointer(
                    "Paste your access token, an 'Authorization: Bearer ...' header,\n\
                     or a request copied as cURL from the browser's Network tab.",
                );
            });
            ui.add(
                egui::TextEdit::singleline(&mut self.token_text)
                    .password(true)
                    .desired_width(f32::INFINITY)
                    .hint_text("Bearer eyJhbGciOi..."),
            );
        });
    }

    fn render_pickers(&self, ui: &mut egui::Ui, commands: &mut Vec<UiCommand>) {
        ui.group(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .add(egui::Button::new("📤 Select Images").min_size(egui::vec2(160.0, 36.0)))
                        .clicked()
                    {
                        if let Some(paths) = FileDialog::new()
                            .add_filter("Images", &SUPPORTED_EXTENSIONS)
                            .pick_files()
                        {
                            commands.push(UiCommand::PickFiles(paths));
                        }
                    }
                    if ui
                        .add(egui::Button::new("📁 Select Folder").min_size(egui::vec2(160.0, 36.0)))
                        .clicked()
                    {
                        if let Some(folder) = FileDialog::new().pick_folder() {
                            commands.push(UiCommand::PickFolder(folder));
                        }
                    }
                });
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!(
                        "Select up to {} images (max {} each)",
                        self.config.max_files,
                        format_file_size(self.config.max_file_size)
                    ))
                    .small(),
                );
                ui.add_space(8.0);
            });
        });
    }

    fn render_rejections(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.colored_label(
                    FAILURE,
                    format!("{} file(s) were not added", self.state.rejections.len()),
                );
                if ui.small_button("Dismiss").clicked() {
                    self.state.show_rejections = false;
                }
            });
            for rejection in &self.state.rejections {
                ui.label(format!("⏩ {} - {}", rejection.name, rejection.reason));
            }
        });
    }

    fn render_queue(
        ui: &mut egui::Ui,
        entries: &[FileEntry],
        summary: &QueueSummary,
        commands: &mut Vec<UiCommand>,
    ) {
        ui.horizontal(|ui| {
            ui.heading(format!("Upload Progress ({} files)", entries.len()));
            if summary.successful > 0 {
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    if ui.link("Clear successful uploads").clicked() {
                        commands.push(UiCommand::ClearSuccessful);
                    }
                });
            }
        });

        ui.add(
            egui::ProgressBar::new(summary.get_progress_percentage())
                .show_percentage()
                .animate(summary.uploading > 0)
                .fill(ACCENT),
        );
        ui.label(summary.get_status_text());
        ui.add_space(8.0);

        for entry in entries {
            Self::render_entry(ui, entry, commands);
            ui.add_space(4.0);
        }
    }

    fn render_entry(ui: &mut egui::Ui, entry: &FileEntry, commands: &mut Vec<UiCommand>) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.strong(&entry.file.name);
                    ui.label(
                        RichText::new(format_file_size(entry.file.size))
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                    if entry.is_success() {
                        ui.colored_label(SUCCESS, RichText::new("AI processing in progress...").small());
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    if ui.small_button("✖").on_hover_text("Remove").clicked() {
                        commands.push(UiCommand::Remove(entry.id));
                    }

                    match &entry.status {
                        EntryStatus::Uploading => {
                            ui.add(
                                egui::ProgressBar::new(f32::from(entry.progress) / 100.0)
                                    .desired_width(96.0)
                                    .show_percentage()
                                    .fill(ACCENT),
                            );
                        }
                        EntryStatus::Success(_) => {
                            ui.colored_label(SUCCESS, "✅ Uploaded");
                        }
                        EntryStatus::Error(message) => {
                            if ui.link("Retry").clicked() {
                                commands.push(UiCommand::Retry(entry.id));
                            }
                            ui.colored_label(FAILURE, format!("❌ {}", message));
                        }
                    }
                });
            });
        });
    }

    fn render_notices(&self, ctx: &egui::Context) {
        if self.state.notices.is_empty() {
            return;
        }

        egui::TopBottomPanel::bottom("notices").show(ctx, |ui| {
            ui.add_space(4.0);
            for notice in &self.state.notices {
                let color = if notice.is_error { FAILURE } else { SUCCESS };
                ui.colored_label(color, &notice.text);
            }
            ui.add_space(4.0);
        });
    }
}
