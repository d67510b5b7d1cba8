/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Main eframe::App implementation
//! Async work (OCR request, browser file picker) pushes into Arc<Mutex<Vec>>
//! queues that `update` drains every frame, so the session is only touched
//! from the UI thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eframe::egui;

use crate::client::{ExtractError, OcrClient};
use crate::config::ServiceConfig;
use crate::download::{self, TextArtifact};
use crate::model::{ExtractionSession, OcrResponse, SelectedFile, SessionStatus};
use crate::preview;

#[cfg(target_arch = "wasm32")]
use crate::picker;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

type ExtractionOutcome = Result<OcrResponse, ExtractError>;

/// Lock a result queue even if a previous holder panicked
fn lock_queue<T>(queue: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Turn a crashed request task into a failed outcome so the session leaves `Processing`
#[cfg(not(target_arch = "wasm32"))]
async fn settle(request: tokio::task::JoinHandle<ExtractionOutcome>) -> ExtractionOutcome {
    request.await.unwrap_or_else(|e| {
        log::error!("Extraction task failed: {}", e);
        Err(ExtractError::Transport(format!("extraction task failed: {}", e)))
    })
}

pub struct ExtractorApp {
    session: ExtractionSession,
    client: OcrClient,
    /// The in-flight request pushes its outcome here
    completed_queue: Arc<Mutex<Vec<ExtractionOutcome>>>,
    /// File picker pushes the chosen image (or its error) here
    file_queue: Arc<Mutex<Vec<Result<SelectedFile, String>>>>,
    warning: Option<String>,
    /// Outcome of the last download, shown under the button
    download_notice: Option<String>,
    preview_texture: Option<egui::TextureHandle>,
    preview_loaded_for: u64,
}

impl ExtractorApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: ServiceConfig,
        initial: Option<SelectedFile>,
    ) -> Self {
        log::info!("OCR endpoint: {}", config.endpoint);
        let mut app = Self {
            session: ExtractionSession::new(),
            client: OcrClient::new(&config),
            completed_queue: Arc::new(Mutex::new(Vec::new())),
            file_queue: Arc::new(Mutex::new(Vec::new())),
            warning: None,
            download_notice: None,
            preview_texture: None,
            preview_loaded_for: 0,
        };
        if let Some(file) = initial {
            app.select(file);
        }
        app
    }

    fn select(&mut self, file: SelectedFile) {
        self.session.select_file(Some(file));
        self.download_notice = None;
    }

    fn start_extraction(&mut self, ctx: &egui::Context) {
        match self.session.begin_extraction() {
            Ok(file) => self.spawn_extraction(ctx, file),
            Err(rejected) => {
                log::warn!("Extraction not started: {}", rejected);
                self.warning = Some(rejected.to_string());
            }
        }
    }

    fn spawn_extraction(&self, ctx: &egui::Context, file: SelectedFile) {
        let client = self.client.clone();
        let completed_queue = Arc::clone(&self.completed_queue);
        let ctx = ctx.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let request = tokio::spawn(async move { client.extract(file).await });
            tokio::spawn(async move {
                let outcome = settle(request).await;
                lock_queue(&completed_queue).push(outcome);
                ctx.request_repaint();
            });
        }
        #[cfg(target_arch = "wasm32")]
        spawn_local(async move {
            let outcome = client.extract(file).await;
            lock_queue(&completed_queue).push(outcome);
            ctx.request_repaint();
        });
    }

    /// Native: blocking dialog, same as a drop of the chosen file
    #[cfg(not(target_arch = "wasm32"))]
    fn open_file_picker(&mut self, _ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", preview::IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        match preview::load_image_file(&path) {
            Ok(file) => self.select(file),
            Err(e) => {
                log::warn!("{}", e);
                self.warning = Some(e);
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn open_file_picker(&mut self, ctx: &egui::Context) {
        let file_queue = Arc::clone(&self.file_queue);
        let ctx = ctx.clone();
        spawn_local(async move {
            let picked = match picker::pick_image().await {
                Ok(Some(file)) => Ok(file),
                Ok(None) => return,
                Err(e) => {
                    log::error!("File picker error: {}", e);
                    Err(e)
                }
            };
            lock_queue(&file_queue).push(picked);
            ctx.request_repaint();
        });
    }

    /// Drain async results into the session (called each frame)
    fn poll_results(&mut self) {
        let outcomes: Vec<ExtractionOutcome> =
            lock_queue(&self.completed_queue).drain(..).collect();
        for outcome in outcomes {
            self.session.finish_extraction(outcome);
        }

        let picked: Vec<Result<SelectedFile, String>> =
            lock_queue(&self.file_queue).drain(..).collect();
        for result in picked {
            match result {
                Ok(file) => self.select(file),
                Err(e) => self.warning = Some(e),
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        // Single-file selection: the last image dropped wins
        for file in dropped {
            if let Some(bytes) = &file.bytes {
                match preview::image_file(&file.name, &file.mime, bytes.to_vec()) {
                    Some(selected) => self.select(selected),
                    None => log::warn!("Ignoring dropped non-image file: {}", file.name),
                }
                continue;
            }

            #[cfg(not(target_arch = "wasm32"))]
            if let Some(path) = &file.path {
                match preview::load_image_file(path) {
                    Ok(selected) => self.select(selected),
                    Err(e) => log::warn!("Ignoring dropped file: {}", e),
                }
            }
        }
    }

    /// Rebuild the preview texture when the selection changes
    fn update_preview(&mut self, ctx: &egui::Context) {
        if self.session.selection_revision == self.preview_loaded_for {
            return;
        }
        self.preview_texture = self
            .session
            .selected()
            .and_then(|file| preview::decode_image_to_texture(ctx, &file.name, &file.bytes));
        self.preview_loaded_for = self.session.selection_revision;
    }

    fn download_result(&mut self) {
        let artifact = TextArtifact::from_text(self.session.result_text());
        self.download_notice = Some(match download::save(&artifact) {
            Ok(Some(location)) => format!("Saved to {}", location),
            Ok(None) => "Download cancelled".to_string(),
            Err(e) => {
                log::error!("Download failed: {}", e);
                format!("Download failed: {}", e)
            }
        });
    }

    fn show_warning(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.warning else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("⚠ Warning")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message.as_str());
                ui.add_space(6.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.warning = None;
        }
    }
}

impl eframe::App for ExtractorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();

        let processing = self.session.status() == SessionStatus::Processing;
        if processing {
            ctx.request_repaint();
        }

        self.handle_dropped_files(ctx);
        self.update_preview(ctx);

        // Top panel: title + controls + status
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("📄 Image Text Extractor");
            ui.add_space(2.0);

            ui.horizontal(|ui| {
                if ui.button("📤 Choose image").clicked() {
                    self.open_file_picker(ctx);
                }

                // Disabled while a request is in flight; the session also rejects it
                if ui
                    .add_enabled(!processing, egui::Button::new("🔍 Extract Text"))
                    .clicked()
                {
                    self.start_extraction(ctx);
                }

                if let Some(file) = self.session.selected() {
                    ui.label(format!("| {}", file.name));
                }
            });

            ui.horizontal(|ui| {
                if processing {
                    ui.spinner();
                }
                match self.session.status() {
                    SessionStatus::Failed => {
                        ui.colored_label(
                            egui::Color32::from_rgb(255, 100, 100),
                            &self.session.status_message,
                        );
                    }
                    SessionStatus::Done => {
                        ui.colored_label(
                            egui::Color32::from_rgb(34, 197, 94),
                            &self.session.status_message,
                        );
                    }
                    _ => {
                        ui.label(&self.session.status_message);
                    }
                }
            });
            ui.add_space(2.0);
        });

        let mut download_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.session.output_visible {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Supports PNG, JPG, JPEG and WEBP images")
                            .size(18.0)
                            .color(egui::Color32::GRAY),
                    );
                });
                return;
            }

            ui.columns(2, |cols| {
                // Left: image preview
                cols[0].strong("Preview");
                cols[0].separator();
                egui::ScrollArea::vertical()
                    .id_salt("preview_scroll")
                    .show(&mut cols[0], |ui| {
                        if let Some(texture) = &self.preview_texture {
                            let available_width = ui.available_width();
                            let [tw, th] = texture.size();
                            let scale = available_width / tw as f32;
                            ui.image(egui::load::SizedTexture::new(
                                texture.id(),
                                egui::vec2(available_width, th as f32 * scale),
                            ));
                        } else {
                            ui.colored_label(egui::Color32::GRAY, "Preview unavailable");
                        }
                    });

                // Right: extracted text
                let ui = &mut cols[1];
                ui.strong("📝 Extracted Text");
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_salt("text_scroll")
                    .max_height(320.0)
                    .show(ui, |ui| {
                        let mut view = self.session.display_text.as_str();
                        ui.add(
                            egui::TextEdit::multiline(&mut view)
                                .font(egui::TextStyle::Monospace)
                                .desired_rows(12)
                                .desired_width(f32::INFINITY),
                        );
                    });

                if self.session.status() == SessionStatus::Done {
                    let stats = self.session.stats();
                    ui.add_space(4.0);
                    ui.label(format!(
                        "Words: {} | Characters: {} | Lines: {}",
                        stats.words, stats.chars, stats.lines
                    ));
                }

                if self.session.download_visible {
                    ui.add_space(6.0);
                    if ui.button("📥 Download as Text File").clicked() {
                        download_clicked = true;
                    }
                }
                if let Some(notice) = &self.download_notice {
                    ui.small(notice.as_str());
                }
            });
        });

        if download_clicked {
            self.download_result();
        }

        self.show_warning(ctx);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    async fn crashing_request() -> ExtractionOutcome {
        panic!("request task blew up");
    }

    fn png() -> SelectedFile {
        SelectedFile {
            name: "img.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn queue_survives_a_poisoned_lock() {
        let queue: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(vec![1]));
        let holder = Arc::clone(&queue);
        let crashed = std::thread::spawn(move || {
            let _guard = holder.lock().unwrap();
            panic!("holder crashed");
        })
        .join();
        assert!(crashed.is_err());
        assert!(queue.is_poisoned());

        lock_queue(&queue).push(2);
        let drained: Vec<u32> = lock_queue(&queue).drain(..).collect();
        assert_eq!(drained, vec![1, 2]);
    }

    #[tokio::test]
    async fn crashed_request_still_ends_processing() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png()));
        session.begin_extraction().unwrap();

        let outcome = settle(tokio::spawn(crashing_request())).await;
        assert!(matches!(outcome, Err(ExtractError::Transport(_))));

        session.finish_extraction(outcome);
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(session.status_message.starts_with("Error: extraction task failed"));
        assert!(session.begin_extraction().is_ok());
    }
}
