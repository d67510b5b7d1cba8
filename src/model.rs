/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Extraction session state: the selected image, the last result and the
//! UI-visible fields derived from them.

use crate::client::ExtractError;

pub const NO_FILE_WARNING: &str = "Please select an image.";
pub const BUSY_WARNING: &str = "An extraction is already in progress.";
pub const NO_TEXT_MESSAGE: &str = "❌ No text detected or image very unclear.";

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Processing,
    Done,
    Failed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "Idle"),
            SessionStatus::Processing => write!(f, "Processing"),
            SessionStatus::Done => write!(f, "Done"),
            SessionStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Why `begin_extraction` refused to start. `Display` is the user-facing warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartRejected {
    NoFileSelected,
    AlreadyProcessing,
}

impl std::fmt::Display for StartRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartRejected::NoFileSelected => write!(f, "{}", NO_FILE_WARNING),
            StartRejected::AlreadyProcessing => write!(f, "{}", BUSY_WARNING),
        }
    }
}

/// Interpreted body of a successful service response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OcrResponse {
    pub text: Option<String>,
}

pub struct ExtractionSession {
    selected: Option<SelectedFile>,
    status: SessionStatus,
    result_text: String,
    pub status_message: String,
    pub display_text: String,
    pub output_visible: bool,
    pub download_visible: bool,
    /// Bumped on every selection so the preview can be rebuilt
    pub selection_revision: u64,
}

impl ExtractionSession {
    pub fn new() -> Self {
        Self {
            selected: None,
            status: SessionStatus::Idle,
            result_text: String::new(),
            status_message: String::new(),
            display_text: String::new(),
            output_visible: false,
            download_visible: false,
            selection_revision: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    /// Record a new selection. `None` leaves the session untouched.
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        let Some(file) = file else {
            return;
        };
        log::info!(
            "Selected {} ({}, {} bytes)",
            file.name,
            file.mime_type,
            file.bytes.len()
        );
        self.selected = Some(file);
        self.selection_revision += 1;
        self.output_visible = true;
    }

    /// Validate and move into `Processing`. The returned file is the payload
    /// the caller must upload; on `Err` nothing has changed.
    pub fn begin_extraction(&mut self) -> Result<SelectedFile, StartRejected> {
        let Some(file) = &self.selected else {
            return Err(StartRejected::NoFileSelected);
        };
        if self.status == SessionStatus::Processing {
            return Err(StartRejected::AlreadyProcessing);
        }
        let file = file.clone();

        self.status = SessionStatus::Processing;
        self.status_message = "Processing...".into();
        self.result_text.clear();
        self.download_visible = false;
        log::info!("Extraction started for {}", file.name);
        Ok(file)
    }

    /// Apply the outcome of the request issued by `begin_extraction`.
    pub fn finish_extraction(&mut self, outcome: Result<OcrResponse, ExtractError>) {
        if self.status != SessionStatus::Processing {
            log::warn!("Ignoring extraction result while {}", self.status);
            return;
        }

        match outcome {
            Ok(OcrResponse { text: Some(text) }) if !text.trim().is_empty() => {
                log::info!("Extraction done ({} chars)", text.chars().count());
                self.display_text = text.clone();
                self.result_text = text;
                self.status = SessionStatus::Done;
                self.status_message = "Done".into();
                self.download_visible = true;
            }
            Ok(_) => {
                log::warn!("Service returned no usable text");
                self.display_text = NO_TEXT_MESSAGE.into();
                self.status = SessionStatus::Failed;
                self.status_message = "Failed".into();
                self.download_visible = false;
            }
            Err(e) => {
                log::error!("Extraction request failed: {}", e);
                self.status = SessionStatus::Failed;
                self.status_message = format!("Error: {}", e);
            }
        }
    }

    pub fn stats(&self) -> TextStats {
        TextStats::of(&self.result_text)
    }
}

impl Default for ExtractionSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub chars: usize,
    pub lines: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
            lines: text.split('\n').count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> SelectedFile {
        SelectedFile {
            name: name.into(),
            mime_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn with_text(text: &str) -> Result<OcrResponse, ExtractError> {
        Ok(OcrResponse {
            text: Some(text.into()),
        })
    }

    #[test]
    fn start_without_file_is_rejected_and_changes_nothing() {
        let mut session = ExtractionSession::new();
        let err = session.begin_extraction().unwrap_err();
        assert_eq!(err, StartRejected::NoFileSelected);
        assert_eq!(err.to_string(), "Please select an image.");
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.status_message.is_empty());
        assert!(!session.output_visible);
    }

    #[test]
    fn select_none_is_noop() {
        let mut session = ExtractionSession::new();
        session.select_file(None);
        assert!(session.selected().is_none());
        assert_eq!(session.selection_revision, 0);
        assert!(!session.output_visible);
    }

    #[test]
    fn selecting_shows_output_but_keeps_status() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png("cat.png")));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.output_visible);
        assert_eq!(session.selection_revision, 1);

        session.select_file(Some(png("dog.png")));
        assert_eq!(session.selected().map(|f| f.name.as_str()), Some("dog.png"));
        assert_eq!(session.selection_revision, 2);
    }

    #[test]
    fn successful_text_marks_done() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png("cat.png")));

        let payload = session.begin_extraction().unwrap();
        assert_eq!(payload.name, "cat.png");
        assert_eq!(session.status(), SessionStatus::Processing);
        assert_eq!(session.status_message, "Processing...");

        session.finish_extraction(with_text("Hello World"));
        assert_eq!(session.status(), SessionStatus::Done);
        assert_eq!(session.status_message, "Done");
        assert_eq!(session.display_text, "Hello World");
        assert_eq!(session.result_text(), "Hello World");
        assert!(session.download_visible);
    }

    #[test]
    fn result_keeps_untrimmed_text() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png("scan.png")));
        session.begin_extraction().unwrap();
        session.finish_extraction(with_text("  line one\nline two \n"));
        assert_eq!(session.result_text(), "  line one\nline two \n");
        assert_eq!(session.status(), SessionStatus::Done);
    }

    #[test]
    fn whitespace_text_fails() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png("blurry.png")));
        session.begin_extraction().unwrap();
        session.finish_extraction(with_text("   "));

        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.status_message, "Failed");
        assert_eq!(session.display_text, NO_TEXT_MESSAGE);
        assert!(session.result_text().is_empty());
        assert!(!session.download_visible);
    }

    #[test]
    fn missing_text_field_fails() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png("blank.png")));
        session.begin_extraction().unwrap();
        session.finish_extraction(Ok(OcrResponse::default()));
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(!session.download_visible);
    }

    #[test]
    fn transport_error_reports_description() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png("img.png")));
        session.begin_extraction().unwrap();
        session.finish_extraction(Err(ExtractError::Transport("Failed to fetch".into())));

        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.status_message, "Error: Failed to fetch");
    }

    #[test]
    fn retry_after_success_hides_stale_download() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png("cat.png")));
        session.begin_extraction().unwrap();
        session.finish_extraction(with_text("first"));
        assert!(session.download_visible);

        session.begin_extraction().unwrap();
        assert!(!session.download_visible);
        assert!(session.result_text().is_empty());

        session.finish_extraction(Err(ExtractError::Transport("connection refused".into())));
        assert!(!session.download_visible);
        assert!(session.result_text().is_empty());
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[test]
    fn second_start_while_processing_is_rejected() {
        let mut session = ExtractionSession::new();
        session.select_file(Some(png("cat.png")));
        session.begin_extraction().unwrap();
        assert_eq!(
            session.begin_extraction().unwrap_err(),
            StartRejected::AlreadyProcessing
        );
        assert_eq!(session.status(), SessionStatus::Processing);
    }

    #[test]
    fn late_result_is_ignored() {
        let mut session = ExtractionSession::new();
        session.finish_extraction(with_text("stray"));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.result_text().is_empty());
    }

    #[test]
    fn result_non_empty_only_when_done() {
        let outcomes = vec![
            with_text("ok"),
            with_text(""),
            Ok(OcrResponse::default()),
            Err(ExtractError::Transport("timeout".into())),
        ];
        for outcome in outcomes {
            let mut session = ExtractionSession::new();
            session.select_file(Some(png("x.png")));
            session.begin_extraction().unwrap();
            session.finish_extraction(outcome);
            assert_eq!(
                !session.result_text().is_empty(),
                session.status() == SessionStatus::Done
            );
        }
    }

    #[test]
    fn stats_count_words_chars_lines() {
        let stats = TextStats::of("Hello World\nsecond  line é");
        assert_eq!(stats.words, 5);
        assert_eq!(stats.chars, 26);
        assert_eq!(stats.lines, 2);
        assert_eq!(
            TextStats::of(""),
            TextStats {
                words: 0,
                chars: 0,
                lines: 1
            }
        );
    }
}
