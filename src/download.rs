/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Save the extracted text as `extracted_text.txt`.
//! Native: save dialog opened in the download directory. Web: browser download.

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

pub const RESULT_FILE_NAME: &str = "extracted_text.txt";
pub const RESULT_MIME_TYPE: &str = "text/plain";

#[derive(Clone, Debug, PartialEq)]
pub struct TextArtifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl TextArtifact {
    /// Exact UTF-8 bytes of `text`, no BOM or newline normalization
    pub fn from_text(text: &str) -> Self {
        Self {
            file_name: RESULT_FILE_NAME,
            mime_type: RESULT_MIME_TYPE,
            bytes: text.as_bytes().to_vec(),
        }
    }
}

/// Save the artifact, returning where it went (for the status line).
/// `Ok(None)` when the user dismissed the save dialog.
#[cfg(not(target_arch = "wasm32"))]
pub fn save(artifact: &TextArtifact) -> Result<Option<String>, String> {
    let mut dialog = rfd::FileDialog::new()
        .set_file_name(artifact.file_name)
        .add_filter("Text", &["txt"]);
    if let Some(dir) = dirs::download_dir().or_else(|| std::env::current_dir().ok()) {
        dialog = dialog.set_directory(dir);
    }
    let Some(path) = dialog.save_file() else {
        log::info!("Save dialog dismissed");
        return Ok(None);
    };
    save_to_path(&path, artifact)?;
    Ok(Some(path.display().to_string()))
}

#[cfg(target_arch = "wasm32")]
pub fn save(artifact: &TextArtifact) -> Result<Option<String>, String> {
    browser::trigger_download(artifact)?;
    Ok(Some(artifact.file_name.to_string()))
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::JsValue;
    use wasm_bindgen::closure::Closure;

    use super::TextArtifact;

    /// Blob URLs stay alive this long after the click
    const REVOKE_DELAY_MS: i32 = 5000;

    fn js_err(context: &'static str) -> impl Fn(JsValue) -> String {
        move |e| format!("{}: {:?}", context, e)
    }

    /// Blob URL + hidden anchor click
    pub fn trigger_download(artifact: &TextArtifact) -> Result<(), String> {
        let window = web_sys::window().ok_or("No window object available")?;
        let document = window.document().ok_or("No document available")?;
        let body = document.body().ok_or("No body element available")?;

        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(artifact.bytes.as_slice()));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(artifact.mime_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(js_err("Failed to create Blob"))?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(js_err("Failed to create object URL"))?;

        let anchor: web_sys::HtmlAnchorElement = document
            .create_element("a")
            .map_err(js_err("Failed to create anchor element"))?
            .dyn_into()
            .map_err(|_| "Created element is not an anchor".to_string())?;
        anchor.set_href(&url);
        anchor.set_download(artifact.file_name);
        anchor.style().set_property("display", "none").ok();

        body.append_child(&anchor).ok();
        anchor.click();
        body.remove_child(&anchor).ok();

        let revoke = Closure::once(move || {
            web_sys::Url::revoke_object_url(&url).ok();
        });
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                revoke.as_ref().unchecked_ref(),
                REVOKE_DELAY_MS,
            )
            .ok();
        revoke.forget();

        log::info!(
            "Browser download of {} ({} bytes)",
            artifact.file_name,
            artifact.bytes.len()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_to_path(path: &Path, artifact: &TextArtifact) -> Result<(), String> {
    std::fs::write(path, &artifact.bytes)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    log::info!("Saved {} bytes to {}", artifact.bytes.len(), path.display());
    Ok(())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn artifact_carries_name_and_type() {
        let artifact = TextArtifact::from_text("Hello World");
        assert_eq!(artifact.file_name, "extracted_text.txt");
        assert_eq!(artifact.mime_type, "text/plain");
        assert_eq!(artifact.bytes, b"Hello World");
    }

    #[test]
    fn saved_file_matches_text_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RESULT_FILE_NAME);
        let text = "첫 줄\r\nsecond line\n  trailing  ";

        save_to_path(&path, &TextArtifact::from_text(text)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn empty_result_saves_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RESULT_FILE_NAME);

        save_to_path(&path, &TextArtifact::from_text("")).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn only_the_chosen_path_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join(RESULT_FILE_NAME);
        std::fs::write(&existing, "earlier download").unwrap();

        let chosen = dir.path().join("receipt_text.txt");
        save_to_path(&chosen, &TextArtifact::from_text("new text")).unwrap();

        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "earlier download");
        assert_eq!(std::fs::read_to_string(&chosen).unwrap(), "new text");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").join(RESULT_FILE_NAME);
        let err = save_to_path(&missing, &TextArtifact::from_text("x")).unwrap_err();
        assert!(err.contains("Failed to write"));
    }
}
