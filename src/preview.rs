/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Image type checks and preview texture decoding

use crate::model::SelectedFile;

/// Longest side of the preview texture
const PREVIEW_MAX_SIDE: u32 = 1024;

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
];

/// Extensions offered by the native file dialog
#[cfg(not(target_arch = "wasm32"))]
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// `accept` attribute for the browser file picker
#[cfg(target_arch = "wasm32")]
pub const ACCEPT_ATTR: &str = ".png,.jpg,.jpeg,.webp,image/png,image/jpeg,image/webp";

fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_lowercase())
}

pub fn is_image_file(name: &str) -> bool {
    mime_for_name(name).is_some()
}

pub fn mime_for_name(name: &str) -> Option<&'static str> {
    let ext = extension(name)?;
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Build a `SelectedFile`, preferring the MIME type the source reported.
/// Returns `None` for names that are not a supported image type.
pub fn image_file(name: &str, reported_mime: &str, bytes: Vec<u8>) -> Option<SelectedFile> {
    let guessed = mime_for_name(name)?;
    let mime_type = if reported_mime.starts_with("image/") {
        reported_mime.to_string()
    } else {
        guessed.to_string()
    };
    Some(SelectedFile {
        name: name.to_string(),
        mime_type,
        bytes,
    })
}

/// Read an image from disk for the native command line / drag-and-drop path
#[cfg(not(target_arch = "wasm32"))]
pub fn load_image_file(path: &std::path::Path) -> Result<SelectedFile, String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Not a file: {}", path.display()))?;
    if !is_image_file(&name) {
        return Err(format!("Unsupported image type: {}", name));
    }
    let bytes =
        std::fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    image_file(&name, "", bytes).ok_or_else(|| format!("Unsupported image type: {}", name))
}

pub fn decode_image_to_texture(
    ctx: &egui::Context,
    name: &str,
    bytes: &[u8],
) -> Option<egui::TextureHandle> {
    if bytes.is_empty() {
        return None;
    }
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("Cannot decode preview for {}: {}", name, e);
            return None;
        }
    };
    let img = if img.width() > PREVIEW_MAX_SIDE || img.height() > PREVIEW_MAX_SIDE {
        img.resize(
            PREVIEW_MAX_SIDE,
            PREVIEW_MAX_SIDE,
            image::imageops::FilterType::Triangle,
        )
    } else {
        img
    };
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR))
}
