/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Browser file picker via a detached `<input type="file">`

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;

use crate::model::SelectedFile;
use crate::preview;

/// Open the picker and read the chosen image. `Ok(None)` when the user cancels.
pub async fn pick_image() -> Result<Option<SelectedFile>, String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("No document available")?;

    let input: web_sys::HtmlInputElement = document
        .create_element("input")
        .map_err(|e| format!("Failed to create input element: {:?}", e))?
        .dyn_into()
        .map_err(|_| "Created element is not an input".to_string())?;
    input.set_type("file");
    input.set_accept(preview::ACCEPT_ATTR);

    // Settles on "change" or "cancel", whichever the browser fires
    let settled = js_sys::Promise::new(&mut |resolve, _reject| {
        let on_settle = Closure::once_into_js(move || {
            resolve.call0(&JsValue::NULL).ok();
        });
        let target: &web_sys::EventTarget = input.as_ref();
        for event in ["change", "cancel"] {
            target
                .add_event_listener_with_callback(event, on_settle.unchecked_ref())
                .ok();
        }
    });

    input.click();
    JsFuture::from(settled)
        .await
        .map_err(|e| format!("File picker error: {:?}", e))?;

    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        log::debug!("File picker closed without a selection");
        return Ok(None);
    };

    let name = file.name();
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Failed to read {}: {:?}", name, e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    preview::image_file(&name, &file.type_(), bytes)
        .map(Some)
        .ok_or_else(|| format!("Unsupported image type: {}", name))
}
