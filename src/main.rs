/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod client;
mod config;
mod download;
mod model;
mod preview;

#[cfg(target_arch = "wasm32")]
mod picker;

use app::ExtractorApp;
use config::ServiceConfig;

// Desktop entry point: `image-text-extractor [IMAGE]`
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = ServiceConfig::from_env();

    // OCR requests are spawned onto this runtime from the UI thread
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    let _guard = runtime.enter();

    let initial = std::env::args_os().nth(1).and_then(|arg| {
        match preview::load_image_file(std::path::Path::new(&arg)) {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Image Text Extractor",
        native_options,
        Box::new(move |cc| Ok(Box::new(ExtractorApp::new(cc, config, initial)))),
    )
}

// WASM entry point
#[cfg(target_arch = "wasm32")]
fn main() {
    use wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("the_canvas_id")
            .expect("Failed to find the_canvas_id")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("the_canvas_id is not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(ExtractorApp::new(cc, ServiceConfig::from_env(), None)))),
            )
            .await;

        if let Some(loading_text) = document.get_element_by_id("loading_text")
            && let Some(parent) = loading_text.parent_node()
        {
            parent.remove_child(&loading_text).ok();
        }

        if let Err(e) = start_result {
            log::error!("Failed to start eframe: {:?}", e);
            panic!("Failed to start eframe: {:?}", e);
        }
    });
}
