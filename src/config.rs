/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! OCR service location.
//! Native builds read `OCR_ENDPOINT` / `OCR_FIELD_NAME` at startup,
//! web builds bake them in at compile time.

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/extract";
pub const DEFAULT_FIELD_NAME: &str = "image";

#[derive(Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    pub endpoint: String,
    /// Multipart field carrying the image
    pub field_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            field_name: DEFAULT_FIELD_NAME.into(),
        }
    }
}

impl ServiceConfig {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("OCR_ENDPOINT").ok().as_deref(),
            std::env::var("OCR_FIELD_NAME").ok().as_deref(),
        )
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        Self::from_values(option_env!("OCR_ENDPOINT"), option_env!("OCR_FIELD_NAME"))
    }

    fn from_values(endpoint: Option<&str>, field_name: Option<&str>) -> Self {
        let pick = |value: Option<&str>, default: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        Self {
            endpoint: pick(endpoint, DEFAULT_ENDPOINT),
            field_name: pick(field_name, DEFAULT_FIELD_NAME),
        }
    }
}
