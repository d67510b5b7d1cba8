/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! HTTP client for the remote OCR service.
//! One multipart POST per extraction; the reply is a JSON object with a `text` field.

use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::model::{OcrResponse, SelectedFile};

/// `Display` is the bare failure description; the status line prefixes it.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0}")]
    Transport(String),

    #[error("HTTP {code}: {detail}")]
    Status { code: u16, detail: String },

    #[error("invalid response: {0}")]
    InvalidBody(String),
}

#[derive(Clone)]
pub struct OcrClient {
    http: reqwest::Client,
    endpoint: String,
    field_name: String,
}

impl OcrClient {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            field_name: config.field_name.clone(),
        }
    }

    /// Upload `file` and interpret the reply
    pub async fn extract(&self, file: SelectedFile) -> Result<OcrResponse, ExtractError> {
        log::debug!(
            "POST {} ({} bytes as field '{}')",
            self.endpoint,
            file.bytes.len(),
            self.field_name
        );

        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime_type)
            .map_err(|e| ExtractError::Transport(describe(&e)))?;
        let form = Form::new().part(self.field_name.clone(), part);

        let resp = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractError::Transport(describe(&e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ExtractError::Transport(describe(&e)))?;

        // A completed exchange is judged by its body, whatever the status code
        match parse_response(&body) {
            Ok(parsed) => {
                if !status.is_success() {
                    log::warn!("Service answered {} with a JSON body", status);
                }
                Ok(parsed)
            }
            Err(_) if !status.is_success() => {
                let detail = if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body.trim().to_string()
                };
                Err(ExtractError::Status {
                    code: status.as_u16(),
                    detail,
                })
            }
            Err(e) => Err(e),
        }
    }
}

/// Interpret a response body. Non-JSON is an error; any JSON without a string
/// `text` field means "no text".
pub fn parse_response(body: &str) -> Result<OcrResponse, ExtractError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ExtractError::InvalidBody(e.to_string()))?;
    Ok(OcrResponse {
        text: json["text"].as_str().map(str::to_string),
    })
}

/// Flatten an error and its sources into one line
fn describe(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        let msg = e.to_string();
        if !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        source = e.source();
    }
    out
}
