//! Translation of hosted backend responses into [`BackendError`].
//!
//! The REST API reports failures as `{code, message, details, hint}` with a
//! Postgres SQLSTATE or a `PGRST*` code; the authentication API uses
//! `{error, error_description}` or `{code, msg, error_code}`. Both shapes are
//! decoded leniently and classified here, once.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::ports::BackendError;

const PREVIEW_CHAR_LIMIT: usize = 160;

#[derive(Debug, Default, Deserialize)]
struct VendorErrorDto {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

impl VendorErrorDto {
    fn vendor_code(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(Value::as_str)
            .or(self.error_code.as_deref())
    }

    fn description(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::timeout(error.to_string())
    } else if error.is_decode() {
        BackendError::decode(error.to_string())
    } else {
        BackendError::transport(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> BackendError {
    let vendor: VendorErrorDto = serde_json::from_slice(body).unwrap_or_default();
    let message = match vendor.description() {
        Some(description) => format!("status {}: {description}", status.as_u16()),
        None => {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                format!("status {}: {preview}", status.as_u16())
            }
        }
    };

    if let Some(mapped) = vendor
        .vendor_code()
        .and_then(|code| map_vendor_code(code, &message))
    {
        return mapped;
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::unauthorized(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => BackendError::timeout(message),
        _ if status.is_client_error() => BackendError::rejected(message),
        _ => BackendError::transport(message),
    }
}

fn map_vendor_code(code: &str, message: &str) -> Option<BackendError> {
    let mapped = match code {
        "PGRST116" => BackendError::not_found(),
        "23505" => BackendError::unique_violation(message),
        "23503" => BackendError::foreign_key_violation(message),
        "42P01" | "PGRST205" => BackendError::missing_table(message),
        "PGRST301" | "PGRST302" => BackendError::unauthorized(message),
        _ => return None,
    };
    Some(mapped)
}

/// Decode a JSON response body.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, BackendError> {
    serde_json::from_slice(body).map_err(|error| {
        BackendError::decode(format!(
            "invalid hosted backend JSON ({error}): {}",
            body_preview(body)
        ))
    })
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
