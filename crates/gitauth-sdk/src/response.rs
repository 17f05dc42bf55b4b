//! Translation of platform HTTP responses into typed values and errors.
//!
//! Every operation funnels its response through here so that failures have the same shape
//! regardless of which endpoint produced them.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{GitAuthError, Result};

/// Error envelope returned by the platform API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    validations: Option<Vec<ValidationError>>,
}

#[derive(Debug, Deserialize)]
struct ValidationError {
    field: String,
    detail: String,
}

/// Decode a JSON body when the response carries `expected`, otherwise fail with a provider error.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    if status != expected {
        return Err(translate_error(status, &body));
    }
    decode_body(&body)
}

/// Accept an empty-bodied success such as 204 No Content.
pub(crate) async fn expect_status(response: Response, expected: StatusCode) -> Result<()> {
    let status = response.status();
    if status == expected {
        return Ok(());
    }
    let body = response.bytes().await?;
    Err(translate_error(status, &body))
}

/// Build a provider error from a non-success status and its body.
pub fn translate_error(status: StatusCode, body: &[u8]) -> GitAuthError {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(payload) if !payload.message.trim().is_empty() => {
            let detail = join_detail(payload.detail, payload.validations);
            log::debug!("request failed with {}: {}", status, payload.message);
            GitAuthError::provider(status, payload.message, detail)
        }
        Ok(_) | Err(_) => {
            log::debug!(
                "request failed with {} and an unreadable error body ({} bytes)",
                status,
                body.len()
            );
            GitAuthError::provider(status, generic_message(status), None)
        }
    }
}

/// Decode a success body, mapping parser failures to [`GitAuthError::Decode`].
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        log::debug!("failed to decode response body: {}", e);
        GitAuthError::Decode(e.to_string())
    })
}

fn join_detail(detail: Option<String>, validations: Option<Vec<ValidationError>>) -> Option<String> {
    let mut parts: Vec<String> = detail.into_iter().filter(|d| !d.is_empty()).collect();
    parts.extend(
        validations
            .unwrap_or_default()
            .into_iter()
            .map(|v| format!("{}: {}", v.field, v.detail)),
    );
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn generic_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("request failed with status {} {}", status.as_u16(), reason),
        None => format!("request failed with status {}", status.as_u16()),
    }
}
