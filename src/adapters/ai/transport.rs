//! HTTP plumbing shared by the provider adapters.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::ports::AIError;

/// Builds an HTTP client with the request timeout applied.
pub(super) fn http_client(timeout: Duration) -> Result<Client, AIError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AIError::InvalidRequest(format!("failed to create HTTP client: {}", e)))
}

/// Maps a send failure to an `AIError`.
pub(super) fn send_error(err: reqwest::Error, timeout: Duration) -> AIError {
    if err.is_timeout() {
        AIError::Timeout {
            timeout_secs: timeout.as_secs() as u32,
        }
    } else if err.is_connect() {
        AIError::network(format!("Connection failed: {}", err))
    } else {
        AIError::network(err.to_string())
    }
}

/// Passes successful responses through and maps error statuses.
pub(super) async fn check_status(response: Response) -> Result<Response, AIError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &error_body))
}

pub(super) fn status_error(status: u16, error_body: &str) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(error_body)),
        400 => AIError::InvalidRequest(error_body.to_string()),
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => AIError::unavailable(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Extracts "try again in Xs" from an error body, defaulting to 30 seconds.
pub(super) fn parse_retry_after(error_body: &str) -> u32 {
    let message = serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    message
        .as_deref()
        .and_then(|s| s.find("try again in ").map(|idx| &s[idx + 13..]))
        .and_then(|rest| {
            let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            rest[..end].parse::<u32>().ok()
        })
        .unwrap_or(30)
}
