//! Shared HTTP client construction
//!
//! Transient failures (connection errors, 5xx, 429) are retried with
//! exponential backoff inside the client, so callers issue a single request.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::TripSageError;

const USER_AGENT: &str = concat!("TripSage/", env!("CARGO_PKG_VERSION"));

/// Build a retrying client with the given request timeout
pub fn build_client(timeout_seconds: u32, max_retries: u32) -> crate::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TripSageError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Read a response body, turning non-success statuses into an error message
/// that includes the status and the start of the body.
pub async fn read_body(response: reqwest::Response) -> Result<String, String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("Failed to read response body: {e}"))?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(format!(
            "HTTP {} {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error"),
            preview(&body)
        ))
    }
}

/// First 300 characters of a body for error messages
#[must_use]
pub fn preview(body: &str) -> String {
    const LIMIT: usize = 300;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}
