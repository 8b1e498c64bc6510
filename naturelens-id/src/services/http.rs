//! Shared HTTP plumbing for provider clients

use std::time::Duration;

use crate::types::ProviderError;

pub const USER_AGENT: &str = "NatureLens/0.1.0 (https://github.com/naturelens/naturelens)";

/// Longest upstream error body kept for diagnostics
const MAX_ERROR_BODY: usize = 512;

/// Build a client with the per-provider timeout applied to every request
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

/// Turn a non-2xx response into `ProviderError::Status`
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(ProviderError::Status(status.as_u16(), body))
}
