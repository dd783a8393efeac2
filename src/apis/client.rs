/// Base HTTP client shared by the quote sources and the token list
use crate::errors::SwapError;
use reqwest::{Client, Response};
use std::time::Duration;

/// HTTP client wrapper with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, SwapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SwapError::network_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Turn a non-2xx response into `(status, body)` for the caller's error type
pub async fn check_status(response: Response) -> Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown".to_string());
    Err((status.as_u16(), body))
}
