/// Base HTTP client shared by outbound integrations
use reqwest::Client;
use std::time::Duration;

use crate::errors::ExternalApiError;

/// HTTP client wrapper with a fixed request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, ExternalApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("salesboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExternalApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Map a transport failure into the external API taxonomy
    pub fn classify(&self, error: reqwest::Error) -> ExternalApiError {
        if error.is_timeout() {
            ExternalApiError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ExternalApiError::Network(format!("Request failed: {}", error))
        }
    }
}
