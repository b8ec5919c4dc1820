/// Prompt forwarding to the configured external service
///
/// Request: `POST <external_api.url>` with `{"prompt": ..., "metadata": {...}}`.
/// The response body is returned as-is: parsed JSON when it is JSON, a JSON
/// string otherwise.
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};

use super::client::HttpClient;
use crate::config::ExternalApiConfig;
use crate::errors::ExternalApiError;
use crate::logger::{self, LogTag};

/// Longest error body kept in `ExternalApiError::HttpStatus`
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptRequest {
    pub prompt: String,
    pub metadata: serde_json::Value,
}

#[async_trait]
pub trait PromptForwarder: Send + Sync {
    async fn forward(&self, request: &PromptRequest) -> Result<serde_json::Value, ExternalApiError>;
}

pub struct HttpPromptForwarder {
    http: HttpClient,
    url: String,
}

impl HttpPromptForwarder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ExternalApiError> {
        Ok(Self {
            http: HttpClient::new(timeout)?,
            url: url.into().trim().to_string(),
        })
    }

    pub fn from_config(config: &ExternalApiConfig) -> Result<Self, ExternalApiError> {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

#[async_trait]
impl PromptForwarder for HttpPromptForwarder {
    async fn forward(&self, request: &PromptRequest) -> Result<serde_json::Value, ExternalApiError> {
        if !self.is_configured() {
            return Err(ExternalApiError::NotConfigured);
        }

        logger::debug(
            LogTag::Api,
            &format!(
                "Forwarding prompt ({} chars) to {}",
                request.prompt.chars().count(),
                self.url
            ),
        );

        let start = Instant::now();
        let response = self
            .http
            .client()
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.http.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ExternalApiError::InvalidResponse(format!("Failed to read response body: {}", e))
        })?;

        logger::debug(
            LogTag::Api,
            &format!(
                "External API answered HTTP {} in {}ms",
                status.as_u16(),
                start.elapsed().as_millis()
            ),
        );

        if !status.is_success() {
            return Err(ExternalApiError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/generate", addr)
    }

    fn request() -> PromptRequest {
        PromptRequest {
            prompt: "Summarize sales".to_string(),
            metadata: json!({"source": "dashboard"}),
        }
    }

    #[tokio::test]
    async fn test_forward_posts_prompt_and_metadata() {
        let url = spawn_upstream(Router::new().route(
            "/generate",
            post(|Json(body): Json<Value>| async move { Json(json!({"echo": body})) }),
        ))
        .await;

        let forwarder = HttpPromptForwarder::new(url, Duration::from_secs(5)).unwrap();
        let data = forwarder.forward(&request()).await.unwrap();
        assert_eq!(data["echo"]["prompt"], "Summarize sales");
        assert_eq!(data["echo"]["metadata"]["source"], "dashboard");
    }

    #[tokio::test]
    async fn test_non_json_body_is_returned_as_string() {
        let url = spawn_upstream(Router::new().route("/generate", post(|| async { "plain answer" }))).await;
        let forwarder = HttpPromptForwarder::new(url, Duration::from_secs(5)).unwrap();
        assert_eq!(forwarder.forward(&request()).await.unwrap(), json!("plain answer"));
    }

    #[tokio::test]
    async fn test_error_status_and_timeout() {
        let url = spawn_upstream(
            Router::new()
                .route(
                    "/generate",
                    post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
                )
                .route(
                    "/slow",
                    post(|| async {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        "late"
                    }),
                ),
        )
        .await;

        let forwarder = HttpPromptForwarder::new(url.clone(), Duration::from_secs(5)).unwrap();
        match forwarder.forward(&request()).await {
            Err(ExternalApiError::HttpStatus { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let slow = HttpPromptForwarder::new(url.replace("/generate", "/slow"), Duration::from_millis(200)).unwrap();
        assert!(matches!(
            slow.forward(&request()).await,
            Err(ExternalApiError::Timeout { timeout_ms: 200 })
        ));
    }

    #[tokio::test]
    async fn test_missing_url_is_not_configured() {
        let forwarder = HttpPromptForwarder::new("  ", Duration::from_secs(1)).unwrap();
        assert!(!forwarder.is_configured());
        assert!(matches!(
            forwarder.forward(&request()).await,
            Err(ExternalApiError::NotConfigured)
        ));
    }
}
