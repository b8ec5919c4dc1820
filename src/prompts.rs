//! Prompt proxying with persisted history
//!
//! Every prompt is recorded before it leaves the process and completed with
//! the external response once it arrives. A forwarding failure leaves the
//! entry without a response.

use serde::Serialize;
use std::sync::Arc;

use crate::apis::{PromptForwarder, PromptRequest};
use crate::database::{PromptHistoryEntry, PromptHistoryStore};
use crate::errors::PromptError;
use crate::logger::{self, LogTag};
use crate::metrics::Clock;

/// Result of a forwarded prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOutcome {
    pub success: bool,
    pub data: serde_json::Value,
    pub history_id: String,
}

pub struct PromptService {
    history: PromptHistoryStore,
    forwarder: Arc<dyn PromptForwarder>,
    clock: Arc<dyn Clock>,
    list_limit: usize,
}

impl PromptService {
    pub fn new(
        history: PromptHistoryStore,
        forwarder: Arc<dyn PromptForwarder>,
        clock: Arc<dyn Clock>,
        list_limit: usize,
    ) -> Self {
        Self {
            history,
            forwarder,
            clock,
            list_limit,
        }
    }

    /// Record, forward and complete one prompt
    pub async fn send(
        &self,
        prompt: Option<String>,
        metadata: Option<serde_json::Value>,
        user_id: Option<String>,
    ) -> Result<PromptOutcome, PromptError> {
        let prompt = prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or(PromptError::MissingPrompt)?;
        let request = PromptRequest {
            prompt,
            metadata: metadata
                .filter(|m| !m.is_null())
                .unwrap_or_else(|| serde_json::json!({})),
        };
        let external_request = serde_json::to_value(&request)
            .unwrap_or_else(|_| serde_json::json!({ "prompt": request.prompt }));

        let history_id = self
            .history
            .record_request(
                user_id.as_deref(),
                &request.prompt,
                &external_request,
                self.clock.now(),
            )
            .await?;

        let data = match self.forwarder.forward(&request).await {
            Ok(data) => data,
            Err(e) => {
                logger::error(
                    LogTag::Prompts,
                    &format!("Prompt {} could not be forwarded: {}", history_id, e),
                );
                return Err(e.into());
            }
        };

        if self.history.record_response(&history_id, &data).await? {
            logger::info(
                LogTag::Prompts,
                &format!("Prompt {} forwarded and recorded", history_id),
            );
        } else {
            logger::warning(
                LogTag::Prompts,
                &format!(
                    "Prompt {} forwarded but its history entry is gone; response not recorded",
                    history_id
                ),
            );
        }

        Ok(PromptOutcome {
            success: true,
            data,
            history_id,
        })
    }

    /// Newest history entries, bounded by `history.list_limit`
    pub async fn history(&self) -> Result<Vec<PromptHistoryEntry>, PromptError> {
        Ok(self.history.recent(self.list_limit).await?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::errors::ExternalApiError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Forwarder that echoes prompts or fails on demand
    #[derive(Default)]
    pub struct EchoForwarder {
        pub fail: bool,
        pub seen: Mutex<Vec<PromptRequest>>,
    }

    #[async_trait]
    impl PromptForwarder for EchoForwarder {
        async fn forward(&self, request: &PromptRequest) -> Result<serde_json::Value, ExternalApiError> {
            self.seen.lock().push(request.clone());
            if self.fail {
                return Err(ExternalApiError::HttpStatus {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(serde_json::json!({ "reply": format!("echo: {}", request.prompt) }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::EchoForwarder;
    use super::*;
    use crate::database::test_support::history_store;
    use crate::database::{DataAccess, QueryParams, SqliteStore};
    use crate::errors::ExternalApiError;
    use crate::metrics::ManualClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    async fn service(forwarder: Arc<EchoForwarder>) -> (tempfile::TempDir, PromptService) {
        let (dir, store) = history_store().await;
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()));
        let service = PromptService::new(PromptHistoryStore::new(Arc::new(store)), forwarder, clock, 100);
        (dir, service)
    }

    #[tokio::test]
    async fn test_send_records_request_and_response() {
        let forwarder = Arc::new(EchoForwarder::default());
        let (_dir, service) = service(Arc::clone(&forwarder)).await;

        let outcome = service
            .send(Some("hello".to_string()), Some(json!({"lang": "en"})), None)
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.data, json!({"reply": "echo: hello"}));

        let history = service.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, outcome.history_id);
        assert_eq!(
            history[0].external_request,
            Some(json!({"prompt": "hello", "metadata": {"lang": "en"}}))
        );
        assert_eq!(history[0].external_response, Some(outcome.data.clone()));

        let body = serde_json::to_value(&outcome).unwrap();
        assert!(body.get("historyId").is_some());
    }

    #[tokio::test]
    async fn test_missing_prompt_is_rejected_before_recording() {
        let forwarder = Arc::new(EchoForwarder::default());
        let (_dir, service) = service(Arc::clone(&forwarder)).await;

        assert!(matches!(service.send(None, None, None).await, Err(PromptError::MissingPrompt)));
        assert!(matches!(
            service.send(Some("   ".to_string()), None, None).await,
            Err(PromptError::MissingPrompt)
        ));
        assert!(service.history().await.unwrap().is_empty());
        assert!(forwarder.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_forward_failure_keeps_entry_without_response() {
        let forwarder = Arc::new(EchoForwarder {
            fail: true,
            ..EchoForwarder::default()
        });
        let (_dir, service) = service(Arc::clone(&forwarder)).await;

        let err = service.send(Some("hi".to_string()), None, None).await.unwrap_err();
        assert!(matches!(
            err,
            PromptError::External(ExternalApiError::HttpStatus { status: 503, .. })
        ));

        let history = service.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].external_response.is_none());
        assert_eq!(forwarder.seen.lock()[0].metadata, json!({}));
    }

    /// Clears the history table while the prompt is in flight
    struct ClearingForwarder {
        store: Arc<SqliteStore>,
    }

    #[async_trait]
    impl PromptForwarder for ClearingForwarder {
        async fn forward(&self, _request: &PromptRequest) -> Result<serde_json::Value, ExternalApiError> {
            self.store
                .execute_write("DELETE FROM PromptHistory", QueryParams::new())
                .await
                .expect("clear history");
            Ok(json!({"reply": "late"}))
        }
    }

    #[tokio::test]
    async fn test_response_for_vanished_entry_still_returns_outcome() {
        let (_dir, store) = history_store().await;
        let store = Arc::new(store);
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()));
        let service = PromptService::new(
            PromptHistoryStore::new(Arc::clone(&store) as Arc<dyn DataAccess>),
            Arc::new(ClearingForwarder {
                store: Arc::clone(&store),
            }),
            clock,
            100,
        );

        let outcome = service.send(Some("hi".to_string()), None, None).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.data, json!({"reply": "late"}));
        assert!(service.history().await.unwrap().is_empty());
    }
}
