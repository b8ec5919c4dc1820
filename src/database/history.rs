/// Prompt history persistence
///
/// One row per forwarded prompt. The row is written before the external call
/// and completed with the response afterwards, so failed forwards remain
/// visible as entries without a response.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::port::DataAccess;
use super::values::{format_timestamp, QueryParams, Row};
use crate::errors::DataAccessError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptHistoryEntry {
    pub id: String,
    pub user_id: Option<String>,
    pub prompt: String,
    pub external_request: Option<serde_json::Value>,
    pub external_response: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

fn parse_json_column(row: &Row, column: &str) -> Result<Option<serde_json::Value>, DataAccessError> {
    match row.opt_text(column)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DataAccessError::decode(column, e.to_string())),
    }
}

impl PromptHistoryEntry {
    fn from_row(row: &Row) -> Result<Self, DataAccessError> {
        Ok(Self {
            id: row.text("id")?,
            user_id: row.opt_text("userId")?,
            prompt: row.text("prompt")?,
            external_request: parse_json_column(row, "externalRequest")?,
            external_response: parse_json_column(row, "externalResponse")?,
            created_at: row.datetime("createdAt")?,
        })
    }
}

#[derive(Clone)]
pub struct PromptHistoryStore {
    port: Arc<dyn DataAccess>,
}

impl PromptHistoryStore {
    pub fn new(port: Arc<dyn DataAccess>) -> Self {
        Self { port }
    }

    /// Store a new entry for an outgoing request; returns its id
    pub async fn record_request(
        &self,
        user_id: Option<&str>,
        prompt: &str,
        external_request: &serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Result<String, DataAccessError> {
        let id = uuid::Uuid::new_v4().to_string();
        let params = QueryParams::new()
            .bind("id", id.as_str())
            .bind("userId", user_id)
            .bind("prompt", prompt)
            .bind("externalRequest", external_request.to_string())
            .bind("createdAt", format_timestamp(&created_at));

        self.port
            .execute_write(
                "INSERT INTO PromptHistory (id, userId, prompt, externalRequest, createdAt)
                 VALUES (:id, :userId, :prompt, :externalRequest, :createdAt)",
                params,
            )
            .await?;
        Ok(id)
    }

    /// Attach the external response to an entry; `false` when the id is unknown
    pub async fn record_response(
        &self,
        id: &str,
        external_response: &serde_json::Value,
    ) -> Result<bool, DataAccessError> {
        let affected = self
            .port
            .execute_write(
                "UPDATE PromptHistory SET externalResponse = :externalResponse WHERE id = :id",
                QueryParams::new()
                    .bind("externalResponse", external_response.to_string())
                    .bind("id", id),
            )
            .await?;
        Ok(affected > 0)
    }

    /// Newest entries first
    pub async fn recent(&self, limit: usize) -> Result<Vec<PromptHistoryEntry>, DataAccessError> {
        let rows = self
            .port
            .execute(
                "SELECT id, userId, prompt, externalRequest, externalResponse, createdAt
                 FROM PromptHistory
                 ORDER BY createdAt DESC, rowid DESC
                 LIMIT :limit",
                QueryParams::new().bind("limit", limit as i64),
            )
            .await?;
        rows.iter().map(PromptHistoryEntry::from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::history_store;
    use chrono::TimeZone;
    use serde_json::json;

    #[tokio::test]
    async fn test_request_then_response_roundtrip() {
        let (_dir, store) = history_store().await;
        let history = PromptHistoryStore::new(Arc::new(store));
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let request = json!({"prompt": "hola", "metadata": {"lang": "es"}});
        let id = history
            .record_request(None, "hola", &request, created)
            .await
            .unwrap();
        assert!(history
            .record_response(&id, &json!({"answer": 42}))
            .await
            .unwrap());
        assert!(!history
            .record_response("missing", &json!({}))
            .await
            .unwrap());

        let entries = history.recent(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].external_request, Some(request));
        assert_eq!(entries[0].external_response, Some(json!({"answer": 42})));
        assert_eq!(entries[0].created_at, created);

        let json = serde_json::to_value(&entries[0]).unwrap();
        assert!(json.get("externalResponse").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let (_dir, store) = history_store().await;
        let history = PromptHistoryStore::new(Arc::new(store));
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        for minute in 0..5 {
            history
                .record_request(
                    Some("tester"),
                    &format!("prompt {}", minute),
                    &json!({}),
                    base + chrono::Duration::minutes(minute),
                )
                .await
                .unwrap();
        }

        let entries = history.recent(3).await.unwrap();
        let prompts: Vec<_> = entries.iter().map(|e| e.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["prompt 4", "prompt 3", "prompt 2"]);
        assert!(entries.iter().all(|e| e.external_response.is_none()));
        assert_eq!(entries[0].user_id.as_deref(), Some("tester"));
    }
}
