/// Response helpers and the HTTP error type
///
/// Every failure leaves the service as `{"error": <message>, "detail": <detail>}`.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::error::Error as StdError;

use crate::errors::{CacheRefreshError, DataAccessError, OrderError, PromptError};
use crate::logger::{self, LogTag};

/// Error body shared by all endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

/// 200 with a JSON body
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

pub fn error_response(status: StatusCode, error: &str, detail: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            detail: detail.to_string(),
        }),
    )
        .into_response()
}

/// Error message followed by its source chain
fn describe(err: &dyn StdError) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !detail.contains(&text) {
            detail.push_str(": ");
            detail.push_str(&text);
        }
        source = cause.source();
    }
    detail
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    BadRequest { error: String, detail: String },
    NotFound { error: String, detail: String },
    Internal { error: String, detail: String },
}

impl ApiError {
    pub fn bad_request(error: &str, detail: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error: error.to_string(),
            detail: detail.into(),
        }
    }

    pub fn not_found(error: &str, detail: impl Into<String>) -> Self {
        ApiError::NotFound {
            error: error.to_string(),
            detail: detail.into(),
        }
    }

    pub fn internal(error: &str, detail: impl Into<String>) -> Self {
        ApiError::Internal {
            error: error.to_string(),
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, detail) = match self {
            ApiError::BadRequest { error, detail }
            | ApiError::NotFound { error, detail }
            | ApiError::Internal { error, detail } => (error, detail),
        };

        if status.is_server_error() {
            logger::error(LogTag::Webserver, &format!("{}: {}", error, detail));
        } else {
            logger::debug(
                LogTag::Webserver,
                &format!("Rejected request ({}): {}: {}", status.as_u16(), error, detail),
            );
        }

        error_response(status, &error, &detail)
    }
}

impl From<DataAccessError> for ApiError {
    fn from(err: DataAccessError) -> Self {
        ApiError::internal("Database query failed", describe(&err))
    }
}

impl From<CacheRefreshError> for ApiError {
    fn from(err: CacheRefreshError) -> Self {
        ApiError::internal("Failed to load dashboard metrics", describe(err.source.as_ref()))
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Data(inner) => ApiError::internal("Order operation failed", describe(&inner)),
            other => ApiError::bad_request("Invalid order data", other.to_string()),
        }
    }
}

impl From<PromptError> for ApiError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::MissingPrompt => ApiError::bad_request("prompt is required", err.to_string()),
            PromptError::History(inner) => {
                ApiError::internal("Failed to record prompt history", describe(&inner))
            }
            PromptError::External(inner) => ApiError::internal("Error forwarding prompt", describe(&inner)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AggregationError, ExternalApiError};
    use crate::metrics::MetricQuery;
    use std::sync::Arc;

    #[test]
    fn test_error_mapping_statuses() {
        let err: ApiError = OrderError::EmptyUpdate.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = PromptError::External(ExternalApiError::NotConfigured).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let refresh = CacheRefreshError {
            source: Arc::new(AggregationError::new(
                MetricQuery::RecentOrders,
                DataAccessError::Connection("refused".to_string()),
            )),
            had_expired_entry: true,
        };
        match ApiError::from(refresh) {
            ApiError::Internal { error, detail } => {
                assert_eq!(error, "Failed to load dashboard metrics");
                assert!(detail.contains("recent_orders"));
                assert!(detail.contains("refused"));
            }
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
