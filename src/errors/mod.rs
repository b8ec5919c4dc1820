/// Error types for every layer of the service
///
/// Each layer owns one enum; the HTTP boundary converts all of them into
/// `ApiError` (see `webserver::utils`).
use std::sync::Arc;
use thiserror::Error;

use crate::metrics::MetricQuery;

// =============================================================================
// DATA ACCESS
// =============================================================================

/// Failure of the relational store behind the data access port.
///
/// Never retried by the core; propagated unchanged to the caller.
#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Column '{column}' could not be decoded: {message}")]
    Decode { column: String, message: String },

    #[error("Column '{0}' missing from result row")]
    MissingColumn(String),

    #[error("Database worker failed: {0}")]
    Task(String),
}

impl DataAccessError {
    pub fn decode(column: &str, message: impl Into<String>) -> Self {
        DataAccessError::Decode {
            column: column.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// METRICS
// =============================================================================

/// First data access failure among the parallel metric queries.
#[derive(Error, Debug)]
#[error("Metric query '{query}' failed: {source}")]
pub struct AggregationError {
    pub query: MetricQuery,
    #[source]
    pub source: DataAccessError,
}

impl AggregationError {
    pub fn new(query: MetricQuery, source: DataAccessError) -> Self {
        Self { query, source }
    }
}

/// Aggregation failure surfaced through the freshness cache.
///
/// `had_expired_entry` records that an older snapshot existed; it is
/// intentionally not served. `source` is shared with callers that waited
/// on the same failed refresh.
#[derive(Error, Debug)]
#[error("Dashboard metrics refresh failed: {source}")]
pub struct CacheRefreshError {
    #[source]
    pub source: Arc<AggregationError>,
    pub had_expired_entry: bool,
}

// =============================================================================
// EXTERNAL API
// =============================================================================

#[derive(Error, Debug)]
pub enum ExternalApiError {
    #[error("External API URL is not configured")]
    NotConfigured,

    #[error("External API timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("External API network error: {0}")]
    Network(String),

    #[error("External API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("External API returned an invalid response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Config already initialized")]
    AlreadyInitialized,
}

impl ConfigError {
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// ORDERS
// =============================================================================

/// Order CRUD failures; everything except `Data` is a client error
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("At least one of Status or ShipMethod is required")]
    EmptyUpdate,

    #[error(transparent)]
    Data(#[from] DataAccessError),
}

impl OrderError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        OrderError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

// =============================================================================
// PROMPTS
// =============================================================================

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("prompt is required")]
    MissingPrompt,

    #[error("Prompt history error: {0}")]
    History(#[from] DataAccessError),

    #[error(transparent)]
    External(#[from] ExternalApiError),
}
