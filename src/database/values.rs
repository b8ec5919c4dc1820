/// Values, parameters and rows exchanged through the data access port
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::DataAccessError;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    fn to_json(&self) -> serde_json::Value {
        match self {
            SqlValue::Null => serde_json::Value::Null,
            SqlValue::Integer(v) => serde_json::Value::from(*v),
            SqlValue::Real(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SqlValue::Text(v) => serde_json::Value::String(v.clone()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Text(format_timestamp(&v))
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            SqlValue::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            SqlValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

impl<'a> From<ValueRef<'a>> for SqlValue {
    fn from(value: ValueRef<'a>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(v) => SqlValue::Integer(v),
            ValueRef::Real(v) => SqlValue::Real(v),
            ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Timestamps are stored as RFC 3339 text with second precision, which keeps
/// lexical and chronological order identical.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse the timestamp shapes found in the sales data
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Ordered named parameters (`:name` placeholders)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, SqlValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value; the leading ':' is added when missing
    pub fn bind(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        let name = if name.starts_with(':') {
            name.to_string()
        } else {
            format!(":{}", name)
        };
        self.entries.push((name, value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        let name = name.trim_start_matches(':');
        self.entries
            .iter()
            .find(|(key, _)| key.trim_start_matches(':') == name)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrowed form accepted by rusqlite's named parameter binding
    pub(crate) fn as_named(&self) -> Vec<(&str, &dyn ToSql)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect()
    }
}

// =============================================================================
// ROWS
// =============================================================================

/// One result row, columns in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by mocks and tests
    pub fn with(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.columns.push((column.to_string(), value.into()));
        self
    }

    pub(crate) fn push(&mut self, column: String, value: SqlValue) {
        self.columns.push((column, value));
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    fn require(&self, column: &str) -> Result<&SqlValue, DataAccessError> {
        self.get(column)
            .ok_or_else(|| DataAccessError::MissingColumn(column.to_string()))
    }

    pub fn i64(&self, column: &str) -> Result<i64, DataAccessError> {
        match self.require(column)? {
            SqlValue::Integer(v) => Ok(*v),
            SqlValue::Real(v) if v.fract() == 0.0 => Ok(*v as i64),
            SqlValue::Text(v) => v
                .trim()
                .parse()
                .map_err(|_| DataAccessError::decode(column, format!("'{}' is not an integer", v))),
            // Aggregates over empty sets come back as NULL
            SqlValue::Null => Ok(0),
            other => Err(DataAccessError::decode(column, format!("{:?} is not an integer", other))),
        }
    }

    pub fn f64(&self, column: &str) -> Result<f64, DataAccessError> {
        match self.require(column)? {
            SqlValue::Integer(v) => Ok(*v as f64),
            SqlValue::Real(v) => Ok(*v),
            SqlValue::Text(v) => v
                .trim()
                .parse()
                .map_err(|_| DataAccessError::decode(column, format!("'{}' is not a number", v))),
            SqlValue::Null => Ok(0.0),
        }
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>, DataAccessError> {
        Ok(match self.require(column)? {
            SqlValue::Null => None,
            SqlValue::Text(v) => Some(v.clone()),
            SqlValue::Integer(v) => Some(v.to_string()),
            SqlValue::Real(v) => Some(v.to_string()),
        })
    }

    pub fn text(&self, column: &str) -> Result<String, DataAccessError> {
        self.opt_text(column)?
            .ok_or_else(|| DataAccessError::decode(column, "unexpected NULL"))
    }

    pub fn opt_datetime(&self, column: &str) -> Result<Option<DateTime<Utc>>, DataAccessError> {
        match self.opt_text(column)? {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| DataAccessError::decode(column, format!("'{}' is not a timestamp", raw))),
        }
    }

    pub fn datetime(&self, column: &str) -> Result<DateTime<Utc>, DataAccessError> {
        self.opt_datetime(column)?
            .ok_or_else(|| DataAccessError::decode(column, "unexpected NULL"))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Rows serialize as JSON objects in select order
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}
