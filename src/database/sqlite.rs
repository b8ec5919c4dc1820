/// SQLite adapter for the data access port
///
/// A small connection pool: up to `max_connections` rusqlite connections,
/// gated by a semaphore. Every statement runs on `spawn_blocking` so the async
/// runtime never waits on SQLite I/O, and independent queries issued
/// concurrently really do run in parallel on separate connections.
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use super::port::DataAccess;
use super::values::{QueryParams, Row, SqlValue};
use crate::errors::DataAccessError;
use crate::logger::{self, LogTag};

/// Pool-backed SQLite store
#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    busy_timeout: Duration,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.inner.path)
            .field("available_permits", &self.inner.permits.available_permits())
            .finish()
    }
}

/// Configure database connection for concurrency
fn configure_database_connection(
    connection: &Connection,
    busy_timeout: Duration,
) -> Result<(), rusqlite::Error> {
    // Write-Ahead Logging lets readers proceed while a writer is active
    connection.pragma_update(None, "journal_mode", "WAL")?;
    connection.pragma_update(None, "synchronous", "NORMAL")?;
    connection.pragma_update(None, "temp_store", "memory")?;
    connection.pragma_update(None, "foreign_keys", "ON")?;
    connection.busy_timeout(busy_timeout)?;
    Ok(())
}

fn open_connection(path: &Path, busy_timeout: Duration) -> Result<Connection, DataAccessError> {
    let connection = Connection::open(path).map_err(|e| {
        DataAccessError::Connection(format!("Failed to open {}: {}", path.display(), e))
    })?;
    configure_database_connection(&connection, busy_timeout)?;
    Ok(connection)
}

impl SqliteStore {
    /// Open the store, creating the file and its directory when missing.
    ///
    /// One connection is opened eagerly so an unreachable database fails at
    /// startup rather than on the first request.
    pub fn open(
        path: impl AsRef<Path>,
        max_connections: usize,
        busy_timeout: Duration,
    ) -> Result<Self, DataAccessError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DataAccessError::Connection(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let first = open_connection(&path, busy_timeout)?;
        logger::info(
            LogTag::Database,
            &format!(
                "Opened SQLite database {} (max {} connections)",
                path.display(),
                max_connections.max(1)
            ),
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                idle: Mutex::new(vec![first]),
                permits: Arc::new(Semaphore::new(max_connections.max(1))),
                busy_timeout,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    ///
    /// The permit and the connection travel into the blocking task and are
    /// released there, so a caller that stops waiting (for example a
    /// fail-fast join) still lets the statement finish and the connection
    /// return to the pool.
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T, DataAccessError>
    where
        F: FnOnce(&mut Connection) -> Result<T, DataAccessError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|e| DataAccessError::Pool(format!("Connection pool closed: {}", e)))?;

        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let pooled = inner.idle.lock().pop();
            let mut connection = match pooled {
                Some(connection) => connection,
                None => open_connection(&inner.path, inner.busy_timeout)?,
            };
            let result = f(&mut connection);
            inner.idle.lock().push(connection);
            result
        })
        .await
        .map_err(|e| DataAccessError::Task(format!("Task join error: {}", e)))?
    }

    /// Run DDL or multi-statement SQL without parameters
    pub async fn execute_script(&self, script: &'static str) -> Result<(), DataAccessError> {
        self.with_connection(move |conn| {
            conn.execute_batch(script)?;
            Ok(())
        })
        .await
    }
}

fn log_statement(sql: &str, started: Instant, outcome: &str) {
    if logger::is_debug_enabled(LogTag::Database) {
        let compact = sql.split_whitespace().collect::<Vec<_>>().join(" ");
        logger::debug(
            LogTag::Database,
            &format!(
                "{} in {}ms: {}",
                outcome,
                started.elapsed().as_millis(),
                compact.chars().take(160).collect::<String>()
            ),
        );
    }
}

#[async_trait]
impl DataAccess for SqliteStore {
    async fn execute(&self, sql: &str, params: QueryParams) -> Result<Vec<Row>, DataAccessError> {
        let sql = sql.to_string();
        let started = Instant::now();
        let result = self
            .with_connection({
                let sql = sql.clone();
                move |conn| {
                    let mut stmt = conn.prepare_cached(&sql)?;
                    let columns: Vec<String> =
                        stmt.column_names().into_iter().map(String::from).collect();
                    let named = params.as_named();
                    let mut rows = stmt.query(named.as_slice())?;

                    let mut out = Vec::new();
                    while let Some(row) = rows.next()? {
                        let mut record = Row::new();
                        for (idx, name) in columns.iter().enumerate() {
                            record.push(name.clone(), SqlValue::from(row.get_ref(idx)?));
                        }
                        out.push(record);
                    }
                    Ok(out)
                }
            })
            .await;

        match &result {
            Ok(rows) => log_statement(&sql, started, &format!("{} rows", rows.len())),
            Err(e) => log_statement(&sql, started, &format!("failed ({})", e)),
        }
        result
    }

    async fn execute_write(&self, sql: &str, params: QueryParams) -> Result<usize, DataAccessError> {
        let sql = sql.to_string();
        let started = Instant::now();
        let result = self
            .with_connection({
                let sql = sql.clone();
                move |conn| {
                    let named = params.as_named();
                    Ok(conn.execute(&sql, named.as_slice())?)
                }
            })
            .await;

        match &result {
            Ok(affected) => log_statement(&sql, started, &format!("{} affected", affected)),
            Err(e) => log_statement(&sql, started, &format!("failed ({})", e)),
        }
        result
    }

    async fn execute_batch(
        &self,
        statements: Vec<(String, QueryParams)>,
    ) -> Result<Vec<usize>, DataAccessError> {
        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            let mut affected = Vec::with_capacity(statements.len());
            for (sql, params) in &statements {
                let named = params.as_named();
                affected.push(tx.execute(sql, named.as_slice())?);
            }
            tx.commit()?;
            Ok(affected)
        })
        .await
    }
}
