//! Store seam
//!
//! Collected data is written by the collectors; the orchestrator only
//! initializes the schema on request and releases the connection after
//! jobs whose persistence mode holds one.

use async_trait::async_trait;
use harvest_core::dto::store::StoreKind;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} store is not configured")]
    NotConfigured(StoreKind),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence sink shared across jobs
#[async_trait]
pub trait Store: Send + Sync {
    /// Creates the result tables if they do not exist yet
    async fn init_schema(&self, kind: StoreKind) -> Result<(), StoreError>;

    /// Releases every open connection; calling it with nothing open is a no-op
    async fn close(&self) -> Result<(), StoreError>;
}

/// sqlx-backed store with lazily opened SQLite and MySQL pools
pub struct SqlStore {
    sqlite_url: String,
    mysql_url: Option<String>,
    pools: Mutex<Pools>,
}

#[derive(Default)]
struct Pools {
    sqlite: Option<SqlitePool>,
    mysql: Option<MySqlPool>,
}

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

impl SqlStore {
    pub fn new(sqlite_url: impl Into<String>, mysql_url: Option<String>) -> Self {
        Self {
            sqlite_url: sqlite_url.into(),
            mysql_url,
            pools: Mutex::new(Pools::default()),
        }
    }
}

#[async_trait]
impl Store for SqlStore {
    async fn init_schema(&self, kind: StoreKind) -> Result<(), StoreError> {
        let mut pools = self.pools.lock().await;

        match kind {
            StoreKind::Sqlite => {
                if pools.sqlite.is_none() {
                    tracing::info!("Opening SQLite store");
                    let pool = SqlitePoolOptions::new()
                        .max_connections(MAX_CONNECTIONS)
                        .acquire_timeout(ACQUIRE_TIMEOUT)
                        .connect(&self.sqlite_url)
                        .await?;
                    pools.sqlite = Some(pool);
                }
                if let Some(pool) = &pools.sqlite {
                    for statement in SQLITE_SCHEMA {
                        sqlx::query(statement).execute(pool).await?;
                    }
                }
            }
            StoreKind::Mysql => {
                let url = self
                    .mysql_url
                    .as_deref()
                    .ok_or(StoreError::NotConfigured(StoreKind::Mysql))?;
                if pools.mysql.is_none() {
                    tracing::info!("Opening MySQL store");
                    let pool = MySqlPoolOptions::new()
                        .max_connections(MAX_CONNECTIONS)
                        .acquire_timeout(ACQUIRE_TIMEOUT)
                        .connect(url)
                        .await?;
                    pools.mysql = Some(pool);
                }
                if let Some(pool) = &pools.mysql {
                    for statement in MYSQL_SCHEMA {
                        sqlx::query(statement).execute(pool).await?;
                    }
                }
            }
        }

        tracing::info!("{} schema initialized", kind);
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut pools = self.pools.lock().await;

        if let Some(pool) = pools.sqlite.take() {
            pool.close().await;
            tracing::debug!("SQLite store closed");
        }
        if let Some(pool) = pools.mysql.take() {
            pool.close().await;
            tracing::debug!("MySQL store closed");
        }

        Ok(())
    }
}

const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS collected_contents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id TEXT NOT NULL,
        backend TEXT NOT NULL,
        content_id TEXT NOT NULL,
        title TEXT,
        author_id TEXT,
        payload TEXT NOT NULL,
        collected_at TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_contents_backend_content ON collected_contents(backend, content_id)",
    r#"
    CREATE TABLE IF NOT EXISTS collected_comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id TEXT NOT NULL,
        backend TEXT NOT NULL,
        content_id TEXT NOT NULL,
        comment_id TEXT NOT NULL,
        parent_comment_id TEXT,
        payload TEXT NOT NULL,
        collected_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_comments_content ON collected_comments(backend, content_id)",
    r#"
    CREATE TABLE IF NOT EXISTS collected_creators (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id TEXT NOT NULL,
        backend TEXT NOT NULL,
        creator_id TEXT NOT NULL,
        payload TEXT NOT NULL,
        collected_at TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_creators_backend_creator ON collected_creators(backend, creator_id)",
];

// MySQL has no CREATE INDEX IF NOT EXISTS, so keys are declared inline.
const MYSQL_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS collected_contents (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        job_id VARCHAR(128) NOT NULL,
        backend VARCHAR(16) NOT NULL,
        content_id VARCHAR(255) NOT NULL,
        title TEXT,
        author_id VARCHAR(255),
        payload LONGTEXT NOT NULL,
        collected_at DATETIME NOT NULL,
        UNIQUE KEY uk_contents_backend_content (backend, content_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collected_comments (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        job_id VARCHAR(128) NOT NULL,
        backend VARCHAR(16) NOT NULL,
        content_id VARCHAR(255) NOT NULL,
        comment_id VARCHAR(255) NOT NULL,
        parent_comment_id VARCHAR(255),
        payload LONGTEXT NOT NULL,
        collected_at DATETIME NOT NULL,
        KEY idx_comments_content (backend, content_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collected_creators (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        job_id VARCHAR(128) NOT NULL,
        backend VARCHAR(16) NOT NULL,
        creator_id VARCHAR(255) NOT NULL,
        payload LONGTEXT NOT NULL,
        collected_at DATETIME NOT NULL,
        UNIQUE KEY uk_creators_backend_creator (backend, creator_id)
    )
    "#,
];
