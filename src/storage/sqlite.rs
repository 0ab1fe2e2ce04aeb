//! SQLite storage backend implementation
//!
//! This module provides a SQLite-based implementation of the `TargetStore` trait.
//!
//! ## Features
//!
//! - **Embedded**: No separate database server required
//! - **WAL mode**: Better concurrency for reads during writes
//! - **Connection pooling**: Efficient resource usage
//! - **Migrations**: Automatic schema versioning with sqlx
//!
//! The `redis_server.name` column carries a `UNIQUE` constraint; a violation
//! surfaces as [`StorageError::UniqueViolation`] so concurrent creates with
//! the same name cannot both succeed.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument};

use super::backend::TargetStore;
use super::error::{StorageError, StorageResult};
use super::schema::{NewTarget, Target, TargetChanges, TargetId};

const SELECT_BY_ID: &str = "SELECT id, name, description, host, port, password, \
     updated_at, created_at \
     FROM redis_server WHERE id = ?";

const SELECT_BY_NAME: &str = "SELECT id, name, description, host, port, password, \
     updated_at, created_at \
     FROM redis_server WHERE name = ?";

const SELECT_ALL: &str = "SELECT id, name, description, host, port, password, \
     updated_at, created_at \
     FROM redis_server ORDER BY id ASC";

/// SQLite storage backend
pub struct SqliteBackend {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteBackend {
    /// Open (or create) the database file and run migrations
    ///
    /// ## Example
    ///
    /// ```no_run
    /// # use rmon::storage::sqlite::SqliteBackend;
    /// # async fn example() -> anyhow::Result<()> {
    /// let backend = SqliteBackend::new("./rmon.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite backend at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("database migrations complete");

        Ok(Self {
            pool,
            db_path: db_path_str,
        })
    }

    /// Path of the underlying database file
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    fn timestamp_to_millis(dt: &DateTime<Utc>) -> i64 {
        dt.timestamp_millis()
    }

    fn millis_to_timestamp(millis: i64) -> StorageResult<DateTime<Utc>> {
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| StorageError::CorruptRow(format!("timestamp out of range: {millis}")))
    }

    fn row_to_target(row: &SqliteRow) -> StorageResult<Target> {
        let port: i64 = row.try_get("port")?;
        let port = u16::try_from(port)
            .map_err(|_| StorageError::CorruptRow(format!("port out of range: {port}")))?;

        Ok(Target {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            host: row.try_get("host")?,
            port,
            password: row.try_get("password")?,
            updated_at: Self::millis_to_timestamp(row.try_get("updated_at")?)?,
            created_at: Self::millis_to_timestamp(row.try_get("created_at")?)?,
        })
    }

    /// Map a write failure, recognizing the unique index on `name`
    fn write_error(err: sqlx::Error, name: &str) -> StorageError {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return StorageError::UniqueViolation(name.to_string());
        }
        err.into()
    }
}

#[async_trait]
impl TargetStore for SqliteBackend {
    #[instrument(skip(self, target), fields(name = %target.name))]
    async fn insert(&self, target: NewTarget) -> StorageResult<Target> {
        let created_at = Self::timestamp_to_millis(&target.created_at);

        let result = sqlx::query(
            r#"
            INSERT INTO redis_server (
                name, description, host, port, password, updated_at, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&target.name)
        .bind(&target.description)
        .bind(&target.host)
        .bind(i64::from(target.port))
        .bind(&target.password)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &target.name))?;

        let id = result.last_insert_rowid();
        debug!("inserted target {}", id);

        Ok(target.into_target(id))
    }

    #[instrument(skip(self, changes), fields(name = %changes.name))]
    async fn update(&self, id: TargetId, changes: TargetChanges) -> StorageResult<Target> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE redis_server
            SET name = ?, description = ?, host = ?, port = ?, password = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.host)
        .bind(i64::from(changes.port))
        .bind(&changes.password)
        .bind(Self::timestamp_to_millis(&changes.updated_at))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::write_error(e, &changes.name))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }

        let row = sqlx::query(SELECT_BY_ID)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let target = Self::row_to_target(&row)?;

        tx.commit().await?;

        Ok(target)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: TargetId) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM redis_server WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: TargetId) -> StorageResult<Option<Target>> {
        let row = sqlx::query(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_target).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Target>> {
        let row = sqlx::query(SELECT_BY_NAME)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_target).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> StorageResult<Vec<Target>> {
        let rows = sqlx::query(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;

        let targets = rows
            .iter()
            .map(Self::row_to_target)
            .collect::<StorageResult<Vec<_>>>()?;

        debug!("listed {} targets", targets.len());
        Ok(targets)
    }

    async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        info!("closing SQLite backend");
        self.pool.close().await;
        Ok(())
    }
}
