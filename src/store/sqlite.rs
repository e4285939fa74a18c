//! SQLite-backed store using an `sqlx` pool.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use super::StateStore;
use crate::error::StoreError;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS runtime_state (
  execution_id TEXT NOT NULL,
  namespace TEXT NOT NULL,
  key TEXT NOT NULL,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  PRIMARY KEY (execution_id, namespace, key)
)";

const UPSERT: &str = "INSERT INTO runtime_state (execution_id, namespace, key, value, updated_at)
  VALUES (?1, ?2, ?3, ?4, ?5)
  ON CONFLICT (execution_id, namespace, key)
  DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

const SELECT: &str =
  "SELECT value FROM runtime_state WHERE execution_id = ?1 AND namespace = ?2 AND key = ?3";

const DELETE: &str =
  "DELETE FROM runtime_state WHERE execution_id = ?1 AND namespace = ?2 AND key = ?3";

/// SQLite-backed store. Values are stored as JSON text.
#[derive(Debug, Clone)]
pub struct SqliteStateStore {
  pool: SqlitePool,
}

impl SqliteStateStore {
  /// Opens (creating if needed) the database file at `path`.
  pub async fn open(path: &Path) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Self::from_pool(pool).await
  }

  /// Connects with an sqlx URL such as `sqlite://state.db`.
  pub async fn connect(url: &str) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Self::from_pool(pool).await
  }

  /// Private in-memory database. Limited to one connection, since each
  /// SQLite memory connection is its own database.
  pub async fn in_memory() -> Result<Self, StoreError> {
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect("sqlite::memory:")
      .await?;
    Self::from_pool(pool).await
  }

  /// Wraps an existing pool and creates the table if missing.
  pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
    sqlx::query(CREATE_TABLE).execute(&pool).await?;
    debug!("runtime_state table ready");
    Ok(Self { pool })
  }
}

#[async_trait]
impl StateStore for SqliteStateStore {
  async fn set_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
    value: Value,
  ) -> Result<(), StoreError> {
    let text = serde_json::to_string(&value)?;
    sqlx::query(UPSERT)
      .bind(execution_id)
      .bind(namespace)
      .bind(key)
      .bind(text)
      .bind(chrono::Utc::now().to_rfc3339())
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn get_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
  ) -> Result<Option<Value>, StoreError> {
    let row: Option<String> = sqlx::query_scalar(SELECT)
      .bind(execution_id)
      .bind(namespace)
      .bind(key)
      .fetch_optional(&self.pool)
      .await?;
    row
      .map(|text| serde_json::from_str(&text).map_err(StoreError::from))
      .transpose()
  }

  async fn delete_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
  ) -> Result<(), StoreError> {
    sqlx::query(DELETE)
      .bind(execution_id)
      .bind(namespace)
      .bind(key)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}
