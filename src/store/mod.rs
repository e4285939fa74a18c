//! Durable key-value store namespaced by execution id.
//!
//! Every operation is a single-key write or read; backends do not need
//! multi-key transactions. The writer process may change between a suspension
//! and its resume, so nothing here may depend on in-process state for
//! correctness.

mod file;
mod memory;
mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

pub use file::{DEFAULT_STATE_DIR, FileStateStore};
pub use memory::MemoryStateStore;
pub use sqlite::SqliteStateStore;

/// Durable key-value store namespaced by execution id.
#[async_trait]
pub trait StateStore: Send + Sync {
  async fn set_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
    value: Value,
  ) -> Result<(), StoreError>;

  /// Returns `None` when nothing is stored under the key.
  async fn get_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
  ) -> Result<Option<Value>, StoreError>;

  /// Removes the key. Removing an absent key is not an error.
  async fn delete_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
  ) -> Result<(), StoreError>;
}

/// Restricts ids and namespaces to `[A-Za-z0-9._-]`, excluding `.` and `..`.
pub(crate) fn validate_segment(segment: &str) -> Result<(), StoreError> {
  let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
  if segment.is_empty() || segment == "." || segment == ".." || !segment.chars().all(allowed) {
    return Err(StoreError::InvalidKey(segment.to_string()));
  }
  Ok(())
}
