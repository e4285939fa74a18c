//! Process-local store for tests and embedding.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::StateStore;
use crate::error::StoreError;

type Key = (String, String, String);

/// Process-local store for tests and embedding. Shares nothing across processes.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
  values: RwLock<HashMap<Key, Value>>,
}

impl MemoryStateStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of stored keys across all executions.
  pub async fn len(&self) -> usize {
    self.values.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.values.read().await.is_empty()
  }
}

fn key(execution_id: &str, namespace: &str, key: &str) -> Key {
  (execution_id.to_string(), namespace.to_string(), key.to_string())
}

#[async_trait]
impl StateStore for MemoryStateStore {
  async fn set_value(
    &self,
    execution_id: &str,
    namespace: &str,
    k: &str,
    value: Value,
  ) -> Result<(), StoreError> {
    self
      .values
      .write()
      .await
      .insert(key(execution_id, namespace, k), value);
    Ok(())
  }

  async fn get_value(
    &self,
    execution_id: &str,
    namespace: &str,
    k: &str,
  ) -> Result<Option<Value>, StoreError> {
    Ok(
      self
        .values
        .read()
        .await
        .get(&key(execution_id, namespace, k))
        .cloned(),
    )
  }

  async fn delete_value(
    &self,
    execution_id: &str,
    namespace: &str,
    k: &str,
  ) -> Result<(), StoreError> {
    self
      .values
      .write()
      .await
      .remove(&key(execution_id, namespace, k));
    Ok(())
  }
}
