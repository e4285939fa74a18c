//! JSON-file store: one document per execution id and namespace.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::instrument;

use super::{StateStore, validate_segment};
use crate::error::StoreError;

/// Default directory for the file store, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".resumable";

/// JSON-file store laid out as `<root>/<execution_id>/<namespace>.json`.
///
/// Each document maps keys to values. Writes go to a temporary file that is
/// renamed over the target, so readers in other processes never observe a
/// partially written document.
#[derive(Debug)]
pub struct FileStateStore {
  root: PathBuf,
  /// Serializes read-modify-write cycles within this process.
  write_lock: Mutex<()>,
}

impl FileStateStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      write_lock: Mutex::new(()),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn document_path(&self, execution_id: &str, namespace: &str) -> Result<PathBuf, StoreError> {
    validate_segment(execution_id)?;
    validate_segment(namespace)?;
    Ok(
      self
        .root
        .join(execution_id)
        .join(format!("{}.json", namespace)),
    )
  }
}

#[instrument(level = "trace")]
async fn load_document(path: &Path) -> Result<Map<String, Value>, StoreError> {
  match tokio::fs::read(path).await {
    Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
    Err(e) => Err(e.into()),
  }
}

#[instrument(level = "trace", skip(document))]
async fn write_document(path: &Path, document: &Map<String, Value>) -> Result<(), StoreError> {
  let json = serde_json::to_vec_pretty(document)?;
  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  let tmp = path.with_extension(format!("json.tmp-{}", uuid::Uuid::new_v4()));
  tokio::fs::write(&tmp, json).await?;
  if let Err(e) = tokio::fs::rename(&tmp, path).await {
    let _ = tokio::fs::remove_file(&tmp).await;
    return Err(e.into());
  }
  Ok(())
}

#[async_trait]
impl StateStore for FileStateStore {
  async fn set_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
    value: Value,
  ) -> Result<(), StoreError> {
    let path = self.document_path(execution_id, namespace)?;
    let _guard = self.write_lock.lock().await;
    let mut document = load_document(&path).await?;
    document.insert(key.to_string(), value);
    write_document(&path, &document).await
  }

  async fn get_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
  ) -> Result<Option<Value>, StoreError> {
    let path = self.document_path(execution_id, namespace)?;
    let mut document = load_document(&path).await?;
    Ok(document.remove(key))
  }

  async fn delete_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
  ) -> Result<(), StoreError> {
    let path = self.document_path(execution_id, namespace)?;
    let _guard = self.write_lock.lock().await;
    let mut document = load_document(&path).await?;
    if document.remove(key).is_none() {
      return Ok(());
    }
    if document.is_empty() {
      match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
      }
    } else {
      write_document(&path, &document).await
    }
  }
}
