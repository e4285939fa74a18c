//! Trigger manager contract: turns an abstract trigger into a live external
//! artifact and later reports the answer delivered to it.
//!
//! Trigger-type-specific behavior lives behind this trait; the runtime never
//! interprets trigger payloads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::TriggerError;
use crate::types::{ResumeTrigger, TriggerType};

/// The trigger manager's view of an artifact it created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalTriggerRecord {
  pub reference_id: String,
  pub trigger_type: TriggerType,
  pub trigger_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub item_key: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub folder_path: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Outcome of reading a trigger back.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerReadout {
  /// The external event happened; this is what the execution resumes with.
  Ready(serde_json::Value),
  NotReady,
}

/// Trigger manager contract.
#[async_trait]
pub trait TriggerManager: Send + Sync {
  /// Creates the external artifact. Not assumed idempotent: the runtime calls
  /// it exactly once per trigger.
  async fn create_trigger(
    &self,
    trigger: &ResumeTrigger,
  ) -> Result<ExternalTriggerRecord, TriggerError>;

  async fn read_trigger(&self, reference_id: &str) -> Result<TriggerReadout, TriggerError>;
}

#[derive(Debug, Clone)]
struct StoredTrigger {
  record: ExternalTriggerRecord,
  answer: Option<serde_json::Value>,
}

/// In-process trigger manager. Answers are delivered with
/// [MemoryTriggerManager::deliver]; useful for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryTriggerManager {
  triggers: RwLock<HashMap<String, StoredTrigger>>,
  /// Reference ids in creation order.
  order: RwLock<Vec<String>>,
}

impl MemoryTriggerManager {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records the answer for a created trigger.
  pub async fn deliver(
    &self,
    reference_id: &str,
    answer: serde_json::Value,
  ) -> Result<(), TriggerError> {
    let mut triggers = self.triggers.write().await;
    let stored = triggers
      .get_mut(reference_id)
      .ok_or_else(|| TriggerError::UnknownReference(reference_id.to_string()))?;
    stored.answer = Some(answer);
    Ok(())
  }

  /// Records created so far, in creation order.
  pub async fn created(&self) -> Vec<ExternalTriggerRecord> {
    let triggers = self.triggers.read().await;
    self
      .order
      .read()
      .await
      .iter()
      .filter_map(|id| triggers.get(id).map(|s| s.record.clone()))
      .collect()
  }
}

#[async_trait]
impl TriggerManager for MemoryTriggerManager {
  #[instrument(level = "trace", skip(self))]
  async fn create_trigger(
    &self,
    trigger: &ResumeTrigger,
  ) -> Result<ExternalTriggerRecord, TriggerError> {
    let reference_id = uuid::Uuid::new_v4().to_string();
    let record = ExternalTriggerRecord {
      reference_id: reference_id.clone(),
      trigger_type: trigger.trigger_type,
      trigger_name: trigger.display_name().to_string(),
      item_key: Some(trigger.item_key.clone().unwrap_or_else(|| reference_id.clone())),
      folder_path: trigger.folder_path.clone(),
      created_at: Utc::now(),
    };
    self.triggers.write().await.insert(
      reference_id.clone(),
      StoredTrigger {
        record: record.clone(),
        answer: None,
      },
    );
    self.order.write().await.push(reference_id.clone());
    debug!(reference_id = %reference_id, trigger_type = %trigger.trigger_type, "trigger created");
    Ok(record)
  }

  async fn read_trigger(&self, reference_id: &str) -> Result<TriggerReadout, TriggerError> {
    let triggers = self.triggers.read().await;
    let stored = triggers
      .get(reference_id)
      .ok_or_else(|| TriggerError::UnknownReference(reference_id.to_string()))?;
    Ok(match &stored.answer {
      Some(answer) => TriggerReadout::Ready(answer.clone()),
      None => TriggerReadout::NotReady,
    })
  }
}
