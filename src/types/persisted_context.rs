//! Durable bookkeeping for a suspended execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ResumeCursor, ResumeTrigger};

/// A trigger that was materialized by the trigger manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRecord {
  pub trigger: ResumeTrigger,
  /// Reference to the artifact owned by the trigger manager.
  pub external_reference_id: String,
  /// 1-based suspension number this trigger was created in.
  #[serde(default = "first_batch")]
  pub batch: u32,
}

fn first_batch() -> u32 {
  1
}

/// Durable bookkeeping for a suspended execution (namespace `resume_context`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedExecutionContext {
  pub execution_id: String,
  pub created_trigger_records: Vec<TriggerRecord>,
  #[serde(default)]
  pub resume_cursor: Option<ResumeCursor>,
  pub timestamp: DateTime<Utc>,
}

impl PersistedExecutionContext {
  pub fn new(execution_id: impl Into<String>) -> Self {
    Self {
      execution_id: execution_id.into(),
      created_trigger_records: vec![],
      resume_cursor: None,
      timestamp: Utc::now(),
    }
  }

  /// Number of the most recent suspension batch (0 when nothing was recorded).
  pub fn latest_batch(&self) -> u32 {
    self
      .created_trigger_records
      .iter()
      .map(|r| r.batch)
      .max()
      .unwrap_or(0)
  }

  /// Appends one suspension batch; the cursor and timestamp are replaced.
  pub fn record_suspension(
    &mut self,
    created: Vec<(ResumeTrigger, String)>,
    resume_cursor: Option<ResumeCursor>,
  ) {
    let batch = self.latest_batch() + 1;
    self
      .created_trigger_records
      .extend(created.into_iter().map(|(trigger, external_reference_id)| TriggerRecord {
        trigger,
        external_reference_id,
        batch,
      }));
    self.resume_cursor = resume_cursor;
    self.timestamp = Utc::now();
  }

  /// Records created in the most recent suspension.
  pub fn latest_records(&self) -> Vec<&TriggerRecord> {
    let batch = self.latest_batch();
    self
      .created_trigger_records
      .iter()
      .filter(|r| r.batch == batch)
      .collect()
  }
}
