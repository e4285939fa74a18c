//! Kind of external event a suspended execution waits on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of external event a suspended execution waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
  /// A spawned job must finish.
  Job,
  /// A human task (approval, form) must be completed.
  Task,
  /// An asynchronous API call must deliver its answer.
  Api,
  DeepRag,
  BatchRag,
}

impl TriggerType {
  pub const ALL: [TriggerType; 5] = [
    TriggerType::Job,
    TriggerType::Task,
    TriggerType::Api,
    TriggerType::DeepRag,
    TriggerType::BatchRag,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      TriggerType::Job => "JOB",
      TriggerType::Task => "TASK",
      TriggerType::Api => "API",
      TriggerType::DeepRag => "DEEP_RAG",
      TriggerType::BatchRag => "BATCH_RAG",
    }
  }
}

impl fmt::Display for TriggerType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TriggerType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let upper = s.trim().to_ascii_uppercase();
    TriggerType::ALL
      .into_iter()
      .find(|t| t.as_str() == upper)
      .ok_or_else(|| format!("unknown trigger type: {}", s))
  }
}
