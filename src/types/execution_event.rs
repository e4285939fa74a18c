//! Events produced by `stream`.

use serde::{Deserialize, Serialize};

use super::ExecutionResult;

/// Events produced by `stream`. A stream ends with exactly one `Result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionEvent {
  /// Intermediate progress reported by the delegate.
  Progress {
    name: String,
    #[serde(default)]
    data: serde_json::Value,
  },
  Result(ExecutionResult),
}

impl ExecutionEvent {
  pub fn progress(name: impl Into<String>, data: serde_json::Value) -> Self {
    ExecutionEvent::Progress {
      name: name.into(),
      data,
    }
  }

  pub fn as_result(&self) -> Option<&ExecutionResult> {
    match self {
      ExecutionEvent::Result(r) => Some(r),
      ExecutionEvent::Progress { .. } => None,
    }
  }
}
