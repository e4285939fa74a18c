//! Per-invocation options supplied by the caller.

use serde::{Deserialize, Serialize};

use super::ResumeCursor;

/// Per-invocation options supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeOptions {
  #[serde(default)]
  pub resume: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resume_payload: Option<serde_json::Value>,
  /// Filled in by the resumable runtime when forwarding a resume to its
  /// delegate. Values supplied by the caller are discarded.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resume_cursor: Option<ResumeCursor>,
}

impl RuntimeOptions {
  /// Options for a fresh run.
  pub fn fresh() -> Self {
    Self::default()
  }

  /// Options for resuming with the answer to the pending trigger(s).
  pub fn resume_with(payload: serde_json::Value) -> Self {
    Self {
      resume: true,
      resume_payload: Some(payload),
      resume_cursor: None,
    }
  }

  /// Rejects `resume` without a payload, and a payload without `resume`.
  pub fn validate(&self) -> Result<(), String> {
    match (self.resume, &self.resume_payload) {
      (true, None) => Err("resume requested without a resume_payload".to_string()),
      (false, Some(_)) => Err("resume_payload supplied without resume".to_string()),
      _ => Ok(()),
    }
  }
}
