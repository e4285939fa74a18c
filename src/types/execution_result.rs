//! Result crossing every layer of the execution chain.

use serde::{Deserialize, Serialize};

use super::{ExecutionStatus, Payload, ResumeCursor, ResumeTrigger, StructuredError};

/// Result crossing every layer of the execution chain.
///
/// When `status` is suspended exactly one of `trigger` / `triggers` is set;
/// otherwise both are absent. See [ExecutionResult::validate].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
  pub status: ExecutionStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<Payload>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<StructuredError>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trigger: Option<ResumeTrigger>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub triggers: Option<Vec<ResumeTrigger>>,
  /// Where the delegate continues on resume. Only meaningful when suspended.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resume_cursor: Option<ResumeCursor>,
}

impl ExecutionResult {
  fn with_status(status: ExecutionStatus) -> Self {
    Self {
      status,
      output: None,
      error: None,
      trigger: None,
      triggers: None,
      resume_cursor: None,
    }
  }

  pub fn successful(output: Payload) -> Self {
    Self {
      output: Some(output),
      ..Self::with_status(ExecutionStatus::Successful)
    }
  }

  pub fn faulted(error: StructuredError) -> Self {
    Self {
      error: Some(error),
      ..Self::with_status(ExecutionStatus::Faulted)
    }
  }

  /// Suspended on a single trigger.
  pub fn suspended(trigger: ResumeTrigger) -> Self {
    Self {
      trigger: Some(trigger),
      ..Self::with_status(ExecutionStatus::Suspended)
    }
  }

  /// Suspended on several triggers at once.
  pub fn suspended_on(triggers: Vec<ResumeTrigger>) -> Self {
    Self {
      triggers: Some(triggers),
      ..Self::with_status(ExecutionStatus::Suspended)
    }
  }

  pub fn with_cursor(mut self, cursor: ResumeCursor) -> Self {
    self.resume_cursor = Some(cursor);
    self
  }

  pub fn with_output(mut self, output: Payload) -> Self {
    self.output = Some(output);
    self
  }

  pub fn is_suspended(&self) -> bool {
    self.status == ExecutionStatus::Suspended
  }

  pub fn is_faulted(&self) -> bool {
    self.status == ExecutionStatus::Faulted
  }

  /// Error code of a faulted result.
  pub fn error_code(&self) -> Option<&str> {
    self.error.as_ref().map(|e| e.code.as_str())
  }

  /// Enforces the trigger/status pairing. An empty `triggers` list counts as absent.
  pub fn validate(&self) -> Result<(), String> {
    let has_single = self.trigger.is_some();
    let has_many = self.triggers.as_ref().is_some_and(|t| !t.is_empty());
    match self.status {
      ExecutionStatus::Suspended if has_single && has_many => {
        Err("suspended result sets both trigger and triggers".to_string())
      }
      ExecutionStatus::Suspended if !has_single && !has_many => {
        Err("suspended result carries no trigger".to_string())
      }
      ExecutionStatus::Suspended => self.all_triggers().iter().try_for_each(|t| t.validate()),
      status if has_single || has_many => Err(format!("{} result carries triggers", status)),
      _ => Ok(()),
    }
  }

  /// `{trigger} ∪ triggers`, deduplicated by value; first occurrence wins and
  /// order is preserved.
  pub fn all_triggers(&self) -> Vec<ResumeTrigger> {
    let mut out: Vec<ResumeTrigger> = Vec::new();
    let candidates = self
      .trigger
      .iter()
      .chain(self.triggers.iter().flatten());
    for t in candidates {
      if !out.contains(t) {
        out.push(t.clone());
      }
    }
    out
  }
}
