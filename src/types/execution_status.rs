//! Status carried by every execution result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status carried by every execution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Successful,
  Faulted,
  Suspended,
}

impl ExecutionStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExecutionStatus::Successful => "successful",
      ExecutionStatus::Faulted => "faulted",
      ExecutionStatus::Suspended => "suspended",
    }
  }

  /// True for successful and faulted; a suspended execution continues later.
  pub fn is_terminal(&self) -> bool {
    !matches!(self, ExecutionStatus::Suspended)
  }
}

impl fmt::Display for ExecutionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
