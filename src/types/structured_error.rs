//! Error payload carried by faulted results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is expected to act on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
  /// Bad input or options; fix the call.
  User,
  /// Infrastructure failure (store, trigger service).
  System,
  #[default]
  Unknown,
}

/// Error payload carried by faulted results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
  /// Stable machine-readable code, e.g. `NOT_FOUND`.
  pub code: String,
  pub title: String,
  pub detail: String,
  #[serde(default)]
  pub category: ErrorCategory,
}

impl StructuredError {
  pub fn new(
    code: impl Into<String>,
    title: impl Into<String>,
    detail: impl Into<String>,
    category: ErrorCategory,
  ) -> Self {
    Self {
      code: code.into(),
      title: title.into(),
      detail: detail.into(),
      category,
    }
  }
}

impl fmt::Display for StructuredError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {} ({})", self.code, self.title, self.detail)
  }
}
