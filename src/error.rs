//! Error taxonomy for the runtime, its store and its trigger manager.
//!
//! Only validation problems surface as `Err` to the caller; everything else is
//! folded into a faulted [ExecutionResult](crate::types::ExecutionResult) via
//! [RuntimeError::to_structured].

use thiserror::Error;

use crate::types::{ErrorCategory, RuntimeState, StructuredError};

/// Failure of a [StateStore](crate::store::StateStore) operation.
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("store I/O failed: {0}")]
  Io(#[from] std::io::Error),

  #[error("stored value is not valid JSON: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Execution id or namespace cannot be used as a storage key.
  #[error("invalid store key '{0}'")]
  InvalidKey(String),

  #[error("store unavailable: {0}")]
  Unavailable(String),
}

/// Failure reported by a [TriggerManager](crate::trigger_manager::TriggerManager).
#[derive(Error, Debug)]
pub enum TriggerError {
  /// The external service refused the trigger payload.
  #[error("trigger rejected: {0}")]
  Rejected(String),

  #[error("trigger service unavailable: {0}")]
  Unavailable(String),

  #[error("no trigger with reference '{0}'")]
  UnknownReference(String),
}

/// Errors raised anywhere along the execution chain.
#[derive(Error, Debug)]
pub enum RuntimeError {
  /// Malformed options or configuration. Never retried.
  #[error("validation failed: {0}")]
  Validation(String),

  /// Entering the runtime from a state that does not allow it.
  #[error("cannot move from {from} to {to}")]
  InvalidState { from: RuntimeState, to: RuntimeState },

  /// Resume requested for an execution id that never suspended.
  #[error("no suspended execution found for '{execution_id}'")]
  NotFound { execution_id: String },

  /// The trigger manager failed while materializing a suspension batch.
  #[error("creating trigger {index} ('{trigger_name}') failed: {source}")]
  TriggerCreation {
    index: usize,
    trigger_name: String,
    #[source]
    source: TriggerError,
  },

  /// Reading a trigger answer back failed.
  #[error("reading trigger '{reference_id}' failed: {source}")]
  TriggerRead {
    reference_id: String,
    #[source]
    source: TriggerError,
  },

  /// The store failed while saving or loading execution context.
  #[error("persisting context for '{execution_id}' failed: {source}")]
  Persistence {
    execution_id: String,
    #[source]
    source: StoreError,
  },

  /// The delegate returned a result violating the execution contract.
  #[error("delegate returned an invalid result: {0}")]
  InvalidResult(String),

  /// A quota or licensing policy refused the execution.
  #[error("execution rejected: {0}")]
  QuotaExceeded(String),

  /// Error raised inside the delegate itself.
  #[error("delegate error: {0}")]
  Delegate(String),

  #[error("serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl RuntimeError {
  /// Stable machine-readable code.
  pub fn code(&self) -> &'static str {
    match self {
      RuntimeError::Validation(_) => "VALIDATION_ERROR",
      RuntimeError::InvalidState { .. } => "INVALID_STATE",
      RuntimeError::NotFound { .. } => "NOT_FOUND",
      RuntimeError::TriggerCreation { .. } => "TRIGGER_CREATION_FAILED",
      RuntimeError::TriggerRead { .. } => "TRIGGER_READ_FAILED",
      RuntimeError::Persistence { .. } => "PERSISTENCE_FAILED",
      RuntimeError::InvalidResult(_) => "INVALID_RESULT",
      RuntimeError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
      RuntimeError::Delegate(_) => "DELEGATE_ERROR",
      RuntimeError::Serialization(_) => "SERIALIZATION_ERROR",
    }
  }

  pub fn category(&self) -> ErrorCategory {
    match self {
      RuntimeError::Validation(_)
      | RuntimeError::InvalidState { .. }
      | RuntimeError::NotFound { .. }
      | RuntimeError::QuotaExceeded(_) => ErrorCategory::User,
      RuntimeError::TriggerCreation { .. }
      | RuntimeError::TriggerRead { .. }
      | RuntimeError::Persistence { .. }
      | RuntimeError::Serialization(_) => ErrorCategory::System,
      RuntimeError::InvalidResult(_) | RuntimeError::Delegate(_) => ErrorCategory::Unknown,
    }
  }

  fn title(&self) -> &'static str {
    match self {
      RuntimeError::Validation(_) => "Invalid execution options",
      RuntimeError::InvalidState { .. } => "Execution already in progress",
      RuntimeError::NotFound { .. } => "No suspended execution found",
      RuntimeError::TriggerCreation { .. } => "Failed to create resume trigger",
      RuntimeError::TriggerRead { .. } => "Failed to read resume trigger",
      RuntimeError::Persistence { .. } => "Failed to persist execution context",
      RuntimeError::InvalidResult(_) => "Invalid execution result",
      RuntimeError::QuotaExceeded(_) => "Execution quota exceeded",
      RuntimeError::Delegate(_) => "Execution failed",
      RuntimeError::Serialization(_) => "Serialization failed",
    }
  }

  /// Converts into the payload of a faulted result.
  pub fn to_structured(&self) -> StructuredError {
    StructuredError::new(self.code(), self.title(), self.to_string(), self.category())
  }

  /// True for errors that surface as `Err` instead of a faulted result.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      RuntimeError::Validation(_) | RuntimeError::InvalidState { .. }
    )
  }
}
