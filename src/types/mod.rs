//! Value types crossing the execution contract.
//!
//! Everything here is framework-agnostic: no engine object references, only
//! JSON payloads and opaque byte cursors.

mod execution_event;
mod execution_result;
#[cfg(test)]
mod execution_result_test;
mod execution_status;
mod persisted_context;
mod resume_cursor;
mod resume_trigger;
#[cfg(test)]
mod resume_trigger_test;
mod runtime_options;
mod runtime_state;
#[cfg(test)]
mod runtime_state_test;
mod schema;
mod structured_error;
mod trigger_type;

pub use execution_event::ExecutionEvent;
pub use execution_result::ExecutionResult;
pub use execution_status::ExecutionStatus;
pub use persisted_context::{PersistedExecutionContext, TriggerRecord};
pub use resume_cursor::ResumeCursor;
pub use resume_trigger::{ResumeTrigger, UNNAMED_TRIGGER};
pub use runtime_options::RuntimeOptions;
pub use runtime_state::RuntimeState;
pub use schema::ExecutionSchema;
pub use structured_error::{ErrorCategory, StructuredError};
pub use trigger_type::TriggerType;

/// JSON object used for inputs, outputs and trigger payloads.
pub type Payload = serde_json::Map<String, serde_json::Value>;
