//! Cross-cutting layers wrapped around the resumable runtime.
//!
//! Each layer implements [ExecutionDelegate] over an inner delegate, so any
//! of them can be left out of a chain without affecting the others.

mod debug;
mod quota;
mod telemetry;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::delegate::ExecutionDelegate;
use crate::error::RuntimeError;

pub use debug::{DebugBridge, DebugLayer, TracingDebugBridge};
pub use quota::{ExecutionBudget, QuotaDecision, QuotaLayer, QuotaPolicy};
pub use telemetry::TelemetryLayer;

/// Forwards `dispose` to `inner` the first time only.
pub(crate) async fn dispose_once(
  disposed: &AtomicBool,
  inner: &dyn ExecutionDelegate,
) -> Result<(), RuntimeError> {
  if disposed.swap(true, Ordering::SeqCst) {
    return Ok(());
  }
  inner.dispose().await
}
