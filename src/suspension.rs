//! Engine-specific suspension detection.
//!
//! Each execution engine signals "I am waiting on something" in its own way. A
//! [SuspensionDetector] translates that signal into a framework-agnostic
//! suspended [ExecutionResult]. The factory selects one per engine from a
//! [DetectorRegistry]; the runtime only ever calls the trait.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::RuntimeError;
use crate::types::{ExecutionResult, ExecutionStatus, ResumeCursor, ResumeTrigger};

/// Output key holding one trigger object or a list of them.
pub const INTERRUPT_KEY: &str = "__interrupt__";
/// Output key holding the engine's continuation state.
pub const CURSOR_KEY: &str = "__cursor__";

/// Detect and translate an engine's suspension signal.
pub trait SuspensionDetector: Send + Sync {
  fn name(&self) -> &str;

  /// Returns the result unchanged unless it encodes an engine-specific
  /// suspension, in which case the suspended equivalent is returned.
  fn translate(&self, result: ExecutionResult) -> Result<ExecutionResult, RuntimeError>;
}

/// For delegates that already report suspended results themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughDetector;

impl SuspensionDetector for PassthroughDetector {
  fn name(&self) -> &str {
    "passthrough"
  }

  fn translate(&self, result: ExecutionResult) -> Result<ExecutionResult, RuntimeError> {
    Ok(result)
  }
}

/// For engines that finish "successfully" with an interrupt marker in their
/// output (`__interrupt__`, optionally with `__cursor__`).
#[derive(Debug, Default, Clone, Copy)]
pub struct InterruptMarkerDetector;

impl SuspensionDetector for InterruptMarkerDetector {
  fn name(&self) -> &str {
    "interrupt-marker"
  }

  #[instrument(level = "trace", skip(self, result))]
  fn translate(&self, mut result: ExecutionResult) -> Result<ExecutionResult, RuntimeError> {
    if result.status != ExecutionStatus::Successful {
      return Ok(result);
    }
    let Some(mut output) = result.output.take() else {
      return Ok(result);
    };
    let Some(marker) = output.remove(INTERRUPT_KEY) else {
      result.output = Some(output);
      return Ok(result);
    };

    let mut suspended = if marker.is_array() {
      let triggers: Vec<ResumeTrigger> = serde_json::from_value(marker)
        .map_err(|e| RuntimeError::InvalidResult(format!("malformed {}: {}", INTERRUPT_KEY, e)))?;
      ExecutionResult::suspended_on(triggers)
    } else {
      let trigger: ResumeTrigger = serde_json::from_value(marker)
        .map_err(|e| RuntimeError::InvalidResult(format!("malformed {}: {}", INTERRUPT_KEY, e)))?;
      ExecutionResult::suspended(trigger)
    };
    if let Some(cursor) = output.remove(CURSOR_KEY) {
      suspended.resume_cursor = Some(ResumeCursor::from_json(&cursor)?);
    } else {
      suspended.resume_cursor = result.resume_cursor;
    }
    if !output.is_empty() {
      suspended.output = Some(output);
    }
    debug!(triggers = suspended.all_triggers().len(), "interrupt marker translated");
    Ok(suspended)
  }
}

/// Detectors keyed by engine name, with a fallback for unknown engines.
#[derive(Clone)]
pub struct DetectorRegistry {
  detectors: HashMap<String, Arc<dyn SuspensionDetector>>,
  fallback: Arc<dyn SuspensionDetector>,
}

impl Default for DetectorRegistry {
  fn default() -> Self {
    Self {
      detectors: HashMap::new(),
      fallback: Arc::new(PassthroughDetector),
    }
  }
}

impl DetectorRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(mut self, engine: impl Into<String>, detector: Arc<dyn SuspensionDetector>) -> Self {
    self.detectors.insert(engine.into(), detector);
    self
  }

  /// Detector for `engine`, or the fallback when none is registered.
  pub fn select(&self, engine: Option<&str>) -> Arc<dyn SuspensionDetector> {
    engine
      .and_then(|e| self.detectors.get(e))
      .cloned()
      .unwrap_or_else(|| self.fallback.clone())
  }
}
