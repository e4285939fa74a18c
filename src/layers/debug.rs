//! Interactive debugging: mirror events to a bridge and let it answer
//! suspensions in place.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{debug, info};

use super::dispose_once;
use crate::delegate::{DelegateCapabilities, EventStream, ExecutionDelegate};
use crate::error::RuntimeError;
use crate::types::{ExecutionEvent, ExecutionResult, ExecutionSchema, Payload, RuntimeOptions};

/// Default cap on in-place resumes per invocation.
pub const DEFAULT_MAX_INTERACTIVE_RESUMES: u32 = 16;

/// Debugger side of the [DebugLayer].
#[async_trait]
pub trait DebugBridge: Send + Sync {
  async fn on_started(&self, _execution_id: &str, _resume: bool) {}

  async fn on_event(&self, _event: &ExecutionEvent) {}

  /// Called when the execution suspends. `Some(payload)` resumes it right away
  /// with that payload; `None` lets the suspension stand.
  async fn on_suspended(&self, result: &ExecutionResult) -> Option<Value>;

  async fn on_finished(&self, _result: &ExecutionResult) {}

  /// Called instead of `on_finished` when the chain returns an error.
  async fn on_error(&self, _error: &RuntimeError) {}
}

/// Logs everything through `tracing` and never answers a suspension.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDebugBridge;

#[async_trait]
impl DebugBridge for TracingDebugBridge {
  async fn on_started(&self, execution_id: &str, resume: bool) {
    debug!(execution_id, resume, "debug: started");
  }

  async fn on_event(&self, event: &ExecutionEvent) {
    debug!(?event, "debug: event");
  }

  async fn on_suspended(&self, result: &ExecutionResult) -> Option<Value> {
    debug!(triggers = ?result.all_triggers(), "debug: suspended");
    None
  }

  async fn on_finished(&self, result: &ExecutionResult) {
    debug!(status = %result.status, "debug: finished");
  }

  async fn on_error(&self, error: &RuntimeError) {
    debug!(code = error.code(), error = %error, "debug: error");
  }
}

/// Mirrors the execution to a [DebugBridge] and resumes in-process when the
/// bridge answers a suspension.
pub struct DebugLayer {
  inner: Arc<dyn ExecutionDelegate>,
  bridge: Arc<dyn DebugBridge>,
  execution_id: String,
  max_interactive_resumes: u32,
  disposed: AtomicBool,
}

impl DebugLayer {
  pub fn new(
    inner: Arc<dyn ExecutionDelegate>,
    bridge: Arc<dyn DebugBridge>,
    execution_id: impl Into<String>,
  ) -> Self {
    Self {
      inner,
      bridge,
      execution_id: execution_id.into(),
      max_interactive_resumes: DEFAULT_MAX_INTERACTIVE_RESUMES,
      disposed: AtomicBool::new(false),
    }
  }

  pub fn with_max_interactive_resumes(mut self, max: u32) -> Self {
    self.max_interactive_resumes = max;
    self
  }

  async fn run_inner(
    &self,
    input: Payload,
    options: RuntimeOptions,
  ) -> Result<ExecutionResult, RuntimeError> {
    let result = self.inner.execute(input, options).await;
    if let Err(e) = &result {
      self.bridge.on_error(e).await;
    }
    result
  }

  /// Resume options when the bridge answers, `None` when the result stands.
  async fn answer(&self, result: &ExecutionResult, resumes: u32) -> Option<RuntimeOptions> {
    if !result.is_suspended() || resumes >= self.max_interactive_resumes {
      return None;
    }
    let payload = self.bridge.on_suspended(result).await?;
    info!(execution_id = %self.execution_id, resumes = resumes + 1, "debug bridge resumed execution");
    Some(RuntimeOptions::resume_with(payload))
  }
}

#[async_trait]
impl ExecutionDelegate for DebugLayer {
  async fn execute(
    &self,
    input: Payload,
    options: RuntimeOptions,
  ) -> Result<ExecutionResult, RuntimeError> {
    self.bridge.on_started(&self.execution_id, options.resume).await;
    let mut result = self.run_inner(input.clone(), options).await?;
    let mut resumes = 0;
    while let Some(resume) = self.answer(&result, resumes).await {
      resumes += 1;
      result = self.run_inner(input.clone(), resume).await?;
    }
    self.bridge.on_finished(&result).await;
    Ok(result)
  }

  fn stream(&self, input: Payload, options: RuntimeOptions) -> EventStream<'_> {
    Box::pin(async_stream::stream! {
      self.bridge.on_started(&self.execution_id, options.resume).await;
      let mut options = options;
      let mut resumes = 0;
      loop {
        let mut inner = self.inner.stream(input.clone(), options);
        let mut last = None;
        while let Some(event) = inner.next().await {
          match event {
            Ok(ExecutionEvent::Result(result)) => {
              last = Some(result);
              break;
            }
            Ok(event) => {
              self.bridge.on_event(&event).await;
              yield Ok(event);
            }
            Err(e) => {
              self.bridge.on_error(&e).await;
              yield Err(e);
              return;
            }
          }
        }
        let Some(result) = last else {
          return;
        };
        if let Some(resume) = self.answer(&result, resumes).await {
          resumes += 1;
          options = resume;
          continue;
        }
        self.bridge.on_finished(&result).await;
        yield Ok(ExecutionEvent::Result(result));
        return;
      }
    })
  }

  async fn get_schema(&self) -> Result<ExecutionSchema, RuntimeError> {
    self.inner.get_schema().await
  }

  async fn dispose(&self) -> Result<(), RuntimeError> {
    dispose_once(&self.disposed, self.inner.as_ref()).await
  }

  fn capabilities(&self) -> DelegateCapabilities {
    self.inner.capabilities()
  }
}
