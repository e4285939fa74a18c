//! Shared test doubles.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::delegate::{DelegateCapabilities, EventStream, ExecutionDelegate};
use crate::error::{RuntimeError, StoreError, TriggerError};
use crate::store::{MemoryStateStore, StateStore};
use crate::trigger_manager::{
  ExternalTriggerRecord, MemoryTriggerManager, TriggerManager, TriggerReadout,
};
use crate::types::{ExecutionEvent, ExecutionResult, Payload, ResumeTrigger, RuntimeOptions};

pub(crate) fn payload(value: Value) -> Payload {
  value.as_object().cloned().unwrap()
}

/// Delegate that replays a fixed list of outcomes, one per call, and records
/// the options it was invoked with.
#[derive(Default)]
pub(crate) struct ScriptedDelegate {
  script: Mutex<VecDeque<Result<ExecutionResult, RuntimeError>>>,
  progress: Vec<String>,
  calls: Mutex<Vec<(Payload, RuntimeOptions)>>,
  disposals: AtomicUsize,
  capabilities: DelegateCapabilities,
}

impl ScriptedDelegate {
  pub(crate) fn new(script: Vec<Result<ExecutionResult, RuntimeError>>) -> Self {
    Self {
      script: Mutex::new(script.into()),
      ..Self::default()
    }
  }

  pub(crate) fn returning(results: Vec<ExecutionResult>) -> Self {
    Self::new(results.into_iter().map(Ok).collect())
  }

  /// Progress events emitted by `stream` before each result.
  pub(crate) fn with_progress(mut self, names: &[&str]) -> Self {
    self.progress = names.iter().map(|n| n.to_string()).collect();
    self
  }

  pub(crate) fn with_capabilities(mut self, capabilities: DelegateCapabilities) -> Self {
    self.capabilities = capabilities;
    self
  }

  pub(crate) fn calls(&self) -> Vec<(Payload, RuntimeOptions)> {
    self.calls.lock().unwrap().clone()
  }

  pub(crate) fn disposals(&self) -> usize {
    self.disposals.load(Ordering::SeqCst)
  }

  fn next(&self, input: Payload, options: RuntimeOptions) -> Result<ExecutionResult, RuntimeError> {
    self.calls.lock().unwrap().push((input, options));
    self
      .script
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err(RuntimeError::Delegate("script exhausted".to_string())))
  }
}

#[async_trait]
impl ExecutionDelegate for ScriptedDelegate {
  async fn execute(
    &self,
    input: Payload,
    options: RuntimeOptions,
  ) -> Result<ExecutionResult, RuntimeError> {
    self.next(input, options)
  }

  fn stream(&self, input: Payload, options: RuntimeOptions) -> EventStream<'_> {
    let progress = self.progress.clone();
    let outcome = self.next(input, options);
    Box::pin(async_stream::stream! {
      for (step, name) in progress.into_iter().enumerate() {
        yield Ok(ExecutionEvent::progress(name, serde_json::json!({ "step": step })));
      }
      yield outcome.map(ExecutionEvent::Result);
    })
  }

  async fn dispose(&self) -> Result<(), RuntimeError> {
    self.disposals.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }

  fn capabilities(&self) -> DelegateCapabilities {
    self.capabilities.clone()
  }
}

/// Memory store whose writes can be switched off.
#[derive(Default)]
pub(crate) struct FailingStore {
  pub(crate) inner: MemoryStateStore,
  fail_writes: AtomicBool,
}

impl FailingStore {
  pub(crate) fn failing_writes() -> Self {
    let store = Self::default();
    store.fail_writes.store(true, Ordering::SeqCst);
    store
  }

  pub(crate) fn set_failing(&self, failing: bool) {
    self.fail_writes.store(failing, Ordering::SeqCst);
  }
}

#[async_trait]
impl StateStore for FailingStore {
  async fn set_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
    value: Value,
  ) -> Result<(), StoreError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("disk full".to_string()));
    }
    self.inner.set_value(execution_id, namespace, key, value).await
  }

  async fn get_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
  ) -> Result<Option<Value>, StoreError> {
    self.inner.get_value(execution_id, namespace, key).await
  }

  async fn delete_value(
    &self,
    execution_id: &str,
    namespace: &str,
    key: &str,
  ) -> Result<(), StoreError> {
    self.inner.delete_value(execution_id, namespace, key).await
  }
}

/// Trigger manager that rejects the trigger with the given name.
pub(crate) struct FailingTriggerManager {
  pub(crate) inner: MemoryTriggerManager,
  reject_name: String,
}

impl FailingTriggerManager {
  pub(crate) fn rejecting(name: &str) -> Self {
    Self {
      inner: MemoryTriggerManager::new(),
      reject_name: name.to_string(),
    }
  }
}

#[async_trait]
impl TriggerManager for FailingTriggerManager {
  async fn create_trigger(
    &self,
    trigger: &ResumeTrigger,
  ) -> Result<ExternalTriggerRecord, TriggerError> {
    if trigger.trigger_name == self.reject_name {
      return Err(TriggerError::Rejected(format!("{} not allowed", trigger.trigger_name)));
    }
    self.inner.create_trigger(trigger).await
  }

  async fn read_trigger(&self, reference_id: &str) -> Result<TriggerReadout, TriggerError> {
    self.inner.read_trigger(reference_id).await
  }
}
