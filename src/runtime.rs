//! Resumable runtime: wraps a delegate, persists suspensions and restores them
//! on a later resume call, possibly in a different process.
//!
//! - Fresh call: run the delegate. A suspended result has every trigger
//!   materialized through the [TriggerManager] in order, then the execution
//!   context is written in one store operation. No trigger failure leaves a
//!   half-registered suspension behind.
//! - Resume call: load the context (absent means NOT_FOUND, never a fresh run),
//!   hand the stored cursor and the caller's payload to the delegate.
//!
//! The runtime never waits or polls; a suspended result is returned and the
//! hosting process is free to exit.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, instrument, warn};

use crate::delegate::{DelegateCapabilities, EventStream, ExecutionDelegate};
use crate::error::RuntimeError;
use crate::store::StateStore;
use crate::suspension::{PassthroughDetector, SuspensionDetector};
use crate::trigger_manager::{TriggerManager, TriggerReadout};
use crate::types::{
  ExecutionEvent, ExecutionResult, ExecutionSchema, ExecutionStatus, Payload,
  PersistedExecutionContext, ResumeTrigger, RuntimeOptions, RuntimeState,
};

/// Store namespace of the live execution context.
pub const RESUME_CONTEXT_NAMESPACE: &str = "resume_context";
/// Store namespace contexts move to after terminal success (with [ContextRetention::Archive]).
pub const RESUME_CONTEXT_ARCHIVE_NAMESPACE: &str = "resume_context_archive";
/// Key of the context document inside its namespace.
pub const CONTEXT_KEY: &str = "context";

/// What happens to the persisted context once a resumed execution succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextRetention {
  /// Move it to [RESUME_CONTEXT_ARCHIVE_NAMESPACE].
  #[default]
  Archive,
  Delete,
}

/// Whether every trigger of the latest suspension has been answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeReadiness {
  /// Payload to resume with: a single trigger's answer as-is, several keyed by
  /// external reference id.
  Ready(Value),
  Pending { waiting_on: Vec<String> },
}

enum Prepared {
  Run {
    options: RuntimeOptions,
    context: Option<PersistedExecutionContext>,
  },
  Faulted(ExecutionResult),
}

/// Moves the runtime to TERMINAL if a call is dropped while still busy.
struct BusyGuard<'a> {
  runtime: &'a ResumableRuntime,
  armed: bool,
}

impl<'a> BusyGuard<'a> {
  fn new(runtime: &'a ResumableRuntime) -> Self {
    Self {
      runtime,
      armed: true,
    }
  }

  /// The call never entered the runtime; the busy state, if any, is not ours.
  fn disarm(&mut self) {
    self.armed = false;
  }
}

impl Drop for BusyGuard<'_> {
  fn drop(&mut self) {
    if self.armed && self.runtime.state().is_busy() {
      warn!(execution_id = %self.runtime.execution_id, "call dropped before completion");
      self.runtime.terminate();
    }
  }
}

/// Resumable runtime wrapping one delegate for one execution id.
pub struct ResumableRuntime {
  delegate: Arc<dyn ExecutionDelegate>,
  store: Arc<dyn StateStore>,
  triggers: Arc<dyn TriggerManager>,
  detector: Arc<dyn SuspensionDetector>,
  execution_id: String,
  retention: ContextRetention,
  state: Mutex<RuntimeState>,
  disposed: AtomicBool,
}

impl ResumableRuntime {
  pub fn new(
    delegate: Arc<dyn ExecutionDelegate>,
    store: Arc<dyn StateStore>,
    triggers: Arc<dyn TriggerManager>,
    execution_id: impl Into<String>,
  ) -> Self {
    Self {
      delegate,
      store,
      triggers,
      detector: Arc::new(PassthroughDetector),
      execution_id: execution_id.into(),
      retention: ContextRetention::default(),
      state: Mutex::new(RuntimeState::NotStarted),
      disposed: AtomicBool::new(false),
    }
  }

  pub fn with_detector(mut self, detector: Arc<dyn SuspensionDetector>) -> Self {
    self.detector = detector;
    self
  }

  pub fn with_retention(mut self, retention: ContextRetention) -> Self {
    self.retention = retention;
    self
  }

  pub fn execution_id(&self) -> &str {
    &self.execution_id
  }

  pub fn state(&self) -> RuntimeState {
    *self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Enters a call. Rejects re-entry while another call is in flight.
  fn begin(&self, next: RuntimeState) -> Result<(), RuntimeError> {
    let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
    if state.is_busy() || !state.can_transition_to(next) {
      return Err(RuntimeError::InvalidState {
        from: *state,
        to: next,
      });
    }
    debug!(execution_id = %self.execution_id, from = %*state, to = %next, "state transition");
    *state = next;
    Ok(())
  }

  fn transition(&self, next: RuntimeState) -> Result<(), RuntimeError> {
    let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
    if !state.can_transition_to(next) {
      return Err(RuntimeError::InvalidState {
        from: *state,
        to: next,
      });
    }
    debug!(execution_id = %self.execution_id, from = %*state, to = %next, "state transition");
    *state = next;
    Ok(())
  }

  fn terminate(&self) {
    *self.state.lock().unwrap_or_else(PoisonError::into_inner) = RuntimeState::Terminal;
  }

  fn fault(&self, err: RuntimeError) -> ExecutionResult {
    self.terminate();
    warn!(execution_id = %self.execution_id, code = err.code(), error = %err, "execution faulted");
    ExecutionResult::faulted(err.to_structured())
  }

  fn persistence_error(&self, source: crate::error::StoreError) -> RuntimeError {
    RuntimeError::Persistence {
      execution_id: self.execution_id.clone(),
      source,
    }
  }

  /// Reads the persisted context for this execution id.
  pub async fn load_context(&self) -> Result<Option<PersistedExecutionContext>, RuntimeError> {
    let value = self
      .store
      .get_value(&self.execution_id, RESUME_CONTEXT_NAMESPACE, CONTEXT_KEY)
      .await
      .map_err(|e| self.persistence_error(e))?;
    Ok(value.map(serde_json::from_value).transpose()?)
  }

  async fn save_context(&self, context: &PersistedExecutionContext) -> Result<(), RuntimeError> {
    let value = serde_json::to_value(context)?;
    self
      .store
      .set_value(&self.execution_id, RESUME_CONTEXT_NAMESPACE, CONTEXT_KEY, value)
      .await
      .map_err(|e| self.persistence_error(e))
  }

  /// Archives or deletes the context after terminal success.
  #[instrument(level = "trace", skip_all, fields(execution_id = %self.execution_id))]
  async fn retire_context(&self, context: &PersistedExecutionContext) {
    let outcome: Result<(), RuntimeError> = async {
      if self.retention == ContextRetention::Archive {
        let value = serde_json::to_value(context)?;
        self
          .store
          .set_value(
            &self.execution_id,
            RESUME_CONTEXT_ARCHIVE_NAMESPACE,
            CONTEXT_KEY,
            value,
          )
          .await
          .map_err(|e| self.persistence_error(e))?;
      }
      self
        .store
        .delete_value(&self.execution_id, RESUME_CONTEXT_NAMESPACE, CONTEXT_KEY)
        .await
        .map_err(|e| self.persistence_error(e))
    }
    .await;
    match outcome {
      Ok(()) => debug!(retention = ?self.retention, "execution context retired"),
      Err(e) => warn!(error = %e, "could not retire execution context; a later resume may replay"),
    }
  }

  /// A fresh run succeeded; an earlier suspension of this id must not be
  /// resumable any more.
  async fn retire_stale_context(&self) {
    match self.load_context().await {
      Ok(Some(stale)) => {
        info!(execution_id = %self.execution_id, "retiring context of an earlier suspension");
        self.retire_context(&stale).await;
      }
      Ok(None) => {}
      Err(e) => warn!(execution_id = %self.execution_id, error = %e, "could not check for an earlier context"),
    }
  }

  /// Validates options and moves into RUNNING, loading the context for resumes.
  async fn prepare(&self, options: RuntimeOptions) -> Result<Prepared, RuntimeError> {
    options.validate().map_err(RuntimeError::Validation)?;

    if !options.resume {
      self.begin(RuntimeState::Running)?;
      info!(execution_id = %self.execution_id, "starting execution");
      return Ok(Prepared::Run {
        options: RuntimeOptions {
          resume_cursor: None,
          ..options
        },
        context: None,
      });
    }

    self.begin(RuntimeState::Resuming)?;
    let context = match self.load_context().await {
      Ok(Some(context)) => context,
      Ok(None) => {
        return Ok(Prepared::Faulted(self.fault(RuntimeError::NotFound {
          execution_id: self.execution_id.clone(),
        })));
      }
      Err(e) => return Ok(Prepared::Faulted(self.fault(e))),
    };
    self.transition(RuntimeState::Running)?;
    info!(
      execution_id = %self.execution_id,
      batch = context.latest_batch(),
      "resuming execution"
    );
    Ok(Prepared::Run {
      options: RuntimeOptions {
        resume: true,
        resume_payload: options.resume_payload,
        resume_cursor: context.resume_cursor.clone(),
      },
      context: Some(context),
    })
  }

  /// Delegate raised instead of returning a result.
  fn delegate_failed(&self, err: RuntimeError) -> Result<ExecutionResult, RuntimeError> {
    if err.is_validation() {
      self.terminate();
      return Err(err);
    }
    Ok(self.fault(err))
  }

  /// Post-processes the delegate's terminal result.
  async fn complete(
    &self,
    result: ExecutionResult,
    context: Option<PersistedExecutionContext>,
  ) -> ExecutionResult {
    let result = match self.detector.translate(result) {
      Ok(result) => result,
      Err(e) => return self.fault(e),
    };
    match result.status {
      ExecutionStatus::Suspended => self.suspend(result, context).await,
      ExecutionStatus::Successful => {
        self.terminate();
        match context {
          Some(context) => self.retire_context(&context).await,
          None => self.retire_stale_context().await,
        }
        info!(execution_id = %self.execution_id, "execution completed");
        result
      }
      ExecutionStatus::Faulted => {
        self.terminate();
        warn!(
          execution_id = %self.execution_id,
          code = result.error_code().unwrap_or("unknown"),
          "delegate reported a fault"
        );
        result
      }
    }
  }

  /// Materializes every trigger, then persists. Returns `result` unchanged on success.
  async fn suspend(
    &self,
    result: ExecutionResult,
    context: Option<PersistedExecutionContext>,
  ) -> ExecutionResult {
    if let Err(reason) = result.validate() {
      return self.fault(RuntimeError::InvalidResult(reason));
    }

    let mut created: Vec<(ResumeTrigger, String)> = Vec::new();
    for (index, trigger) in result.all_triggers().into_iter().enumerate() {
      match self.triggers.create_trigger(&trigger).await {
        Ok(record) => created.push((trigger, record.reference_id)),
        Err(source) => {
          let orphaned: Vec<&str> = created.iter().map(|(_, r)| r.as_str()).collect();
          warn!(
            execution_id = %self.execution_id,
            index,
            orphaned = ?orphaned,
            "trigger creation failed; suspension not persisted"
          );
          return self.fault(RuntimeError::TriggerCreation {
            index,
            trigger_name: trigger.display_name().to_string(),
            source,
          });
        }
      }
    }

    let references: Vec<String> = created.iter().map(|(_, r)| r.clone()).collect();
    let mut context =
      context.unwrap_or_else(|| PersistedExecutionContext::new(self.execution_id.clone()));
    context.record_suspension(created, result.resume_cursor.clone());

    if let Err(e) = self.save_context(&context).await {
      error!(
        execution_id = %self.execution_id,
        references = ?references,
        error = %e,
        "reconciliation gap: triggers were created but the execution context was not stored"
      );
      return self.fault(e);
    }

    if let Err(e) = self.transition(RuntimeState::Suspended) {
      return self.fault(e);
    }
    info!(
      execution_id = %self.execution_id,
      batch = context.latest_batch(),
      triggers = references.len(),
      "execution suspended"
    );
    result
  }

  /// Reads every trigger of the latest suspension back from the trigger
  /// manager. Hosts call this to build the resume payload; nothing polls on
  /// its own.
  pub async fn collect_resume_payload(&self) -> Result<ResumeReadiness, RuntimeError> {
    let context = self
      .load_context()
      .await?
      .ok_or_else(|| RuntimeError::NotFound {
        execution_id: self.execution_id.clone(),
      })?;

    let mut answers = Vec::new();
    let mut waiting_on = Vec::new();
    for record in context.latest_records() {
      let reference_id = &record.external_reference_id;
      let readout = self
        .triggers
        .read_trigger(reference_id)
        .await
        .map_err(|source| RuntimeError::TriggerRead {
          reference_id: reference_id.clone(),
          source,
        })?;
      match readout {
        TriggerReadout::Ready(answer) => answers.push((reference_id.clone(), answer)),
        TriggerReadout::NotReady => waiting_on.push(reference_id.clone()),
      }
    }

    if !waiting_on.is_empty() {
      return Ok(ResumeReadiness::Pending { waiting_on });
    }
    if answers.len() == 1 {
      let (_, answer) = answers.remove(0);
      return Ok(ResumeReadiness::Ready(answer));
    }
    Ok(ResumeReadiness::Ready(Value::Object(
      answers.into_iter().collect(),
    )))
  }
}

#[async_trait]
impl ExecutionDelegate for ResumableRuntime {
  async fn execute(
    &self,
    input: Payload,
    options: RuntimeOptions,
  ) -> Result<ExecutionResult, RuntimeError> {
    let mut guard = BusyGuard::new(self);
    let prepared = match self.prepare(options).await {
      Ok(prepared) => prepared,
      Err(e) => {
        guard.disarm();
        return Err(e);
      }
    };
    let (options, context) = match prepared {
      Prepared::Run { options, context } => (options, context),
      Prepared::Faulted(result) => return Ok(result),
    };
    let result = match self.delegate.execute(input, options).await {
      Ok(result) => result,
      Err(e) => return self.delegate_failed(e),
    };
    Ok(self.complete(result, context).await)
  }

  /// Dropping the stream before its `Result` event leaves the runtime
  /// TERMINAL; the persisted context is untouched and can still be resumed.
  fn stream(&self, input: Payload, options: RuntimeOptions) -> EventStream<'_> {
    Box::pin(async_stream::stream! {
      let mut guard = BusyGuard::new(self);
      let prepared = match self.prepare(options).await {
        Ok(prepared) => prepared,
        Err(e) => {
          guard.disarm();
          yield Err(e);
          return;
        }
      };
      let (options, mut context) = match prepared {
        Prepared::Run { options, context } => (options, context),
        Prepared::Faulted(result) => {
          yield Ok(ExecutionEvent::Result(result));
          return;
        }
      };

      let mut inner = self.delegate.stream(input, options);
      while let Some(event) = inner.next().await {
        match event {
          Ok(ExecutionEvent::Result(result)) => {
            let result = self.complete(result, context.take()).await;
            yield Ok(ExecutionEvent::Result(result));
            return;
          }
          Ok(progress) => {
            yield Ok(progress);
          }
          Err(e) => {
            yield self.delegate_failed(e).map(ExecutionEvent::Result);
            return;
          }
        }
      }
      let missing = RuntimeError::InvalidResult("event stream ended without a result".to_string());
      yield Ok(ExecutionEvent::Result(self.fault(missing)));
    })
  }

  async fn get_schema(&self) -> Result<ExecutionSchema, RuntimeError> {
    self.delegate.get_schema().await
  }

  async fn dispose(&self) -> Result<(), RuntimeError> {
    if self.disposed.swap(true, Ordering::SeqCst) {
      return Ok(());
    }
    self.delegate.dispose().await
  }

  fn capabilities(&self) -> DelegateCapabilities {
    self.delegate.capabilities()
  }
}
