//! Quota / licensing gate. Sits outermost so a rejection happens before any
//! span is opened or trigger created.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::info;

use super::dispose_once;
use crate::delegate::{DelegateCapabilities, EventStream, ExecutionDelegate};
use crate::error::RuntimeError;
use crate::types::{ExecutionEvent, ExecutionResult, ExecutionSchema, Payload, RuntimeOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
  Allow,
  Reject(String),
}

/// Decides whether an invocation may run at all.
#[async_trait]
pub trait QuotaPolicy: Send + Sync {
  async fn check(
    &self,
    execution_id: &str,
    options: &RuntimeOptions,
  ) -> Result<QuotaDecision, RuntimeError>;
}

/// Allows a fixed number of fresh runs. Resumes continue work that was
/// already admitted and are not counted.
#[derive(Debug)]
pub struct ExecutionBudget {
  limit: u64,
  remaining: AtomicU64,
}

impl ExecutionBudget {
  pub fn new(limit: u64) -> Self {
    Self {
      limit,
      remaining: AtomicU64::new(limit),
    }
  }

  pub fn remaining(&self) -> u64 {
    self.remaining.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl QuotaPolicy for ExecutionBudget {
  async fn check(
    &self,
    _execution_id: &str,
    options: &RuntimeOptions,
  ) -> Result<QuotaDecision, RuntimeError> {
    if options.resume {
      return Ok(QuotaDecision::Allow);
    }
    let taken = self
      .remaining
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    Ok(match taken {
      Ok(_) => QuotaDecision::Allow,
      Err(_) => QuotaDecision::Reject(format!("execution budget of {} exhausted", self.limit)),
    })
  }
}

/// Rejects invocations refused by a [QuotaPolicy] with a faulted
/// `QUOTA_EXCEEDED` result.
pub struct QuotaLayer {
  inner: Arc<dyn ExecutionDelegate>,
  policy: Arc<dyn QuotaPolicy>,
  execution_id: String,
  disposed: AtomicBool,
}

impl QuotaLayer {
  pub fn new(
    inner: Arc<dyn ExecutionDelegate>,
    policy: Arc<dyn QuotaPolicy>,
    execution_id: impl Into<String>,
  ) -> Self {
    Self {
      inner,
      policy,
      execution_id: execution_id.into(),
      disposed: AtomicBool::new(false),
    }
  }

  /// Malformed options are rejected before the policy can count the call.
  async fn admit(&self, options: &RuntimeOptions) -> Result<Option<ExecutionResult>, RuntimeError> {
    options.validate().map_err(RuntimeError::Validation)?;
    match self.policy.check(&self.execution_id, options).await? {
      QuotaDecision::Allow => Ok(None),
      QuotaDecision::Reject(reason) => {
        info!(execution_id = %self.execution_id, reason = %reason, "execution rejected by quota");
        Ok(Some(ExecutionResult::faulted(
          RuntimeError::QuotaExceeded(reason).to_structured(),
        )))
      }
    }
  }
}

#[async_trait]
impl ExecutionDelegate for QuotaLayer {
  async fn execute(
    &self,
    input: Payload,
    options: RuntimeOptions,
  ) -> Result<ExecutionResult, RuntimeError> {
    if let Some(rejected) = self.admit(&options).await? {
      return Ok(rejected);
    }
    self.inner.execute(input, options).await
  }

  fn stream(&self, input: Payload, options: RuntimeOptions) -> EventStream<'_> {
    Box::pin(async_stream::stream! {
      match self.admit(&options).await {
        Err(e) => {
          yield Err(e);
        }
        Ok(Some(rejected)) => {
          yield Ok(ExecutionEvent::Result(rejected));
        }
        Ok(None) => {
          let mut inner = self.inner.stream(input, options);
          while let Some(event) = inner.next().await {
            yield event;
          }
        }
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
