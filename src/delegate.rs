//! The execution contract shared by workloads and every wrapping layer.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::RuntimeError;
use crate::types::{ExecutionEvent, ExecutionResult, ExecutionSchema, Payload, RuntimeOptions};

/// Event stream returned by [ExecutionDelegate::stream].
pub type EventStream<'a> =
  Pin<Box<dyn Stream<Item = Result<ExecutionEvent, RuntimeError>> + Send + 'a>>;

/// What a delegate declares about itself; used by the factory to decide which
/// layers to include and which suspension detector to select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegateCapabilities {
  /// Execution engine name, looked up in the
  /// [DetectorRegistry](crate::suspension::DetectorRegistry).
  pub engine: Option<String>,
  /// Whether the debug layer may be attached.
  pub debuggable: bool,
}

/// Uniform execution contract: implemented by the workload and by every layer
/// wrapped around it.
#[async_trait]
pub trait ExecutionDelegate: Send + Sync {
  async fn execute(
    &self,
    input: Payload,
    options: RuntimeOptions,
  ) -> Result<ExecutionResult, RuntimeError>;

  /// Streams progress events, terminated by one `Result` event. The default
  /// runs [ExecutionDelegate::execute] and emits only its result.
  fn stream(&self, input: Payload, options: RuntimeOptions) -> EventStream<'_> {
    Box::pin(async_stream::stream! {
      match self.execute(input, options).await {
        Ok(result) => {
          yield Ok(ExecutionEvent::Result(result));
        }
        Err(e) => {
          yield Err(e);
        }
      }
    })
  }

  async fn get_schema(&self) -> Result<ExecutionSchema, RuntimeError> {
    Ok(ExecutionSchema::default())
  }

  /// Releases resources. Must be idempotent.
  async fn dispose(&self) -> Result<(), RuntimeError>;

  fn capabilities(&self) -> DelegateCapabilities {
    DelegateCapabilities::default()
  }
}
