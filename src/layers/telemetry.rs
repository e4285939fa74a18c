//! Tracing span and OpenTelemetry metrics per invocation.
//!
//! Sits outside the resumable runtime so it observes the clean boundary: a
//! suspended result is reported as suspended, the later resume as its own
//! invocation.

use async_trait::async_trait;
use futures::StreamExt;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use tracing::{Instrument, Span, field, info, info_span};

use super::dispose_once;
use crate::delegate::{DelegateCapabilities, EventStream, ExecutionDelegate};
use crate::error::RuntimeError;
use crate::types::{ExecutionEvent, ExecutionResult, ExecutionSchema, Payload, RuntimeOptions};

/// Meter name used for every instrument.
pub const METER_NAME: &str = "resumable-runtime";

struct Instruments {
  executions: Counter<u64>,
  triggers_created: Counter<u64>,
  duration: Histogram<f64>,
}

impl Instruments {
  fn new() -> Self {
    let meter = opentelemetry::global::meter(METER_NAME);
    Self {
      executions: meter
        .u64_counter("runtime.executions")
        .with_description("Invocations by final status")
        .build(),
      triggers_created: meter
        .u64_counter("runtime.triggers.created")
        .with_description("Resume triggers reported by suspended invocations")
        .build(),
      duration: meter
        .f64_histogram("runtime.execution.duration")
        .with_unit("s")
        .build(),
    }
  }
}

/// Wraps each invocation in an `execution` span and records metrics.
pub struct TelemetryLayer {
  inner: Arc<dyn ExecutionDelegate>,
  execution_id: String,
  instruments: Instruments,
  disposed: AtomicBool,
}

impl TelemetryLayer {
  pub fn new(inner: Arc<dyn ExecutionDelegate>, execution_id: impl Into<String>) -> Self {
    Self {
      inner,
      execution_id: execution_id.into(),
      instruments: Instruments::new(),
      disposed: AtomicBool::new(false),
    }
  }

  fn span(&self, options: &RuntimeOptions) -> Span {
    info_span!(
      "execution",
      execution_id = %self.execution_id,
      resume = options.resume,
      status = field::Empty,
    )
  }

  fn record(&self, span: &Span, outcome: Result<&ExecutionResult, &RuntimeError>, started: Instant, resume: bool) {
    let status = match outcome {
      Ok(result) => result.status.as_str(),
      Err(_) => "error",
    };
    span.record("status", status);
    let attributes = [
      KeyValue::new("status", status),
      KeyValue::new("resume", resume),
    ];
    self.instruments.executions.add(1, &attributes);
    self
      .instruments
      .duration
      .record(started.elapsed().as_secs_f64(), &attributes);
    if let Ok(result) = outcome
      && result.is_suspended()
    {
      let count = result.all_triggers().len() as u64;
      self.instruments.triggers_created.add(count, &[]);
    }
    span.in_scope(|| info!(status, "execution finished"));
  }
}

#[async_trait]
impl ExecutionDelegate for TelemetryLayer {
  async fn execute(
    &self,
    input: Payload,
    options: RuntimeOptions,
  ) -> Result<ExecutionResult, RuntimeError> {
    let span = self.span(&options);
    let resume = options.resume;
    let started = Instant::now();
    let result = self
      .inner
      .execute(input, options)
      .instrument(span.clone())
      .await;
    self.record(&span, result.as_ref(), started, resume);
    result
  }

  fn stream(&self, input: Payload, options: RuntimeOptions) -> EventStream<'_> {
    Box::pin(async_stream::stream! {
      let span = self.span(&options);
      let resume = options.resume;
      let started = Instant::now();
      let mut inner = self.inner.stream(input, options);
      while let Some(event) = inner.next().instrument(span.clone()).await {
        match &event {
          Ok(ExecutionEvent::Result(result)) => self.record(&span, Ok(result), started, resume),
          Err(e) => self.record(&span, Err(e), started, resume),
          Ok(ExecutionEvent::Progress { .. }) => {}
        }
        yield event;
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
