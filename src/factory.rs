//! Assembles the execution chain for one invocation.
//!
//! Order, outermost first: quota, telemetry, debug, resumable runtime, then
//! the workload delegate. Each optional layer is included only when its
//! configuration asks for it, so the chain for a given [RuntimeConfig] is
//! always the same.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::delegate::{DelegateCapabilities, EventStream, ExecutionDelegate};
use crate::error::RuntimeError;
use crate::layers::{
  DebugBridge, DebugLayer, QuotaLayer, QuotaPolicy, TelemetryLayer, TracingDebugBridge,
};
use crate::runtime::{ContextRetention, ResumableRuntime};
use crate::store::StateStore;
use crate::suspension::DetectorRegistry;
use crate::trigger_manager::TriggerManager;
use crate::types::{ExecutionResult, ExecutionSchema, Payload, RuntimeOptions};

/// A layer in an [ExecutionChain].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
  Quota,
  Telemetry,
  Debug,
  Resumable,
}

/// Builds [ExecutionChain]s sharing one store and trigger manager.
pub struct RuntimeFactory {
  store: Arc<dyn StateStore>,
  triggers: Arc<dyn TriggerManager>,
  detectors: DetectorRegistry,
  quota: Option<Arc<dyn QuotaPolicy>>,
  debug_bridge: Arc<dyn DebugBridge>,
  max_interactive_resumes: Option<u32>,
  retention: ContextRetention,
}

impl RuntimeFactory {
  pub fn new(store: Arc<dyn StateStore>, triggers: Arc<dyn TriggerManager>) -> Self {
    Self {
      store,
      triggers,
      detectors: DetectorRegistry::new(),
      quota: None,
      debug_bridge: Arc::new(TracingDebugBridge),
      max_interactive_resumes: None,
      retention: ContextRetention::default(),
    }
  }

  pub fn with_detectors(mut self, detectors: DetectorRegistry) -> Self {
    self.detectors = detectors;
    self
  }

  /// Adds the quota layer.
  pub fn with_quota(mut self, policy: Arc<dyn QuotaPolicy>) -> Self {
    self.quota = Some(policy);
    self
  }

  pub fn with_debug_bridge(mut self, bridge: Arc<dyn DebugBridge>) -> Self {
    self.debug_bridge = bridge;
    self
  }

  pub fn with_max_interactive_resumes(mut self, max: u32) -> Self {
    self.max_interactive_resumes = Some(max);
    self
  }

  pub fn with_retention(mut self, retention: ContextRetention) -> Self {
    self.retention = retention;
    self
  }

  pub fn create(&self, delegate: Arc<dyn ExecutionDelegate>, config: &RuntimeConfig) -> ExecutionChain {
    let execution_id = config.execution_id.as_str();
    let capabilities = delegate.capabilities();
    let detector = self.detectors.select(capabilities.engine.as_deref());

    let runtime = Arc::new(
      ResumableRuntime::new(
        delegate,
        self.store.clone(),
        self.triggers.clone(),
        execution_id,
      )
      .with_detector(detector)
      .with_retention(self.retention),
    );
    let mut outer: Arc<dyn ExecutionDelegate> = runtime.clone();
    let mut layers = vec![LayerKind::Resumable];

    if config.debug {
      if capabilities.debuggable {
        let mut layer = DebugLayer::new(outer, self.debug_bridge.clone(), execution_id);
        if let Some(max) = self.max_interactive_resumes {
          layer = layer.with_max_interactive_resumes(max);
        }
        outer = Arc::new(layer);
        layers.push(LayerKind::Debug);
      } else {
        debug!(execution_id, "debug requested but the delegate is not debuggable");
      }
    }
    if config.telemetry {
      outer = Arc::new(TelemetryLayer::new(outer, execution_id));
      layers.push(LayerKind::Telemetry);
    }
    if let Some(policy) = &self.quota {
      outer = Arc::new(QuotaLayer::new(outer, policy.clone(), execution_id));
      layers.push(LayerKind::Quota);
    }
    layers.reverse();

    info!(execution_id, layers = ?layers, engine = ?capabilities.engine, "execution chain composed");
    ExecutionChain {
      outer,
      runtime,
      layers,
    }
  }
}

/// The composed chain. Invoking it invokes the outermost layer.
pub struct ExecutionChain {
  outer: Arc<dyn ExecutionDelegate>,
  runtime: Arc<ResumableRuntime>,
  layers: Vec<LayerKind>,
}

impl ExecutionChain {
  /// Layers, outermost first.
  pub fn layers(&self) -> &[LayerKind] {
    &self.layers
  }

  /// The resumable runtime inside the chain, for context inspection and
  /// [ResumableRuntime::collect_resume_payload].
  pub fn runtime(&self) -> &ResumableRuntime {
    &self.runtime
  }

  /// Runs with the options described by `config`.
  pub async fn run(
    &self,
    input: Payload,
    config: &RuntimeConfig,
  ) -> Result<ExecutionResult, RuntimeError> {
    self.outer.execute(input, config.options()).await
  }
}

#[async_trait]
impl ExecutionDelegate for ExecutionChain {
  async fn execute(
    &self,
    input: Payload,
    options: RuntimeOptions,
  ) -> Result<ExecutionResult, RuntimeError> {
    self.outer.execute(input, options).await
  }

  fn stream(&self, input: Payload, options: RuntimeOptions) -> EventStream<'_> {
    self.outer.stream(input, options)
  }

  async fn get_schema(&self) -> Result<ExecutionSchema, RuntimeError> {
    self.outer.get_schema().await
  }

  async fn dispose(&self) -> Result<(), RuntimeError> {
    self.outer.dispose().await
  }

  fn capabilities(&self) -> DelegateCapabilities {
    self.outer.capabilities()
  }
}
