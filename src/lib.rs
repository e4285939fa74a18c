//! # resumable-runtime
//!
//! Suspend/resume execution runtime. A workload ([ExecutionDelegate]) may
//! finish, fail, or *suspend* on one or more resume triggers. The
//! [ResumableRuntime] materializes those triggers through a
//! [TriggerManager], persists the execution context in a [StateStore], and
//! returns. A later invocation, usually in another process, resumes the
//! workload with the stored cursor and the answer delivered to the trigger.
//!
//! ## Architecture
//!
//! The runtime sits inside a chain of wrappers built by [RuntimeFactory]:
//!
//! ```text
//! QuotaLayer -> TelemetryLayer -> DebugLayer -> ResumableRuntime -> delegate
//! ```
//!
//! Every wrapper implements [ExecutionDelegate] itself, so optional layers
//! can be left out without changing the others.
//!
//! Set `RUST_LOG=resumable_runtime=debug` to see state transitions.

pub mod config;
#[cfg(test)]
mod config_test;
pub mod delegate;
pub mod error;
pub mod factory;
pub mod layers;
pub mod runtime;
pub mod store;
pub mod suspension;
#[cfg(test)]
mod suspension_test;
#[cfg(test)]
mod testing;
pub mod trigger_manager;
#[cfg(test)]
mod trigger_manager_test;
pub mod types;

pub use config::RuntimeConfig;
pub use delegate::{DelegateCapabilities, EventStream, ExecutionDelegate};
pub use error::{RuntimeError, StoreError, TriggerError};
pub use factory::{ExecutionChain, LayerKind, RuntimeFactory};
pub use runtime::{ContextRetention, ResumableRuntime, ResumeReadiness};
pub use store::{FileStateStore, MemoryStateStore, SqliteStateStore, StateStore};
pub use suspension::{DetectorRegistry, SuspensionDetector};
pub use trigger_manager::{MemoryTriggerManager, TriggerManager};
pub use types::{
  ExecutionEvent, ExecutionResult, ExecutionStatus, Payload, ResumeTrigger, RuntimeOptions,
  TriggerType,
};
