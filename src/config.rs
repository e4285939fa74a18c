//! Per-invocation configuration resolved once from the host environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `RESUMABLE_EXECUTION_ID` | execution id | `RESUMABLE_JOB_ID`, else a new UUID (fresh runs only) |
//! | `RESUMABLE_RESUME` | resume instead of a fresh run | off |
//! | `RESUMABLE_RESUME_PAYLOAD` | JSON answer to the pending trigger(s) | none |
//! | `RESUMABLE_TELEMETRY` | include the telemetry layer | on |
//! | `RESUMABLE_DEBUG` | include the debug layer | off |
//! | `RESUMABLE_STATE_DIR` | root of the file state store | `.resumable` |
//!
//! Flags accept `1|true|yes|on` and `0|false|no|off`, case-insensitively.

use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

use crate::error::RuntimeError;
use crate::store::{DEFAULT_STATE_DIR, FileStateStore};
use crate::types::RuntimeOptions;

pub const ENV_EXECUTION_ID: &str = "RESUMABLE_EXECUTION_ID";
pub const ENV_JOB_ID: &str = "RESUMABLE_JOB_ID";
pub const ENV_RESUME: &str = "RESUMABLE_RESUME";
pub const ENV_RESUME_PAYLOAD: &str = "RESUMABLE_RESUME_PAYLOAD";
pub const ENV_TELEMETRY: &str = "RESUMABLE_TELEMETRY";
pub const ENV_DEBUG: &str = "RESUMABLE_DEBUG";
pub const ENV_STATE_DIR: &str = "RESUMABLE_STATE_DIR";

/// Configuration for one invocation. Layers receive these values explicitly
/// and never read the environment themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
  pub execution_id: String,
  pub resume: bool,
  pub resume_payload: Option<Value>,
  pub telemetry: bool,
  pub debug: bool,
  pub state_dir: PathBuf,
}

impl RuntimeConfig {
  /// Fresh-run configuration with the default layers.
  pub fn new(execution_id: impl Into<String>) -> Self {
    Self {
      execution_id: execution_id.into(),
      resume: false,
      resume_payload: None,
      telemetry: true,
      debug: false,
      state_dir: PathBuf::from(DEFAULT_STATE_DIR),
    }
  }

  pub fn from_env() -> Result<Self, RuntimeError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Resolves the configuration from `lookup`. Empty values count as unset.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let resume = get(ENV_RESUME)
      .map(|v| parse_flag(ENV_RESUME, &v))
      .transpose()?
      .unwrap_or(false);
    let resume_payload = get(ENV_RESUME_PAYLOAD)
      .map(|raw| {
        serde_json::from_str::<Value>(&raw).map_err(|e| {
          RuntimeError::Validation(format!("{ENV_RESUME_PAYLOAD} is not valid JSON: {e}"))
        })
      })
      .transpose()?;

    let execution_id = match get(ENV_EXECUTION_ID).or_else(|| get(ENV_JOB_ID)) {
      Some(id) => id,
      None if resume => {
        return Err(RuntimeError::Validation(format!(
          "{ENV_RESUME} is set but neither {ENV_EXECUTION_ID} nor {ENV_JOB_ID} names the execution"
        )));
      }
      None => uuid::Uuid::new_v4().to_string(),
    };

    let config = Self {
      execution_id,
      resume,
      resume_payload,
      telemetry: get(ENV_TELEMETRY)
        .map(|v| parse_flag(ENV_TELEMETRY, &v))
        .transpose()?
        .unwrap_or(true),
      debug: get(ENV_DEBUG)
        .map(|v| parse_flag(ENV_DEBUG, &v))
        .transpose()?
        .unwrap_or(false),
      state_dir: get(ENV_STATE_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR)),
    };
    config.options().validate().map_err(RuntimeError::Validation)?;
    debug!(
      execution_id = %config.execution_id,
      resume = config.resume,
      telemetry = config.telemetry,
      debug = config.debug,
      state_dir = %config.state_dir.display(),
      "runtime configuration resolved"
    );
    Ok(config)
  }

  /// Switches this configuration to a resume with `payload`.
  pub fn resuming(mut self, payload: Value) -> Self {
    self.resume = true;
    self.resume_payload = Some(payload);
    self
  }

  pub fn with_telemetry(mut self, enabled: bool) -> Self {
    self.telemetry = enabled;
    self
  }

  pub fn with_debug(mut self, enabled: bool) -> Self {
    self.debug = enabled;
    self
  }

  /// Options to invoke the execution chain with.
  pub fn options(&self) -> RuntimeOptions {
    RuntimeOptions {
      resume: self.resume,
      resume_payload: self.resume_payload.clone(),
      resume_cursor: None,
    }
  }

  /// File store rooted at [RuntimeConfig::state_dir].
  pub fn file_store(&self) -> FileStateStore {
    FileStateStore::new(self.state_dir.clone())
  }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, RuntimeError> {
  match value.to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    other => Err(RuntimeError::Validation(format!(
      "{key} must be a boolean flag, got '{other}'"
    ))),
  }
}
