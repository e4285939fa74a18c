//! Tests for configuration resolution.

use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;

fn resolve(vars: &[(&str, &str)]) -> Result<RuntimeConfig, RuntimeError> {
  let vars: HashMap<String, String> = vars
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
  RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_for_fresh_run() {
  let config = resolve(&[]).unwrap();
  assert!(!config.resume);
  assert!(config.telemetry);
  assert!(!config.debug);
  assert_eq!(config.state_dir, PathBuf::from(".resumable"));
  assert!(uuid::Uuid::parse_str(&config.execution_id).is_ok());
}

#[test]
fn explicit_id_wins_over_job_id() {
  let config = resolve(&[
    ("RESUMABLE_EXECUTION_ID", "E1"),
    ("RESUMABLE_JOB_ID", "J9"),
  ])
  .unwrap();
  assert_eq!(config.execution_id, "E1");

  let config = resolve(&[("RESUMABLE_JOB_ID", "J9")]).unwrap();
  assert_eq!(config.execution_id, "J9");
}

#[test]
fn resume_reads_payload() {
  let config = resolve(&[
    ("RESUMABLE_JOB_ID", "E1"),
    ("RESUMABLE_RESUME", "Yes"),
    ("RESUMABLE_RESUME_PAYLOAD", r#"{"answer":"yes"}"#),
  ])
  .unwrap();
  let options = config.options();
  assert!(options.resume);
  assert_eq!(options.resume_payload, Some(json!({"answer": "yes"})));
  assert_eq!(options.resume_cursor, None);
}

#[test]
fn resume_requires_an_execution_id() {
  let err = resolve(&[
    ("RESUMABLE_RESUME", "1"),
    ("RESUMABLE_RESUME_PAYLOAD", "true"),
  ])
  .unwrap_err();
  assert!(matches!(err, RuntimeError::Validation(_)));
}

#[test]
fn resume_requires_a_payload() {
  let err = resolve(&[("RESUMABLE_JOB_ID", "E1"), ("RESUMABLE_RESUME", "true")]).unwrap_err();
  assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn malformed_values_are_rejected() {
  assert!(resolve(&[("RESUMABLE_DEBUG", "maybe")]).is_err());
  assert!(
    resolve(&[
      ("RESUMABLE_JOB_ID", "E1"),
      ("RESUMABLE_RESUME", "1"),
      ("RESUMABLE_RESUME_PAYLOAD", "{not json"),
    ])
    .is_err()
  );
}

#[test]
fn blank_values_count_as_unset() {
  let config = resolve(&[("RESUMABLE_TELEMETRY", "  "), ("RESUMABLE_STATE_DIR", "")]).unwrap();
  assert!(config.telemetry);
  assert_eq!(config.state_dir, PathBuf::from(".resumable"));
}

#[test]
fn flags_and_state_dir() {
  let config = resolve(&[
    ("RESUMABLE_TELEMETRY", "off"),
    ("RESUMABLE_DEBUG", "ON"),
    ("RESUMABLE_STATE_DIR", "/var/lib/runs"),
  ])
  .unwrap();
  assert!(!config.telemetry);
  assert!(config.debug);
  assert_eq!(config.file_store().root(), PathBuf::from("/var/lib/runs").as_path());
}

#[test]
fn builder_switches_to_resume() {
  let config = RuntimeConfig::new("E1").resuming(json!(1)).with_debug(true);
  assert!(config.options().validate().is_ok());
  assert!(config.debug);
}
