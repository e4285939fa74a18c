//! Tests for suspension detectors.

use serde_json::json;
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::suspension::{
  DetectorRegistry, InterruptMarkerDetector, PassthroughDetector, SuspensionDetector,
};
use crate::types::{ExecutionResult, Payload, TriggerType};

fn output(v: serde_json::Value) -> Payload {
  v.as_object().cloned().unwrap()
}

#[test]
fn passthrough_keeps_result() {
  let r = ExecutionResult::successful(output(json!({"__interrupt__": {}})));
  let out = PassthroughDetector.translate(r.clone()).unwrap();
  assert_eq!(out, r);
}

#[test]
fn marker_detector_ignores_plain_output() {
  let r = ExecutionResult::successful(output(json!({"answer": 42})));
  let out = InterruptMarkerDetector.translate(r.clone()).unwrap();
  assert_eq!(out, r);
}

#[test]
fn marker_detector_translates_single_trigger() {
  let r = ExecutionResult::successful(output(json!({
    "__interrupt__": {"trigger_type": "TASK", "trigger_name": "approve",
                      "payload": {"question": "approve?"}},
    "__cursor__": {"node": "review"},
    "draft": "v1"
  })));
  let out = InterruptMarkerDetector.translate(r).unwrap();
  assert!(out.is_suspended());
  assert!(out.validate().is_ok());
  let t = out.trigger.as_ref().unwrap();
  assert_eq!(t.trigger_type, TriggerType::Task);
  let cursor: serde_json::Value = out.resume_cursor.as_ref().unwrap().to_json().unwrap();
  assert_eq!(cursor, json!({"node": "review"}));
  assert_eq!(out.output.unwrap().get("draft"), Some(&json!("v1")));
}

#[test]
fn marker_detector_translates_trigger_list() {
  let r = ExecutionResult::successful(output(json!({
    "__interrupt__": [
      {"trigger_type": "JOB", "trigger_name": "a"},
      {"trigger_type": "API", "trigger_name": "b"}
    ]
  })));
  let out = InterruptMarkerDetector.translate(r).unwrap();
  assert_eq!(out.triggers.as_ref().map(Vec::len), Some(2));
  assert!(out.output.is_none());
}

#[test]
fn marker_detector_rejects_malformed_marker() {
  let r = ExecutionResult::successful(output(json!({"__interrupt__": "later"})));
  let err = InterruptMarkerDetector.translate(r).unwrap_err();
  assert!(matches!(err, RuntimeError::InvalidResult(_)));
}

#[test]
fn registry_selects_by_engine_with_fallback() {
  let registry = DetectorRegistry::new().register("graph", Arc::new(InterruptMarkerDetector));
  assert_eq!(registry.select(Some("graph")).name(), "interrupt-marker");
  assert_eq!(registry.select(Some("other")).name(), "passthrough");
  assert_eq!(registry.select(None).name(), "passthrough");
}
