//! Tests for `ExecutionResult`.

use proptest::prelude::*;
use serde_json::json;

use super::{
  ErrorCategory, ExecutionResult, ExecutionStatus, Payload, ResumeCursor, ResumeTrigger,
  StructuredError, TriggerType,
};

fn task(name: &str) -> ResumeTrigger {
  ResumeTrigger::new(TriggerType::Task, name)
}

#[test]
fn successful_has_no_triggers() {
  let r = ExecutionResult::successful(Payload::new());
  assert_eq!(r.status, ExecutionStatus::Successful);
  assert!(r.validate().is_ok());
  assert!(r.all_triggers().is_empty());
}

#[test]
fn faulted_carries_error_code() {
  let r = ExecutionResult::faulted(StructuredError::new(
    "DELEGATE_ERROR",
    "boom",
    "detail",
    ErrorCategory::System,
  ));
  assert!(r.is_faulted());
  assert_eq!(r.error_code(), Some("DELEGATE_ERROR"));
}

#[test]
fn suspended_single_is_valid() {
  let r = ExecutionResult::suspended(task("approve"));
  assert!(r.is_suspended());
  assert!(r.validate().is_ok());
  assert_eq!(r.all_triggers(), vec![task("approve")]);
}

#[test]
fn suspended_with_both_fields_is_invalid() {
  let mut r = ExecutionResult::suspended(task("a"));
  r.triggers = Some(vec![task("b")]);
  assert!(r.validate().unwrap_err().contains("both"));
}

#[test]
fn suspended_with_empty_list_is_invalid() {
  let r = ExecutionResult::suspended_on(vec![]);
  assert!(r.validate().unwrap_err().contains("no trigger"));
}

#[test]
fn successful_with_trigger_is_invalid() {
  let mut r = ExecutionResult::successful(Payload::new());
  r.trigger = Some(task("x"));
  assert!(r.validate().is_err());
}

#[test]
fn suspended_with_malformed_trigger_is_invalid() {
  let r = ExecutionResult::suspended(task("a").with_folder_path("Shared//x"));
  assert!(r.validate().is_err());
}

#[test]
fn all_triggers_deduplicates_keeping_first() {
  let mut r = ExecutionResult::suspended(task("a"));
  r.triggers = Some(vec![task("b"), task("a"), task("c"), task("b")]);
  let names: Vec<_> = r
    .all_triggers()
    .into_iter()
    .map(|t| t.trigger_name)
    .collect();
  assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn wire_shape_omits_absent_fields() {
  let r = ExecutionResult::suspended(
    task("approve").with_payload(json!({"question": "approve?"}).as_object().cloned().unwrap()),
  )
  .with_cursor(ResumeCursor::new(b"c1".to_vec()));
  let v = serde_json::to_value(&r).unwrap();
  assert_eq!(v["status"], "suspended");
  assert_eq!(v["trigger"]["trigger_type"], "TASK");
  assert!(v.get("triggers").is_none());
  assert!(v.get("output").is_none());
  let back: ExecutionResult = serde_json::from_value(v).unwrap();
  assert_eq!(back, r);
}

proptest! {
  #[test]
  fn all_triggers_preserves_first_seen_order(names in prop::collection::vec(0u8..6, 1..12)) {
    let triggers: Vec<ResumeTrigger> = names.iter().map(|n| task(&format!("t{n}"))).collect();
    let r = ExecutionResult::suspended_on(triggers);
    let got: Vec<String> = r.all_triggers().into_iter().map(|t| t.trigger_name).collect();

    let mut expected: Vec<String> = Vec::new();
    for n in &names {
      let name = format!("t{n}");
      if !expected.contains(&name) {
        expected.push(name);
      }
    }
    prop_assert_eq!(got, expected);
  }
}
