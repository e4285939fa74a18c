//! Tests for `ResumeTrigger`.

use serde_json::json;

use super::{Payload, ResumeTrigger, TriggerType, UNNAMED_TRIGGER};

fn payload(v: serde_json::Value) -> Payload {
  v.as_object().cloned().unwrap()
}

#[test]
fn builder_sets_optional_fields() {
  let t = ResumeTrigger::new(TriggerType::Job, "nightly-export")
    .with_item_key("job-42")
    .with_folder_path("Shared/Finance")
    .with_payload(payload(json!({"release": "export"})));
  assert_eq!(t.item_key.as_deref(), Some("job-42"));
  assert_eq!(t.folder_path.as_deref(), Some("Shared/Finance"));
  assert_eq!(t.payload.get("release"), Some(&json!("export")));
  assert!(t.validate().is_ok());
}

#[test]
fn serializes_wire_shape_and_skips_absent_fields() {
  let t = ResumeTrigger::new(TriggerType::Task, "approval")
    .with_payload(payload(json!({"question": "approve?"})));
  let v = serde_json::to_value(&t).unwrap();
  assert_eq!(v["trigger_type"], "TASK");
  assert_eq!(v["trigger_name"], "approval");
  assert_eq!(v["payload"]["question"], "approve?");
  assert!(v.get("item_key").is_none());
  assert!(v.get("folder_path").is_none());
}

#[test]
fn deserializes_without_payload() {
  let t: ResumeTrigger =
    serde_json::from_value(json!({"trigger_type": "API", "trigger_name": "inbox"})).unwrap();
  assert_eq!(t.trigger_type, TriggerType::Api);
  assert!(t.payload.is_empty());
}

#[test]
fn name_is_optional() {
  let t: ResumeTrigger = serde_json::from_value(json!({
    "trigger_type": "TASK",
    "payload": {"question": "approve?"}
  }))
  .unwrap();
  assert_eq!(t.trigger_name, "");
  assert_eq!(t.display_name(), UNNAMED_TRIGGER);
  assert!(t.validate().is_ok());
  assert!(ResumeTrigger::new(TriggerType::Task, "  ").validate().is_ok());
}

#[test]
fn blank_item_key_error_names_unnamed_trigger() {
  let t = ResumeTrigger::new(TriggerType::Job, "").with_item_key(" ");
  assert!(t.validate().unwrap_err().contains(UNNAMED_TRIGGER));
}

#[test]
fn blank_item_key_is_rejected() {
  let t = ResumeTrigger::new(TriggerType::Job, "j").with_item_key("");
  assert!(t.validate().unwrap_err().contains("item_key"));
}

#[test]
fn folder_path_with_empty_segment_is_rejected() {
  for bad in ["", "/Shared", "Shared/", "Shared//Finance"] {
    let t = ResumeTrigger::new(TriggerType::Job, "j").with_folder_path(bad);
    assert!(t.validate().is_err(), "{bad:?} should be rejected");
  }
}

#[test]
fn equal_triggers_compare_equal() {
  let a = ResumeTrigger::new(TriggerType::Api, "x").with_item_key("k");
  let b = a.clone();
  assert_eq!(a, b);
  assert_ne!(a, ResumeTrigger::new(TriggerType::Api, "y"));
}
