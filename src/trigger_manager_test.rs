//! Tests for `MemoryTriggerManager`.

use serde_json::json;

use crate::error::TriggerError;
use crate::trigger_manager::{MemoryTriggerManager, TriggerManager, TriggerReadout};
use crate::types::{ResumeTrigger, TriggerType};

#[tokio::test]
async fn create_assigns_unique_references() {
  let manager = MemoryTriggerManager::new();
  let a = manager
    .create_trigger(&ResumeTrigger::new(TriggerType::Task, "a"))
    .await
    .unwrap();
  let b = manager
    .create_trigger(&ResumeTrigger::new(TriggerType::Job, "b").with_folder_path("Shared"))
    .await
    .unwrap();
  assert_ne!(a.reference_id, b.reference_id);
  assert_eq!(b.trigger_type, TriggerType::Job);
  assert_eq!(b.folder_path.as_deref(), Some("Shared"));
  let names: Vec<_> = manager
    .created()
    .await
    .into_iter()
    .map(|r| r.trigger_name)
    .collect();
  assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn item_key_is_kept_when_supplied() {
  let manager = MemoryTriggerManager::new();
  let r = manager
    .create_trigger(&ResumeTrigger::new(TriggerType::Api, "inbox").with_item_key("inbox-7"))
    .await
    .unwrap();
  assert_eq!(r.item_key.as_deref(), Some("inbox-7"));
}

#[tokio::test]
async fn read_reports_not_ready_until_delivered() {
  let manager = MemoryTriggerManager::new();
  let r = manager
    .create_trigger(&ResumeTrigger::new(TriggerType::Task, "approve"))
    .await
    .unwrap();
  assert_eq!(
    manager.read_trigger(&r.reference_id).await.unwrap(),
    TriggerReadout::NotReady
  );
  manager
    .deliver(&r.reference_id, json!({"answer": "yes"}))
    .await
    .unwrap();
  assert_eq!(
    manager.read_trigger(&r.reference_id).await.unwrap(),
    TriggerReadout::Ready(json!({"answer": "yes"}))
  );
}

#[tokio::test]
async fn unknown_reference_is_an_error() {
  let manager = MemoryTriggerManager::new();
  assert!(matches!(
    manager.read_trigger("missing").await,
    Err(TriggerError::UnknownReference(_))
  ));
  assert!(manager.deliver("missing", json!(null)).await.is_err());
}
