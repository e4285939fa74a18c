//! Description of why an execution suspended and what resumes it.

use serde::{Deserialize, Serialize};

use super::{Payload, TriggerType};

/// Name reported for a trigger that was given none.
pub const UNNAMED_TRIGGER: &str = "unknown";

/// Description of why an execution suspended and what resumes it.
///
/// Produced by the delegate at suspension time. The payload is opaque to the
/// runtime; only the trigger manager interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeTrigger {
  pub trigger_type: TriggerType,
  /// Optional label. Blank means unnamed; see [ResumeTrigger::display_name].
  #[serde(default)]
  pub trigger_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub item_key: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub folder_path: Option<String>,
  #[serde(default)]
  pub payload: Payload,
}

impl ResumeTrigger {
  pub fn new(trigger_type: TriggerType, trigger_name: impl Into<String>) -> Self {
    Self {
      trigger_type,
      trigger_name: trigger_name.into(),
      item_key: None,
      folder_path: None,
      payload: Payload::new(),
    }
  }

  pub fn with_item_key(mut self, item_key: impl Into<String>) -> Self {
    self.item_key = Some(item_key.into());
    self
  }

  pub fn with_folder_path(mut self, folder_path: impl Into<String>) -> Self {
    self.folder_path = Some(folder_path.into());
    self
  }

  pub fn with_payload(mut self, payload: Payload) -> Self {
    self.payload = payload;
    self
  }

  /// The trigger name, or [UNNAMED_TRIGGER] when it is blank.
  pub fn display_name(&self) -> &str {
    match self.trigger_name.trim() {
      "" => UNNAMED_TRIGGER,
      name => name,
    }
  }

  /// Checks the fields the trigger manager relies on. Returns a description of the
  /// first problem found. The name is optional.
  pub fn validate(&self) -> Result<(), String> {
    if let Some(key) = &self.item_key
      && key.trim().is_empty()
    {
      return Err(format!("trigger '{}' has a blank item_key", self.display_name()));
    }
    if let Some(path) = &self.folder_path
      && (path.trim().is_empty() || path.split('/').any(|segment| segment.trim().is_empty()))
    {
      return Err(format!(
        "trigger '{}' has a malformed folder_path '{}'",
        self.display_name(),
        path
      ));
    }
    Ok(())
  }
}
