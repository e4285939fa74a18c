//! Input/output schema exposed by a delegate.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// JSON Schema documents describing a delegate's input and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSchema {
  pub input_schema: Value,
  pub output_schema: Value,
}

impl Default for ExecutionSchema {
  fn default() -> Self {
    Self {
      input_schema: json!({"type": "object"}),
      output_schema: json!({"type": "object"}),
    }
  }
}
