//! Opaque delegate-defined position to continue from.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque delegate-defined position to continue from.
///
/// Stored as raw bytes and serialized as base64 text, so whatever the delegate
/// hands over at suspension comes back unchanged on resume.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResumeCursor(Bytes);

impl ResumeCursor {
  pub fn new(bytes: impl Into<Bytes>) -> Self {
    Self(bytes.into())
  }

  /// Encodes a serializable value as the cursor bytes (JSON).
  pub fn from_json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
    serde_json::to_vec(value).map(|v| Self(Bytes::from(v)))
  }

  /// Decodes cursor bytes previously produced by [ResumeCursor::from_json].
  pub fn to_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
    serde_json::from_slice(&self.0)
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
}

impl Serialize for ResumeCursor {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(&self.0))
  }
}

impl<'de> Deserialize<'de> for ResumeCursor {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let text = String::deserialize(deserializer)?;
    STANDARD
      .decode(text.as_bytes())
      .map(|v| Self(Bytes::from(v)))
      .map_err(serde::de::Error::custom)
  }
}
