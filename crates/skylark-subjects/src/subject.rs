use serde::{Deserialize, Serialize};

/// Media reference for presenting a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMedia {
  pub src: String,
}

/// The item (image, sound) being classified.
///
/// Subjects are supplied externally; the engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub id: String,
  pub display: DisplayMedia,
  #[serde(default)]
  pub metadata: serde_json::Value,
}
