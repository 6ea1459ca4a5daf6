use serde::{Deserialize, Serialize};

/// Recognized workflow configuration options.
///
/// Projects attach arbitrary configuration to workflows; unrecognized keys
/// are ignored on load. Everything here is defaulted so a bare `{}` (or a
/// missing `configuration` block) is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfiguration {
  /// Id of the tutorial attached to this workflow. Presence means the
  /// workflow has a tutorial that first-time users must see.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tutorial: Option<String>,

  /// Whether the subject viewer allows pan and zoom.
  #[serde(default)]
  pub pan_and_zoom: bool,

  /// Whether the workflow opts into the swipe-to-answer presentation.
  #[serde(default)]
  pub swipe_enabled: bool,
}
