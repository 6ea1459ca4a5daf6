use serde::{Deserialize, Serialize};

/// One reference entry in a project's field guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGuideItem {
  pub title: String,
  pub content: String,
  /// Media reference for the item's icon.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
}

/// Read-only reference material shown alongside classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldGuide {
  #[serde(default)]
  pub items: Vec<FieldGuideItem>,
}

impl FieldGuide {
  /// Look up an item by title.
  pub fn item(&self, title: &str) -> Option<&FieldGuideItem> {
    self.items.iter().find(|item| item.title == title)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_item_lookup() {
    let guide = FieldGuide {
      items: vec![FieldGuideItem {
        title: "Gazelle".to_string(),
        content: "Slender antelope with ringed horns.".to_string(),
        icon: Some("gazelle.jpg".to_string()),
      }],
    };

    assert!(guide.item("Gazelle").is_some());
    assert!(guide.item("Lion").is_none());
  }
}
