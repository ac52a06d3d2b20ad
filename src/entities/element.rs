//! Element entity - top-level framework category grouping processes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A framework element (numbered 1-8 in a typical framework)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier
    pub id: EntityId,

    /// Sequence number, unique across elements and used for ordering
    pub element_number: u32,

    /// Element title
    pub title: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the element is in use
    #[serde(default = "default_active")]
    pub active: bool,

    /// Names of other elements this one enables. Free text, not validated
    /// against existing elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    enabling_elements: Vec<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this element)
    pub author: String,
}

fn default_active() -> bool {
    true
}

impl Entity for Element {
    const PREFIX: EntityPrefix = EntityPrefix::Elem;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Element {
    /// Create a new active element
    pub fn new(element_number: u32, title: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Elem),
            element_number,
            title,
            description: None,
            active: true,
            enabling_elements: Vec::new(),
            created: Utc::now(),
            author,
        }
    }

    /// Labels of the elements this element enables
    pub fn enabling_elements(&self) -> &[String] {
        &self.enabling_elements
    }

    /// Replace the enabling element labels, dropping blanks and duplicates
    pub fn set_enabling_elements<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into().trim().to_string();
            if !label.is_empty() && !cleaned.contains(&label) {
                cleaned.push(label);
            }
        }
        self.enabling_elements = cleaned;
    }

    /// Display label, e.g. "1. Leadership"
    pub fn label(&self) -> String {
        format!("{}. {}", self.element_number, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_creation() {
        let elem = Element::new(1, "Leadership".to_string(), "test".to_string());
        assert!(elem.id.to_string().starts_with("ELEM-"));
        assert!(elem.active);
        assert_eq!(elem.label(), "1. Leadership");
    }

    #[test]
    fn test_enabling_elements_are_cleaned() {
        let mut elem = Element::new(2, "People".to_string(), "test".to_string());
        elem.set_enabling_elements(["Leadership", " ", "Leadership", "Safety "]);
        assert_eq!(elem.enabling_elements(), &["Leadership", "Safety"]);
    }

    #[test]
    fn test_element_yaml_defaults() {
        let id = EntityId::new(EntityPrefix::Elem);
        let yaml = format!(
            "id: {}\nelement_number: 3\ntitle: Risk\ncreated: 2024-01-01T00:00:00Z\nauthor: qa\n",
            id
        );
        let elem: Element = serde_yml::from_str(&yaml).unwrap();
        assert!(elem.active);
        assert!(elem.enabling_elements().is_empty());
        assert_eq!(elem.element_number, 3);
    }
}
