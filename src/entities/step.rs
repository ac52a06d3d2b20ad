//! Step entity - ordered unit of work within a process, plus decision outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, StepType};
use crate::core::identity::{EntityId, EntityPrefix};

/// A single step of a process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: EntityId,

    /// Owning process
    pub process_id: EntityId,

    /// Render order within the process; not guaranteed contiguous or unique
    pub step_number: u32,

    #[serde(default, rename = "type")]
    pub step_type: StepType,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Role or person accountable for the step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibility: Option<String>,

    /// Document or system referenced by the step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Entity for Step {
    const PREFIX: EntityPrefix = EntityPrefix::Step;

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

impl Step {
    pub fn new(
        process_id: EntityId,
        step_number: u32,
        step_type: StepType,
        title: String,
        author: String,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Step),
            process_id,
            step_number,
            step_type,
            title,
            description: None,
            responsibility: None,
            reference: None,
            created: Utc::now(),
            author,
        }
    }
}

/// A labelled edge leaving a decision step
///
/// The target is a step number within the same process and is resolved
/// when the flow is built, never stored as a reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub id: EntityId,

    pub process_id: EntityId,

    /// Decision step the edge starts from
    pub from_step_id: EntityId,

    /// Step number the edge leads to
    pub to_step_number: u32,

    /// Edge label, e.g. "Yes" / "No"
    pub label: String,

    /// Lower values are listed first
    #[serde(default)]
    pub priority: u32,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Entity for Outcome {
    const PREFIX: EntityPrefix = EntityPrefix::Out;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.label
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Outcome {
    pub fn new(from: &Step, to_step_number: u32, label: String, priority: u32, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Out),
            process_id: from.process_id.clone(),
            from_step_id: from.id.clone(),
            to_step_number,
            label,
            priority,
            created: Utc::now(),
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_type_serialized_as_type() {
        let step = Step::new(
            EntityId::new(EntityPrefix::Proc),
            3,
            StepType::Decision,
            "Approved?".to_string(),
            "test".to_string(),
        );
        let yaml = serde_yml::to_string(&step).unwrap();
        assert!(yaml.contains("type: decision"));

        let parsed: Step = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.step_number, 3);
        assert_eq!(parsed.step_type, StepType::Decision);
    }

    #[test]
    fn test_outcome_inherits_process() {
        let step = Step::new(
            EntityId::new(EntityPrefix::Proc),
            1,
            StepType::Decision,
            "Check".to_string(),
            "test".to_string(),
        );
        let outcome = Outcome::new(&step, 4, "No".to_string(), 1, "test".to_string());
        assert_eq!(outcome.process_id, step.process_id);
        assert_eq!(outcome.from_step_id, step.id);
        assert!(outcome.id.to_string().starts_with("OUT-"));
    }
}
