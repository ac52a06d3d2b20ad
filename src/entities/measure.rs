//! Performance measure (KPI) entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, ScorecardCategory};
use crate::core::identity::{EntityId, EntityPrefix};

/// A quantified indicator attached to a process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMeasure {
    pub id: EntityId,

    /// Owning process
    pub process_id: EntityId,

    /// Optional strategic goal this measure supports. Cleared, not
    /// cascaded, when the goal is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_goal_id: Option<EntityId>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,

    /// Where the data comes from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// How often the measure is reported (e.g. "Monthly")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorecard_category: Option<ScorecardCategory>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Entity for PerformanceMeasure {
    const PREFIX: EntityPrefix = EntityPrefix::Kpi;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl PerformanceMeasure {
    pub fn new(process_id: EntityId, name: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Kpi),
            process_id,
            strategic_goal_id: None,
            name,
            formula: None,
            source: None,
            frequency: None,
            target: None,
            scorecard_category: None,
            created: Utc::now(),
            author,
        }
    }

    pub fn with_category(mut self, category: ScorecardCategory) -> Self {
        self.scorecard_category = Some(category);
        self
    }

    pub fn with_goal(mut self, goal_id: EntityId) -> Self {
        self.strategic_goal_id = Some(goal_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_round_trip_keeps_unknown_category() {
        let m = PerformanceMeasure::new(
            EntityId::new(EntityPrefix::Proc),
            "Energy use".to_string(),
            "test".to_string(),
        )
        .with_category(ScorecardCategory::Other("Sustainability".to_string()));

        let yaml = serde_yml::to_string(&m).unwrap();
        assert!(yaml.contains("scorecard_category: Sustainability"));
        let parsed: PerformanceMeasure = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.scorecard_category, m.scorecard_category);
        assert!(parsed.strategic_goal_id.is_none());
    }
}
