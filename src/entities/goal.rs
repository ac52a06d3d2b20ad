//! Strategic goal entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Priority, ScorecardCategory};
use crate::core::identity::{EntityId, EntityPrefix};

/// A target/current-value objective in one of the scorecard categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicGoal {
    pub id: EntityId,

    /// Owning element
    pub element_id: EntityId,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,

    /// Unit of the target and current values (e.g. "%", "days")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    pub category: ScorecardCategory,

    #[serde(default)]
    pub priority: Priority,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Entity for StrategicGoal {
    const PREFIX: EntityPrefix = EntityPrefix::Goal;

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

impl StrategicGoal {
    pub fn new(
        element_id: EntityId,
        title: String,
        category: ScorecardCategory,
        author: String,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Goal),
            element_id,
            title,
            description: None,
            target_value: None,
            current_value: None,
            unit: None,
            category,
            priority: Priority::default(),
            created: Utc::now(),
            author,
        }
    }

    /// Current value as a percentage of the target
    pub fn progress(&self) -> Option<f64> {
        match (self.current_value, self.target_value) {
            (Some(current), Some(target)) if target != 0.0 => Some(current / target * 100.0),
            _ => None,
        }
    }
}
