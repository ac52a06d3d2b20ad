//! Activity log entries written on every mutation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// What happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Created => write!(f, "created"),
            Action::Updated => write!(f, "updated"),
            Action::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: EntityId,

    pub action: Action,

    /// Record type that changed
    pub entity_type: EntityPrefix,

    pub entity_id: EntityId,

    pub summary: String,

    pub author: String,

    pub timestamp: DateTime<Utc>,
}

impl Entity for ActivityLog {
    const PREFIX: EntityPrefix = EntityPrefix::Log;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.summary
    }

    fn created(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl ActivityLog {
    pub fn new(action: Action, entity_id: &EntityId, summary: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Log),
            action,
            entity_type: entity_id.prefix(),
            entity_id: entity_id.clone(),
            summary,
            author,
            timestamp: Utc::now(),
        }
    }
}
