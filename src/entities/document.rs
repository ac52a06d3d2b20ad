//! Document versions and attachments recorded against a process

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A released revision of a process document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: EntityId,

    pub process_id: EntityId,

    /// Version label, e.g. "1.2"
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_summary: Option<String>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Entity for DocumentVersion {
    const PREFIX: EntityPrefix = EntityPrefix::Ver;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.version
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl DocumentVersion {
    pub fn new(process_id: EntityId, version: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Ver),
            process_id,
            version,
            change_summary: None,
            created: Utc::now(),
            author,
        }
    }
}

/// A file attached to a process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDocument {
    pub id: EntityId,

    pub process_id: EntityId,

    pub file_name: String,

    /// Location of the file, relative to the project root or absolute
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Entity for ProcessDocument {
    const PREFIX: EntityPrefix = EntityPrefix::Doc;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.file_name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl ProcessDocument {
    pub fn new(process_id: EntityId, path: String, author: String) -> Self {
        let file_name = std::path::Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.clone());
        Self {
            id: EntityId::new(EntityPrefix::Doc),
            process_id,
            file_name,
            path,
            description: None,
            created: Utc::now(),
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_file_name_from_path() {
        let doc = ProcessDocument::new(
            EntityId::new(EntityPrefix::Proc),
            "docs/procedures/incident.pdf".to_string(),
            "test".to_string(),
        );
        assert_eq!(doc.file_name, "incident.pdf");
    }
}
