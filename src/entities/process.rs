//! Process entity - documented operational procedure owned by an element

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, ProcessStatus, RiskRating};
use crate::core::identity::{EntityId, EntityPrefix};

/// Risk level derived from a frequency x impact score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Risk assessment attached to a process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// How often the risk is expected to materialize
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<RiskRating>,

    /// How severe the consequence would be
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<RiskRating>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

impl RiskAssessment {
    /// Frequency weight times impact weight (1..=9), if both are rated
    pub fn score(&self) -> Option<u8> {
        match (self.frequency, self.impact) {
            (Some(f), Some(i)) => Some(f.weight() * i.weight()),
            _ => None,
        }
    }

    /// Level bucket for the score: 1-2 low, 3-4 medium, 6-9 high
    pub fn level(&self) -> Option<RiskLevel> {
        self.score().map(|s| match s {
            0..=2 => RiskLevel::Low,
            3..=4 => RiskLevel::Medium,
            _ => RiskLevel::High,
        })
    }

    pub fn is_assessed(&self) -> bool {
        self.frequency.is_some() || self.impact.is_some() || self.description.is_some()
    }
}

/// A documented process belonging to one element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// Unique identifier
    pub id: EntityId,

    /// Human-readable number, "OE-<element>.<sequence>"; unique, naturally ordered
    pub process_number: String,

    /// Process name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// What the organization expects this process to achieve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectations: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverables: Option<String>,

    /// Notes on what is critical to quality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_to_quality: Option<String>,

    /// Owning element
    pub element_id: EntityId,

    #[serde(default)]
    pub status: ProcessStatus,

    /// Whether the process is mandatory for every site
    #[serde(default)]
    pub mandatory: bool,

    #[serde(default)]
    pub risk: RiskAssessment,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Entity for Process {
    const PREFIX: EntityPrefix = EntityPrefix::Proc;

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

impl Process {
    pub fn new(process_number: String, name: String, element_id: EntityId, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Proc),
            process_number,
            name,
            description: None,
            expectations: None,
            inputs: None,
            deliverables: None,
            critical_to_quality: None,
            element_id,
            status: ProcessStatus::default(),
            mandatory: false,
            risk: RiskAssessment::default(),
            created: Utc::now(),
            author,
        }
    }

    /// Display label, e.g. "OE-1.2 Incident Reporting"
    pub fn label(&self) -> String {
        format!("{} {}", self.process_number, self.name)
    }
}

/// Check the "OE-<element>.<sequence>" shape: a non-empty prefix, a dash,
/// then dot-separated numeric levels (at least two)
pub fn is_valid_process_number(number: &str) -> bool {
    let Some((prefix, rest)) = number.rsplit_once('-') else {
        return false;
    };
    if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
        return false;
    }
    let levels: Vec<&str> = rest.split('.').collect();
    levels.len() >= 2
        && levels
            .iter()
            .all(|l| !l.is_empty() && l.bytes().all(|b| b.is_ascii_digit()))
}

/// The element segment of a process number ("OE-4.10" -> 4)
pub fn element_segment(number: &str) -> Option<u32> {
    let (_, rest) = number.rsplit_once('-')?;
    rest.split('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc() -> Process {
        Process::new(
            "OE-1.2".to_string(),
            "Incident Reporting".to_string(),
            EntityId::new(EntityPrefix::Elem),
            "test".to_string(),
        )
    }

    #[test]
    fn test_process_creation() {
        let p = proc();
        assert!(p.id.to_string().starts_with("PROC-"));
        assert_eq!(p.status, ProcessStatus::Draft);
        assert_eq!(p.label(), "OE-1.2 Incident Reporting");
        assert!(!p.risk.is_assessed());
    }

    #[test]
    fn test_risk_score_and_level() {
        let mut p = proc();
        assert_eq!(p.risk.score(), None);

        p.risk.frequency = Some(RiskRating::High);
        p.risk.impact = Some(RiskRating::Medium);
        assert_eq!(p.risk.score(), Some(6));
        assert_eq!(p.risk.level(), Some(RiskLevel::High));

        p.risk.frequency = Some(RiskRating::Low);
        assert_eq!(p.risk.level(), Some(RiskLevel::Low));

        p.risk.impact = Some(RiskRating::High);
        assert_eq!(p.risk.level(), Some(RiskLevel::Medium));
    }

    #[test]
    fn test_process_number_shape() {
        assert!(is_valid_process_number("OE-4.10"));
        assert!(is_valid_process_number("OE-4.1.2"));
        assert!(!is_valid_process_number("OE-4"));
        assert!(!is_valid_process_number("4.1"));
        assert!(!is_valid_process_number("OE-4.x"));
        assert!(!is_valid_process_number("OE-4."));
    }

    #[test]
    fn test_element_segment() {
        assert_eq!(element_segment("OE-4.10"), Some(4));
        assert_eq!(element_segment("bogus"), None);
    }

    #[test]
    fn test_status_serialization() {
        let mut p = proc();
        p.status = ProcessStatus::Archived;
        let yaml = serde_yml::to_string(&p).unwrap();
        assert!(yaml.contains("status: archived"));
    }
}
