//! Entity trait and the value types shared across record kinds

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all stored records
pub trait Entity: Serialize + DeserializeOwned {
    /// The record type prefix (e.g., "ELEM", "PROC")
    const PREFIX: EntityPrefix;

    /// Get the record's unique ID
    fn id(&self) -> &EntityId;

    /// Get the record's display title
    fn title(&self) -> &str;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the author
    fn author(&self) -> &str;
}

/// Lifecycle status of a process
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    #[default]
    Draft,
    Active,
    Review,
    Archived,
}

impl ProcessStatus {
    pub fn all() -> &'static [ProcessStatus] {
        &[
            ProcessStatus::Draft,
            ProcessStatus::Active,
            ProcessStatus::Review,
            ProcessStatus::Archived,
        ]
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessStatus::Draft => write!(f, "draft"),
            ProcessStatus::Active => write!(f, "active"),
            ProcessStatus::Review => write!(f, "review"),
            ProcessStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProcessStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ProcessStatus::Draft),
            "active" => Ok(ProcessStatus::Active),
            "review" => Ok(ProcessStatus::Review),
            "archived" => Ok(ProcessStatus::Archived),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Priority of a strategic goal
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "High")]
    High,
    #[default]
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Low")]
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Three-point rating used for risk frequency and impact
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskRating {
    #[default]
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl RiskRating {
    /// Numeric weight used for risk scoring (Low=1, Medium=2, High=3)
    pub fn weight(&self) -> u8 {
        match self {
            RiskRating::Low => 1,
            RiskRating::Medium => 2,
            RiskRating::High => 3,
        }
    }

    pub fn all() -> &'static [RiskRating] {
        &[RiskRating::Low, RiskRating::Medium, RiskRating::High]
    }
}

impl std::fmt::Display for RiskRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskRating::Low => write!(f, "low"),
            RiskRating::Medium => write!(f, "medium"),
            RiskRating::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for RiskRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskRating::Low),
            "medium" => Ok(RiskRating::Medium),
            "high" => Ok(RiskRating::High),
            _ => Err(format!("Unknown rating: {}", s)),
        }
    }
}

/// Kind of a process step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    #[default]
    Task,
    Decision,
    Start,
    End,
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepType::Task => write!(f, "task"),
            StepType::Decision => write!(f, "decision"),
            StepType::Start => write!(f, "start"),
            StepType::End => write!(f, "end"),
        }
    }
}

impl std::str::FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(StepType::Task),
            "decision" => Ok(StepType::Decision),
            "start" => Ok(StepType::Start),
            "end" => Ok(StepType::End),
            _ => Err(format!("Unknown step type: {}", s)),
        }
    }
}

/// Balanced-scorecard category shared by strategic goals and performance measures
///
/// Stored as its display string. Anything that is not one of the four
/// recognized strings is kept verbatim as [`ScorecardCategory::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScorecardCategory {
    Financial,
    Customer,
    InternalProcess,
    LearningGrowth,
    Other(String),
}

impl ScorecardCategory {
    /// The four recognized categories, in display order
    pub const FIXED: [ScorecardCategory; 4] = [
        ScorecardCategory::Financial,
        ScorecardCategory::Customer,
        ScorecardCategory::InternalProcess,
        ScorecardCategory::LearningGrowth,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ScorecardCategory::Financial => "Financial",
            ScorecardCategory::Customer => "Customer",
            ScorecardCategory::InternalProcess => "Internal Process",
            ScorecardCategory::LearningGrowth => "Learning & Growth",
            ScorecardCategory::Other(s) => s,
        }
    }

    /// Whether this is one of the four recognized categories
    pub fn is_fixed(&self) -> bool {
        !matches!(self, ScorecardCategory::Other(_))
    }

    /// Map a stored string onto a category. Matching is exact.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "Financial" => ScorecardCategory::Financial,
            "Customer" => ScorecardCategory::Customer,
            "Internal Process" => ScorecardCategory::InternalProcess,
            "Learning & Growth" => ScorecardCategory::LearningGrowth,
            other => ScorecardCategory::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ScorecardCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScorecardCategory {
    type Err = String;

    /// Parse user input: the display strings plus snake-case aliases.
    /// Unlike [`ScorecardCategory::from_stored`], unknown input is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Financial" | "financial" => Ok(ScorecardCategory::Financial),
            "Customer" | "customer" => Ok(ScorecardCategory::Customer),
            "Internal Process" | "internal_process" => Ok(ScorecardCategory::InternalProcess),
            "Learning & Growth" | "learning_growth" => Ok(ScorecardCategory::LearningGrowth),
            _ => Err(format!(
                "Unknown scorecard category: {}. Use financial, customer, internal_process, or learning_growth",
                s
            )),
        }
    }
}

impl Serialize for ScorecardCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScorecardCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ScorecardCategory::from_stored(&s))
    }
}
