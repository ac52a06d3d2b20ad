//! Record identity using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};
use thiserror::Error;
use ulid::{Generator, Ulid};

/// Record type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Framework element
    Elem,
    /// Documented process
    Proc,
    /// Process step
    Step,
    /// Decision outcome (edge between steps)
    Out,
    /// Performance measure
    Kpi,
    /// Strategic goal
    Goal,
    /// Document version attached to a process
    Ver,
    /// Attachment on a process
    Doc,
    /// Activity log entry
    Log,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Elem => "ELEM",
            EntityPrefix::Proc => "PROC",
            EntityPrefix::Step => "STEP",
            EntityPrefix::Out => "OUT",
            EntityPrefix::Kpi => "KPI",
            EntityPrefix::Goal => "GOAL",
            EntityPrefix::Ver => "VER",
            EntityPrefix::Doc => "DOC",
            EntityPrefix::Log => "LOG",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Elem,
            EntityPrefix::Proc,
            EntityPrefix::Step,
            EntityPrefix::Out,
            EntityPrefix::Kpi,
            EntityPrefix::Goal,
            EntityPrefix::Ver,
            EntityPrefix::Doc,
            EntityPrefix::Log,
        ]
    }

    /// Directory (relative to the project root) holding this record type
    pub fn directory(&self) -> &'static str {
        match self {
            EntityPrefix::Elem => "elements",
            EntityPrefix::Proc => "processes",
            EntityPrefix::Step => "steps",
            EntityPrefix::Out => "outcomes",
            EntityPrefix::Kpi => "measures",
            EntityPrefix::Goal => "goals",
            EntityPrefix::Ver => "documents/versions",
            EntityPrefix::Doc => "documents/attachments",
            EntityPrefix::Log => "activity",
        }
    }

    /// Human-readable record type name
    pub fn label(&self) -> &'static str {
        match self {
            EntityPrefix::Elem => "element",
            EntityPrefix::Proc => "process",
            EntityPrefix::Step => "step",
            EntityPrefix::Out => "outcome",
            EntityPrefix::Kpi => "measure",
            EntityPrefix::Goal => "goal",
            EntityPrefix::Ver => "document version",
            EntityPrefix::Doc => "attachment",
            EntityPrefix::Log => "activity",
        }
    }

    /// Try to determine the prefix from a filename like "PROC-xxx.oex.yaml"
    pub fn from_filename(filename: &str) -> Option<Self> {
        let upper = filename.to_uppercase();
        Self::all()
            .iter()
            .find(|p| upper.starts_with(&format!("{}-", p.as_str())))
            .copied()
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ELEM" => Ok(EntityPrefix::Elem),
            "PROC" => Ok(EntityPrefix::Proc),
            "STEP" => Ok(EntityPrefix::Step),
            "OUT" => Ok(EntityPrefix::Out),
            "KPI" => Ok(EntityPrefix::Kpi),
            "GOAL" => Ok(EntityPrefix::Goal),
            "VER" => Ok(EntityPrefix::Ver),
            "DOC" => Ok(EntityPrefix::Doc),
            "LOG" => Ok(EntityPrefix::Log),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// Next ULID from the shared monotonic generator
fn next_ulid() -> Ulid {
    static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();
    let generator = GENERATOR.get_or_init(|| Mutex::new(Generator::new()));
    match generator.lock() {
        // Falls back to a random ULID if the millisecond's random bits overflow
        Ok(mut ulids) => ulids.generate().unwrap_or_else(|_| Ulid::new()),
        Err(_) => Ulid::new(),
    }
}

/// A unique record identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    ///
    /// IDs minted by one process are strictly increasing, even within a
    /// millisecond, so records sorted by id come back in creation order.
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: next_ulid(),
        }
    }

    /// Create an EntityId from a prefix and existing ULID
    pub fn from_parts(prefix: EntityPrefix, ulid: Ulid) -> Self {
        Self { prefix, ulid }
    }

    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: ELEM, PROC, STEP, OUT, KPI, GOAL, VER, DOC, LOG)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Proc);
        assert!(id.to_string().starts_with("PROC-"));
        assert_eq!(id.to_string().len(), 31); // PROC- (5) + ULID (26)
    }

    #[test]
    fn test_entity_id_parsing() {
        let original = EntityId::new(EntityPrefix::Kpi);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.prefix(), EntityPrefix::Kpi);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_new_ids_are_strictly_increasing() {
        let ids: Vec<EntityId> = (0..500).map(|_| EntityId::new(EntityPrefix::Step)).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].to_string() < pair[1].to_string());
        }
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("GOAL01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("STEP-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_prefixes_parse() {
        for prefix in EntityPrefix::all() {
            let id = EntityId::new(*prefix);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), *prefix);
        }
    }

    #[test]
    fn test_prefix_from_filename() {
        assert_eq!(
            EntityPrefix::from_filename("GOAL-01HQ3K4N5M6P7R8S9T0UVWXYZ.oex.yaml"),
            Some(EntityPrefix::Goal)
        );
        assert_eq!(EntityPrefix::from_filename("config.yaml"), None);
    }
}
