//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod identity;
pub mod loader;
pub mod natural;
pub mod project;
pub mod store;
pub mod validation;

pub use config::Config;
pub use entity::{Entity, Priority, ProcessStatus, RiskRating, ScorecardCategory, StepType};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use loader::{RecordError, YamlSyntaxError};
pub use natural::{natural_cmp, sort_naturally_by_key};
pub use project::{Project, ProjectError};
pub use store::{DeleteSummary, FrameworkRows, Store, StoreError};
pub use validation::{FieldViolation, Validate, ValidationError};
