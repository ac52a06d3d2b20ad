//! Record type definitions
//!
//! - [`Element`] - top-level framework category
//! - [`Process`] - documented procedure owned by an element, with risk assessment
//! - [`Step`] / [`Outcome`] - ordered process steps and decision edges
//! - [`PerformanceMeasure`] - KPI attached to a process, optionally linked to a goal
//! - [`StrategicGoal`] - scorecard objective owned by an element
//! - [`DocumentVersion`] / [`ProcessDocument`] - process document history and attachments
//! - [`ActivityLog`] - audit trail of mutations

pub mod activity;
pub mod document;
pub mod element;
pub mod goal;
pub mod measure;
pub mod process;
pub mod step;

pub use activity::{Action, ActivityLog};
pub use document::{DocumentVersion, ProcessDocument};
pub use element::Element;
pub use goal::StrategicGoal;
pub use measure::PerformanceMeasure;
pub use process::{Process, RiskAssessment, RiskLevel};
pub use step::{Outcome, Step};
