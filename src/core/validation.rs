//! Field-level validation of records before they are written

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::process::is_valid_process_number;
use crate::entities::{Element, Outcome, PerformanceMeasure, Process, StrategicGoal, Step};

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{field}: {message}")]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Malformed input to a create or update operation
#[derive(Debug, Error, Diagnostic)]
#[error("invalid {kind}: {summary}")]
#[diagnostic(code(oex::validation), help("fix the listed fields and try again"))]
pub struct ValidationError {
    kind: &'static str,
    summary: String,

    #[related]
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(kind: &'static str, violations: Vec<FieldViolation>) -> Self {
        let summary = match violations.len() {
            1 => "1 error".to_string(),
            n => format!("{} errors", n),
        };
        Self {
            kind,
            summary,
            violations,
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether any violation concerns the named field
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Collects violations for one record
#[derive(Debug)]
pub struct Violations {
    kind: &'static str,
    items: Vec<FieldViolation>,
}

impl Violations {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.items.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Record a violation when `ok` is false
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.push(field, message);
        }
    }

    pub fn require_text(&mut self, value: &str, field: &str) {
        self.check(!value.trim().is_empty(), field, "must not be empty");
    }

    pub fn extend(&mut self, other: ValidationError) {
        self.items.extend(other.violations);
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.kind, self.items))
        }
    }
}

/// Shape checks that need no other records
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for Element {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new("element");
        v.check(self.element_number > 0, "element_number", "must be at least 1");
        v.require_text(&self.title, "title");
        v.finish()
    }
}

impl Validate for Process {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new("process");
        v.check(
            is_valid_process_number(&self.process_number),
            "process_number",
            format!(
                "'{}' does not look like OE-<element>.<sequence>",
                self.process_number
            ),
        );
        v.require_text(&self.name, "name");
        v.finish()
    }
}

impl Validate for Step {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new("step");
        v.check(self.step_number > 0, "step_number", "must be at least 1");
        v.require_text(&self.title, "title");
        v.finish()
    }
}

impl Validate for Outcome {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new("outcome");
        v.require_text(&self.label, "label");
        v.check(self.to_step_number > 0, "to_step_number", "must be at least 1");
        v.finish()
    }
}

impl Validate for PerformanceMeasure {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new("measure");
        v.require_text(&self.name, "name");
        v.finish()
    }
}

impl Validate for StrategicGoal {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new("goal");
        v.require_text(&self.title, "title");
        for (field, value) in [
            ("target_value", self.target_value),
            ("current_value", self.current_value),
        ] {
            if let Some(x) = value {
                v.check(x.is_finite(), field, "must be a finite number");
            }
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::ScorecardCategory;
    use crate::core::identity::{EntityId, EntityPrefix};

    #[test]
    fn test_element_validation_collects_all_fields() {
        let elem = Element::new(0, "  ".to_string(), "test".to_string());
        let err = elem.validate().unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.has_field("element_number"));
        assert!(err.has_field("title"));
        assert!(err.to_string().contains("2 errors"));
    }

    #[test]
    fn test_process_number_is_checked() {
        let p = Process::new(
            "OE-4".to_string(),
            "Audit".to_string(),
            EntityId::new(EntityPrefix::Elem),
            "test".to_string(),
        );
        let err = p.validate().unwrap_err();
        assert!(err.has_field("process_number"));
    }

    #[test]
    fn test_goal_rejects_non_finite_values() {
        let mut goal = StrategicGoal::new(
            EntityId::new(EntityPrefix::Elem),
            "Margin".to_string(),
            ScorecardCategory::Financial,
            "test".to_string(),
        );
        assert!(goal.validate().is_ok());
        goal.target_value = Some(f64::NAN);
        assert!(goal.validate().unwrap_err().has_field("target_value"));
    }
}
