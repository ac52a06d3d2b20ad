//! File-backed record store
//!
//! Each table is a directory of YAML rows (see [`crate::core::loader`]).
//! The store enforces the relational rules the aggregation layer relies on:
//! unique element and process numbers, existing parents on create, and the
//! per-relation delete behavior (cascade for owned children, set-null for
//! the measure -> goal link).

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::entity::{Entity, StepType};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader::{self, RecordError};
use crate::core::project::Project;
use crate::core::validation::{Validate, ValidationError, Violations};
use crate::entities::{
    Action, ActivityLog, DocumentVersion, Element, Outcome, PerformanceMeasure, Process,
    ProcessDocument, Step, StrategicGoal,
};

/// Errors raised by store operations
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} not found: {key}")]
    #[diagnostic(code(oex::not_found))]
    NotFound { kind: &'static str, key: String },

    #[error("'{key}' matches more than one {kind}")]
    #[diagnostic(code(oex::ambiguous), help("use the full record ID"))]
    Ambiguous { kind: &'static str, key: String },
}

impl StoreError {
    fn not_found(prefix: EntityPrefix, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind: prefix.label(),
            key: key.into(),
        }
    }
}

/// Every table the aggregation layer reads, loaded in one pass per table
#[derive(Debug, Clone, Default)]
pub struct FrameworkRows {
    pub elements: Vec<Element>,
    pub processes: Vec<Process>,
    pub steps: Vec<Step>,
    pub outcomes: Vec<Outcome>,
    pub measures: Vec<PerformanceMeasure>,
    pub goals: Vec<StrategicGoal>,
}

/// What a delete removed or detached
#[derive(Debug, Default, Clone)]
pub struct DeleteSummary {
    /// Every record removed, the target first
    pub removed: Vec<EntityId>,
    /// Measures whose goal link was cleared
    pub detached: Vec<EntityId>,
}

impl DeleteSummary {
    fn count(&self, prefix: EntityPrefix) -> usize {
        self.removed.iter().filter(|id| id.prefix() == prefix).count()
    }

    /// Human-readable cascade summary, e.g. "2 process(es), 5 step(s)"
    pub fn describe(&self) -> String {
        let parts: Vec<String> = EntityPrefix::all()
            .iter()
            .filter(|p| **p != EntityPrefix::Log)
            .filter_map(|p| {
                let n = self.count(*p);
                (n > 0).then(|| format!("{} {}(s)", n, p.label()))
            })
            .collect();
        let mut text = parts.join(", ");
        if !self.detached.is_empty() {
            if !text.is_empty() {
                text.push_str(", ");
            }
            text.push_str(&format!("{} measure link(s) cleared", self.detached.len()));
        }
        text
    }
}

/// Record store rooted at a project
#[derive(Debug, Clone)]
pub struct Store {
    project: Project,
    author: String,
}

impl Store {
    pub fn new(project: Project, author: impl Into<String>) -> Self {
        Self {
            project,
            author: author.into(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    // ------------------------------------------------------------------
    // Table reads
    // ------------------------------------------------------------------

    fn table<T: Entity>(&self) -> Vec<T> {
        loader::load_all(&self.project.entity_dir(T::PREFIX))
    }

    pub fn elements(&self) -> Vec<Element> {
        self.table()
    }

    pub fn processes(&self) -> Vec<Process> {
        self.table()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.table()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.table()
    }

    pub fn measures(&self) -> Vec<PerformanceMeasure> {
        self.table()
    }

    pub fn goals(&self) -> Vec<StrategicGoal> {
        self.table()
    }

    pub fn versions(&self) -> Vec<DocumentVersion> {
        self.table()
    }

    pub fn attachments(&self) -> Vec<ProcessDocument> {
        self.table()
    }

    /// Activity entries, newest first
    pub fn activity(&self) -> Vec<ActivityLog> {
        let mut entries: Vec<ActivityLog> = self.table();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Load all tables needed for aggregation
    pub fn rows(&self) -> FrameworkRows {
        FrameworkRows {
            elements: self.elements(),
            processes: self.processes(),
            steps: self.steps(),
            outcomes: self.outcomes(),
            measures: self.measures(),
            goals: self.goals(),
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Load a record by its full ID
    pub fn get<T: Entity>(&self, id: &EntityId) -> Result<T, StoreError> {
        let path = self.project.entity_path(id);
        if id.prefix() != T::PREFIX || !path.exists() {
            return Err(StoreError::not_found(T::PREFIX, id.to_string()));
        }
        Ok(loader::parse_record(&path)?)
    }

    /// Resolve a record among `rows` by full ID or unique ID prefix
    fn resolve_id<T: Entity + Clone>(rows: &[T], key: &str) -> Result<T, StoreError> {
        let upper = key.to_uppercase();
        if let Some(exact) = rows.iter().find(|r| r.id().to_string() == upper) {
            return Ok(exact.clone());
        }
        let mut matches = rows
            .iter()
            .filter(|r| r.id().to_string().starts_with(&upper));
        match (matches.next(), matches.next()) {
            (Some(found), None) if upper.len() > T::PREFIX.as_str().len() + 1 => {
                Ok(found.clone())
            }
            (Some(_), Some(_)) => Err(StoreError::Ambiguous {
                kind: T::PREFIX.label(),
                key: key.to_string(),
            }),
            _ => Err(StoreError::not_found(T::PREFIX, key)),
        }
    }

    /// Find an element by number ("3") or ID
    pub fn find_element(&self, key: &str) -> Result<Element, StoreError> {
        let elements = self.elements();
        if let Ok(number) = key.trim().parse::<u32>() {
            return elements
                .into_iter()
                .find(|e| e.element_number == number)
                .ok_or_else(|| StoreError::not_found(EntityPrefix::Elem, key));
        }
        Self::resolve_id(&elements, key)
    }

    /// Find a process by process number ("OE-1.2") or ID
    pub fn find_process(&self, key: &str) -> Result<Process, StoreError> {
        let processes = self.processes();
        if let Some(p) = processes.iter().find(|p| p.process_number == key.trim()) {
            return Ok(p.clone());
        }
        Self::resolve_id(&processes, key)
    }

    pub fn find_goal(&self, key: &str) -> Result<StrategicGoal, StoreError> {
        Self::resolve_id(&self.goals(), key)
    }

    pub fn find_measure(&self, key: &str) -> Result<PerformanceMeasure, StoreError> {
        Self::resolve_id(&self.measures(), key)
    }

    /// Find a step by ID, or by "<process>#<step number>" (e.g. "OE-1.2#3")
    pub fn find_step(&self, key: &str) -> Result<Step, StoreError> {
        if let Some((process_key, number)) = key.split_once('#') {
            let process = self.find_process(process_key)?;
            let number: u32 = number
                .parse()
                .map_err(|_| StoreError::not_found(EntityPrefix::Step, key))?;
            return self
                .steps()
                .into_iter()
                .find(|s| s.process_id == process.id && s.step_number == number)
                .ok_or_else(|| StoreError::not_found(EntityPrefix::Step, key));
        }
        Self::resolve_id(&self.steps(), key)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    fn write<T: Entity>(&self, record: &T, action: Action) -> Result<(), StoreError> {
        loader::write_record(&self.project.entity_path(record.id()), record)?;
        self.log(action, record.id(), record.title())?;
        info!("{} {} {}", action, T::PREFIX.label(), record.id());
        Ok(())
    }

    fn remove(&self, id: &EntityId) -> Result<(), StoreError> {
        let path = self.project.entity_path(id);
        if path.exists() {
            loader::remove_record(&path)?;
            debug!("removed {}", id);
        }
        Ok(())
    }

    fn log(&self, action: Action, id: &EntityId, title: &str) -> Result<(), StoreError> {
        let entry = ActivityLog::new(
            action,
            id,
            format!("{} {} '{}'", action, id.prefix().label(), title),
            self.author.clone(),
        );
        loader::write_record(&self.project.entity_path(&entry.id), &entry)?;
        Ok(())
    }

    fn require_exists(&self, id: &EntityId, field: &str, v: &mut Violations) {
        if !self.project.entity_path(id).exists() {
            v.push(field, format!("{} {} does not exist", id.prefix().label(), id));
        }
    }

    fn check_element(&self, element: &Element) -> Result<(), StoreError> {
        let mut v = Violations::new("element");
        if let Err(e) = element.validate() {
            v.extend(e);
        }
        if let Some(other) = self
            .elements()
            .into_iter()
            .find(|e| e.element_number == element.element_number && e.id != element.id)
        {
            v.push(
                "element_number",
                format!("{} is already used by {}", element.element_number, other.id),
            );
        }
        Ok(v.finish()?)
    }

    fn check_process(&self, process: &Process) -> Result<(), StoreError> {
        let mut v = Violations::new("process");
        if let Err(e) = process.validate() {
            v.extend(e);
        }
        self.require_exists(&process.element_id, "element_id", &mut v);
        if let Some(other) = self
            .processes()
            .into_iter()
            .find(|p| p.process_number == process.process_number && p.id != process.id)
        {
            v.push(
                "process_number",
                format!("{} is already used by {}", process.process_number, other.id),
            );
        }
        Ok(v.finish()?)
    }

    fn check_step(&self, step: &Step) -> Result<(), StoreError> {
        let mut v = Violations::new("step");
        if let Err(e) = step.validate() {
            v.extend(e);
        }
        self.require_exists(&step.process_id, "process_id", &mut v);
        Ok(v.finish()?)
    }

    fn check_outcome(&self, outcome: &Outcome) -> Result<(), StoreError> {
        let mut v = Violations::new("outcome");
        if let Err(e) = outcome.validate() {
            v.extend(e);
        }
        match self.get::<Step>(&outcome.from_step_id) {
            Ok(from) => {
                v.check(
                    from.step_type == StepType::Decision,
                    "from_step_id",
                    format!("step {} is a {} step, not a decision", from.step_number, from.step_type),
                );
                v.check(
                    from.process_id == outcome.process_id,
                    "process_id",
                    "must match the process of the decision step",
                );
            }
            Err(_) => v.push(
                "from_step_id",
                format!("step {} does not exist", outcome.from_step_id),
            ),
        }
        Ok(v.finish()?)
    }

    fn check_measure(&self, measure: &PerformanceMeasure) -> Result<(), StoreError> {
        let mut v = Violations::new("measure");
        if let Err(e) = measure.validate() {
            v.extend(e);
        }
        self.require_exists(&measure.process_id, "process_id", &mut v);
        if let Some(ref goal_id) = measure.strategic_goal_id {
            self.require_exists(goal_id, "strategic_goal_id", &mut v);
        }
        Ok(v.finish()?)
    }

    fn check_goal(&self, goal: &StrategicGoal) -> Result<(), StoreError> {
        let mut v = Violations::new("goal");
        if let Err(e) = goal.validate() {
            v.extend(e);
        }
        self.require_exists(&goal.element_id, "element_id", &mut v);
        Ok(v.finish()?)
    }

    fn check_process_child(&self, process_id: &EntityId, kind: &'static str) -> Result<(), StoreError> {
        let mut v = Violations::new(kind);
        self.require_exists(process_id, "process_id", &mut v);
        Ok(v.finish()?)
    }

    fn action_for(&self, id: &EntityId) -> Action {
        if self.project.entity_path(id).exists() {
            Action::Updated
        } else {
            Action::Created
        }
    }

    /// Create or update an element
    pub fn save_element(&self, element: &Element) -> Result<(), StoreError> {
        self.check_element(element)?;
        self.write(element, self.action_for(&element.id))
    }

    /// Create or update a process
    pub fn save_process(&self, process: &Process) -> Result<(), StoreError> {
        self.check_process(process)?;
        self.write(process, self.action_for(&process.id))
    }

    pub fn save_step(&self, step: &Step) -> Result<(), StoreError> {
        self.check_step(step)?;
        self.write(step, self.action_for(&step.id))
    }

    pub fn save_outcome(&self, outcome: &Outcome) -> Result<(), StoreError> {
        self.check_outcome(outcome)?;
        self.write(outcome, self.action_for(&outcome.id))
    }

    pub fn save_measure(&self, measure: &PerformanceMeasure) -> Result<(), StoreError> {
        self.check_measure(measure)?;
        self.write(measure, self.action_for(&measure.id))
    }

    pub fn save_goal(&self, goal: &StrategicGoal) -> Result<(), StoreError> {
        self.check_goal(goal)?;
        self.write(goal, self.action_for(&goal.id))
    }

    pub fn save_version(&self, version: &DocumentVersion) -> Result<(), StoreError> {
        self.check_process_child(&version.process_id, "document version")?;
        self.write(version, self.action_for(&version.id))
    }

    pub fn save_attachment(&self, doc: &ProcessDocument) -> Result<(), StoreError> {
        self.check_process_child(&doc.process_id, "attachment")?;
        self.write(doc, self.action_for(&doc.id))
    }

    /// Validate a record that was edited outside the store
    pub fn check_file(&self, id: &EntityId) -> Result<(), StoreError> {
        match id.prefix() {
            EntityPrefix::Elem => self.check_element(&self.get(id)?),
            EntityPrefix::Proc => self.check_process(&self.get(id)?),
            EntityPrefix::Step => self.check_step(&self.get(id)?),
            EntityPrefix::Out => self.check_outcome(&self.get(id)?),
            EntityPrefix::Kpi => self.check_measure(&self.get(id)?),
            EntityPrefix::Goal => self.check_goal(&self.get(id)?),
            EntityPrefix::Ver => self.get::<DocumentVersion>(id).map(|_| ()),
            EntityPrefix::Doc => self.get::<ProcessDocument>(id).map(|_| ()),
            EntityPrefix::Log => self.get::<ActivityLog>(id).map(|_| ()),
        }
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    fn delete_logged(&self, id: &EntityId, title: &str, summary: &mut DeleteSummary) -> Result<(), StoreError> {
        self.remove(id)?;
        self.log(Action::Deleted, id, title)?;
        summary.removed.push(id.clone());
        Ok(())
    }

    /// Delete an element and cascade to its processes and goals
    pub fn delete_element(&self, id: &EntityId) -> Result<DeleteSummary, StoreError> {
        let element: Element = self.get(id)?;
        let mut summary = DeleteSummary::default();
        self.delete_logged(&element.id, &element.title, &mut summary)?;

        for process in self.processes().into_iter().filter(|p| p.element_id == element.id) {
            let child = self.delete_process(&process.id)?;
            summary.removed.extend(child.removed);
            summary.detached.extend(child.detached);
        }
        for goal in self.goals().into_iter().filter(|g| g.element_id == element.id) {
            let child = self.delete_goal(&goal.id)?;
            summary.removed.extend(child.removed);
            summary.detached.extend(child.detached);
        }

        info!("deleted element {}: {}", element.id, summary.describe());
        Ok(summary)
    }

    /// Delete a process and everything it owns
    pub fn delete_process(&self, id: &EntityId) -> Result<DeleteSummary, StoreError> {
        let process: Process = self.get(id)?;
        let mut summary = DeleteSummary::default();
        self.delete_logged(&process.id, &process.name, &mut summary)?;

        for step in self.steps().into_iter().filter(|s| s.process_id == process.id) {
            self.delete_logged(&step.id, &step.title, &mut summary)?;
        }
        for outcome in self.outcomes().into_iter().filter(|o| o.process_id == process.id) {
            self.delete_logged(&outcome.id, &outcome.label, &mut summary)?;
        }
        for measure in self.measures().into_iter().filter(|m| m.process_id == process.id) {
            self.delete_logged(&measure.id, &measure.name, &mut summary)?;
        }
        for version in self.versions().into_iter().filter(|v| v.process_id == process.id) {
            self.delete_logged(&version.id, &version.version, &mut summary)?;
        }
        for doc in self.attachments().into_iter().filter(|d| d.process_id == process.id) {
            self.delete_logged(&doc.id, &doc.file_name, &mut summary)?;
        }

        Ok(summary)
    }

    /// Delete a step and any outcome that starts or ends at it
    pub fn delete_step(&self, id: &EntityId) -> Result<DeleteSummary, StoreError> {
        let step: Step = self.get(id)?;
        let mut summary = DeleteSummary::default();
        self.delete_logged(&step.id, &step.title, &mut summary)?;

        // Another step may share the number; only drop incoming edges when none does
        let number_still_used = self
            .steps()
            .iter()
            .any(|s| s.process_id == step.process_id && s.step_number == step.step_number);

        for outcome in self.outcomes().into_iter().filter(|o| o.process_id == step.process_id) {
            let incoming = !number_still_used && outcome.to_step_number == step.step_number;
            if outcome.from_step_id == step.id || incoming {
                self.delete_logged(&outcome.id, &outcome.label, &mut summary)?;
            }
        }

        Ok(summary)
    }

    pub fn delete_outcome(&self, id: &EntityId) -> Result<DeleteSummary, StoreError> {
        let outcome: Outcome = self.get(id)?;
        let mut summary = DeleteSummary::default();
        self.delete_logged(&outcome.id, &outcome.label, &mut summary)?;
        Ok(summary)
    }

    pub fn delete_measure(&self, id: &EntityId) -> Result<DeleteSummary, StoreError> {
        let measure: PerformanceMeasure = self.get(id)?;
        let mut summary = DeleteSummary::default();
        self.delete_logged(&measure.id, &measure.name, &mut summary)?;
        Ok(summary)
    }

    /// Delete a goal; measures that pointed at it keep existing with no goal
    pub fn delete_goal(&self, id: &EntityId) -> Result<DeleteSummary, StoreError> {
        let goal: StrategicGoal = self.get(id)?;
        let mut summary = DeleteSummary::default();
        self.delete_logged(&goal.id, &goal.title, &mut summary)?;

        for mut measure in self
            .measures()
            .into_iter()
            .filter(|m| m.strategic_goal_id.as_ref() == Some(&goal.id))
        {
            measure.strategic_goal_id = None;
            self.write(&measure, Action::Updated)?;
            summary.detached.push(measure.id.clone());
        }

        Ok(summary)
    }
}
