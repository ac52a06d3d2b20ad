//! Goal-rooted tree: StrategicGoal -> Process -> Measure
//!
//! Measures link to goals through the weak `strategic_goal_id` key. A goal
//! reaches a process once per linked measure, so processes are deduplicated
//! per goal and their measures nested underneath.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::core::identity::EntityId;
use crate::core::natural::natural_cmp;
use crate::core::store::FrameworkRows;
use crate::entities::{Element, PerformanceMeasure, Process, StrategicGoal};

/// Display context for the element that owns a goal or process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRef {
    pub id: EntityId,
    pub element_number: u32,
    pub title: String,
}

impl From<&Element> for ElementRef {
    fn from(e: &Element) -> Self {
        Self {
            id: e.id.clone(),
            element_number: e.element_number,
            title: e.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalNode {
    #[serde(flatten)]
    pub goal: StrategicGoal,
    pub element: ElementRef,
    pub processes: Vec<GoalProcessNode>,
}

/// A process reached from a goal, with only the measures linked to that goal
#[derive(Debug, Clone, Serialize)]
pub struct GoalProcessNode {
    #[serde(flatten)]
    pub process: Process,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementRef>,
    pub measures: Vec<PerformanceMeasure>,
}

impl GoalNode {
    pub fn measure_count(&self) -> usize {
        self.processes.iter().map(|p| p.measures.len()).sum()
    }
}

/// Build the goal tree from flat rows
///
/// Goals are ordered by owning element number, ties in load order.
/// Processes under a goal are in natural process-number order and appear
/// once per goal regardless of how many measures link them.
pub fn build_goal_tree(rows: &FrameworkRows) -> Vec<GoalNode> {
    let elements: HashMap<&EntityId, &Element> =
        rows.elements.iter().map(|e| (&e.id, e)).collect();
    let processes: HashMap<&EntityId, &Process> =
        rows.processes.iter().map(|p| (&p.id, p)).collect();

    let mut nodes: Vec<GoalNode> = Vec::new();
    let mut goal_index: HashMap<&EntityId, usize> = HashMap::new();

    for goal in &rows.goals {
        let Some(element) = elements.get(&goal.element_id) else {
            warn!(
                "goal {} references missing element {}; excluded",
                goal.id, goal.element_id
            );
            continue;
        };
        goal_index.insert(&goal.id, nodes.len());
        nodes.push(GoalNode {
            goal: goal.clone(),
            element: ElementRef::from(*element),
            processes: Vec::new(),
        });
    }

    // (goal, process) -> position in that goal's process list
    let mut seen: HashMap<(&EntityId, &EntityId), usize> = HashMap::new();

    for measure in &rows.measures {
        let Some(goal_id) = measure.strategic_goal_id.as_ref() else {
            continue;
        };
        let Some(&node_idx) = goal_index.get(goal_id) else {
            warn!(
                "measure {} references missing goal {}; excluded from goal tree",
                measure.id, goal_id
            );
            continue;
        };
        let Some(process) = processes.get(&measure.process_id) else {
            warn!(
                "measure {} references missing process {}; excluded",
                measure.id, measure.process_id
            );
            continue;
        };

        let node = &mut nodes[node_idx];
        let slot = *seen.entry((goal_id, &process.id)).or_insert_with(|| {
            node.processes.push(GoalProcessNode {
                process: (*process).clone(),
                element: elements.get(&process.element_id).map(|e| ElementRef::from(*e)),
                measures: Vec::new(),
            });
            node.processes.len() - 1
        });
        node.processes[slot].measures.push(measure.clone());
    }

    for node in &mut nodes {
        node.processes
            .sort_by(|a, b| natural_cmp(&a.process.process_number, &b.process.process_number));
    }
    nodes.sort_by_key(|n| n.element.element_number);

    debug!("built goal tree with {} goal(s)", nodes.len());
    nodes
}
