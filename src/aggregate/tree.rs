//! Element-rooted tree: Element -> Process -> Step / Measure

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::core::identity::EntityId;
use crate::core::natural::natural_cmp;
use crate::core::store::FrameworkRows;
use crate::entities::{Element, PerformanceMeasure, Process, Step};

/// An element with its processes in natural process-number order
#[derive(Debug, Clone, Serialize)]
pub struct ElementNode {
    #[serde(flatten)]
    pub element: Element,
    pub processes: Vec<ProcessNode>,
}

/// A process with its steps in step-number order and its measures
#[derive(Debug, Clone, Serialize)]
pub struct ProcessNode {
    #[serde(flatten)]
    pub process: Process,
    pub steps: Vec<Step>,
    pub measures: Vec<PerformanceMeasure>,
}

impl ElementNode {
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn step_count(&self) -> usize {
        self.processes.iter().map(|p| p.steps.len()).sum()
    }

    pub fn measure_count(&self) -> usize {
        self.processes.iter().map(|p| p.measures.len()).sum()
    }
}

/// Group child rows under their parent id, dropping rows whose parent is unknown
fn group_by_parent<'a, T, F>(
    rows: &'a [T],
    parents: &HashSet<&EntityId>,
    kind: &str,
    parent_of: F,
) -> HashMap<EntityId, Vec<&'a T>>
where
    F: Fn(&T) -> (&EntityId, &EntityId),
{
    let mut grouped: HashMap<EntityId, Vec<&T>> = HashMap::new();
    for row in rows {
        let (id, parent) = parent_of(row);
        if parents.contains(parent) {
            grouped.entry(parent.clone()).or_default().push(row);
        } else {
            warn!("{} {} references missing parent {}; excluded", kind, id, parent);
        }
    }
    grouped
}

/// Build the element tree from flat rows
///
/// Elements are ordered by element number, processes by natural process
/// number, steps by step number. Sorts are stable, so equal step numbers
/// keep their load order. Input rows are never modified.
pub fn build_element_tree(rows: &FrameworkRows) -> Vec<ElementNode> {
    let element_ids: HashSet<&EntityId> = rows.elements.iter().map(|e| &e.id).collect();
    let mut processes_by_element =
        group_by_parent(&rows.processes, &element_ids, "process", |p| (&p.id, &p.element_id));

    // Only processes that made it into the tree may own children
    let process_ids: HashSet<&EntityId> = processes_by_element
        .values()
        .flatten()
        .copied()
        .map(|p| &p.id)
        .collect();
    let mut steps_by_process =
        group_by_parent(&rows.steps, &process_ids, "step", |s| (&s.id, &s.process_id));
    let mut measures_by_process =
        group_by_parent(&rows.measures, &process_ids, "measure", |m| (&m.id, &m.process_id));

    let mut elements: Vec<&Element> = rows.elements.iter().collect();
    elements.sort_by_key(|e| e.element_number);

    let tree: Vec<ElementNode> = elements
        .into_iter()
        .map(|element| {
            let mut processes = processes_by_element.remove(&element.id).unwrap_or_default();
            processes.sort_by(|a, b| natural_cmp(&a.process_number, &b.process_number));

            let processes = processes
                .into_iter()
                .map(|process| {
                    let mut steps = steps_by_process.remove(&process.id).unwrap_or_default();
                    steps.sort_by_key(|s| s.step_number);
                    let measures = measures_by_process.remove(&process.id).unwrap_or_default();

                    ProcessNode {
                        process: process.clone(),
                        steps: steps.into_iter().cloned().collect(),
                        measures: measures.into_iter().cloned().collect(),
                    }
                })
                .collect();

            ElementNode {
                element: element.clone(),
                processes,
            }
        })
        .collect();

    debug!("built element tree with {} element(s)", tree.len());
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::StepType;

    fn element(number: u32) -> Element {
        Element::new(number, format!("Element {}", number), "t".to_string())
    }

    fn process(element: &Element, number: &str) -> Process {
        Process::new(
            number.to_string(),
            format!("Process {}", number),
            element.id.clone(),
            "t".to_string(),
        )
    }

    fn step(process: &Process, number: u32, title: &str) -> Step {
        Step::new(
            process.id.clone(),
            number,
            StepType::Task,
            title.to_string(),
            "t".to_string(),
        )
    }

    fn numbers(node: &ElementNode) -> Vec<&str> {
        node.processes
            .iter()
            .map(|p| p.process.process_number.as_str())
            .collect()
    }

    #[test]
    fn test_processes_in_natural_order() {
        let e = element(1);
        let rows = FrameworkRows {
            processes: vec![
                process(&e, "OE-1.1"),
                process(&e, "OE-1.10"),
                process(&e, "OE-1.2"),
            ],
            elements: vec![e],
            ..Default::default()
        };

        let tree = build_element_tree(&rows);
        assert_eq!(tree.len(), 1);
        assert_eq!(numbers(&tree[0]), vec!["OE-1.1", "OE-1.2", "OE-1.10"]);
    }

    #[test]
    fn test_elements_ordered_by_number() {
        let rows = FrameworkRows {
            elements: vec![element(3), element(1), element(2)],
            ..Default::default()
        };
        let order: Vec<u32> = build_element_tree(&rows)
            .iter()
            .map(|n| n.element.element_number)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_steps_sorted_stably() {
        let e = element(1);
        let p = process(&e, "OE-1.1");
        let rows = FrameworkRows {
            steps: vec![
                step(&p, 3, "c"),
                step(&p, 1, "a"),
                step(&p, 3, "d"),
                step(&p, 2, "b"),
            ],
            processes: vec![p],
            elements: vec![e],
            ..Default::default()
        };

        let tree = build_element_tree(&rows);
        let titles: Vec<&str> = tree[0].processes[0]
            .steps
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_children_are_empty_lists() {
        let e = element(1);
        let p = process(&e, "OE-1.1");
        let lonely = element(2);
        let rows = FrameworkRows {
            processes: vec![p],
            elements: vec![e, lonely],
            ..Default::default()
        };

        let tree = build_element_tree(&rows);
        assert!(tree[0].processes[0].steps.is_empty());
        assert!(tree[0].processes[0].measures.is_empty());
        assert!(tree[1].processes.is_empty());

        let json = serde_json::to_value(&tree[1]).unwrap();
        assert_eq!(json["processes"], serde_json::json!([]));
    }

    #[test]
    fn test_dangling_rows_are_excluded() {
        let e = element(1);
        let ghost = element(9);
        let orphan = process(&ghost, "OE-9.1");
        let orphan_step = step(&orphan, 1, "lost");
        let rows = FrameworkRows {
            processes: vec![process(&e, "OE-1.1"), orphan],
            steps: vec![orphan_step],
            elements: vec![e],
            ..Default::default()
        };

        let tree = build_element_tree(&rows);
        assert_eq!(numbers(&tree[0]), vec!["OE-1.1"]);
        assert_eq!(tree[0].step_count(), 0);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let e = element(1);
        let p1 = process(&e, "OE-1.2");
        let p2 = process(&e, "OE-1.1");
        let rows = FrameworkRows {
            steps: vec![step(&p1, 2, "x"), step(&p1, 1, "y")],
            measures: vec![PerformanceMeasure::new(
                p2.id.clone(),
                "Lead time".to_string(),
                "t".to_string(),
            )],
            processes: vec![p1, p2],
            elements: vec![e],
            ..Default::default()
        };

        let first = serde_json::to_value(build_element_tree(&rows)).unwrap();
        let second = serde_json::to_value(build_element_tree(&rows)).unwrap();
        assert_eq!(first, second);
        // Input order untouched
        assert_eq!(rows.processes[0].process_number, "OE-1.2");
        assert_eq!(rows.steps[0].step_number, 2);
    }
}
