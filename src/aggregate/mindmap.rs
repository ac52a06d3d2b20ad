//! Mind map graph built from either tree shape
//!
//! The map is a flat node/edge list for external visualizers, and renders
//! as an indented box-drawing tree in the terminal.

use serde::Serialize;
use std::collections::HashMap;

use crate::aggregate::goal_tree::GoalNode;
use crate::aggregate::tree::ElementNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Element,
    Goal,
    Process,
    Step,
    Measure,
}

#[derive(Debug, Clone, Serialize)]
pub struct MindMapNode {
    /// Unique within the map
    pub id: String,
    /// Record id the node stands for (absent for the root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub label: String,
    pub kind: NodeKind,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindMapEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MindMap {
    pub nodes: Vec<MindMapNode>,
    pub edges: Vec<MindMapEdge>,
}

const ROOT_ID: &str = "root";

impl MindMap {
    fn with_root(label: &str) -> Self {
        let mut map = Self::default();
        map.nodes.push(MindMapNode {
            id: ROOT_ID.to_string(),
            entity_id: None,
            label: label.to_string(),
            kind: NodeKind::Root,
            depth: 0,
        });
        map
    }

    fn add(&mut self, parent: &str, id: String, entity_id: String, label: String, kind: NodeKind) -> String {
        let depth = self
            .nodes
            .iter()
            .rev()
            .find(|n| n.id == parent)
            .map_or(0, |n| n.depth + 1);
        self.edges.push(MindMapEdge {
            source: parent.to_string(),
            target: id.clone(),
        });
        self.nodes.push(MindMapNode {
            id: id.clone(),
            entity_id: Some(entity_id),
            label,
            kind,
            depth,
        });
        id
    }

    /// Elements -> Processes, optionally down to steps and measures
    pub fn from_elements(tree: &[ElementNode], with_children: bool) -> Self {
        let mut map = Self::with_root("Operational Excellence");

        for node in tree {
            let elem_id = node.element.id.to_string();
            let elem = map.add(
                ROOT_ID,
                elem_id.clone(),
                elem_id,
                node.element.label(),
                NodeKind::Element,
            );

            for proc_node in &node.processes {
                let proc_id = proc_node.process.id.to_string();
                let proc = map.add(
                    &elem,
                    proc_id.clone(),
                    proc_id,
                    proc_node.process.label(),
                    NodeKind::Process,
                );

                if !with_children {
                    continue;
                }
                for step in &proc_node.steps {
                    let id = step.id.to_string();
                    map.add(
                        &proc,
                        id.clone(),
                        id,
                        format!("{}. {}", step.step_number, step.title),
                        NodeKind::Step,
                    );
                }
                for measure in &proc_node.measures {
                    let id = measure.id.to_string();
                    map.add(&proc, id.clone(), id, measure.name.clone(), NodeKind::Measure);
                }
            }
        }

        map
    }

    /// Goals -> Processes -> Measures
    ///
    /// A process linked to several goals appears once under each, so process
    /// node ids are qualified by their goal.
    pub fn from_goals(tree: &[GoalNode]) -> Self {
        let mut map = Self::with_root("Strategic Goals");

        for node in tree {
            let goal_id = node.goal.id.to_string();
            let goal = map.add(
                ROOT_ID,
                goal_id.clone(),
                goal_id,
                format!("{} [{}]", node.goal.title, node.goal.category),
                NodeKind::Goal,
            );

            for proc_node in &node.processes {
                let proc_entity = proc_node.process.id.to_string();
                let proc = map.add(
                    &goal,
                    format!("{}/{}", goal, proc_entity),
                    proc_entity,
                    proc_node.process.label(),
                    NodeKind::Process,
                );
                for measure in &proc_node.measures {
                    let id = measure.id.to_string();
                    map.add(&proc, id.clone(), id, measure.name.clone(), NodeKind::Measure);
                }
            }
        }

        map
    }

    pub fn root(&self) -> Option<&MindMapNode> {
        self.nodes.first()
    }

    /// Children of a node, in insertion order
    pub fn children(&self, id: &str) -> Vec<&MindMapNode> {
        let index: HashMap<&str, &MindMapNode> =
            self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .filter_map(|e| index.get(e.target.as_str()).copied())
            .collect()
    }

    /// Render as an indented tree
    pub fn render_tree(&self) -> String {
        let mut children: HashMap<&str, Vec<&MindMapNode>> = HashMap::new();
        let index: HashMap<&str, &MindMapNode> =
            self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        for edge in &self.edges {
            if let Some(target) = index.get(edge.target.as_str()) {
                children.entry(edge.source.as_str()).or_default().push(*target);
            }
        }

        let mut output = String::new();
        let Some(root) = self.root() else {
            return output;
        };
        output.push_str(&root.label);
        output.push('\n');

        // (node, prefix for its children, is last sibling)
        let mut stack: Vec<(&MindMapNode, String, bool)> = Vec::new();
        push_children(&mut stack, &children, &root.id, "");

        while let Some((node, prefix, is_last)) = stack.pop() {
            let branch = if is_last { "└─ " } else { "├─ " };
            output.push_str(&format!("{}{}{}\n", prefix, branch, node.label));
            let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
            push_children(&mut stack, &children, &node.id, &child_prefix);
        }

        output
    }
}

/// Push a node's children so the first child is popped first
fn push_children<'a>(
    stack: &mut Vec<(&'a MindMapNode, String, bool)>,
    children: &HashMap<&str, Vec<&'a MindMapNode>>,
    id: &str,
    prefix: &str,
) {
    if let Some(kids) = children.get(id) {
        for (i, kid) in kids.iter().enumerate().rev() {
            stack.push((*kid, prefix.to_string(), i == kids.len() - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{build_element_tree, build_goal_tree};
    use crate::core::entity::{ScorecardCategory, StepType};
    use crate::core::store::FrameworkRows;
    use crate::entities::{Element, PerformanceMeasure, Process, Step, StrategicGoal};

    fn rows() -> FrameworkRows {
        let e = Element::new(1, "Leadership".to_string(), "t".to_string());
        let p = Process::new("OE-1.1".to_string(), "Planning".to_string(), e.id.clone(), "t".to_string());
        let q = Process::new("OE-1.2".to_string(), "Review".to_string(), e.id.clone(), "t".to_string());
        let s = Step::new(p.id.clone(), 1, StepType::Start, "Kickoff".to_string(), "t".to_string());
        let g1 = StrategicGoal::new(e.id.clone(), "Margin".to_string(), ScorecardCategory::Financial, "t".to_string());
        let g2 = StrategicGoal::new(e.id.clone(), "NPS".to_string(), ScorecardCategory::Customer, "t".to_string());
        let m1 = PerformanceMeasure::new(p.id.clone(), "Cost".to_string(), "t".to_string()).with_goal(g1.id.clone());
        let m2 = PerformanceMeasure::new(p.id.clone(), "Survey".to_string(), "t".to_string()).with_goal(g2.id.clone());
        FrameworkRows {
            elements: vec![e],
            processes: vec![p, q],
            steps: vec![s],
            measures: vec![m1, m2],
            goals: vec![g1, g2],
            ..Default::default()
        }
    }

    #[test]
    fn test_element_map_structure() {
        let tree = build_element_tree(&rows());
        let shallow = MindMap::from_elements(&tree, false);
        assert_eq!(shallow.nodes.len(), 4);
        assert_eq!(shallow.edges.len(), 3);

        let deep = MindMap::from_elements(&tree, true);
        assert_eq!(deep.nodes.len(), 7);
        let leaf_depths: Vec<usize> = deep
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Step | NodeKind::Measure))
            .map(|n| n.depth)
            .collect();
        assert!(leaf_depths.iter().all(|d| *d == 3));
    }

    #[test]
    fn test_goal_map_qualifies_shared_processes() {
        let map = MindMap::from_goals(&build_goal_tree(&rows()));
        let procs: Vec<&MindMapNode> = map
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Process)
            .collect();
        assert_eq!(procs.len(), 2);
        assert_ne!(procs[0].id, procs[1].id);
        assert_eq!(procs[0].entity_id, procs[1].entity_id);
    }

    #[test]
    fn test_render_tree() {
        let tree = build_element_tree(&rows());
        let text = MindMap::from_elements(&tree, false).render_tree();
        let expected = concat!(
            "Operational Excellence\n",
            "└─ 1. Leadership\n",
            "   ├─ OE-1.1 Planning\n",
            "   └─ OE-1.2 Review\n",
        );
        assert_eq!(text, expected);
        assert_eq!(MindMap::from_elements(&tree, false).children(ROOT_ID).len(), 1);
    }
}
