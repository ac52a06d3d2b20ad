//! Decision flow for the steps of one process
//!
//! Outcomes are stored as flat rows (from step id, to step number). The flow
//! resolves them into an adjacency list keyed by step id at read time.
//! Cycles are allowed in stored data; [`DecisionFlow::cycles`] reports them.

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::core::identity::EntityId;
use crate::entities::{Outcome, Step};

/// A resolved decision edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    pub outcome_id: EntityId,
    pub from: EntityId,
    pub to: EntityId,
    pub label: String,
    pub priority: u32,
}

/// An outcome whose target step number does not exist in the process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedEdge {
    pub outcome_id: EntityId,
    pub from: EntityId,
    pub to_step_number: u32,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct DecisionFlow {
    /// Step ids in step-number order
    order: Vec<EntityId>,
    numbers: HashMap<EntityId, u32>,
    adjacency: HashMap<EntityId, Vec<FlowEdge>>,
    unresolved: Vec<UnresolvedEdge>,
}

impl DecisionFlow {
    /// Resolve outcome edges against the given steps
    ///
    /// When several steps share a number, an edge targets the first of them
    /// in step order. Outcomes leaving a step that is not in `steps` are
    /// dropped.
    pub fn build(steps: &[Step], outcomes: &[Outcome]) -> Self {
        let mut sorted: Vec<&Step> = steps.iter().collect();
        sorted.sort_by_key(|s| s.step_number);

        let mut by_number: HashMap<u32, &EntityId> = HashMap::new();
        for step in &sorted {
            by_number.entry(step.step_number).or_insert(&step.id);
        }

        let mut flow = DecisionFlow {
            order: sorted.iter().map(|s| s.id.clone()).collect(),
            numbers: sorted.iter().map(|s| (s.id.clone(), s.step_number)).collect(),
            ..Default::default()
        };

        for outcome in outcomes {
            if !flow.numbers.contains_key(&outcome.from_step_id) {
                warn!(
                    "outcome {} leaves missing step {}; excluded",
                    outcome.id, outcome.from_step_id
                );
                continue;
            }
            match by_number.get(&outcome.to_step_number) {
                Some(&to) => flow
                    .adjacency
                    .entry(outcome.from_step_id.clone())
                    .or_default()
                    .push(FlowEdge {
                        outcome_id: outcome.id.clone(),
                        from: outcome.from_step_id.clone(),
                        to: to.clone(),
                        label: outcome.label.clone(),
                        priority: outcome.priority,
                    }),
                None => {
                    warn!(
                        "outcome {} targets missing step number {}",
                        outcome.id, outcome.to_step_number
                    );
                    flow.unresolved.push(UnresolvedEdge {
                        outcome_id: outcome.id.clone(),
                        from: outcome.from_step_id.clone(),
                        to_step_number: outcome.to_step_number,
                        label: outcome.label.clone(),
                    });
                }
            }
        }

        for edges in flow.adjacency.values_mut() {
            edges.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.label.cmp(&b.label)));
        }

        flow
    }

    /// Outgoing edges of a step, by priority then label
    pub fn edges_from(&self, step: &EntityId) -> &[FlowEdge] {
        self.adjacency.get(step).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edges(&self) -> impl Iterator<Item = &FlowEdge> {
        self.order.iter().flat_map(|id| self.edges_from(id))
    }

    pub fn unresolved(&self) -> &[UnresolvedEdge] {
        &self.unresolved
    }

    pub fn step_number(&self, step: &EntityId) -> Option<u32> {
        self.numbers.get(step).copied()
    }

    /// Back edges found by depth-first search from each step in step order
    ///
    /// Every cycle in the flow contains at least one of the returned edges.
    pub fn cycles(&self) -> Vec<FlowEdge> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let mut marks: HashMap<&EntityId, Mark> =
            self.order.iter().map(|id| (id, Mark::Unvisited)).collect();
        let mut back_edges = Vec::new();

        for root in &self.order {
            if marks.get(root) != Some(&Mark::Unvisited) {
                continue;
            }

            // (node, index of next edge to explore)
            let mut stack: Vec<(&EntityId, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::OnStack);

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let edges = self.edges_from(node);
                if top.1 >= edges.len() {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                    continue;
                }

                let edge = &edges[top.1];
                top.1 += 1;
                match marks.get(&edge.to).copied().unwrap_or(Mark::Done) {
                    Mark::OnStack => back_edges.push(edge.clone()),
                    Mark::Unvisited => {
                        marks.insert(&edge.to, Mark::OnStack);
                        stack.push((&edge.to, 0));
                    }
                    Mark::Done => {}
                }
            }
        }

        back_edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::StepType;
    use crate::core::identity::EntityPrefix;

    fn steps(types: &[StepType]) -> Vec<Step> {
        let process = EntityId::new(EntityPrefix::Proc);
        types
            .iter()
            .enumerate()
            .map(|(i, t)| {
                Step::new(
                    process.clone(),
                    i as u32 + 1,
                    *t,
                    format!("step {}", i + 1),
                    "t".to_string(),
                )
            })
            .collect()
    }

    fn edge(from: &Step, to: u32, label: &str, priority: u32) -> Outcome {
        Outcome::new(from, to, label.to_string(), priority, "t".to_string())
    }

    #[test]
    fn test_edges_resolved_by_step_number() {
        let s = steps(&[StepType::Decision, StepType::Task, StepType::End]);
        let outcomes = vec![edge(&s[0], 3, "No", 1), edge(&s[0], 2, "Yes", 0)];

        let flow = DecisionFlow::build(&s, &outcomes);
        let out = flow.edges_from(&s[0].id);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, "Yes");
        assert_eq!(out[0].to, s[1].id);
        assert_eq!(out[1].to, s[2].id);
        assert!(flow.edges_from(&s[1].id).is_empty());
        assert!(flow.cycles().is_empty());
    }

    #[test]
    fn test_unresolved_targets_are_kept() {
        let s = steps(&[StepType::Decision]);
        let flow = DecisionFlow::build(&s, &[edge(&s[0], 7, "Escalate", 0)]);
        assert_eq!(flow.unresolved().len(), 1);
        assert_eq!(flow.unresolved()[0].to_step_number, 7);
        assert_eq!(flow.edges().count(), 0);
    }

    #[test]
    fn test_loop_back_is_reported() {
        let s = steps(&[StepType::Task, StepType::Decision, StepType::End]);
        let outcomes = vec![
            edge(&s[1], 1, "Retry", 0),
            edge(&s[1], 3, "Done", 1),
            edge(&s[0], 2, "Next", 0),
        ];

        let flow = DecisionFlow::build(&s, &outcomes);
        let cycles = flow.cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].label, "Retry");
        assert_eq!(flow.step_number(&cycles[0].to), Some(1));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let s = steps(&[StepType::Decision]);
        let flow = DecisionFlow::build(&s, &[edge(&s[0], 1, "Again", 0)]);
        assert_eq!(flow.cycles().len(), 1);
    }
}
