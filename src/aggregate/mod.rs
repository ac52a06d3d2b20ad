//! Aggregation of flat record rows into the nested views used by the map,
//! scorecard, report and export commands

pub mod flow;
pub mod goal_tree;
pub mod mindmap;
pub mod scorecard;
pub mod tree;

pub use flow::{DecisionFlow, FlowEdge, UnresolvedEdge};
pub use goal_tree::{build_goal_tree, ElementRef, GoalNode, GoalProcessNode};
pub use mindmap::{MindMap, MindMapEdge, MindMapNode, NodeKind};
pub use scorecard::{by_element, measure_rows, CategoryGroup, ElementScorecard, MeasureContext, Scorecard};
pub use tree::{build_element_tree, ElementNode, ProcessNode};
