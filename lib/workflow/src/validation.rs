//! Structural validation of a workflow graph.
//!
//! Warnings are advisory: an invalid graph can still be saved. Rules are
//! evaluated in a fixed order and all of them are reported. Connectivity and
//! port compatibility are not checked here; see [`crate::analysis`].

use crate::graph::WorkflowGraph;
use crate::node::NodeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A structural deficiency that makes a graph not execution-ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationWarning {
    MissingTrigger,
    MultipleTriggers,
    MissingResponse,
}

impl ValidationWarning {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingTrigger => "needs at least one trigger node",
            Self::MultipleTriggers => "can only have one trigger node",
            Self::MissingResponse => "should have at least one response node",
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Validates `graph`, returning its warnings in rule order.
///
/// An empty graph is unstarted rather than invalid and yields no warnings.
#[must_use]
pub fn validate(graph: &WorkflowGraph) -> Vec<ValidationWarning> {
    if graph.is_empty() {
        return Vec::new();
    }

    let triggers = graph.nodes_of_kind(NodeKind::Trigger).count();
    let responses = graph.nodes_of_kind(NodeKind::Response).count();

    let mut warnings = Vec::new();
    if triggers == 0 {
        warnings.push(ValidationWarning::MissingTrigger);
    }
    if triggers > 1 {
        warnings.push(ValidationWarning::MultipleTriggers);
    }
    if responses == 0 {
        warnings.push(ValidationWarning::MissingResponse);
    }
    warnings
}

/// Like [`validate`], rendered as display strings.
#[must_use]
pub fn validation_messages(graph: &WorkflowGraph) -> Vec<String> {
    validate(graph).into_iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Position;

    fn graph_of(kinds: &[NodeKind]) -> WorkflowGraph {
        let mut graph = WorkflowGraph::new();
        for &kind in kinds {
            graph.add_node(kind, Position::default());
        }
        graph
    }

    #[test]
    fn empty_graph_has_no_warnings() {
        assert!(validate(&WorkflowGraph::new()).is_empty());
    }

    #[test]
    fn connected_trigger_and_response_is_clean() {
        let mut graph = WorkflowGraph::new();
        let trigger = graph.add_node(NodeKind::Trigger, Position::default());
        let response = graph.add_node(NodeKind::Response, Position::default());
        graph.connect(&trigger, None, &response, None);
        assert!(validate(&graph).is_empty());
    }

    #[test]
    fn two_triggers_without_response_in_fixed_order() {
        let graph = graph_of(&[NodeKind::Trigger, NodeKind::Trigger]);
        assert_eq!(
            validation_messages(&graph),
            vec![
                "can only have one trigger node",
                "should have at least one response node"
            ]
        );
    }

    #[test]
    fn lone_trigger_needs_response() {
        let graph = graph_of(&[NodeKind::Trigger]);
        assert_eq!(validate(&graph), vec![ValidationWarning::MissingResponse]);
    }

    #[test]
    fn rules_are_independent() {
        let graph = graph_of(&[NodeKind::Action]);
        assert_eq!(
            validate(&graph),
            vec![
                ValidationWarning::MissingTrigger,
                ValidationWarning::MissingResponse
            ]
        );
    }

    #[test]
    fn unreachable_nodes_are_not_reported() {
        let graph = graph_of(&[NodeKind::Trigger, NodeKind::Variable, NodeKind::Response]);
        assert!(validate(&graph).is_empty());
    }
}
