//! Structural analysis over a petgraph view of the workflow.
//!
//! These diagnostics are informational and never feed [`crate::validate`]:
//! a cycle or an unreachable node does not stop a workflow from being saved,
//! but an author usually wants to know about it.

use crate::connection::ConnectionId;
use crate::graph::WorkflowGraph;
use crate::node::{NodeId, NodeKind};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A directed view of a workflow graph keyed back to node ids.
pub struct FlowView {
    graph: DiGraph<NodeId, ConnectionId>,
    index: HashMap<NodeId, NodeIndex>,
}

impl FlowView {
    /// Builds the view from the canonical connection list.
    #[must_use]
    pub fn new(workflow: &WorkflowGraph) -> Self {
        let mut graph = DiGraph::with_capacity(workflow.node_count(), workflow.connection_count());
        let mut index = HashMap::with_capacity(workflow.node_count());
        for node in workflow.nodes() {
            index.insert(node.id().clone(), graph.add_node(node.id().clone()));
        }
        for connection in workflow.connections() {
            if let (Some(&source), Some(&target)) = (
                index.get(connection.source_node_id()),
                index.get(connection.target_node_id()),
            ) {
                graph.add_edge(source, target, connection.id().clone());
            }
        }
        Self { graph, index }
    }

    /// Returns true if any path leads back to its start, self-loops included.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns the node ids in an order where every connection points
    /// forward, or `None` if the graph is cyclic.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<NodeId>> {
        toposort(&self.graph, None)
            .ok()
            .map(|order| order.into_iter().map(|ix| self.graph[ix].clone()).collect())
    }

    /// Returns the ids reachable from any of `starts`, starts included.
    #[must_use]
    pub fn reachable_from<'a>(
        &self,
        starts: impl IntoIterator<Item = &'a NodeId>,
    ) -> HashSet<NodeId> {
        let mut reached = HashSet::new();
        for start in starts {
            let Some(&ix) = self.index.get(start) else {
                continue;
            };
            let mut bfs = Bfs::new(&self.graph, ix);
            while let Some(visited) = bfs.next(&self.graph) {
                reached.insert(self.graph[visited].clone());
            }
        }
        reached
    }
}

/// Advisory findings about the shape of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Whether any connection path loops back on itself.
    pub has_cycle: bool,
    /// Non-trigger nodes no trigger can reach, in node order.
    pub unreachable: Vec<NodeId>,
    /// Execution order when acyclic.
    pub topological_order: Option<Vec<NodeId>>,
}

/// Computes [`Diagnostics`] for `workflow`.
#[must_use]
pub fn diagnose(workflow: &WorkflowGraph) -> Diagnostics {
    let view = FlowView::new(workflow);
    let triggers: Vec<&NodeId> = workflow
        .nodes_of_kind(NodeKind::Trigger)
        .map(|n| n.id())
        .collect();
    let reached = view.reachable_from(triggers);
    let unreachable = workflow
        .nodes()
        .iter()
        .filter(|n| n.kind() != NodeKind::Trigger && !reached.contains(n.id()))
        .map(|n| n.id().clone())
        .collect();

    Diagnostics {
        has_cycle: view.has_cycle(),
        unreachable,
        topological_order: view.topological_order(),
    }
}
