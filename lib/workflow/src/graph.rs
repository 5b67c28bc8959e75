//! The workflow graph: the canonical node and connection collections.
//!
//! Node edits live here; connection edits live in [`crate::connection`].
//! Every `&mut self` method is one indivisible state transition, so callers
//! never observe the connection list and the adjacency indexes disagreeing.
//!
//! Edits addressed to an absent node are silent no-ops: an editing surface can
//! race ahead of state (a delete and a drag in the same tick), and neither
//! side should fail because of it.

use crate::config::{ConfigPatch, NodeConfig};
use crate::connection::{Connection, ConnectionId};
use crate::error::GraphError;
use crate::node::{Adjacency, Node, NodeId, NodeKind, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// A workflow graph of typed nodes and port-to-port connections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "GraphParts")]
pub struct WorkflowGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) connections: Vec<Connection>,
}

#[derive(Deserialize)]
struct GraphParts {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    connections: Vec<Connection>,
}

impl From<GraphParts> for WorkflowGraph {
    fn from(parts: GraphParts) -> Self {
        let mut graph = Self::new();
        graph.replace_all(parts.nodes, parts.connections);
        graph
    }
}

impl WorkflowGraph {
    /// Creates a new empty workflow graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Returns all nodes in creation order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns all connections in creation order.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns a node by its ID.
    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id() == node_id)
    }

    #[must_use]
    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.node(node_id).is_some()
    }

    /// Returns a connection by its ID.
    #[must_use]
    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id() == connection_id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the nodes of one kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    /// Returns the first trigger node, if any.
    #[must_use]
    pub fn trigger(&self) -> Option<&Node> {
        self.nodes_of_kind(NodeKind::Trigger).next()
    }

    /// Adds a node of `kind` with registry defaults and a fresh id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let node_id = NodeId::new();
        self.nodes
            .push(Node::with_defaults(node_id.clone(), kind, position));
        debug!(node_id = %node_id, kind = %kind, "node added");
        node_id
    }

    /// Removes a node and every connection touching it.
    ///
    /// Returns `None` if the node is absent; removing twice is harmless.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id() == node_id)?;
        let removed = self.disconnect_node(node_id);
        let node = self.nodes.remove(index);
        debug!(node_id = %node_id, connections_removed = removed.len(), "node removed");
        Some(node)
    }

    /// Shallow-merges `patch` into a node's config and optionally relabels it.
    ///
    /// Returns `Ok(false)` if the node is absent.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the node untouched, if the merged config no
    /// longer fits the node's kind.
    pub fn update_node(
        &mut self,
        node_id: &NodeId,
        label: Option<String>,
        patch: &ConfigPatch,
    ) -> Result<bool, GraphError> {
        let Some(node) = self.node_mut(node_id) else {
            return Ok(false);
        };
        let merged = node
            .config()
            .merged(patch)
            .map_err(|e| GraphError::InvalidConfigPatch {
                node_id: node_id.clone(),
                details: e.to_string(),
            })?;
        node.replace_config(merged);
        if let Some(label) = label {
            node.label = label;
        }
        debug!(node_id = %node_id, fields = patch.len(), "node updated");
        Ok(true)
    }

    /// Replaces a node's config with a value of the same kind.
    ///
    /// Returns `Ok(false)` if the node is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` belongs to a different kind.
    pub fn set_config(&mut self, node_id: &NodeId, config: NodeConfig) -> Result<bool, GraphError> {
        let Some(node) = self.node_mut(node_id) else {
            return Ok(false);
        };
        let (expected, found) = (node.kind(), config.kind());
        if !node.replace_config(config) {
            return Err(GraphError::ConfigKindMismatch {
                node_id: node_id.clone(),
                expected,
                found,
            });
        }
        Ok(true)
    }

    /// Moves a node. Returns false if it is absent.
    pub fn set_position(&mut self, node_id: &NodeId, position: Position) -> bool {
        match self.node_mut(node_id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Atomically replaces every node and connection.
    ///
    /// Nodes with an already-seen id are dropped, adjacency is rebuilt from
    /// `connections`, and connections with a missing endpoint or repeated id
    /// are dropped. Returns the number of records dropped.
    pub fn replace_all(&mut self, nodes: Vec<Node>, connections: Vec<Connection>) -> usize {
        let mut seen = HashSet::new();
        let mut dropped = 0;
        self.nodes = nodes
            .into_iter()
            .filter(|node| {
                let fresh = seen.insert(node.id().clone());
                if !fresh {
                    warn!(node_id = %node.id(), "dropping duplicate node");
                    dropped += 1;
                }
                fresh
            })
            .collect();
        dropped += self.rebuild_connections(connections);
        debug!(
            nodes = self.nodes.len(),
            connections = self.connections.len(),
            dropped,
            "graph replaced"
        );
        dropped
    }

    /// Removes every node and connection.
    pub fn clear(&mut self) {
        self.replace_all(Vec::new(), Vec::new());
    }

    /// Consumes the graph, returning its nodes and connections.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Node>, Vec<Connection>) {
        (self.nodes, self.connections)
    }

    /// Checks the structural invariants.
    ///
    /// - node ids and connection ids are unique
    /// - every connection endpoint is a node in the graph
    /// - every node's adjacency equals its outgoing connections grouped by
    ///   source port, in list order
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn verify(&self) -> Result<(), GraphError> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id()) {
                return Err(GraphError::DuplicateNode {
                    node_id: node.id().clone(),
                });
            }
        }

        let mut connection_ids = HashSet::new();
        let mut expected: BTreeMap<&NodeId, Adjacency> = BTreeMap::new();
        for connection in &self.connections {
            if !connection_ids.insert(connection.id()) {
                return Err(GraphError::DuplicateConnection {
                    connection_id: connection.id().clone(),
                });
            }
            for endpoint in [connection.source_node_id(), connection.target_node_id()] {
                if !node_ids.contains(endpoint) {
                    return Err(GraphError::DanglingConnection {
                        connection_id: connection.id().clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
            expected
                .entry(connection.source_node_id())
                .or_default()
                .entry(connection.source_port_id().to_string())
                .or_default()
                .push(connection.port_target());
        }

        let empty = Adjacency::new();
        for node in &self.nodes {
            let want = expected.get(node.id()).unwrap_or(&empty);
            let have = node.adjacency();
            if let Some(port_id) = want
                .keys()
                .chain(have.keys())
                .find(|port| want.get(*port) != have.get(*port))
            {
                return Err(GraphError::AdjacencyMismatch {
                    node_id: node.id().clone(),
                    port_id: port_id.clone(),
                });
            }
        }
        Ok(())
    }
}
