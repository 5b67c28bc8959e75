//! Connections and the connection manager.
//!
//! Edges are held twice: once in the graph's canonical connection list and
//! once in the source node's adjacency index. Every write to either goes
//! through the `&mut WorkflowGraph` methods in this module, each of which
//! updates both representations before returning.

use crate::graph::WorkflowGraph;
use crate::node::{NodeId, PortTarget};
use crate::port::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Connection identifier, derived from the full endpoint tuple.
///
/// Rendered as `<source>:<sourcePort>-><target>:<targetPort>`. Any `%`, `:`
/// or `>` inside a part is percent-encoded, so distinct tuples never share
/// an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Derives the id of the connection between the given endpoints.
    #[must_use]
    pub fn derive(
        source_node_id: &NodeId,
        source_port_id: &str,
        target_node_id: &NodeId,
        target_port_id: &str,
    ) -> Self {
        Self(format!(
            "{}:{}->{}:{}",
            escape_part(source_node_id.as_str()),
            escape_part(source_port_id),
            escape_part(target_node_id.as_str()),
            escape_part(target_port_id),
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn escape_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            '>' => escaped.push_str("%3E"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed edge from an output port to an input port.
///
/// Deserializing ignores any stored `id` and re-derives it, and fills in the
/// default ports when they are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ConnectionRecord")]
pub struct Connection {
    id: ConnectionId,
    source_node_id: NodeId,
    source_port_id: String,
    target_node_id: NodeId,
    target_port_id: String,
}

impl Connection {
    pub(crate) fn new(
        source_node_id: NodeId,
        source_port_id: impl Into<String>,
        target_node_id: NodeId,
        target_port_id: impl Into<String>,
    ) -> Self {
        let source_port_id = source_port_id.into();
        let target_port_id = target_port_id.into();
        Self {
            id: ConnectionId::derive(
                &source_node_id,
                &source_port_id,
                &target_node_id,
                &target_port_id,
            ),
            source_node_id,
            source_port_id,
            target_node_id,
            target_port_id,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    #[must_use]
    pub fn source_node_id(&self) -> &NodeId {
        &self.source_node_id
    }

    #[must_use]
    pub fn source_port_id(&self) -> &str {
        &self.source_port_id
    }

    #[must_use]
    pub fn target_node_id(&self) -> &NodeId {
        &self.target_node_id
    }

    #[must_use]
    pub fn target_port_id(&self) -> &str {
        &self.target_port_id
    }

    /// Returns true if `node_id` is the source or the target.
    #[must_use]
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source_node_id == node_id || &self.target_node_id == node_id
    }

    /// Returns true if both connections join the same ports of the same nodes.
    #[must_use]
    pub fn same_endpoints(&self, other: &Connection) -> bool {
        self.source_node_id == other.source_node_id
            && self.source_port_id == other.source_port_id
            && self.target_node_id == other.target_node_id
            && self.target_port_id == other.target_port_id
    }

    /// Returns the adjacency entry this connection contributes to its source.
    #[must_use]
    pub fn port_target(&self) -> PortTarget {
        PortTarget::new(self.target_node_id.clone(), self.target_port_id.clone())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionRecord {
    source_node_id: NodeId,
    #[serde(default = "default_output")]
    source_port_id: String,
    target_node_id: NodeId,
    #[serde(default = "default_input")]
    target_port_id: String,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_input() -> String {
    DEFAULT_INPUT.to_string()
}

impl From<ConnectionRecord> for Connection {
    fn from(record: ConnectionRecord) -> Self {
        Self::new(
            record.source_node_id,
            record.source_port_id,
            record.target_node_id,
            record.target_port_id,
        )
    }
}

impl WorkflowGraph {
    /// Connects an output port of `source` to an input port of `target`.
    ///
    /// Ports default to `"out"` and `"in"`. Returns `None` without changing
    /// anything if either node is absent. Connecting an identical endpoint
    /// tuple twice returns the existing id. Port compatibility and cycles are
    /// not checked.
    pub fn connect(
        &mut self,
        source: &NodeId,
        source_port: Option<&str>,
        target: &NodeId,
        target_port: Option<&str>,
    ) -> Option<ConnectionId> {
        if !self.contains_node(source) || !self.contains_node(target) {
            debug!(source = %source, target = %target, "connect skipped, endpoint missing");
            return None;
        }

        let connection = Connection::new(
            source.clone(),
            source_port.unwrap_or(DEFAULT_OUTPUT),
            target.clone(),
            target_port.unwrap_or(DEFAULT_INPUT),
        );
        if let Some(existing) = self
            .connections
            .iter()
            .find(|c| c.same_endpoints(&connection))
        {
            return Some(existing.id().clone());
        }

        let connection_id = connection.id().clone();

        self.link(connection);
        debug!(connection_id = %connection_id, "connected");
        Some(connection_id)
    }

    /// Removes one connection. Unknown ids are ignored.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        let index = self
            .connections
            .iter()
            .position(|c| c.id() == connection_id)?;
        let connection = self.connections.remove(index);
        if let Some(source) = self.node_mut(connection.source_node_id()) {
            source.remove_target(connection.source_port_id(), &connection.port_target());
        }
        debug!(connection_id = %connection_id, "disconnected");
        Some(connection)
    }

    /// Removes every listed connection, returning those that existed.
    pub fn disconnect_all<'a>(
        &mut self,
        connection_ids: impl IntoIterator<Item = &'a ConnectionId>,
    ) -> Vec<Connection> {
        connection_ids
            .into_iter()
            .filter_map(|id| self.disconnect(id))
            .collect()
    }

    /// Removes every connection entering or leaving `node_id`.
    pub(crate) fn disconnect_node(&mut self, node_id: &NodeId) -> Vec<Connection> {
        let touching: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|c| c.touches(node_id))
            .map(|c| c.id().clone())
            .collect();
        self.disconnect_all(&touching)
    }

    /// Replaces the connection list and rebuilds every adjacency index from it.
    ///
    /// Connections with a missing endpoint or a repeated id are dropped.
    /// Returns the number dropped.
    pub(crate) fn rebuild_connections(&mut self, connections: Vec<Connection>) -> usize {
        for node in &mut self.nodes {
            node.clear_targets();
        }
        self.connections.clear();

        let mut seen = HashSet::new();
        let mut dropped = 0;
        for connection in connections {
            let missing = [connection.source_node_id(), connection.target_node_id()]
                .into_iter()
                .find(|id| !self.contains_node(id))
                .cloned();
            if let Some(node_id) = missing {
                warn!(
                    connection_id = %connection.id(),
                    node_id = %node_id,
                    "dropping dangling connection"
                );
                dropped += 1;
                continue;
            }
            if !seen.insert(connection.id().clone()) {
                warn!(connection_id = %connection.id(), "dropping duplicate connection");
                dropped += 1;
                continue;
            }
            self.link(connection);
        }
        dropped
    }

    /// Appends to the connection list and the source adjacency together.
    fn link(&mut self, connection: Connection) {
        if let Some(source) = self.node_mut(connection.source_node_id()) {
            source.push_target(connection.source_port_id(), connection.port_target());
        }
        self.connections.push(connection);
    }
}
