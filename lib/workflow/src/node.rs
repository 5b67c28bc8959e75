//! Workflow nodes.
//!
//! A node is one building block of a command: exactly one trigger starts it,
//! actions, conditions and variable operations run in between, and a response
//! answers the user. Each node has:
//! - An opaque id that is stable for its lifetime
//! - A kind-specific [`NodeConfig`] (the config's case *is* the node's kind)
//! - A label and canvas position, both freely editable
//! - An adjacency index of its outgoing connections, keyed by output port
//!
//! The adjacency index is owned by the connection manager in
//! [`crate::connection`]; nothing else writes to it.

use crate::config::NodeConfig;
use crate::port::NodePorts;
use crate::registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ulid::Ulid;

/// An opaque node identifier, unique within one graph.
///
/// Fresh ids are `node_<ULID>`; ids coming from storage or templates are kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a new random node ID.
    #[must_use]
    pub fn new() -> Self {
        Self(format!("node_{}", Ulid::new()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The five kinds of building block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point: the command invocation itself.
    Trigger,
    /// Side effect against the chat platform.
    Action,
    /// Two-way branch.
    Condition,
    /// Read or write a stored variable.
    Variable,
    /// Reply sent back to the invoking user.
    Response,
}

impl NodeKind {
    /// Every kind, in palette order.
    pub const ALL: [Self; 5] = [
        Self::Trigger,
        Self::Action,
        Self::Condition,
        Self::Variable,
        Self::Response,
    ];

    /// Returns the wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Action => "action",
            Self::Condition => "condition",
            Self::Variable => "variable",
            Self::Response => "response",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canvas coordinate. Has no effect on semantics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One adjacency entry: where a connection leaving an output port lands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortTarget {
    pub target_node_id: NodeId,
    pub target_port_id: String,
}

impl PortTarget {
    #[must_use]
    pub fn new(target_node_id: NodeId, target_port_id: impl Into<String>) -> Self {
        Self {
            target_node_id,
            target_port_id: target_port_id.into(),
        }
    }
}

/// Outgoing connections of a node, grouped by output port id. Targets under a
/// port keep insertion order.
pub type Adjacency = BTreeMap<String, Vec<PortTarget>>;

/// A workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    /// Display name shown on the canvas.
    pub label: String,
    /// Canvas position.
    pub position: Position,
    config: NodeConfig,
    /// Rebuilt from the connection list whenever nodes are loaded in bulk.
    #[serde(default, skip_deserializing)]
    adjacency: Adjacency,
}

impl Node {
    /// Creates a node of `kind` with the registry defaults.
    pub(crate) fn with_defaults(id: NodeId, kind: NodeKind, position: Position) -> Self {
        let defaults = registry::defaults(kind);
        Self::from_parts(id, defaults.label, position, defaults.config)
    }

    /// Creates a node from already-validated parts, with empty adjacency.
    pub(crate) fn from_parts(
        id: NodeId,
        label: impl Into<String>,
        position: Position,
        config: NodeConfig,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            position,
            config,
            adjacency: Adjacency::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the kind of this node. Fixed at creation.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.config.kind()
    }

    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Returns the port shape of this node, derived from its kind.
    #[must_use]
    pub fn ports(&self) -> NodePorts {
        registry::ports(self.kind())
    }

    /// Returns the outgoing adjacency index.
    #[must_use]
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Returns the targets reached through `port_id`, in insertion order.
    #[must_use]
    pub fn targets(&self, port_id: &str) -> &[PortTarget] {
        self.adjacency.get(port_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Replaces the config with one of the same kind. Returns false otherwise.
    pub(crate) fn replace_config(&mut self, config: NodeConfig) -> bool {
        if config.kind() != self.kind() {
            return false;
        }
        self.config = config;
        true
    }

    pub(crate) fn push_target(&mut self, port_id: &str, target: PortTarget) {
        self.adjacency
            .entry(port_id.to_string())
            .or_default()
            .push(target);
    }

    /// Removes the first entry equal to `target` under `port_id`.
    pub(crate) fn remove_target(&mut self, port_id: &str, target: &PortTarget) -> bool {
        let Some(targets) = self.adjacency.get_mut(port_id) else {
            return false;
        };
        let Some(position) = targets.iter().position(|t| t == target) else {
            return false;
        };
        targets.remove(position);
        if targets.is_empty() {
            self.adjacency.remove(port_id);
        }
        true
    }

    pub(crate) fn clear_targets(&mut self) {
        self.adjacency.clear();
    }
}
