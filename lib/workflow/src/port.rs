//! Port descriptors for workflow nodes.
//!
//! Ports are named attachment points. Connections leave a node through one of
//! its output ports and enter another node through one of its input ports.
//! The port shape of a node is fixed by its kind (see [`crate::registry`]).

use serde::{Deserialize, Serialize};

/// The single input port of every non-trigger node.
pub const DEFAULT_INPUT: &str = "in";

/// The single output port of trigger, action and variable nodes.
pub const DEFAULT_OUTPUT: &str = "out";

/// Output taken by a condition node when its check passes.
pub const TRUE_OUTPUT: &str = "true";

/// Output taken by a condition node when its check fails.
pub const FALSE_OUTPUT: &str = "false";

/// How a port participates in control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    /// Plain sequential flow.
    #[default]
    Default,
    /// One branch of a condition node.
    Condition,
}

/// A named port on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port id, unique among the node's inputs or outputs.
    pub id: String,
    /// Flow role of this port.
    pub kind: PortKind,
}

impl Port {
    /// Creates a plain flow port.
    #[must_use]
    pub fn flow(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: PortKind::Default,
        }
    }

    /// Creates a condition branch port.
    #[must_use]
    pub fn branch(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: PortKind::Condition,
        }
    }
}

/// The ordered input and output ports of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodePorts {
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

impl NodePorts {
    /// Returns the output port with the given id, if any.
    #[must_use]
    pub fn output(&self, id: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.id == id)
    }

    /// Returns the output port ids in declaration order.
    pub fn output_ids(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|p| p.id.as_str())
    }
}
