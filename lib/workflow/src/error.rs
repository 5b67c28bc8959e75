//! Error types for the workflow crate.
//!
//! Graph edits on absent ids are silent no-ops, so these errors cover only
//! what can genuinely go wrong:
//! - `GraphError`: a config edit that does not fit the node's kind, or a
//!   broken invariant reported by [`WorkflowGraph::verify`](crate::WorkflowGraph::verify)
//! - `PersistError`: a stored or template payload that cannot be decoded

use crate::connection::ConnectionId;
use crate::node::{NodeId, NodeKind};
use std::fmt;

/// Errors from graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A config replacement had a different kind than the node.
    ConfigKindMismatch {
        node_id: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },
    /// A config patch produced fields that do not fit the node's kind.
    InvalidConfigPatch { node_id: NodeId, details: String },
    /// Two nodes share an id.
    DuplicateNode { node_id: NodeId },
    /// Two connections share an id.
    DuplicateConnection { connection_id: ConnectionId },
    /// A connection refers to a node that is not in the graph.
    DanglingConnection {
        connection_id: ConnectionId,
        node_id: NodeId,
    },
    /// A node's adjacency index disagrees with the connection list.
    AdjacencyMismatch { node_id: NodeId, port_id: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigKindMismatch {
                node_id,
                expected,
                found,
            } => {
                write!(
                    f,
                    "node {node_id} is a {expected} node, cannot take a {found} config"
                )
            }
            Self::InvalidConfigPatch { node_id, details } => {
                write!(f, "invalid config patch for node {node_id}: {details}")
            }
            Self::DuplicateNode { node_id } => write!(f, "duplicate node id: {node_id}"),
            Self::DuplicateConnection { connection_id } => {
                write!(f, "duplicate connection id: {connection_id}")
            }
            Self::DanglingConnection {
                connection_id,
                node_id,
            } => {
                write!(
                    f,
                    "connection {connection_id} refers to missing node {node_id}"
                )
            }
            Self::AdjacencyMismatch { node_id, port_id } => {
                write!(
                    f,
                    "adjacency of node {node_id} port '{port_id}' disagrees with connections"
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors decoding persisted workflows and templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// A stored node carried a kind name outside the five known kinds.
    UnknownNodeKind { node_id: String, kind: String },
    /// A stored node's config does not fit its kind.
    InvalidConfig { node_id: String, details: String },
    /// The payload is not valid JSON of the expected shape.
    MalformedPayload { details: String },
    /// Encoding a payload failed.
    Encode { details: String },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNodeKind { node_id, kind } => {
                write!(f, "node {node_id} has unknown kind '{kind}'")
            }
            Self::InvalidConfig { node_id, details } => {
                write!(f, "invalid config for node {node_id}: {details}")
            }
            Self::MalformedPayload { details } => write!(f, "malformed payload: {details}"),
            Self::Encode { details } => write!(f, "failed to encode payload: {details}"),
        }
    }
}

impl std::error::Error for PersistError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_names_both_kinds() {
        let err = GraphError::ConfigKindMismatch {
            node_id: NodeId::from("n1"),
            expected: NodeKind::Trigger,
            found: NodeKind::Response,
        };
        assert_eq!(
            err.to_string(),
            "node n1 is a trigger node, cannot take a response config"
        );
    }

    #[test]
    fn unknown_kind_display() {
        let err = PersistError::UnknownNodeKind {
            node_id: "7".to_string(),
            kind: "webhook".to_string(),
        };
        assert!(err.to_string().contains("unknown kind 'webhook'"));
    }
}
