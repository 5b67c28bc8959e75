//! Persistence codec.
//!
//! The storage layer keeps one record per node and embeds each node's
//! adjacency map inside its config object under `"adjacency"`. The payload
//! also carries the connection list, and loading restores connections from
//! whichever is available: the explicit list when present, otherwise the
//! embedded adjacency of every node. A saved graph therefore always loads
//! back with the same set of connections. Rebuilding from adjacency alone
//! lists them by source node and port, which can reorder the list.

use crate::config::{NodeConfig, TriggerMode};
use crate::connection::Connection;
use crate::error::PersistError;
use crate::graph::WorkflowGraph;
use crate::node::{Adjacency, Node, NodeId, NodeKind, PortTarget, Position};
use crate::registry;
use botflow_core::{Result, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Config key under which a node's adjacency map travels.
pub const ADJACENCY_KEY: &str = "adjacency";

/// A node as emitted for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePayload {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    /// Config fields plus the embedded adjacency map.
    pub config: JsonValue,
    pub position_x: f64,
    pub position_y: f64,
}

/// A node record as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: String,
    /// Kind name; unknown names are rejected on decode.
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub position: Position,
    /// Missing or `null` config falls back to the kind's defaults.
    #[serde(default)]
    pub config: JsonValue,
}

impl From<NodePayload> for StoredNode {
    fn from(payload: NodePayload) -> Self {
        Self {
            id: payload.id.to_string(),
            kind: payload.kind.as_str().to_string(),
            label: Some(payload.label),
            position: Position::new(payload.position_x, payload.position_y),
            config: payload.config,
        }
    }
}

/// A whole workflow as emitted for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPayload {
    #[serde(default)]
    pub id: WorkflowId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_mode: Option<TriggerMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_name: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub nodes: Vec<NodePayload>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

fn enabled_by_default() -> bool {
    true
}

impl WorkflowPayload {
    /// Parses a payload from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a workflow payload.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json).map_err(|e| PersistError::MalformedPayload {
            details: e.to_string(),
        })?)
    }

    /// Renders the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_json(&self, pretty: bool) -> Result<String, PersistError> {
        let encoded = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        Ok(encoded.map_err(|e| PersistError::Encode {
            details: e.to_string(),
        })?)
    }

    /// Rebuilds the graph this payload describes.
    ///
    /// # Errors
    ///
    /// Returns an error if any node record cannot be decoded.
    pub fn decode_graph(&self) -> Result<WorkflowGraph, PersistError> {
        let stored = self.nodes.iter().cloned().map(StoredNode::from).collect();
        decode_graph(stored, self.connections.clone())
    }
}

/// Encodes every node of `graph` for storage.
///
/// # Errors
///
/// Returns an error if a config cannot be encoded.
pub fn encode_nodes(graph: &WorkflowGraph) -> Result<Vec<NodePayload>, PersistError> {
    graph.nodes().iter().map(encode_node).collect()
}

fn encode_node(node: &Node) -> Result<NodePayload, PersistError> {
    let encode_error = |e: serde_json::Error| PersistError::Encode {
        details: format!("node {}: {e}", node.id()),
    };
    let mut fields = node.config().fields().map_err(encode_error)?;
    let adjacency = serde_json::to_value(node.adjacency()).map_err(encode_error)?;
    fields.insert(ADJACENCY_KEY.to_string(), adjacency);
    Ok(NodePayload {
        id: node.id().clone(),
        kind: node.kind(),
        label: node.label.clone(),
        config: JsonValue::Object(fields),
        position_x: node.position.x,
        position_y: node.position.y,
    })
}

/// Rebuilds a graph from stored node records.
///
/// `connections` wins when non-empty; otherwise connections are reconstructed
/// from the adjacency embedded in each node's config, in node order and then
/// in the order each node declares its output ports.
///
/// # Errors
///
/// Returns an error on an unknown kind or a config that does not fit its kind.
pub fn decode_graph(
    stored: Vec<StoredNode>,
    connections: Vec<Connection>,
) -> Result<WorkflowGraph, PersistError> {
    let mut nodes = Vec::with_capacity(stored.len());
    let mut embedded = Vec::new();

    for record in stored {
        let (node, mut adjacency) = decode_node(record)?;
        let mut ordered: Vec<(String, Vec<PortTarget>)> = node
            .ports()
            .output_ids()
            .filter_map(|port| adjacency.remove_entry(port))
            .collect();
        ordered.extend(adjacency);
        for (port, targets) in ordered {
            embedded.extend(targets.into_iter().map(|target| {
                Connection::new(
                    node.id().clone(),
                    port.clone(),
                    target.target_node_id,
                    target.target_port_id,
                )
            }));
        }
        nodes.push(node);
    }

    let from_adjacency = connections.is_empty();
    let connections = if from_adjacency { embedded } else { connections };
    debug!(
        nodes = nodes.len(),
        connections = connections.len(),
        from_adjacency,
        "decoding stored graph"
    );

    let mut graph = WorkflowGraph::new();
    graph.replace_all(nodes, connections);
    Ok(graph)
}

fn decode_node(record: StoredNode) -> Result<(Node, Adjacency), PersistError> {
    let Some(kind) = NodeKind::from_name(&record.kind) else {
        return Err(PersistError::UnknownNodeKind {
            node_id: record.id,
            kind: record.kind,
        }
        .into());
    };

    let invalid = |details: String| PersistError::InvalidConfig {
        node_id: record.id.clone(),
        details,
    };

    let mut config = record.config;
    let adjacency = match &mut config {
        JsonValue::Object(fields) => fields.remove(ADJACENCY_KEY),
        _ => None,
    };
    let adjacency: Adjacency = match adjacency {
        Some(value) => serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?,
        None => Adjacency::new(),
    };

    let config = if config.is_null() {
        registry::default_config(kind)
    } else {
        NodeConfig::from_fields(kind, config).map_err(|e| invalid(e.to_string()))?
    };

    let label = record
        .label
        .unwrap_or_else(|| registry::default_label(kind));
    let node = Node::from_parts(NodeId::from(record.id), label, record.position, config);
    Ok((node, adjacency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{find_template, load_template};
    use serde_json::json;

    fn simple_command_graph() -> WorkflowGraph {
        let mut graph = WorkflowGraph::new();
        load_template(&mut graph, &find_template("Simple Command").expect("built in"));
        graph
    }

    fn stored(value: JsonValue) -> StoredNode {
        serde_json::from_value(value).expect("stored node")
    }

    #[test]
    fn encoded_config_embeds_adjacency() {
        let graph = simple_command_graph();
        let payloads = encode_nodes(&graph).expect("encode");
        let trigger = payloads
            .iter()
            .find(|p| p.kind == NodeKind::Trigger)
            .expect("trigger");

        assert_eq!(trigger.config["commandName"], "hello");
        let response_id = graph
            .nodes_of_kind(NodeKind::Response)
            .next()
            .expect("response")
            .id()
            .to_string();
        assert_eq!(
            trigger.config[ADJACENCY_KEY],
            json!({ "out": [{ "targetNodeId": response_id, "targetPortId": "in" }] })
        );
    }

    #[test]
    fn node_payload_uses_flat_position_fields() {
        let graph = simple_command_graph();
        let payload = &encode_nodes(&graph).expect("encode")[0];
        let json = serde_json::to_value(payload).expect("serialize");
        assert!(json.get("positionX").is_some());
        assert!(json.get("positionY").is_some());
        assert_eq!(json["kind"], "trigger");
    }

    #[test]
    fn payload_round_trip_keeps_connections() {
        let graph = simple_command_graph();
        let payload = WorkflowPayload {
            id: WorkflowId::new(),
            name: "hello".to_string(),
            description: None,
            trigger_mode: None,
            command_name: None,
            enabled: true,
            nodes: encode_nodes(&graph).expect("encode"),
            connections: graph.connections().to_vec(),
        };

        let json = payload.to_json(false).expect("to json");
        let decoded = WorkflowPayload::from_json(&json)
            .expect("from json")
            .decode_graph()
            .expect("decode");
        assert_eq!(decoded, graph);
    }

    #[test]
    fn adjacency_alone_restores_connections() {
        let graph = simple_command_graph();
        let records = encode_nodes(&graph)
            .expect("encode")
            .into_iter()
            .map(StoredNode::from)
            .collect();

        let decoded = decode_graph(records, Vec::new()).expect("decode");
        assert_eq!(decoded.connection_count(), 1);
        assert_eq!(decoded, graph);
        decoded.verify().expect("consistent");
    }

    #[test]
    fn adjacency_rebuild_follows_port_declaration_order() {
        let mut graph = WorkflowGraph::new();
        load_template(&mut graph, &find_template("Role Gate").expect("built in"));
        let before: Vec<_> = graph.connections().iter().map(|c| c.source_port_id()).collect();
        assert_eq!(before, vec!["out", "true", "false"]);

        let records = encode_nodes(&graph)
            .expect("encode")
            .into_iter()
            .map(StoredNode::from)
            .collect();
        let decoded = decode_graph(records, Vec::new()).expect("decode");
        let after: Vec<_> = decoded.connections().iter().map(|c| c.source_port_id()).collect();
        assert_eq!(after, before);
        assert_eq!(decoded, graph);
    }

    #[test]
    fn stored_record_without_adjacency_or_config() {
        let decoded = decode_graph(
            vec![
                stored(json!({ "id": "1", "kind": "trigger", "position": { "x": 5.0, "y": 6.0 } })),
                stored(json!({ "id": "2", "kind": "response", "config": { "message": "hi" } })),
            ],
            Vec::new(),
        )
        .expect("decode");

        let trigger = decoded.node(&NodeId::from("1")).expect("trigger");
        assert_eq!(trigger.label, "Trigger");
        assert_eq!(trigger.position, Position::new(5.0, 6.0));
        assert_eq!(
            trigger.config(),
            &registry::default_config(NodeKind::Trigger)
        );
        assert_eq!(decoded.connection_count(), 0);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = decode_graph(
            vec![stored(json!({ "id": "9", "kind": "webhook" }))],
            Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown kind 'webhook'"));
    }

    #[test]
    fn ill_shaped_config_is_rejected() {
        let err = decode_graph(
            vec![stored(json!({ "id": "9", "kind": "variable", "config": { "operation": 3 } }))],
            Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid config for node 9"));
    }

    #[test]
    fn dangling_embedded_adjacency_is_dropped() {
        let decoded = decode_graph(
            vec![stored(json!({
                "id": "t",
                "kind": "trigger",
                "config": {
                    "triggerMode": "slash",
                    "commandName": "x",
                    "adjacency": { "out": [{ "targetNodeId": "gone", "targetPortId": "in" }] }
                }
            }))],
            Vec::new(),
        )
        .expect("decode");
        assert_eq!(decoded.connection_count(), 0);
        decoded.verify().expect("consistent");
    }
}
