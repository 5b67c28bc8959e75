//! The graph store: the command surface an editing session drives.
//!
//! The store owns the canonical graph together with the canvas selection and
//! applies edits strictly in the order they are issued. Callers read the
//! current state through [`GraphStore::graph`]; they never get mutable access
//! to nodes or connections.

use crate::analysis::{Diagnostics, diagnose};
use crate::config::{ConfigPatch, NodeConfig};
use crate::connection::{Connection, ConnectionId};
use crate::error::GraphError;
use crate::graph::WorkflowGraph;
use crate::node::{Node, NodeId, NodeKind, Position};
use crate::selection::Selection;
use crate::template::{CommandMetadata, Template, load_template};
use crate::validation::{ValidationWarning, validate};
use botflow_core::EditSessionId;
use tracing::debug;

/// One editing session over a workflow graph.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    session_id: EditSessionId,
    graph: WorkflowGraph,
    selection: Selection,
}

impl GraphStore {
    /// Creates a store with an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store around an existing graph, with nothing selected.
    #[must_use]
    pub fn with_graph(graph: WorkflowGraph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn session_id(&self) -> EditSessionId {
        self.session_id
    }

    /// Returns the current graph snapshot.
    #[must_use]
    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// Creates a node with registry defaults and selects it.
    pub fn create_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let node_id = self.graph.add_node(kind, position);
        self.selection.set(Some(node_id.clone()));
        debug!(session = %self.session_id, node_id = %node_id, "node created and selected");
        node_id
    }

    /// Removes a node, its connections, and any selection of it.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node> {
        let removed = self.graph.remove_node(node_id)?;
        self.selection.release(node_id);
        Some(removed)
    }

    /// Merges a config patch into a node and optionally relabels it.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged config does not fit the node's kind.
    pub fn update_node_label_and_config(
        &mut self,
        node_id: &NodeId,
        label: Option<String>,
        patch: &ConfigPatch,
    ) -> Result<bool, GraphError> {
        self.graph.update_node(node_id, label, patch)
    }

    /// Replaces a node's config with a value of the same kind.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` belongs to a different kind.
    pub fn set_config(&mut self, node_id: &NodeId, config: NodeConfig) -> Result<bool, GraphError> {
        self.graph.set_config(node_id, config)
    }

    /// Relays a canvas position change.
    pub fn set_position(&mut self, node_id: &NodeId, position: Position) -> bool {
        self.graph.set_position(node_id, position)
    }

    /// Selects a node, or clears the selection with `None`.
    ///
    /// Selecting an absent node is ignored.
    pub fn select(&mut self, node_id: Option<NodeId>) {
        match node_id {
            Some(id) if !self.graph.contains_node(&id) => {
                debug!(
                    session = %self.session_id,
                    node_id = %id,
                    "ignoring selection of absent node"
                );
            }
            other => self.selection.set(other),
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        self.selection.selected()
    }

    /// Returns the selected node.
    #[must_use]
    pub fn selected_node(&self) -> Option<&Node> {
        self.selection.node(&self.graph)
    }

    /// Connects two nodes; see [`WorkflowGraph::connect`].
    pub fn connect(
        &mut self,
        source: &NodeId,
        source_port: Option<&str>,
        target: &NodeId,
        target_port: Option<&str>,
    ) -> Option<ConnectionId> {
        self.graph.connect(source, source_port, target, target_port)
    }

    /// Removes one connection.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        self.graph.disconnect(connection_id)
    }

    /// Removes a set of connections.
    pub fn disconnect_all<'a>(
        &mut self,
        connection_ids: impl IntoIterator<Item = &'a ConnectionId>,
    ) -> Vec<Connection> {
        self.graph.disconnect_all(connection_ids)
    }

    /// Replaces the whole graph and clears the selection.
    pub fn replace_all(&mut self, nodes: Vec<Node>, connections: Vec<Connection>) -> usize {
        self.selection.clear();
        self.graph.replace_all(nodes, connections)
    }

    /// Empties the graph.
    pub fn clear(&mut self) {
        self.replace_all(Vec::new(), Vec::new());
    }

    /// Replaces the graph with a template and returns its command metadata.
    pub fn load_template(&mut self, template: &Template) -> Option<CommandMetadata> {
        self.selection.clear();
        load_template(&mut self.graph, template)
    }

    /// Returns the current validation warnings.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationWarning> {
        validate(&self.graph)
    }

    /// Returns advisory structural diagnostics.
    #[must_use]
    pub fn diagnose(&self) -> Diagnostics {
        diagnose(&self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::find_template;

    #[test]
    fn create_node_selects_it() {
        let mut store = GraphStore::new();
        let first = store.create_node(NodeKind::Trigger, Position::default());
        assert_eq!(store.selected(), Some(&first));

        let second = store.create_node(NodeKind::Response, Position::default());
        assert_eq!(store.selected(), Some(&second));
        assert_eq!(store.selected_node().map(Node::kind), Some(NodeKind::Response));
    }

    #[test]
    fn removing_selected_node_clears_selection() {
        let mut store = GraphStore::new();
        let trigger = store.create_node(NodeKind::Trigger, Position::default());
        let response = store.create_node(NodeKind::Response, Position::default());

        store.remove_node(&trigger);
        assert_eq!(store.selected(), Some(&response));

        store.remove_node(&response);
        assert_eq!(store.selected(), None);
        assert!(store.remove_node(&response).is_none());
    }

    #[test]
    fn select_absent_node_is_ignored() {
        let mut store = GraphStore::new();
        let trigger = store.create_node(NodeKind::Trigger, Position::default());
        store.select(Some(NodeId::from("nope")));
        assert_eq!(store.selected(), Some(&trigger));
        store.select(None);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn edits_apply_in_issue_order() {
        let mut store = GraphStore::new();
        let action = store.create_node(NodeKind::Action, Position::default());
        store.remove_node(&action);
        assert!(!store.set_position(&action, Position::new(5.0, 5.0)));
        assert!(store.graph().is_empty());
    }

    #[test]
    fn template_load_clears_selection() {
        let mut store = GraphStore::new();
        store.create_node(NodeKind::Action, Position::default());
        let command = store.load_template(&find_template("Simple Command").expect("built in"));

        assert_eq!(command.map(|c| c.command_name), Some("hello".to_string()));
        assert_eq!(store.selected(), None);
        assert!(store.validate().is_empty());
        assert!(!store.diagnose().has_cycle);
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = GraphStore::new();
        let trigger = store.create_node(NodeKind::Trigger, Position::default());
        let response = store.create_node(NodeKind::Response, Position::default());
        store.connect(&trigger, None, &response, None);

        store.clear();
        assert!(store.graph().is_empty());
        assert_eq!(store.graph().connection_count(), 0);
        assert_eq!(store.selected(), None);
    }
}
