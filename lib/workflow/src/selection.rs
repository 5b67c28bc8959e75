//! Single-node selection for the editing canvas.

use crate::graph::WorkflowGraph;
use crate::node::{Node, NodeId};

/// Tracks which node, if any, is selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    selected: Option<NodeId>,
}

impl Selection {
    /// Selects `node_id`, or clears the selection with `None`.
    pub fn set(&mut self, node_id: Option<NodeId>) {
        self.selected = node_id;
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Clears the selection only if it points at `node_id`.
    pub fn release(&mut self, node_id: &NodeId) {
        if self.selected.as_ref() == Some(node_id) {
            self.selected = None;
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn is_selected(&self, node_id: &NodeId) -> bool {
        self.selected.as_ref() == Some(node_id)
    }

    /// Resolves the selection against `graph`.
    #[must_use]
    pub fn node<'a>(&self, graph: &'a WorkflowGraph) -> Option<&'a Node> {
        graph.node(self.selected.as_ref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_only_clears_matching_node() {
        let mut selection = Selection::default();
        selection.set(Some(NodeId::from("a")));

        selection.release(&NodeId::from("b"));
        assert!(selection.is_selected(&NodeId::from("a")));

        selection.release(&NodeId::from("a"));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn stale_selection_resolves_to_none() {
        let mut selection = Selection::default();
        selection.set(Some(NodeId::from("gone")));
        assert!(selection.node(&WorkflowGraph::new()).is_none());
    }
}
