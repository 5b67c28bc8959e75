//! Workflow definition types.
//!
//! A workflow is one bot command:
//! - Metadata (name, description, command invocation, timestamps)
//! - An editing session over its node graph
//!
//! The command invocation is denormalized from the trigger node so listings
//! do not need to open the graph.

use crate::error::{GraphError, PersistError};
use crate::persist::{WorkflowPayload, encode_nodes};
use crate::store::GraphStore;
use crate::template::{CommandMetadata, Template};
use crate::validation::ValidationWarning;
use botflow_core::{Result, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// Human-readable name for this workflow.
    pub name: String,
    /// Description of what this workflow does.
    pub description: Option<String>,
    /// How the command is invoked, seeded from the trigger node.
    pub command: Option<CommandMetadata>,
    /// Whether the bot should register and answer this command.
    pub enabled: bool,
    /// When this workflow was created.
    pub created_at: DateTime<Utc>,
    /// When this workflow was last updated.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowMetadata {
    /// Creates new metadata with default values.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            command: None,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A complete workflow definition.
#[derive(Debug, Clone)]
pub struct Workflow {
    /// Unique identifier for this workflow.
    pub id: WorkflowId,
    /// Workflow metadata.
    pub metadata: WorkflowMetadata,
    store: GraphStore,
}

impl Workflow {
    /// Creates a new workflow with an empty graph.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkflowId::new(),
            metadata: WorkflowMetadata::new(name),
            store: GraphStore::new(),
        }
    }

    /// Returns the workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Returns the editing session.
    #[must_use]
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Returns the editing session for mutation and marks the workflow updated.
    pub fn edit(&mut self) -> &mut GraphStore {
        self.touch();
        &mut self.store
    }

    /// Replaces the graph with `template` and seeds the command metadata.
    pub fn apply_template(&mut self, template: &Template) -> Option<CommandMetadata> {
        let command = self.store.load_template(template);
        self.metadata.command = command.clone();
        if self.metadata.description.is_none() && !template.description.is_empty() {
            self.metadata.description = Some(template.description.clone());
        }
        self.touch();
        command
    }

    /// Refreshes the command metadata from the current trigger node.
    pub fn sync_command_from_trigger(&mut self) {
        self.metadata.command = CommandMetadata::from_graph(self.store.graph());
        self.touch();
    }

    /// Returns the advisory validation warnings.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationWarning> {
        self.store.validate()
    }

    /// Checks the graph's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn verify(&self) -> std::result::Result<(), GraphError> {
        self.store.graph().verify()
    }

    /// Marks the workflow as updated (bumps updated_at timestamp).
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }

    /// Encodes the workflow for storage.
    ///
    /// Invalid graphs are encoded too; warnings never block saving.
    ///
    /// # Errors
    ///
    /// Returns an error if a node config cannot be encoded.
    pub fn to_payload(&self) -> Result<WorkflowPayload, PersistError> {
        let graph = self.store.graph();
        Ok(WorkflowPayload {
            id: self.id,
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            trigger_mode: self.metadata.command.as_ref().map(|c| c.trigger_mode),
            command_name: self.metadata.command.as_ref().map(|c| c.command_name.clone()),
            enabled: self.metadata.enabled,
            nodes: encode_nodes(graph)?,
            connections: graph.connections().to_vec(),
        })
    }

    /// Rebuilds a workflow from its stored payload.
    ///
    /// # Errors
    ///
    /// Returns an error if a node record cannot be decoded.
    pub fn from_payload(payload: &WorkflowPayload) -> Result<Self, PersistError> {
        let graph = payload.decode_graph()?;
        let mut metadata = WorkflowMetadata::new(payload.name.clone());
        metadata.description = payload.description.clone();
        metadata.enabled = payload.enabled;
        metadata.command = match (payload.trigger_mode, &payload.command_name) {
            (Some(trigger_mode), Some(command_name)) => Some(CommandMetadata {
                trigger_mode,
                command_name: command_name.clone(),
            }),
            _ => CommandMetadata::from_graph(&graph),
        };
        Ok(Self {
            id: payload.id,
            metadata,
            store: GraphStore::with_graph(graph),
        })
    }
}

/// Summary information about a workflow (for listings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: WorkflowId,
    pub name: String,
    pub command: Option<CommandMetadata>,
    pub enabled: bool,
    pub node_count: usize,
    pub connection_count: usize,
    /// Number of advisory validation warnings.
    pub warning_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&Workflow> for WorkflowSummary {
    fn from(workflow: &Workflow) -> Self {
        let graph = workflow.store.graph();
        Self {
            id: workflow.id,
            name: workflow.metadata.name.clone(),
            command: workflow.metadata.command.clone(),
            enabled: workflow.metadata.enabled,
            node_count: graph.node_count(),
            connection_count: graph.connection_count(),
            warning_count: workflow.validate().len(),
            updated_at: workflow.metadata.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriggerMode;
    use crate::node::{NodeKind, Position};
    use crate::template::find_template;
    use serde_json::json;

    #[test]
    fn apply_template_seeds_command() {
        let mut workflow = Workflow::new("Greeter");
        workflow.apply_template(&find_template("Simple Command").expect("built in"));

        assert_eq!(
            workflow.metadata.command,
            Some(CommandMetadata {
                trigger_mode: TriggerMode::Slash,
                command_name: "hello".to_string(),
            })
        );
        assert_eq!(
            workflow.metadata.description.as_deref(),
            Some("Replies to /hello with a greeting")
        );
        assert!(workflow.validate().is_empty());
    }

    #[test]
    fn sync_follows_trigger_edits() {
        let mut workflow = Workflow::new("Greeter");
        workflow.apply_template(&find_template("Simple Command").expect("built in"));
        let trigger = workflow
            .store()
            .graph()
            .trigger()
            .expect("trigger")
            .id()
            .clone();

        let patch = match json!({ "commandName": "hi", "triggerMode": "prefix" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        workflow
            .edit()
            .update_node_label_and_config(&trigger, None, &patch)
            .expect("fits");
        workflow.sync_command_from_trigger();

        let command = workflow.metadata.command.expect("command");
        assert_eq!(command.command_name, "hi");
        assert_eq!(command.trigger_mode, TriggerMode::Prefix);
    }

    #[test]
    fn payload_round_trip() {
        let mut workflow = Workflow::new("Gate");
        workflow.apply_template(&find_template("Role Gate").expect("built in"));

        let payload = workflow.to_payload().expect("encode");
        assert_eq!(payload.command_name.as_deref(), Some("members-only"));

        let restored = Workflow::from_payload(&payload).expect("decode");
        assert_eq!(restored.id, workflow.id);
        assert_eq!(restored.metadata.command, workflow.metadata.command);
        assert_eq!(restored.store().graph(), workflow.store().graph());
        restored.verify().expect("consistent");
    }

    #[test]
    fn disabled_flag_survives_payload() {
        let mut workflow = Workflow::new("Paused");
        workflow.apply_template(&find_template("Counter").expect("built in"));
        workflow.metadata.enabled = false;

        let json = workflow
            .to_payload()
            .and_then(|payload| payload.to_json(false))
            .expect("encode");
        let restored = WorkflowPayload::from_json(&json)
            .and_then(|payload| Workflow::from_payload(&payload))
            .expect("decode");
        assert!(!restored.metadata.enabled);
        assert!(!WorkflowSummary::from(&restored).enabled);
    }

    #[test]
    fn payload_without_enabled_flag_defaults_to_enabled() {
        let payload = WorkflowPayload::from_json(r#"{ "name": "Old", "nodes": [] }"#)
            .expect("payload");
        assert!(Workflow::from_payload(&payload).expect("decode").metadata.enabled);
    }

    #[test]
    fn invalid_graph_still_encodes() {
        let mut workflow = Workflow::new("Draft");
        workflow
            .edit()
            .create_node(NodeKind::Action, Position::default());
        assert_eq!(workflow.validate().len(), 2);
        assert_eq!(workflow.to_payload().expect("encode").nodes.len(), 1);
    }

    #[test]
    fn summary_counts() {
        let mut workflow = Workflow::new("Kick");
        workflow.apply_template(&find_template("Moderation Kick").expect("built in"));
        let summary = WorkflowSummary::from(&workflow);
        assert_eq!(summary.node_count, 5);
        assert_eq!(summary.connection_count, 4);
        assert_eq!(summary.warning_count, 0);
    }
}
