//! Starter templates.
//!
//! A template is a literal node and connection set. Loading one replaces the
//! whole graph (there is no overwrite guard here; confirming the overwrite is
//! the editor's job) and surfaces the trigger's command metadata so the
//! workflow can be named after its command.

use crate::config::{
    ActionConfig, ActionKind, ConditionConfig, ConditionKind, NodeConfig, ResponseConfig,
    TriggerConfig, TriggerMode, VariableConfig, VariableOperation,
};
use crate::connection::Connection;
use crate::error::PersistError;
use crate::graph::WorkflowGraph;
use crate::node::{Node, NodeId, Position};
use crate::port::{FALSE_OUTPUT, TRUE_OUTPUT};
use botflow_core::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Workflow-level command metadata taken from the trigger node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMetadata {
    pub trigger_mode: TriggerMode,
    pub command_name: String,
}

impl From<&TriggerConfig> for CommandMetadata {
    fn from(trigger: &TriggerConfig) -> Self {
        Self {
            trigger_mode: trigger.trigger_mode,
            command_name: trigger.command_name.clone(),
        }
    }
}

impl CommandMetadata {
    /// Reads the metadata from the graph's first trigger node.
    #[must_use]
    pub fn from_graph(graph: &WorkflowGraph) -> Option<Self> {
        graph
            .trigger()
            .and_then(|node| node.config().as_trigger())
            .map(Self::from)
    }
}

/// A predefined node and connection set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Template {
    /// Parses a template from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a template.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json).map_err(|e| PersistError::MalformedPayload {
            details: e.to_string(),
        })?)
    }
}

/// Replaces `graph` with the template and returns its command metadata.
pub fn load_template(graph: &mut WorkflowGraph, template: &Template) -> Option<CommandMetadata> {
    graph.replace_all(template.nodes.clone(), template.connections.clone());
    let command = CommandMetadata::from_graph(graph);
    debug!(
        template = %template.name,
        command = command.as_ref().map(|c| c.command_name.as_str()),
        "template loaded"
    );
    command
}

/// Returns the built-in template catalogue.
#[must_use]
pub fn builtin_templates() -> Vec<Template> {
    vec![simple_command(), role_gate(), counter(), moderation_kick()]
}

/// Looks up a built-in template by exact name.
#[must_use]
pub fn find_template(name: &str) -> Option<Template> {
    builtin_templates().into_iter().find(|t| t.name == name)
}

/// Lays out template nodes left to right and wires them through the
/// connection manager, so adjacency is consistent from the start.
struct TemplateBuilder {
    name: &'static str,
    description: &'static str,
    graph: WorkflowGraph,
}

impl TemplateBuilder {
    fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            graph: WorkflowGraph::new(),
        }
    }

    fn node(&mut self, label: &str, column: u8, row: u8, config: NodeConfig) -> NodeId {
        let id = NodeId::new();
        let position = Position::new(
            100.0 + f64::from(column) * 250.0,
            100.0 + f64::from(row) * 150.0,
        );
        self.graph
            .nodes
            .push(Node::from_parts(id.clone(), label, position, config));
        id
    }

    fn trigger(&mut self, command_name: &str, description: &str) -> NodeId {
        self.node(
            "Trigger",
            0,
            0,
            NodeConfig::Trigger(TriggerConfig {
                trigger_mode: TriggerMode::Slash,
                command_name: command_name.to_string(),
                description: Some(description.to_string()),
            }),
        )
    }

    fn reply(
        &mut self,
        label: &str,
        column: u8,
        row: u8,
        message: &str,
        ephemeral: bool,
    ) -> NodeId {
        self.node(
            label,
            column,
            row,
            NodeConfig::Response(ResponseConfig {
                message: message.to_string(),
                ephemeral,
                ..ResponseConfig::default()
            }),
        )
    }

    fn wire(&mut self, source: &NodeId, port: Option<&str>, target: &NodeId) {
        self.graph.connect(source, port, target, None);
    }

    fn build(self) -> Template {
        let (nodes, connections) = self.graph.into_parts();
        Template {
            name: self.name.to_string(),
            description: self.description.to_string(),
            nodes,
            connections,
        }
    }
}

fn simple_command() -> Template {
    let mut t = TemplateBuilder::new("Simple Command", "Replies to /hello with a greeting");
    let trigger = t.trigger("hello", "Say hello");
    let response = t.reply("Response", 1, 0, "Hello! 👋", false);
    t.wire(&trigger, None, &response);
    t.build()
}

fn role_gate() -> Template {
    let mut t = TemplateBuilder::new(
        "Role Gate",
        "Only members holding a role get the real answer",
    );
    let trigger = t.trigger("members-only", "Members-only information");
    let check = t.node(
        "Has role?",
        1,
        0,
        NodeConfig::Condition(ConditionConfig {
            condition_kind: ConditionKind::HasRole,
            ..ConditionConfig::default()
        }),
    );
    let welcome = t.reply("Welcome", 2, 0, "Welcome, member!", false);
    let denied = t.reply("Denied", 2, 1, "This command is for members only.", true);
    t.wire(&trigger, None, &check);
    t.wire(&check, Some(TRUE_OUTPUT), &welcome);
    t.wire(&check, Some(FALSE_OUTPUT), &denied);
    t.build()
}

fn counter() -> Template {
    let mut t = TemplateBuilder::new("Counter", "Counts how many times the command ran");
    let trigger = t.trigger("count", "Bump the counter");
    let bump = t.node(
        "Increment",
        1,
        0,
        NodeConfig::Variable(VariableConfig {
            operation: VariableOperation::Increment,
            variable_name: "counter".to_string(),
            value: None,
        }),
    );
    let response = t.reply("Response", 2, 0, "Counter is now {counter}", false);
    t.wire(&trigger, None, &bump);
    t.wire(&bump, None, &response);
    t.build()
}

fn moderation_kick() -> Template {
    let mut t = TemplateBuilder::new(
        "Moderation Kick",
        "Kicks a member if the caller may kick members",
    );
    let trigger = t.trigger("kick", "Kick a member");
    let check = t.node(
        "Can kick?",
        1,
        0,
        NodeConfig::Condition(ConditionConfig {
            condition_kind: ConditionKind::HasPermission,
            permission: Some("KICK_MEMBERS".to_string()),
            ..ConditionConfig::default()
        }),
    );
    let kick = t.node(
        "Kick",
        2,
        0,
        NodeConfig::Action(ActionConfig {
            action_kind: ActionKind::Kick,
            ..ActionConfig::default()
        }),
    );
    let done = t.reply("Done", 3, 0, "Member kicked.", false);
    let denied = t.reply("Denied", 2, 1, "You are not allowed to kick members.", true);
    t.wire(&trigger, None, &check);
    t.wire(&check, Some(TRUE_OUTPUT), &kick);
    t.wire(&kick, None, &done);
    t.wire(&check, Some(FALSE_OUTPUT), &denied);
    t.build()
}
