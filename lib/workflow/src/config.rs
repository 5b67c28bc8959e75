//! Per-kind node configuration.
//!
//! A node's configuration is a tagged union with one case per node kind, so
//! the fields legal for a trigger can never end up on a response. Editing
//! surfaces send loosely-typed JSON patches; [`NodeConfig::merged`] folds a
//! patch into the current config and re-checks it against the kind's shape.

use crate::node::NodeKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A shallow patch over a config's fields, keyed by camelCase field name.
///
/// A `null` value clears an optional field.
pub type ConfigPatch = Map<String, JsonValue>;

/// How users invoke a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Registered slash command (`/name`).
    #[default]
    Slash,
    /// Message prefix command (`!name`).
    Prefix,
}

/// Configuration for trigger nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    pub trigger_mode: TriggerMode,
    pub command_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Side effect performed by an action node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    SendMessage,
    AddRole,
    RemoveRole,
    Ban,
    Kick,
    Timeout,
}

/// Configuration for action nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    pub action_kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Only meaningful for [`ActionKind::Timeout`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// The check a condition node performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    #[default]
    HasRole,
    HasPermission,
    VariableEquals,
    Custom,
}

/// Configuration for condition nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionConfig {
    pub condition_kind: ConditionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_expression: Option<String>,
}

/// Operation applied by a variable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableOperation {
    #[default]
    Set,
    Get,
    Increment,
    Decrement,
}

/// Configuration for variable nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableConfig {
    pub operation: VariableOperation,
    pub variable_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Configuration for response nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfig {
    pub message: String,
    #[serde(default)]
    pub use_embed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_title: Option<String>,
    #[serde(default)]
    pub ephemeral: bool,
}

/// Configuration for a node, one case per [`NodeKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeConfig {
    Trigger(TriggerConfig),
    Action(ActionConfig),
    Condition(ConditionConfig),
    Variable(VariableConfig),
    Response(ResponseConfig),
}

impl NodeConfig {
    /// Returns the node kind this configuration belongs to.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Trigger(_) => NodeKind::Trigger,
            Self::Action(_) => NodeKind::Action,
            Self::Condition(_) => NodeKind::Condition,
            Self::Variable(_) => NodeKind::Variable,
            Self::Response(_) => NodeKind::Response,
        }
    }

    /// Returns the trigger configuration, if this is a trigger.
    #[must_use]
    pub fn as_trigger(&self) -> Option<&TriggerConfig> {
        match self {
            Self::Trigger(trigger) => Some(trigger),
            _ => None,
        }
    }

    /// Returns the config fields as a JSON object, without the kind tag.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn fields(&self) -> Result<Map<String, JsonValue>, serde_json::Error> {
        let value = match self {
            Self::Trigger(c) => serde_json::to_value(c)?,
            Self::Action(c) => serde_json::to_value(c)?,
            Self::Condition(c) => serde_json::to_value(c)?,
            Self::Variable(c) => serde_json::to_value(c)?,
            Self::Response(c) => serde_json::to_value(c)?,
        };
        Ok(match value {
            JsonValue::Object(fields) => fields,
            _ => Map::new(),
        })
    }

    /// Parses untagged config fields as the config of `kind`.
    ///
    /// Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the fields do not fit the kind's shape.
    pub fn from_fields(kind: NodeKind, fields: JsonValue) -> Result<Self, serde_json::Error> {
        match kind {
            NodeKind::Trigger => parse(fields).map(Self::Trigger),
            NodeKind::Action => parse(fields).map(Self::Action),
            NodeKind::Condition => parse(fields).map(Self::Condition),
            NodeKind::Variable => parse(fields).map(Self::Variable),
            NodeKind::Response => parse(fields).map(Self::Response),
        }
    }

    /// Returns this config with `patch` shallow-merged over its fields.
    ///
    /// The kind never changes; a `kind` key in the patch is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged fields no longer fit the kind's shape.
    pub fn merged(&self, patch: &ConfigPatch) -> Result<Self, serde_json::Error> {
        let mut fields = self.fields()?;
        for (key, value) in patch {
            if key != "kind" {
                fields.insert(key.clone(), value.clone());
            }
        }
        Self::from_fields(self.kind(), JsonValue::Object(fields))
    }
}

fn parse<T: DeserializeOwned>(fields: JsonValue) -> Result<T, serde_json::Error> {
    serde_json::from_value(fields)
}
