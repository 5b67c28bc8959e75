//! Node type registry.
//!
//! Maps each [`NodeKind`] to its default label, port shape and configuration.
//! Consulted only when a node is created; later config edits are not checked
//! against these defaults.

use crate::config::{
    ActionConfig, ConditionConfig, NodeConfig, ResponseConfig, TriggerConfig, TriggerMode,
    VariableConfig,
};
use crate::node::NodeKind;
use crate::port::{DEFAULT_INPUT, DEFAULT_OUTPUT, FALSE_OUTPUT, NodePorts, Port, TRUE_OUTPUT};

/// Command name given to a freshly placed trigger.
pub const DEFAULT_COMMAND_NAME: &str = "new-command";

/// Everything needed to instantiate a node of one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefaults {
    pub label: String,
    pub ports: NodePorts,
    pub config: NodeConfig,
}

/// Returns the defaults for `kind`.
#[must_use]
pub fn defaults(kind: NodeKind) -> NodeDefaults {
    NodeDefaults {
        label: default_label(kind),
        ports: ports(kind),
        config: default_config(kind),
    }
}

/// Returns the capitalized kind name, e.g. `"Condition"`.
#[must_use]
pub fn default_label(kind: NodeKind) -> String {
    let name = kind.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns the fixed port shape of `kind`.
#[must_use]
pub fn ports(kind: NodeKind) -> NodePorts {
    match kind {
        NodeKind::Trigger => NodePorts {
            inputs: vec![],
            outputs: vec![Port::flow(DEFAULT_OUTPUT)],
        },
        NodeKind::Action | NodeKind::Variable => NodePorts {
            inputs: vec![Port::flow(DEFAULT_INPUT)],
            outputs: vec![Port::flow(DEFAULT_OUTPUT)],
        },
        NodeKind::Condition => NodePorts {
            inputs: vec![Port::flow(DEFAULT_INPUT)],
            outputs: vec![Port::branch(TRUE_OUTPUT), Port::branch(FALSE_OUTPUT)],
        },
        NodeKind::Response => NodePorts {
            inputs: vec![Port::flow(DEFAULT_INPUT)],
            outputs: vec![],
        },
    }
}

/// Returns the configuration a freshly placed node of `kind` starts with.
#[must_use]
pub fn default_config(kind: NodeKind) -> NodeConfig {
    match kind {
        NodeKind::Trigger => NodeConfig::Trigger(TriggerConfig {
            trigger_mode: TriggerMode::Slash,
            command_name: DEFAULT_COMMAND_NAME.to_string(),
            description: None,
        }),
        NodeKind::Action => NodeConfig::Action(ActionConfig::default()),
        NodeKind::Condition => NodeConfig::Condition(ConditionConfig::default()),
        NodeKind::Variable => NodeConfig::Variable(VariableConfig::default()),
        NodeKind::Response => NodeConfig::Response(ResponseConfig::default()),
    }
}

/// One-line palette description of `kind`.
#[must_use]
pub fn description(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Trigger => "Starts the workflow when the command is invoked",
        NodeKind::Action => "Sends a message or moderates a member",
        NodeKind::Condition => "Branches on a role, permission or variable",
        NodeKind::Variable => "Sets, reads or counts a stored variable",
        NodeKind::Response => "Replies to the user who ran the command",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_capitalized_kind_names() {
        let labels: Vec<_> = NodeKind::ALL.into_iter().map(default_label).collect();
        assert_eq!(
            labels,
            vec!["Trigger", "Action", "Condition", "Variable", "Response"]
        );
    }

    #[test]
    fn port_shapes_per_kind() {
        let trigger = ports(NodeKind::Trigger);
        assert!(trigger.inputs.is_empty());
        assert_eq!(trigger.output_ids().collect::<Vec<_>>(), vec!["out"]);

        let response = ports(NodeKind::Response);
        assert_eq!(response.inputs.len(), 1);
        assert!(response.outputs.is_empty());

        let condition = ports(NodeKind::Condition);
        assert_eq!(condition.inputs[0].id, "in");
        assert_eq!(condition.output_ids().collect::<Vec<_>>(), vec!["true", "false"]);

        for kind in [NodeKind::Action, NodeKind::Variable] {
            let shape = ports(kind);
            assert_eq!(shape.inputs.len(), 1);
            assert_eq!(shape.output_ids().collect::<Vec<_>>(), vec!["out"]);
        }
    }

    #[test]
    fn default_config_matches_kind() {
        for kind in NodeKind::ALL {
            assert_eq!(defaults(kind).config.kind(), kind);
        }
    }

    #[test]
    fn default_trigger_is_slash_command() {
        let config = default_config(NodeKind::Trigger);
        let trigger = config.as_trigger().expect("trigger config");
        assert_eq!(trigger.trigger_mode, TriggerMode::Slash);
        assert_eq!(trigger.command_name, DEFAULT_COMMAND_NAME);
    }
}
