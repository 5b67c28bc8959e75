//! Subcommand implementations.
//!
//! Each command returns the text to print so the binary stays a thin shell
//! around argument parsing and logging setup.

use crate::config::CliConfig;
use crate::error::CliError;
use botflow_core::Result;
use botflow_workflow::registry;
use botflow_workflow::{
    Node, NodeKind, Port, Workflow, WorkflowPayload, WorkflowSummary, builtin_templates, diagnose,
    find_template,
};
use rootcause::prelude::ResultExt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Lists the built-in templates, one per line.
#[must_use]
pub fn list_templates() -> String {
    builtin_templates()
        .iter()
        .map(|template| {
            format!(
                "{:<16} {} node(s), {} connection(s)  {}\n",
                template.name,
                template.nodes.len(),
                template.connections.len(),
                template.description
            )
        })
        .collect()
}

/// Lists every node kind with its default label, ports and description.
#[must_use]
pub fn list_palette() -> String {
    NodeKind::ALL
        .into_iter()
        .map(|kind| {
            let defaults = registry::defaults(kind);
            format!(
                "{:<10} in: {:<6} out: {:<12} {}\n",
                defaults.label,
                port_list(&defaults.ports.inputs),
                port_list(&defaults.ports.outputs),
                registry::description(kind)
            )
        })
        .collect()
}

/// Creates a workflow from a template and renders its payload.
///
/// When `out` is given the payload is written there and a short
/// confirmation is returned instead.
///
/// # Errors
///
/// Returns an error for an unknown template or when the payload cannot be
/// encoded or written.
pub fn new_workflow(
    config: &CliConfig,
    name: &str,
    template: Option<&str>,
    out: Option<&Path>,
) -> Result<String, CliError> {
    let template_name = template.unwrap_or(&config.default_template);
    let Some(template) = find_template(template_name) else {
        return Err(CliError::UnknownTemplate {
            name: template_name.to_string(),
        }
        .into());
    };

    let mut workflow = Workflow::new(name);
    workflow.apply_template(&template);
    info!(workflow = %workflow.id, template = %template.name, "workflow created");

    let json = workflow
        .to_payload()
        .and_then(|payload| payload.to_json(config.pretty_json))
        .context(CliError::Payload)?;

    match out {
        Some(path) => {
            fs::write(path, &json).context(CliError::WriteFile {
                path: path.to_path_buf(),
            })?;
            Ok(format!("wrote {} to {}\n", workflow.name(), path.display()))
        }
        None => Ok(json + "\n"),
    }
}

/// Reports validation warnings and graph diagnostics for a stored payload.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or when
/// `strict` is set and any warning is present.
pub fn validate_file(config: &CliConfig, path: &Path) -> Result<String, CliError> {
    let workflow = read_workflow(path)?;
    let warnings = workflow.validate();
    let diagnostics = diagnose(workflow.store().graph());

    let mut out = if warnings.is_empty() {
        format!("{}: no warnings\n", workflow.name())
    } else {
        warnings
            .iter()
            .map(|warning| format!("warning: {warning}\n"))
            .collect()
    };
    if diagnostics.has_cycle {
        out.push_str("note: connections form a cycle\n");
    }
    for node_id in &diagnostics.unreachable {
        out.push_str(&format!("note: {node_id} is not reachable from a trigger\n"));
    }

    if config.strict && !warnings.is_empty() {
        return Err(CliError::Warnings {
            count: warnings.len(),
        }
        .into());
    }
    Ok(out)
}

/// Prints a stored workflow's summary, then each node with its ports and
/// outgoing connections.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn inspect_file(path: &Path) -> Result<String, CliError> {
    let workflow = read_workflow(path)?;
    let summary = WorkflowSummary::from(&workflow);

    let mut out = format!("{} ({})\n", summary.name, summary.id);
    if let Some(command) = &summary.command {
        out.push_str(&format!(
            "command: {} ({:?})\n",
            command.command_name, command.trigger_mode
        ));
    }
    out.push_str(if summary.enabled {
        "status: enabled\n"
    } else {
        "status: disabled\n"
    });
    out.push_str(&format!(
        "{} node(s), {} connection(s), {} warning(s)\n",
        summary.node_count, summary.connection_count, summary.warning_count
    ));
    for node in workflow.store().graph().nodes() {
        out.push_str(&describe_node(node));
    }
    Ok(out)
}

fn describe_node(node: &Node) -> String {
    let ports = node.ports();
    let mut out = format!(
        "[{}] {} \"{}\" at ({}, {})\n  inputs: {}\n  outputs: {}\n",
        node.kind(),
        node.id(),
        node.label,
        node.position.x,
        node.position.y,
        port_list(&ports.inputs),
        port_list(&ports.outputs)
    );
    let undeclared = node
        .adjacency()
        .keys()
        .map(String::as_str)
        .filter(|port| ports.output(port).is_none());
    for port in ports.output_ids().chain(undeclared) {
        let marker = if ports.output(port).is_none() {
            " (undeclared)"
        } else {
            ""
        };
        for target in node.targets(port) {
            out.push_str(&format!(
                "  {port}{marker} -> {}:{}\n",
                target.target_node_id, target.target_port_id
            ));
        }
    }
    out
}

fn port_list(ports: &[Port]) -> String {
    if ports.is_empty() {
        return "-".to_string();
    }
    ports
        .iter()
        .map(|port| port.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_workflow(path: &Path) -> Result<Workflow, CliError> {
    let json = fs::read_to_string(path).context(CliError::ReadFile {
        path: path.to_path_buf(),
    })?;
    let workflow = WorkflowPayload::from_json(&json)
        .and_then(|payload| Workflow::from_payload(&payload))
        .context(CliError::Payload)?;
    debug!(
        path = %path.display(),
        nodes = workflow.store().graph().node_count(),
        "workflow loaded"
    );
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_payload(dir: &TempDir, template: &str) -> std::path::PathBuf {
        let path = dir.path().join("workflow.json");
        new_workflow(&CliConfig::default(), "Test", Some(template), Some(&path))
            .expect("new workflow");
        path
    }

    #[test]
    fn lists_every_builtin_template() {
        let listing = list_templates();
        assert_eq!(listing.lines().count(), builtin_templates().len());
        assert!(listing.contains("Simple Command"));
        assert!(listing.contains("Moderation Kick"));
    }

    #[test]
    fn palette_shows_ports_and_descriptions() {
        let palette = list_palette();
        assert_eq!(palette.lines().count(), NodeKind::ALL.len());

        let condition = palette
            .lines()
            .find(|line| line.starts_with("Condition"))
            .expect("condition row");
        assert!(condition.contains("out: true, false"));
        assert!(condition.contains(registry::description(NodeKind::Condition)));

        let trigger = palette
            .lines()
            .find(|line| line.starts_with("Trigger"))
            .expect("trigger row");
        assert!(trigger.contains("in: -"));
    }

    #[test]
    fn new_uses_configured_default_template() {
        let json = new_workflow(&CliConfig::default(), "Greeter", None, None).expect("new");
        let payload = WorkflowPayload::from_json(&json).expect("payload");
        assert_eq!(payload.name, "Greeter");
        assert_eq!(payload.command_name.as_deref(), Some("hello"));
        assert_eq!(payload.nodes.len(), 2);
        assert_eq!(payload.connections.len(), 1);
    }

    #[test]
    fn new_rejects_unknown_template() {
        let result = new_workflow(&CliConfig::default(), "X", Some("Nope"), None);
        assert!(result.is_err());
    }

    #[test]
    fn validate_written_template_is_clean() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_payload(&dir, "Simple Command");

        let report = validate_file(&CliConfig::default(), &path).expect("validate");
        assert_eq!(report, "Test: no warnings\n");
    }

    #[test]
    fn strict_validation_fails_on_warnings() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("empty.json");
        fs::write(
            &path,
            r#"{
                "name": "Lonely",
                "nodes": [
                    { "id": "a", "kind": "action", "label": "Act", "config": null,
                      "positionX": 0, "positionY": 0 }
                ]
            }"#,
        )
        .expect("write");

        let lenient = validate_file(&CliConfig::default(), &path).expect("lenient");
        assert!(lenient.contains("warning: needs at least one trigger node"));
        assert!(lenient.contains("warning: should have at least one response node"));
        assert!(lenient.contains("note: a is not reachable from a trigger"));

        let strict = CliConfig {
            strict: true,
            ..CliConfig::default()
        };
        assert!(validate_file(&strict, &path).is_err());
    }

    #[test]
    fn inspect_lists_ports_and_outgoing_connections() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_payload(&dir, "Moderation Kick");

        let report = inspect_file(&path).expect("inspect");
        assert!(report.starts_with("Test (wf_"));
        assert!(report.contains("command: kick (Slash)"));
        assert!(report.contains("status: enabled"));
        assert!(report.contains("5 node(s), 4 connection(s)"));
        assert!(report.contains("  outputs: true, false\n"));
        assert_eq!(report.matches("  inputs: -\n").count(), 1);
        assert_eq!(report.lines().filter(|l| l.contains(" -> ")).count(), 4);
        assert_eq!(report.matches("  true -> ").count(), 1);
        assert_eq!(report.matches("  false -> ").count(), 1);
    }

    #[test]
    fn inspect_flags_connections_from_undeclared_ports() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("odd.json");
        fs::write(
            &path,
            r#"{
                "name": "Odd",
                "nodes": [
                    { "id": "t", "kind": "trigger", "label": "Go",
                      "config": { "triggerMode": "prefix", "commandName": "go" },
                      "positionX": 0, "positionY": 0 },
                    { "id": "r", "kind": "response", "label": "Say",
                      "config": { "message": "hi" },
                      "positionX": 1, "positionY": 0 }
                ],
                "connections": [
                    { "sourceNodeId": "t", "sourcePortId": "extra", "targetNodeId": "r" }
                ]
            }"#,
        )
        .expect("write");

        let report = inspect_file(&path).expect("inspect");
        assert!(report.contains("  extra (undeclared) -> r:in\n"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().expect("tempdir");
        let result = inspect_file(&dir.path().join("absent.json"));
        assert!(result.is_err());
    }
}
