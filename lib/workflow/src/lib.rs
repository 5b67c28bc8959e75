//! Authoring model for botflow chat-bot commands.
//!
//! A command is composed as a directed graph of typed building blocks: one
//! trigger, any number of actions, conditions and variable operations, and
//! at least one response. This crate provides:
//!
//! - **Graph Model**: nodes with kind-specific configs and fixed port shapes
//! - **Connection Manager**: edges kept in a canonical list and in each source
//!   node's adjacency index, updated together
//! - **Graph Store**: the editing-session command surface, with selection
//! - **Validation**: advisory warnings on trigger/response structure
//! - **Templates**: starter graphs that seed the command metadata
//! - **Persistence**: the storage payload codec

pub mod analysis;
pub mod config;
pub mod connection;
pub mod definition;
pub mod error;
pub mod graph;
pub mod node;
pub mod persist;
pub mod port;
pub mod registry;
pub mod selection;
pub mod store;
pub mod template;
pub mod validation;

pub use analysis::{Diagnostics, diagnose};
pub use config::{ConfigPatch, NodeConfig, TriggerMode};
pub use connection::{Connection, ConnectionId};
pub use definition::{Workflow, WorkflowMetadata, WorkflowSummary};
pub use error::{GraphError, PersistError};
pub use graph::WorkflowGraph;
pub use node::{Node, NodeId, NodeKind, PortTarget, Position};
pub use persist::{NodePayload, StoredNode, WorkflowPayload};
pub use port::{NodePorts, Port, PortKind};
pub use store::GraphStore;
pub use template::{CommandMetadata, Template, builtin_templates, find_template, load_template};
pub use validation::{ValidationWarning, validate};
