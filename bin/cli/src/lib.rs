//! The `botflow` authoring command line.
//!
//! Subcommands list the starter templates and node kinds, scaffold a
//! workflow payload from a template, and validate or inspect a saved payload.

pub mod commands;
pub mod config;
pub mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Author chat-bot command workflows.
#[derive(Debug, Parser)]
#[command(name = "botflow", version, about)]
pub struct Cli {
    /// Configuration file (defaults to ./botflow.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the built-in starter templates.
    Templates,
    /// List the node kinds with their ports and descriptions.
    Palette,
    /// Create a workflow payload from a template.
    New {
        /// Workflow name.
        #[arg(long)]
        name: String,
        /// Template to start from (defaults to the configured one).
        #[arg(long)]
        template: Option<String>,
        /// Write the payload here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Report validation warnings and diagnostics for a saved payload.
    Validate { path: PathBuf },
    /// Print the nodes, ports and outgoing connections of a saved payload.
    Inspect { path: PathBuf },
}
