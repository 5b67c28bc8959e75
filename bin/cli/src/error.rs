//! Error types for the command line.

use std::fmt;
use std::path::PathBuf;

/// Failures surfaced to the user by a subcommand.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// An input file could not be read.
    ReadFile { path: PathBuf },
    /// An output file could not be written.
    WriteFile { path: PathBuf },
    /// No built-in template has this name.
    UnknownTemplate { name: String },
    /// A workflow payload could not be decoded or encoded.
    Payload,
    /// `strict` is set and validation produced warnings.
    Warnings { count: usize },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "configuration error: {details}"),
            Self::ReadFile { path } => write!(f, "failed to read '{}'", path.display()),
            Self::WriteFile { path } => write!(f, "failed to write '{}'", path.display()),
            Self::UnknownTemplate { name } => write!(f, "no template named '{name}'"),
            Self::Payload => f.write_str("invalid workflow payload"),
            Self::Warnings { count } => {
                write!(f, "workflow has {count} validation warning(s)")
            }
        }
    }
}

impl std::error::Error for CliError {}
