//! Core domain types and utilities for botflow.
//!
//! This crate provides the foundational ids and error handling shared by the
//! workflow model and the authoring command line.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EditSessionId, ParseIdError, WorkflowId};
