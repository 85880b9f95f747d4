//! Mixbridge - bridge artifact resolution and orchestration
//!
//! Given an IDL kind, a set of interface packages and a set of target
//! middlewares, mixbridge computes the transitive package closure, plans
//! which mix artifacts are missing for each middleware, generates them in
//! dependency order and installs the results.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic (no I/O operations)
//! - [`registry`] - Install-prefix backed artifact registry
//! - [`infra`] - Infrastructure layer (processes, filesystem, installation)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod registry;

#[cfg(test)]
pub mod test_utils;
