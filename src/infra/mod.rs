//! Infrastructure layer
//!
//! Handles all I/O operations: external processes, filesystem and
//! installation.

pub mod dirs;
pub mod filesystem;
pub mod generator;
pub mod install;
pub mod introspect;
pub mod toolchain;
