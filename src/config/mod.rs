//! Configuration and constants
//!
//! Compile-time defaults. Runtime configuration lives in
//! [`crate::core::global_config`].

pub mod defaults;
