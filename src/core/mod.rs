//! Core business logic module
//!
//! The resolution and orchestration algorithm. External tools are reached
//! only through the [`resolver::Introspector`], [`builder::Generator`] and
//! [`artifact::ArtifactRegistry`] traits; their process and filesystem
//! backed implementations live in [`crate::infra`] and [`crate::registry`].
//!
//! # Submodules
//!
//! - [`package`] - Introspection output decoding
//! - [`resolver`] - Memoized package info resolution
//! - [`closure`] - Dependency closure with cascading exclusion
//! - [`middleware`] - Extension descriptors and middleware selection
//! - [`artifact`] - Mix artifact identities and the registry trait
//! - [`planner`] - Per-middleware build plans
//! - [`graph`] - In-memory build graph
//! - [`builder`] - Artifact generation
//! - [`orchestrator`] - Run orchestration
//! - [`report`] - Run reports and diagnostics
//! - [`request`] - Request validation
//! - [`global_config`] - Global configuration

pub mod artifact;
pub mod builder;
pub mod closure;
pub mod global_config;
pub mod graph;
pub mod middleware;
pub mod orchestrator;
pub mod package;
pub mod planner;
pub mod report;
pub mod request;
pub mod resolver;
