//! Prebuilt artifact registry
//!
//! Answers whether a mix artifact is already installed in one of the known
//! install prefixes.

pub mod prefix;

pub use prefix::{ArtifactMarker, PrefixRegistry};
