//! Error types for mixbridge
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Package resolution errors
///
/// All variants are recoverable by excluding the package (and everything
/// that requires it) unless the run is strict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackageError {
    /// The introspection tool could not locate the package
    #[error("Package '{name}' could not be found")]
    NotFound { name: String },

    /// The introspection tool produced output of the wrong shape
    #[error("Malformed package info for '{name}': expected 4 fields, got {fields}")]
    Malformed { name: String, fields: usize },

    /// A dependency name that is not a valid package name
    #[error("Invalid package name '{name}'")]
    InvalidName { name: String },
}

impl PackageError {
    /// Name of the package this error refers to
    pub fn package(&self) -> &str {
        match self {
            Self::NotFound { name } | Self::Malformed { name, .. } | Self::InvalidName { name } => {
                name
            }
        }
    }
}

/// Build planning errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Packages do not form a DAG
    #[error("Cyclic package dependency: {}", cycle.join(" -> "))]
    CyclicPackageDependency { cycle: Vec<String> },
}

/// Artifact generation and linking errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// The generator failed or wrote to its error channel
    #[error("Code generation failed for '{artifact}': {message}")]
    GenerationFailed { artifact: String, message: String },

    /// The generator succeeded but emitted no sources
    #[error("Code generation for '{artifact}' produced no source files")]
    NoGeneratedSources { artifact: String },

    /// A link target could not be resolved
    #[error("Failed to link '{artifact}' against '{target}': {reason}")]
    LinkFailed {
        artifact: String,
        target: String,
        reason: String,
    },

    /// Package info was not available when building
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Filesystem error while preparing or collecting output
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// External tool could not be run
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

/// Middleware selection errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareError {
    /// No extension descriptor for this middleware and IDL kind
    #[error("Middleware '{middleware}' has no extension for IDL '{idl}' (looked for {})", path.display())]
    ExtensionMissing {
        middleware: String,
        idl: String,
        path: PathBuf,
    },

    /// Extension descriptor exists but cannot be used
    #[error("Invalid extension for middleware '{middleware}' at {}: {error}", path.display())]
    InvalidExtension {
        middleware: String,
        path: PathBuf,
        error: String,
    },
}

/// External tool errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool is not on PATH
    #[error("Tool '{tool}' not found in PATH")]
    NotFound { tool: String },

    /// Tool could not be spawned
    #[error("Failed to run '{tool}': {error}")]
    SpawnFailed { tool: String, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// Invalid user request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Name does not match the expected pattern
    #[error("Invalid {what} name '{name}'")]
    InvalidName { what: &'static str, name: String },

    /// Nothing was requested
    #[error("At least one {what} must be requested")]
    Empty { what: &'static str },
}

/// Top-level mixbridge error type
#[derive(Error, Debug)]
pub enum MixError {
    /// Invalid request
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    /// Planning error
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// External tool error
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Strict run found recoverable problems
    #[error("{} problem(s) found in required mode:\n  {}", problems.len(), problems.join("\n  "))]
    Strict { problems: Vec<String> },
}
