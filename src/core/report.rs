//! Run reports
//!
//! Diagnostics for dropped packages and middlewares, and per-middleware
//! results of a run.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::closure::Exclusion;
use crate::error::MiddlewareError;

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A package and its requesters were dropped
    DroppedPackage,
    /// A middleware was dropped
    DroppedMiddleware,
}

/// A recoverable problem found during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Kind of problem
    pub kind: DiagnosticKind,
    /// Package or middleware concerned
    pub subject: String,
    /// Human-readable description
    pub message: String,
    /// Requesters dropped along with the subject
    pub affected: Vec<String>,
}

impl Diagnostic {
    /// Diagnostic for a package excluded from the closure
    pub fn from_exclusion(exclusion: &Exclusion) -> Self {
        Self {
            kind: DiagnosticKind::DroppedPackage,
            subject: exclusion.package.clone(),
            message: exclusion.to_string(),
            affected: exclusion.affected.clone(),
        }
    }

    /// Diagnostic for a dropped middleware
    pub fn from_middleware(error: &MiddlewareError) -> Self {
        let subject = match error {
            MiddlewareError::ExtensionMissing { middleware, .. }
            | MiddlewareError::InvalidExtension { middleware, .. } => middleware.clone(),
        };
        Self {
            kind: DiagnosticKind::DroppedMiddleware,
            subject,
            message: error.to_string(),
            affected: Vec::new(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Results for one middleware
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MiddlewareReport {
    /// Middleware name
    pub middleware: String,
    /// Artifacts built in this run, in build order
    pub built: Vec<String>,
    /// Artifacts that were already available
    pub available: Vec<String>,
}

/// Results of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// IDL kind
    pub idl: String,
    /// Per-middleware results, in request order
    pub middlewares: Vec<MiddlewareReport>,
    /// Recoverable problems
    pub diagnostics: Vec<Diagnostic>,
    /// Build graph written for the native toolchain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_graph: Option<PathBuf>,
    /// Artifacts installed
    pub installed: usize,
}

impl RunReport {
    /// Total artifacts built across middlewares
    pub fn built_count(&self) -> usize {
        self.middlewares.iter().map(|m| m.built.len()).sum()
    }

    /// Total artifacts already available across middlewares
    pub fn available_count(&self) -> usize {
        self.middlewares.iter().map(|m| m.available.len()).sum()
    }
}
