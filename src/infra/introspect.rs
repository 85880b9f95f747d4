//! Introspection tool adapter
//!
//! Runs the external schema-introspection tool with a package name and
//! returns its stdout for decoding.

use std::path::PathBuf;
use std::process::Command;

use crate::core::resolver::Introspector;
use crate::error::{PackageError, ToolError};

/// Introspector backed by an external process
#[derive(Debug, Clone)]
pub struct ProcessIntrospector {
    /// Resolved path of the tool
    tool: PathBuf,
}

impl ProcessIntrospector {
    /// Locate `tool` on PATH (or use it as a path)
    pub fn locate(tool: &str) -> Result<Self, ToolError> {
        let tool = which::which(tool).map_err(|_| ToolError::NotFound {
            tool: tool.to_string(),
        })?;
        Ok(Self { tool })
    }

    /// Path of the tool
    pub fn tool(&self) -> &PathBuf {
        &self.tool
    }
}

impl Introspector for ProcessIntrospector {
    fn describe(&self, package: &str) -> Result<String, PackageError> {
        tracing::debug!("Running {} {package}", self.tool.display());

        let output = Command::new(&self.tool).arg(package).output();
        let output = match output {
            Ok(output) => output,
            Err(e) => {
                // A tool that cannot run cannot locate anything
                tracing::warn!("Failed to run {}: {e}", self.tool.display());
                return Err(PackageError::NotFound {
                    name: package.to_string(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("{} failed for {package}: {}", self.tool.display(), stderr.trim());
            return Err(PackageError::NotFound {
                name: package.to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
