//! Code generator adapter
//!
//! Runs the external generator tool with named arguments and captures its
//! output. Judging the output is left to the builder.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::builder::{GenerationRequest, Generator, GeneratorOutput};
use crate::error::ToolError;

/// Generator backed by an external process
#[derive(Debug, Clone)]
pub struct ProcessGenerator {
    /// Resolved path of the tool
    tool: PathBuf,
}

impl ProcessGenerator {
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

/// Command-line arguments for one generation
pub fn generator_args(request: &GenerationRequest) -> Vec<String> {
    fn path(p: &Path) -> String {
        p.display().to_string()
    }

    let mut args = vec![
        "--package".to_string(),
        request.package.clone(),
        "--source-dir".to_string(),
        path(&request.source_dir),
        "--header-dir".to_string(),
        path(&request.header_dir),
    ];

    args.push("--messages".to_string());
    args.extend(request.message_files.iter().map(|p| path(p)));
    args.push("--message-templates".to_string());
    args.push(path(&request.message_templates.0));
    args.push(path(&request.message_templates.1));

    args.push("--services".to_string());
    args.extend(request.service_files.iter().map(|p| path(p)));
    args.push("--service-templates".to_string());
    args.push(path(&request.service_templates.0));
    args.push(path(&request.service_templates.1));

    args
}

impl Generator for ProcessGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratorOutput, ToolError> {
        let args = generator_args(request);
        tracing::debug!("Running {} {}", self.tool.display(), args.join(" "));

        let output = Command::new(&self.tool)
            .args(&args)
            .output()
            .map_err(|e| ToolError::SpawnFailed {
                tool: self.tool.display().to_string(),
                error: e.to_string(),
            })?;

        Ok(GeneratorOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
