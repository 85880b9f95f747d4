//! External tool discovery
//!
//! Bundles the introspection tool and code generator a run needs.

use crate::core::global_config::ToolsConfig;
use crate::error::ToolError;
use crate::infra::generator::ProcessGenerator;
use crate::infra::introspect::ProcessIntrospector;

/// The external tools used by a run
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Introspection tool
    pub introspector: ProcessIntrospector,
    /// Code generator
    pub generator: ProcessGenerator,
}

impl Toolchain {
    /// Locate both tools
    pub fn locate(tools: &ToolsConfig) -> Result<Self, ToolError> {
        let introspector = ProcessIntrospector::locate(tools.introspect())?;
        let generator = ProcessGenerator::locate(tools.generator())?;

        tracing::debug!(
            "Using introspection tool {} and generator {}",
            introspector.tool().display(),
            generator.tool().display()
        );

        Ok(Self {
            introspector,
            generator,
        })
    }
}
