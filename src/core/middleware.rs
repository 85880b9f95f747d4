//! Middleware extensions
//!
//! A middleware can be targeted for an IDL kind only when an extension
//! descriptor exists for it at `<extensions_dir>/<idl>/<middleware>.toml`.
//! The descriptor names the runtime library artifacts link against and
//! either the generator templates or a list of precompiled sources.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::package::DefinitionKind;
use crate::error::MiddlewareError;

/// Extension descriptor file contents
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionDescriptor {
    /// Middleware section
    pub middleware: MiddlewareSection,
    /// Generator templates (template mode)
    #[serde(default)]
    pub templates: Option<TemplateSet>,
    /// Precompiled sources (explicit-source mode)
    #[serde(default)]
    pub sources: Option<ExplicitSources>,
}

/// `[middleware]` section
#[derive(Debug, Clone, Deserialize)]
pub struct MiddlewareSection {
    /// Runtime library every artifact of this middleware links against
    pub runtime: String,
}

/// `[templates]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateSet {
    /// Message source template
    pub message_source: PathBuf,
    /// Message header template
    pub message_header: PathBuf,
    /// Service source template
    pub service_source: PathBuf,
    /// Service header template
    pub service_header: PathBuf,
}

impl TemplateSet {
    /// Source and header template for one definition kind
    pub fn for_kind(&self, kind: DefinitionKind) -> (&Path, &Path) {
        match kind {
            DefinitionKind::Msg => (&self.message_source, &self.message_header),
            DefinitionKind::Srv => (&self.service_source, &self.service_header),
        }
    }

    fn rebase(self, base: &Path) -> Self {
        Self {
            message_source: base.join(self.message_source),
            message_header: base.join(self.message_header),
            service_source: base.join(self.service_source),
            service_header: base.join(self.service_header),
        }
    }
}

/// `[sources]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExplicitSources {
    /// Source files compiled instead of generated ones
    pub files: Vec<PathBuf>,
    /// Include directory shipped with the sources
    #[serde(default)]
    pub include_dir: Option<PathBuf>,
}

impl ExplicitSources {
    fn rebase(self, base: &Path) -> Self {
        Self {
            files: self.files.into_iter().map(|f| base.join(f)).collect(),
            include_dir: self.include_dir.map(|d| base.join(d)),
        }
    }
}

/// How a middleware's artifacts get their sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    /// Run the generator with these templates
    Templates(TemplateSet),
    /// Use these sources directly, skipping generation
    Explicit(ExplicitSources),
}

/// A selected middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Middleware {
    /// Middleware name
    pub name: String,
    /// Runtime library name
    pub runtime: String,
    /// Generation mode
    pub mode: GenerationMode,
    /// Descriptor file this middleware was loaded from
    pub descriptor: PathBuf,
}

impl Middleware {
    /// Load the extension for `name` from `extensions_dir` for IDL `idl`
    pub fn load(extensions_dir: &Path, idl: &str, name: &str) -> Result<Self, MiddlewareError> {
        let path = extensions_dir.join(idl).join(format!("{name}.toml"));
        if !path.is_file() {
            return Err(MiddlewareError::ExtensionMissing {
                middleware: name.to_string(),
                idl: idl.to_string(),
                path,
            });
        }

        let invalid = |error: String| MiddlewareError::InvalidExtension {
            middleware: name.to_string(),
            path: path.clone(),
            error,
        };

        let content = fs::read_to_string(&path).map_err(|e| invalid(e.to_string()))?;
        let descriptor: ExtensionDescriptor =
            toml::from_str(&content).map_err(|e| invalid(e.to_string()))?;

        let base = path.parent().unwrap_or(extensions_dir);
        let mode = match (descriptor.sources, descriptor.templates) {
            // Explicit sources win when both are present
            (Some(sources), _) => GenerationMode::Explicit(sources.rebase(base)),
            (None, Some(templates)) => GenerationMode::Templates(templates.rebase(base)),
            (None, None) => {
                return Err(invalid(
                    "descriptor needs a [templates] or [sources] section".to_string(),
                ))
            }
        };

        if descriptor.middleware.runtime.trim().is_empty() {
            return Err(invalid("middleware.runtime must not be empty".to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            runtime: descriptor.middleware.runtime,
            mode,
            descriptor: path,
        })
    }

    /// Whether this middleware uses precompiled sources
    pub fn is_explicit(&self) -> bool {
        matches!(self.mode, GenerationMode::Explicit(_))
    }
}

/// Outcome of selecting the requested middlewares
#[derive(Debug, Default)]
pub struct MiddlewareSelection {
    /// Middlewares that can be used, in request order
    pub selected: Vec<Middleware>,
    /// Middlewares that were dropped
    pub dropped: Vec<MiddlewareError>,
}

/// Load every requested middleware, dropping the ones that cannot be used
pub fn select(extensions_dir: &Path, idl: &str, requested: &[String]) -> MiddlewareSelection {
    let mut selection = MiddlewareSelection::default();
    let mut seen = HashSet::new();

    for name in requested {
        if !seen.insert(name.as_str()) {
            continue;
        }
        match Middleware::load(extensions_dir, idl, name) {
            Ok(middleware) => {
                tracing::debug!(
                    "Selected middleware {name} from {}",
                    middleware.descriptor.display()
                );
                selection.selected.push(middleware);
            }
            Err(e) => {
                tracing::debug!("{e}");
                selection.dropped.push(e);
            }
        }
    }

    selection
}
