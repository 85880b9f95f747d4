//! Build graph
//!
//! The run's view of the native build: prebuilt artifacts imported from
//! install prefixes and the build units registered for generated artifacts.
//! It is written out after a successful run for the native toolchain.

use std::collections::BTreeSet;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::artifact::MixArtifactId;
use crate::error::BuildError;

/// Something a build unit links against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum LinkTarget {
    /// The middleware runtime library
    Runtime(String),
    /// Another mix artifact, built in this run or imported
    Artifact(String),
    /// The interface package's own native library and includes
    Native(String),
}

/// Where a built artifact gets installed, relative to the install prefix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallRecord {
    /// Library destination
    pub library: PathBuf,
    /// Header destination, only when the artifact has generated headers
    pub headers: Option<PathBuf>,
    /// One manifest entry per message or service type
    pub manifest_entries: Vec<PathBuf>,
}

/// A registered build unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildUnit {
    /// Unit name, the artifact name
    pub name: String,
    /// Artifact identity
    pub artifact: MixArtifactId,
    /// Source files to compile
    pub sources: Vec<PathBuf>,
    /// Include directories
    pub include_dirs: Vec<PathBuf>,
    /// Link targets
    pub links: Vec<LinkTarget>,
    /// Files whose change invalidates the unit
    pub file_deps: Vec<PathBuf>,
    /// Installation metadata
    pub install: InstallRecord,
}

/// Build graph for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildGraph {
    /// Prebuilt artifacts available for linking
    imported: BTreeSet<String>,
    /// Units in registration order
    units: IndexMap<String, BuildUnit>,
}

impl BuildGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a prebuilt artifact available as a link target
    pub fn import(&mut self, id: &MixArtifactId) {
        self.imported.insert(id.artifact_name());
    }

    /// Register a unit
    ///
    /// Every artifact link target must already be registered or imported.
    /// Returns `false` without changes if a unit with this name exists.
    pub fn add_unit(&mut self, unit: BuildUnit) -> Result<bool, BuildError> {
        if self.units.contains_key(&unit.name) {
            return Ok(false);
        }

        for link in &unit.links {
            match link {
                LinkTarget::Artifact(target) if !self.provides(target) => {
                    return Err(BuildError::LinkFailed {
                        artifact: unit.name.clone(),
                        target: target.clone(),
                        reason: "artifact is neither built in this run nor installed".to_string(),
                    });
                }
                LinkTarget::Runtime(name) if name.trim().is_empty() => {
                    return Err(BuildError::LinkFailed {
                        artifact: unit.name.clone(),
                        target: name.clone(),
                        reason: "middleware runtime library name is empty".to_string(),
                    });
                }
                _ => {}
            }
        }

        tracing::debug!(
            "Registered unit {} ({} sources, {} links)",
            unit.name,
            unit.sources.len(),
            unit.links.len()
        );
        self.units.insert(unit.name.clone(), unit);
        Ok(true)
    }

    /// Whether an artifact can be linked against
    pub fn provides(&self, artifact_name: &str) -> bool {
        self.units.contains_key(artifact_name) || self.imported.contains(artifact_name)
    }

    /// A registered unit
    pub fn unit(&self, name: &str) -> Option<&BuildUnit> {
        self.units.get(name)
    }

    /// All registered units in registration order
    pub fn units(&self) -> impl Iterator<Item = &BuildUnit> {
        self.units.values()
    }

    /// Number of registered units
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
