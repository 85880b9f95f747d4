//! Installation of built artifacts
//!
//! Publishes built artifacts into an install prefix: generated headers, one
//! manifest entry per interface type and the artifact marker the registry
//! looks up. Only called once a whole run has succeeded.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::defaults::BUILD_GRAPH_FILE;
use crate::core::builder::BuiltArtifact;
use crate::core::graph::BuildGraph;
use crate::error::FilesystemError;
use crate::infra::filesystem;
use crate::registry::prefix::{marker_path, ArtifactMarker};

/// Contents of a manifest entry
#[derive(Debug, Serialize)]
struct ManifestEntry<'a> {
    artifact: String,
    library: &'a Path,
}

/// Summary of one install
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    /// Artifacts installed
    pub artifacts: usize,
    /// Manifest entries written
    pub manifest_entries: usize,
    /// Header files copied
    pub headers: usize,
}

/// Installs artifacts into a prefix
#[derive(Debug, Clone)]
pub struct Installer {
    prefix: PathBuf,
}

impl Installer {
    /// Installer for `prefix`
    pub fn new(prefix: PathBuf) -> Self {
        Self { prefix }
    }

    /// The install prefix
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Install every artifact in `built`
    pub fn install(&self, built: &[&BuiltArtifact]) -> Result<InstallSummary, FilesystemError> {
        let mut summary = InstallSummary::default();

        for artifact in built {
            let id = &artifact.artifact.id;
            let install = &artifact.install;

            if let (Some(include_dir), Some(dest)) = (&artifact.include_dir, &install.headers) {
                summary.headers += filesystem::copy_tree(include_dir, &self.prefix.join(dest))?;
            }

            let entry = ManifestEntry {
                artifact: id.artifact_name(),
                library: &install.library,
            };
            let entry = to_toml(&entry, &self.prefix)?;
            for path in &install.manifest_entries {
                filesystem::write_file(&self.prefix.join(path), &entry)?;
                summary.manifest_entries += 1;
            }

            let marker = ArtifactMarker {
                idl: id.idl.clone(),
                middleware: id.middleware.clone(),
                package: id.package.clone(),
                library: install.library.clone(),
                types: install
                    .manifest_entries
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect(),
            };
            let marker_file = marker_path(&self.prefix, id);
            filesystem::write_file(&marker_file, &to_toml(&marker, &marker_file)?)?;

            tracing::debug!("Installed {id} into {}", self.prefix.display());
            summary.artifacts += 1;
        }

        Ok(summary)
    }
}

/// Write the build graph for `idl` under `build_dir`
pub fn write_build_graph(
    graph: &BuildGraph,
    build_dir: &Path,
    idl: &str,
) -> Result<PathBuf, FilesystemError> {
    let path = build_dir.join(idl).join(BUILD_GRAPH_FILE);
    let json = graph.to_json().map_err(|e| FilesystemError::WriteFile {
        path: path.clone(),
        error: e.to_string(),
    })?;
    filesystem::write_file(&path, &json)?;
    Ok(path)
}

fn to_toml<T: Serialize>(value: &T, path: &Path) -> Result<String, FilesystemError> {
    toml::to_string_pretty(value).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
