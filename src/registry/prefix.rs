//! Install-prefix backed artifact registry
//!
//! An artifact is available when its marker file
//! `<prefix>/share/mixbridge/artifacts/<artifact-name>.toml` exists in any
//! searched prefix. Markers are only written by a successful install.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults::{APP_NAME, ENV_PREFIX_PATH};
use crate::core::artifact::{ArtifactRegistry, MixArtifactId};

/// Contents of an artifact marker file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMarker {
    /// IDL kind
    pub idl: String,
    /// Middleware name
    pub middleware: String,
    /// Package name
    pub package: String,
    /// Library path relative to the prefix
    pub library: PathBuf,
    /// Type names covered by the artifact
    #[serde(default)]
    pub types: Vec<String>,
}

/// Marker path for `id` under `prefix`
pub fn marker_path(prefix: &Path, id: &MixArtifactId) -> PathBuf {
    prefix
        .join("share")
        .join(APP_NAME)
        .join("artifacts")
        .join(format!("{}.toml", id.artifact_name()))
}

/// Registry searching a list of install prefixes
#[derive(Debug, Clone, Default)]
pub struct PrefixRegistry {
    prefixes: Vec<PathBuf>,
}

impl PrefixRegistry {
    /// Registry over the given prefixes
    pub fn new(prefixes: Vec<PathBuf>) -> Self {
        Self { prefixes }
    }

    /// Add the prefixes listed in `MIXBRIDGE_PREFIX_PATH`
    #[must_use]
    pub fn with_env_prefixes(mut self) -> Self {
        if let Some(paths) = env::var_os(ENV_PREFIX_PATH) {
            for path in env::split_paths(&paths) {
                if !path.as_os_str().is_empty() && !self.prefixes.contains(&path) {
                    self.prefixes.push(path);
                }
            }
        }
        self
    }

    /// Searched prefixes, in order
    pub fn prefixes(&self) -> &[PathBuf] {
        &self.prefixes
    }

    /// First prefix holding the artifact
    pub fn locate(&self, id: &MixArtifactId) -> Option<&Path> {
        self.prefixes
            .iter()
            .find(|prefix| marker_path(prefix, id).is_file())
            .map(PathBuf::as_path)
    }
}

impl ArtifactRegistry for PrefixRegistry {
    fn is_available(&self, id: &MixArtifactId) -> bool {
        self.locate(id).is_some()
    }
}
