//! Global configuration management
//!
//! Reads settings from `config.toml` in the config directory: external tool
//! commands, build and install locations, prefixes searched for prebuilt
//! artifacts and the default strictness of runs.

use crate::config::defaults::{GENERATOR_TOOL, INTROSPECT_TOOL};
use crate::infra::dirs::MixDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for mixbridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// External tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Directory settings
    #[serde(default)]
    pub paths: PathsConfig,

    /// Run defaults
    #[serde(default)]
    pub run: RunConfig,
}

/// External tool commands
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Introspection tool command or path
    pub introspect: Option<String>,

    /// Generator tool command or path
    pub generator: Option<String>,
}

impl ToolsConfig {
    /// Effective introspection tool
    #[must_use]
    pub fn introspect(&self) -> &str {
        self.introspect.as_deref().unwrap_or(INTROSPECT_TOOL)
    }

    /// Effective generator tool
    #[must_use]
    pub fn generator(&self) -> &str {
        self.generator.as_deref().unwrap_or(GENERATOR_TOOL)
    }
}

/// Directory settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Middleware extension descriptors
    pub extensions_dir: Option<PathBuf>,

    /// Generated code
    pub build_dir: Option<PathBuf>,

    /// Where built artifacts are installed
    pub install_prefix: Option<PathBuf>,

    /// Extra prefixes searched for prebuilt artifacts
    #[serde(default)]
    pub prefix_path: Vec<PathBuf>,
}

/// Run defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Escalate recoverable problems to fatal
    pub strict: Option<bool>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    /// If the config file exists but is invalid, returns an error.
    pub fn load(dirs: &MixDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective extensions directory
    #[must_use]
    pub fn extensions_dir(&self, dirs: &MixDirs) -> PathBuf {
        self.paths
            .extensions_dir
            .clone()
            .unwrap_or_else(|| dirs.extensions_dir())
    }

    /// Effective build directory
    #[must_use]
    pub fn build_dir(&self, dirs: &MixDirs) -> PathBuf {
        self.paths.build_dir.clone().unwrap_or_else(|| dirs.build_dir())
    }

    /// Effective install prefix
    #[must_use]
    pub fn install_prefix(&self, dirs: &MixDirs) -> PathBuf {
        self.paths
            .install_prefix
            .clone()
            .unwrap_or_else(|| dirs.install_prefix())
    }

    /// Prefixes searched for prebuilt artifacts, install prefix first
    #[must_use]
    pub fn search_prefixes(&self, install_prefix: &Path) -> Vec<PathBuf> {
        let mut prefixes = vec![install_prefix.to_path_buf()];
        for prefix in &self.paths.prefix_path {
            if !prefixes.contains(prefix) {
                prefixes.push(prefix.clone());
            }
        }
        prefixes
    }

    /// Effective strictness
    #[must_use]
    pub fn strict(&self) -> bool {
        self.run.strict.unwrap_or(false)
    }
}
