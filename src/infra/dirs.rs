//! Platform-specific directory management
//!
//! Provides platform-specific paths for cache, config, and data directories.
//! Follows XDG Base Directory Specification on Linux and standard locations on macOS.
//!
//! Environment variables can override default directories:
//! - `MIXBRIDGE_CACHE_DIR` - Override cache directory
//! - `MIXBRIDGE_CONFIG_DIR` - Override config directory
//! - `MIXBRIDGE_DATA_DIR` - Override data directory

use std::env;
use std::path::PathBuf;

use crate::config::defaults::APP_NAME;

/// Environment variable names for directory overrides
pub const ENV_CACHE_DIR: &str = "MIXBRIDGE_CACHE_DIR";
pub const ENV_CONFIG_DIR: &str = "MIXBRIDGE_CONFIG_DIR";
pub const ENV_DATA_DIR: &str = "MIXBRIDGE_DATA_DIR";

/// Subdirectory names
const BUILD_SUBDIR: &str = "build";
const EXTENSIONS_SUBDIR: &str = "extensions";
const INSTALL_SUBDIR: &str = "install";

/// Platform-specific directory provider for mixbridge
#[derive(Debug, Clone)]
pub struct MixDirs {
    cache_dir: PathBuf,
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl MixDirs {
    /// Create a new `MixDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache_dir: resolve(ENV_CACHE_DIR, dirs::cache_dir, &[".cache"]),
            config_dir: resolve(ENV_CONFIG_DIR, dirs::config_dir, &[".config"]),
            data_dir: resolve(ENV_DATA_DIR, dirs::data_dir, &[".local", "share"]),
        }
    }

    /// Cache directory (regenerable data)
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    /// Config directory
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Data directory
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    /// Default directory for generated code
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.cache_dir.join(BUILD_SUBDIR)
    }

    /// Default directory of middleware extension descriptors
    #[must_use]
    pub fn extensions_dir(&self) -> PathBuf {
        self.data_dir.join(EXTENSIONS_SUBDIR)
    }

    /// Default install prefix
    #[must_use]
    pub fn install_prefix(&self) -> PathBuf {
        self.data_dir.join(INSTALL_SUBDIR)
    }

    /// Global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

impl Default for MixDirs {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a directory from an environment override or the platform default
fn resolve(var: &str, platform: fn() -> Option<PathBuf>, home_fallback: &[&str]) -> PathBuf {
    if let Ok(path) = env::var(var) {
        return PathBuf::from(path);
    }

    platform().map(|p| p.join(APP_NAME)).unwrap_or_else(|| {
        // Fallback to home directory, then the working directory
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home_fallback
            .iter()
            .fold(base, |path, part| path.join(part))
            .join(APP_NAME)
    })
}
