//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::core::global_config::GlobalConfig;
use crate::core::request::MixRequest;
use crate::infra::dirs::MixDirs;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and install the missing mix artifacts
    Build(BuildArgs),

    /// Show the closure and build plans without generating anything
    Plan(PlanArgs),
}

/// What to build: IDL kind, packages and middlewares
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// IDL kind (e.g. rosidl)
    pub idl: String,

    /// Interface packages to bridge
    #[arg(required = true, num_args = 1..)]
    pub packages: Vec<String>,

    /// Target middlewares (comma separated or repeated)
    #[arg(
        short = 'm',
        long = "middleware",
        value_delimiter = ',',
        required = true,
        value_name = "MW"
    )]
    pub middlewares: Vec<String>,

    /// Fail on any missing package or middleware instead of dropping it
    #[arg(long)]
    pub required: bool,
}

impl TargetArgs {
    /// The request these arguments describe
    pub fn request(&self, strict_by_default: bool) -> MixRequest {
        MixRequest::new(&self.idl, self.packages.clone(), self.middlewares.clone())
            .strict(self.required || strict_by_default)
    }
}

/// Arguments of `mixbridge build`
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Directory for generated code and the build graph
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Prefix built artifacts are installed into
    #[arg(long, value_name = "DIR")]
    pub install_prefix: Option<PathBuf>,
}

/// Arguments of `mixbridge plan`
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Prefix searched first for prebuilt artifacts
    #[arg(long, value_name = "DIR")]
    pub install_prefix: Option<PathBuf>,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, config_path: Option<&Path>) -> Result<()> {
        let dirs = MixDirs::new();
        let config = load_config(config_path, &dirs)?;

        match self {
            Self::Build(args) => build::execute(&args, &config, &dirs).await,
            Self::Plan(args) => plan::execute(&args, &config, &dirs).await,
        }
    }
}

/// Load the explicit configuration file, or the global one
fn load_config(path: Option<&Path>, dirs: &MixDirs) -> Result<GlobalConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file {} does not exist", path.display());
            }
            GlobalConfig::load_from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))
        }
        None => GlobalConfig::load(dirs).context("Failed to load global configuration"),
    }
}
