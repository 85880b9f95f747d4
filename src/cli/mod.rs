//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use commands::Commands;

/// Mixbridge - build bridge artifacts between middlewares
///
/// Resolves interface packages, plans the missing mix artifacts for each
/// middleware and generates them in dependency order.
#[derive(Parser, Debug)]
#[command(name = "mixbridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and diagnostics
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Use this configuration file instead of the global one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            cmd.run(self.config.as_deref()).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_command() {
        let cli = Cli::try_parse_from([
            "mixbridge",
            "-vv",
            "build",
            "rosidl",
            "nav_msgs",
            "std_msgs",
            "-m",
            "ros2,websocket",
            "--required",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Some(Commands::Build(args)) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.target.idl, "rosidl");
        assert_eq!(args.target.packages, vec!["nav_msgs", "std_msgs"]);
        assert_eq!(args.target.middlewares, vec!["ros2", "websocket"]);
        assert!(args.target.required);
    }

    #[test]
    fn test_middlewares_are_required() {
        assert!(Cli::try_parse_from(["mixbridge", "plan", "rosidl", "std_msgs"]).is_err());
    }

    #[test]
    fn test_repeated_middleware_flags_accumulate() {
        let cli = Cli::try_parse_from([
            "mixbridge", "plan", "rosidl", "std_msgs", "-m", "ros2", "-m", "dds",
        ])
        .unwrap();
        let Some(Commands::Plan(args)) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.target.middlewares, vec!["ros2", "dds"]);
    }
}
