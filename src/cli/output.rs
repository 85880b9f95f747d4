//! Output formatting and progress indicators
//!
//! Global output settings, progress bars and error display.

use std::sync::OnceLock;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::report::Diagnostic;

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

/// Output settings derived from the global flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress progress and summaries
    pub quiet: bool,
    /// Print machine-readable JSON
    pub json: bool,
    /// Verbosity level (`-v` count)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this the process-wide configuration
    ///
    /// Only the first call has an effect.
    pub fn apply_global(self) {
        let _ = OUTPUT_CONFIG.set(self);
    }

    /// The process-wide configuration, or defaults if none was applied
    pub fn global() -> Self {
        OUTPUT_CONFIG.get().copied().unwrap_or_default()
    }

    /// Default log level for this verbosity
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }

    /// Whether progress bars should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Whether human-readable summaries should be printed
    pub fn show_summary(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Print a fatal error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    if OutputConfig::global().json {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let value = serde_json::json!({
            "error": error.to_string(),
            "causes": causes,
        });
        eprintln!("{value}");
        return;
    }

    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Print recoverable problems to stderr
///
/// Diagnostics are shown even in quiet mode.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{} {diagnostic}", status::WARNING);
    }
}

/// Create a progress bar for artifact builds
///
/// The length grows as each middleware's plan is added.
pub fn create_build_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} artifacts ({msg})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_follows_verbosity() {
        assert_eq!(OutputConfig::new(false, false, 0).log_level(), tracing::Level::WARN);
        assert_eq!(OutputConfig::new(false, false, 1).log_level(), tracing::Level::INFO);
        assert_eq!(OutputConfig::new(false, false, 3).log_level(), tracing::Level::DEBUG);
        assert_eq!(OutputConfig::new(true, false, 2).log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_json_hides_progress() {
        assert!(OutputConfig::new(false, false, 0).show_progress());
        assert!(!OutputConfig::new(false, true, 0).show_progress());
        assert!(!OutputConfig::new(true, false, 0).show_summary());
    }
}
