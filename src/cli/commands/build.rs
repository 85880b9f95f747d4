//! Build command implementation
//!
//! Implements `mixbridge build`: the full orchestration, then the build
//! graph is written and every artifact built in the run is installed.

use anyhow::{Context, Result};
use indicatif::ProgressBar;

use crate::cli::commands::BuildArgs;
use crate::cli::output::{create_build_bar, print_diagnostics, status, OutputConfig};
use crate::core::global_config::GlobalConfig;
use crate::core::orchestrator::Orchestrator;
use crate::core::report::RunReport;
use crate::infra::dirs::MixDirs;
use crate::infra::install::{write_build_graph, Installer};
use crate::infra::toolchain::Toolchain;
use crate::registry::PrefixRegistry;

/// Execute the build command
pub async fn execute(args: &BuildArgs, config: &GlobalConfig, dirs: &MixDirs) -> Result<()> {
    let output = OutputConfig::global();
    let request = args.target.request(config.strict());
    request.validate()?;

    let build_dir = args
        .build_dir
        .clone()
        .unwrap_or_else(|| config.build_dir(dirs));
    let install_prefix = args
        .install_prefix
        .clone()
        .unwrap_or_else(|| config.install_prefix(dirs));
    let extensions_dir = config.extensions_dir(dirs);

    let toolchain = Toolchain::locate(&config.tools).context("Failed to locate external tools")?;
    let registry =
        PrefixRegistry::new(config.search_prefixes(&install_prefix)).with_env_prefixes();
    tracing::debug!("Artifact search prefixes: {:?}", registry.prefixes());

    tracing::info!(
        "Building {} for {} into {}",
        request.packages.join(", "),
        request.middlewares.join(", "),
        build_dir.display()
    );

    let bar = if output.show_progress() {
        create_build_bar(0)
    } else {
        ProgressBar::hidden()
    };
    let mut orchestrator = Orchestrator::new(
        toolchain.introspector,
        toolchain.generator,
        registry,
        extensions_dir,
        build_dir.clone(),
    )
    .with_progress(bar);

    let mut report = orchestrator.run(&request)?;
    print_diagnostics(&report.diagnostics);

    let graph_path = write_build_graph(orchestrator.graph(), &build_dir, &request.idl)
        .context("Failed to write build graph")?;
    report.build_graph = Some(graph_path);

    let installer = Installer::new(install_prefix);
    let summary = installer
        .install(&orchestrator.built_artifacts())
        .with_context(|| format!("Failed to install into {}", installer.prefix().display()))?;
    report.installed = summary.artifacts;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if output.show_summary() {
        print_summary(&report);
        println!(
            "{} Installed {} artifact(s) ({} manifest entries) into {}",
            status::SUCCESS,
            summary.artifacts,
            summary.manifest_entries,
            installer.prefix().display()
        );
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    for mw in &report.middlewares {
        println!("{}:", mw.middleware);
        for name in &mw.built {
            println!("  {} built {name}", status::SUCCESS);
        }
        for name in &mw.available {
            println!("  {} available {name}", status::INFO);
        }
        if mw.built.is_empty() && mw.available.is_empty() {
            println!("  (nothing to build)");
        }
    }
    println!(
        "\n{} built, {} already available",
        report.built_count(),
        report.available_count()
    );
}
