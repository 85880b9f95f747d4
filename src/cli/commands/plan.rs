//! Plan command implementation
//!
//! Implements `mixbridge plan`: resolves the closure and prints each
//! middleware's ordered build plan without generating anything.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::commands::PlanArgs;
use crate::cli::output::{print_diagnostics, status, OutputConfig};
use crate::core::closure::{DependencyClosure, Requester};
use crate::core::global_config::GlobalConfig;
use crate::core::orchestrator::Orchestrator;
use crate::core::planner::BuildPlan;
use crate::core::report::Diagnostic;
use crate::infra::dirs::MixDirs;
use crate::infra::toolchain::Toolchain;
use crate::registry::PrefixRegistry;

/// One closure member with the packages that need it
#[derive(Debug, Serialize)]
struct ClosureEntry {
    package: String,
    requesters: Vec<Requester>,
}

/// JSON shape of `mixbridge plan`
#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    idl: &'a str,
    closure: Vec<ClosureEntry>,
    plans: &'a [BuildPlan],
    diagnostics: &'a [Diagnostic],
}

/// Execute the plan command
pub async fn execute(args: &PlanArgs, config: &GlobalConfig, dirs: &MixDirs) -> Result<()> {
    let output = OutputConfig::global();
    let request = args.target.request(config.strict());
    request.validate()?;

    let install_prefix = args
        .install_prefix
        .clone()
        .unwrap_or_else(|| config.install_prefix(dirs));

    let toolchain = Toolchain::locate(&config.tools).context("Failed to locate external tools")?;
    let registry =
        PrefixRegistry::new(config.search_prefixes(&install_prefix)).with_env_prefixes();
    tracing::debug!("Artifact search prefixes: {:?}", registry.prefixes());
    let mut orchestrator = Orchestrator::new(
        toolchain.introspector,
        toolchain.generator,
        registry,
        config.extensions_dir(dirs),
        config.build_dir(dirs),
    );

    let (preparation, plans) = orchestrator.plan(&request)?;
    print_diagnostics(&preparation.diagnostics);

    if output.json {
        let report = PlanReport {
            idl: &request.idl,
            closure: closure_entries(&preparation.closure),
            plans: &plans,
            diagnostics: &preparation.diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !output.show_summary() {
        return Ok(());
    }

    println!("Closure ({} package(s)):", preparation.closure.len());
    for entry in closure_entries(&preparation.closure) {
        let requesters: Vec<String> = entry.requesters.iter().map(ToString::to_string).collect();
        println!("  • {} (needed by {})", entry.package, requesters.join(", "));
    }

    for plan in &plans {
        println!("\n{}:", plan.middleware);
        for (index, artifact) in plan.artifacts.iter().enumerate() {
            println!("  {}. {}", index + 1, artifact.id.artifact_name());
        }
        for artifact in &plan.satisfied {
            println!(
                "  {} {} already available",
                status::INFO,
                artifact.id.artifact_name()
            );
        }
        if plan.is_empty() && plan.satisfied.is_empty() {
            println!("  (nothing to build)");
        }
    }

    Ok(())
}

fn closure_entries(closure: &DependencyClosure) -> Vec<ClosureEntry> {
    closure
        .packages()
        .iter()
        .map(|package| ClosureEntry {
            package: package.clone(),
            requesters: closure
                .requesters(package)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default(),
        })
        .collect()
}
