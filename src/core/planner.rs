//! Build planning
//!
//! Turns a dependency closure into the ordered list of artifacts one
//! middleware still needs. Artifacts that are already available are
//! satisfied and never scheduled.

use std::collections::HashSet;

use serde::Serialize;

use crate::core::artifact::{ArtifactRegistry, ArtifactStatus, MixArtifact, MixArtifactId};
use crate::core::closure::DependencyClosure;
use crate::error::PlanError;

/// Ordered build plan for one middleware
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildPlan {
    /// Middleware this plan is for
    pub middleware: String,
    /// Artifacts to generate, dependencies before dependents
    pub artifacts: Vec<MixArtifact>,
    /// Artifacts already available outside this run
    pub satisfied: Vec<MixArtifact>,
}

impl BuildPlan {
    /// Whether nothing needs to be built
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Position of a package in the build order
    pub fn position(&self, package: &str) -> Option<usize> {
        self.artifacts.iter().position(|a| a.id.package == package)
    }
}

/// Plan the artifacts `middleware` needs for every package in `closure`
///
/// Fails with [`PlanError::CyclicPackageDependency`] if the packages in the
/// closure do not form a DAG.
pub fn plan<R: ArtifactRegistry>(
    closure: &DependencyClosure,
    idl: &str,
    middleware: &str,
    registry: &R,
) -> Result<BuildPlan, PlanError> {
    let order = topological_order(closure)?;

    let mut satisfied = Vec::new();
    let mut missing = HashSet::new();
    for package in &order {
        let id = MixArtifactId::new(idl, middleware, package);
        if registry.is_available(&id) {
            tracing::debug!("{id} is already available");
            satisfied.push(MixArtifact {
                id,
                status: ArtifactStatus::AvailableExternally,
                depends_on: Vec::new(),
            });
        } else {
            missing.insert(package.as_str());
        }
    }

    let artifacts = order
        .iter()
        .filter(|package| missing.contains(package.as_str()))
        .map(|package| {
            let depends_on = closure
                .info(package)
                .map(|info| {
                    info.dependencies
                        .iter()
                        .filter(|dep| missing.contains(dep.as_str()))
                        .map(|dep| MixArtifactId::new(idl, middleware, dep))
                        .collect()
                })
                .unwrap_or_default();

            MixArtifact {
                id: MixArtifactId::new(idl, middleware, package),
                status: ArtifactStatus::ToBeGenerated,
                depends_on,
            }
        })
        .collect::<Vec<_>>();

    tracing::info!(
        "Plan for {middleware}: {} to build, {} available",
        artifacts.len(),
        satisfied.len()
    );

    Ok(BuildPlan {
        middleware: middleware.to_string(),
        artifacts,
        satisfied,
    })
}

/// Order the closure so that dependencies come before dependents
///
/// Visits packages in first-seen order so the result is deterministic.
pub fn topological_order(closure: &DependencyClosure) -> Result<Vec<String>, PlanError> {
    let mut visited = HashSet::new();
    let mut on_path = HashSet::new();
    let mut path = Vec::new();
    let mut result = Vec::new();

    for package in closure.packages() {
        visit(
            closure,
            package,
            &mut visited,
            &mut on_path,
            &mut path,
            &mut result,
        )?;
    }

    Ok(result)
}

fn visit(
    closure: &DependencyClosure,
    node: &str,
    visited: &mut HashSet<String>,
    on_path: &mut HashSet<String>,
    path: &mut Vec<String>,
    result: &mut Vec<String>,
) -> Result<(), PlanError> {
    if on_path.contains(node) {
        let start = path.iter().position(|p| p == node).unwrap_or(0);
        let mut cycle = path[start..].to_vec();
        cycle.push(node.to_string());
        return Err(PlanError::CyclicPackageDependency { cycle });
    }

    if visited.contains(node) || !closure.contains(node) {
        return Ok(());
    }

    on_path.insert(node.to_string());
    path.push(node.to_string());

    if let Some(info) = closure.info(node) {
        for dep in &info.dependencies {
            visit(closure, dep, visited, on_path, path, result)?;
        }
    }

    path.pop();
    on_path.remove(node);
    visited.insert(node.to_string());
    result.push(node.to_string());

    Ok(())
}
