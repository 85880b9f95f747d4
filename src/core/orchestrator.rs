//! Run orchestration
//!
//! Ties the pieces together: selects middlewares, builds the dependency
//! closure, then plans and builds each middleware in turn. Runs are
//! single-threaded; each middleware's plan completes before the next starts.
//!
//! The resolver cache, the builder's artifact registry and the build graph
//! live as long as the orchestrator, so repeated runs never resolve, build
//! or register anything twice.

use std::path::PathBuf;

use crate::core::artifact::ArtifactRegistry;
use crate::core::builder::{BuiltArtifact, Generator, MixArtifactBuilder};
use crate::core::closure::DependencyClosure;
use crate::core::graph::BuildGraph;
use crate::core::middleware::{self, Middleware};
use crate::core::planner::{self, BuildPlan};
use crate::core::report::{Diagnostic, MiddlewareReport, RunReport};
use crate::core::request::MixRequest;
use crate::core::resolver::{Introspector, PackageInfoResolver};
use crate::error::MixError;

/// Middlewares and closure a request resolves to
#[derive(Debug)]
pub struct Preparation {
    /// Middlewares that will be targeted
    pub middlewares: Vec<Middleware>,
    /// Dependency closure of the requested packages
    pub closure: DependencyClosure,
    /// Recoverable problems found while preparing
    pub diagnostics: Vec<Diagnostic>,
}

/// Orchestrates mix artifact runs
#[derive(Debug)]
pub struct Orchestrator<I, G, R> {
    resolver: PackageInfoResolver<I>,
    builder: MixArtifactBuilder<G>,
    registry: R,
    extensions_dir: PathBuf,
    graph: BuildGraph,
}

impl<I, G, R> Orchestrator<I, G, R>
where
    I: Introspector,
    G: Generator,
    R: ArtifactRegistry,
{
    /// Create an orchestrator
    ///
    /// Extension descriptors are read from `extensions_dir` and generated
    /// code is written under `build_dir`.
    pub fn new(
        introspector: I,
        generator: G,
        registry: R,
        extensions_dir: PathBuf,
        build_dir: PathBuf,
    ) -> Self {
        Self {
            resolver: PackageInfoResolver::new(introspector),
            builder: MixArtifactBuilder::new(generator, build_dir),
            registry,
            extensions_dir,
            graph: BuildGraph::new(),
        }
    }

    /// Report build progress on `bar`
    #[must_use]
    pub fn with_progress(mut self, bar: indicatif::ProgressBar) -> Self {
        self.builder = self.builder.with_progress(bar);
        self
    }

    /// Select middlewares and compute the closure
    ///
    /// In strict mode any recoverable problem fails the run here, before
    /// anything is generated.
    pub fn prepare(&mut self, request: &MixRequest) -> Result<Preparation, MixError> {
        request.validate()?;

        let selection = middleware::select(&self.extensions_dir, &request.idl, &request.middlewares);
        let closure = DependencyClosure::build(&request.packages, &mut self.resolver);

        let diagnostics: Vec<Diagnostic> = selection
            .dropped
            .iter()
            .map(Diagnostic::from_middleware)
            .chain(closure.exclusions().iter().map(Diagnostic::from_exclusion))
            .collect();

        if request.strict && !diagnostics.is_empty() {
            return Err(MixError::Strict {
                problems: diagnostics.iter().map(ToString::to_string).collect(),
            });
        }

        Ok(Preparation {
            middlewares: selection.selected,
            closure,
            diagnostics,
        })
    }

    /// Compute every middleware's build plan without building anything
    pub fn plan(&mut self, request: &MixRequest) -> Result<(Preparation, Vec<BuildPlan>), MixError> {
        let preparation = self.prepare(request)?;
        let plans = preparation
            .middlewares
            .iter()
            .map(|mw| planner::plan(&preparation.closure, &request.idl, &mw.name, &self.registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((preparation, plans))
    }

    /// Run the full orchestration
    ///
    /// Fatal errors abort immediately; nothing built in an aborted run is
    /// reported as available.
    pub fn run(&mut self, request: &MixRequest) -> Result<RunReport, MixError> {
        let preparation = self.prepare(request)?;

        tracing::info!(
            "Building {} package(s) for {} middleware(s)",
            preparation.closure.len(),
            preparation.middlewares.len()
        );

        let mut report = RunReport {
            idl: request.idl.clone(),
            diagnostics: preparation.diagnostics,
            ..RunReport::default()
        };

        for mw in &preparation.middlewares {
            let plan = planner::plan(&preparation.closure, &request.idl, &mw.name, &self.registry)?;

            for artifact in &plan.satisfied {
                self.graph.import(&artifact.id);
            }
            self.builder
                .progress()
                .inc_length(plan.artifacts.len() as u64);

            let built = self
                .builder
                .build(&plan, mw, &mut self.resolver, &mut self.graph)?;

            report.middlewares.push(MiddlewareReport {
                middleware: mw.name.clone(),
                built: built
                    .iter()
                    .map(|b| b.artifact.id.artifact_name())
                    .collect(),
                available: plan
                    .satisfied
                    .iter()
                    .map(|a| a.id.artifact_name())
                    .collect(),
            });
        }

        self.builder.progress().finish_and_clear();
        Ok(report)
    }

    /// Build graph accumulated so far
    pub fn graph(&self) -> &BuildGraph {
        &self.graph
    }

    /// Artifacts built so far
    pub fn built_artifacts(&self) -> Vec<&BuiltArtifact> {
        self.builder.built()
    }

    /// The package info resolver
    pub fn resolver(&self) -> &PackageInfoResolver<I> {
        &self.resolver
    }

    /// The code generator
    pub fn generator(&self) -> &G {
        self.builder.generator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, PlanError};
    use crate::test_utils::fakes::{
        write_template_extension, FakeGenerator, ScriptedIntrospector, StaticRegistry,
    };
    use tempfile::TempDir;

    struct Workspace {
        extensions: TempDir,
        build: TempDir,
    }

    impl Workspace {
        fn new(middlewares: &[&str]) -> Self {
            let extensions = TempDir::new().unwrap();
            for mw in middlewares {
                write_template_extension(extensions.path(), "rosidl", mw);
            }
            Self {
                extensions,
                build: TempDir::new().unwrap(),
            }
        }

        fn orchestrator(
            &self,
            introspector: ScriptedIntrospector,
            generator: FakeGenerator,
            registry: StaticRegistry,
        ) -> Orchestrator<ScriptedIntrospector, FakeGenerator, StaticRegistry> {
            Orchestrator::new(
                introspector,
                generator,
                registry,
                self.extensions.path().to_path_buf(),
                self.build.path().to_path_buf(),
            )
        }
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn nav_introspector() -> ScriptedIntrospector {
        ScriptedIntrospector::new()
            .package("nav_msgs", &["std_msgs", "geometry_msgs"])
            .package("geometry_msgs", &["std_msgs"])
            .package("std_msgs", &[])
    }

    #[test]
    fn test_nav_msgs_scenario() {
        let ws = Workspace::new(&["ros2", "websocket"]);
        let registry = StaticRegistry::default()
            .with("rosidl", "ros2", "std_msgs")
            .with("rosidl", "ros2", "geometry_msgs")
            .with("rosidl", "ros2", "nav_msgs");
        let mut orchestrator = ws.orchestrator(nav_introspector(), FakeGenerator::default(), registry);
        let request = MixRequest::new("rosidl", strings(&["nav_msgs"]), strings(&["ros2", "websocket"]));

        let report = orchestrator.run(&request).unwrap();

        let ros2 = &report.middlewares[0];
        assert!(ros2.built.is_empty());
        assert_eq!(ros2.available.len(), 3);

        let websocket = &report.middlewares[1];
        let nav = websocket
            .built
            .iter()
            .position(|a| a == "rosidl-websocket-nav_msgs-mix")
            .unwrap();
        let std = websocket
            .built
            .iter()
            .position(|a| a == "rosidl-websocket-std_msgs-mix")
            .unwrap();
        let geo = websocket
            .built
            .iter()
            .position(|a| a == "rosidl-websocket-geometry_msgs-mix")
            .unwrap();
        assert!(std < nav && geo < nav);
        assert_eq!(orchestrator.graph().unit_count(), 3);
    }

    #[test]
    fn test_units_link_against_imported_artifacts() {
        let ws = Workspace::new(&["ros2"]);
        let registry = StaticRegistry::default().with("rosidl", "ros2", "std_msgs");
        let mut orchestrator = ws.orchestrator(nav_introspector(), FakeGenerator::default(), registry);
        let request = MixRequest::new("rosidl", strings(&["nav_msgs"]), strings(&["ros2"]));

        let report = orchestrator.run(&request).unwrap();

        assert_eq!(report.built_count(), 2);
        assert!(orchestrator.graph().provides("rosidl-ros2-std_msgs-mix"));
    }

    #[test]
    fn test_repeated_run_builds_nothing_new() {
        let ws = Workspace::new(&["websocket"]);
        let mut orchestrator =
            ws.orchestrator(nav_introspector(), FakeGenerator::default(), StaticRegistry::default());
        let request = MixRequest::new("rosidl", strings(&["nav_msgs"]), strings(&["websocket"]));

        orchestrator.run(&request).unwrap();
        orchestrator.run(&request).unwrap();

        assert_eq!(orchestrator.generator().total_calls(), 3);
        assert_eq!(orchestrator.resolver().introspector().calls("std_msgs"), 1);
        assert_eq!(orchestrator.graph().unit_count(), 3);
    }

    #[test]
    fn test_missing_middleware_is_dropped() {
        let ws = Workspace::new(&["websocket"]);
        let mut orchestrator =
            ws.orchestrator(nav_introspector(), FakeGenerator::default(), StaticRegistry::default());
        let request =
            MixRequest::new("rosidl", strings(&["std_msgs"]), strings(&["dds", "websocket"]));

        let report = orchestrator.run(&request).unwrap();

        assert_eq!(report.middlewares.len(), 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].subject, "dds");
    }

    #[test]
    fn test_dot_dependency_leaves_other_output_in_place() {
        let ws = Workspace::new(&["websocket"]);
        let introspector = ScriptedIntrospector::new()
            .package("app_msgs", &["std_msgs", "."])
            .package("std_msgs", &[]);
        let mut orchestrator =
            ws.orchestrator(introspector, FakeGenerator::default(), StaticRegistry::default());
        let request = MixRequest::new(
            "rosidl",
            strings(&["app_msgs", "std_msgs"]),
            strings(&["websocket"]),
        );

        let report = orchestrator.run(&request).unwrap();

        assert_eq!(report.middlewares[0].built, strings(&["rosidl-websocket-std_msgs-mix"]));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].subject, ".");
        assert_eq!(report.diagnostics[0].affected, strings(&["app_msgs"]));
        assert!(ws
            .build
            .path()
            .join("rosidl/websocket/std_msgs/src/msg/Data.cpp")
            .is_file());
    }

    #[test]
    fn test_strict_run_fails_before_generation() {
        let ws = Workspace::new(&["websocket"]);
        let introspector = ScriptedIntrospector::new()
            .package("a_msgs", &["b_msgs"])
            .package("b_msgs", &["c_msgs"])
            .package("ok_msgs", &[]);
        let mut orchestrator =
            ws.orchestrator(introspector, FakeGenerator::default(), StaticRegistry::default());
        let request = MixRequest::new("rosidl", strings(&["a_msgs", "ok_msgs"]), strings(&["websocket"]))
            .strict(true);

        let err = orchestrator.run(&request).unwrap_err();

        let MixError::Strict { problems } = err else {
            panic!("expected strict failure");
        };
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("b_msgs, a_msgs"));
        assert_eq!(orchestrator.generator().total_calls(), 0);
    }

    #[test]
    fn test_non_strict_run_continues_with_reduced_closure() {
        let ws = Workspace::new(&["websocket"]);
        let introspector = ScriptedIntrospector::new()
            .package("a_msgs", &["b_msgs"])
            .package("b_msgs", &["c_msgs"])
            .package("ok_msgs", &[]);
        let mut orchestrator =
            ws.orchestrator(introspector, FakeGenerator::default(), StaticRegistry::default());
        let request = MixRequest::new("rosidl", strings(&["a_msgs", "ok_msgs"]), strings(&["websocket"]));

        let report = orchestrator.run(&request).unwrap();

        assert_eq!(report.middlewares[0].built, vec!["rosidl-websocket-ok_msgs-mix"]);
        assert_eq!(report.diagnostics[0].affected, vec!["b_msgs", "a_msgs"]);
    }

    #[test]
    fn test_cycle_aborts_without_building() {
        let ws = Workspace::new(&["websocket"]);
        let introspector = ScriptedIntrospector::new()
            .package("x_msgs", &["y_msgs"])
            .package("y_msgs", &["x_msgs"]);
        let mut orchestrator =
            ws.orchestrator(introspector, FakeGenerator::default(), StaticRegistry::default());
        let request = MixRequest::new("rosidl", strings(&["x_msgs"]), strings(&["websocket"]));

        let err = orchestrator.run(&request).unwrap_err();

        assert!(matches!(
            err,
            MixError::Plan(PlanError::CyclicPackageDependency { .. })
        ));
        assert_eq!(orchestrator.generator().total_calls(), 0);
    }

    #[test]
    fn test_generation_failure_aborts_run() {
        let ws = Workspace::new(&["websocket"]);
        let generator = FakeGenerator::default().warn_on("geometry_msgs", "bad template");
        let mut orchestrator =
            ws.orchestrator(nav_introspector(), generator, StaticRegistry::default());
        let request = MixRequest::new("rosidl", strings(&["nav_msgs"]), strings(&["websocket"]));

        let err = orchestrator.run(&request).unwrap_err();

        assert!(matches!(err, MixError::Build(BuildError::GenerationFailed { .. })));
        assert_eq!(orchestrator.generator().calls("nav_msgs"), 0);
    }

    #[test]
    fn test_plan_only_does_not_generate() {
        let ws = Workspace::new(&["websocket"]);
        let mut orchestrator =
            ws.orchestrator(nav_introspector(), FakeGenerator::default(), StaticRegistry::default());
        let request = MixRequest::new("rosidl", strings(&["nav_msgs"]), strings(&["websocket"]));

        let (preparation, plans) = orchestrator.plan(&request).unwrap();

        assert_eq!(preparation.closure.len(), 3);
        assert_eq!(plans[0].artifacts.len(), 3);
        assert_eq!(orchestrator.generator().total_calls(), 0);
    }
}
