//! Mix artifact building
//!
//! Executes a [`BuildPlan`]: generates sources for each missing artifact,
//! registers its build unit and records installation metadata. A run-scoped
//! registry keyed by artifact identity makes every artifact build at most
//! once, however many times it is reached.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use serde::Serialize;

use crate::config::defaults::{
    APP_NAME, HEADER_EXTENSIONS, MSG_SUBDIR, SOURCE_EXTENSIONS, SRV_SUBDIR,
};
use crate::core::artifact::{ArtifactStatus, MixArtifact, MixArtifactId};
use crate::core::graph::{BuildGraph, BuildUnit, InstallRecord, LinkTarget};
use crate::core::middleware::{GenerationMode, Middleware, TemplateSet};
use crate::core::package::{DefinitionKind, PackageInfo};
use crate::core::planner::BuildPlan;
use crate::core::resolver::{Introspector, PackageInfoResolver};
use crate::error::{BuildError, ToolError};
use crate::infra::filesystem;

/// Arguments of one generator invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Package name
    pub package: String,
    /// Directory generated sources go to
    pub source_dir: PathBuf,
    /// Directory generated headers go to
    pub header_dir: PathBuf,
    /// Message definition files
    pub message_files: Vec<PathBuf>,
    /// Message source and header templates
    pub message_templates: (PathBuf, PathBuf),
    /// Service definition files
    pub service_files: Vec<PathBuf>,
    /// Service source and header templates
    pub service_templates: (PathBuf, PathBuf),
}

/// What the generator reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOutput {
    /// Whether the tool exited successfully
    pub success: bool,
    /// Text written to stdout
    pub stdout: String,
    /// Text written to stderr
    pub stderr: String,
}

impl GeneratorOutput {
    /// Failure message, if the invocation must be treated as failed
    ///
    /// Any text on the error channel is a failure, even with a zero exit.
    pub fn failure(&self) -> Option<String> {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            Some(stderr.to_string())
        } else if !self.success {
            Some("generator exited with an error".to_string())
        } else {
            None
        }
    }
}

/// Code generator collaborator
///
/// Implemented by [`crate::infra::generator::ProcessGenerator`].
pub trait Generator {
    /// Run one generation
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratorOutput, ToolError>;
}

/// A built artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltArtifact {
    /// The artifact, with status [`ArtifactStatus::Built`]
    pub artifact: MixArtifact,
    /// Sources compiled into the artifact
    pub sources: Vec<PathBuf>,
    /// Generated include root, if any headers exist
    pub include_dir: Option<PathBuf>,
    /// Installation metadata
    pub install: InstallRecord,
}

/// Builds the artifacts of build plans
#[derive(Debug)]
pub struct MixArtifactBuilder<G> {
    generator: G,
    build_dir: PathBuf,
    built: HashMap<MixArtifactId, BuiltArtifact>,
    progress: ProgressBar,
}

impl<G: Generator> MixArtifactBuilder<G> {
    /// Create a builder writing generated code under `build_dir`
    pub fn new(generator: G, build_dir: PathBuf) -> Self {
        Self {
            generator,
            build_dir,
            built: HashMap::new(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `bar`
    #[must_use]
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = bar;
        self
    }

    /// The progress bar
    pub fn progress(&self) -> &ProgressBar {
        &self.progress
    }

    /// Build every artifact in `plan` in order
    ///
    /// Artifacts already built in this run are returned as they are. Any
    /// failure aborts the plan.
    pub fn build<I: Introspector>(
        &mut self,
        plan: &BuildPlan,
        middleware: &Middleware,
        resolver: &mut PackageInfoResolver<I>,
        graph: &mut BuildGraph,
    ) -> Result<Vec<BuiltArtifact>, BuildError> {
        let mut results = Vec::with_capacity(plan.artifacts.len());

        for artifact in &plan.artifacts {
            if let Some(existing) = self.built.get(&artifact.id) {
                tracing::debug!("{} already built in this run, skipping", artifact.id);
                results.push(existing.clone());
                continue;
            }

            self.progress.set_message(artifact.id.package.clone());
            let info = resolver.resolve_owned(&artifact.id.package)?;
            let built = self.build_one(artifact, &info, middleware, graph)?;
            self.progress.inc(1);

            tracing::info!("Built {}", artifact.id);
            self.built.insert(artifact.id.clone(), built.clone());
            results.push(built);
        }

        Ok(results)
    }

    /// Whether an artifact was built in this run
    pub fn is_built(&self, id: &MixArtifactId) -> bool {
        self.built.contains_key(id)
    }

    /// All artifacts built in this run, sorted by identity
    pub fn built(&self) -> Vec<&BuiltArtifact> {
        let mut built: Vec<_> = self.built.values().collect();
        built.sort_by(|a, b| a.artifact.id.cmp(&b.artifact.id));
        built
    }

    /// The generator
    pub fn generator(&self) -> &G {
        &self.generator
    }

    fn build_one(
        &self,
        artifact: &MixArtifact,
        info: &PackageInfo,
        middleware: &Middleware,
        graph: &mut BuildGraph,
    ) -> Result<BuiltArtifact, BuildError> {
        let id = &artifact.id;
        let layout = UnitLayout::new(&self.build_dir, id);

        let (sources, include_dir) = match &middleware.mode {
            GenerationMode::Explicit(explicit) => {
                tracing::debug!("{id}: using precompiled sources");
                (explicit.files.clone(), explicit.include_dir.clone())
            }
            GenerationMode::Templates(_) if info.has_no_definitions() => {
                tracing::debug!("{id}: package declares no interfaces, nothing to generate");
                (Vec::new(), None)
            }
            GenerationMode::Templates(templates) => {
                self.generate(id, info, templates, &layout)?;
                let sources = collect_sources(&layout.source_dir)?;
                if sources.is_empty() {
                    return Err(BuildError::NoGeneratedSources {
                        artifact: id.artifact_name(),
                    });
                }
                let headers = filesystem::collect_files(&layout.include_root, HEADER_EXTENSIONS)?;
                let include = (!headers.is_empty()).then(|| layout.include_root.clone());
                (sources, include)
            }
        };

        let mut links = vec![LinkTarget::Runtime(middleware.runtime.clone())];
        links.extend(
            info.dependencies
                .iter()
                .map(|dep| LinkTarget::Artifact(id.sibling(dep).artifact_name())),
        );
        links.push(LinkTarget::Native(id.package.clone()));

        let install = install_record(id, info, include_dir.is_some());
        graph.add_unit(BuildUnit {
            name: id.artifact_name(),
            artifact: id.clone(),
            sources: sources.clone(),
            include_dirs: include_dir.iter().cloned().collect(),
            links,
            file_deps: info.file_deps.clone(),
            install: install.clone(),
        })?;

        Ok(BuiltArtifact {
            artifact: MixArtifact {
                status: ArtifactStatus::Built,
                ..artifact.clone()
            },
            sources,
            include_dir,
            install,
        })
    }

    fn generate(
        &self,
        id: &MixArtifactId,
        info: &PackageInfo,
        templates: &TemplateSet,
        layout: &UnitLayout,
    ) -> Result<(), BuildError> {
        // Stale output from an earlier run must not be picked up
        filesystem::remove_dir_all(&layout.root)?;
        filesystem::create_dir_all(&layout.source_dir)?;
        filesystem::create_dir_all(&layout.header_dir)?;

        let (msg_src, msg_hdr) = templates.for_kind(DefinitionKind::Msg);
        let (srv_src, srv_hdr) = templates.for_kind(DefinitionKind::Srv);
        let request = GenerationRequest {
            package: id.package.clone(),
            source_dir: layout.source_dir.clone(),
            header_dir: layout.header_dir.clone(),
            message_files: info.message_files.clone(),
            message_templates: (msg_src.to_path_buf(), msg_hdr.to_path_buf()),
            service_files: info.service_files.clone(),
            service_templates: (srv_src.to_path_buf(), srv_hdr.to_path_buf()),
        };

        tracing::debug!("Generating {id} into {}", layout.root.display());
        let output = self.generator.generate(&request)?;

        if let Some(message) = output.failure() {
            // Partial output of a failed generation is discarded
            if let Err(e) = filesystem::remove_dir_all(&layout.root) {
                tracing::warn!("Failed to discard partial output of {id}: {e}");
            }
            return Err(BuildError::GenerationFailed {
                artifact: id.artifact_name(),
                message,
            });
        }

        if !output.stdout.trim().is_empty() {
            tracing::debug!("{id} generator output: {}", output.stdout.trim());
        }

        Ok(())
    }
}

/// Directory layout of one artifact's generated code
#[derive(Debug, Clone)]
pub struct UnitLayout {
    /// Root of the artifact's build directory
    pub root: PathBuf,
    /// Generated sources
    pub source_dir: PathBuf,
    /// Include root added to the unit's include path
    pub include_root: PathBuf,
    /// Generated headers, namespaced by IDL, middleware and package
    pub header_dir: PathBuf,
}

impl UnitLayout {
    /// Layout for `id` under `build_dir`
    pub fn new(build_dir: &Path, id: &MixArtifactId) -> Self {
        let root = build_dir.join(&id.idl).join(&id.middleware).join(&id.package);
        let include_root = root.join("include");
        Self {
            source_dir: root.join("src"),
            header_dir: include_root
                .join(&id.idl)
                .join(&id.middleware)
                .join(&id.package),
            include_root,
            root,
        }
    }
}

/// Collect generated sources under `<source_dir>/msg` and `<source_dir>/srv`
pub fn collect_sources(source_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut sources = Vec::new();
    for sub in [MSG_SUBDIR, SRV_SUBDIR] {
        sources.extend(filesystem::collect_files(
            &source_dir.join(sub),
            SOURCE_EXTENSIONS,
        )?);
    }
    Ok(sources)
}

/// Installation metadata for a built artifact
pub fn install_record(id: &MixArtifactId, info: &PackageInfo, has_headers: bool) -> InstallRecord {
    let manifest_entries = info
        .type_names()
        .into_iter()
        .map(|(kind, type_name)| manifest_entry(id, kind, &type_name))
        .collect();

    InstallRecord {
        library: PathBuf::from("lib").join(id.artifact_name()),
        headers: has_headers.then(|| PathBuf::from("include")),
        manifest_entries,
    }
}

/// Manifest entry path for one type, relative to the install prefix
///
/// `share/mixbridge/<idl>/<middleware>/<msg|srv>/<package>/<Type>`
pub fn manifest_entry(id: &MixArtifactId, kind: DefinitionKind, type_name: &str) -> PathBuf {
    PathBuf::from("share")
        .join(APP_NAME)
        .join(&id.idl)
        .join(&id.middleware)
        .join(kind.dir_name())
        .join(&id.package)
        .join(type_name)
}
