//! Test utilities
//!
//! Proptest generators and in-memory stand-ins for the external tools.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a valid interface package name
    pub fn package_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,20}"
    }

    /// Generate a package DAG and a non-empty set of requested roots
    ///
    /// Package `pkg_i` may only depend on `pkg_j` with `j < i`.
    pub fn package_dag() -> impl Strategy<Value = (Vec<(String, Vec<String>)>, Vec<String>)> {
        (1usize..8).prop_flat_map(|n| {
            let edges = prop::collection::vec(prop::collection::vec(any::<bool>(), n), n);
            let roots = prop::collection::vec(any::<bool>(), n);
            (edges, roots).prop_map(move |(edges, root_flags)| {
                let names: Vec<String> = (0..n).map(|i| format!("pkg_{i}")).collect();
                let graph = (0..n)
                    .map(|i| {
                        let deps = (0..i)
                            .filter(|&j| edges[i][j])
                            .map(|j| names[j].clone())
                            .collect();
                        (names[i].clone(), deps)
                    })
                    .collect();
                let mut roots: Vec<String> = (0..n)
                    .filter(|&i| root_flags[i])
                    .map(|i| names[i].clone())
                    .collect();
                if roots.is_empty() {
                    roots.push(names[n - 1].clone());
                }
                (graph, roots)
            })
        })
    }
}

#[cfg(test)]
pub mod fakes {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};

    use crate::core::artifact::{ArtifactRegistry, MixArtifactId};
    use crate::core::builder::{GenerationRequest, Generator, GeneratorOutput};
    use crate::core::middleware::{ExplicitSources, GenerationMode, Middleware, TemplateSet};
    use crate::core::package::type_name;
    use crate::core::resolver::Introspector;
    use crate::error::{PackageError, ToolError};

    /// Introspector answering from a script, counting calls per package
    #[derive(Debug, Default)]
    pub struct ScriptedIntrospector {
        outputs: HashMap<String, String>,
        calls: RefCell<HashMap<String, usize>>,
    }

    impl ScriptedIntrospector {
        pub fn new() -> Self {
            Self::default()
        }

        /// A package with one message type and the given dependencies
        pub fn package(self, name: &str, deps: &[&str]) -> Self {
            let output = format!(
                "{};/share/{name}/msg/Data.msg;;/share/{name}/package.xml\n",
                deps.join("#")
            );
            self.raw(name, &output)
        }

        /// A package with verbatim tool output
        pub fn raw(mut self, name: &str, output: &str) -> Self {
            self.outputs.insert(name.to_string(), output.to_string());
            self
        }

        pub fn calls(&self, name: &str) -> usize {
            self.calls.borrow().get(name).copied().unwrap_or(0)
        }
    }

    impl Introspector for ScriptedIntrospector {
        fn describe(&self, package: &str) -> Result<String, PackageError> {
            *self
                .calls
                .borrow_mut()
                .entry(package.to_string())
                .or_default() += 1;
            self.outputs
                .get(package)
                .cloned()
                .ok_or_else(|| PackageError::NotFound {
                    name: package.to_string(),
                })
        }
    }

    /// Generator writing one source and header per definition file
    #[derive(Debug, Default)]
    pub struct FakeGenerator {
        warnings: HashMap<String, String>,
        silent: HashSet<String>,
        no_headers: bool,
        calls: RefCell<HashMap<String, usize>>,
    }

    impl FakeGenerator {
        /// Write partial output and complain on stderr for `package`
        pub fn warn_on(mut self, package: &str, message: &str) -> Self {
            self.warnings
                .insert(package.to_string(), message.to_string());
            self
        }

        /// Succeed without writing anything for `package`
        pub fn emit_nothing_for(mut self, package: &str) -> Self {
            self.silent.insert(package.to_string());
            self
        }

        /// Write sources only
        pub fn without_headers(mut self) -> Self {
            self.no_headers = true;
            self
        }

        pub fn calls(&self, package: &str) -> usize {
            self.calls.borrow().get(package).copied().unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.calls.borrow().values().sum()
        }
    }

    fn emit(files: &[PathBuf], kind: &str, request: &GenerationRequest, headers: bool) {
        for file in files {
            let name = type_name(file).unwrap_or_default();
            let dir = request.source_dir.join(kind);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(format!("{name}.cpp")), "// generated").unwrap();
            if !headers {
                continue;
            }
            std::fs::create_dir_all(&request.header_dir).unwrap();
            std::fs::write(request.header_dir.join(format!("{name}.hpp")), "").unwrap();
        }
    }

    impl Generator for FakeGenerator {
        fn generate(&self, request: &GenerationRequest) -> Result<GeneratorOutput, ToolError> {
            *self
                .calls
                .borrow_mut()
                .entry(request.package.clone())
                .or_default() += 1;

            if self.silent.contains(&request.package) {
                return Ok(GeneratorOutput {
                    success: true,
                    ..Default::default()
                });
            }

            emit(&request.message_files, "msg", request, !self.no_headers);
            emit(&request.service_files, "srv", request, !self.no_headers);

            let stderr = self
                .warnings
                .get(&request.package)
                .cloned()
                .unwrap_or_default();
            Ok(GeneratorOutput {
                success: true,
                stdout: String::new(),
                stderr,
            })
        }
    }

    /// Registry with a fixed set of available artifacts
    #[derive(Debug, Default)]
    pub struct StaticRegistry {
        available: HashSet<MixArtifactId>,
    }

    impl StaticRegistry {
        pub fn with(mut self, idl: &str, middleware: &str, package: &str) -> Self {
            self.available
                .insert(MixArtifactId::new(idl, middleware, package));
            self
        }
    }

    impl ArtifactRegistry for StaticRegistry {
        fn is_available(&self, id: &MixArtifactId) -> bool {
            self.available.contains(id)
        }
    }

    /// Template-mode middleware with runtime `is-<name>`
    pub fn template_middleware(name: &str) -> Middleware {
        Middleware {
            name: name.to_string(),
            runtime: format!("is-{name}"),
            mode: GenerationMode::Templates(TemplateSet {
                message_source: PathBuf::from("msg.cpp.em"),
                message_header: PathBuf::from("msg.hpp.em"),
                service_source: PathBuf::from("srv.cpp.em"),
                service_header: PathBuf::from("srv.hpp.em"),
            }),
            descriptor: PathBuf::from(format!("{name}.toml")),
        }
    }

    /// Explicit-source middleware
    pub fn explicit_middleware(name: &str, files: &[&str]) -> Middleware {
        Middleware {
            mode: GenerationMode::Explicit(ExplicitSources {
                files: files.iter().map(PathBuf::from).collect(),
                include_dir: None,
            }),
            ..template_middleware(name)
        }
    }

    /// Write a template-mode extension descriptor for `middleware`
    pub fn write_template_extension(extensions_dir: &Path, idl: &str, middleware: &str) {
        let dir = extensions_dir.join(idl);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(format!("{middleware}.toml")),
            format!(
                "[middleware]\nruntime = \"is-{middleware}\"\n\n[templates]\n\
                 message_source = \"msg.cpp.em\"\nmessage_header = \"msg.hpp.em\"\n\
                 service_source = \"srv.cpp.em\"\nservice_header = \"srv.hpp.em\"\n"
            ),
        )
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_package_dag_only_points_backwards((graph, roots) in package_dag()) {
            prop_assert!(!roots.is_empty());
            for (index, (_, deps)) in graph.iter().enumerate() {
                for dep in deps {
                    let dep_index = graph.iter().position(|(n, _)| n == dep).unwrap();
                    prop_assert!(dep_index < index);
                }
            }
        }
    }
}
