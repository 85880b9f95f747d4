//! Common test utilities and helpers
//!
//! Scripted stand-ins for the introspection tool and generator, plus a
//! temporary workspace with extensions, build and install directories.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use mixbridge::core::builder::{GenerationRequest, Generator, GeneratorOutput};
use mixbridge::core::package::type_name;
use mixbridge::core::resolver::Introspector;
use mixbridge::error::{PackageError, ToolError};
use tempfile::TempDir;

/// Temporary workspace for a test
pub struct TestProject {
    /// Temporary directory holding everything
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new workspace in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Root of the workspace
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.dir.path().join("extensions")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.dir.path().join("build")
    }

    pub fn install_prefix(&self) -> PathBuf {
        self.dir.path().join("install")
    }

    /// Create a file in the workspace
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Check if a file exists in the workspace
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the workspace
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Register a template-mode middleware for `idl`
    pub fn add_middleware(&self, idl: &str, middleware: &str) {
        self.create_file(
            &format!("extensions/{idl}/{middleware}.toml"),
            &format!(
                r#"[middleware]
runtime = "is-{middleware}"

[templates]
message_source = "templates/msg.cpp.em"
message_header = "templates/msg.hpp.em"
service_source = "templates/srv.cpp.em"
service_header = "templates/srv.hpp.em"
"#
            ),
        );
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Introspection tool answering from a table
#[derive(Debug, Default)]
pub struct TableIntrospector {
    outputs: HashMap<String, String>,
    calls: RefCell<usize>,
}

impl TableIntrospector {
    /// Add a package with the given message types and dependencies
    pub fn package(mut self, name: &str, types: &[&str], deps: &[&str]) -> Self {
        let messages: Vec<String> = types
            .iter()
            .map(|t| format!("/opt/share/{name}/msg/{t}.msg"))
            .collect();
        self.outputs.insert(
            name.to_string(),
            format!(
                "{};{};;/opt/share/{name}/package.xml\n",
                deps.join("#"),
                messages.join("#")
            ),
        );
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.borrow()
    }
}

impl Introspector for TableIntrospector {
    fn describe(&self, package: &str) -> Result<String, PackageError> {
        *self.calls.borrow_mut() += 1;
        self.outputs
            .get(package)
            .cloned()
            .ok_or_else(|| PackageError::NotFound {
                name: package.to_string(),
            })
    }
}

/// Generator writing a source and header per message type
#[derive(Debug, Default)]
pub struct WritingGenerator {
    generated: RefCell<Vec<String>>,
}

impl WritingGenerator {
    /// Packages generated, in call order
    pub fn generated(&self) -> Vec<String> {
        self.generated.borrow().clone()
    }
}

impl Generator for WritingGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratorOutput, ToolError> {
        self.generated.borrow_mut().push(request.package.clone());
        let msg_dir = request.source_dir.join("msg");
        std::fs::create_dir_all(&msg_dir).expect("Failed to create source dir");
        std::fs::create_dir_all(&request.header_dir).expect("Failed to create header dir");
        for file in &request.message_files {
            let name = type_name(file).expect("definition file without a name");
            std::fs::write(msg_dir.join(format!("{name}.cpp")), "// generated")
                .expect("Failed to write source");
            std::fs::write(request.header_dir.join(format!("{name}.hpp")), "#pragma once")
                .expect("Failed to write header");
        }
        Ok(GeneratorOutput {
            success: true,
            ..Default::default()
        })
    }
}

/// The introspection table for a small ROS-like interface set
pub fn nav_packages() -> TableIntrospector {
    TableIntrospector::default()
        .package("std_msgs", &["Header", "String"], &[])
        .package("geometry_msgs", &["Pose", "Twist"], &["std_msgs"])
        .package("nav_msgs", &["Odometry"], &["std_msgs", "geometry_msgs"])
}

/// Write an executable shell script
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create script dir");
    }
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
}

/// Run the mixbridge binary with directories isolated inside `project`
pub fn run_mixbridge(project: &TestProject, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mixbridge"))
        .current_dir(project.path())
        .env("MIXBRIDGE_CACHE_DIR", project.path().join("cache"))
        .env("MIXBRIDGE_CONFIG_DIR", project.path().join("config"))
        .env("MIXBRIDGE_DATA_DIR", project.path().join("data"))
        .env_remove("MIXBRIDGE_PREFIX_PATH")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute mixbridge")
}
