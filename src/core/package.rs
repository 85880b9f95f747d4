//! Interface package metadata
//!
//! Decodes the four-field line printed by the introspection tool into a
//! [`PackageInfo`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::defaults::{FIELD_SEPARATOR, INTROSPECTION_FIELDS, ITEM_SEPARATOR};
use crate::error::PackageError;

/// Kind of interface definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    /// Message type
    Msg,
    /// Service type
    Srv,
}

impl DefinitionKind {
    /// Directory name used for this kind in generated and installed trees
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Msg => "msg",
            Self::Srv => "srv",
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Resolved information about one interface package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    /// Direct dependency names, in the order the tool reported them
    pub dependencies: Vec<String>,
    /// Message definition files
    pub message_files: Vec<PathBuf>,
    /// Service definition files
    pub service_files: Vec<PathBuf>,
    /// Other files the package's generated code depends on
    pub file_deps: Vec<PathBuf>,
}

impl PackageInfo {
    /// Decode the introspection tool's output for `package`
    ///
    /// The output must contain exactly four `;`-separated fields. Items inside
    /// a field are separated by `#`; empty items are ignored.
    pub fn decode(package: &str, output: &str) -> Result<Self, PackageError> {
        let line = output.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

        if fields.len() != INTROSPECTION_FIELDS {
            return Err(PackageError::Malformed {
                name: package.to_string(),
                fields: fields.len(),
            });
        }

        Ok(Self {
            dependencies: split_items(fields[0]).map(String::from).collect(),
            message_files: split_items(fields[1]).map(PathBuf::from).collect(),
            service_files: split_items(fields[2]).map(PathBuf::from).collect(),
            file_deps: split_items(fields[3]).map(PathBuf::from).collect(),
        })
    }

    /// Definition files of one kind
    pub fn definitions(&self, kind: DefinitionKind) -> &[PathBuf] {
        match kind {
            DefinitionKind::Msg => &self.message_files,
            DefinitionKind::Srv => &self.service_files,
        }
    }

    /// Type names declared by the package, as `(kind, name)` pairs
    pub fn type_names(&self) -> Vec<(DefinitionKind, String)> {
        let mut types = Vec::new();
        for kind in [DefinitionKind::Msg, DefinitionKind::Srv] {
            for file in self.definitions(kind) {
                if let Some(name) = type_name(file) {
                    types.push((kind, name));
                }
            }
        }
        types
    }

    /// Whether the package declares no interfaces at all
    pub fn has_no_definitions(&self) -> bool {
        self.message_files.is_empty() && self.service_files.is_empty()
    }
}

/// Type name of a definition file (its stem)
pub fn type_name(file: &Path) -> Option<String> {
    file.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn split_items(field: &str) -> impl Iterator<Item = &str> {
    field
        .split(ITEM_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}
