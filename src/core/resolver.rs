//! Package info resolution
//!
//! Queries the introspection tool for a package's direct dependencies and
//! definition files. Results, including failures, are memoized for the
//! lifetime of the resolver so the tool runs at most once per package.

use std::collections::HashMap;

use crate::core::package::PackageInfo;
use crate::error::PackageError;

/// Source of raw package descriptions
///
/// Implemented by [`crate::infra::introspect::ProcessIntrospector`] for the
/// real tool; tests substitute scripted fakes.
pub trait Introspector {
    /// Return the tool's raw output for `package`
    ///
    /// Fails with [`PackageError::NotFound`] when the package is unknown.
    fn describe(&self, package: &str) -> Result<String, PackageError>;
}

/// Memoizing package info resolver
#[derive(Debug)]
pub struct PackageInfoResolver<I> {
    introspector: I,
    cache: HashMap<String, Result<PackageInfo, PackageError>>,
}

impl<I: Introspector> PackageInfoResolver<I> {
    /// Create a resolver backed by `introspector`
    pub fn new(introspector: I) -> Self {
        Self {
            introspector,
            cache: HashMap::new(),
        }
    }

    /// Resolve one package
    pub fn resolve(&mut self, package: &str) -> Result<&PackageInfo, PackageError> {
        if !self.cache.contains_key(package) {
            let result = self
                .introspector
                .describe(package)
                .and_then(|output| PackageInfo::decode(package, &output));

            match &result {
                Ok(info) => tracing::debug!(
                    "Resolved {package}: {} deps, {} msgs, {} srvs",
                    info.dependencies.len(),
                    info.message_files.len(),
                    info.service_files.len()
                ),
                Err(e) => tracing::debug!("Failed to resolve {package}: {e}"),
            }

            self.cache.insert(package.to_string(), result);
        }

        match &self.cache[package] {
            Ok(info) => Ok(info),
            Err(e) => Err(e.clone()),
        }
    }

    /// Resolve one package, returning an owned copy
    pub fn resolve_owned(&mut self, package: &str) -> Result<PackageInfo, PackageError> {
        self.resolve(package).cloned()
    }

    /// Number of distinct packages resolved so far
    pub fn resolved_count(&self) -> usize {
        self.cache.len()
    }

    /// The underlying introspector
    pub fn introspector(&self) -> &I {
        &self.introspector
    }
}
