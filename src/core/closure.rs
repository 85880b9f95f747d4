//! Dependency closure
//!
//! Computes every package transitively required by the requested roots and
//! records who requires each one. Packages that fail to resolve are excised
//! together with everything that required them.

use std::collections::{HashMap, VecDeque};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::core::package::PackageInfo;
use crate::core::request::is_valid_package_name;
use crate::core::resolver::{Introspector, PackageInfoResolver};
use crate::error::PackageError;

/// Something that needs a package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum Requester {
    /// The package was requested directly
    User,
    /// The package is a dependency of another package
    Package(String),
}

impl std::fmt::Display for Requester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "<user>"),
            Self::Package(name) => write!(f, "{name}"),
        }
    }
}

/// A package removed from the closure because it could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    /// The package that failed
    pub package: String,
    /// Why it failed
    #[serde(serialize_with = "serialize_display")]
    pub error: PackageError,
    /// Packages removed because they (transitively) required it
    pub affected: Vec<String>,
    /// Whether a directly requested package was lost
    pub user_requested: bool,
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if !self.affected.is_empty() {
            write!(f, "; dropping requesters: {}", self.affected.join(", "))?;
        }
        Ok(())
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &PackageError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Transitive dependency set of the requested packages
#[derive(Debug, Clone, Default)]
pub struct DependencyClosure {
    /// Packages in first-seen order
    order: Vec<String>,
    /// Resolved info for each package in the closure
    packages: HashMap<String, PackageInfo>,
    /// Requesters of each package in the closure
    requesters: IndexMap<String, IndexSet<Requester>>,
    /// Packages dropped during the build
    exclusions: Vec<Exclusion>,
}

impl DependencyClosure {
    /// Build the closure of `requested` by breadth-first traversal
    pub fn build<I: Introspector>(
        requested: &[String],
        resolver: &mut PackageInfoResolver<I>,
    ) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut packages = HashMap::new();
        let mut requesters: IndexMap<String, IndexSet<Requester>> = IndexMap::new();
        let mut failures: Vec<PackageError> = Vec::new();
        let mut queue = VecDeque::new();

        for root in requested {
            let entry = requesters.entry(root.clone()).or_default();
            entry.insert(Requester::User);
            if !order.contains(root) {
                order.push(root.clone());
                queue.push_back(root.clone());
            }
        }

        while let Some(name) = queue.pop_front() {
            // Names end up as path components, so bad ones never reach the tool
            if !is_valid_package_name(&name) {
                tracing::debug!("Rejecting invalid package name '{name}'");
                failures.push(PackageError::InvalidName { name });
                continue;
            }

            let info = match resolver.resolve_owned(&name) {
                Ok(info) => info,
                Err(e) => {
                    tracing::debug!("{e}");
                    failures.push(e);
                    continue;
                }
            };

            for dep in &info.dependencies {
                let is_new = !requesters.contains_key(dep);
                requesters
                    .entry(dep.clone())
                    .or_default()
                    .insert(Requester::Package(name.clone()));
                if is_new {
                    order.push(dep.clone());
                    queue.push_back(dep.clone());
                }
            }

            packages.insert(name, info);
        }

        let mut closure = Self {
            order,
            packages,
            requesters,
            exclusions: Vec::new(),
        };

        for error in failures {
            closure.exclude(error);
        }

        closure
            .order
            .retain(|name| closure.requesters.contains_key(name));

        tracing::info!(
            "Dependency closure: {} packages, {} excluded",
            closure.order.len(),
            closure.exclusions.len()
        );

        closure
    }

    /// Remove a failed package and cascade the removal
    ///
    /// Requesters of a removed package are removed (they cannot be built),
    /// and dependencies left with no requester are removed as orphans. A
    /// package already pruned by an earlier cascade is still recorded, with
    /// nothing affected.
    fn exclude(&mut self, error: PackageError) {
        let failed = error.package().to_string();

        let mut affected = Vec::new();
        let mut user_requested = false;
        let mut pending = VecDeque::from([(failed.clone(), true)]);

        while let Some((name, upward)) = pending.pop_front() {
            let Some(reqs) = self.requesters.shift_remove(&name) else {
                continue;
            };

            if upward && name != failed {
                affected.push(name.clone());
            }

            for requester in reqs {
                match requester {
                    Requester::User if upward => user_requested = true,
                    Requester::User => {}
                    Requester::Package(parent) => pending.push_back((parent, upward)),
                }
            }

            if let Some(info) = self.packages.remove(&name) {
                let me = Requester::Package(name.clone());
                for dep in &info.dependencies {
                    if let Some(set) = self.requesters.get_mut(dep) {
                        set.shift_remove(&me);
                        if set.is_empty() {
                            pending.push_back((dep.clone(), false));
                        }
                    }
                }
            }
        }

        self.exclusions.push(Exclusion {
            package: failed,
            error,
            affected,
            user_requested,
        });
    }

    /// Packages in the closure, in first-seen order
    pub fn packages(&self) -> &[String] {
        &self.order
    }

    /// Resolved info of a package in the closure
    pub fn info(&self, package: &str) -> Option<&PackageInfo> {
        self.packages.get(package)
    }

    /// Requesters of a package in the closure
    pub fn requesters(&self, package: &str) -> Option<&IndexSet<Requester>> {
        self.requesters.get(package)
    }

    /// Whether a package is in the closure
    pub fn contains(&self, package: &str) -> bool {
        self.requesters.contains_key(package)
    }

    /// Packages dropped while building the closure
    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    /// Number of packages in the closure
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the closure is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
