//! Mix artifact identities
//!
//! A mix artifact is the bridge unit for one (IDL kind, middleware, package)
//! triple. The triple is the idempotence key: a run holds at most one
//! artifact per identity.

use serde::Serialize;

use crate::config::defaults::ARTIFACT_SUFFIX;

/// Identity of a mix artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MixArtifactId {
    /// IDL kind
    pub idl: String,
    /// Middleware name
    pub middleware: String,
    /// Package name
    pub package: String,
}

impl MixArtifactId {
    /// Create an identity
    pub fn new(idl: &str, middleware: &str, package: &str) -> Self {
        Self {
            idl: idl.to_string(),
            middleware: middleware.to_string(),
            package: package.to_string(),
        }
    }

    /// Conventional artifact name: `<idl>-<middleware>-<package>-mix`
    pub fn artifact_name(&self) -> String {
        format!(
            "{}-{}-{}-{ARTIFACT_SUFFIX}",
            self.idl, self.middleware, self.package
        )
    }

    /// Identity of another package's artifact for the same IDL and middleware
    pub fn sibling(&self, package: &str) -> Self {
        Self::new(&self.idl, &self.middleware, package)
    }
}

impl std::fmt::Display for MixArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.artifact_name())
    }
}

/// Build status of a mix artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactStatus {
    /// A prebuilt artifact exists outside this run
    AvailableExternally,
    /// Planned for generation in this run
    ToBeGenerated,
    /// Generated, registered and linked in this run
    Built,
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AvailableExternally => write!(f, "available"),
            Self::ToBeGenerated => write!(f, "to be generated"),
            Self::Built => write!(f, "built"),
        }
    }
}

/// A mix artifact in a build plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixArtifact {
    /// Identity triple
    pub id: MixArtifactId,
    /// Current status
    pub status: ArtifactStatus,
    /// Same-middleware artifacts this one links against
    pub depends_on: Vec<MixArtifactId>,
}

/// Lookup of prebuilt artifacts
///
/// Implemented by [`crate::registry::PrefixRegistry`] for install prefixes.
pub trait ArtifactRegistry {
    /// Whether a prebuilt artifact with this identity is available
    fn is_available(&self, id: &MixArtifactId) -> bool;
}

impl<R: ArtifactRegistry + ?Sized> ArtifactRegistry for &R {
    fn is_available(&self, id: &MixArtifactId) -> bool {
        (**self).is_available(id)
    }
}
