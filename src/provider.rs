//! The provider contract and the local path/dev variant
//!
//! A provider is the swappable half of a descriptor: it knows where one
//! version of one bundle comes from and how to bring it into the cache. The
//! resolution core depends on providers purely behaviorally: it never
//! inspects transport details, and a provider's errors surface unmodified.

use crate::cache::{bundle_cache_paths, CacheRoots};
use crate::identity::Identity;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Deprecation information for a bundle version
#[derive(Debug, Clone, Default)]
pub struct DeprecationStatus {
    pub is_deprecated: bool,
    pub message: Option<String>,
}

/// Changelog information for a bundle version
#[derive(Debug, Clone, Default)]
pub struct Changelog {
    pub summary: Option<String>,
    pub url: Option<String>,
}

/// The capability set a bundle source must implement
///
/// One provider instance is pinned to a single (bundle, version) pair.
/// `materialize` must be idempotent and all-or-nothing: the bundle's
/// metadata file becomes visible only once the full payload is in place,
/// or never on failure.
pub trait Provider: Send + Sync {
    /// Descriptor type string; keys the cache directory layout
    fn kind(&self) -> &str;

    /// Short name suitable for configuration files and folders on disk
    fn system_name(&self) -> String;

    /// Version tag this provider is pinned to
    fn version(&self) -> String;

    /// Populate an initially-empty target directory with the bundle payload
    fn materialize(&self, target: &Path) -> Result<()>;

    /// All version tags the source knows for this bundle
    fn enumerate_versions(&self) -> Result<Vec<String>>;

    /// The source's own notion of the most recent version
    ///
    /// Used when a latest-version query carries no constraint pattern.
    fn latest_release(&self) -> Result<String>;

    /// Same-variant provider pinned to a different version
    fn for_version(&self, version: &str) -> Result<Box<dyn Provider>>;

    /// Ordered on-disk locations where a cached copy of this bundle may live
    fn cache_candidates(&self, roots: &CacheRoots) -> Vec<PathBuf> {
        bundle_cache_paths(roots, self.kind(), &self.system_name(), &self.version())
    }

    /// Whether content at this fixed version never changes
    fn is_immutable(&self) -> bool {
        true
    }

    /// Whether this variant points at work-in-progress code
    fn is_dev(&self) -> bool {
        false
    }

    fn deprecation_status(&self) -> Result<DeprecationStatus> {
        Ok(DeprecationStatus::default())
    }

    fn changelog(&self) -> Result<Changelog> {
        Ok(Changelog::default())
    }
}

/// Placeholder version for path bundles that declare none
pub const UNVERSIONED: &str = "Undefined";

/// Provider for bundles that live in a plain local directory
///
/// Used by the `path` and `dev` descriptor types. The configured directory
/// itself is the bundle; nothing is ever copied into the cache roots, and
/// the content is mutable from the descriptor's point of view.
#[derive(Debug, Clone)]
pub struct PathProvider {
    kind: PathKind,
    path: PathBuf,
    name: String,
    version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Path,
    Dev,
}

impl PathProvider {
    /// Build a path provider from a `path` or `dev` identity
    ///
    /// Requires a `path` field. The bundle name defaults to the directory
    /// basename and the version to [`UNVERSIONED`].
    pub fn from_identity(identity: &Identity, kind: PathKind) -> Result<Self> {
        identity.validate(&["path"], &["name", "version"])?;

        let raw = identity.get("path").unwrap_or_default();
        let expanded = shellexpand::tilde(raw).into_owned();
        // strip trailing separators so the basename comes out right
        let trimmed = expanded.trim_end_matches(['/', '\\']);
        let path = PathBuf::from(trimmed);

        let name = match identity.get("name") {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    Error::MalformedDescriptor(format!(
                        "cannot derive a bundle name from path '{}'",
                        raw
                    ))
                })?,
        };

        let version = identity
            .get("version")
            .unwrap_or(UNVERSIONED)
            .to_string();

        Ok(Self {
            kind,
            path,
            name,
            version,
        })
    }

    /// The configured bundle directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Provider for PathProvider {
    fn kind(&self) -> &str {
        match self.kind {
            PathKind::Path => "path",
            PathKind::Dev => "dev",
        }
    }

    fn system_name(&self) -> String {
        self.name.clone()
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn materialize(&self, _target: &Path) -> Result<()> {
        // nothing to fetch; the configured directory is the bundle
        if self.path.is_dir() {
            Ok(())
        } else {
            Err(Error::ProviderFailure(format!(
                "path bundle directory '{}' does not exist",
                self.path.display()
            )))
        }
    }

    fn enumerate_versions(&self) -> Result<Vec<String>> {
        Ok(vec![self.version.clone()])
    }

    fn latest_release(&self) -> Result<String> {
        Ok(self.version.clone())
    }

    fn for_version(&self, version: &str) -> Result<Box<dyn Provider>> {
        let mut provider = self.clone();
        provider.version = version.to_string();
        Ok(Box::new(provider))
    }

    fn cache_candidates(&self, _roots: &CacheRoots) -> Vec<PathBuf> {
        vec![self.path.clone()]
    }

    fn is_immutable(&self) -> bool {
        false
    }

    fn is_dev(&self) -> bool {
        self.kind == PathKind::Dev
    }
}
