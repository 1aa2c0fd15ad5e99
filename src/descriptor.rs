//! Descriptor: the uniform surface over one versioned bundle
//!
//! A descriptor composes an identity, the cache-path resolver, the version
//! matcher and a provider into a single object that callers resolve bundles
//! through. One instance covers one (identity, provider) pair; its identity
//! never changes after construction.
//!
//! A descriptor moves through three states: constructed, locally present
//! (after [`Descriptor::ensure_local`] materializes the payload when needed)
//! and manifest-loaded (after [`Descriptor::manifest`] parses and memoizes
//! the metadata). A failed transition leaves the instance in its prior
//! state.
//!
//! # Examples
//!
//! ```no_run
//! use bundlekit::{create_descriptor, Config, Identity};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let identity = Identity::from_uri("bkit:descriptor:store?name=maps-panel&version=v1.2.3")?;
//! let descriptor = create_descriptor(&config, identity)?;
//!
//! descriptor.ensure_local()?;
//! let manifest = descriptor.manifest()?;
//! println!("{}", manifest.display_name.clone().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::cache::{primary_cache_path, CacheRoots};
use crate::config::Config;
use crate::identity::Identity;
use crate::manifest::BundleManifest;
use crate::provider::{Changelog, DeprecationStatus, PathKind, PathProvider, Provider};
use crate::store::StoreProvider;
use crate::version::latest_tag_by_pattern;
use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Resolved identity plus resolution logic for one versioned bundle
pub struct Descriptor {
    identity: Identity,
    roots: CacheRoots,
    provider: Box<dyn Provider>,
    manifest: Mutex<Option<Arc<BundleManifest>>>,
}

impl Descriptor {
    /// Compose a descriptor from its parts
    ///
    /// Most callers go through [`create_descriptor`] instead, which picks
    /// the provider variant from the identity's `type` field.
    pub fn new(identity: Identity, provider: Box<dyn Provider>, roots: CacheRoots) -> Self {
        Self {
            identity,
            roots,
            provider,
            manifest: Mutex::new(None),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Canonical URI form of this descriptor's identity
    pub fn uri(&self) -> Result<String> {
        self.identity.to_uri()
    }

    /// Short bundle name, suitable for configuration files and folders
    pub fn system_name(&self) -> String {
        self.provider.system_name()
    }

    /// Version tag this descriptor is pinned to
    pub fn version(&self) -> String {
        self.provider.version()
    }

    /// Ordered candidate paths where a cached copy may reside
    pub fn cache_paths(&self) -> Vec<PathBuf> {
        self.provider.cache_candidates(&self.roots)
    }

    /// Path of the cached copy, or `None` when the bundle is not local
    ///
    /// Walks the candidate paths in order; the first one carrying the
    /// bundle metadata file is authoritative.
    pub fn path(&self) -> Option<PathBuf> {
        for candidate in self.cache_paths() {
            if BundleManifest::exists(&candidate) {
                debug!("found cached copy of {:?} at {}", self, candidate.display());
                return Some(candidate);
            }
        }
        None
    }

    /// Whether this bundle exists in a locally accessible form
    pub fn exists_local(&self) -> bool {
        self.path().is_some()
    }

    /// Make sure the bundle exists locally, fetching it if necessary
    ///
    /// A no-op when a cached copy is already present. Otherwise the provider
    /// materializes into the new-style path under the primary root, the
    /// only valid materialization target.
    pub fn ensure_local(&self) -> Result<()> {
        if self.exists_local() {
            return Ok(());
        }

        let target = primary_cache_path(
            &self.roots,
            self.provider.kind(),
            &self.provider.system_name(),
            &self.provider.version(),
        );
        debug!("fetching {:?} into {}", self, target.display());
        self.provider.materialize(&target)
    }

    /// The bundle's metadata, loaded lazily and memoized per instance
    ///
    /// Triggers materialization when the bundle is not yet local. Once
    /// loaded, the manifest is never re-read from disk by this instance,
    /// even if the backing files change. Concurrent calls are serialized;
    /// a failed load caches nothing.
    pub fn manifest(&self) -> Result<Arc<BundleManifest>> {
        let mut cached = self
            .manifest
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(manifest) = cached.as_ref() {
            return Ok(Arc::clone(manifest));
        }

        self.ensure_local()?;

        let bundle_root = self.path().ok_or_else(|| {
            let target = primary_cache_path(
                &self.roots,
                self.provider.kind(),
                &self.provider.system_name(),
                &self.provider.version(),
            );
            Error::MetadataMissing(BundleManifest::manifest_path(target))
        })?;

        let manifest = Arc::new(BundleManifest::load(&bundle_root)?);
        *cached = Some(Arc::clone(&manifest));
        Ok(manifest)
    }

    /// A new descriptor pinned to the latest version the source knows
    ///
    /// With a constraint pattern, resolves it against the provider's
    /// enumerated tags; without one, uses the provider's own notion of its
    /// most recent release.
    pub fn latest(&self, pattern: Option<&str>) -> Result<Descriptor> {
        let version = match pattern {
            Some(pattern) => {
                let tags = self.provider.enumerate_versions()?;
                latest_tag_by_pattern(&self.system_name(), &tags, pattern)?
            }
            None => self.provider.latest_release()?,
        };

        let identity = self.identity.with_version(&version);
        let provider = self.provider.for_version(&version)?;
        Ok(Descriptor::new(identity, provider, self.roots.clone()))
    }

    /// Whether content at this fixed version never changes
    ///
    /// Path and dev descriptors report mutable content; their manifests are
    /// still memoized in-process, but callers own the logical validity of
    /// that cache across external edits.
    pub fn is_immutable(&self) -> bool {
        self.provider.is_immutable()
    }

    pub fn is_dev(&self) -> bool {
        self.provider.is_dev()
    }

    pub fn deprecation_status(&self) -> Result<DeprecationStatus> {
        self.provider.deprecation_status()
    }

    pub fn changelog(&self) -> Result<Changelog> {
        self.provider.changelog()
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity.to_uri() {
            Ok(uri) => write!(f, "<Descriptor {}>", uri),
            Err(_) => write!(f, "<Descriptor {:?}>", self.identity),
        }
    }
}

/// Build a descriptor from an identity, picking the provider variant from
/// its `type` field
///
/// Knows the variants shipped in-tree: `store`, `path` and `dev`. Other
/// source kinds are hosted by external provider implementations and are
/// composed through [`Descriptor::new`] directly.
pub fn create_descriptor(config: &Config, identity: Identity) -> Result<Descriptor> {
    let provider: Box<dyn Provider> = match identity.descriptor_type() {
        Some("store") => Box::new(StoreProvider::from_identity(config.store(), &identity)?),
        Some("path") => Box::new(PathProvider::from_identity(&identity, PathKind::Path)?),
        Some("dev") => Box::new(PathProvider::from_identity(&identity, PathKind::Dev)?),
        Some(other) => {
            return Err(Error::MalformedDescriptor(format!(
                "unknown descriptor type '{}'",
                other
            )))
        }
        None => {
            return Err(Error::MalformedDescriptor(
                "identity is missing the type field".to_string(),
            ))
        }
    };

    Ok(Descriptor::new(identity, provider, config.cache_roots()))
}

/// Convenience wrapper: parse a canonical URI and build its descriptor
pub fn descriptor_from_uri(config: &Config, uri: &str) -> Result<Descriptor> {
    create_descriptor(config, Identity::from_uri(uri)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_rejects_unknown_type() {
        let config = Config::default();
        let identity = Identity::from_fields([("type", "p4"), ("path", "//depot/app")]);
        let err = create_descriptor(&config, identity).unwrap_err();
        assert!(matches!(err, Error::MalformedDescriptor(_)));
    }

    #[test]
    fn test_factory_builds_path_descriptor() {
        let config = Config::default();
        let identity = Identity::from_fields([("type", "path"), ("path", "/opt/bundles/panel")]);
        let descriptor = create_descriptor(&config, identity).unwrap();
        assert_eq!(descriptor.system_name(), "panel");
        assert!(!descriptor.is_immutable());
        assert!(!descriptor.is_dev());
    }

    #[test]
    fn test_descriptor_identity_is_fixed() {
        let config = Config::default();
        let identity = Identity::from_fields([("type", "dev"), ("path", "/work/panel")]);
        let descriptor = create_descriptor(&config, identity.clone()).unwrap();
        assert_eq!(descriptor.identity(), &identity);
        assert!(descriptor.is_dev());
    }
}
