//! bundlekit - descriptor resolution for versioned bundles
//!
//! bundlekit resolves, caches and exposes versioned software bundles (apps,
//! engines, frameworks) published through heterogeneous sources: a central
//! bundle store, plain filesystem paths, or external providers. Its core is
//! the descriptor resolution engine:
//!
//! - A canonical, reversible identity format (`bkit:descriptor:<type>?...`)
//! - Best-version resolution of constraint patterns like `v1.x.x`, with
//!   forked sub-version semantics
//! - Cache lookup across an ordered set of storage roots, with a legacy
//!   layout fallback
//! - Lazy, memoized loading of bundle metadata, materializing the payload
//!   on first access
//!
//! # Examples
//!
//! ```no_run
//! use bundlekit::{descriptor_from_uri, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let descriptor =
//!     descriptor_from_uri(&config, "bkit:descriptor:store?name=maps-panel&version=v1.2.3")?;
//!
//! // fetch the payload if it is not already cached, then read its metadata
//! descriptor.ensure_local()?;
//! let manifest = descriptor.manifest()?;
//! println!("{}", manifest.display_name.clone().unwrap_or_default());
//!
//! // pin a new descriptor to the best v1.x release the store knows
//! let latest = descriptor.latest(Some("v1.x.x"))?;
//! println!("latest: {}", latest.version());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`identity`] - Descriptor identities and their canonical URI form
//! - [`version`] - Version tags and constraint-pattern matching
//! - [`cache`] - Cache roots and candidate-path resolution
//! - [`manifest`] - Bundle metadata (`bundle.yml`) types and parsing
//! - [`provider`] - The provider contract and the path/dev variant
//! - [`store`] - File-based bundle store and its provider
//! - [`descriptor`] - The Descriptor composition root and factory
//! - [`config`] - User configuration (cache roots, store location)
//! - [`error`] - Error types and result handling

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod identity;
pub mod manifest;
pub mod provider;
pub mod store;
pub mod version;

pub use cache::{bundle_cache_paths, legacy_install_dir, primary_cache_path, CacheRoots};
pub use config::Config;
pub use descriptor::{create_descriptor, descriptor_from_uri, Descriptor};
pub use error::{Error, Result};
pub use identity::{Identity, DESCRIPTOR_URI_PREFIX, DESCRIPTOR_URI_SCHEME};
pub use manifest::{BundleManifest, ConfigurationItem, BUNDLE_MANIFEST_FILE};
pub use provider::{Changelog, DeprecationStatus, PathKind, PathProvider, Provider, UNVERSIONED};
pub use store::{BundleIndex, BundleRelease, BundleStore, StoreProvider};
pub use version::latest_tag_by_pattern;
