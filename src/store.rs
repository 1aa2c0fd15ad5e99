//! File-based bundle store and its provider
//!
//! The store is a plain directory tree holding published bundle releases:
//!
//! ```text
//! <store root>/
//!   index/<name>.json                 release list per bundle
//!   tarballs/<name>-<version>.tar.gz  bundle payloads
//! ```
//!
//! Publishing appends a release to the index; released versions are
//! immutable and can never be re-published. The [`StoreProvider`] turns a
//! store entry into a descriptor provider: materialization verifies the
//! payload checksum, extracts into a staging directory and renames it into
//! place, so a partially fetched bundle is never visible to cache probing.
//!
//! # Examples
//!
//! ```no_run
//! use bundlekit::BundleStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = BundleStore::new("/srv/bundle-store");
//! let index = store.load_index("maps-panel")?;
//! for release in &index.releases {
//!     println!("{}", release.version);
//! }
//! # Ok(())
//! # }
//! ```

use crate::identity::Identity;
use crate::manifest::{BundleManifest, BUNDLE_MANIFEST_FILE};
use crate::provider::{Changelog, DeprecationStatus, Provider};
use crate::{Error, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Release list for one bundle, stored as `index/<name>.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleIndex {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub releases: Vec<BundleRelease>,
}

/// One published version of a bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleRelease {
    pub version: String,

    /// Payload file name under the store's tarballs directory
    pub tarball: String,

    /// Payload checksum, `sha256:<hex>`
    pub checksum: String,

    /// Set when the release has been deprecated; holds the operator's note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog_url: Option<String>,
}

/// Handle to a file-based bundle store
#[derive(Debug, Clone)]
pub struct BundleStore {
    root: PathBuf,
}

impl BundleStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the per-bundle index files
    pub fn index_dir(&self) -> PathBuf {
        self.root.join("index")
    }

    /// Directory holding the release payloads
    pub fn tarballs_dir(&self) -> PathBuf {
        self.root.join("tarballs")
    }

    /// Create the store directory structure
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.index_dir())?;
        fs::create_dir_all(self.tarballs_dir())?;
        Ok(())
    }

    pub fn index_path(&self, name: &str) -> PathBuf {
        self.index_dir().join(format!("{}.json", name))
    }

    pub fn tarball_path(&self, name: &str, version: &str) -> PathBuf {
        self.tarballs_dir()
            .join(format!("{}-{}.tar.gz", name, version))
    }

    /// Load the release index for a bundle
    pub fn load_index(&self, name: &str) -> Result<BundleIndex> {
        let index_path = self.index_path(name);

        if !index_path.exists() {
            return Err(Error::ProviderFailure(format!(
                "bundle '{}' not found in store {}",
                name,
                self.root.display()
            )));
        }

        let content = fs::read_to_string(&index_path)?;
        let index: BundleIndex = serde_json::from_str(&content)?;
        Ok(index)
    }

    fn save_index(&self, index: &BundleIndex) -> Result<()> {
        fs::create_dir_all(self.index_dir())?;
        let content = serde_json::to_string_pretty(index)?;
        fs::write(self.index_path(&index.name), content)?;
        Ok(())
    }

    /// Names of all bundles with at least one published release
    pub fn list_bundles(&self) -> Result<Vec<String>> {
        let index_dir = self.index_dir();

        if !index_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(index_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Publish a bundle directory as a new release
    ///
    /// Packs the directory into a tarball, records its checksum and appends
    /// the release to the bundle's index. The directory must follow the
    /// bundle contract (a `bundle.yml` at its root); the index description is
    /// taken from the manifest on first publish.
    ///
    /// # Errors
    ///
    /// Re-publishing an existing version fails: released versions are
    /// immutable.
    pub fn publish<P: AsRef<Path>>(&self, bundle_dir: P, name: &str, version: &str) -> Result<PathBuf> {
        let bundle_dir = bundle_dir.as_ref();

        if !BundleManifest::exists(bundle_dir) {
            return Err(Error::MetadataMissing(
                BundleManifest::manifest_path(bundle_dir),
            ));
        }
        let manifest = BundleManifest::load(bundle_dir)?;

        let mut index = match self.load_index(name) {
            Ok(index) => index,
            Err(Error::ProviderFailure(_)) => BundleIndex {
                name: name.to_string(),
                description: manifest.description.clone(),
                releases: Vec::new(),
            },
            Err(e) => return Err(e),
        };

        if index.releases.iter().any(|r| r.version == version) {
            return Err(Error::ProviderFailure(format!(
                "'{}' {} is already published; released versions are immutable",
                name, version
            )));
        }

        self.init()?;

        let tarball_path = self.tarball_path(name, version);
        create_tarball(bundle_dir, &tarball_path)?;
        let checksum = file_checksum(&tarball_path)?;

        let tarball_name = tarball_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        index.releases.push(BundleRelease {
            version: version.to_string(),
            tarball: tarball_name,
            checksum,
            deprecation: None,
            changelog: None,
            changelog_url: None,
        });
        self.save_index(&index)?;

        debug!("published {} {} to {}", name, version, self.root.display());
        Ok(tarball_path)
    }

    /// Set or clear the deprecation note on a published release
    pub fn set_deprecation(
        &self,
        name: &str,
        version: &str,
        message: Option<String>,
    ) -> Result<()> {
        let mut index = self.load_index(name)?;

        let release = index
            .releases
            .iter_mut()
            .find(|r| r.version == version)
            .ok_or_else(|| {
                Error::ProviderFailure(format!(
                    "'{}' has no published version {}",
                    name, version
                ))
            })?;

        release.deprecation = message;
        self.save_index(&index)
    }
}

/// Compute a `sha256:<hex>` checksum for a file
fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("sha256:{:x}", hasher.finalize()))
}

/// Pack a bundle directory into a gzipped tarball
///
/// Entry paths are relative to the bundle root, so `bundle.yml` sits at the
/// archive root and extraction recreates the directory in place.
fn create_tarball(source_dir: &Path, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tar_gz = File::create(output_path)?;
    let enc = GzEncoder::new(tar_gz, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for entry in walkdir::WalkDir::new(source_dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let relative = match path.strip_prefix(source_dir) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel,
            _ => continue,
        };

        if path.is_dir() {
            tar.append_dir(relative, path)?;
        } else if path.is_file() {
            tar.append_path_with_name(path, relative)?;
        }
    }

    tar.finish()?;
    Ok(())
}

/// Provider for bundles published through a bundle store
#[derive(Debug, Clone)]
pub struct StoreProvider {
    store: BundleStore,
    name: String,
    version: String,
}

impl StoreProvider {
    /// Build a store provider from a `store` identity
    pub fn from_identity(store: BundleStore, identity: &Identity) -> Result<Self> {
        identity.validate(&["name", "version"], &[])?;

        Ok(Self {
            store,
            name: identity.get("name").unwrap_or_default().to_string(),
            version: identity.get("version").unwrap_or_default().to_string(),
        })
    }

    /// The index entry for the pinned version
    fn release(&self) -> Result<BundleRelease> {
        let index = self.store.load_index(&self.name)?;
        index
            .releases
            .into_iter()
            .find(|r| r.version == self.version)
            .ok_or_else(|| {
                Error::ProviderFailure(format!(
                    "'{}' has no published version {}",
                    self.name, self.version
                ))
            })
    }
}

impl Provider for StoreProvider {
    fn kind(&self) -> &str {
        "store"
    }

    fn system_name(&self) -> String {
        self.name.clone()
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn materialize(&self, target: &Path) -> Result<()> {
        if BundleManifest::exists(target) {
            // already fully in place
            return Ok(());
        }

        let release = self.release()?;
        let tarball_path = self.store.tarballs_dir().join(&release.tarball);

        if !tarball_path.exists() {
            return Err(Error::ProviderFailure(format!(
                "store payload missing: {}",
                tarball_path.display()
            )));
        }

        let computed = file_checksum(&tarball_path)?;
        if !computed.eq_ignore_ascii_case(&release.checksum) {
            return Err(Error::ProviderFailure(format!(
                "checksum mismatch for {}: expected {}, got {}",
                tarball_path.display(),
                release.checksum,
                computed
            )));
        }

        let parent = target.parent().ok_or_else(|| {
            Error::ProviderFailure(format!(
                "invalid materialization target: {}",
                target.display()
            ))
        })?;
        fs::create_dir_all(parent)?;

        // extract into a staging directory, then rename into place; the
        // bundle only becomes visible to cache probing once it is complete
        let staging = parent.join(format!(
            "{}.part",
            target.file_name().unwrap_or_default().to_string_lossy()
        ));
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        debug!(
            "extracting {} into {}",
            tarball_path.display(),
            staging.display()
        );

        let tar_gz = File::open(&tarball_path)?;
        let tar = GzDecoder::new(tar_gz);
        let mut archive = Archive::new(tar);
        if let Err(e) = archive.unpack(&staging) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e.into());
        }

        if !staging.join(BUNDLE_MANIFEST_FILE).exists() {
            let _ = fs::remove_dir_all(&staging);
            return Err(Error::MetadataMissing(target.join(BUNDLE_MANIFEST_FILE)));
        }

        if target.exists() {
            // leftover from an interrupted fetch; it carried no manifest
            fs::remove_dir_all(target)?;
        }
        fs::rename(&staging, target)?;
        Ok(())
    }

    fn enumerate_versions(&self) -> Result<Vec<String>> {
        let index = self.store.load_index(&self.name)?;
        Ok(index.releases.into_iter().map(|r| r.version).collect())
    }

    fn latest_release(&self) -> Result<String> {
        let index = self.store.load_index(&self.name)?;
        index
            .releases
            .last()
            .map(|r| r.version.clone())
            .ok_or_else(|| {
                Error::ProviderFailure(format!("'{}' has no published releases", self.name))
            })
    }

    fn for_version(&self, version: &str) -> Result<Box<dyn Provider>> {
        let mut provider = self.clone();
        provider.version = version.to_string();
        Ok(Box::new(provider))
    }

    fn deprecation_status(&self) -> Result<DeprecationStatus> {
        let release = self.release()?;
        Ok(DeprecationStatus {
            is_deprecated: release.deprecation.is_some(),
            message: release.deprecation,
        })
    }

    fn changelog(&self) -> Result<Changelog> {
        let release = self.release()?;
        Ok(Changelog {
            summary: release.changelog,
            url: release.changelog_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn write_bundle(dir: &Path, display_name: &str) {
        fs::create_dir_all(dir.join("python")).unwrap();
        let manifest = BundleManifest {
            display_name: Some(display_name.to_string()),
            description: Some("test bundle".to_string()),
            configuration: BTreeMap::new(),
            requires_runtime_version: None,
        };
        fs::write(
            dir.join(BUNDLE_MANIFEST_FILE),
            serde_yaml::to_string(&manifest).unwrap(),
        )
        .unwrap();
        fs::write(dir.join("python").join("panel.py"), "print('hi')\n").unwrap();
    }

    #[test]
    fn test_publish_and_load_index() {
        let temp = TempDir::new().unwrap();
        let store = BundleStore::new(temp.path().join("store"));
        let bundle_dir = temp.path().join("src");
        write_bundle(&bundle_dir, "Maps Panel");

        store.publish(&bundle_dir, "maps-panel", "v1.0.0").unwrap();
        store.publish(&bundle_dir, "maps-panel", "v1.1.0").unwrap();

        let index = store.load_index("maps-panel").unwrap();
        assert_eq!(index.name, "maps-panel");
        assert_eq!(index.description.as_deref(), Some("test bundle"));
        assert_eq!(index.releases.len(), 2);
        assert!(index.releases[0].checksum.starts_with("sha256:"));
        assert!(store.tarball_path("maps-panel", "v1.0.0").exists());
    }

    #[test]
    fn test_released_versions_are_immutable() {
        let temp = TempDir::new().unwrap();
        let store = BundleStore::new(temp.path().join("store"));
        let bundle_dir = temp.path().join("src");
        write_bundle(&bundle_dir, "Maps Panel");

        store.publish(&bundle_dir, "maps-panel", "v1.0.0").unwrap();
        let err = store
            .publish(&bundle_dir, "maps-panel", "v1.0.0")
            .unwrap_err();
        assert!(matches!(err, Error::ProviderFailure(_)));
    }

    #[test]
    fn test_publish_requires_manifest() {
        let temp = TempDir::new().unwrap();
        let store = BundleStore::new(temp.path().join("store"));
        let bundle_dir = temp.path().join("src");
        fs::create_dir_all(&bundle_dir).unwrap();

        let err = store.publish(&bundle_dir, "maps-panel", "v1.0.0").unwrap_err();
        assert!(matches!(err, Error::MetadataMissing(_)));
    }

    #[test]
    fn test_materialize_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = BundleStore::new(temp.path().join("store"));
        let bundle_dir = temp.path().join("src");
        write_bundle(&bundle_dir, "Maps Panel");
        store.publish(&bundle_dir, "maps-panel", "v1.0.0").unwrap();

        let identity = Identity::from_fields([
            ("type", "store"),
            ("name", "maps-panel"),
            ("version", "v1.0.0"),
        ]);
        let provider = StoreProvider::from_identity(store, &identity).unwrap();

        let target = temp.path().join("cache/store/maps-panel/v1.0.0");
        provider.materialize(&target).unwrap();

        assert!(target.join(BUNDLE_MANIFEST_FILE).exists());
        assert!(target.join("python/panel.py").exists());
        // no staging leftovers
        assert!(!target.parent().unwrap().join("v1.0.0.part").exists());

        // idempotent
        provider.materialize(&target).unwrap();
    }

    #[test]
    fn test_materialize_is_all_or_nothing_on_bad_checksum() {
        let temp = TempDir::new().unwrap();
        let store = BundleStore::new(temp.path().join("store"));
        let bundle_dir = temp.path().join("src");
        write_bundle(&bundle_dir, "Maps Panel");
        store.publish(&bundle_dir, "maps-panel", "v1.0.0").unwrap();

        // corrupt the payload after publishing
        let tarball = store.tarball_path("maps-panel", "v1.0.0");
        fs::write(&tarball, b"not a tarball").unwrap();

        let identity = Identity::from_fields([
            ("type", "store"),
            ("name", "maps-panel"),
            ("version", "v1.0.0"),
        ]);
        let provider = StoreProvider::from_identity(store, &identity).unwrap();

        let target = temp.path().join("cache/store/maps-panel/v1.0.0");
        let err = provider.materialize(&target).unwrap_err();
        assert!(matches!(err, Error::ProviderFailure(_)));
        assert!(!target.exists());
    }

    #[test]
    fn test_enumerate_and_latest() {
        let temp = TempDir::new().unwrap();
        let store = BundleStore::new(temp.path().join("store"));
        let bundle_dir = temp.path().join("src");
        write_bundle(&bundle_dir, "Maps Panel");
        store.publish(&bundle_dir, "maps-panel", "v1.0.0").unwrap();
        store.publish(&bundle_dir, "maps-panel", "v1.2.0").unwrap();

        let identity = Identity::from_fields([
            ("type", "store"),
            ("name", "maps-panel"),
            ("version", "v1.0.0"),
        ]);
        let provider = StoreProvider::from_identity(store, &identity).unwrap();

        assert_eq!(provider.enumerate_versions().unwrap(), vec!["v1.0.0", "v1.2.0"]);
        assert_eq!(provider.latest_release().unwrap(), "v1.2.0");
    }

    #[test]
    fn test_deprecation_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = BundleStore::new(temp.path().join("store"));
        let bundle_dir = temp.path().join("src");
        write_bundle(&bundle_dir, "Maps Panel");
        store.publish(&bundle_dir, "maps-panel", "v1.0.0").unwrap();

        store
            .set_deprecation("maps-panel", "v1.0.0", Some("use v2".to_string()))
            .unwrap();

        let identity = Identity::from_fields([
            ("type", "store"),
            ("name", "maps-panel"),
            ("version", "v1.0.0"),
        ]);
        let provider = StoreProvider::from_identity(store, &identity).unwrap();

        let status = provider.deprecation_status().unwrap();
        assert!(status.is_deprecated);
        assert_eq!(status.message.as_deref(), Some("use v2"));
    }
}
