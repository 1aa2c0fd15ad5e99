//! Cache roots and candidate-path resolution
//!
//! Realized bundle copies live under a set of filesystem roots: one primary
//! root that all materialization writes into, plus an ordered list of
//! read-only fallback roots that are only ever probed for existence. This
//! module computes, in priority order, the on-disk locations a bundle may
//! occupy. It performs no I/O itself.
//!
//! # Examples
//!
//! ```
//! use bundlekit::{bundle_cache_paths, CacheRoots};
//! use std::path::PathBuf;
//!
//! let roots = CacheRoots::new(PathBuf::from("/cache"), vec![]);
//! let paths = bundle_cache_paths(&roots, "store", "maps-panel", "v1.2.3");
//! assert_eq!(paths, vec![PathBuf::from("/cache/store/maps-panel/v1.2.3")]);
//! ```

use std::path::{Path, PathBuf};

/// The set of filesystem roots a bundle cache may span
///
/// The primary root is where new data is written when a bundle is fetched
/// and cached. Fallback roots are consulted in order when a cached copy is
/// not found under the primary root; they are never written to.
#[derive(Debug, Clone)]
pub struct CacheRoots {
    primary: PathBuf,
    fallbacks: Vec<PathBuf>,
}

impl CacheRoots {
    /// Create a root set from a writable primary and ordered fallbacks
    pub fn new(primary: PathBuf, fallbacks: Vec<PathBuf>) -> Self {
        Self { primary, fallbacks }
    }

    /// The writable primary root, the only valid materialization target
    pub fn primary(&self) -> &Path {
        &self.primary
    }

    /// Read-only fallback roots, in probe order
    pub fn fallbacks(&self) -> &[PathBuf] {
        &self.fallbacks
    }

    /// All roots in probe order: primary first, then each fallback
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.fallbacks.iter().map(PathBuf::as_path))
    }
}

/// Legacy cache directory for a bundle category, if one existed
///
/// Older release lines laid caches out as `<root>/<category-dir>/<type>/...`
/// before the flat `<root>/<type>/...` layout replaced it. The lookup covers
/// the three bundle categories; no other type ever had a legacy layout.
pub fn legacy_install_dir(bundle_type: &str) -> Option<&'static str> {
    match bundle_type {
        "app" => Some("apps"),
        "engine" => Some("engines"),
        "framework" => Some("frameworks"),
        _ => None,
    }
}

/// Compute the ordered candidate paths a cached bundle copy may occupy
///
/// For each root in `[primary, fallback...]` order the new-style path
/// `root/<type>/<name>/<version>` comes first, followed by the legacy-style
/// path `root/<legacy-dir>/<type>/<name>/<version>` when the type has a
/// legacy layout. The result is used for existence probing only; writes go
/// exclusively to the first candidate (new-style under the primary root).
pub fn bundle_cache_paths(
    roots: &CacheRoots,
    bundle_type: &str,
    name: &str,
    version: &str,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for root in roots.iter() {
        paths.push(root.join(bundle_type).join(name).join(version));

        if let Some(legacy_dir) = legacy_install_dir(bundle_type) {
            paths.push(
                root.join(legacy_dir)
                    .join(bundle_type)
                    .join(name)
                    .join(version),
            );
        }
    }

    paths
}

/// The materialization target: the new-style path under the primary root
pub fn primary_cache_path(
    roots: &CacheRoots,
    bundle_type: &str,
    name: &str,
    version: &str,
) -> PathBuf {
    roots.primary().join(bundle_type).join(name).join(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> CacheRoots {
        CacheRoots::new(
            PathBuf::from("/P"),
            vec![PathBuf::from("/F1"), PathBuf::from("/F2")],
        )
    }

    #[test]
    fn test_candidate_order_with_legacy_layout() {
        let paths = bundle_cache_paths(&roots(), "app", "foo", "v1.0.0");
        let expected: Vec<PathBuf> = [
            "/P/app/foo/v1.0.0",
            "/P/apps/app/foo/v1.0.0",
            "/F1/app/foo/v1.0.0",
            "/F1/apps/app/foo/v1.0.0",
            "/F2/app/foo/v1.0.0",
            "/F2/apps/app/foo/v1.0.0",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_candidate_order_without_legacy_layout() {
        let paths = bundle_cache_paths(&roots(), "store", "foo", "v1.0.0");
        let expected: Vec<PathBuf> = [
            "/P/store/foo/v1.0.0",
            "/F1/store/foo/v1.0.0",
            "/F2/store/foo/v1.0.0",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_legacy_lookup_covers_bundle_categories() {
        assert_eq!(legacy_install_dir("app"), Some("apps"));
        assert_eq!(legacy_install_dir("engine"), Some("engines"));
        assert_eq!(legacy_install_dir("framework"), Some("frameworks"));
        assert_eq!(legacy_install_dir("store"), None);
        assert_eq!(legacy_install_dir("dev"), None);
    }

    #[test]
    fn test_primary_cache_path_is_first_candidate() {
        let roots = roots();
        let paths = bundle_cache_paths(&roots, "engine", "render", "v2.0.1");
        assert_eq!(paths[0], primary_cache_path(&roots, "engine", "render", "v2.0.1"));
    }
}
