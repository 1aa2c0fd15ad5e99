//! Bundle manifest handling (`bundle.yml`)
//!
//! Every locally realized bundle exposes a fixed-name metadata file at its
//! root. The manifest describes the bundle and, at minimum, its
//! configuration schema: the parameters the hosting environment may bind for
//! the bundle, with their types and defaults.
//!
//! # Examples
//!
//! ```no_run
//! use bundlekit::BundleManifest;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = BundleManifest::load("/cache/store/maps-panel/v1.2.3")?;
//! println!("{}", manifest.display_name.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed name of the metadata file at every bundle's root
pub const BUNDLE_MANIFEST_FILE: &str = "bundle.yml";

/// Structured metadata describing one bundle version
///
/// Associated 1:1 with a locally realized bundle copy. Once a descriptor has
/// loaded a manifest it is treated as immutable for that descriptor's
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Human-readable bundle name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Short description of what the bundle does
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Configuration schema: parameter name to its specification
    #[serde(default)]
    pub configuration: BTreeMap<String, ConfigurationItem>,

    /// Minimum runtime version the bundle requires (e.g. "v0.18.0")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_runtime_version: Option<String>,
}

/// One entry in a bundle's configuration schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationItem {
    /// Value type expected for the parameter (e.g. "str", "int", "template")
    #[serde(rename = "type")]
    pub value_type: String,

    /// What the parameter controls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default used when the hosting configuration leaves the parameter unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_yaml::Value>,

    /// Whether an empty value is an acceptable binding
    #[serde(default)]
    pub allows_empty: bool,
}

impl BundleManifest {
    /// Path of the metadata file inside a bundle directory
    pub fn manifest_path<P: AsRef<Path>>(bundle_root: P) -> PathBuf {
        bundle_root.as_ref().join(BUNDLE_MANIFEST_FILE)
    }

    /// Check whether a directory carries a bundle manifest
    pub fn exists<P: AsRef<Path>>(bundle_root: P) -> bool {
        Self::manifest_path(bundle_root).exists()
    }

    /// Load and parse the manifest from a bundle directory
    pub fn load<P: AsRef<Path>>(bundle_root: P) -> Result<Self> {
        let content = fs::read_to_string(Self::manifest_path(bundle_root))?;
        let manifest: BundleManifest = serde_yaml::from_str(&content)?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parse() {
        let yaml = r#"
display_name: Maps Panel
description: Embeds the location browser in the host application.
requires_runtime_version: v0.18.0
configuration:
  api_endpoint:
    type: str
    description: Endpoint the panel queries for map tiles.
    default_value: https://tiles.example.com
  zoom_levels:
    type: int
    default_value: 12
  template_overrides:
    type: template
    allows_empty: true
"#;

        let manifest: BundleManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.display_name.as_deref(), Some("Maps Panel"));
        assert_eq!(manifest.requires_runtime_version.as_deref(), Some("v0.18.0"));
        assert_eq!(manifest.configuration.len(), 3);

        let endpoint = &manifest.configuration["api_endpoint"];
        assert_eq!(endpoint.value_type, "str");
        assert!(!endpoint.allows_empty);

        let overrides = &manifest.configuration["template_overrides"];
        assert!(overrides.allows_empty);
        assert!(overrides.default_value.is_none());
    }

    #[test]
    fn test_minimal_manifest() {
        // a manifest with nothing but a configuration block is valid
        let manifest: BundleManifest = serde_yaml::from_str("configuration: {}").unwrap();
        assert!(manifest.display_name.is_none());
        assert!(manifest.configuration.is_empty());
    }

    #[test]
    fn test_manifest_path_uses_fixed_name() {
        let path = BundleManifest::manifest_path("/cache/app/foo/v1.0.0");
        assert_eq!(path, PathBuf::from("/cache/app/foo/v1.0.0/bundle.yml"));
    }
}
