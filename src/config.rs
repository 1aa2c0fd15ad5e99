//! User configuration management
//!
//! Configuration is stored in TOML format at `~/.bundlekit/config.toml` and
//! supplies the cache roots and the bundle store location at descriptor
//! construction time. The resolution core itself never discovers or
//! persists these.
//!
//! # Examples
//!
//! ```no_run
//! use bundlekit::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! println!("primary cache root: {}", config.cache.primary_root);
//! # Ok(())
//! # }
//! ```

use crate::cache::CacheRoots;
use crate::store::BundleStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// User configuration file (`~/.bundlekit/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Cache root settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Bundle store settings
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Writable root all fetched bundles are cached under
    #[serde(default = "default_primary_root")]
    pub primary_root: String,

    /// Read-only roots probed, in order, when a bundle is not in the
    /// primary root (e.g. a studio-wide shared cache)
    #[serde(default)]
    pub fallback_roots: Vec<String>,
}

fn default_primary_root() -> String {
    "~/.bundlekit/cache".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            primary_root: default_primary_root(),
            fallback_roots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the file-based bundle store
    #[serde(default = "default_store_root")]
    pub root: String,
}

fn default_store_root() -> String {
    "~/.bundlekit/store".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// Uses `BUNDLEKIT_CONFIG_DIR` if set, otherwise `~/.bundlekit/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        // custom config directory, useful for testing
        if let Ok(config_dir) = std::env::var("BUNDLEKIT_CONFIG_DIR") {
            return Ok(PathBuf::from(config_dir).join("config.toml"));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not find home directory".to_string()))?;

        Ok(home.join(".bundlekit").join("config.toml"))
    }

    /// Load config from file, or use defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// The configured cache roots, with `~` expanded
    pub fn cache_roots(&self) -> CacheRoots {
        let primary = PathBuf::from(shellexpand::tilde(&self.cache.primary_root).into_owned());
        let fallbacks = self
            .cache
            .fallback_roots
            .iter()
            .map(|root| PathBuf::from(shellexpand::tilde(root).into_owned()))
            .collect();
        CacheRoots::new(primary, fallbacks)
    }

    /// Handle to the configured bundle store
    pub fn store(&self) -> BundleStore {
        BundleStore::new(shellexpand::tilde(&self.store.root).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.primary_root, "~/.bundlekit/cache");
        assert!(config.cache.fallback_roots.is_empty());
        assert_eq!(config.store.root, "~/.bundlekit/store");
    }

    #[test]
    fn test_parse_with_fallback_roots() {
        let toml_text = r#"
[cache]
primary_root = "/var/cache/bundlekit"
fallback_roots = ["/mnt/shared/bundles", "/mnt/archive/bundles"]

[store]
root = "/srv/bundle-store"
"#;
        let config: Config = toml::from_str(toml_text).unwrap();
        let roots = config.cache_roots();
        assert_eq!(roots.primary(), PathBuf::from("/var/cache/bundlekit").as_path());
        assert_eq!(roots.fallbacks().len(), 2);
        assert_eq!(config.store().root(), PathBuf::from("/srv/bundle-store").as_path());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[cache]\nprimary_root = \"/tmp/c\"\n").unwrap();
        assert_eq!(config.cache.primary_root, "/tmp/c");
        assert_eq!(config.store.root, "~/.bundlekit/store");
    }
}
