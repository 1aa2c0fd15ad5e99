//! Descriptor identities and their canonical URI form
//!
//! A bundle descriptor is identified by a flat string-to-string map. The
//! `"type"` key is required and selects the provider variant; every other key
//! is provider-specific and opaque to the resolution core. Identities have a
//! canonical, reversible string form used in configuration files:
//!
//! ```text
//! bkit:descriptor:store?name=maps-panel&version=v1.2.3
//! ```
//!
//! # Examples
//!
//! ```
//! use bundlekit::Identity;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = Identity::from_uri("bkit:descriptor:store?name=maps-panel&version=v1.2.3")?;
//! assert_eq!(identity.descriptor_type(), Some("store"));
//! assert_eq!(identity.get("name"), Some("maps-panel"));
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use std::collections::BTreeMap;
use tracing::warn;

/// URI scheme for descriptor identities
pub const DESCRIPTOR_URI_SCHEME: &str = "bkit";

/// Fixed path prefix between the scheme and the descriptor type
pub const DESCRIPTOR_URI_PREFIX: &str = "descriptor";

const DESCRIPTOR_URI_SEPARATOR: char = ':';

/// A descriptor identity: the key/value fields naming one versioned bundle
///
/// Equality is structural (same key/value set), not string-based, so two
/// identities are equal regardless of the field order they were built in.
///
/// # Examples
///
/// ```
/// use bundlekit::Identity;
///
/// let mut identity = Identity::new("store");
/// identity.insert("name", "maps-panel");
/// identity.insert("version", "v1.2.3");
///
/// assert_eq!(
///     identity.to_uri().unwrap(),
///     "bkit:descriptor:store?name=maps-panel&version=v1.2.3"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    fields: BTreeMap<String, String>,
}

impl Identity {
    /// Create an identity with the given descriptor type
    pub fn new(descriptor_type: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("type".to_string(), descriptor_type.to_string());
        Self { fields }
    }

    /// Build an identity from raw key/value pairs
    ///
    /// No validation is performed; use [`Identity::validate`] once the
    /// provider variant's key set is known.
    pub fn from_fields<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The provider variant this identity selects, if the `"type"` key is set
    pub fn descriptor_type(&self) -> Option<&str> {
        self.get("type")
    }

    /// Look up a field value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Set a field value, replacing any previous value
    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }

    /// Iterate over all fields in sorted key order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return a copy of this identity with its `version` field replaced
    ///
    /// Used when pinning a descriptor to a newly resolved version tag.
    pub fn with_version(&self, version: &str) -> Self {
        let mut identity = self.clone();
        identity.insert("version", version);
        identity
    }

    /// Parse a canonical descriptor URI into an identity
    ///
    /// The URI must use the `bkit` scheme and the two-segment
    /// `descriptor:<type>` path. Query parameters populate identity fields
    /// verbatim; no decoding or type coercion is applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDescriptor`] if the scheme or path prefix
    /// mismatch, a query chunk is not a `key=value` pair, or a query key
    /// repeats.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let (head, query) = match uri.split_once('?') {
            Some((head, query)) => (head, query),
            None => (uri, ""),
        };

        let mut segments = head.split(DESCRIPTOR_URI_SEPARATOR);
        let scheme = segments.next().unwrap_or_default();
        let prefix = segments.next();
        let descriptor_type = segments.next();

        if scheme != DESCRIPTOR_URI_SCHEME {
            return Err(Error::MalformedDescriptor(format!(
                "invalid uri '{}' - must begin with '{}'",
                uri, DESCRIPTOR_URI_SCHEME
            )));
        }

        let descriptor_type = match (prefix, descriptor_type, segments.next()) {
            (Some(DESCRIPTOR_URI_PREFIX), Some(ty), None) if !ty.is_empty() => ty,
            _ => {
                return Err(Error::MalformedDescriptor(format!(
                    "invalid uri '{}' - must begin with {}:{}",
                    uri, DESCRIPTOR_URI_SCHEME, DESCRIPTOR_URI_PREFIX
                )))
            }
        };

        let mut identity = Identity::new(descriptor_type);

        for chunk in query.split('&').filter(|c| !c.is_empty()) {
            let (key, value) = chunk.split_once('=').ok_or_else(|| {
                Error::MalformedDescriptor(format!(
                    "invalid uri '{}' - malformed parameter '{}'",
                    uri, chunk
                ))
            })?;

            if identity.fields.contains_key(key) {
                return Err(Error::MalformedDescriptor(format!(
                    "invalid uri '{}' - duplicate parameter '{}'",
                    uri, key
                )));
            }

            identity.fields.insert(key.to_string(), value.to_string());
        }

        Ok(identity)
    }

    /// Serialize this identity to its canonical URI form
    ///
    /// The `"type"` field becomes the path segment; all remaining fields are
    /// emitted as query parameters in sorted key order. Values are written
    /// verbatim, so the round trip holds whenever values are free of `&`
    /// and `=`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDescriptor`] if the `"type"` field is absent.
    pub fn to_uri(&self) -> Result<String> {
        let descriptor_type = self.descriptor_type().ok_or_else(|| {
            Error::MalformedDescriptor(format!(
                "cannot create uri from {:?} - missing type field",
                self.fields
            ))
        })?;

        let qs = self
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != "type")
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!(
            "{}{sep}{}{sep}{}?{}",
            DESCRIPTOR_URI_SCHEME,
            DESCRIPTOR_URI_PREFIX,
            descriptor_type,
            qs,
            sep = DESCRIPTOR_URI_SEPARATOR,
        ))
    }

    /// Check this identity against a provider variant's key set
    ///
    /// Missing required keys are an error. Keys outside the required and
    /// optional sets only produce a warning, so configuration data written
    /// for a newer release keeps resolving under an older one.
    pub fn validate(&self, required: &[&str], optional: &[&str]) -> Result<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| !self.fields.contains_key(*key))
            .collect();

        if !missing.is_empty() {
            return Err(Error::MalformedDescriptor(format!(
                "{:?} is missing required keys {:?}",
                self.fields, missing
            )));
        }

        let unsupported: Vec<&str> = self
            .fields
            .keys()
            .map(String::as_str)
            .filter(|key| *key != "type" && !required.contains(key) && !optional.contains(key))
            .collect();

        if !unsupported.is_empty() {
            warn!(
                "found unsupported parameters {:?} in {:?}; these will be ignored",
                unsupported, self.fields
            );
        }

        Ok(())
    }
}
