//! Signing identity store.
//!
//! The loader never touches key material. It only needs to know which
//! identity names exist so that variant `signing-ref`s can be checked.
//! Identities come from a `signing.toml` file:
//!
//! ```toml
//! [identities.upload]
//! store-file = "keys/upload.jks"
//! key-alias = "upload"
//! ```
//!
//! and from names supplied on the command line.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the identity Android tooling creates for every developer.
pub const DEBUG_IDENTITY: &str = "debug";

/// Default signing store file name.
pub const SIGNING_STORE_NAME: &str = "signing.toml";

/// A named credential used to sign the produced artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SigningIdentity {
    #[serde(skip)]
    pub name: String,

    /// Keystore location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,

    /// Key alias inside the keystore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,
}

impl SigningIdentity {
    /// An identity known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        SigningIdentity {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSigningStore {
    #[serde(default)]
    identities: BTreeMap<String, SigningIdentity>,
}

/// The set of known signing identities.
#[derive(Debug, Clone, Default)]
pub struct SigningStore {
    identities: BTreeMap<String, SigningIdentity>,
}

impl SigningStore {
    /// Create an empty store.
    pub fn new() -> Self {
        SigningStore::default()
    }

    /// Create a store from bare identity names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = SigningStore::new();
        for name in names {
            store.insert(SigningIdentity::named(name));
        }
        store
    }

    /// Load a store from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read signing store: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to parse signing store: {}", path.display()))
    }

    /// Parse store content.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawSigningStore = toml::from_str(content)?;
        let mut store = SigningStore::new();
        for (name, mut identity) in raw.identities {
            identity.name = name;
            store.insert(identity);
        }
        Ok(store)
    }

    /// Add an identity, replacing one with the same name.
    pub fn insert(&mut self, identity: SigningIdentity) {
        self.identities.insert(identity.name.clone(), identity);
    }

    /// Merge another store into this one (other takes precedence).
    pub fn merge(&mut self, other: SigningStore) {
        self.identities.extend(other.identities);
    }

    /// Check whether an identity name resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.identities.contains_key(name)
    }

    /// Look up an identity.
    pub fn get(&self, name: &str) -> Option<&SigningIdentity> {
        self.identities.get(name)
    }

    /// Known names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.identities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_store() {
        let store = SigningStore::parse(
            r#"
[identities.upload]
store-file = "keys/upload.jks"
key-alias = "upload"

[identities.debug]
"#,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["debug", "upload"]);
        let upload = store.get("upload").unwrap();
        assert_eq!(upload.name, "upload");
        assert_eq!(upload.store_file.as_deref(), Some(Path::new("keys/upload.jks")));
        assert_eq!(upload.key_alias.as_deref(), Some("upload"));
    }

    #[test]
    fn test_from_names_and_merge() {
        let mut store = SigningStore::from_names(["debug"]);
        assert!(store.contains("debug"));
        assert!(!store.contains("release"));

        store.merge(SigningStore::from_names(["release"]));
        assert!(store.contains("release"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = SigningStore::load(&tmp.path().join("signing.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read signing store"));
    }

    #[test]
    fn test_load_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("signing.toml");
        std::fs::write(&path, "[identities.upload\n").unwrap();
        let err = SigningStore::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse signing store"));
    }
}
