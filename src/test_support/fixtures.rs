//! Test fixtures for common test scenarios.
//!
//! This module provides pre-built descriptor documents and a project
//! fixture that writes them to disk for loader and CLI tests.

use std::path::{Path, PathBuf};

use crate::core::descriptor::{RawDocument, DESCRIPTOR_NAME};
use crate::core::signing::SIGNING_STORE_NAME;

/// Only the required fields.
pub const MINIMAL_TOML: &str = r#"application-id = "com.example.smartdesk"
min-sdk = 21
target-sdk = 36
"#;

/// Two vendor SDKs, release signed with the debug identity.
pub const EXAMPLE_TOML: &str = r#"application-id = "com.example.smartdesk"
min-sdk = 21
target-sdk = 36
plugins = ["messaging", "analytics"]
dependencies = [
    ["com.vendor:messaging", "1.0"],
    ["com.vendor:analytics", "1.0"],
]

[variants.release]
signing-ref = "debug"
"#;

/// [`EXAMPLE_TOML`] written as JSON with Gradle spellings.
pub const EXAMPLE_JSON: &str = r#"{
  "applicationId": "com.example.smartdesk",
  "minSdk": 21,
  "targetSdk": 36,
  "plugins": ["messaging", "analytics"],
  "dependencies": [
    ["com.vendor:messaging", "1.0"],
    ["com.vendor:analytics", "1.0"]
  ],
  "variants": {
    "release": { "signingRef": "debug" }
  }
}
"#;

/// A Flutter app with Firebase messaging and analytics.
pub const FULL_TOML: &str = r#"application-id = "com.example.smartdesk"
namespace = "com.example.smartdesk"
version-code = 3
version-name = "1.2.0"
min-sdk = 21
target-sdk = 36
compile-sdk = 36
multidex = true

plugins = [
    "com.android.application",
    { name = "org.jetbrains.kotlin.android", after = ["com.android.application"] },
    { name = "dev.flutter.flutter-gradle-plugin", after = ["com.android.application", "org.jetbrains.kotlin.android"] },
    { name = "com.google.gms.google-services", after = ["dev.flutter.flutter-gradle-plugin"] },
]

dependencies = [
    { coordinate = "com.google.firebase:firebase-bom", version = "34.3.0", platform = true },
    "com.google.firebase:firebase-messaging",
    "com.google.firebase:firebase-analytics",
    { coordinate = "com.android.tools:desugar_jdk_libs", version = "2.0.4", configuration = "core-library-desugaring" },
]

[compile]
source-compatibility = "VERSION_11"
target-compatibility = "VERSION_11"
jvm-target = "11"
core-library-desugaring = true

[variants.release]
signing-ref = "debug"

[framework]
name = "flutter"
source = "../.."
"#;

/// One violation each of six different kinds.
pub const MANY_VIOLATIONS_TOML: &str = r#"application-id = "com.example.smartdesk"
min-sdk = 30
target-sdk = 21
plugins = ["messaging", "messaging"]
dependencies = [
    "com.vendor:messaging:1.0",
    "com.vendor:messaging:1.1",
    "com.vendor-analytics",
]

[variants.release]
signing-ref = "upload"
application-id-suffix = ".2nd"
"#;

/// Signing store declaring an `upload` identity.
pub const SIGNING_TOML: &str = r#"[identities.upload]
store-file = "keys/upload.jks"
key-alias = "upload"
"#;

/// [`MINIMAL_TOML`] as a parsed document.
pub fn minimal_document() -> RawDocument {
    RawDocument {
        application_id: Some("com.example.smartdesk".into()),
        min_sdk: Some(21),
        target_sdk: Some(36),
        ..Default::default()
    }
}

/// Fixture for an Android app directory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Descriptor file name (`App.toml` or `App.json`).
    pub descriptor_name: String,
    /// Descriptor content.
    pub descriptor: String,
    /// signing.toml content, if any.
    pub signing: Option<String>,
    /// .appdesc/config.toml content, if any.
    pub config: Option<String>,
}

impl ProjectFixture {
    /// Create a fixture with an `App.toml`.
    pub fn new(descriptor: impl Into<String>) -> Self {
        ProjectFixture {
            descriptor_name: DESCRIPTOR_NAME.to_string(),
            descriptor: descriptor.into(),
            signing: None,
            config: None,
        }
    }

    /// Use a different descriptor file name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.descriptor_name = name.into();
        self
    }

    /// Add a signing store.
    pub fn with_signing(mut self, signing: impl Into<String>) -> Self {
        self.signing = Some(signing.into());
        self
    }

    /// Add a project config.
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Write the fixture to a directory, returning the descriptor path.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(base_path)?;

        let descriptor_path = base_path.join(&self.descriptor_name);
        std::fs::write(&descriptor_path, &self.descriptor)?;

        if let Some(signing) = &self.signing {
            std::fs::write(base_path.join(SIGNING_STORE_NAME), signing)?;
        }

        if let Some(config) = &self.config {
            let config_dir = base_path.join(".appdesc");
            std::fs::create_dir_all(&config_dir)?;
            std::fs::write(config_dir.join("config.toml"), config)?;
        }

        Ok(descriptor_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fixture_documents_parse() {
        for content in [MINIMAL_TOML, EXAMPLE_TOML, FULL_TOML, MANY_VIOLATIONS_TOML] {
            toml::from_str::<RawDocument>(content).unwrap();
        }
        serde_json::from_str::<RawDocument>(EXAMPLE_JSON).unwrap();
        assert_eq!(toml::from_str::<RawDocument>(MINIMAL_TOML).unwrap(), minimal_document());
    }

    #[test]
    fn test_project_fixture_write() {
        let tmp = TempDir::new().unwrap();
        let path = ProjectFixture::new(EXAMPLE_TOML)
            .with_signing(SIGNING_TOML)
            .with_config("[defaults]\nmin-sdk = 21\n")
            .write_to(tmp.path())
            .unwrap();

        assert_eq!(path, tmp.path().join("App.toml"));
        assert!(tmp.path().join("signing.toml").exists());
        assert!(tmp.path().join(".appdesc/config.toml").exists());
    }
}
