//! Java/Kotlin compile options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned for an unrecognized Java version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a Java version (expected e.g. `1.8`, `11`, `VERSION_17`)")]
pub struct InvalidJavaVersion(pub String);

/// A Java language level.
///
/// Accepts the spellings Gradle scripts use: `1.8`, `8`, `11`,
/// `VERSION_1_8`, `VERSION_11`. Displays as `1.8` up to Java 8 and as
/// the bare feature number afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JavaVersion(u8);

impl JavaVersion {
    /// Get the feature release number.
    pub fn feature(&self) -> u8 {
        self.0
    }
}

impl FromStr for JavaVersion {
    type Err = InvalidJavaVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidJavaVersion(s.to_string());
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("JavaVersion.")
            .unwrap_or(trimmed);
        let body = body.strip_prefix("VERSION_").map(|v| v.replace('_', ".")).unwrap_or_else(|| body.to_string());

        let feature = match body.strip_prefix("1.") {
            Some(legacy) => legacy.parse::<u8>().map_err(|_| err())?,
            None => body.parse::<u8>().map_err(|_| err())?,
        };
        if feature == 0 {
            return Err(err());
        }
        Ok(JavaVersion(feature))
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= 8 {
            write!(f, "1.{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Compile options as they appear in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawCompileOptions {
    #[serde(default, alias = "sourceCompatibility", skip_serializing_if = "Option::is_none")]
    pub source_compatibility: Option<String>,

    #[serde(default, alias = "targetCompatibility", skip_serializing_if = "Option::is_none")]
    pub target_compatibility: Option<String>,

    /// Kotlin `jvmTarget`
    #[serde(default, alias = "jvmTarget", skip_serializing_if = "Option::is_none")]
    pub jvm_target: Option<String>,

    #[serde(
        default,
        alias = "isCoreLibraryDesugaringEnabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub core_library_desugaring: Option<bool>,
}

impl RawCompileOptions {
    fn is_empty(&self) -> bool {
        *self == RawCompileOptions::default()
    }
}

/// Validated compile options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub source_compatibility: Option<JavaVersion>,
    pub target_compatibility: Option<JavaVersion>,
    pub jvm_target: Option<JavaVersion>,
    pub core_library_desugaring: bool,
}

impl CompileOptions {
    /// Canonical document form, or `None` when nothing is set.
    pub fn to_raw(&self) -> Option<RawCompileOptions> {
        let raw = RawCompileOptions {
            source_compatibility: self.source_compatibility.map(|v| v.to_string()),
            target_compatibility: self.target_compatibility.map(|v| v.to_string()),
            jvm_target: self.jvm_target.map(|v| v.to_string()),
            core_library_desugaring: self.core_library_desugaring.then_some(true),
        };
        (!raw.is_empty()).then_some(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_version_spellings() {
        for (input, feature) in [
            ("1.8", 8),
            ("8", 8),
            ("VERSION_1_8", 8),
            ("11", 11),
            ("VERSION_11", 11),
            ("JavaVersion.VERSION_17", 17),
        ] {
            assert_eq!(input.parse::<JavaVersion>().unwrap().feature(), feature, "{input}");
        }
    }

    #[test]
    fn test_java_version_rejects_garbage() {
        for input in ["", "eleven", "1.", "VERSION_", "0"] {
            assert!(input.parse::<JavaVersion>().is_err(), "{input:?}");
        }
    }

    #[test]
    fn test_java_version_display_is_canonical() {
        assert_eq!("VERSION_1_8".parse::<JavaVersion>().unwrap().to_string(), "1.8");
        assert_eq!("VERSION_11".parse::<JavaVersion>().unwrap().to_string(), "11");
    }

    #[test]
    fn test_to_raw_omits_empty() {
        assert!(CompileOptions::default().to_raw().is_none());
        let opts = CompileOptions {
            jvm_target: Some("11".parse().unwrap()),
            ..Default::default()
        };
        let raw = opts.to_raw().unwrap();
        assert_eq!(raw.jvm_target.as_deref(), Some("11"));
        assert!(raw.core_library_desugaring.is_none());
    }
}
