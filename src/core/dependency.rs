//! Dependency bindings.
//!
//! A binding names an external library by `namespace:artifact` and says
//! which version to use. Platform bindings (bills of materials) pin the
//! versions of every other artifact in their namespace, so those bindings
//! may omit a version of their own.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned for a coordinate that is not `namespace:artifact`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("`{0}` is not of the form `namespace:artifact`")]
    Shape(String),

    #[error("`{0}` has an empty namespace or artifact")]
    Empty(String),

    #[error("`{0}` contains whitespace")]
    Whitespace(String),
}

/// A `namespace:artifact` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    namespace: String,
    artifact: String,
}

impl Coordinate {
    /// Create a coordinate from its parts.
    pub fn new(namespace: impl Into<String>, artifact: impl Into<String>) -> Self {
        Coordinate {
            namespace: namespace.into(),
            artifact: artifact.into(),
        }
    }

    /// Get the namespace (Maven group).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the artifact name.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().any(char::is_whitespace) {
            return Err(CoordinateError::Whitespace(s.to_string()));
        }
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(artifact), None) => {
                if ns.is_empty() || artifact.is_empty() {
                    Err(CoordinateError::Empty(s.to_string()))
                } else {
                    Ok(Coordinate::new(ns, artifact))
                }
            }
            _ => Err(CoordinateError::Shape(s.to_string())),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.artifact)
    }
}

/// Which build configuration a binding is declared in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Configuration {
    #[default]
    Implementation,
    Api,
    #[serde(alias = "compileOnly")]
    CompileOnly,
    #[serde(alias = "runtimeOnly")]
    RuntimeOnly,
    #[serde(alias = "testImplementation")]
    TestImplementation,
    /// Backport library for newer Java APIs on old platform versions
    #[serde(alias = "coreLibraryDesugaring")]
    CoreLibraryDesugaring,
}

impl Configuration {
    /// Name as written in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Implementation => "implementation",
            Configuration::Api => "api",
            Configuration::CompileOnly => "compile-only",
            Configuration::RuntimeOnly => "runtime-only",
            Configuration::TestImplementation => "test-implementation",
            Configuration::CoreLibraryDesugaring => "core-library-desugaring",
        }
    }

    fn is_default(&self) -> bool {
        *self == Configuration::Implementation
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "implementation" => Ok(Configuration::Implementation),
            "api" => Ok(Configuration::Api),
            "compile-only" | "compileOnly" => Ok(Configuration::CompileOnly),
            "runtime-only" | "runtimeOnly" => Ok(Configuration::RuntimeOnly),
            "test-implementation" | "testImplementation" => Ok(Configuration::TestImplementation),
            "core-library-desugaring" | "coreLibraryDesugaring" => {
                Ok(Configuration::CoreLibraryDesugaring)
            }
            _ => Err(format!("unknown configuration `{}`", s)),
        }
    }
}

/// Dependency specification as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// Gradle notation: `"com.google.firebase:firebase-analytics:23.0.0"`
    Notation(String),

    /// Coordinate and version pair: `["com.vendor:messaging", "1.0"]`
    Pair(String, String),

    /// Detailed specification
    Detailed(DetailedDependencySpec),
}

/// Detailed dependency specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailedDependencySpec {
    /// `namespace:artifact`
    pub coordinate: String,

    /// Version constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Declaring configuration
    #[serde(default, skip_serializing_if = "Configuration::is_default")]
    pub configuration: Configuration,

    /// Bill-of-materials import
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub platform: bool,
}

impl DependencySpec {
    /// Expand Gradle notation into the detailed form.
    ///
    /// `group:artifact:version` splits off the version; anything else is
    /// kept whole as the coordinate so that coordinate validation reports it.
    pub fn to_detailed(&self) -> DetailedDependencySpec {
        match self {
            DependencySpec::Detailed(d) => d.clone(),
            DependencySpec::Pair(coordinate, version) => DetailedDependencySpec {
                coordinate: coordinate.clone(),
                version: Some(version.clone()),
                ..Default::default()
            },
            DependencySpec::Notation(s) => {
                let parts: Vec<&str> = s.split(':').collect();
                if parts.len() == 3 {
                    DetailedDependencySpec {
                        coordinate: format!("{}:{}", parts[0], parts[1]),
                        version: Some(parts[2].to_string()),
                        ..Default::default()
                    }
                } else {
                    DetailedDependencySpec {
                        coordinate: s.clone(),
                        ..Default::default()
                    }
                }
            }
        }
    }
}

/// An external library reference with a version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyBinding {
    coordinate: Coordinate,
    version: Option<String>,
    configuration: Configuration,
    platform: bool,
}

impl DependencyBinding {
    /// Create an `implementation` binding.
    pub fn new(coordinate: Coordinate, version: Option<String>) -> Self {
        DependencyBinding {
            coordinate,
            version,
            configuration: Configuration::Implementation,
            platform: false,
        }
    }

    /// Set the declaring configuration.
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Mark as a platform (bill-of-materials) import.
    pub fn platform(mut self, platform: bool) -> Self {
        self.platform = platform;
        self
    }

    /// Get the coordinate.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Get the declared version constraint.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Get the configuration.
    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    /// Check if this is a platform import.
    pub fn is_platform(&self) -> bool {
        self.platform
    }

    /// Canonical document form.
    pub fn to_spec(&self) -> DependencySpec {
        DependencySpec::Detailed(DetailedDependencySpec {
            coordinate: self.coordinate.to_string(),
            version: self.version.clone(),
            configuration: self.configuration,
            platform: self.platform,
        })
    }

    /// Sort key for canonical ordering.
    pub(crate) fn sort_key(&self) -> (Configuration, bool, &Coordinate) {
        (self.configuration, !self.platform, &self.coordinate)
    }
}

/// Where a binding's effective version comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource<'a> {
    /// Declared on the binding itself
    Declared(&'a str),

    /// Inherited from a platform binding in the same namespace
    Platform {
        platform: &'a Coordinate,
        version: &'a str,
    },

    /// Nothing supplies a version
    Missing,
}

impl fmt::Display for VersionSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSource::Declared(v) => write!(f, "{}", v),
            VersionSource::Platform { platform, version } => {
                write!(f, "{} (from {})", version, platform)
            }
            VersionSource::Missing => write!(f, "<unversioned>"),
        }
    }
}

/// Versioned platform bindings by namespace. The first platform per
/// namespace wins.
pub fn platforms_by_namespace(
    bindings: &[DependencyBinding],
) -> BTreeMap<&str, &DependencyBinding> {
    let mut map = BTreeMap::new();
    for binding in bindings.iter().filter(|b| b.is_platform() && b.version().is_some()) {
        map.entry(binding.coordinate().namespace()).or_insert(binding);
    }
    map
}

/// Resolve the effective version of one binding.
pub fn effective_version<'a>(
    binding: &'a DependencyBinding,
    platforms: &BTreeMap<&str, &'a DependencyBinding>,
) -> VersionSource<'a> {
    if let Some(v) = binding.version() {
        return VersionSource::Declared(v);
    }
    if binding.is_platform() {
        return VersionSource::Missing;
    }
    match platforms.get(binding.coordinate().namespace()) {
        Some(&platform) => VersionSource::Platform {
            platform: platform.coordinate(),
            version: platform.version().unwrap_or_default(),
        },
        None => VersionSource::Missing,
    }
}
