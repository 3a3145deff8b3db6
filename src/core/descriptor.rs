//! Application descriptor schema.
//!
//! [`RawDocument`] is the document exactly as written (`App.toml` or
//! `App.json`); [`Descriptor`] is the validated, normalized, immutable
//! result the build tool consumes. Only the loader creates a
//! `Descriptor`, so holding one means every invariant has been checked.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::compile::{CompileOptions, RawCompileOptions};
use crate::core::dependency::{
    effective_version, platforms_by_namespace, DependencyBinding, DependencySpec, VersionSource,
};
use crate::core::identity::ApplicationId;
use crate::core::plugin::{PluginActivation, PluginSpec};
use crate::core::variant::{BuildVariantPolicy, RawVariant};

/// Canonical descriptor file name.
pub const DESCRIPTOR_NAME: &str = "App.toml";

/// JSON descriptor file name.
pub const DESCRIPTOR_JSON_NAME: &str = "App.json";

/// Failure to locate a descriptor file.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("could not find `App.toml` or `App.json` in `{}` or any parent directory", dir.display())]
    NotFound { dir: PathBuf },

    #[error("both `{}` and `{}` exist; remove one", toml.display(), json.display())]
    Ambiguous { toml: PathBuf, json: PathBuf },
}

/// Find the descriptor in a single directory.
pub fn find_descriptor(dir: &Path) -> Result<PathBuf, DescriptorError> {
    let toml = dir.join(DESCRIPTOR_NAME);
    let json = dir.join(DESCRIPTOR_JSON_NAME);
    match (toml.is_file(), json.is_file()) {
        (true, true) => Err(DescriptorError::Ambiguous { toml, json }),
        (true, false) => Ok(toml),
        (false, true) => Ok(json),
        (false, false) => Err(DescriptorError::NotFound {
            dir: dir.to_path_buf(),
        }),
    }
}

/// Serialization format of a descriptor document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    #[default]
    Toml,
    Json,
}

impl DocumentFormat {
    /// Pick the format from a file extension; anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Toml,
        }
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "toml" => Ok(DocumentFormat::Toml),
            "json" => Ok(DocumentFormat::Json),
            _ => Err(format!("invalid format '{}'; expected 'toml' or 'json'", s)),
        }
    }
}

/// The cross-platform UI framework the build is wired to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FrameworkBinding {
    /// Framework name (`flutter`)
    pub name: String,

    /// Path to the framework project root, relative to the descriptor
    pub source: String,
}

/// Descriptor document as written.
///
/// Scalar fields are optional here so that configured defaults can fill
/// them in before validation; the loader reports any still missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawDocument {
    /// Reverse-domain application identity
    #[serde(default, alias = "applicationId", skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    /// Code namespace (defaults to the application id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Monotonic build counter
    #[serde(default, alias = "versionCode", skip_serializing_if = "Option::is_none")]
    pub version_code: Option<i64>,

    /// Display version
    #[serde(default, alias = "versionName", skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,

    #[serde(default, alias = "minSdk", alias = "minSdkVersion", skip_serializing_if = "Option::is_none")]
    pub min_sdk: Option<i64>,

    #[serde(default, alias = "targetSdk", alias = "targetSdkVersion", skip_serializing_if = "Option::is_none")]
    pub target_sdk: Option<i64>,

    #[serde(default, alias = "compileSdk", alias = "compileSdkVersion", skip_serializing_if = "Option::is_none")]
    pub compile_sdk: Option<i64>,

    #[serde(default, alias = "multiDexEnabled", skip_serializing_if = "Option::is_none")]
    pub multidex: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<RawCompileOptions>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, RawVariant>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<FrameworkBinding>,
}

/// Identity and platform targeting of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    pub(crate) application_id: ApplicationId,
    pub(crate) namespace: ApplicationId,
    pub(crate) min_platform_version: u32,
    pub(crate) target_platform_version: u32,
    pub(crate) compile_platform_version: Option<u32>,
    pub(crate) version_code: u32,
    pub(crate) version_name: String,
    pub(crate) multidex: bool,
}

impl ApplicationDescriptor {
    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    pub fn namespace(&self) -> &ApplicationId {
        &self.namespace
    }

    pub fn min_platform_version(&self) -> u32 {
        self.min_platform_version
    }

    pub fn target_platform_version(&self) -> u32 {
        self.target_platform_version
    }

    /// Compile SDK level, when declared.
    pub fn compile_platform_version(&self) -> Option<u32> {
        self.compile_platform_version
    }

    pub fn version_code(&self) -> u32 {
        self.version_code
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    pub fn multidex(&self) -> bool {
        self.multidex
    }
}

/// The normalized, validated build configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub(crate) app: ApplicationDescriptor,
    /// In apply order
    pub(crate) plugins: Vec<PluginActivation>,
    /// In canonical order
    pub(crate) dependencies: Vec<DependencyBinding>,
    pub(crate) variants: BTreeMap<String, BuildVariantPolicy>,
    pub(crate) compile: CompileOptions,
    pub(crate) framework: Option<FrameworkBinding>,
}

impl Descriptor {
    /// Application identity and platform targeting.
    pub fn app(&self) -> &ApplicationDescriptor {
        &self.app
    }

    /// Plugin activations in the order they must be applied.
    pub fn plugins(&self) -> &[PluginActivation] {
        &self.plugins
    }

    /// Get a plugin activation by name.
    pub fn plugin(&self, name: &str) -> Option<&PluginActivation> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// Dependency bindings in canonical order.
    pub fn dependencies(&self) -> &[DependencyBinding] {
        &self.dependencies
    }

    /// Every binding paired with where its version comes from.
    pub fn effective_versions(&self) -> Vec<(&DependencyBinding, VersionSource<'_>)> {
        let platforms = platforms_by_namespace(&self.dependencies);
        self.dependencies
            .iter()
            .map(|b| (b, effective_version(b, &platforms)))
            .collect()
    }

    /// Build variants by name.
    pub fn variants(&self) -> &BTreeMap<String, BuildVariantPolicy> {
        &self.variants
    }

    /// Get a variant by name.
    pub fn variant(&self, name: &str) -> Option<&BuildVariantPolicy> {
        self.variants.get(name)
    }

    pub fn compile_options(&self) -> &CompileOptions {
        &self.compile
    }

    pub fn framework(&self) -> Option<&FrameworkBinding> {
        self.framework.as_ref()
    }

    /// Canonical document form.
    ///
    /// Every optional value the loader resolved (namespace, multidex) is
    /// written out explicitly so the result loads to the same descriptor
    /// without any configured defaults.
    pub fn to_document(&self) -> RawDocument {
        RawDocument {
            application_id: Some(self.app.application_id.to_string()),
            namespace: Some(self.app.namespace.to_string()),
            version_code: Some(i64::from(self.app.version_code)),
            version_name: Some(self.app.version_name.clone()),
            min_sdk: Some(i64::from(self.app.min_platform_version)),
            target_sdk: Some(i64::from(self.app.target_platform_version)),
            compile_sdk: self.app.compile_platform_version.map(i64::from),
            multidex: Some(self.app.multidex),
            plugins: self.plugins.iter().map(PluginActivation::to_spec).collect(),
            dependencies: self
                .dependencies
                .iter()
                .map(DependencyBinding::to_spec)
                .collect(),
            compile: self.compile.to_raw(),
            variants: self
                .variants
                .iter()
                .map(|(name, policy)| (name.clone(), policy.to_raw()))
                .collect(),
            framework: self.framework.clone(),
        }
    }
}
