//! Build variants and their signing/override policy.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::identity::{ApplicationId, InvalidApplicationId};

static VARIANT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").expect("variant pattern is valid"));

/// Check that a variant name is usable as a Gradle build type.
pub fn is_valid_variant_name(name: &str) -> bool {
    VARIANT_NAME.is_match(name)
}

/// The built-in variant a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Debug,
    Release,
    Custom,
}

impl VariantKind {
    pub fn of(name: &str) -> Self {
        match name {
            "debug" => VariantKind::Debug,
            "release" => VariantKind::Release,
            _ => VariantKind::Custom,
        }
    }
}

/// Variant table as it appears in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawVariant {
    /// Name of the signing identity
    #[serde(default, alias = "signingRef", alias = "signingConfig", skip_serializing_if = "Option::is_none")]
    pub signing_ref: Option<String>,

    #[serde(default, alias = "isDebuggable", skip_serializing_if = "Option::is_none")]
    pub debuggable: Option<bool>,

    #[serde(default, alias = "isMinifyEnabled", skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    #[serde(default, alias = "applicationIdSuffix", skip_serializing_if = "Option::is_none")]
    pub application_id_suffix: Option<String>,

    #[serde(default, alias = "versionNameSuffix", skip_serializing_if = "Option::is_none")]
    pub version_name_suffix: Option<String>,
}

/// Signing and override policy for one build variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVariantPolicy {
    name: String,
    signing_ref: Option<String>,
    debuggable: Option<bool>,
    minify: Option<bool>,
    application_id_suffix: Option<String>,
    version_name_suffix: Option<String>,
}

impl BuildVariantPolicy {
    /// Create a policy with no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        BuildVariantPolicy {
            name: name.into(),
            signing_ref: None,
            debuggable: None,
            minify: None,
            application_id_suffix: None,
            version_name_suffix: None,
        }
    }

    pub(crate) fn from_raw(name: &str, raw: &RawVariant) -> Self {
        BuildVariantPolicy {
            name: name.to_string(),
            signing_ref: raw.signing_ref.clone(),
            debuggable: raw.debuggable,
            minify: raw.minify,
            application_id_suffix: raw.application_id_suffix.clone(),
            version_name_suffix: raw.version_name_suffix.clone(),
        }
    }

    /// Set the signing identity reference.
    pub fn with_signing_ref(mut self, signing_ref: impl Into<String>) -> Self {
        self.signing_ref = Some(signing_ref.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariantKind {
        VariantKind::of(&self.name)
    }

    pub fn signing_ref(&self) -> Option<&str> {
        self.signing_ref.as_deref()
    }

    /// Debuggable unless overridden; only the debug variant defaults to true.
    pub fn is_debuggable(&self) -> bool {
        self.debuggable
            .unwrap_or(self.kind() == VariantKind::Debug)
    }

    pub fn is_minified(&self) -> bool {
        self.minify.unwrap_or(false)
    }

    pub fn application_id_suffix(&self) -> Option<&str> {
        self.application_id_suffix.as_deref()
    }

    pub fn version_name_suffix(&self) -> Option<&str> {
        self.version_name_suffix.as_deref()
    }

    /// The application id this variant installs under.
    pub fn application_id(&self, base: &ApplicationId) -> Result<ApplicationId, InvalidApplicationId> {
        match self.application_id_suffix.as_deref() {
            Some(suffix) => base.with_suffix(suffix),
            None => Ok(base.clone()),
        }
    }

    /// The version name this variant reports.
    pub fn version_name(&self, base: &str) -> String {
        format!("{}{}", base, self.version_name_suffix.as_deref().unwrap_or(""))
    }

    /// Canonical document form.
    pub fn to_raw(&self) -> RawVariant {
        RawVariant {
            signing_ref: self.signing_ref.clone(),
            debuggable: self.debuggable,
            minify: self.minify,
            application_id_suffix: self.application_id_suffix.clone(),
            version_name_suffix: self.version_name_suffix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names() {
        assert!(is_valid_variant_name("debug"));
        assert!(is_valid_variant_name("staging2"));
        assert!(is_valid_variant_name("internalQa"));
        assert!(!is_valid_variant_name("Release"));
        assert!(!is_valid_variant_name("my-variant"));
        assert!(!is_valid_variant_name(""));
    }

    #[test]
    fn test_debuggable_defaults() {
        assert!(BuildVariantPolicy::new("debug").is_debuggable());
        assert!(!BuildVariantPolicy::new("release").is_debuggable());
        assert!(!BuildVariantPolicy::new("staging").is_debuggable());

        let raw = RawVariant {
            debuggable: Some(true),
            ..Default::default()
        };
        assert!(BuildVariantPolicy::from_raw("staging", &raw).is_debuggable());
    }

    #[test]
    fn test_overrides_apply() {
        let raw = RawVariant {
            application_id_suffix: Some(".debug".into()),
            version_name_suffix: Some("-dev".into()),
            ..Default::default()
        };
        let policy = BuildVariantPolicy::from_raw("debug", &raw);
        let base = ApplicationId::parse("com.example.smartdesk").unwrap();
        assert_eq!(policy.application_id(&base).unwrap().as_str(), "com.example.smartdesk.debug");
        assert_eq!(policy.version_name("1.0.0"), "1.0.0-dev");
        assert_eq!(policy.to_raw(), raw);
    }
}
