//! Descriptor validation rules.
//!
//! Validation runs in two phases. The structural phase checks that every
//! required field is present and stops if any is missing. The semantic
//! phase then runs every rule and collects all violations before
//! deciding whether a [`Descriptor`] can be built.

use std::collections::{BTreeMap, HashSet};

use crate::core::compile::{CompileOptions, JavaVersion, RawCompileOptions};
use crate::core::dependency::{
    effective_version, platforms_by_namespace, Configuration, Coordinate, DependencyBinding,
    VersionSource,
};
use crate::core::descriptor::{ApplicationDescriptor, Descriptor, FrameworkBinding, RawDocument};
use crate::core::identity::ApplicationId;
use crate::core::plugin::{apply_order, OrderError, PluginActivation};
use crate::core::signing::{SigningStore, DEBUG_IDENTITY};
use crate::core::variant::{is_valid_variant_name, BuildVariantPolicy, VariantKind};
use crate::util::diagnostic::{suggestions, ErrorKind, Violation};

/// Version code used when neither the document nor the config sets one.
pub const DEFAULT_VERSION_CODE: i64 = 1;

/// Version name used when neither the document nor the config sets one.
pub const DEFAULT_VERSION_NAME: &str = "1.0";

/// Required scalar fields, after defaults have been merged.
struct Required<'a> {
    application_id: &'a str,
    min_sdk: i64,
    target_sdk: i64,
}

/// Check required fields. Missing ones are structural failures.
fn required(raw: &RawDocument) -> Result<Required<'_>, Vec<Violation>> {
    let mut missing = Vec::new();
    let mut need = |present: bool, field: &str| {
        if !present {
            missing.push(
                Violation::new(
                    ErrorKind::MalformedDocument,
                    field,
                    format!("missing required field `{}`", field),
                )
                .with_help(format!(
                    "Add `{}` to the descriptor or set it under [defaults] in .appdesc/config.toml",
                    field
                )),
            );
        }
    };
    need(raw.application_id.is_some(), "application-id");
    need(raw.min_sdk.is_some(), "min-sdk");
    need(raw.target_sdk.is_some(), "target-sdk");

    match (raw.application_id.as_deref(), raw.min_sdk, raw.target_sdk) {
        (Some(application_id), Some(min_sdk), Some(target_sdk)) => Ok(Required {
            application_id,
            min_sdk,
            target_sdk,
        }),
        _ => Err(missing),
    }
}

/// Validate a document against the known signing identities.
pub fn validate(raw: &RawDocument, identities: &SigningStore) -> Result<Descriptor, Vec<Violation>> {
    validate_with_warnings(raw, identities, &mut Vec::new())
}

/// Like [`validate`], also collecting the non-fatal findings that are
/// logged as warnings.
pub fn validate_with_warnings(
    raw: &RawDocument,
    identities: &SigningStore,
    warnings: &mut Vec<String>,
) -> Result<Descriptor, Vec<Violation>> {
    let req = required(raw)?;
    let mut v = Validator {
        identities,
        violations: Vec::new(),
        warnings,
    };

    let application_id = v.application_id("application-id", req.application_id);
    let namespace = v.application_id("namespace", raw.namespace.as_deref().unwrap_or(req.application_id));

    let version_code = v.positive(
        "version-code",
        raw.version_code.unwrap_or(DEFAULT_VERSION_CODE),
    );
    let min = v.positive("min-sdk", req.min_sdk);
    let target = v.positive("target-sdk", req.target_sdk);
    let compile = raw.compile_sdk.and_then(|c| v.positive("compile-sdk", c));
    v.version_range(min, target, compile);

    let declared_name = raw.version_name.as_deref().map(str::trim);
    let version_name = declared_name.unwrap_or(DEFAULT_VERSION_NAME);
    if version_name.is_empty() {
        v.push(Violation::new(ErrorKind::InvalidValue, "version-name", "version name is empty"));
    } else if declared_name.is_some() && semver::Version::parse(version_name).is_err() {
        v.warn(format!("version name `{}` is not a semantic version", version_name));
    }

    let plugins = v.plugins(raw);
    let dependencies = v.dependencies(raw);
    let compile_options = v.compile_options(raw.compile.as_ref(), &dependencies);
    let variants = v.variants(raw, application_id.as_ref());
    v.framework(raw.framework.as_ref());

    if !v.violations.is_empty() {
        return Err(v.violations);
    }

    // Every field parsed when no violation was recorded.
    let (Some(application_id), Some(namespace), Some(version_code), Some(min), Some(target)) =
        (application_id, namespace, version_code, min, target)
    else {
        unreachable!("validated fields are present when no violation was recorded")
    };

    let mut dependencies = dependencies;
    dependencies.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    Ok(Descriptor {
        app: ApplicationDescriptor {
            application_id,
            namespace,
            min_platform_version: min,
            target_platform_version: target,
            compile_platform_version: compile,
            version_code,
            version_name: version_name.to_string(),
            multidex: raw.multidex.unwrap_or(false),
        },
        plugins,
        dependencies,
        variants,
        compile: compile_options,
        framework: raw.framework.clone(),
    })
}

struct Validator<'a> {
    identities: &'a SigningStore,
    violations: Vec<Violation>,
    warnings: &'a mut Vec<String>,
}

impl Validator<'_> {
    fn push(&mut self, violation: Violation) {
        tracing::debug!("{} at `{}`: {}", violation.kind, violation.field, violation.message);
        self.violations.push(violation);
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    fn application_id(&mut self, field: &str, value: &str) -> Option<ApplicationId> {
        match ApplicationId::parse(value) {
            Ok(id) => Some(id),
            Err(e) => {
                self.push(Violation::new(ErrorKind::InvalidApplicationId, field, e.to_string()));
                None
            }
        }
    }

    fn positive(&mut self, field: &str, value: i64) -> Option<u32> {
        match u32::try_from(value) {
            Ok(n) if n > 0 => Some(n),
            _ => {
                self.push(Violation::new(
                    ErrorKind::InvalidValue,
                    field,
                    format!("`{}` must be a positive integer, got {}", field, value),
                ));
                None
            }
        }
    }

    fn version_range(&mut self, min: Option<u32>, target: Option<u32>, compile: Option<u32>) {
        if let (Some(min), Some(target)) = (min, target) {
            if min > target {
                self.push(
                    Violation::new(
                        ErrorKind::VersionRangeInvalid,
                        "min-sdk",
                        format!("min-sdk {} is greater than target-sdk {}", min, target),
                    )
                    .with_help("Raise target-sdk or lower min-sdk"),
                );
            }
        }
        if let (Some(target), Some(compile)) = (target, compile) {
            if target > compile {
                self.push(
                    Violation::new(
                        ErrorKind::VersionRangeInvalid,
                        "target-sdk",
                        format!("target-sdk {} is greater than compile-sdk {}", target, compile),
                    )
                    .with_help("Compile against at least the targeted SDK"),
                );
            }
        }
    }

    /// Returns activations in apply order, or whatever parsed when
    /// violations were recorded.
    fn plugins(&mut self, raw: &RawDocument) -> Vec<PluginActivation> {
        let mut seen = HashSet::new();
        let mut activations = Vec::new();

        for (i, spec) in raw.plugins.iter().enumerate() {
            let field = format!("plugins[{}]", i);
            let name = spec.name();
            if name.trim().is_empty() {
                self.push(Violation::new(ErrorKind::InvalidValue, field, "plugin name is empty"));
                continue;
            }
            if name.trim() != name {
                self.push(
                    Violation::new(
                        ErrorKind::InvalidValue,
                        field,
                        format!("plugin name `{}` has surrounding whitespace", name),
                    )
                    .with_help(format!("Write it as `{}`", name.trim())),
                );
                continue;
            }
            if !seen.insert(name) {
                self.push(
                    Violation::new(
                        ErrorKind::DuplicatePlugin,
                        field,
                        format!("plugin `{}` is activated more than once", name),
                    )
                    .with_help("Remove the repeated activation"),
                );
                continue;
            }
            activations.push(spec.to_activation());
        }

        match apply_order(&activations) {
            Ok(order) => {
                let mut by_name: BTreeMap<String, PluginActivation> = activations
                    .into_iter()
                    .map(|a| (a.name().to_string(), a))
                    .collect();
                order
                    .iter()
                    .filter_map(|name| by_name.remove(name))
                    .collect()
            }
            Err(errors) => {
                for error in errors {
                    let violation = match error {
                        OrderError::UnknownReference { plugin, missing } => Violation::new(
                            ErrorKind::UnknownPluginReference,
                            format!("plugins.{}.after", plugin),
                            format!(
                                "plugin `{}` must be applied after `{}`, which is not activated",
                                plugin, missing
                            ),
                        )
                        .with_help(format!("Activate `{}` or drop it from `after`", missing)),
                        OrderError::Cycle { members } => Violation::new(
                            ErrorKind::PluginCycle,
                            "plugins",
                            format!(
                                "plugins wait on each other and cannot be ordered: {}",
                                members.join(", ")
                            ),
                        ),
                    };
                    self.push(violation);
                }
                activations
            }
        }
    }

    fn dependencies(&mut self, raw: &RawDocument) -> Vec<DependencyBinding> {
        let mut seen = HashSet::new();
        let mut bindings = Vec::new();

        for (i, spec) in raw.dependencies.iter().enumerate() {
            let field = format!("dependencies[{}]", i);
            let detailed = spec.to_detailed();

            let coordinate: Coordinate = match detailed.coordinate.parse() {
                Ok(c) => c,
                Err(e) => {
                    self.push(Violation::new(
                        ErrorKind::MalformedCoordinate,
                        field,
                        format!("{}", e),
                    ));
                    continue;
                }
            };

            if let Some(ref version) = detailed.version {
                if version.trim().is_empty() {
                    self.push(Violation::new(
                        ErrorKind::InvalidValue,
                        format!("{}.version", field),
                        format!("`{}` has an empty version constraint", coordinate),
                    ));
                }
            }

            if !seen.insert(coordinate.clone()) {
                self.push(
                    Violation::new(
                        ErrorKind::DuplicateDependency,
                        field,
                        format!("`{}` is bound more than once", coordinate),
                    )
                    .with_help("Keep a single binding per namespace:artifact"),
                );
                continue;
            }

            bindings.push(
                DependencyBinding::new(coordinate, detailed.version.clone())
                    .with_configuration(detailed.configuration)
                    .platform(detailed.platform),
            );
        }

        let platforms = platforms_by_namespace(&bindings);
        for binding in &bindings {
            if effective_version(binding, &platforms) != VersionSource::Missing {
                continue;
            }
            let message = if binding.is_platform() {
                format!("platform `{}` must declare a version", binding.coordinate())
            } else {
                format!(
                    "`{}` has no version and no platform in `{}` supplies one",
                    binding.coordinate(),
                    binding.coordinate().namespace()
                )
            };
            self.push(
                Violation::new(
                    ErrorKind::UnversionedDependency,
                    format!("dependencies.{}", binding.coordinate()),
                    message,
                )
                .with_help("Declare a version or import the vendor's platform (BoM)"),
            );
        }

        bindings
    }

    fn java_version(&mut self, field: &str, value: Option<&str>) -> Option<JavaVersion> {
        let value = value?;
        match value.parse() {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(Violation::new(ErrorKind::InvalidValue, field, format!("{}", e)));
                None
            }
        }
    }

    fn compile_options(
        &mut self,
        raw: Option<&RawCompileOptions>,
        bindings: &[DependencyBinding],
    ) -> CompileOptions {
        let default = RawCompileOptions::default();
        let raw = raw.unwrap_or(&default);

        let options = CompileOptions {
            source_compatibility: self.java_version(
                "compile.source-compatibility",
                raw.source_compatibility.as_deref(),
            ),
            target_compatibility: self.java_version(
                "compile.target-compatibility",
                raw.target_compatibility.as_deref(),
            ),
            jvm_target: self.java_version("compile.jvm-target", raw.jvm_target.as_deref()),
            core_library_desugaring: raw.core_library_desugaring.unwrap_or(false),
        };

        if let (Some(jvm), Some(target)) = (options.jvm_target, options.target_compatibility) {
            if jvm != target {
                self.push(
                    Violation::new(
                        ErrorKind::JvmTargetMismatch,
                        "compile.jvm-target",
                        format!(
                            "Kotlin jvm-target {} differs from Java target-compatibility {}",
                            jvm, target
                        ),
                    )
                    .with_help("Use the same Java version for both"),
                );
            }
        }

        let desugaring_lib = bindings
            .iter()
            .find(|b| b.configuration() == Configuration::CoreLibraryDesugaring);
        match (options.core_library_desugaring, desugaring_lib) {
            (true, None) => self.push(
                Violation::new(
                    ErrorKind::DesugaringMismatch,
                    "compile.core-library-desugaring",
                    "core library desugaring is enabled but no `core-library-desugaring` dependency is bound",
                )
                .with_help("Bind `com.android.tools:desugar_jdk_libs` with configuration = \"core-library-desugaring\""),
            ),
            (false, Some(lib)) => self.push(
                Violation::new(
                    ErrorKind::DesugaringMismatch,
                    "compile.core-library-desugaring",
                    format!(
                        "`{}` is bound for desugaring but core library desugaring is disabled",
                        lib.coordinate()
                    ),
                )
                .with_help("Set core-library-desugaring = true under [compile]"),
            ),
            _ => {}
        }

        options
    }

    fn variants(
        &mut self,
        raw: &RawDocument,
        application_id: Option<&ApplicationId>,
    ) -> BTreeMap<String, BuildVariantPolicy> {
        let mut variants = BTreeMap::new();

        for (name, raw_variant) in &raw.variants {
            let field = format!("variants.{}", name);
            if !is_valid_variant_name(name) {
                self.push(Violation::new(
                    ErrorKind::InvalidValue,
                    field.clone(),
                    format!("variant name `{}` must be lowerCamelCase", name),
                ));
            }

            let policy = BuildVariantPolicy::from_raw(name, raw_variant);

            if let Some(signing_ref) = policy.signing_ref() {
                if signing_ref.trim().is_empty() {
                    self.push(Violation::new(
                        ErrorKind::InvalidValue,
                        format!("{}.signing-ref", field),
                        "signing reference is empty",
                    ));
                } else if !self.identities.contains(signing_ref) {
                    self.push(
                        Violation::new(
                            ErrorKind::UnknownSigningIdentity,
                            format!("{}.signing-ref", field),
                            format!(
                                "variant `{}` is signed with `{}`, which is not a known signing identity",
                                name, signing_ref
                            ),
                        )
                        .with_help(suggestions::UNKNOWN_IDENTITY),
                    );
                } else if policy.kind() == VariantKind::Release && signing_ref == DEBUG_IDENTITY {
                    self.warn(format!("variant `{}` is signed with the debug identity", name));
                }
            }

            if let (Some(base), Some(_)) = (application_id, policy.application_id_suffix()) {
                if let Err(e) = policy.application_id(base) {
                    self.push(Violation::new(
                        ErrorKind::InvalidApplicationId,
                        format!("{}.application-id-suffix", field),
                        e.to_string(),
                    ));
                }
            }

            variants.insert(name.clone(), policy);
        }

        variants
    }

    fn framework(&mut self, framework: Option<&FrameworkBinding>) {
        let Some(framework) = framework else {
            return;
        };
        if framework.name.trim().is_empty() {
            self.push(Violation::new(ErrorKind::InvalidValue, "framework.name", "framework name is empty"));
        }
        if framework.source.trim().is_empty() {
            self.push(Violation::new(ErrorKind::InvalidValue, "framework.source", "framework source path is empty"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::plugin::PluginSpec;
    use crate::test_support::fixtures;

    fn kinds(violations: &[Violation]) -> Vec<ErrorKind> {
        violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_missing_fields_stop_validation() {
        let raw = RawDocument {
            application_id: Some("not an id".into()),
            ..Default::default()
        };
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.kind == ErrorKind::MalformedDocument));
        assert!(violations.iter().any(|v| v.field == "min-sdk"));
    }

    #[test]
    fn test_version_fallbacks() {
        let descriptor = validate(&fixtures::minimal_document(), &SigningStore::new()).unwrap();
        assert_eq!(descriptor.app().version_code(), 1);
        assert_eq!(descriptor.app().version_name(), "1.0");
    }

    #[test]
    fn test_non_positive_values() {
        let mut raw = fixtures::minimal_document();
        raw.version_code = Some(0);
        raw.min_sdk = Some(-3);
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(kinds(&violations), vec![ErrorKind::InvalidValue, ErrorKind::InvalidValue]);
    }

    #[test]
    fn test_target_above_compile() {
        let mut raw = fixtures::minimal_document();
        raw.target_sdk = Some(36);
        raw.compile_sdk = Some(35);
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(kinds(&violations), vec![ErrorKind::VersionRangeInvalid]);
        assert_eq!(violations[0].field, "target-sdk");
    }

    #[test]
    fn test_namespace_defaults_to_application_id() {
        let descriptor = validate(&fixtures::minimal_document(), &SigningStore::new()).unwrap();
        assert_eq!(descriptor.app().namespace(), descriptor.app().application_id());
    }

    #[test]
    fn test_invalid_namespace() {
        let mut raw = fixtures::minimal_document();
        raw.namespace = Some("smartdesk".into());
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(kinds(&violations), vec![ErrorKind::InvalidApplicationId]);
        assert_eq!(violations[0].field, "namespace");
    }

    #[test]
    fn test_plugin_order_violations() {
        let mut raw = fixtures::minimal_document();
        raw.plugins = vec![
            PluginSpec::Detailed(crate::core::plugin::DetailedPluginSpec {
                name: "kotlin".into(),
                after: vec!["android".into()],
            }),
            PluginSpec::Simple(" ".into()),
        ];
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(
            kinds(&violations),
            vec![ErrorKind::InvalidValue, ErrorKind::UnknownPluginReference]
        );
    }

    #[test]
    fn test_desugaring_both_directions() {
        let mut raw = fixtures::minimal_document();
        raw.compile = Some(RawCompileOptions {
            core_library_desugaring: Some(true),
            ..Default::default()
        });
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(kinds(&violations), vec![ErrorKind::DesugaringMismatch]);

        let mut raw = fixtures::minimal_document();
        raw.dependencies = vec![crate::core::dependency::DependencySpec::Detailed(
            crate::core::dependency::DetailedDependencySpec {
                coordinate: "com.android.tools:desugar_jdk_libs".into(),
                version: Some("2.0.4".into()),
                configuration: Configuration::CoreLibraryDesugaring,
                platform: false,
            },
        )];
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(kinds(&violations), vec![ErrorKind::DesugaringMismatch]);
    }

    #[test]
    fn test_jvm_target_mismatch_and_bad_java_version() {
        let mut raw = fixtures::minimal_document();
        raw.compile = Some(RawCompileOptions {
            source_compatibility: Some("eleven".into()),
            target_compatibility: Some("VERSION_11".into()),
            jvm_target: Some("17".into()),
            core_library_desugaring: None,
        });
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(
            kinds(&violations),
            vec![ErrorKind::InvalidValue, ErrorKind::JvmTargetMismatch]
        );
    }

    #[test]
    fn test_variant_checks() {
        let mut raw = fixtures::minimal_document();
        raw.variants.insert(
            "Staging".into(),
            crate::core::variant::RawVariant {
                signing_ref: Some("upload".into()),
                application_id_suffix: Some(".9".into()),
                ..Default::default()
            },
        );
        let violations = validate(&raw, &SigningStore::from_names(["debug"])).unwrap_err();
        assert_eq!(
            kinds(&violations),
            vec![
                ErrorKind::InvalidValue,
                ErrorKind::UnknownSigningIdentity,
                ErrorKind::InvalidApplicationId
            ]
        );
        assert_eq!(violations[1].field, "variants.Staging.signing-ref");
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let raw = crate::ops::load::parse_document(
            fixtures::EXAMPLE_TOML,
            "App.toml",
            crate::core::descriptor::DocumentFormat::Toml,
        )
        .unwrap();
        let mut warnings = Vec::new();
        validate_with_warnings(&raw, &SigningStore::from_names(["debug"]), &mut warnings).unwrap();
        assert_eq!(warnings, vec!["variant `release` is signed with the debug identity"]);

        let mut raw = fixtures::minimal_document();
        raw.version_name = Some("1.0-beta x".into());
        let mut warnings = Vec::new();
        let descriptor = validate_with_warnings(&raw, &SigningStore::new(), &mut warnings).unwrap();
        assert_eq!(descriptor.app().version_name(), "1.0-beta x");
        assert_eq!(warnings, vec!["version name `1.0-beta x` is not a semantic version"]);
    }

    #[test]
    fn test_fallback_version_name_is_not_reported() {
        let mut warnings = Vec::new();
        validate_with_warnings(&fixtures::minimal_document(), &SigningStore::new(), &mut warnings)
            .unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_plugin_name_with_surrounding_whitespace() {
        let mut raw = fixtures::minimal_document();
        raw.plugins = vec![PluginSpec::Simple("a".into()), PluginSpec::Simple(" a".into())];
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(kinds(&violations), vec![ErrorKind::InvalidValue]);
        assert_eq!(violations[0].field, "plugins[1]");
        assert_eq!(violations[0].help.as_deref(), Some("Write it as `a`"));
    }

    #[test]
    fn test_empty_framework_fields() {
        let mut raw = fixtures::minimal_document();
        raw.framework = Some(FrameworkBinding::default());
        let violations = validate(&raw, &SigningStore::new()).unwrap_err();
        assert_eq!(kinds(&violations), vec![ErrorKind::InvalidValue, ErrorKind::InvalidValue]);
    }
}
