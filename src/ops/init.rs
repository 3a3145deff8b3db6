//! Implementation of `appdesc init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::descriptor::{DocumentFormat, DESCRIPTOR_JSON_NAME, DESCRIPTOR_NAME};
use crate::core::identity::ApplicationId;
use crate::ops::load::parse_document;
use crate::ops::normalize::render;

/// Options for creating a descriptor.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Application id; derived from the directory name when absent
    pub application_id: Option<String>,

    /// UI framework to wire in (`flutter`)
    pub framework: Option<String>,

    /// Document format to write
    pub format: DocumentFormat,
}

/// Gradle plugin id a framework ships.
fn framework_plugin(framework: &str) -> Option<&'static str> {
    match framework {
        "flutter" => Some("dev.flutter.flutter-gradle-plugin"),
        _ => None,
    }
}

/// Render a starter `App.toml`.
pub fn generate_descriptor(application_id: &ApplicationId, framework: Option<&str>) -> String {
    let mut plugins = String::from(
        r#"    "com.android.application",
    { name = "org.jetbrains.kotlin.android", after = ["com.android.application"] },
"#,
    );
    if let Some(plugin) = framework.and_then(framework_plugin) {
        plugins.push_str(&format!(
            "    {{ name = \"{}\", after = [\"com.android.application\", \"org.jetbrains.kotlin.android\"] }},\n",
            plugin
        ));
    }

    let mut content = format!(
        r#"application-id = "{id}"
namespace = "{id}"
version-code = 1
version-name = "1.0.0"
min-sdk = 21
target-sdk = 36
compile-sdk = 36
multidex = true

plugins = [
{plugins}]

[[dependencies]]
coordinate = "com.android.tools:desugar_jdk_libs"
version = "2.0.4"
configuration = "core-library-desugaring"

[compile]
source-compatibility = "11"
target-compatibility = "11"
jvm-target = "11"
core-library-desugaring = true

[variants.release]
# Signed with the debug identity until a release key is configured.
signing-ref = "debug"
"#,
        id = application_id,
        plugins = plugins
    );

    if let Some(framework) = framework {
        content.push_str(&format!(
            r#"
[framework]
name = "{}"
source = "../.."
"#,
            framework
        ));
    }

    content
}

/// Application id for a directory without one: `com.example.<dir>`.
pub fn default_application_id(dir: &Path) -> String {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app")
        .to_lowercase();
    let mut segment: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !segment.starts_with(|c: char| c.is_ascii_alphabetic()) {
        segment.insert_str(0, "app");
    }
    format!("com.example.{}", segment)
}

/// Write a starter descriptor into `path`, returning the file written.
pub fn init_descriptor(path: &Path, opts: &InitOptions) -> Result<PathBuf> {
    for name in [DESCRIPTOR_NAME, DESCRIPTOR_JSON_NAME] {
        if path.join(name).exists() {
            bail!("`{}` already exists in `{}`", name, path.display());
        }
    }

    let id = opts
        .application_id
        .clone()
        .unwrap_or_else(|| default_application_id(path));
    let application_id = ApplicationId::parse(&id)?;

    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }

    let toml = generate_descriptor(&application_id, opts.framework.as_deref());
    let (name, content) = match opts.format {
        DocumentFormat::Toml => (DESCRIPTOR_NAME, toml),
        DocumentFormat::Json => {
            let raw = parse_document(&toml, DESCRIPTOR_NAME, DocumentFormat::Toml)?;
            (DESCRIPTOR_JSON_NAME, render(&raw, DocumentFormat::Json)?)
        }
    };

    let descriptor_path = path.join(name);
    fs::write(&descriptor_path, content)
        .with_context(|| format!("failed to write {}", name))?;

    tracing::debug!("created {}", descriptor_path.display());
    Ok(descriptor_path)
}
