//! Loading descriptors.
//!
//! Loading is `parse -> apply defaults -> validate`. Parse failures and
//! missing required fields are terminal; every other rule runs and all of
//! its violations are reported together.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::descriptor::{Descriptor, DocumentFormat, RawDocument};
use crate::core::signing::SigningStore;
use crate::ops::validate::validate;
use crate::util::config::DescriptorDefaults;
use crate::util::diagnostic::{ErrorKind, ValidationError, Violation};

/// Origin reported for documents that did not come from a file.
pub const MEMORY_ORIGIN: &str = "<memory>";

/// Options for loading a descriptor file.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Values filled into fields the document omits
    pub defaults: DescriptorDefaults,

    /// Identities variant signing references may name
    pub identities: SigningStore,
}

/// Parse document text without validating it.
pub fn parse_document(
    content: &str,
    origin: &str,
    format: DocumentFormat,
) -> Result<RawDocument, ValidationError> {
    let result = match format {
        DocumentFormat::Toml => toml::from_str::<RawDocument>(content)
            .map_err(|e| (e.message().to_string(), e.span())),
        DocumentFormat::Json => serde_json::from_str::<RawDocument>(content).map_err(|e| {
            let offset = byte_offset(content, e.line(), e.column());
            (e.to_string(), offset.map(|o| o..o))
        }),
    };

    result.map_err(|(message, span)| {
        tracing::debug!("failed to parse {}: {}", origin, message);
        let violation = Violation::new(ErrorKind::MalformedDocument, "", message)
            .with_source(origin, content, span);
        ValidationError::new(origin, vec![violation])
    })
}

/// Convert serde_json's 1-based line and column into a byte offset.
fn byte_offset(content: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let start: usize = content
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((start + column.saturating_sub(1)).min(content.len()))
}

/// Fill fields the document omits from configured defaults.
///
/// Values written in the document always win.
pub fn apply_defaults(raw: &mut RawDocument, defaults: &DescriptorDefaults) {
    if raw.min_sdk.is_none() {
        raw.min_sdk = defaults.min_sdk;
    }
    if raw.target_sdk.is_none() {
        raw.target_sdk = defaults.target_sdk;
    }
    if raw.compile_sdk.is_none() {
        raw.compile_sdk = defaults.compile_sdk;
    }
    if raw.version_code.is_none() {
        raw.version_code = defaults.version_code;
    }
    if raw.version_name.is_none() {
        raw.version_name = defaults.version_name.clone();
    }
}

/// Validate a parsed document and build the descriptor.
pub fn load(raw: &RawDocument, identities: &SigningStore) -> Result<Descriptor, ValidationError> {
    load_from(raw, identities, MEMORY_ORIGIN)
}

/// Like [`load`], naming the document's origin in errors.
pub fn load_from(
    raw: &RawDocument,
    identities: &SigningStore,
    origin: &str,
) -> Result<Descriptor, ValidationError> {
    match validate(raw, identities) {
        Ok(descriptor) => {
            tracing::debug!(
                "loaded {} ({} plugins, {} dependencies, {} variants)",
                descriptor.app().application_id(),
                descriptor.plugins().len(),
                descriptor.dependencies().len(),
                descriptor.variants().len()
            );
            Ok(descriptor)
        }
        Err(violations) => {
            tracing::debug!("{} has {} violation(s)", origin, violations.len());
            Err(ValidationError::new(origin, violations))
        }
    }
}

/// Parse and validate document text.
pub fn load_str(
    content: &str,
    origin: &str,
    format: DocumentFormat,
    opts: &LoadOptions,
) -> Result<Descriptor, ValidationError> {
    let mut raw = parse_document(content, origin, format)?;
    apply_defaults(&mut raw, &opts.defaults);
    load_from(&raw, &opts.identities, origin)
}

/// Read a document file, in the format its extension names.
pub fn read_document(path: &Path) -> Result<(String, DocumentFormat)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read descriptor: {}", path.display()))?;
    Ok((content, DocumentFormat::from_path(path)))
}

/// Load a descriptor file.
///
/// A [`ValidationError`] is returned inside the `anyhow::Error` and can be
/// recovered with `downcast_ref`.
pub fn load_file(path: &Path, opts: &LoadOptions) -> Result<Descriptor> {
    let (content, format) = read_document(path)?;
    tracing::debug!("loading {} as {:?}", path.display(), format);
    let descriptor = load_str(&content, &path.display().to_string(), format, opts)?;
    Ok(descriptor)
}

/// Directory a descriptor's relative paths are resolved against.
pub fn descriptor_root(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
