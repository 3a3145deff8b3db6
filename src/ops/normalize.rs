//! Canonical descriptor rendering.
//!
//! A normalized document is what [`Descriptor::to_document`] produces:
//! defaults written out, plugins in apply order, dependencies in detailed
//! form and canonical order. Normalizing a normalized document is a no-op.

use anyhow::{Context, Result};
use toml_edit::{Array, DocumentMut};

use crate::core::descriptor::{Descriptor, DocumentFormat, RawDocument};
use crate::core::signing::SigningStore;
use crate::ops::load::load;
use crate::util::diagnostic::ValidationError;
use crate::util::hash::sha256_str;

/// Load a document and return its canonical form.
pub fn normalize(raw: &RawDocument, identities: &SigningStore) -> Result<RawDocument, ValidationError> {
    Ok(load(raw, identities)?.to_document())
}

/// Serialize a document.
///
/// TOML output puts each element of a top-level array on its own line and
/// keeps nested arrays (a plugin's `after` list) inline.
pub fn render(doc: &RawDocument, format: DocumentFormat) -> Result<String> {
    match format {
        DocumentFormat::Toml => {
            let text = toml::to_string(doc).with_context(|| "failed to serialize descriptor as TOML")?;
            let mut doc: DocumentMut = text
                .parse()
                .with_context(|| "failed to reformat descriptor TOML")?;
            for (_, item) in doc.as_table_mut().iter_mut() {
                if let Some(array) = item.as_array_mut() {
                    one_per_line(array);
                }
            }
            Ok(doc.to_string())
        }
        DocumentFormat::Json => serde_json::to_string_pretty(doc)
            .map(|s| s + "\n")
            .with_context(|| "failed to serialize descriptor as JSON"),
    }
}

fn one_per_line(array: &mut Array) {
    if array.is_empty() {
        return;
    }
    for value in array.iter_mut() {
        value.decor_mut().set_prefix("\n    ");
        value.decor_mut().set_suffix("");
    }
    array.set_trailing_comma(true);
    array.set_trailing("\n");
}

impl Descriptor {
    /// Render the canonical document.
    pub fn render(&self, format: DocumentFormat) -> Result<String> {
        render(&self.to_document(), format)
    }

    /// SHA-256 of the canonical TOML rendering.
    ///
    /// Two documents that load to the same descriptor share a fingerprint
    /// however they were written.
    pub fn fingerprint(&self) -> Result<String> {
        Ok(sha256_str(&self.render(DocumentFormat::Toml)?))
    }
}
