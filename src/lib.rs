//! appdesc - Loader for declarative Android application descriptors
//!
//! This crate parses an application descriptor (`App.toml` or `App.json`),
//! validates it against every consistency rule at once, and exposes the
//! normalized, immutable [`Descriptor`] a build tool consumes.

pub mod core;
pub mod ops;
pub mod util;

/// Test fixtures for appdesc unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use core::{
    descriptor::{Descriptor, DocumentFormat, RawDocument},
    signing::SigningStore,
};

pub use ops::{load, load_file, normalize, LoadOptions};
pub use util::context::GlobalContext;
pub use util::diagnostic::{ErrorKind, ValidationError, Violation};
