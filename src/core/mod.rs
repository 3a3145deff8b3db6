//! Core data structures for appdesc.
//!
//! This module contains the descriptor model:
//! - Application identity and platform targeting
//! - Plugin activations and their apply order
//! - Dependency bindings and platform (BoM) version inheritance
//! - Build variants, compile options and signing identities

pub mod compile;
pub mod dependency;
pub mod descriptor;
pub mod identity;
pub mod plugin;
pub mod signing;
pub mod variant;

pub use compile::{CompileOptions, JavaVersion};
pub use dependency::{Configuration, Coordinate, DependencyBinding, VersionSource};
pub use descriptor::{
    find_descriptor, ApplicationDescriptor, Descriptor, DescriptorError, DocumentFormat,
    FrameworkBinding, RawDocument, DESCRIPTOR_JSON_NAME, DESCRIPTOR_NAME,
};
pub use identity::ApplicationId;
pub use plugin::PluginActivation;
pub use signing::{SigningIdentity, SigningStore};
pub use variant::BuildVariantPolicy;
