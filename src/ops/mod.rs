//! High-level operations.
//!
//! This module contains the implementation of appdesc commands.

pub mod init;
pub mod load;
pub mod normalize;
pub mod validate;

pub use init::{generate_descriptor, init_descriptor, InitOptions};
pub use load::{
    apply_defaults, load, load_file, load_from, load_str, parse_document, LoadOptions,
};
pub use normalize::{normalize, render};
