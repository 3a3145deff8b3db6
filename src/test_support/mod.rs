//! Test utilities for appdesc unit tests.
//!
//! Provides descriptor documents covering the valid and invalid shapes
//! the loader has to handle, and a project fixture that lays them out on
//! disk next to a signing store and project config.
//!
//! # Example
//!
//! ```rust,ignore
//! use appdesc::test_support::{ProjectFixture, EXAMPLE_TOML};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let path = ProjectFixture::new(EXAMPLE_TOML).write_to(tmp.path()).unwrap();
//!     // Load `path`...
//! }
//! ```

pub mod fixtures;

// Re-export fixtures for convenience
pub use fixtures::*;
