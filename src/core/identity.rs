//! Application identity.
//!
//! Android identifies an installed application by a reverse-domain
//! string (`com.example.smartdesk`). The same shape is used for the
//! code namespace that generated resources live in.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static REVERSE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$")
        .expect("reverse-domain pattern is valid")
});

/// Error returned when a string is not a reverse-domain identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a reverse-domain identifier (expected e.g. `com.example.app`)")]
pub struct InvalidApplicationId(pub String);

/// A validated reverse-domain application identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Parse and validate an identifier.
    pub fn parse(s: &str) -> Result<Self, InvalidApplicationId> {
        if REVERSE_DOMAIN.is_match(s) {
            Ok(ApplicationId(s.to_string()))
        } else {
            Err(InvalidApplicationId(s.to_string()))
        }
    }

    /// Append a variant suffix such as `.debug`.
    ///
    /// A suffix without a leading dot is joined with one.
    pub fn with_suffix(&self, suffix: &str) -> Result<Self, InvalidApplicationId> {
        let joined = if suffix.starts_with('.') {
            format!("{}{}", self.0, suffix)
        } else {
            format!("{}.{}", self.0, suffix)
        };
        ApplicationId::parse(&joined)
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl FromStr for ApplicationId {
    type Err = InvalidApplicationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationId::parse(s)
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = InvalidApplicationId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ApplicationId::parse(&s)
    }
}

impl From<ApplicationId> for String {
    fn from(id: ApplicationId) -> Self {
        id.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
