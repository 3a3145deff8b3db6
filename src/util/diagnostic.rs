//! Validation diagnostics.
//!
//! Every problem found while loading a descriptor becomes a [`Violation`].
//! Violations are aggregated into one [`ValidationError`] so that a single
//! run reports everything that needs fixing, not just the first problem.

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan,
    NamedSource, SourceCode, SourceSpan,
};
use serde::Serialize;
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no descriptor file is found.
    pub const NO_DESCRIPTOR: &str = "Run `appdesc init` to create an App.toml";

    /// Suggestion when both descriptor formats are present.
    pub const AMBIGUOUS_DESCRIPTOR: &str =
        "Keep either App.toml or App.json, or pass --manifest-path";

    /// Suggestion when a signing identity cannot be resolved.
    pub const UNKNOWN_IDENTITY: &str =
        "Declare the identity in signing.toml or pass `--identity <name>`";
}

/// The category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The document could not be parsed or lacks a required field.
    MalformedDocument,
    /// `min > target`, or `target > compile`.
    VersionRangeInvalid,
    /// Two plugin activations share a name.
    DuplicatePlugin,
    /// Two bindings share a `namespace:artifact` coordinate.
    DuplicateDependency,
    /// A variant references a signing identity nobody supplied.
    UnknownSigningIdentity,
    /// Application id or namespace is not a reverse-domain identifier.
    InvalidApplicationId,
    /// A scalar is out of range or empty.
    InvalidValue,
    /// A coordinate is not `namespace:artifact`.
    MalformedCoordinate,
    /// A binding has no version and no platform supplies one.
    UnversionedDependency,
    /// `after` names a plugin that is not activated.
    UnknownPluginReference,
    /// `after` constraints form a cycle.
    PluginCycle,
    /// Desugaring flag and desugaring library disagree.
    DesugaringMismatch,
    /// Kotlin JVM target differs from the Java target compatibility.
    JvmTargetMismatch,
}

impl ErrorKind {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MalformedDocument => "appdesc::malformed_document",
            ErrorKind::VersionRangeInvalid => "appdesc::version_range_invalid",
            ErrorKind::DuplicatePlugin => "appdesc::duplicate_plugin",
            ErrorKind::DuplicateDependency => "appdesc::duplicate_dependency",
            ErrorKind::UnknownSigningIdentity => "appdesc::unknown_signing_identity",
            ErrorKind::InvalidApplicationId => "appdesc::invalid_application_id",
            ErrorKind::InvalidValue => "appdesc::invalid_value",
            ErrorKind::MalformedCoordinate => "appdesc::malformed_coordinate",
            ErrorKind::UnversionedDependency => "appdesc::unversioned_dependency",
            ErrorKind::UnknownPluginReference => "appdesc::unknown_plugin_reference",
            ErrorKind::PluginCycle => "appdesc::plugin_cycle",
            ErrorKind::DesugaringMismatch => "appdesc::desugaring_mismatch",
            ErrorKind::JvmTargetMismatch => "appdesc::jvm_target_mismatch",
        }
    }

    /// Whether no further validation is attempted after this kind.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ErrorKind::MalformedDocument)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::MalformedDocument => "malformed document",
            ErrorKind::VersionRangeInvalid => "invalid version range",
            ErrorKind::DuplicatePlugin => "duplicate plugin",
            ErrorKind::DuplicateDependency => "duplicate dependency",
            ErrorKind::UnknownSigningIdentity => "unknown signing identity",
            ErrorKind::InvalidApplicationId => "invalid application id",
            ErrorKind::InvalidValue => "invalid value",
            ErrorKind::MalformedCoordinate => "malformed coordinate",
            ErrorKind::UnversionedDependency => "unversioned dependency",
            ErrorKind::UnknownPluginReference => "unknown plugin reference",
            ErrorKind::PluginCycle => "plugin cycle",
            ErrorKind::DesugaringMismatch => "desugaring mismatch",
            ErrorKind::JvmTargetMismatch => "jvm target mismatch",
        };
        f.write_str(s)
    }
}

/// A single validation failure.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Violation {
    /// Failure category
    pub kind: ErrorKind,
    /// Dotted path of the offending field (`min-sdk`, `plugins[2]`)
    pub field: String,
    /// Human-readable description
    pub message: String,
    /// Optional fix suggestion
    pub help: Option<String>,
    src: Option<NamedSource<String>>,
    span: Option<SourceSpan>,
}

impl Violation {
    /// Create a new violation.
    pub fn new(kind: ErrorKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            kind,
            field: field.into(),
            message: message.into(),
            help: None,
            src: None,
            span: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach the document text and the byte range the parser pointed at.
    pub fn with_source(
        mut self,
        name: impl AsRef<str>,
        content: impl Into<String>,
        span: Option<Range<usize>>,
    ) -> Self {
        self.src = Some(NamedSource::new(name, content.into()));
        self.span = span.map(SourceSpan::from);
        self
    }

    /// Byte range inside the source document, when known.
    pub fn span(&self) -> Option<SourceSpan> {
        self.span
    }

    /// Machine-readable form used by `--message-format json`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind,
            "code": self.kind.code(),
            "field": self.field,
            "message": self.message,
            "help": self.help,
        })
    }
}

impl MietteDiagnostic for Violation {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.src.as_ref().map(|s| s as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.kind.to_string()),
            span,
        ))))
    }
}

/// Every violation found while loading one descriptor.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("descriptor `{origin}` is invalid ({} violation(s))", .violations.len())]
#[diagnostic(
    code(appdesc::validation_failed),
    help("Fix the listed violations and run `appdesc check` again")
)]
pub struct ValidationError {
    /// Where the document came from (file path or `<memory>`)
    pub origin: String,
    #[related]
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Wrap a non-empty list of violations.
    pub fn new(origin: impl Into<String>, violations: Vec<Violation>) -> Self {
        ValidationError {
            origin: origin.into(),
            violations,
        }
    }

    /// Check whether any violation has the given kind.
    pub fn has(&self, kind: ErrorKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// Number of violations of the given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }

    /// Distinct kinds present, in declaration order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        let mut kinds: Vec<_> = self.violations.iter().map(|v| v.kind).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// True when the document never made it past parsing.
    pub fn is_malformed(&self) -> bool {
        self.violations.iter().any(|v| v.kind.is_terminal())
    }
}

/// A terminal diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Build the terminal form of a validation violation.
    pub fn from_violation(violation: &Violation) -> Self {
        let mut diag = Diagnostic::error(format!("{}: {}", violation.kind, violation.message));
        if !violation.field.is_empty() {
            diag = diag.with_context(format!("field `{}`", violation.field));
        }
        if let Some(ref help) = violation.help {
            diag = diag.with_suggestion(help.clone());
        }
        diag
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let error = if color {
            "\x1b[1;31merror\x1b[0m"
        } else {
            "error"
        };

        output.push_str(&format!("{}: {}\n", error, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            if self.suggestions.len() == 1 {
                output.push_str(&format!("{}: {}\n", help_prefix, self.suggestions[0]));
            } else {
                output.push_str(&format!("{}: consider:\n", help_prefix));
                for (i, suggestion) in self.suggestions.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
                }
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Terminal form of a violation.
///
/// Violations that carry the document text are drawn with a snippet
/// pointing at the offending span.
pub fn render_violation(violation: &Violation, origin: &str, color: bool) -> String {
    if violation.src.is_some() {
        let theme = if color {
            GraphicalTheme::unicode()
        } else {
            GraphicalTheme::unicode_nocolor()
        };
        let mut out = String::new();
        if GraphicalReportHandler::new_themed(theme)
            .render_report(&mut out, violation)
            .is_ok()
        {
            return out;
        }
    }
    Diagnostic::from_violation(violation)
        .with_location(origin)
        .format(color)
}
