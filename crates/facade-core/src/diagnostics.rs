//! Non-fatal diagnostics collected during a generation run.
//!
//! A run degrades instead of failing: a missing subpackage or an endpoint
//! module that cannot be loaded is recorded here and the remaining output is
//! still produced. Each diagnostic is also emitted as a `tracing` warning at
//! the moment it is recorded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A subpackage such as `api`, `models` or `types` is absent
    MissingSubpackage,
    /// The host package itself is absent
    PackageNotFound,
    /// An endpoint module could not be read or parsed
    EndpointImportFailure,
}

impl DiagnosticKind {
    /// Returns the snake-case name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingSubpackage => "missing_subpackage",
            Self::PackageNotFound => "package_not_found",
            Self::EndpointImportFailure => "endpoint_import_failure",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded problem.
///
/// # Examples
///
/// ```
/// use facade_core::{Diagnostic, DiagnosticKind};
///
/// let d = Diagnostic::new(
///     DiagnosticKind::MissingSubpackage,
///     "pkg.models",
///     "no models subpackage",
/// );
/// assert_eq!(d.to_string(), "pkg.models: no models subpackage");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// Module or package the diagnostic refers to
    pub subject: String,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Builds a diagnostic from a library error, choosing the kind from the
    /// error variant. Errors other than a missing package or subpackage count
    /// as endpoint import failures.
    #[must_use]
    pub fn from_error(subject: impl Into<String>, error: &crate::Error) -> Self {
        let kind = if error.is_package_not_found() {
            DiagnosticKind::PackageNotFound
        } else if error.is_missing_subpackage() {
            DiagnosticKind::MissingSubpackage
        } else {
            DiagnosticKind::EndpointImportFailure
        };
        Self::new(kind, subject, error.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Ordered sink of diagnostics for one run.
///
/// # Examples
///
/// ```
/// use facade_core::{Diagnostic, DiagnosticKind, Diagnostics};
///
/// let mut diagnostics = Diagnostics::new();
/// diagnostics.push(Diagnostic::new(
///     DiagnosticKind::EndpointImportFailure,
///     "pkg.api.projects.list_projects",
///     "invalid syntax",
/// ));
/// assert_eq!(diagnostics.len(), 1);
/// assert!(diagnostics.has_kind(DiagnosticKind::EndpointImportFailure));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a diagnostic and logs it as a warning.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = %diagnostic.kind,
            subject = %diagnostic.subject,
            "{}",
            diagnostic.message
        );
        self.0.push(diagnostic);
    }

    /// Appends all diagnostics from another sink.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any diagnostic of `kind` was recorded.
    #[must_use]
    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.0.iter().any(|d| d.kind == kind)
    }

    /// Iterates over diagnostics in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
