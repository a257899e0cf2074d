//! Strong domain types for the facade generator.
//!
//! Package and module names travel through every stage of a run. Using
//! newtypes keeps a dotted module path from being confused with a namespace
//! key or a bare identifier.
//!
//! # Examples
//!
//! ```
//! use facade_core::{ModulePath, NamespaceName, PackageName};
//!
//! let package = PackageName::new("client_output").unwrap();
//! let module = ModulePath::from(&package).join("api").join("default");
//! assert_eq!(module.as_str(), "client_output.api.default");
//!
//! let ns = NamespaceName::new("default");
//! assert_eq!(ns.as_str(), "default");
//! ```

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static DOTTED_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid regex")
});

/// Dotted name of an importable Python package (e.g. `client_output`).
///
/// Validated at construction: every segment must be a Python identifier.
///
/// # Examples
///
/// ```
/// use facade_core::PackageName;
///
/// assert!(PackageName::new("my_client").is_ok());
/// assert!(PackageName::new("vendor.my_client").is_ok());
/// assert!(PackageName::new("my-client").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Creates a validated package name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is empty or any dotted
    /// segment is not a valid Python identifier.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !is_dotted_identifier(&name) {
            return Err(Error::Validation {
                field: "package".to_string(),
                reason: format!("'{name}' is not a dotted Python identifier"),
            });
        }
        Ok(Self(name))
    }

    /// Returns the package name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the dotted segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PackageName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.0
    }
}

/// Namespace key, the immediate parent directory of an endpoint module.
///
/// # Examples
///
/// ```
/// use facade_core::NamespaceName;
///
/// let ns = NamespaceName::new("projects");
/// assert_eq!(ns.to_string(), "projects");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Creates a namespace name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the namespace as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NamespaceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Fully dotted Python module path (e.g. `client_output.api.default.health_check`).
///
/// Ordering is lexicographic on the dotted text, which is the order endpoint
/// modules are visited in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModulePath(String);

impl ModulePath {
    /// Creates a module path from dotted text.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Builds a module path from its segments.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::ModulePath;
    ///
    /// let path = ModulePath::from_segments(["pkg", "api", "default"]);
    /// assert_eq!(path.as_str(), "pkg.api.default");
    /// ```
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(".");
        Self(joined)
    }

    /// Returns the dotted path as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the dotted segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// Last segment, the module's own name.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::ModulePath;
    ///
    /// let path = ModulePath::new("pkg.api.default.health_check");
    /// assert_eq!(path.last(), "health_check");
    /// ```
    #[must_use]
    pub fn last(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// First segment, the top-level package.
    #[must_use]
    pub fn top_level(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// Enclosing package, or `None` for a top-level module.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::ModulePath;
    ///
    /// let path = ModulePath::new("pkg.api.default");
    /// assert_eq!(path.parent().unwrap().as_str(), "pkg.api");
    /// assert!(ModulePath::new("pkg").parent().is_none());
    /// ```
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once('.').map(|(head, _)| Self(head.to_string()))
    }

    /// Appends a dotted suffix.
    #[must_use]
    pub fn join(&self, suffix: &str) -> Self {
        if self.0.is_empty() {
            Self(suffix.to_string())
        } else if suffix.is_empty() {
            self.clone()
        } else {
            Self(format!("{}.{suffix}", self.0))
        }
    }

    /// Returns `true` if `self` equals `ancestor` or lives beneath it.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::ModulePath;
    ///
    /// let models = ModulePath::new("pkg.models");
    /// assert!(ModulePath::new("pkg.models.greeting").starts_with(&models));
    /// assert!(ModulePath::new("pkg.models").starts_with(&models));
    /// assert!(!ModulePath::new("pkg.models_extra").starts_with(&models));
    /// ```
    #[must_use]
    pub fn starts_with(&self, ancestor: &Self) -> bool {
        self.0 == ancestor.0
            || self
                .0
                .strip_prefix(ancestor.0.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&PackageName> for ModulePath {
    fn from(name: &PackageName) -> Self {
        Self(name.0.clone())
    }
}

/// Returns `true` if `text` is one or more Python identifiers joined by dots.
#[must_use]
pub(crate) fn is_dotted_identifier(text: &str) -> bool {
    DOTTED_IDENTIFIER.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_validation() {
        assert!(PackageName::new("client_output").is_ok());
        assert!(PackageName::new("_private.pkg2").is_ok());
        assert!(PackageName::new("").is_err());
        assert!(PackageName::new("1pkg").is_err());
        assert!(PackageName::new("pkg.").is_err());
        assert!(PackageName::new("pkg..sub").is_err());
    }

    #[test]
    fn test_package_name_error_is_validation() {
        let err = PackageName::new("not-valid").unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_package_name_serde_validates() {
        let ok: PackageName = serde_json::from_str("\"pkg\"").unwrap();
        assert_eq!(ok.as_str(), "pkg");
        assert!(serde_json::from_str::<PackageName>("\"bad name\"").is_err());
    }

    #[test]
    fn test_module_path_navigation() {
        let path = ModulePath::new("pkg.api.projects.list_projects");
        assert_eq!(path.last(), "list_projects");
        assert_eq!(path.top_level(), "pkg");
        assert_eq!(path.parent().unwrap().last(), "projects");
        assert_eq!(path.segments().count(), 4);
    }

    #[test]
    fn test_module_path_join_empty() {
        assert_eq!(ModulePath::new("").join("pkg").as_str(), "pkg");
        assert_eq!(ModulePath::new("pkg").join("").as_str(), "pkg");
    }

    #[test]
    fn test_module_path_ordering_is_lexicographic() {
        let mut paths = vec![
            ModulePath::new("pkg.api.default.health_check"),
            ModulePath::new("pkg.api.default.create_greeting"),
        ];
        paths.sort();
        assert_eq!(paths[0].last(), "create_greeting");
    }
}
