//! Error types for the client facade generator.
//!
//! Almost nothing in a generation run is fatal: missing subpackages and
//! broken endpoint modules are downgraded to [`Diagnostic`](crate::Diagnostic)s
//! by the callers. The variants below are what the library layers return
//! before that downgrade happens.
//!
//! # Examples
//!
//! ```
//! use facade_core::{Error, Result};
//!
//! fn require_package(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::InvalidArgument("package name cannot be empty".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! let err = require_package("").unwrap_err();
//! assert!(err.is_invalid_argument());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the facade generator.
#[derive(Error, Debug)]
pub enum Error {
    /// The host package could not be found on any search root.
    #[error("Python package '{package}' not found in {searched} search path(s)")]
    PackageNotFound {
        /// Dotted name of the package
        package: String,
        /// Number of search roots that were tried
        searched: usize,
    },

    /// A required subpackage or module of the host package is absent.
    ///
    /// Callers usually turn this into a warning and continue with a degraded
    /// facade.
    #[error("Subpackage '{subpackage}' missing from package '{package}'")]
    MissingSubpackage {
        /// Dotted name of the host package
        package: String,
        /// Relative name of the missing subpackage (e.g. `api`)
        subpackage: String,
    },

    /// A Python module could not be read or parsed.
    #[error("Failed to load module '{module}': {message}")]
    ModuleLoad {
        /// Dotted module path
        module: String,
        /// Description of the failure
        message: String,
        /// Underlying I/O error, when the failure was a read error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Template registration or rendering failed.
    #[error("Template error: {message}")]
    Template {
        /// Description of the template failure
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Validation error for domain types.
    #[error("Validation error in {field}: {reason}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },

    /// Filesystem error outside of module loading.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns `true` if the host package could not be located.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::Error;
    ///
    /// let err = Error::PackageNotFound { package: "client".to_string(), searched: 2 };
    /// assert!(err.is_package_not_found());
    /// ```
    #[must_use]
    pub const fn is_package_not_found(&self) -> bool {
        matches!(self, Self::PackageNotFound { .. })
    }

    /// Returns `true` if a subpackage of the host package is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::Error;
    ///
    /// let err = Error::MissingSubpackage {
    ///     package: "client".to_string(),
    ///     subpackage: "api".to_string(),
    /// };
    /// assert!(err.is_missing_subpackage());
    /// ```
    #[must_use]
    pub const fn is_missing_subpackage(&self) -> bool {
        matches!(self, Self::MissingSubpackage { .. })
    }

    /// Returns `true` if a module failed to load.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::Error;
    ///
    /// let err = Error::ModuleLoad {
    ///     module: "client.api.default.health_check".to_string(),
    ///     message: "invalid syntax".to_string(),
    ///     source: None,
    /// };
    /// assert!(err.is_module_load_error());
    /// ```
    #[must_use]
    pub const fn is_module_load_error(&self) -> bool {
        matches!(self, Self::ModuleLoad { .. })
    }

    /// Returns `true` if this is a template error.
    #[must_use]
    pub const fn is_template_error(&self) -> bool {
        matches!(self, Self::Template { .. })
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::Error;
    ///
    /// let err = Error::Config { message: "empty class name".to_string() };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns `true` if this is an invalid argument error.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if this is a filesystem error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Result type alias for facade generator operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_not_found_detection() {
        let err = Error::PackageNotFound {
            package: "client_output".to_string(),
            searched: 3,
        };
        assert!(err.is_package_not_found());
        assert!(!err.is_missing_subpackage());
        assert!(err.to_string().contains("client_output"));
    }

    #[test]
    fn test_missing_subpackage_display() {
        let err = Error::MissingSubpackage {
            package: "client_output".to_string(),
            subpackage: "api".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("'api'"));
        assert!(display.contains("'client_output'"));
    }

    #[test]
    fn test_module_load_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::ModuleLoad {
            module: "pkg.api.default.x".to_string(),
            message: "read failed".to_string(),
            source: Some(io),
        };
        assert!(err.is_module_load_error());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = Error::Io {
            path: PathBuf::from("/tmp/out.py"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_io_error());
        assert!(err.to_string().contains("/tmp/out.py"));
    }

    #[test]
    fn test_predicates_are_exclusive() {
        let err = Error::Config {
            message: "bad".to_string(),
        };
        assert!(err.is_config_error());
        assert!(!err.is_template_error());
        assert!(!err.is_validation_error());
        assert!(!err.is_invalid_argument());
    }
}
