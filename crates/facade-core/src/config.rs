//! Generator configuration.
//!
//! Every name the generator looks for inside the host package is configurable
//! so that client packages produced by other generator versions (or with a
//! renamed `api` subpackage) can still be wrapped. The defaults match the
//! layout emitted by `openapi-python-client`.
//!
//! # Examples
//!
//! ```toml
//! class_name = "PetStore"
//!
//! endpoints_module = "api"
//! models_module = "models"
//! types_module = "types"
//!
//! sync_function = "sync"
//! async_function = "asyncio"
//! ```

use crate::types::is_dotted_identifier;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Names and conventions used when reflecting a client package and
/// synthesizing its facade.
///
/// # Examples
///
/// ```
/// use facade_core::GeneratorConfig;
///
/// let config = GeneratorConfig::default();
/// assert_eq!(config.class_name, "WrapperClient");
/// assert_eq!(config.default_namespace, "default");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Name of the emitted root facade class
    pub class_name: String,

    /// Subpackage holding endpoint modules grouped by namespace
    pub endpoints_module: String,

    /// Subpackage holding model classes
    pub models_module: String,

    /// Module holding shared helper types and the unset sentinel
    pub types_module: String,

    /// Module holding the transport client class
    pub client_module: String,

    /// Transport client class name inside `client_module`
    pub client_class: String,

    /// Endpoint parameter that receives the transport handle
    pub transport_param: String,

    /// Namespace whose methods are attached to the root facade
    pub default_namespace: String,

    /// Synchronous endpoint function name
    pub sync_function: String,

    /// Asynchronous endpoint function name
    pub async_function: String,

    /// Suffix appended to asynchronous facade methods
    pub async_suffix: String,

    /// Class used to mark unset optional arguments
    pub unset_type: String,

    /// Module-level singleton instance of `unset_type`
    pub unset_singleton: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            class_name: "WrapperClient".to_string(),
            endpoints_module: "api".to_string(),
            models_module: "models".to_string(),
            types_module: "types".to_string(),
            client_module: "client".to_string(),
            client_class: "Client".to_string(),
            transport_param: "client".to_string(),
            default_namespace: "default".to_string(),
            sync_function: "sync".to_string(),
            async_function: "asyncio".to_string(),
            async_suffix: "_async".to_string(),
            unset_type: "Unset".to_string(),
            unset_singleton: "UNSET".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Validates the configuration.
    ///
    /// Every name must be usable as a Python identifier (module names may be
    /// dotted). The async suffix must be non-empty so sync and async methods
    /// never share a name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid field.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::GeneratorConfig;
    ///
    /// let config = GeneratorConfig {
    ///     class_name: "Not A Class".to_string(),
    ///     ..GeneratorConfig::default()
    /// };
    /// assert!(config.validate().unwrap_err().is_config_error());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let identifiers = [
            ("class_name", &self.class_name),
            ("client_class", &self.client_class),
            ("transport_param", &self.transport_param),
            ("default_namespace", &self.default_namespace),
            ("sync_function", &self.sync_function),
            ("async_function", &self.async_function),
            ("unset_type", &self.unset_type),
            ("unset_singleton", &self.unset_singleton),
        ];
        for (field, value) in identifiers {
            if !is_identifier(value) {
                return Err(invalid(field, value, "a Python identifier"));
            }
        }

        let modules = [
            ("endpoints_module", &self.endpoints_module),
            ("models_module", &self.models_module),
            ("types_module", &self.types_module),
            ("client_module", &self.client_module),
        ];
        for (field, value) in modules {
            if !is_dotted_identifier(value) {
                return Err(invalid(field, value, "a dotted module name"));
            }
        }

        if self.async_suffix.is_empty()
            || !self
                .async_suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid(
                "async_suffix",
                &self.async_suffix,
                "a non-empty identifier suffix",
            ));
        }

        if self.sync_function == self.async_function {
            return Err(Error::Config {
                message: format!(
                    "sync_function and async_function must differ (both are '{}')",
                    self.sync_function
                ),
            });
        }

        Ok(())
    }

    /// Returns a copy with `class_name` replaced, if one is given.
    #[must_use]
    pub fn with_class_name(mut self, class_name: Option<String>) -> Self {
        if let Some(name) = class_name {
            self.class_name = name;
        }
        self
    }
}

fn is_identifier(value: &str) -> bool {
    !value.contains('.') && is_dotted_identifier(value)
}

fn invalid(field: &str, value: &str, expected: &str) -> Error {
    Error::Config {
        message: format!("invalid {field} '{value}', must be {expected}"),
    }
}
