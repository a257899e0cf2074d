//! Template engine for facade emission using Handlebars.
//!
//! Provides a wrapper around Handlebars with the facade module and self-test
//! harness templates pre-registered. Output is Python source, so HTML
//! escaping is disabled.
//!
//! # Examples
//!
//! ```
//! use facade_codegen::template_engine::TemplateEngine;
//! use serde_json::json;
//!
//! let engine = TemplateEngine::new().unwrap();
//! let harness = engine
//!     .render("facade/harness", &json!({"package": "client_output", "class_name": "WrapperClient"}))
//!     .unwrap();
//! assert!(harness.contains("WrapperClient(base_url="));
//! ```

use facade_core::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// Template for the facade module: imports, sub-facades and the root class.
pub const MODULE_TEMPLATE: &str = "facade/module";

/// Template for the `__main__` self-test harness appended to the module.
pub const HARNESS_TEMPLATE: &str = "facade/harness";

/// Template engine for facade emission.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`, allowing it to be used across
/// thread boundaries safely.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates a new template engine with the built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if a built-in template fails to parse.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        Self::register_facade_templates(&mut handlebars)?;

        Ok(Self { handlebars })
    }

    fn register_facade_templates(handlebars: &mut Handlebars<'a>) -> Result<()> {
        handlebars
            .register_template_string(
                MODULE_TEMPLATE,
                include_str!("../templates/facade/module.py.hbs"),
            )
            .map_err(|e| Error::Template {
                message: format!("failed to register facade module template: {e}"),
            })?;

        handlebars
            .register_template_string(
                HARNESS_TEMPLATE,
                include_str!("../templates/facade/harness.py.hbs"),
            )
            .map_err(|e| Error::Template {
                message: format!("failed to register facade harness template: {e}"),
            })?;

        Ok(())
    }

    /// Renders a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if:
    /// - Template name is not registered
    /// - Context is missing a variable the template uses
    /// - Context cannot be serialized
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::Template {
                message: format!("rendering '{template_name}' failed: {e}"),
            })
    }

    /// Registers an additional template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the template string is invalid.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::Template {
                message: format!("failed to register template '{name}': {e}"),
            })
    }
}
