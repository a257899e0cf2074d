//! Python facade generation.
//!
//! Renders the endpoints reflected by `facade-introspector` into a single
//! Python module holding one ergonomic client class. Type annotations are
//! re-rendered by the [`TypeRenderer`], grouped into classes by the
//! [`FacadeSynthesizer`] and written out through Handlebars templates by the
//! [`EmissionAssembler`].
//!
//! # Examples
//!
//! ```no_run
//! use facade_codegen::FacadeGenerator;
//! use facade_core::{GeneratorConfig, PackageName};
//! use facade_introspector::Introspector;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeneratorConfig::default();
//! let info = Introspector::new(config.clone()).discover_package(&PackageName::new("client_output")?);
//!
//! let facade = FacadeGenerator::new(config)?.generate(&info)?;
//! std::fs::write("sdk.py", &facade.source)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod emitter;
pub mod imports;
pub mod naming;
pub mod render;
pub mod synthesizer;
pub mod template_engine;

pub use emitter::{EmissionAssembler, EmitOptions};
pub use imports::ImportSet;
pub use render::{RenderedType, TypeRenderer};
pub use synthesizer::{EndpointImport, FacadeField, FacadeSet, FacadeSpec, FacadeSynthesizer, MethodSpec};

use facade_core::{GeneratorConfig, ModulePath, Result};
use facade_introspector::PackageInfo;
use serde::Serialize;
use tracing::info;

/// A generated facade module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFacade {
    /// Root class name
    pub class_name: String,
    /// Names of the sub-facade attributes on the root class
    pub namespaces: Vec<String>,
    /// Number of generated methods
    pub method_count: usize,
    /// Python source text
    #[serde(skip)]
    pub source: String,
}

/// Runs synthesis and emission for a reflected package.
#[derive(Debug)]
pub struct FacadeGenerator<'a> {
    config: GeneratorConfig,
    assembler: EmissionAssembler<'a>,
}

impl FacadeGenerator<'_> {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in templates fail to register.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Ok(Self {
            assembler: EmissionAssembler::new(config.clone())?,
            config,
        })
    }

    /// Generates the facade module for `info`, using the configured class
    /// name.
    ///
    /// Diagnostics in `info` do not stop generation: whatever was reflected
    /// is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`facade_core::Error::Template`] if a template fails to
    /// render.
    pub fn generate(&self, info: &PackageInfo) -> Result<GeneratedFacade> {
        let class_name = self.config.class_name.as_str();
        info!(package = %info.package, class = class_name, "generating facade");

        let set = FacadeSynthesizer::new(&ModulePath::from(&info.package), &self.config)
            .with_models_import(info.layout.has_models)
            .synthesize(&info.endpoints, class_name);

        let options = EmitOptions {
            models_import: info.layout.has_models,
            ..EmitOptions::new(info.package.clone())
        };
        let source = self.assembler.emit(&set, &options)?;

        Ok(GeneratedFacade {
            class_name: class_name.to_string(),
            namespaces: set.root.fields.iter().map(|f| f.name.clone()).collect(),
            method_count: set.method_count(),
            source,
        })
    }
}
