//! Static reflection of `openapi-python-client` packages.
//!
//! Locates a generated client package on disk, parses its modules with the
//! ruff Python parser, and produces an [`EndpointMap`] of reflected endpoint
//! signatures, ready for the code generator.
//!
//! # Examples
//!
//! ```no_run
//! use facade_core::{GeneratorConfig, PackageName};
//! use facade_introspector::Introspector;
//!
//! let introspector = Introspector::new(GeneratorConfig::default());
//! let info = introspector.discover_package(&PackageName::new("client_output")?);
//!
//! for (namespace, endpoints) in &info.endpoints {
//!     println!("{namespace}: {} endpoint(s)", endpoints.len());
//! }
//! for diagnostic in &info.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! # Ok::<(), facade_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod descriptor;
pub mod discovery;
pub mod package;
pub mod parser;
pub mod reflect;
pub mod symbols;

pub use descriptor::{DescriptorBuilder, QualifiedName, TypeDescriptor};
pub use discovery::{NamespaceCollector, NamespaceMap};
pub use package::PythonPackage;
pub use reflect::{
    CallableSignature, DefaultName, DefaultValue, EndpointDescriptor, EndpointMap,
    EndpointReflector, NameSource, ParameterInfo,
};
pub use symbols::{SymbolTable, TypeSymbolKind};

use facade_core::{
    Diagnostic, DiagnosticKind, Diagnostics, Error, GeneratorConfig, ModulePath, PackageName,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Which optional parts of the client package exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PackageLayout {
    /// The endpoints subpackage (`api`) exists
    pub has_endpoints: bool,
    /// The models subpackage exists
    pub has_models: bool,
    /// The types module exists and parsed
    pub has_types: bool,
    /// The client module exists
    pub has_client: bool,
}

/// Everything learned about one client package in a run.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    /// Package name
    pub package: PackageName,
    /// Package directory, when it was found
    pub root: Option<PathBuf>,
    /// Reflected endpoints per namespace; namespaces without endpoints are
    /// omitted
    pub endpoints: EndpointMap,
    /// Models and helper types
    pub symbols: SymbolTable,
    /// Optional parts that exist
    pub layout: PackageLayout,
    /// Problems encountered, in the order they were found
    pub diagnostics: Diagnostics,
}

impl PackageInfo {
    /// Total number of reflected endpoints.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.values().map(Vec::len).sum()
    }
}

/// Runs package location, symbol scanning, namespace collection and
/// endpoint reflection.
#[derive(Debug, Clone)]
pub struct Introspector {
    config: GeneratorConfig,
    search_paths: Vec<PathBuf>,
}

impl Introspector {
    /// Creates an introspector searching the default Python search roots.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            search_paths: PythonPackage::default_search_paths(),
        }
    }

    /// Prepends extra search roots, tried before the defaults.
    #[must_use]
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut combined: Vec<PathBuf> = paths.into_iter().collect();
        combined.append(&mut self.search_paths);
        self.search_paths = combined;
        self
    }

    /// Replaces the search roots entirely.
    #[must_use]
    pub fn with_exact_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Reflects the package called `name`.
    ///
    /// Never fails: a missing package, missing subpackages and broken
    /// endpoint modules are reported in [`PackageInfo::diagnostics`] and the
    /// result degrades to whatever could be reflected.
    #[must_use]
    pub fn discover_package(&self, name: &PackageName) -> PackageInfo {
        let mut diagnostics = Diagnostics::new();

        let package = match PythonPackage::locate(name, &self.search_paths) {
            Ok(package) => package,
            Err(e) => {
                diagnostics.push(Diagnostic::from_error(name.as_str(), &e));
                return PackageInfo {
                    package: name.clone(),
                    root: None,
                    endpoints: EndpointMap::new(),
                    symbols: SymbolTable::empty(&ModulePath::from(name), &self.config),
                    layout: PackageLayout::default(),
                    diagnostics,
                };
            }
        };
        info!(package = %name, root = %package.root().display(), "reflecting package");

        let symbols = SymbolTable::scan(&package, &self.config, &mut diagnostics);

        let has_client = package.module_file(&self.config.client_module).is_some();
        if !has_client {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingSubpackage,
                package.module_path().join(&self.config.client_module).as_str(),
                format!(
                    "package '{name}' has no '{}' module; the facade's transport import will fail",
                    self.config.client_module
                ),
            ));
        }

        let has_endpoints = package.subpackage_dir(&self.config.endpoints_module).is_some();
        let namespaces = NamespaceCollector::new(&package, &self.config).collect(&mut diagnostics);
        let reflector = EndpointReflector::new(&package, &symbols, &self.config);

        let mut endpoints = EndpointMap::new();
        for (namespace, modules) in namespaces {
            let mut reflected = Vec::with_capacity(modules.len());
            for module in modules {
                match reflector.reflect(&namespace, &module) {
                    Ok(endpoint) if endpoint.has_sync() || endpoint.has_async() => {
                        reflected.push(endpoint);
                    }
                    Ok(_) => debug!(module = %module, "module has no endpoint functions, skipping"),
                    Err(e) => {
                        let reason = match &e {
                            Error::ModuleLoad { message, .. } => message.clone(),
                            other => other.to_string(),
                        };
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::EndpointImportFailure,
                            module.as_str(),
                            format!("could not import endpoint module {module}: {reason}"),
                        ));
                    }
                }
            }
            if reflected.is_empty() {
                debug!(namespace = %namespace, "namespace has no endpoints, dropping");
            } else {
                endpoints.insert(namespace, reflected);
            }
        }

        let layout = PackageLayout {
            has_endpoints,
            has_models: symbols.has_models(),
            has_types: symbols.has_types(),
            has_client,
        };
        let info = PackageInfo {
            package: name.clone(),
            root: Some(package.root().to_path_buf()),
            endpoints,
            symbols,
            layout,
            diagnostics,
        };
        info!(
            namespaces = info.endpoints.len(),
            endpoints = info.endpoint_count(),
            diagnostics = info.diagnostics.len(),
            "package reflected"
        );
        info
    }
}
