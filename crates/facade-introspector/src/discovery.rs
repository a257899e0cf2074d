//! Namespace collection.
//!
//! Walks the endpoints subpackage and groups every leaf module by the name of
//! its parent directory. `openapi-python-client` writes one module per
//! operation into `api/<tag>/`, so the namespace is the OpenAPI tag.

use crate::package::{PythonPackage, is_package_dir};
use facade_core::{Diagnostic, DiagnosticKind, Diagnostics, GeneratorConfig, ModulePath, NamespaceName};
use std::collections::BTreeMap;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Namespace to sorted endpoint module paths.
pub type NamespaceMap = BTreeMap<NamespaceName, Vec<ModulePath>>;

/// Finds endpoint modules beneath the endpoints subpackage.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceCollector<'a> {
    package: &'a PythonPackage,
    config: &'a GeneratorConfig,
}

impl<'a> NamespaceCollector<'a> {
    /// Creates a collector for `package`.
    #[must_use]
    pub const fn new(package: &'a PythonPackage, config: &'a GeneratorConfig) -> Self {
        Self { package, config }
    }

    /// Collects every non-package module beneath the endpoints subpackage.
    ///
    /// Only directories that are packages are descended into, and
    /// `__pycache__` is skipped. A missing endpoints subpackage yields an
    /// empty map and a [`DiagnosticKind::MissingSubpackage`] diagnostic.
    pub fn collect(&self, diagnostics: &mut Diagnostics) -> NamespaceMap {
        let mut map = NamespaceMap::new();

        let Some(api_dir) = self.package.subpackage_dir(&self.config.endpoints_module) else {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingSubpackage,
                self.package.module_path().join(&self.config.endpoints_module).as_str(),
                format!(
                    "could not find API package '{}.{}'; the facade will have no endpoint methods",
                    self.package.name(),
                    self.config.endpoints_module
                ),
            ));
            return map;
        };

        let walker = WalkDir::new(&api_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !entry.file_type().is_dir()
                    || (entry.file_name() != "__pycache__" && is_package_dir(entry.path()))
            });

        for entry in walker.filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() || entry.file_name() == "__init__.py" {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some("py") {
                continue;
            }
            let Some(module) = self.package.module_path_of(entry.path()) else {
                continue;
            };
            let Some(namespace) = module.parent().map(|p| NamespaceName::new(p.last())) else {
                continue;
            };
            debug!(namespace = %namespace, module = %module, "found endpoint module");
            map.entry(namespace).or_default().push(module);
        }

        for modules in map.values_mut() {
            modules.sort();
        }

        info!(
            namespaces = map.len(),
            modules = map.values().map(Vec::len).sum::<usize>(),
            "collected endpoint namespaces"
        );
        map
    }
}
