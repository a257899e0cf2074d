//! Package-wide symbol table.
//!
//! Collects the model classes and the helper types of a client package once
//! per run, so that endpoint signatures can be resolved without re-reading
//! the `models` and `types` modules for every endpoint.

use crate::descriptor::QualifiedName;
use crate::package::PythonPackage;
use crate::parser::{Binding, ParsedModule};
use facade_core::{Diagnostic, DiagnosticKind, Diagnostics, GeneratorConfig, ModulePath};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Kind of a name defined in the `types` module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSymbolKind {
    /// A class, such as `Unset`, `File` or `Response`
    Class,
    /// The singleton instance of the unset type
    Sentinel,
    /// Anything else (type variables, constants, functions)
    Other,
}

/// Models, helper types and the unset sentinel of one client package.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    models_module: ModulePath,
    types_module: ModulePath,
    models: BTreeMap<String, ModulePath>,
    types: Option<BTreeMap<String, TypeSymbolKind>>,
    has_models: bool,
    unset_type: String,
    unset_singleton: String,
}

impl SymbolTable {
    /// An empty table for `package`, as if neither `models` nor `types`
    /// existed.
    #[must_use]
    pub fn empty(package: &ModulePath, config: &GeneratorConfig) -> Self {
        Self {
            models_module: package.join(&config.models_module),
            types_module: package.join(&config.types_module),
            models: BTreeMap::new(),
            types: None,
            has_models: false,
            unset_type: config.unset_type.clone(),
            unset_singleton: config.unset_singleton.clone(),
        }
    }

    /// Scans the `models` subpackage and the `types` module of `package`.
    ///
    /// Missing modules are recorded as [`DiagnosticKind::MissingSubpackage`]
    /// and leave the corresponding part of the table empty. Model files that
    /// fail to parse are skipped with a warning.
    pub fn scan(
        package: &PythonPackage,
        config: &GeneratorConfig,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut table = Self::empty(&package.module_path(), config);
        table.scan_models(package, config, diagnostics);
        table.scan_types(package, config, diagnostics);

        info!(
            models = table.models.len(),
            types = table.types.as_ref().map_or(0, BTreeMap::len),
            "symbol table ready"
        );
        table
    }

    fn scan_models(
        &mut self,
        package: &PythonPackage,
        config: &GeneratorConfig,
        diagnostics: &mut Diagnostics,
    ) {
        let files: Vec<(std::path::PathBuf, bool)> =
            if let Some(dir) = package.subpackage_dir(&config.models_module) {
                let mut files: Vec<_> = WalkDir::new(&dir)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(|e| e.file_name() != "__pycache__")
                    .filter_map(std::result::Result::ok)
                    .filter(|e| e.file_type().is_file() && has_py_extension(e.path()))
                    .map(|e| {
                        let is_init = e.file_name() == "__init__.py";
                        (e.into_path(), is_init)
                    })
                    .collect();
                // Defining submodules first, so re-exports in `__init__.py`
                // never shadow the real module.
                files.sort_by_key(|(_, is_init)| *is_init);
                files
            } else if let Some(file) = package.module_file(&config.models_module) {
                vec![file]
            } else {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MissingSubpackage,
                    self.models_module.as_str(),
                    format!(
                        "package '{}' has no '{}' subpackage; model types will render as dotted paths",
                        package.name(),
                        config.models_module
                    ),
                ));
                return;
            };

        self.has_models = true;
        for (file, is_package) in files {
            let Some(module_path) = package.module_path_of(&file) else {
                continue;
            };
            match ParsedModule::load(module_path.clone(), &file, is_package) {
                Ok(module) => {
                    for (name, binding) in module.bindings() {
                        if *binding == Binding::Class {
                            self.models
                                .entry(name.clone())
                                .or_insert_with(|| module_path.clone());
                        }
                    }
                }
                Err(e) => warn!(module = %module_path, error = %e, "skipping unreadable model module"),
            }
        }
        debug!(count = self.models.len(), "scanned model classes");
    }

    fn scan_types(
        &mut self,
        package: &PythonPackage,
        config: &GeneratorConfig,
        diagnostics: &mut Diagnostics,
    ) {
        let Some((file, is_package)) = package.module_file(&config.types_module) else {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingSubpackage,
                self.types_module.as_str(),
                format!(
                    "package '{}' has no '{}' module; unset defaults cannot be recognized",
                    package.name(),
                    config.types_module
                ),
            ));
            return;
        };

        match ParsedModule::load(self.types_module.clone(), &file, is_package) {
            Ok(module) => {
                let kinds = module
                    .bindings()
                    .iter()
                    .map(|(name, binding)| {
                        let kind = match binding {
                            Binding::Class => TypeSymbolKind::Class,
                            Binding::Instance { class } if *class == self.unset_type => {
                                TypeSymbolKind::Sentinel
                            }
                            Binding::Instance { .. } | Binding::Function | Binding::Value => {
                                TypeSymbolKind::Other
                            }
                        };
                        (name.clone(), kind)
                    })
                    .collect();
                self.types = Some(kinds);
            }
            Err(e) => {
                diagnostics.push(Diagnostic::from_error(self.types_module.as_str(), &e));
            }
        }
    }

    /// Dotted path of the models subpackage.
    #[must_use]
    pub const fn models_module(&self) -> &ModulePath {
        &self.models_module
    }

    /// Dotted path of the types module.
    #[must_use]
    pub const fn types_module(&self) -> &ModulePath {
        &self.types_module
    }

    /// Returns `true` if the package has a models subpackage or module.
    #[must_use]
    pub const fn has_models(&self) -> bool {
        self.has_models
    }

    /// Returns `true` if the types module was found and parsed.
    #[must_use]
    pub const fn has_types(&self) -> bool {
        self.types.is_some()
    }

    /// Defining module of a model class.
    #[must_use]
    pub fn model_module(&self, name: &str) -> Option<&ModulePath> {
        self.models.get(name)
    }

    /// Names of all model classes, sorted.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Kind of a name defined in the types module.
    #[must_use]
    pub fn type_symbol(&self, name: &str) -> Option<TypeSymbolKind> {
        self.types.as_ref()?.get(name).copied()
    }

    /// Name of the unset singleton (e.g. `UNSET`).
    #[must_use]
    pub fn unset_singleton(&self) -> &str {
        &self.unset_singleton
    }

    /// Returns `true` if `name` refers to the unset singleton.
    ///
    /// When the types module could not be scanned the check falls back to
    /// matching the module and name alone.
    #[must_use]
    pub fn is_unset_singleton(&self, name: &QualifiedName) -> bool {
        name.module == self.types_module
            && name.name == self.unset_singleton
            && self
                .type_symbol(&name.name)
                .is_none_or(|kind| kind == TypeSymbolKind::Sentinel)
    }

    /// Returns `true` if `name` refers to the unset type itself.
    #[must_use]
    pub fn is_unset_type(&self, name: &QualifiedName) -> bool {
        name.module == self.types_module && name.name == self.unset_type
    }
}

fn has_py_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("py")
}

#[cfg(test)]
mod tests {
    use super::*;
    use facade_core::PackageName;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn package(tmp: &TempDir) -> PythonPackage {
        let name = PackageName::new("pkg").unwrap();
        PythonPackage::locate(&name, &[tmp.path().to_path_buf()]).unwrap()
    }

    #[test]
    fn test_scan_models_and_types() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("pkg");
        write(&root, "__init__.py", "");
        write(
            &root,
            "models/__init__.py",
            "from .greeting import Greeting\n\n__all__ = (\"Greeting\",)\n",
        );
        write(&root, "models/greeting.py", "class Greeting:\n    pass\n");
        write(&root, "models/__pycache__/stale.py", "class Stale:\n    pass\n");
        write(
            &root,
            "types.py",
            "from typing import TypeVar\n\nclass Unset:\n    pass\n\nUNSET: Unset = Unset()\nT = TypeVar(\"T\")\n",
        );

        let mut diagnostics = Diagnostics::new();
        let table = SymbolTable::scan(&package(&tmp), &GeneratorConfig::default(), &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert!(table.has_models());
        assert!(table.has_types());
        assert_eq!(table.model_module("Greeting").unwrap().as_str(), "pkg.models.greeting");
        assert!(table.model_module("Stale").is_none());
        assert_eq!(table.type_symbol("Unset"), Some(TypeSymbolKind::Class));
        assert_eq!(table.type_symbol("UNSET"), Some(TypeSymbolKind::Sentinel));
        assert_eq!(table.type_symbol("T"), Some(TypeSymbolKind::Other));

        let unset = QualifiedName::new("pkg.types", "UNSET");
        assert!(table.is_unset_singleton(&unset));
        assert!(table.is_unset_type(&QualifiedName::new("pkg.types", "Unset")));
        assert!(!table.is_unset_singleton(&QualifiedName::new("other.types", "UNSET")));
    }

    #[test]
    fn test_missing_models_and_types_are_diagnostics() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("pkg"), "__init__.py", "");

        let mut diagnostics = Diagnostics::new();
        let table = SymbolTable::scan(&package(&tmp), &GeneratorConfig::default(), &mut diagnostics);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.kind == DiagnosticKind::MissingSubpackage));
        assert!(!table.has_models());
        assert!(!table.has_types());
        assert!(table.is_unset_singleton(&QualifiedName::new("pkg.types", "UNSET")));
    }

    #[test]
    fn test_broken_model_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("pkg");
        write(&root, "__init__.py", "");
        write(&root, "types.py", "");
        write(&root, "models/__init__.py", "");
        write(&root, "models/good.py", "class Good:\n    pass\n");
        write(&root, "models/bad.py", "class (:\n");

        let mut diagnostics = Diagnostics::new();
        let table = SymbolTable::scan(&package(&tmp), &GeneratorConfig::default(), &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(table.model_names().collect::<Vec<_>>(), ["Good"]);
    }
}
