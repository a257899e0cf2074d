//! Parsing Python modules and recording their top-level names.
//!
//! A [`ParsedModule`] keeps the source text next to the syntax tree so that
//! default values can later be copied verbatim. While loading, it builds an
//! [`ImportTable`] and a map of locally bound names, which together let the
//! descriptor builder resolve an annotation like `Optional[Greeting]` to the
//! module that actually defines each name.

use facade_core::{Error, ModulePath, Result};
use ruff_python_ast::{self as ast, Expr, ModModule, Stmt};
use ruff_python_parser::parse_module;
use ruff_text_size::Ranged;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// What a local name was imported as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    /// `import a.b` or `import a.b as x`
    Module(ModulePath),
    /// `from a.b import c`
    Symbol {
        /// Module the name was imported from (relative imports resolved)
        module: ModulePath,
        /// Name inside that module
        name: String,
    },
}

/// Local name to import target, for one module.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    entries: HashMap<String, ImportedName>,
}

impl ImportTable {
    /// Looks up a local name.
    #[must_use]
    pub fn get(&self, local: &str) -> Option<&ImportedName> {
        self.entries.get(local)
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the module imports nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, local: impl Into<String>, target: ImportedName) {
        self.entries.insert(local.into(), target);
    }
}

/// Kind of a name bound at module level by something other than an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// `class Name: ...`
    Class,
    /// `def name(...)` or `async def name(...)`
    Function,
    /// `NAME = Cls(...)`, recording the called name as written
    Instance {
        /// Called class name (last segment for dotted calls)
        class: String,
    },
    /// Any other assignment
    Value,
}

/// A parsed Python source file.
#[derive(Debug)]
pub struct ParsedModule {
    path: ModulePath,
    is_package: bool,
    source: String,
    syntax: ModModule,
    imports: ImportTable,
    bindings: BTreeMap<String, Binding>,
}

impl ParsedModule {
    /// Reads and parses a module file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleLoad`] if the file cannot be read or contains a
    /// syntax error.
    pub fn load(path: ModulePath, file: &Path, is_package: bool) -> Result<Self> {
        let source = std::fs::read_to_string(file).map_err(|e| Error::ModuleLoad {
            module: path.to_string(),
            message: format!("cannot read {}", file.display()),
            source: Some(e),
        })?;
        Self::parse(path, is_package, source)
    }

    /// Parses module source text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleLoad`] on a syntax error.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_core::ModulePath;
    /// use facade_introspector::parser::{ImportedName, ParsedModule};
    ///
    /// let module = ParsedModule::parse(
    ///     ModulePath::new("pkg.api.default.health_check"),
    ///     false,
    ///     "from ...models.health import Health\n".to_string(),
    /// )?;
    /// assert_eq!(
    ///     module.imports().get("Health"),
    ///     Some(&ImportedName::Symbol {
    ///         module: ModulePath::new("pkg.models.health"),
    ///         name: "Health".to_string(),
    ///     })
    /// );
    /// # Ok::<(), facade_core::Error>(())
    /// ```
    pub fn parse(path: ModulePath, is_package: bool, source: String) -> Result<Self> {
        let parsed = parse_module(&source).map_err(|e| Error::ModuleLoad {
            module: path.to_string(),
            message: e.to_string(),
            source: None,
        })?;

        let mut module = Self {
            path,
            is_package,
            syntax: parsed.into_syntax(),
            source,
            imports: ImportTable::default(),
            bindings: BTreeMap::new(),
        };
        let mut imports = ImportTable::default();
        let mut bindings = BTreeMap::new();
        module.scan(&module.syntax.body, &mut imports, &mut bindings);
        module.imports = imports;
        module.bindings = bindings;

        debug!(
            module = %module.path,
            imports = module.imports.len(),
            bindings = module.bindings.len(),
            "parsed module"
        );
        Ok(module)
    }

    /// Dotted path of this module.
    #[must_use]
    pub const fn path(&self) -> &ModulePath {
        &self.path
    }

    /// Top-level statements.
    #[must_use]
    pub fn body(&self) -> &[Stmt] {
        &self.syntax.body
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source text covered by a syntax node.
    #[must_use]
    pub fn text_of<T: Ranged>(&self, node: &T) -> &str {
        &self.source[node.range()]
    }

    /// Import table built from top-level (and `if`/`try` nested) imports.
    #[must_use]
    pub const fn imports(&self) -> &ImportTable {
        &self.imports
    }

    /// Top-level names bound other than by import.
    #[must_use]
    pub const fn bindings(&self) -> &BTreeMap<String, Binding> {
        &self.bindings
    }

    /// Returns `true` if the module defines a class called `name`.
    #[must_use]
    pub fn defines_class(&self, name: &str) -> bool {
        matches!(self.bindings.get(name), Some(Binding::Class))
    }

    /// Finds a top-level function definition. The last definition wins.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&ast::StmtFunctionDef> {
        self.syntax.body.iter().rev().find_map(|stmt| match stmt {
            Stmt::FunctionDef(def) if def.name.as_str() == name => Some(def),
            _ => None,
        })
    }

    /// Package that relative imports in this module are resolved against.
    fn anchor_package(&self) -> Option<ModulePath> {
        if self.is_package {
            Some(self.path.clone())
        } else {
            self.path.parent()
        }
    }

    fn resolve_from(&self, module: Option<&str>, level: u32) -> Option<ModulePath> {
        if level == 0 {
            return module.map(ModulePath::new);
        }
        let mut base = self.anchor_package()?;
        for _ in 1..level {
            base = base.parent()?;
        }
        Some(module.map_or_else(|| base.clone(), |m| base.join(m)))
    }

    fn scan(
        &self,
        body: &[Stmt],
        imports: &mut ImportTable,
        bindings: &mut BTreeMap<String, Binding>,
    ) {
        for stmt in body {
            match stmt {
                Stmt::Import(import) => {
                    for alias in &import.names {
                        let dotted = alias.name.as_str();
                        match &alias.asname {
                            Some(asname) => {
                                imports.insert(asname.as_str(), ImportedName::Module(dotted.into()));
                            }
                            None => {
                                let top = dotted.split('.').next().unwrap_or(dotted);
                                imports.insert(top, ImportedName::Module(top.into()));
                            }
                        }
                    }
                }
                Stmt::ImportFrom(from) => {
                    let Some(module) =
                        self.resolve_from(from.module.as_ref().map(ast::Identifier::as_str), from.level)
                    else {
                        debug!(module = %self.path, level = from.level, "relative import escapes top-level package");
                        continue;
                    };
                    for alias in &from.names {
                        let name = alias.name.as_str();
                        if name == "*" {
                            continue;
                        }
                        let local = alias.asname.as_ref().map_or(name, ast::Identifier::as_str);
                        imports.insert(
                            local,
                            ImportedName::Symbol {
                                module: module.clone(),
                                name: name.to_string(),
                            },
                        );
                    }
                }
                Stmt::ClassDef(class) => {
                    bindings.insert(class.name.to_string(), Binding::Class);
                }
                Stmt::FunctionDef(def) => {
                    bindings.insert(def.name.to_string(), Binding::Function);
                }
                Stmt::Assign(assign) => {
                    let binding = binding_for(&assign.value);
                    for target in &assign.targets {
                        if let Expr::Name(name) = target {
                            bindings.insert(name.id.to_string(), binding.clone());
                        }
                    }
                }
                Stmt::AnnAssign(assign) => {
                    if let Expr::Name(name) = assign.target.as_ref() {
                        let binding = assign
                            .value
                            .as_deref()
                            .map_or(Binding::Value, binding_for);
                        bindings.insert(name.id.to_string(), binding);
                    }
                }
                Stmt::If(stmt_if) => {
                    self.scan(&stmt_if.body, imports, bindings);
                    for clause in &stmt_if.elif_else_clauses {
                        self.scan(&clause.body, imports, bindings);
                    }
                }
                Stmt::Try(stmt_try) => {
                    self.scan(&stmt_try.body, imports, bindings);
                    self.scan(&stmt_try.orelse, imports, bindings);
                }
                _ => {}
            }
        }
    }
}

fn binding_for(value: &Expr) -> Binding {
    let Expr::Call(call) = value else {
        return Binding::Value;
    };
    match call.func.as_ref() {
        Expr::Name(name) => Binding::Instance {
            class: name.id.to_string(),
        },
        Expr::Attribute(attr) => Binding::Instance {
            class: attr.attr.to_string(),
        },
        _ => Binding::Value,
    }
}
