//! Endpoint reflection.
//!
//! Reads the synchronous and asynchronous entry points of one endpoint
//! module and turns their signatures into descriptors.

use crate::descriptor::{DescriptorBuilder, TypeDescriptor};
use crate::package::PythonPackage;
use crate::parser::{ImportedName, ParsedModule};
use crate::symbols::SymbolTable;
use facade_core::{Error, GeneratorConfig, ModulePath, NamespaceName, Result};
use ruff_python_ast::visitor::{self, Visitor};
use ruff_python_ast::{Expr, StmtFunctionDef};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Where a name read by a default expression is bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NameSource {
    /// A module bound by `import`
    Module {
        /// Imported module
        module: ModulePath,
    },
    /// A name imported into, or defined by, the endpoint module
    Symbol {
        /// Module to import the name from
        module: ModulePath,
        /// Name inside that module
        name: String,
    },
}

/// A free name of a default expression and the binding it reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultName {
    /// Name as written in the expression
    pub local: String,
    /// Binding in the endpoint module
    pub source: NameSource,
}

/// Default value of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefaultValue {
    /// Verbatim source text of the default expression
    Expression {
        /// Source text
        text: String,
        /// Module-level names the text reads, in first-use order
        names: Vec<DefaultName>,
    },
    /// The package's unset sentinel
    UnsetSentinel,
}

impl DefaultValue {
    /// An expression that reads no module-level names, such as `20`.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Expression {
            text: text.into(),
            names: Vec::new(),
        }
    }
}

/// One parameter of an endpoint function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Reflected annotation
    pub descriptor: TypeDescriptor,
    /// Default value, if any
    pub default: Option<DefaultValue>,
}

/// Reflected signature of an endpoint function, minus the transport
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableSignature {
    /// Function name inside the endpoint module
    pub function: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterInfo>,
    /// Reflected return annotation
    pub returns: TypeDescriptor,
    /// `true` for `async def`
    pub is_coroutine: bool,
}

/// Both variants of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDescriptor {
    /// Namespace the endpoint belongs to
    pub namespace: NamespaceName,
    /// Endpoint name, the module's last segment
    pub name: String,
    /// Endpoint module
    pub module: ModulePath,
    /// Synchronous variant
    pub sync: Option<CallableSignature>,
    /// Asynchronous variant
    pub asyncio: Option<CallableSignature>,
}

impl EndpointDescriptor {
    /// Returns `true` if the module exposes the synchronous function.
    #[must_use]
    pub const fn has_sync(&self) -> bool {
        self.sync.is_some()
    }

    /// Returns `true` if the module exposes the asynchronous function.
    #[must_use]
    pub const fn has_async(&self) -> bool {
        self.asyncio.is_some()
    }
}

/// Namespace to reflected endpoints, in sorted module order.
pub type EndpointMap = BTreeMap<NamespaceName, Vec<EndpointDescriptor>>;

/// Reflects endpoint modules of one package.
#[derive(Debug, Clone, Copy)]
pub struct EndpointReflector<'a> {
    package: &'a PythonPackage,
    symbols: &'a SymbolTable,
    config: &'a GeneratorConfig,
}

impl<'a> EndpointReflector<'a> {
    /// Creates a reflector.
    #[must_use]
    pub const fn new(
        package: &'a PythonPackage,
        symbols: &'a SymbolTable,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            package,
            symbols,
            config,
        }
    }

    /// Loads `module` and reflects its sync and async functions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleLoad`] if the module file is missing, unreadable
    /// or not valid Python.
    pub fn reflect(&self, namespace: &NamespaceName, module: &ModulePath) -> Result<EndpointDescriptor> {
        let parsed = self.load(module)?;
        Ok(self.reflect_parsed(namespace, &parsed))
    }

    /// Reflects an already parsed module.
    #[must_use]
    pub fn reflect_parsed(&self, namespace: &NamespaceName, parsed: &ParsedModule) -> EndpointDescriptor {
        let builder = DescriptorBuilder::new(parsed, self.symbols);
        let signature = |function: &str| {
            parsed
                .function(function)
                .map(|def| self.signature(parsed, &builder, def))
        };

        let descriptor = EndpointDescriptor {
            namespace: namespace.clone(),
            name: parsed.path().last().to_string(),
            module: parsed.path().clone(),
            sync: signature(&self.config.sync_function),
            asyncio: signature(&self.config.async_function),
        };
        debug!(
            module = %descriptor.module,
            sync = descriptor.has_sync(),
            asyncio = descriptor.has_async(),
            "reflected endpoint"
        );
        descriptor
    }

    fn load(&self, module: &ModulePath) -> Result<ParsedModule> {
        let package_path = self.package.module_path();
        let relative = module
            .as_str()
            .strip_prefix(package_path.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .ok_or_else(|| Error::ModuleLoad {
                module: module.to_string(),
                message: format!("module is outside package '{package_path}'"),
                source: None,
            })?;
        let (file, is_package) =
            self.package
                .module_file(relative)
                .ok_or_else(|| Error::ModuleLoad {
                    module: module.to_string(),
                    message: "module file not found".to_string(),
                    source: None,
                })?;
        ParsedModule::load(module.clone(), &file, is_package)
    }

    fn signature(
        &self,
        parsed: &ParsedModule,
        builder: &DescriptorBuilder<'_>,
        def: &StmtFunctionDef,
    ) -> CallableSignature {
        let params = &def.parameters;
        let parameters = params
            .posonlyargs
            .iter()
            .chain(&params.args)
            .chain(&params.kwonlyargs)
            .filter(|p| p.parameter.name.as_str() != self.config.transport_param)
            .map(|p| ParameterInfo {
                name: p.parameter.name.to_string(),
                descriptor: p
                    .parameter
                    .annotation
                    .as_deref()
                    .map_or(TypeDescriptor::Unspecified, |a| builder.build(a)),
                default: p
                    .default
                    .as_deref()
                    .map(|d| self.default_value(parsed, builder, d)),
            })
            .collect();

        CallableSignature {
            function: def.name.to_string(),
            parameters,
            returns: def
                .returns
                .as_deref()
                .map_or(TypeDescriptor::Unspecified, |r| builder.build(r)),
            is_coroutine: def.is_async,
        }
    }

    fn default_value(
        &self,
        parsed: &ParsedModule,
        builder: &DescriptorBuilder<'_>,
        default: &Expr,
    ) -> DefaultValue {
        let is_unset = match default {
            Expr::Name(_) | Expr::Attribute(_) => builder
                .resolve(default)
                .is_some_and(|name| self.symbols.is_unset_singleton(&name)),
            Expr::Call(call) if call.arguments.args.is_empty() && call.arguments.keywords.is_empty() => {
                builder
                    .resolve(&call.func)
                    .is_some_and(|name| self.symbols.is_unset_type(&name))
            }
            _ => false,
        };

        if is_unset {
            DefaultValue::UnsetSentinel
        } else {
            DefaultValue::Expression {
                text: parsed.text_of(default).to_string(),
                names: free_names(parsed, default),
            }
        }
    }
}

/// Names a default expression reads from module scope, resolved against the
/// endpoint module. Builtins and unbound names are left out.
fn free_names(parsed: &ParsedModule, default: &Expr) -> Vec<DefaultName> {
    let mut collector = NameCollector::default();
    collector.visit_expr(default);

    collector
        .names
        .into_iter()
        .filter_map(|local| {
            let source = match parsed.imports().get(local) {
                Some(ImportedName::Module(module)) => NameSource::Module {
                    module: module.clone(),
                },
                Some(ImportedName::Symbol { module, name }) => NameSource::Symbol {
                    module: module.clone(),
                    name: name.clone(),
                },
                None if parsed.bindings().contains_key(local) => NameSource::Symbol {
                    module: parsed.path().clone(),
                    name: local.to_string(),
                },
                None => {
                    debug!(module = %parsed.path(), name = local, "default reads an unbound name");
                    return None;
                }
            };
            Some(DefaultName {
                local: local.to_string(),
                source,
            })
        })
        .collect()
}

#[derive(Default)]
struct NameCollector<'a> {
    names: Vec<&'a str>,
}

impl<'a> Visitor<'a> for NameCollector<'a> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        if let Expr::Name(name) = expr {
            let id = name.id.as_str();
            if !self.names.contains(&id) {
                self.names.push(id);
            }
        }
        visitor::walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::QualifiedName;
    use facade_core::PackageName;

    const ENDPOINT: &str = r#"
from http import HTTPStatus
from typing import Any, Optional, Union

import httpx

from ...client import AuthenticatedClient, Client
from ...models.greeting_request import GreetingRequest
from ...types import UNSET, Response, Unset


def _get_kwargs(*, body: GreetingRequest) -> dict[str, Any]:
    return {}


def sync(
    client: Union[AuthenticatedClient, Client],
    body: GreetingRequest,
    user_name: str,
    *extra,
    limit: Union[Unset, int] = UNSET,
    other: Union[Unset, int] = Unset(),
    page: int = 1,
    **rest,
) -> Optional[GreetingRequest]:
    return None


async def asyncio(
    *,
    client: Union[AuthenticatedClient, Client],
    body: GreetingRequest,
    user_name: str,
    limit: Union[Unset, int] = UNSET,
    other: Union[Unset, int] = Unset(),
    page: int = 1,
) -> Optional[GreetingRequest]:
    return None
"#;

    fn reflect_source(source: &str) -> EndpointDescriptor {
        let package = PythonPackage::at(PackageName::new("pkg").unwrap(), "/nonexistent".into());
        let config = GeneratorConfig::default();
        let symbols = SymbolTable::empty(&package.module_path(), &config);
        let parsed = ParsedModule::parse(
            ModulePath::new("pkg.api.default.create_greeting"),
            false,
            source.to_string(),
        )
        .unwrap();
        EndpointReflector::new(&package, &symbols, &config)
            .reflect_parsed(&NamespaceName::new("default"), &parsed)
    }

    #[test]
    fn test_both_variants_reflected() {
        let endpoint = reflect_source(ENDPOINT);
        assert_eq!(endpoint.name, "create_greeting");
        assert!(endpoint.has_sync());
        assert!(endpoint.has_async());
        assert!(!endpoint.sync.as_ref().unwrap().is_coroutine);
        assert!(endpoint.asyncio.as_ref().unwrap().is_coroutine);
    }

    #[test]
    fn test_transport_and_varargs_excluded() {
        let endpoint = reflect_source(ENDPOINT);
        let names: Vec<_> = endpoint
            .sync
            .unwrap()
            .parameters
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["body", "user_name", "limit", "other", "page"]);
    }

    #[test]
    fn test_defaults() {
        let endpoint = reflect_source(ENDPOINT);
        let params = endpoint.sync.unwrap().parameters;

        assert_eq!(params[0].default, None);
        assert_eq!(params[2].default, Some(DefaultValue::UnsetSentinel));
        assert_eq!(params[3].default, Some(DefaultValue::UnsetSentinel));
        assert_eq!(params[4].default, Some(DefaultValue::literal("1")));
    }

    #[test]
    fn test_parameter_and_return_descriptors() {
        let endpoint = reflect_source(ENDPOINT);
        let sync = endpoint.sync.unwrap();
        let greeting = TypeDescriptor::Named(QualifiedName::new(
            "pkg.models.greeting_request",
            "GreetingRequest",
        ));

        assert_eq!(sync.parameters[0].descriptor, greeting);
        assert_eq!(sync.returns, TypeDescriptor::optional(greeting));
        assert_eq!(
            sync.parameters[2].descriptor,
            TypeDescriptor::Union {
                members: vec![
                    TypeDescriptor::Named(QualifiedName::new("pkg.types", "Unset")),
                    TypeDescriptor::Primitive {
                        name: "int".to_string()
                    },
                ]
            }
        );
    }

    #[test]
    fn test_missing_annotations_are_unspecified() {
        let endpoint = reflect_source("def sync(client, x=None):\n    pass\n");
        let sync = endpoint.sync.as_ref().unwrap();
        assert_eq!(sync.parameters.len(), 1);
        assert_eq!(sync.parameters[0].descriptor, TypeDescriptor::Unspecified);
        assert_eq!(sync.parameters[0].default, Some(DefaultValue::literal("None")));
        assert_eq!(sync.returns, TypeDescriptor::Unspecified);
        assert!(!endpoint.has_async());
    }

    #[test]
    fn test_default_expression_records_free_names() {
        let endpoint = reflect_source(
            "import datetime\n\
             from typing import Union\n\
             from dateutil.parser import isoparse\n\
             from ...types import UNSET, Unset\n\n\
             PAGE_SIZE = 50\n\n\
             def sync(*, client, since: Union[Unset, datetime.date] = isoparse(\"2020-01-01\").date(),\n\
             \x20   at: datetime.datetime = datetime.datetime(2020, 1, 1), size: int = PAGE_SIZE,\n\
             \x20   tags: list = list()) -> None:\n    pass\n",
        );
        let params = endpoint.sync.unwrap().parameters;

        assert_eq!(
            params[0].default,
            Some(DefaultValue::Expression {
                text: "isoparse(\"2020-01-01\").date()".to_string(),
                names: vec![DefaultName {
                    local: "isoparse".to_string(),
                    source: NameSource::Symbol {
                        module: ModulePath::new("dateutil.parser"),
                        name: "isoparse".to_string(),
                    },
                }],
            })
        );
        assert_eq!(
            params[1].default,
            Some(DefaultValue::Expression {
                text: "datetime.datetime(2020, 1, 1)".to_string(),
                names: vec![DefaultName {
                    local: "datetime".to_string(),
                    source: NameSource::Module {
                        module: ModulePath::new("datetime"),
                    },
                }],
            })
        );
        assert_eq!(
            params[2].default,
            Some(DefaultValue::Expression {
                text: "PAGE_SIZE".to_string(),
                names: vec![DefaultName {
                    local: "PAGE_SIZE".to_string(),
                    source: NameSource::Symbol {
                        module: ModulePath::new("pkg.api.default.create_greeting"),
                        name: "PAGE_SIZE".to_string(),
                    },
                }],
            })
        );
        // Builtins need no import.
        assert_eq!(params[3].default, Some(DefaultValue::literal("list()")));
    }

    #[test]
    fn test_module_without_entry_points() {
        let endpoint = reflect_source("def helper():\n    pass\n");
        assert!(!endpoint.has_sync());
        assert!(!endpoint.has_async());
    }

    #[test]
    fn test_reflect_missing_file_is_load_error() {
        let package = PythonPackage::at(PackageName::new("pkg").unwrap(), "/nonexistent".into());
        let config = GeneratorConfig::default();
        let symbols = SymbolTable::empty(&package.module_path(), &config);
        let err = EndpointReflector::new(&package, &symbols, &config)
            .reflect(
                &NamespaceName::new("default"),
                &ModulePath::new("pkg.api.default.gone"),
            )
            .unwrap_err();
        assert!(err.is_module_load_error());
    }
}
