//! Facade synthesis.
//!
//! Turns the reflected [`EndpointMap`] into class specifications: one root
//! facade plus one sub-facade per non-default namespace. Every present
//! endpoint variant becomes one delegating method whose parameter and
//! return annotations come from the [`TypeRenderer`].

use crate::imports::ImportSet;
use crate::naming::{claim_unique, endpoint_alias, namespace_class_name};
use crate::render::TypeRenderer;
use facade_core::{GeneratorConfig, ModulePath, NamespaceName};
use facade_introspector::{
    CallableSignature, DefaultName, DefaultValue, EndpointDescriptor, EndpointMap, NameSource,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// An annotated class attribute of a facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacadeField {
    /// Attribute name
    pub name: String,
    /// Annotation text
    pub type_name: String,
}

/// One generated method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSpec {
    /// Method name (`<endpoint>` or `<endpoint><async suffix>`)
    pub name: String,
    /// `true` for the `async def` variant
    pub is_async: bool,
    /// `true` if the target is a coroutine function and must be awaited
    pub awaits: bool,
    /// Parameter list, starting with `self`
    pub signature: String,
    /// Rendered return annotation
    pub return_type: String,
    /// Callable the method delegates to, e.g. `_ep_default_health_check.sync`
    pub target: String,
    /// Keyword arguments passed to the target
    pub arguments: String,
}

impl MethodSpec {
    /// The `def` line as it appears in the emitted module, without
    /// indentation.
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "{}def {}({}) -> {}:",
            if self.is_async { "async " } else { "" },
            self.name,
            self.signature,
            self.return_type
        )
    }
}

/// Specification of one generated class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacadeSpec {
    /// Python class name
    pub class_name: String,
    /// Annotated attributes besides the transport handle
    pub fields: Vec<FacadeField>,
    /// Extra `__init__` statements, after the transport handle is set
    pub init_statements: Vec<String>,
    /// Methods in emission order
    pub methods: Vec<MethodSpec>,
}

impl FacadeSpec {
    fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: Vec::new(),
            init_statements: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FacadeField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `import <module> as <alias>` for one endpoint module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointImport {
    /// Endpoint module
    pub module: ModulePath,
    /// Alias the methods use
    pub alias: String,
}

impl EndpointImport {
    /// The import statement.
    #[must_use]
    pub fn statement(&self) -> String {
        format!("import {} as {}", self.module, self.alias)
    }
}

/// Output of [`FacadeSynthesizer::synthesize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacadeSet {
    /// Root facade class
    pub root: FacadeSpec,
    /// Sub-facade classes in namespace order
    pub namespaces: Vec<FacadeSpec>,
    /// Imports needed by every rendered annotation and default
    pub imports: ImportSet,
    /// Endpoint module aliases in namespace and module order
    pub endpoint_imports: Vec<EndpointImport>,
}

impl FacadeSet {
    /// All generated methods, sub-facades first.
    pub fn methods(&self) -> impl Iterator<Item = &MethodSpec> {
        self.namespaces
            .iter()
            .chain(std::iter::once(&self.root))
            .flat_map(|spec| &spec.methods)
    }

    /// Number of generated methods.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods().count()
    }
}

/// Builds the facade classes for one package.
#[derive(Debug, Clone)]
pub struct FacadeSynthesizer<'a> {
    renderer: TypeRenderer,
    config: &'a GeneratorConfig,
}

impl<'a> FacadeSynthesizer<'a> {
    /// Creates a synthesizer for the package rooted at `package`.
    #[must_use]
    pub fn new(package: &ModulePath, config: &'a GeneratorConfig) -> Self {
        Self {
            renderer: TypeRenderer::new(package, config),
            config,
        }
    }

    /// Sets whether the emitted module star-imports the models package; see
    /// [`TypeRenderer::with_models_import`].
    #[must_use]
    pub fn with_models_import(mut self, enabled: bool) -> Self {
        self.renderer = self.renderer.with_models_import(enabled);
        self
    }

    /// Synthesizes the root facade `class_name` and its sub-facades.
    ///
    /// Methods of the default namespace land on the root; every other
    /// namespace becomes a `_<Pascal>Namespace` class reachable through a
    /// root attribute named after the namespace.
    #[must_use]
    pub fn synthesize(&self, endpoints: &EndpointMap, class_name: &str) -> FacadeSet {
        let mut root = FacadeSpec::new(class_name);
        let mut namespaces = Vec::new();
        let mut imports = ImportSet::new();
        let mut endpoint_imports = Vec::new();
        let mut aliases = BTreeSet::new();

        for (namespace, descriptors) in endpoints {
            let is_default = namespace.as_str() == self.config.default_namespace;
            let mut spec = FacadeSpec::new(namespace_class_name(namespace));

            for endpoint in descriptors {
                // `a` + `b_c` and `a_b` + `c` share a base alias.
                let alias = claim_unique(&mut aliases, &endpoint_alias(namespace, &endpoint.name));
                let target = if is_default { &mut root } else { &mut spec };
                self.add_methods(target, endpoint, &alias, &mut imports);
                endpoint_imports.push(EndpointImport {
                    module: endpoint.module.clone(),
                    alias,
                });
            }

            if !is_default {
                Self::attach_namespace(&mut root, namespace, &spec.class_name);
                namespaces.push(spec);
            }
        }

        let set = FacadeSet {
            root,
            namespaces,
            imports,
            endpoint_imports,
        };
        info!(
            class = class_name,
            sub_facades = set.namespaces.len(),
            methods = set.method_count(),
            "synthesized facade"
        );
        set
    }

    fn attach_namespace(root: &mut FacadeSpec, namespace: &NamespaceName, class_name: &str) {
        root.fields.push(FacadeField {
            name: namespace.to_string(),
            type_name: class_name.to_string(),
        });
        root.init_statements
            .push(format!("self.{namespace} = {class_name}(self._raw)"));
        debug!(namespace = %namespace, class = class_name, "attached sub-facade");
    }

    fn add_methods(
        &self,
        spec: &mut FacadeSpec,
        endpoint: &EndpointDescriptor,
        alias: &str,
        imports: &mut ImportSet,
    ) {
        if let Some(sync) = &endpoint.sync {
            spec.methods
                .push(self.method(endpoint.name.clone(), sync, alias, false, imports));
        }
        if let Some(asyncio) = &endpoint.asyncio {
            let name = format!("{}{}", endpoint.name, self.config.async_suffix);
            spec.methods
                .push(self.method(name, asyncio, alias, true, imports));
        }
    }

    fn method(
        &self,
        name: String,
        signature: &CallableSignature,
        alias: &str,
        is_async: bool,
        imports: &mut ImportSet,
    ) -> MethodSpec {
        let mut parameters = Vec::with_capacity(signature.parameters.len());
        let mut arguments = vec![format!("{}=self._raw", self.config.transport_param)];

        for param in &signature.parameters {
            let rendered = self.renderer.render(&param.descriptor);
            imports.merge(&rendered.imports);

            let default = match &param.default {
                None => String::new(),
                Some(DefaultValue::Expression { text, names }) => {
                    imports.extend(names.iter().map(import_for));
                    format!(" = {text}")
                }
                Some(DefaultValue::UnsetSentinel) => {
                    let singleton = &self.config.unset_singleton;
                    imports.insert(format!(
                        "from {} import {singleton}",
                        self.renderer.types_module()
                    ));
                    format!(" = {singleton}")
                }
            };
            parameters.push(format!("{}: {}{default}", param.name, rendered.code));
            arguments.push(format!("{0}={0}", param.name));
        }

        let returns = self.renderer.render(&signature.returns);
        imports.merge(&returns.imports);

        let signature_text = if parameters.is_empty() {
            "self".to_string()
        } else {
            format!("self, *, {}", parameters.join(", "))
        };

        debug!(method = %name, target = %alias, is_async, "rendered method");
        MethodSpec {
            name,
            is_async,
            awaits: is_async && signature.is_coroutine,
            signature: signature_text,
            return_type: returns.code,
            target: format!("{alias}.{}", signature.function),
            arguments: arguments.join(", "),
        }
    }
}

/// Import statement that binds `name.local` the way the endpoint module
/// binds it.
fn import_for(name: &DefaultName) -> String {
    let local = name.local.as_str();
    match &name.source {
        NameSource::Module { module } if module.as_str() == local => format!("import {module}"),
        NameSource::Module { module } => format!("import {module} as {local}"),
        NameSource::Symbol { module, name } if name == local => format!("from {module} import {name}"),
        NameSource::Symbol { module, name } => format!("from {module} import {name} as {local}"),
    }
}
