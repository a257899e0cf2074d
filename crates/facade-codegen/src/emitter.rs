//! Emission of the facade module.
//!
//! The [`EmissionAssembler`] adds the base imports, orders and trims the
//! import block, and renders the module and harness templates into one
//! Python source file.

use crate::imports::{ImportSet, TYPING_ANY};
use crate::synthesizer::{EndpointImport, FacadeField, FacadeSet, FacadeSpec, MethodSpec};
use crate::template_engine::{HARNESS_TEMPLATE, MODULE_TEMPLATE, TemplateEngine};
use facade_core::{GeneratorConfig, PackageName, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

static ANY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bAny\b").expect("valid regex"));

/// Options for one emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Client package the facade wraps
    pub package: PackageName,
    /// Emit the `from <pkg>.models import *` line
    pub models_import: bool,
    /// Append the `__main__` self-test harness
    pub harness: bool,
}

impl EmitOptions {
    /// Options with the models import and the harness enabled.
    #[must_use]
    pub const fn new(package: PackageName) -> Self {
        Self {
            package,
            models_import: true,
            harness: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct ClassContext<'a> {
    class_name: &'a str,
    is_root: bool,
    fields: &'a [FacadeField],
    init_statements: &'a [String],
    methods: &'a [MethodSpec],
}

impl<'a> ClassContext<'a> {
    fn of(spec: &'a FacadeSpec, is_root: bool) -> Self {
        Self {
            class_name: &spec.class_name,
            is_root,
            fields: &spec.fields,
            init_statements: &spec.init_statements,
            methods: &spec.methods,
        }
    }
}

#[derive(Debug, Serialize)]
struct ModuleContext<'a> {
    package: &'a str,
    imports: Vec<&'a str>,
    has_models_import: bool,
    models_import: String,
    endpoint_imports: Vec<String>,
    classes: Vec<ClassContext<'a>>,
}

#[derive(Debug, Serialize)]
struct HarnessContext<'a> {
    package: &'a str,
    class_name: &'a str,
}

/// Assembles the final Python module.
#[derive(Debug)]
pub struct EmissionAssembler<'a> {
    engine: TemplateEngine<'a>,
    config: GeneratorConfig,
}

impl EmissionAssembler<'_> {
    /// Creates an assembler.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in templates fail to register.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
            config,
        })
    }

    /// Final import block for `set`: the synthesized imports plus the base
    /// client import, minus `typing.Any` when no method signature uses it.
    #[must_use]
    pub fn module_imports(&self, set: &FacadeSet, package: &PackageName) -> ImportSet {
        let mut imports = set.imports.clone();
        imports.insert(format!(
            "from {package}.{} import {} as _GeneratedClient",
            self.config.client_module, self.config.client_class
        ));

        let uses_any = set
            .methods()
            .any(|method| ANY_TOKEN.is_match(&method.header()));
        if !uses_any && imports.remove(TYPING_ANY) {
            debug!("no signature mentions Any, dropping its import");
        }
        imports
    }

    /// Renders the facade module for `set`.
    ///
    /// # Errors
    ///
    /// Returns [`facade_core::Error::Template`] if a template fails to
    /// render.
    pub fn emit(&self, set: &FacadeSet, options: &EmitOptions) -> Result<String> {
        let imports = self.module_imports(set, &options.package);

        let mut classes: Vec<ClassContext<'_>> = set
            .namespaces
            .iter()
            .map(|spec| ClassContext::of(spec, false))
            .collect();
        classes.push(ClassContext::of(&set.root, true));

        let context = ModuleContext {
            package: options.package.as_str(),
            imports: imports.ordered(),
            has_models_import: options.models_import,
            models_import: format!(
                "from {}.{} import *",
                options.package, self.config.models_module
            ),
            endpoint_imports: set
                .endpoint_imports
                .iter()
                .map(EndpointImport::statement)
                .collect(),
            classes,
        };
        let mut source = self.engine.render(MODULE_TEMPLATE, &context)?;

        if options.harness {
            let harness = self.engine.render(
                HARNESS_TEMPLATE,
                &HarnessContext {
                    package: options.package.as_str(),
                    class_name: &set.root.class_name,
                },
            )?;
            source.push_str("\n\n");
            source.push_str(&harness);
        }

        debug!(bytes = source.len(), "emitted facade module");
        Ok(source)
    }
}
