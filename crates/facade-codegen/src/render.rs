//! Type descriptor rendering.
//!
//! [`TypeRenderer`] turns a reflected [`TypeDescriptor`] back into Python
//! annotation source text plus the imports that text needs. Rendering is a
//! pure function of the descriptor and the host package: the same input
//! always yields the same code and imports.

use crate::imports::{ImportSet, TYPING_ANY};
use facade_core::{GeneratorConfig, ModulePath};
use facade_introspector::{QualifiedName, TypeDescriptor};
use serde::Serialize;
use tracing::debug;

/// Python source for one annotation, with the imports it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedType {
    /// Annotation source text
    pub code: String,
    /// Import statements the text relies on
    pub imports: ImportSet,
}

impl RenderedType {
    fn bare(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            imports: ImportSet::new(),
        }
    }

    fn imported(code: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            imports: ImportSet::single(statement),
        }
    }

    fn any() -> Self {
        Self::imported("Any", TYPING_ANY)
    }

    /// Returns `true` if the code is exactly `Any`.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.code == "Any"
    }
}

/// Renders descriptors for one client package.
#[derive(Debug, Clone)]
pub struct TypeRenderer {
    models_module: ModulePath,
    types_module: ModulePath,
    models_import: bool,
}

impl TypeRenderer {
    /// Creates a renderer for the package rooted at `package`.
    #[must_use]
    pub fn new(package: &ModulePath, config: &GeneratorConfig) -> Self {
        Self {
            models_module: package.join(&config.models_module),
            types_module: package.join(&config.types_module),
            models_import: true,
        }
    }

    /// Sets whether model classes are reachable through a star import of the
    /// models package. Without it they render as dotted paths like any other
    /// third-party name.
    #[must_use]
    pub const fn with_models_import(mut self, enabled: bool) -> Self {
        self.models_import = enabled;
        self
    }

    /// Module holding the package's helper types.
    #[must_use]
    pub const fn types_module(&self) -> &ModulePath {
        &self.types_module
    }

    /// Renders `descriptor` as Python annotation text.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_codegen::TypeRenderer;
    /// use facade_core::{GeneratorConfig, ModulePath};
    /// use facade_introspector::{QualifiedName, TypeDescriptor};
    ///
    /// let renderer = TypeRenderer::new(&ModulePath::new("client_output"), &GeneratorConfig::default());
    /// let project = TypeDescriptor::Named(QualifiedName::new("client_output.models.project", "Project"));
    ///
    /// let rendered = renderer.render(&TypeDescriptor::optional(project));
    /// assert_eq!(rendered.code, "Optional[Project]");
    /// assert_eq!(rendered.imports.ordered(), ["from typing import Optional"]);
    /// ```
    #[must_use]
    pub fn render(&self, descriptor: &TypeDescriptor) -> RenderedType {
        match descriptor {
            TypeDescriptor::Any | TypeDescriptor::Unspecified => RenderedType::any(),
            TypeDescriptor::None => RenderedType::bare("None"),
            TypeDescriptor::Union { members } => self.render_union(members),
            TypeDescriptor::Generic { origin, args } => self.render_generic(origin, args),
            TypeDescriptor::Primitive { name } => RenderedType::bare(name.as_str()),
            TypeDescriptor::Named(name) => self.render_named(name),
            TypeDescriptor::ArgList { items } => {
                let (codes, imports) = self.render_all(items);
                RenderedType {
                    code: format!("[{}]", codes.join(", ")),
                    imports,
                }
            }
            TypeDescriptor::Literal { text } => RenderedType::bare(text.as_str()),
            TypeDescriptor::Unknown { text } => {
                debug!(annotation = %text, "unresolvable annotation, rendering as Any");
                RenderedType::any()
            }
        }
    }

    fn render_all(&self, descriptors: &[TypeDescriptor]) -> (Vec<String>, ImportSet) {
        let mut imports = ImportSet::new();
        let codes = descriptors
            .iter()
            .map(|descriptor| {
                let rendered = self.render(descriptor);
                imports.merge(&rendered.imports);
                rendered.code
            })
            .collect();
        (codes, imports)
    }

    fn render_union(&self, members: &[TypeDescriptor]) -> RenderedType {
        let (codes, mut imports) = self.render_all(members);

        if codes.iter().all(|code| code == "Any") {
            imports.insert(TYPING_ANY);
            return RenderedType {
                code: "Any".to_string(),
                imports,
            };
        }

        if let [first, second] = codes.as_slice() {
            let other = match (first.as_str(), second.as_str()) {
                (other, "None") | ("None", other) => Some(other),
                _ => None,
            };
            if let Some(other) = other {
                imports.insert("from typing import Optional");
                return RenderedType {
                    code: format!("Optional[{other}]"),
                    imports,
                };
            }
        }

        imports.insert("from typing import Union");
        RenderedType {
            code: format!("Union[{}]", codes.join(", ")),
            imports,
        }
    }

    fn render_generic(&self, origin: &QualifiedName, args: &[TypeDescriptor]) -> RenderedType {
        if origin.is_typing() && matches!(origin.name.as_str(), "Union" | "Optional") && !args.is_empty() {
            let members = if origin.name == "Optional" {
                TypeDescriptor::optional(TypeDescriptor::union(args.iter().cloned()))
            } else {
                TypeDescriptor::union(args.iter().cloned())
            };
            return self.render(&members);
        }

        let mut head = if origin.is_stdlib_generic() {
            if origin.is_builtin() {
                RenderedType::bare(origin.name.as_str())
            } else {
                RenderedType::imported(
                    origin.name.as_str(),
                    format!("from typing import {}", origin.name),
                )
            }
        } else {
            self.render_named(origin)
        };

        if args.is_empty() {
            return head;
        }

        let (codes, imports) = self.render_all(args);
        head.imports.merge(&imports);
        RenderedType {
            code: format!("{}[{}]", head.code, codes.join(", ")),
            imports: head.imports,
        }
    }

    fn render_named(&self, name: &QualifiedName) -> RenderedType {
        let module = &name.module;

        if name.is_builtin() {
            return RenderedType::bare(name.name.as_str());
        }
        if self.models_import && module.starts_with(&self.models_module) {
            return RenderedType::bare(name.name.as_str());
        }
        if *module == self.types_module {
            return RenderedType::imported(
                name.name.as_str(),
                format!("from {module} import {}", name.name),
            );
        }
        if name.is_typing() {
            if name.name == "Any" {
                return RenderedType::any();
            }
            return RenderedType::imported(
                name.name.as_str(),
                format!("from typing import {}", name.name),
            );
        }
        if matches!(module.as_str(), "uuid" | "datetime") {
            return RenderedType::imported(
                name.name.as_str(),
                format!("from {module} import {}", name.name),
            );
        }

        RenderedType::imported(
            format!("{module}.{}", name.name),
            format!("import {}", module.top_level()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> TypeRenderer {
        TypeRenderer::new(&ModulePath::new("client_output"), &GeneratorConfig::default())
    }

    fn primitive(name: &str) -> TypeDescriptor {
        TypeDescriptor::Primitive {
            name: name.to_string(),
        }
    }

    fn model(name: &str) -> TypeDescriptor {
        TypeDescriptor::Named(QualifiedName::new(
            format!("client_output.models.{}", name.to_lowercase()),
            name,
        ))
    }

    fn generic(origin: QualifiedName, args: Vec<TypeDescriptor>) -> TypeDescriptor {
        TypeDescriptor::Generic { origin, args }
    }

    fn imports(rendered: &RenderedType) -> Vec<&str> {
        rendered.imports.ordered()
    }

    #[test]
    fn test_any_and_unspecified() {
        for descriptor in [TypeDescriptor::Any, TypeDescriptor::Unspecified] {
            let rendered = renderer().render(&descriptor);
            assert_eq!(rendered.code, "Any");
            assert_eq!(imports(&rendered), [TYPING_ANY]);
        }
    }

    #[test]
    fn test_none_and_primitives_need_no_import() {
        let r = renderer();
        assert_eq!(r.render(&TypeDescriptor::None), RenderedType::bare("None"));
        assert_eq!(r.render(&primitive("str")), RenderedType::bare("str"));
    }

    #[test]
    fn test_model_is_bare_without_import() {
        let rendered = renderer().render(&model("Project"));
        assert_eq!(rendered.code, "Project");
        assert!(rendered.imports.is_empty());
    }

    #[test]
    fn test_model_uses_dotted_path_without_models_import() {
        let rendered = renderer()
            .with_models_import(false)
            .render(&TypeDescriptor::optional(model("Project")));
        assert_eq!(rendered.code, "Optional[client_output.models.project.Project]");
        assert_eq!(
            imports(&rendered),
            ["from typing import Optional", "import client_output"]
        );
    }

    #[test]
    fn test_types_module_name_is_imported() {
        let rendered = renderer().render(&TypeDescriptor::Named(QualifiedName::new(
            "client_output.types",
            "File",
        )));
        assert_eq!(rendered.code, "File");
        assert_eq!(imports(&rendered), ["from client_output.types import File"]);
    }

    #[test]
    fn test_well_known_names() {
        let r = renderer();
        let uuid = r.render(&TypeDescriptor::Named(QualifiedName::new("uuid", "UUID")));
        assert_eq!(uuid.code, "UUID");
        assert_eq!(imports(&uuid), ["from uuid import UUID"]);

        let date = r.render(&TypeDescriptor::Named(QualifiedName::new("datetime", "date")));
        assert_eq!(date.code, "date");
        assert_eq!(imports(&date), ["from datetime import date"]);

        let never = r.render(&TypeDescriptor::Named(QualifiedName::typing("NoReturn")));
        assert_eq!(never.code, "NoReturn");
        assert_eq!(imports(&never), ["from typing import NoReturn"]);
    }

    #[test]
    fn test_third_party_name_uses_dotted_path() {
        let rendered = renderer().render(&TypeDescriptor::Named(QualifiedName::new(
            "httpx._models",
            "Response",
        )));
        assert_eq!(rendered.code, "httpx._models.Response");
        assert_eq!(imports(&rendered), ["import httpx"]);
    }

    #[test]
    fn test_union_with_none_becomes_optional() {
        let rendered = renderer().render(&TypeDescriptor::optional(primitive("int")));
        assert_eq!(rendered.code, "Optional[int]");
        assert_eq!(imports(&rendered), ["from typing import Optional"]);

        let leading_none = renderer().render(&TypeDescriptor::Union {
            members: vec![TypeDescriptor::None, model("Project")],
        });
        assert_eq!(leading_none.code, "Optional[Project]");
    }

    #[test]
    fn test_union_of_any_collapses() {
        let rendered = renderer().render(&TypeDescriptor::Union {
            members: vec![
                TypeDescriptor::Any,
                TypeDescriptor::Unknown {
                    text: "weird".to_string(),
                },
            ],
        });
        assert_eq!(rendered.code, "Any");
        assert_eq!(imports(&rendered), [TYPING_ANY]);
    }

    #[test]
    fn test_wide_union_keeps_member_order() {
        let rendered = renderer().render(&TypeDescriptor::Union {
            members: vec![
                TypeDescriptor::Named(QualifiedName::new("client_output.types", "Unset")),
                primitive("str"),
                TypeDescriptor::None,
            ],
        });
        assert_eq!(rendered.code, "Union[Unset, str, None]");
        assert_eq!(
            imports(&rendered),
            ["from typing import Union", "from client_output.types import Unset"]
        );
    }

    #[test]
    fn test_nested_generics_union_imports() {
        let rendered = renderer().render(&TypeDescriptor::optional(generic(
            QualifiedName::typing("Dict"),
            vec![
                primitive("str"),
                generic(QualifiedName::typing("List"), vec![model("Project")]),
            ],
        )));
        assert_eq!(rendered.code, "Optional[Dict[str, List[Project]]]");
        assert_eq!(
            imports(&rendered),
            [
                "from typing import Dict",
                "from typing import List",
                "from typing import Optional",
            ]
        );
    }

    #[test]
    fn test_builtin_container_origin() {
        let rendered = renderer().render(&generic(QualifiedName::builtin("list"), vec![model("Project")]));
        assert_eq!(rendered.code, "list[Project]");
        assert!(rendered.imports.is_empty());
    }

    #[test]
    fn test_collections_abc_origin_maps_to_typing() {
        let rendered = renderer().render(&generic(
            QualifiedName::new("collections.abc", "Sequence"),
            vec![primitive("int")],
        ));
        assert_eq!(rendered.code, "Sequence[int]");
        assert_eq!(imports(&rendered), ["from typing import Sequence"]);
    }

    #[test]
    fn test_bare_origin() {
        let rendered = renderer().render(&generic(QualifiedName::typing("Dict"), vec![]));
        assert_eq!(rendered.code, "Dict");
        assert_eq!(imports(&rendered), ["from typing import Dict"]);
    }

    #[test]
    fn test_callable_with_arg_list() {
        let rendered = renderer().render(&generic(
            QualifiedName::typing("Callable"),
            vec![
                TypeDescriptor::ArgList {
                    items: vec![primitive("int"), model("Project")],
                },
                TypeDescriptor::None,
            ],
        ));
        assert_eq!(rendered.code, "Callable[[int, Project], None]");
        assert_eq!(imports(&rendered), ["from typing import Callable"]);
    }

    #[test]
    fn test_literal_values_verbatim() {
        let rendered = renderer().render(&generic(
            QualifiedName::typing("Literal"),
            vec![
                TypeDescriptor::Literal {
                    text: "'asc'".to_string(),
                },
                TypeDescriptor::Literal {
                    text: "'desc'".to_string(),
                },
            ],
        ));
        assert_eq!(rendered.code, "Literal['asc', 'desc']");
        assert_eq!(imports(&rendered), ["from typing import Literal"]);
    }

    #[test]
    fn test_external_generic_origin() {
        let rendered = renderer().render(&generic(
            QualifiedName::new("client_output.types", "Response"),
            vec![model("Project")],
        ));
        assert_eq!(rendered.code, "Response[Project]");
        assert_eq!(imports(&rendered), ["from client_output.types import Response"]);

        let third_party = renderer().render(&generic(
            QualifiedName::new("attrs", "Factory"),
            vec![primitive("int")],
        ));
        assert_eq!(third_party.code, "attrs.Factory[int]");
        assert_eq!(imports(&third_party), ["import attrs"]);
    }

    #[test]
    fn test_typing_union_generic_is_normalized() {
        let rendered = renderer().render(&generic(
            QualifiedName::typing("Optional"),
            vec![primitive("str")],
        ));
        assert_eq!(rendered.code, "Optional[str]");
    }

    #[test]
    fn test_unknown_falls_back_to_any() {
        let rendered = renderer().render(&TypeDescriptor::Unknown {
            text: "foo()".to_string(),
        });
        assert!(rendered.is_any());
        assert_eq!(imports(&rendered), [TYPING_ANY]);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let descriptor = TypeDescriptor::union([model("Project"), primitive("int"), TypeDescriptor::None]);
        let r = renderer();
        assert_eq!(r.render(&descriptor), r.render(&descriptor));
    }
}
