//! Reflected type descriptors.
//!
//! A [`TypeDescriptor`] is the explicit, language-neutral form of a Python
//! annotation. The [`DescriptorBuilder`] produces one from a parsed
//! annotation expression by resolving every name through the module's import
//! table, its own classes, Python builtins and finally the package symbol
//! table. Unions are normalized the same way `typing` normalizes them at
//! runtime, so `Optional[Union[A, B]]` and `A | B | None` yield the same
//! descriptor.

use crate::parser::{ImportedName, ParsedModule};
use crate::symbols::SymbolTable;
use facade_core::ModulePath;
use ruff_python_ast::{Expr, ExprSubscript, Operator};
use ruff_python_parser::parse_expression;
use ruff_text_size::Ranged;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Module path under which builtins are reported.
pub const BUILTINS: &str = "builtins";

const BUILTIN_NAMES: &[&str] = &[
    "bool",
    "bytearray",
    "bytes",
    "complex",
    "dict",
    "float",
    "frozenset",
    "int",
    "list",
    "memoryview",
    "object",
    "range",
    "set",
    "slice",
    "str",
    "tuple",
    "type",
];

/// `typing` and `collections.abc` names that act as generic origins.
pub const GENERIC_ORIGINS: &[&str] = &[
    "AbstractSet",
    "Annotated",
    "AsyncGenerator",
    "AsyncIterable",
    "AsyncIterator",
    "Awaitable",
    "Callable",
    "ChainMap",
    "Collection",
    "Container",
    "Coroutine",
    "Counter",
    "DefaultDict",
    "Deque",
    "Dict",
    "FrozenSet",
    "Generator",
    "Iterable",
    "Iterator",
    "List",
    "Literal",
    "Mapping",
    "MutableMapping",
    "MutableSequence",
    "MutableSet",
    "Optional",
    "OrderedDict",
    "Sequence",
    "Set",
    "Tuple",
    "Type",
    "TypeVar",
    "Union",
];

/// A name together with the module that defines it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QualifiedName {
    /// Defining module (`builtins` for built-in types)
    pub module: ModulePath,
    /// Name inside the module
    pub name: String,
}

impl QualifiedName {
    /// Creates a qualified name.
    #[must_use]
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: ModulePath::new(module),
            name: name.into(),
        }
    }

    /// A built-in name such as `int`.
    #[must_use]
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new(BUILTINS, name)
    }

    /// A name from `typing`.
    #[must_use]
    pub fn typing(name: impl Into<String>) -> Self {
        Self::new("typing", name)
    }

    /// Returns `true` for names defined in `builtins`.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.module.as_str() == BUILTINS
    }

    /// Returns `true` for names from `typing` or `typing_extensions`.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        matches!(self.module.as_str(), "typing" | "typing_extensions")
    }

    /// Returns `true` for names from `collections.abc`.
    #[must_use]
    pub fn is_collections_abc(&self) -> bool {
        self.module.as_str() == "collections.abc"
    }

    /// Returns `true` if this names a generic origin from the standard
    /// library (`typing`, `collections.abc` or a builtin container).
    #[must_use]
    pub fn is_stdlib_generic(&self) -> bool {
        if self.is_builtin() {
            return matches!(
                self.name.as_str(),
                "list" | "dict" | "tuple" | "set" | "frozenset" | "type"
            );
        }
        (self.is_typing() || self.is_collections_abc()) && GENERIC_ORIGINS.contains(&self.name.as_str())
    }

    /// Treats this name as a module, for resolving `a.b.C` one attribute at
    /// a time.
    fn as_module(&self) -> ModulePath {
        self.module.join(&self.name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// Reflected form of a Python type annotation.
///
/// Built once per annotation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// `typing.Any`
    Any,
    /// No annotation at all
    Unspecified,
    /// `None`
    None,
    /// A builtin such as `int` or `str`
    Primitive {
        /// Builtin name
        name: String,
    },
    /// A parametrized (or bare) generic such as `List[int]`
    Generic {
        /// Generic origin
        origin: QualifiedName,
        /// Type arguments in order
        args: Vec<TypeDescriptor>,
    },
    /// A normalized union with at least two members
    Union {
        /// Flattened, deduplicated members in first-seen order
        members: Vec<TypeDescriptor>,
    },
    /// A class from a model, helper or third-party module
    Named(QualifiedName),
    /// Bracketed parameter list, as in `Callable[[A, B], R]`
    ArgList {
        /// Parameter types
        items: Vec<TypeDescriptor>,
    },
    /// Verbatim value inside `Literal[...]`, or an ellipsis
    Literal {
        /// Source text
        text: String,
    },
    /// Annotation that could not be resolved
    Unknown {
        /// Source text of the annotation
        text: String,
    },
}

impl TypeDescriptor {
    /// Builds a normalized union.
    ///
    /// Nested unions are flattened, duplicates removed keeping the first
    /// occurrence, and a single remaining member is returned on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use facade_introspector::TypeDescriptor;
    ///
    /// let int = TypeDescriptor::Primitive { name: "int".to_string() };
    /// let nested = TypeDescriptor::union([
    ///     TypeDescriptor::union([int.clone(), TypeDescriptor::None]),
    ///     int.clone(),
    /// ]);
    /// assert_eq!(
    ///     nested,
    ///     TypeDescriptor::Union { members: vec![int.clone(), TypeDescriptor::None] }
    /// );
    ///
    /// assert_eq!(TypeDescriptor::union([int.clone(), int.clone()]), int);
    /// ```
    #[must_use]
    pub fn union(members: impl IntoIterator<Item = Self>) -> Self {
        let mut flat: Vec<Self> = Vec::new();
        let mut push = |member: Self| {
            if !flat.contains(&member) {
                flat.push(member);
            }
        };
        for member in members {
            match member {
                Self::Union { members } => members.into_iter().for_each(&mut push),
                other => push(other),
            }
        }

        if flat.len() == 1 {
            flat.pop().unwrap_or(Self::Any)
        } else {
            Self::Union { members: flat }
        }
    }

    /// `Optional[inner]`, i.e. `Union[inner, None]`.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::union([inner, Self::None])
    }

    /// Returns `true` for `Any` and for a missing annotation.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any | Self::Unspecified)
    }
}

/// Converts annotation expressions of one module into descriptors.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorBuilder<'a> {
    module: &'a ParsedModule,
    symbols: &'a SymbolTable,
}

impl<'a> DescriptorBuilder<'a> {
    /// Creates a builder resolving names in the scope of `module`.
    #[must_use]
    pub const fn new(module: &'a ParsedModule, symbols: &'a SymbolTable) -> Self {
        Self { module, symbols }
    }

    /// Builds the descriptor for an annotation expression of the module.
    #[must_use]
    pub fn build(&self, annotation: &Expr) -> TypeDescriptor {
        self.build_in(annotation, self.module.source())
    }

    /// Resolves a name or dotted attribute to the definition it refers to.
    ///
    /// Resolution order: import table, local classes, builtins, model
    /// classes of the package.
    #[must_use]
    pub fn resolve(&self, expr: &Expr) -> Option<QualifiedName> {
        match expr {
            Expr::Name(name) => self.resolve_name(name.id.as_str()),
            Expr::Attribute(attr) => {
                let base = match attr.value.as_ref() {
                    Expr::Name(name) => match self.module.imports().get(name.id.as_str()) {
                        Some(ImportedName::Module(module)) => module.clone(),
                        _ => self.resolve(&attr.value)?.as_module(),
                    },
                    other => self.resolve(other)?.as_module(),
                };
                Some(QualifiedName {
                    module: base,
                    name: attr.attr.to_string(),
                })
            }
            _ => None,
        }
    }

    fn resolve_name(&self, name: &str) -> Option<QualifiedName> {
        if let Some(imported) = self.module.imports().get(name) {
            return match imported {
                ImportedName::Symbol { module, name } => Some(QualifiedName {
                    module: module.clone(),
                    name: name.clone(),
                }),
                // A bare module is not a type.
                ImportedName::Module(_) => None,
            };
        }
        if self.module.defines_class(name) {
            return Some(QualifiedName {
                module: self.module.path().clone(),
                name: name.to_string(),
            });
        }
        if BUILTIN_NAMES.contains(&name) {
            return Some(QualifiedName::builtin(name));
        }
        self.symbols.model_module(name).map(|module| QualifiedName {
            module: module.clone(),
            name: name.to_string(),
        })
    }

    fn build_in(&self, expr: &Expr, source: &str) -> TypeDescriptor {
        match expr {
            Expr::NoneLiteral(_) => TypeDescriptor::None,
            Expr::EllipsisLiteral(_) => TypeDescriptor::Literal {
                text: "...".to_string(),
            },
            Expr::StringLiteral(literal) => self.build_forward_ref(literal.value.to_str()),
            Expr::BinOp(binop) if binop.op == Operator::BitOr => TypeDescriptor::union([
                self.build_in(&binop.left, source),
                self.build_in(&binop.right, source),
            ]),
            Expr::Subscript(subscript) => self.build_subscript(subscript, source),
            Expr::List(list) => TypeDescriptor::ArgList {
                items: list.elts.iter().map(|e| self.build_in(e, source)).collect(),
            },
            Expr::Name(_) | Expr::Attribute(_) => self
                .resolve(expr)
                .map_or_else(|| unknown(expr, source), from_qualified),
            _ => unknown(expr, source),
        }
    }

    fn build_forward_ref(&self, text: &str) -> TypeDescriptor {
        match parse_expression(text) {
            Ok(parsed) => self.build_in(parsed.expr(), text),
            Err(e) => {
                debug!(annotation = text, error = %e, "unparseable forward reference");
                TypeDescriptor::Unknown {
                    text: text.to_string(),
                }
            }
        }
    }

    fn build_subscript(&self, subscript: &ExprSubscript, source: &str) -> TypeDescriptor {
        let Some(origin) = self.resolve(&subscript.value) else {
            return unknown(subscript, source);
        };
        let elements: Vec<&Expr> = match subscript.slice.as_ref() {
            Expr::Tuple(tuple) => tuple.elts.iter().collect(),
            other => vec![other],
        };

        if origin.is_typing() {
            match origin.name.as_str() {
                "Optional" => {
                    let members = elements.iter().map(|e| self.build_in(e, source));
                    return TypeDescriptor::union(members.chain([TypeDescriptor::None]));
                }
                "Union" => {
                    return TypeDescriptor::union(elements.iter().map(|e| self.build_in(e, source)));
                }
                "Annotated" => {
                    return elements
                        .first()
                        .map_or(TypeDescriptor::Any, |e| self.build_in(e, source));
                }
                "Literal" => {
                    let args = elements
                        .iter()
                        .map(|e| TypeDescriptor::Literal {
                            text: source[e.range()].to_string(),
                        })
                        .collect();
                    return TypeDescriptor::Generic { origin, args };
                }
                _ => {}
            }
        }

        let args = elements.iter().map(|e| self.build_in(e, source)).collect();
        TypeDescriptor::Generic { origin, args }
    }
}

fn from_qualified(name: QualifiedName) -> TypeDescriptor {
    if name.is_builtin() {
        return TypeDescriptor::Primitive { name: name.name };
    }
    if name.is_typing() && name.name == "Any" {
        return TypeDescriptor::Any;
    }
    if (name.is_typing() || name.is_collections_abc()) && GENERIC_ORIGINS.contains(&name.name.as_str())
    {
        return TypeDescriptor::Generic {
            origin: name,
            args: Vec::new(),
        };
    }
    TypeDescriptor::Named(name)
}

fn unknown<T: Ranged>(node: &T, source: &str) -> TypeDescriptor {
    let text = source[node.range()].to_string();
    debug!(annotation = %text, "unresolved annotation");
    TypeDescriptor::Unknown { text }
}
