//! Deduplicated Python import statements.

use serde::Serialize;
use std::collections::BTreeSet;

/// Statement importing `typing.Any`.
pub const TYPING_ANY: &str = "from typing import Any";

/// Group an import statement sorts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ImportGroup {
    Typing,
    From,
    Bare,
}

impl ImportGroup {
    fn of(statement: &str) -> Self {
        if statement.starts_with("from typing import ") {
            Self::Typing
        } else if statement.starts_with("from ") {
            Self::From
        } else {
            Self::Bare
        }
    }
}

/// A set of import statements.
///
/// Statements are stored verbatim and deduplicated. [`ImportSet::ordered`]
/// yields `from typing import …` lines first, then other `from` imports,
/// then bare `import` lines, alphabetically within each group.
///
/// # Examples
///
/// ```
/// use facade_codegen::ImportSet;
///
/// let mut imports = ImportSet::new();
/// imports.insert("import attrs");
/// imports.insert("from uuid import UUID");
/// imports.insert("from typing import Optional");
/// imports.insert("from typing import Optional");
///
/// assert_eq!(imports.len(), 3);
/// assert_eq!(
///     imports.ordered(),
///     ["from typing import Optional", "from uuid import UUID", "import attrs"]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportSet {
    statements: BTreeSet<String>,
}

impl ImportSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: BTreeSet::new(),
        }
    }

    /// A set holding one statement.
    #[must_use]
    pub fn single(statement: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.insert(statement);
        set
    }

    /// Adds a statement; returns `false` if it was already present.
    pub fn insert(&mut self, statement: impl Into<String>) -> bool {
        self.statements.insert(statement.into())
    }

    /// Removes a statement; returns `true` if it was present.
    pub fn remove(&mut self, statement: &str) -> bool {
        self.statements.remove(statement)
    }

    /// Adds every statement of `other`.
    pub fn merge(&mut self, other: &Self) {
        self.statements.extend(other.statements.iter().cloned());
    }

    /// Returns `true` if `statement` is present.
    #[must_use]
    pub fn contains(&self, statement: &str) -> bool {
        self.statements.contains(statement)
    }

    /// Number of distinct statements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns `true` if there are no statements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Statements in emission order.
    #[must_use]
    pub fn ordered(&self) -> Vec<&str> {
        let mut ordered: Vec<&str> = self.statements.iter().map(String::as_str).collect();
        ordered.sort_by_key(|statement| ImportGroup::of(statement));
        ordered
    }
}

impl<S: Into<String>> Extend<S> for ImportSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.statements.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for ImportSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
