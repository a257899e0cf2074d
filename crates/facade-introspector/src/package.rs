//! Locating a Python package on disk.
//!
//! Mirrors the parts of Python's import system the generator relies on: a
//! dotted name is resolved against an ordered list of search roots, and a
//! package is a directory holding an `__init__.py`.

use facade_core::{Error, ModulePath, PackageName, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const INIT_FILE: &str = "__init__.py";

/// A located Python package.
///
/// # Examples
///
/// ```no_run
/// use facade_core::PackageName;
/// use facade_introspector::PythonPackage;
///
/// let name = PackageName::new("client_output")?;
/// let package = PythonPackage::locate(&name, &PythonPackage::default_search_paths())?;
/// println!("found at {}", package.root().display());
/// # Ok::<(), facade_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PythonPackage {
    name: PackageName,
    root: PathBuf,
}

impl PythonPackage {
    /// Search roots used when none are given: the working directory, then
    /// every entry of `PYTHONPATH`.
    #[must_use]
    pub fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(python_path) = std::env::var_os("PYTHONPATH") {
            paths.extend(std::env::split_paths(&python_path).filter(|p| !p.as_os_str().is_empty()));
        }
        paths
    }

    /// Resolves `name` against `search_paths`, first match wins.
    ///
    /// Every dotted segment must be a package directory, as Python requires
    /// for regular packages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackageNotFound`] if no search root contains the
    /// package.
    pub fn locate(name: &PackageName, search_paths: &[PathBuf]) -> Result<Self> {
        for base in search_paths {
            let mut dir = base.clone();
            let mut found = true;
            for segment in name.segments() {
                dir.push(segment);
                if !is_package_dir(&dir) {
                    found = false;
                    break;
                }
            }
            if found {
                debug!(package = %name, root = %dir.display(), "located package");
                return Ok(Self {
                    name: name.clone(),
                    root: dir,
                });
            }
        }

        Err(Error::PackageNotFound {
            package: name.to_string(),
            searched: search_paths.len(),
        })
    }

    /// Creates a package handle for a known directory without searching.
    #[must_use]
    pub const fn at(name: PackageName, root: PathBuf) -> Self {
        Self { name, root }
    }

    /// Dotted name of the package.
    #[must_use]
    pub const fn name(&self) -> &PackageName {
        &self.name
    }

    /// Package directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Module path of the package itself.
    #[must_use]
    pub fn module_path(&self) -> ModulePath {
        ModulePath::from(&self.name)
    }

    /// Directory of a (possibly dotted) subpackage, if it is a package.
    #[must_use]
    pub fn subpackage_dir(&self, relative: &str) -> Option<PathBuf> {
        let dir = relative
            .split('.')
            .fold(self.root.clone(), |dir, segment| dir.join(segment));
        is_package_dir(&dir).then_some(dir)
    }

    /// Source file of a (possibly dotted) submodule.
    ///
    /// Returns the file and whether it is a package `__init__.py`. A `name/`
    /// package shadows a sibling `name.py`, as in Python's path finder.
    #[must_use]
    pub fn module_file(&self, relative: &str) -> Option<(PathBuf, bool)> {
        let mut segments: Vec<&str> = relative.split('.').collect();
        let last = segments.pop()?;
        let parent = segments
            .iter()
            .fold(self.root.clone(), |dir, segment| dir.join(segment));

        let dir = parent.join(last);
        if is_package_dir(&dir) {
            return Some((dir.join(INIT_FILE), true));
        }
        let file = parent.join(format!("{last}.py"));
        file.is_file().then_some((file, false))
    }

    /// Dotted module path of a file beneath the package root.
    ///
    /// `__init__.py` maps to its directory's module path. Returns `None` for
    /// files outside the package or without a `.py` extension.
    #[must_use]
    pub fn module_path_of(&self, file: &Path) -> Option<ModulePath> {
        let relative = file.strip_prefix(&self.root).ok()?;
        if relative.extension().and_then(|e| e.to_str()) != Some("py") {
            return None;
        }

        let mut segments: Vec<String> = self.name.segments().map(str::to_string).collect();
        let components: Vec<&str> = relative
            .iter()
            .map(|c| c.to_str())
            .collect::<Option<Vec<_>>>()?;
        let (file_name, dirs) = components.split_last()?;
        segments.extend(dirs.iter().map(|d| (*d).to_string()));

        if *file_name != INIT_FILE {
            let stem = file_name.strip_suffix(".py")?;
            segments.push(stem.to_string());
        }
        Some(ModulePath::from_segments(segments))
    }
}

/// Returns `true` if `dir` is a regular Python package.
#[must_use]
pub fn is_package_dir(dir: &Path) -> bool {
    dir.join(INIT_FILE).is_file()
}
