//! Generate command implementation.
//!
//! This command:
//! 1. Loads and validates the generator configuration
//! 2. Reflects the client package and prints a warning per diagnostic
//! 3. Synthesizes and renders the facade module
//! 4. Writes the module to the output path

use crate::config::load_config;
use crate::formatters;
use anyhow::{Context, Result};
use facade_codegen::FacadeGenerator;
use facade_core::PackageName;
use facade_core::cli::{ExitCode, OutputFormat};
use facade_introspector::Introspector;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Arguments of the generate command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Importable name of the client package
    pub package: String,
    /// Path of the module to write
    pub output: PathBuf,
    /// Root class name, overriding the configuration
    pub class_name: Option<String>,
    /// Extra package search roots, tried first
    pub search_paths: Vec<PathBuf>,
    /// TOML configuration file
    pub config: Option<PathBuf>,
}

/// Summary of a generation run.
#[derive(Debug, Serialize)]
struct GenerationResult {
    /// Client package
    package: String,
    /// Root facade class
    class_name: String,
    /// Written module path
    output: String,
    /// Sub-facade attributes on the root class
    namespaces: Vec<String>,
    /// Number of generated methods
    method_count: usize,
    /// Number of warnings printed
    warnings: usize,
}

/// Runs the generate command.
///
/// Returns [`ExitCode::INVALID_INPUT`] for an invalid package name or
/// configuration and [`ExitCode::ERROR`] if the facade cannot be rendered
/// or written. Reflection problems are printed as warnings and never fail
/// the run.
///
/// # Errors
///
/// Returns an error if the summary cannot be serialized.
///
/// # Examples
///
/// ```no_run
/// use facade_cli::commands::generate::{self, GenerateArgs};
/// use facade_core::cli::{ExitCode, OutputFormat};
///
/// # fn example() -> Result<(), anyhow::Error> {
/// let code = generate::run(
///     GenerateArgs {
///         package: "client_output".to_string(),
///         output: "sdk.py".into(),
///         class_name: None,
///         search_paths: vec![],
///         config: None,
///     },
///     OutputFormat::Pretty,
/// )?;
/// assert_eq!(code, ExitCode::SUCCESS);
/// # Ok(())
/// # }
/// ```
pub fn run(args: GenerateArgs, output_format: OutputFormat) -> Result<ExitCode> {
    let package = match PackageName::new(args.package) {
        Ok(package) => package,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::INVALID_INPUT);
        }
    };

    let config = match load_config(args.config.as_deref(), args.class_name) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return Ok(ExitCode::INVALID_INPUT);
        }
    };

    let info = Introspector::new(config.clone())
        .with_search_paths(args.search_paths)
        .discover_package(&package);
    for diagnostic in &info.diagnostics {
        println!("Warning: {}", diagnostic.message);
    }

    let facade = match FacadeGenerator::new(config).and_then(|generator| generator.generate(&info)) {
        Ok(facade) => facade,
        Err(e) => {
            error!(error = %e, "facade generation failed");
            eprintln!("Error: {e}");
            return Ok(ExitCode::ERROR);
        }
    };

    if let Err(e) = write_output(&args.output, &facade.source) {
        eprintln!("Error: {e:#}");
        return Ok(ExitCode::ERROR);
    }
    info!(output = %args.output.display(), bytes = facade.source.len(), "facade written");

    let output = args.output.display().to_string();
    if output_format == OutputFormat::Pretty {
        println!("{}", formatters::pretty::success_line(&output, &facade.class_name));
    }
    let result = GenerationResult {
        package: package.to_string(),
        class_name: facade.class_name,
        output,
        namespaces: facade.namespaces,
        method_count: facade.method_count,
        warnings: info.diagnostics.len(),
    };
    println!("{}", formatters::format_output(&result, output_format)?);

    Ok(ExitCode::SUCCESS)
}

/// Writes `source` to `path`, creating missing parent directories.
fn write_output(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, source).with_context(|| format!("failed to write {}", path.display()))
}
