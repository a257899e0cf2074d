//! Python client facade generator CLI.
//!
//! Reflects an `openapi-python-client` package and writes a single module
//! holding one ergonomic client class whose methods delegate to the
//! package's per-endpoint functions.
//!
//! # Examples
//!
//! ```bash
//! # Generate sdk.py for the package in ./client_output
//! facade-gen --package client_output --output sdk.py
//!
//! # Custom class name, extra search root, JSON summary
//! facade-gen --package petstore_client --output out/petstore.py \
//!     --class-name PetStore --search-path ../generated --format json
//! ```

use anyhow::Result;
use clap::Parser;
use facade_cli::commands::generate::{self, GenerateArgs};
use facade_core::cli::{ExitCode, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Generate a single Python facade class over an openapi-python-client
/// package.
#[derive(Parser, Debug)]
#[command(name = "facade-gen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Importable name of the generated client package
    #[arg(long)]
    package: String,

    /// Path of the Python module to write
    #[arg(long)]
    output: PathBuf,

    /// Name of the facade class (default: WrapperClient, or the config file value)
    #[arg(long = "class-name")]
    class_name: Option<String>,

    /// Extra directory to search for the package; may be repeated
    #[arg(long = "search-path", num_args = 1)]
    search_paths: Vec<PathBuf>,

    /// TOML generator configuration file
    #[arg(long, env = "FACADE_GEN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", default_value = "pretty")]
    format: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json)?;

    let exit_code = execute(cli)?;
    std::process::exit(exit_code.as_i32());
}

/// Initializes logging to stderr.
///
/// `--verbose` forces debug level; otherwise `RUST_LOG` is honoured with a
/// default of `warn`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

/// Parses the output format and runs generation.
///
/// # Errors
///
/// Returns an error if the run summary cannot be serialized.
fn execute(cli: Cli) -> Result<ExitCode> {
    let output_format = match cli.format.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::INVALID_INPUT);
        }
    };

    generate::run(
        GenerateArgs {
            package: cli.package,
            output: cli.output,
            class_name: cli.class_name,
            search_paths: cli.search_paths,
            config: cli.config,
        },
        output_format,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_required_flags() {
        let cli = Cli::parse_from(["facade-gen", "--package", "client_output", "--output", "sdk.py"]);
        assert_eq!(cli.package, "client_output");
        assert_eq!(cli.output, PathBuf::from("sdk.py"));
        assert_eq!(cli.class_name, None);
        assert!(cli.search_paths.is_empty());
        assert!(!cli.verbose);
        assert_eq!(cli.format, "pretty");
    }

    #[test]
    fn test_cli_parsing_all_flags() {
        let cli = Cli::parse_from([
            "facade-gen",
            "--package",
            "petstore_client",
            "--output",
            "out/petstore.py",
            "--class-name",
            "PetStore",
            "--search-path",
            "a",
            "--search-path=b",
            "--config",
            "facade.toml",
            "-v",
            "--log-json",
            "--format",
            "json",
        ]);
        assert_eq!(cli.class_name.as_deref(), Some("PetStore"));
        assert_eq!(cli.search_paths, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(cli.config, Some(PathBuf::from("facade.toml")));
        assert!(cli.verbose);
        assert!(cli.log_json);
        assert_eq!(cli.format, "json");
    }

    #[test]
    fn test_cli_missing_required_flag() {
        assert!(Cli::try_parse_from(["facade-gen", "--package", "client_output"]).is_err());
        assert!(Cli::try_parse_from(["facade-gen", "--output", "sdk.py"]).is_err());
    }

    #[test]
    fn test_execute_rejects_unknown_format() {
        let cli = Cli::parse_from([
            "facade-gen",
            "--package",
            "client_output",
            "--output",
            "sdk.py",
            "--format",
            "yaml",
        ]);
        assert_eq!(execute(cli).unwrap(), ExitCode::INVALID_INPUT);
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
