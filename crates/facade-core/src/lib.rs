//! Core types, configuration, and errors for the client facade generator.
//!
//! This crate provides the foundational types shared by the introspector,
//! the code generator, and the CLI.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`PackageName`, `ModulePath`, `NamespaceName`)
//! - Error hierarchy with contextual information
//! - Generator configuration (`GeneratorConfig`)
//! - Non-fatal diagnostics collected during a generation run
//! - CLI value types (`OutputFormat`, `ExitCode`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod diagnostics;
mod error;
mod types;

pub mod cli;

pub use config::GeneratorConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, Result};
pub use types::{ModulePath, NamespaceName, PackageName};
