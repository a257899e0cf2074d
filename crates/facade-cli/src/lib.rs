//! Facade generator CLI library.
//!
//! Exposes the command implementations, configuration loading and output
//! formatters of the `facade-gen` binary so they can be tested.

pub mod commands;
pub mod config;
pub mod formatters;
