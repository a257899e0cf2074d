//! Command implementations for the facade generator CLI.
//!
//! Each command module parses its arguments, runs the operation, and formats
//! output according to the requested format.

pub mod generate;
