//! Compile-time checks that core types can cross thread boundaries.

use facade_core::cli::{ExitCode, OutputFormat};
use facade_core::{
    Diagnostic, DiagnosticKind, Diagnostics, Error, GeneratorConfig, ModulePath, NamespaceName,
    PackageName,
};

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_core_types_are_send_sync() {
    assert_send_sync::<PackageName>();
    assert_send_sync::<ModulePath>();
    assert_send_sync::<NamespaceName>();
    assert_send_sync::<GeneratorConfig>();
    assert_send_sync::<Diagnostic>();
    assert_send_sync::<DiagnosticKind>();
    assert_send_sync::<Diagnostics>();
    assert_send_sync::<Error>();
}

#[test]
fn test_cli_types_are_send_sync() {
    assert_send_sync::<OutputFormat>();
    assert_send_sync::<ExitCode>();
}
