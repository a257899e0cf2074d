//! Output formatters for the run summary.
//!
//! Provides consistent formatting for JSON, text, and pretty output modes.

use anyhow::Result;
use colored::Colorize;
use facade_core::cli::OutputFormat;
use serde::Serialize;

/// Format data according to the specified output format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use facade_cli::formatters::format_output;
/// use facade_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     class_name: String,
///     methods: usize,
/// }
///
/// let summary = Summary { class_name: "WrapperClient".to_string(), methods: 6 };
///
/// let output = format_output(&summary, OutputFormat::Json)?;
/// assert!(output.contains("\"class_name\""));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Format data as JSON with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format data as compact single-line JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn format_compact<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string(data)?)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{Result, Serialize, json};

    /// Format data as plain text.
    ///
    /// Compact JSON without colors, suitable for piping to other commands.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        json::format_compact(data)
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize};
    use std::fmt::Write;

    /// Format data as colorized, indented output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        Ok(format_value(&value, 0))
    }

    /// The one-line success message printed after the facade is written.
    #[must_use]
    pub fn success_line(output: &str, class_name: &str) -> String {
        format!(
            "{}  Wrote '{}' with class '{}'",
            "✅".green(),
            output.bold(),
            class_name.cyan().bold()
        )
    }

    fn format_value(value: &serde_json::Value, indent: usize) -> String {
        use serde_json::Value;

        let indent_str = "  ".repeat(indent);
        let next_indent_str = "  ".repeat(indent + 1);

        match value {
            Value::Null => "null".dimmed().to_string(),
            Value::Bool(b) => b.to_string().yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => format!("\"{}\"", s.green()),
            Value::Array(arr) if arr.is_empty() => "[]".to_string(),
            Value::Array(arr) => {
                let items: Vec<String> = arr
                    .iter()
                    .map(|item| format!("{next_indent_str}{}", format_value(item, indent + 1)))
                    .collect();
                format!("[\n{}\n{indent_str}]", items.join(",\n"))
            }
            Value::Object(obj) if obj.is_empty() => "{}".to_string(),
            Value::Object(obj) => {
                let mut result = "{\n".to_string();
                for (i, (key, val)) in obj.iter().enumerate() {
                    let _ = write!(
                        result,
                        "{next_indent_str}\"{}\": {}",
                        key.blue().bold(),
                        format_value(val, indent + 1)
                    );
                    if i + 1 < obj.len() {
                        result.push(',');
                    }
                    result.push('\n');
                }
                result.push_str(&indent_str);
                result.push('}');
                result
            }
        }
    }
}
