//! Simple Output and Reporting
//!
//! This module renders check results and failures for the terminal.

use serde_json::Value;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::error::ValidatorError;
use crate::validator::{StructuredItem, ValidationResult};

/// Output formatter for check results
pub struct Output {
    format: OutputFormat,
    verbosity: VerbosityLevel,
    show_colors: bool,
    show_error_colors: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbosity: VerbosityLevel) -> Self {
        Self {
            format,
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
            show_error_colors: atty::is(atty::Stream::Stderr),
        }
    }

    /// Force colours on or off for both result and error rendering
    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self.show_error_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        paint(self.show_colors, text, color)
    }

    /// Errors go to stderr, so they follow its terminal state
    fn colorize_error(&self, text: &str, color: &str) -> String {
        paint(self.show_error_colors, text, color)
    }

    pub fn format_result(&self, result: &ValidationResult) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(result)?;
                json.push('\n');
                Ok(json)
            }
            OutputFormat::Human => Ok(self.format_human(result)),
        }
    }

    fn format_human(&self, result: &ValidationResult) -> String {
        let mut output = String::new();

        if self.verbosity == VerbosityLevel::Quiet {
            return output;
        }

        let total = result.data.total_items();
        let headline = if total == 0 {
            self.colorize("- NO STRUCTURED DATA", "36")
        } else {
            self.colorize("✓ PARSED", "32")
        };
        output.push_str(&format!(
            "{}  {} item{} (id {})\n",
            headline,
            total,
            if total == 1 { "" } else { "s" },
            result.id
        ));

        for (name, items) in result.data.sections() {
            output.push_str(&format!("  {:<12} {}\n", name, items.len()));
            if self.verbosity >= VerbosityLevel::Verbose {
                for item in items {
                    output.push_str(&format!("    {}\n", describe_item(item)));
                }
            }
        }

        output
    }

    pub fn format_error(&self, error: &ValidatorError) -> String {
        match error {
            ValidatorError::Service { status, error } => format!(
                "{}  HTTP {} - {}",
                self.colorize_error("✗ REJECTED", "31"),
                status,
                error
            ),
            other => format!("{}  {}", self.colorize_error("⚠ ERROR", "33"), other),
        }
    }
}

fn paint(enabled: bool, text: &str, color: &str) -> String {
    if enabled {
        format!("\x1b[{}m{}\x1b[0m", color, text)
    } else {
        text.to_string()
    }
}

/// One-line summary of an extracted item: its type (if any) and field count
fn describe_item(item: &StructuredItem) -> String {
    let kind = ["@type", "type"]
        .iter()
        .find_map(|key| item.get(*key))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

    match kind {
        Some(kind) => format!("{} ({} fields)", kind, item.len()),
        None => format!("({} fields)", item.len()),
    }
}
