//
//  buildkite-cli
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Renders command results either as human-readable tables or as pretty JSON.
//!
//! - [`OutputFormat`]: Table or JSON, chosen by the global `--json` flag
//! - [`OutputWriter`]: Writes single values, lists and status messages
//! - [`TableOutput`]: Detail view of a single value
//! - [`TableRow`]: One row of a list table
//!
//! ## Example
//!
//! ```rust,ignore
//! use buildkite_cli::output::{OutputWriter, OutputFormat};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write_list(&builds, "No builds found")?;
//! writer.write_success("Build #42 canceled");
//! ```

mod table;

pub use table::*;

use serde::Serialize;

/// The available output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and fields.
    #[default]
    Table,

    /// Pretty-printed JSON of the API records.
    Json,
}

impl OutputFormat {
    /// `Json` when `json` is set, `Table` otherwise.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Table
        }
    }
}

/// Writes command output in the selected format.
///
/// Color is enabled when the terminal supports it.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Writes one value: pretty JSON, or its detail view.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(value)?;
                println!("{}", json);
            }
            OutputFormat::Table => {
                value.print_table(self.color);
            }
        }
        Ok(())
    }

    /// Writes a list: a JSON array, or a table with one row per value.
    ///
    /// An empty list prints `empty_message` in table mode and `[]` in JSON mode.
    pub fn write_list<T: Serialize + TableRow>(
        &self,
        values: &[T],
        empty_message: &str,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(values)?;
                println!("{}", json);
            }
            OutputFormat::Table if values.is_empty() => {
                self.write_info(empty_message);
            }
            OutputFormat::Table => {
                TableBuilder::new()
                    .color(self.color)
                    .headers(T::headers())
                    .rows(values.iter().map(|v| v.row(self.color)))
                    .print();
            }
        }
        Ok(())
    }

    pub fn write_error(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("error:").red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }

    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    pub fn write_info(&self, msg: &str) {
        println!("{}", msg);
    }

    /// Prints a success line. Suppressed in JSON mode so stdout stays parseable.
    pub fn write_success(&self, msg: &str) {
        use console::style;
        if self.format == OutputFormat::Json {
            return;
        }
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

/// Detail view of a single value.
pub trait TableOutput {
    fn print_table(&self, color: bool);
}

/// A value that renders as one row of a list table.
pub trait TableRow {
    /// Column headers, matching the cells returned by [`TableRow::row`].
    fn headers() -> Vec<&'static str>;

    fn row(&self, color: bool) -> Vec<String>;
}

/// Prints a bold header with an underline.
pub fn print_header(text: &str) {
    use console::style;
    println!("{}", style(text).bold());
    println!("{}", "-".repeat(text.chars().count()));
}

/// Prints a `key: value` line.
pub fn print_field(key: &str, value: &str, color: bool) {
    use console::style;
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flag() {
        assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Table);
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }
}
