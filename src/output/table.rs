//
//  buildkite-cli
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Table rendering built on `comfy_table`.

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

/// Creates a table with the standard preset and dynamic column widths.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Fluent builder for list tables.
///
/// # Example
///
/// ```rust
/// use buildkite_cli::output::TableBuilder;
///
/// let table = TableBuilder::new()
///     .color(false)
///     .headers(["#", "STATE"])
///     .row(["42", "passed"])
///     .build();
/// assert!(table.to_string().contains("passed"));
/// ```
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if self.color {
            let cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        self.table.add_row(row);
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            let row: Vec<String> = row.into_iter().map(Into::into).collect();
            self.table.add_row(row);
        }
        self
    }

    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors a build or job state by outcome.
pub fn format_state(state: &str, color: bool) -> String {
    if !color {
        return state.to_string();
    }

    use console::style;
    match state.to_lowercase().as_str() {
        "running" | "scheduled" | "assigned" | "accepted" => style(state).cyan().to_string(),
        "passed" => style(state).green().to_string(),
        "failed" | "failing" | "timed_out" | "broken" => style(state).red().to_string(),
        "blocked" | "canceling" | "canceled" | "waiting" => style(state).yellow().to_string(),
        "skipped" | "not_run" => style(state).dim().to_string(),
        _ => state.to_string(),
    }
}

/// "Yes"/"No", green and dimmed when colored.
pub fn format_bool(value: bool, color: bool) -> String {
    if color {
        use console::style;
        if value {
            style("Yes").green().to_string()
        } else {
            style("No").dim().to_string()
        }
    } else if value {
        "Yes".to_string()
    } else {
        "No".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_state_plain() {
        assert_eq!(format_state("passed", false), "passed");
        assert_eq!(format_bool(true, false), "Yes");
        assert_eq!(format_bool(false, false), "No");
    }

    #[test]
    fn test_table_has_rows() {
        let table = TableBuilder::new()
            .color(false)
            .headers(["SLUG", "NAME"])
            .rows(vec![vec!["web", "Web"], vec!["api", "API"]])
            .build();
        let rendered = table.to_string();
        assert!(rendered.contains("SLUG"));
        assert!(rendered.contains("api"));
    }
}
