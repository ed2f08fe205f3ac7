//! Response and error formatting.
//!
//! Two modes:
//! - **JSON** (default): `serde_json::to_string_pretty` of the table
//! - **Human** (`--human`): a text grid, meta on the first line

use haystack_executor::{Error, Table};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a response table.
pub fn format_output(table: &Table, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(table)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
        OutputMode::Human => format_human(table),
    }
}

/// Format an error with its status.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": err.to_string(),
            "status": err.status(),
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn format_human(table: &Table) -> String {
    let mut lines = Vec::new();
    if !table.meta().is_empty() {
        let meta: Vec<String> = table
            .meta()
            .iter()
            .map(|(name, val)| format!("{}: {}", name, val))
            .collect();
        lines.push(meta.join(", "));
    }
    if table.cols().is_empty() {
        lines.push("(empty)".to_string());
        return lines.join("\n");
    }

    let names: Vec<&str> = table.cols().iter().map(|c| c.name.as_str()).collect();
    let cells: Vec<Vec<String>> = table
        .rows()
        .map(|row| {
            names
                .iter()
                .map(|name| row.get(name).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();
    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |row: &[String]| -> String {
        row.iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let header: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    lines.push(render(&header));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &cells {
        lines.push(render(row));
    }
    lines.push(format!("({} rows)", cells.len()));
    lines.join("\n")
}
