//! Markdown table output.

use std::collections::HashSet;

use crate::config::ConverterConfig;
use crate::error::Result;

use super::tabular::{free_name, TabularData};

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// Render tabular data as a Markdown pipe table.
///
/// Numeric columns are right-aligned, all others left-aligned. Cells are
/// padded so the columns line up in plain text.
pub fn write_markdown(data: &TabularData, config: &ConverterConfig) -> Result<String> {
    let mut headers: Vec<String> = Vec::with_capacity(data.column_count() + 1);
    let mut aligns: Vec<Align> = Vec::with_capacity(data.column_count() + 1);

    if config.write_index {
        let taken: HashSet<String> = data.columns.iter().map(|c| c.name.clone()).collect();
        headers.push(escape_cell(&free_name("", '.', &taken)));
        aligns.push(Align::Right);
    }
    for column in &data.columns {
        headers.push(escape_cell(&column.name));
        aligns.push(if column.inferred_type.is_numeric() {
            Align::Right
        } else {
            Align::Left
        });
    }

    let rows: Vec<Vec<String>> = data
        .rows()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = Vec::with_capacity(row.len() + 1);
            if config.write_index {
                cells.push(i.to_string());
            }
            cells.extend(row.iter().map(|v| escape_cell(&v.to_string())));
            cells
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .max(3)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &headers, &widths, &aligns);

    let separator: Vec<String> = widths
        .iter()
        .zip(&aligns)
        .map(|(width, align)| match align {
            Align::Left => format!(":{}", "-".repeat(width + 1)),
            Align::Right => format!("{}:", "-".repeat(width + 1)),
        })
        .collect();
    out.push('|');
    out.push_str(&separator.join("|"));
    out.push_str("|\n");

    for row in &rows {
        push_line(&mut out, row, &widths, &aligns);
    }

    Ok(out)
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize], aligns: &[Align]) {
    out.push('|');
    for ((cell, width), align) in cells.iter().zip(widths).zip(aligns) {
        let padded = match align {
            Align::Left => format!(" {:<width$} ", cell, width = width),
            Align::Right => format!(" {:>width$} ", cell, width = width),
        };
        out.push_str(&padded);
        out.push('|');
    }
    out.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
