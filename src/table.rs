//! This module contains the table logic for the application.
//!
//! The main entry point is the [`Table`] struct which represents a table.
//! [`align`] turns tab separated template output into the same column layout.
use std::{fmt::Display, iter};

/// Padding added after every cell except the last one of a row.
const PADDING: usize = 4;

/// Table representation.
///
/// A table is a collection of rows and columns.
///
/// The table is printed using the [`Display`] trait.
/// It's following the same format as the tables printed by Go's tabwriter: every column is as
/// wide as its widest cell plus padding, and the last cell of a row is not padded.
pub struct Table {
    /// Header of the table.
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a new table.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    fn all_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        iter::once(&self.header).chain(self.rows.iter())
    }

    /// Render every row of the table, without line terminators.
    fn lines(&self) -> Vec<String> {
        // Width of a column is the widest cell in that column over all rows.
        let column_count = self.all_rows().map(Vec::len).max().unwrap_or_default();
        let column_widths: Vec<usize> = (0..column_count)
            .map(|column| {
                self.all_rows()
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or_default()
                    + PADDING
            })
            .collect();

        self.all_rows()
            .map(|row| {
                let mut line = String::new();
                for (index, cell) in row.iter().enumerate() {
                    if index + 1 == row.len() {
                        line.push_str(cell);
                    } else {
                        line.push_str(&format!("{:<width$}", cell, width = column_widths[index]));
                    }
                }
                line
            })
            .collect()
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

/// Align tab separated cells into columns.
///
/// Consecutive lines containing a tab form a block that is laid out as a [`Table`].
/// Lines without tabs are copied as-is and terminate the current block.
pub fn align(text: &str) -> String {
    let mut output: Vec<String> = Vec::new();
    let mut block: Vec<Vec<String>> = Vec::new();

    fn flush(block: &mut Vec<Vec<String>>, output: &mut Vec<String>) {
        if block.is_empty() {
            return;
        }
        let mut rows = std::mem::take(block);
        let header = rows.remove(0);
        output.extend(Table::new(header, rows).lines());
    }

    for line in text.split('\n') {
        if line.contains('\t') {
            block.push(line.split('\t').map(str::to_string).collect());
        } else {
            flush(&mut block, &mut output);
            output.push(line.to_string());
        }
    }
    flush(&mut block, &mut output);

    output.join("\n")
}
