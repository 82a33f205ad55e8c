//! A small in-memory table over CSV files. Every cell stays a string so
//! ZIP-like columns keep their leading zeros.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("cannot open {:?}", path))?;
        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("cannot read headers of {:?}", path))?
            .iter()
            .map(str::to_string)
            .collect();
        let width = headers.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("cannot read row in {:?}", path))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            // Ragged rows are padded or cut to the header width.
            row.resize(width, String::new());
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {:?}", parent))?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_path(path)
            .with_context(|| format!("cannot create {:?}", path))?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column that must exist; the error names the column so a
    /// bad input file fails loudly before any matching work.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| anyhow!("missing required column '{}'", name))
    }

    pub fn value(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }

    pub fn set_value(&mut self, row: usize, column: usize, value: String) {
        self.rows[row][column] = value;
    }

    /// Append a column; the value vector must cover every row.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        if let Some(index) = self.column_index(name) {
            self.headers.remove(index);
            for row in &mut self.rows {
                row.remove(index);
            }
        }
    }

    /// All non-empty values of a column, in load order.
    pub fn non_empty_values(&self, column: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row[column].clone())
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Indices of every row whose cell in `column` equals `value`.
    pub fn rows_with_value(&self, column: usize, value: &str) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[column] == value)
            .map(|(index, _)| index)
            .collect()
    }

    /// Rewrite a whole column in place through `transform`.
    pub fn map_column<F>(&mut self, column: usize, mut transform: F)
    where
        F: FnMut(&str) -> String,
    {
        for row in &mut self.rows {
            row[column] = transform(&row[column]);
        }
    }
}
