// 📋 Table Layer - In-memory tabular records
// Ordered rows of named string fields; header defines field names and order.
//
// The CSV boundary lives here too: loading a file is the only fatal error
// in the whole pipeline. Short/long rows are a structural issue, recovered
// locally by padding/truncating to header length.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// TABLE
// ============================================================================

/// A header row plus data rows, all string-valued.
///
/// Every row is normalized to header length on construction, so downstream
/// code can index by column position without bounds checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from a header and raw rows, padding/truncating each row
    /// to header length.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = header.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Table { header, rows }
    }

    /// Table with a header and no data rows.
    pub fn empty(header: &[&str]) -> Self {
        Table {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Append a row, normalizing it to header length.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.width(), String::new());
        self.rows.push(row);
    }
}

// ============================================================================
// COLUMN INDEX - one-time header -> position accessor
// ============================================================================

/// Maps column names to positions once, so row access is positional after
/// construction instead of per-field name lookup.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(header: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (i, name) in header.iter().enumerate() {
            // First occurrence wins on duplicate column names
            positions.entry(name.trim().to_string()).or_insert(i);
        }
        ColumnIndex { positions }
    }

    /// Position of a required column. Missing = malformed input structure,
    /// which is fatal per the error taxonomy.
    pub fn require(&self, name: &str) -> Result<usize> {
        match self.positions.get(name) {
            Some(&i) => Ok(i),
            None => bail!("required column '{}' not found in header", name),
        }
    }

    /// Position of an optional column.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// Trimmed field value at a position; rows are header-length so this is a
/// plain index, kept as a helper for optional columns.
pub fn field(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Trimmed field value for an optional column position.
pub fn opt_field(row: &[String], idx: Option<usize>) -> &str {
    idx.map(|i| field(row, i)).unwrap_or("")
}

// ============================================================================
// CSV BOUNDARY
// ============================================================================

/// Load a delimited file into a Table. The first row is the header; a UTF-8
/// BOM on the first cell is stripped. A missing/unreadable file is fatal.
pub fn load_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;

    let mut header: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for record in reader.records() {
        let record =
            record.with_context(|| format!("failed to read row from {}", path.display()))?;
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if header.is_empty() {
            header = row;
            if let Some(first) = header.first_mut() {
                if let Some(stripped) = first.strip_prefix('\u{feff}') {
                    *first = stripped.to_string();
                }
            }
        } else {
            rows.push(row);
        }
    }

    if header.is_empty() {
        bail!("input file {} has no header row", path.display());
    }

    Ok(Table::new(header, rows))
}

/// Write a Table back out as CSV (header first).
pub fn store_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;

    writer
        .write_record(&table.header)
        .context("failed to write header row")?;
    for row in &table.rows {
        writer
            .write_record(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer.flush().context("failed to flush output file")?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
