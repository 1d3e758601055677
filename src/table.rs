// 📄 Table Layer - CSV-derived rows held in memory
// Cells stay raw (text, number or empty); typing happens in the validator

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

// ============================================================================
// CELL
// ============================================================================

/// One raw value from a tabular source.
///
/// CSV input only ever produces `Text` and `Empty`; `Number` exists for
/// callers that hand over already-typed rows (e.g. deserialized JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Build a cell from CSV text; whitespace-only fields become `Empty`
    pub fn from_field(field: &str) -> Self {
        if field.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(field.to_string())
        }
    }

    /// True for empty cells, whitespace-only text and NaN
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
        }
    }

    /// Trimmed textual form, `None` when blank
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) if n.is_nan() => None,
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// Raw textual form used in error messages and fingerprints
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_field(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// One input row: column name → cell. Absent columns read as `Cell::Empty`.
pub type Row = BTreeMap<String, Cell>;

static EMPTY: Cell = Cell::Empty;

/// Look up a column, treating a missing column as an empty cell
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a Cell {
    row.get(column).unwrap_or(&EMPTY)
}

// ============================================================================
// TABLE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names in source order
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows, collecting columns in first-seen order
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        for row in &rows {
            for name in row.keys() {
                if seen.insert(name.clone()) {
                    columns.push(name.clone());
                }
            }
        }
        Table { columns, rows }
    }

    /// Parse CSV with a header line from any reader
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = Table::new(dedupe_headers(headers));

        for (line, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read CSV record {}", line + 1))?;
            if record.len() > table.columns.len() {
                anyhow::bail!(
                    "CSV record {} has {} fields but the header has {}",
                    line + 1,
                    record.len(),
                    table.columns.len()
                );
            }
            let row: Row = table
                .columns
                .iter()
                .zip(record.iter())
                .map(|(name, field)| (name.clone(), Cell::from_field(field)))
                .collect();
            table.rows.push(row);
        }

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Rename columns using an `old name → new name` map.
    ///
    /// Applies to the header list and every row. Unmapped columns are kept.
    pub fn rename_columns(&mut self, aliases: &BTreeMap<String, String>) {
        if aliases.is_empty() {
            return;
        }

        for column in self.columns.iter_mut() {
            if let Some(new_name) = aliases.get(column.as_str()) {
                *column = new_name.clone();
            }
        }

        for row in self.rows.iter_mut() {
            let renamed: Row = std::mem::take(row)
                .into_iter()
                .map(|(name, value)| match aliases.get(&name) {
                    Some(new_name) => (new_name.clone(), value),
                    None => (name, value),
                })
                .collect();
            *row = renamed;
        }
    }

    /// Add configured columns that the table does not have.
    ///
    /// Columns already in the header are left untouched, even when blank.
    /// `Copy` reads the row as loaded, so it cannot chain through another
    /// filled column.
    pub fn fill_missing_columns(&mut self, defaults: &BTreeMap<String, ColumnDefault>) {
        let missing: Vec<(&String, &ColumnDefault)> = defaults
            .iter()
            .filter(|(name, _)| !self.has_column(name))
            .collect();
        if missing.is_empty() {
            return;
        }

        for row in self.rows.iter_mut() {
            let filled: Vec<(String, Cell)> = missing
                .iter()
                .map(|(name, default)| {
                    let value = match default {
                        ColumnDefault::Copy(from) => cell(row, from).clone(),
                        ColumnDefault::Value(value) => Cell::from_field(value),
                    };
                    ((*name).clone(), value)
                })
                .collect();
            row.extend(filled);
        }

        let added: Vec<String> = missing.into_iter().map(|(name, _)| name.clone()).collect();
        tracing::debug!(columns = ?added, "filled missing columns");
        self.columns.extend(added);
    }

    /// Keep only the rows at the given indices (in table order)
    pub fn select(&self, keep: &HashSet<usize>) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .filter(|(idx, _)| keep.contains(idx))
                .map(|(_, row)| row.clone())
                .collect(),
        }
    }

    /// SHA-256 over header and cell contents, hex encoded.
    ///
    /// Identical content yields the same fingerprint regardless of where it
    /// was loaded from.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.columns.join("\u{1f}"));
        for row in &self.rows {
            hasher.update(b"\n");
            let line: Vec<String> = self
                .columns
                .iter()
                .map(|c| cell(row, c).display())
                .collect();
            hasher.update(line.join("\u{1f}"));
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Repeated header names get a `.1`, `.2`, ... suffix instead of overwriting
/// the earlier column
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", header, n);
            n += 1;
        }
        if name != header {
            tracing::warn!(column = %header, renamed = %name, "duplicate CSV header");
        }
        seen.insert(name.clone());
        columns.push(name);
    }

    columns
}

// ============================================================================
// COLUMN DEFAULTS
// ============================================================================

/// How to fill a column the input lacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDefault {
    /// Take the value of another column in the same row
    Copy(String),
    /// Use a constant; an empty string leaves the cell blank
    Value(String),
}

/// Defaults that turn an order-level export (one row per order, no
/// line-item columns) into single-line orders
pub fn order_level_defaults() -> BTreeMap<String, ColumnDefault> {
    use crate::attributes as col;

    [
        (col::LINE_ITEM_ID, ColumnDefault::Copy(col::TRANSACTION_ID.to_string())),
        (col::LINE_ITEM_AMOUNT, ColumnDefault::Copy(col::TRANSACTION_SUBTOTAL.to_string())),
        (col::LINE_ITEM_QUANTITY, ColumnDefault::Value("1".to_string())),
        (col::LINE_ITEM_DISCOUNT, ColumnDefault::Value("0".to_string())),
        (col::LINE_ITEM_SHIPPING_HANDLING, ColumnDefault::Value("0".to_string())),
        (col::TRANSACTION_RECALCULATE_TAX, ColumnDefault::Value("FALSE".to_string())),
    ]
    .into_iter()
    .map(|(name, default)| (name.to_string(), default))
    .collect()
}

/// Load a CSV file into a `Table`
pub fn load_csv(csv_path: &Path) -> Result<Table> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;
    let table = Table::from_csv_reader(file)
        .with_context(|| format!("Failed to parse CSV file: {:?}", csv_path))?;

    tracing::debug!(path = ?csv_path, rows = table.len(), columns = table.columns.len(), "loaded table");
    Ok(table)
}

// ============================================================================
// TESTS
// ============================================================================
