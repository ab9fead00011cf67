use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// A single loosely-typed table cell as it arrives from a source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A calendar date that already went through date normalization
    Date(NaiveDate),
    /// A value was present but is not a valid date. Distinct from `Null`.
    NoDate,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Infer the narrowest cell for a raw textual field (CSV style):
    /// empty is null, then integer, then float, otherwise text.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Cell::Float(f);
        }
        Cell::Text(raw.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map_or(Cell::Null, Cell::Float),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            // Whole floats keep their decimal point ("6.0", not "6")
            Cell::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::NoDate => f.write_str("NaT"),
        }
    }
}

/// One row: column name to cell.
pub type Record = HashMap<String, Cell>;

/// An ordered table of rows with named, loosely-typed columns.
///
/// Column order is tracked separately from the rows so that sinks can
/// reproduce the source layout. A row that lacks a column reads as `Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Build from a header and positional rows. Short rows are padded with nulls,
    /// surplus cells are discarded.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut set = Self::new(columns);
        for row in rows {
            let mut cells = row.into_iter();
            let record: Record = set
                .columns
                .iter()
                .map(|c| (c.clone(), cells.next().unwrap_or(Cell::Null)))
                .collect();
            set.rows.push(record);
        }
        set
    }

    /// Build from JSON objects, one per row. Columns are collected in first-seen
    /// order; non-object entries are skipped.
    pub fn from_json_records(values: &[Value]) -> Self {
        let mut set = Self::default();
        for value in values {
            match value.as_object() {
                Some(obj) => {
                    let record: Record = obj
                        .iter()
                        .map(|(k, v)| {
                            set.ensure_column(k);
                            (k.clone(), Cell::from(v))
                        })
                        .collect();
                    set.rows.push(record);
                }
                None => warn!("Skipping non-object JSON record: {}", value),
            }
        }
        set
    }

    fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    pub fn push(&mut self, record: Record) {
        for key in record.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
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

    /// Cell at `row` / `column`, `Null` when the row lacks it.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        const NULL: &Cell = &Cell::Null;
        self.rows.get(row).map(|r| r.get(column).unwrap_or(NULL))
    }

    /// Values of one column in row order.
    pub fn column_values(&self, column: &str) -> Vec<Cell> {
        self.rows
            .iter()
            .map(|r| r.get(column).cloned().unwrap_or(Cell::Null))
            .collect()
    }

    /// Keep rows matching the predicate, preserving order.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Record) -> bool,
    {
        self.rows.retain(|r| keep(r));
    }

    /// Rewrite every cell of `column` in place, adding the column if absent.
    pub fn map_column<F>(&mut self, column: &str, mut f: F)
    where
        F: FnMut(&Cell) -> Cell,
    {
        self.ensure_column(column);
        for row in &mut self.rows {
            let current = row.get(column).cloned().unwrap_or(Cell::Null);
            row.insert(column.to_string(), f(&current));
        }
    }

    /// Replace `column` with `f(cell)` where it yields a value and drop the rows
    /// where it yields `None`. Survivors keep their relative order.
    pub fn filter_map_column<F>(&mut self, column: &str, mut f: F) -> usize
    where
        F: FnMut(&Cell) -> Option<Cell>,
    {
        self.ensure_column(column);
        let before = self.rows.len();
        let rows = std::mem::take(&mut self.rows);
        self.rows = rows
            .into_iter()
            .filter_map(|mut row| {
                let current = row.get(column).cloned().unwrap_or(Cell::Null);
                let next = f(&current)?;
                row.insert(column.to_string(), next);
                Some(row)
            })
            .collect();
        before - self.rows.len()
    }

    /// Remove a column from the header and every row. Returns whether it existed.
    pub fn drop_column(&mut self, column: &str) -> bool {
        let existed = self.has_column(column);
        self.columns.retain(|c| c != column);
        for row in &mut self.rows {
            row.remove(column);
        }
        existed
    }

    /// The last `n` rows, for previews.
    pub fn tail(&self, n: usize) -> &[Record] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}
