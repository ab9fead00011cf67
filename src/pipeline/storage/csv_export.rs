use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::TableSink;
use crate::error::Result;
use crate::types::{Cell, RecordSet};

/// Spreadsheet-friendly text for one cell. Nulls and the no-date sentinel are
/// written as empty fields.
fn field(cell: &Cell) -> String {
    match cell {
        Cell::Null | Cell::NoDate => String::new(),
        other => other.to_string(),
    }
}

/// Write `set` as CSV with a header row, columns in set order.
pub fn write_csv<W: Write>(set: &RecordSet, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(set.columns())?;
    for row in set.rows() {
        csv_writer.write_record(set.columns().iter().map(|c| row.get(c).map(field).unwrap_or_default()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export `set` to a CSV file at `path`, creating parent directories.
pub fn export_csv<P: AsRef<Path>>(set: &RecordSet, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    write_csv(set, fs::File::create(path)?)?;
    info!("Exported {} rows to {}", set.len(), path.display());
    Ok(())
}

/// Writes every table as `<dir>/<table>.csv`, replacing earlier exports.
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}

#[async_trait]
impl TableSink for CsvSink {
    async fn write_table(&self, name: &str, set: &RecordSet) -> Result<()> {
        export_csv(set, self.table_path(name))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
