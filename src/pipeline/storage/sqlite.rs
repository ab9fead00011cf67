use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use super::TableSink;
use crate::error::{EtlError, Result};
use crate::pipeline::processing::normalize::dates::CANONICAL_DATE_FORMAT;
use crate::types::{Cell, RecordSet};

/// Local SQLite store. Every write replaces the destination table wholesale.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self { conn: Mutex::new(Connection::open_in_memory()?) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EtlError::Storage("sqlite connection lock poisoned".to_string()))
    }

    /// Read a table back as text/number cells.
    pub fn read_table(&self, name: &str) -> Result<RecordSet> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_identifier(name)))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(match row.get::<_, SqlValue>(i)? {
                    SqlValue::Null => Cell::Null,
                    SqlValue::Integer(v) => Cell::Int(v),
                    SqlValue::Real(v) => Cell::Float(v),
                    SqlValue::Text(v) => Cell::Text(v),
                    SqlValue::Blob(v) => Cell::Text(String::from_utf8_lossy(&v).into_owned()),
                });
            }
            out.push(cells);
        }
        Ok(RecordSet::from_rows(columns, out))
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQLite column affinity for the non-null cells of a column.
fn column_type(set: &RecordSet, column: &str) -> &'static str {
    let mut saw_int = false;
    let mut saw_float = false;
    for cell in set.rows().iter().filter_map(|r| r.get(column)) {
        match cell {
            Cell::Null | Cell::NoDate => {}
            Cell::Int(_) | Cell::Bool(_) => saw_int = true,
            Cell::Float(_) => saw_float = true,
            Cell::Text(_) | Cell::Date(_) => return "TEXT",
        }
    }
    match (saw_int, saw_float) {
        (_, true) => "REAL",
        (true, false) => "INTEGER",
        (false, false) => "TEXT",
    }
}

fn to_sql(cell: &Cell) -> SqlValue {
    match cell {
        Cell::Null | Cell::NoDate => SqlValue::Null,
        Cell::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Cell::Int(i) => SqlValue::Integer(*i),
        Cell::Float(f) if f.is_finite() => SqlValue::Real(*f),
        Cell::Float(_) => SqlValue::Null,
        Cell::Text(s) => SqlValue::Text(s.clone()),
        Cell::Date(d) => SqlValue::Text(d.format(CANONICAL_DATE_FORMAT).to_string()),
    }
}

#[async_trait]
impl TableSink for SqliteSink {
    async fn write_table(&self, name: &str, set: &RecordSet) -> Result<()> {
        let mut conn = self.lock()?;
        let table = quote_identifier(name);
        let columns = set.columns();

        let definitions = columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(c), column_type(set, c)))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");
        let column_list = columns.iter().map(|c| quote_identifier(c)).collect::<Vec<_>>().join(", ");

        let tx = conn.transaction()?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({definitions});"))?;
        if !columns.is_empty() {
            let mut insert = tx.prepare(&format!("INSERT INTO {table} ({column_list}) VALUES ({placeholders})"))?;
            for row in set.rows() {
                let values = columns
                    .iter()
                    .map(|c| row.get(c).map_or(SqlValue::Null, to_sql));
                insert.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        info!("Replaced table {} with {} rows", name, set.len());
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample() -> RecordSet {
        RecordSet::from_rows(
            vec!["name".into(), "weight".into(), "date_added".into(), "count".into()],
            vec![
                vec![
                    Cell::text("Tea"),
                    Cell::Float(1.0),
                    Cell::Date(NaiveDate::from_ymd_opt(2005, 12, 2).unwrap()),
                    Cell::Int(3),
                ],
                vec![Cell::text("Rope"), Cell::Float(0.454), Cell::NoDate, Cell::Null],
            ],
        )
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let sink = SqliteSink::open_in_memory().unwrap();
        sink.write_table("dim_products", &sample()).await.unwrap();

        let read = sink.read_table("dim_products").unwrap();
        assert_eq!(read.columns(), &["name", "weight", "date_added", "count"]);
        assert_eq!(read.len(), 2);
        assert_eq!(read.get(0, "date_added"), Some(&Cell::text("2005-12-02")));
        assert_eq!(read.get(1, "date_added"), Some(&Cell::Null));
        assert_eq!(read.get(1, "weight"), Some(&Cell::Float(0.454)));
        assert_eq!(read.get(0, "count"), Some(&Cell::Int(3)));
    }

    #[tokio::test]
    async fn test_write_replaces_existing_table() {
        let dir = tempdir().unwrap();
        let sink = SqliteSink::open(dir.path().join("db").join("sales.db")).unwrap();

        sink.write_table("orders_table", &sample()).await.unwrap();
        let smaller = RecordSet::from_rows(vec!["id".into()], vec![vec![Cell::Int(1)]]);
        sink.write_table("orders_table", &smaller).await.unwrap();

        let read = sink.read_table("orders_table").unwrap();
        assert_eq!(read.columns(), &["id"]);
        assert_eq!(read.len(), 1);
        assert_eq!(sink.list_tables().await.unwrap(), vec!["orders_table".to_string()]);
    }

    #[test]
    fn test_column_types() {
        let set = sample();
        assert_eq!(column_type(&set, "name"), "TEXT");
        assert_eq!(column_type(&set, "weight"), "REAL");
        assert_eq!(column_type(&set, "count"), "INTEGER");
        assert_eq!(column_type(&set, "date_added"), "TEXT");
    }
}
