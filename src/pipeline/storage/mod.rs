// Pipeline storage: destination table writers

pub mod csv_export;
pub mod in_memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RecordSet;

pub use csv_export::{export_csv, CsvSink};
pub use in_memory::InMemorySink;
pub use sqlite::SqliteSink;

/// Destination for cleaned tables
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Write `set` as table `name`, replacing any existing contents.
    async fn write_table(&self, name: &str, set: &RecordSet) -> Result<()>;

    async fn list_tables(&self) -> Result<Vec<String>>;
}
