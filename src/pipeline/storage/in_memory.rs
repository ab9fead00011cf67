use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::TableSink;
use crate::error::{EtlError, Result};
use crate::types::RecordSet;

/// In-memory sink for development/testing
#[derive(Clone, Default)]
pub struct InMemorySink {
    tables: Arc<Mutex<HashMap<String, RecordSet>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a written table
    pub fn table(&self, name: &str) -> Option<RecordSet> {
        self.tables.lock().ok()?.get(name).cloned()
    }
}

#[async_trait]
impl TableSink for InMemorySink {
    async fn write_table(&self, name: &str, set: &RecordSet) -> Result<()> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| EtlError::Storage("in-memory sink lock poisoned".to_string()))?;
        tables.insert(name.to_string(), set.clone());

        debug!("Stored table {} with {} rows", name, set.len());
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let tables = self
            .tables
            .lock()
            .map_err(|_| EtlError::Storage("in-memory sink lock poisoned".to_string()))?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
