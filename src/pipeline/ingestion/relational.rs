use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use super::RelationalSource;
use crate::config::SourceDbConfig;
use crate::error::Result;
use crate::types::RecordSet;

/// PostgreSQL table reader.
///
/// Rows are fetched as `row_to_json` text so that any table shape decodes
/// into loosely-typed cells without a per-table row type.
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    /// Configure a lazily-connecting pool; no connection is opened until the
    /// first query.
    pub fn connect_lazy(config: &SourceDbConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_lazy(&config.connection_url())?;
        info!("Configured source database at {}:{}/{}", config.host, config.port, config.database);
        Ok(Self { pool })
    }
}

/// Double-quote an identifier for PostgreSQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn select_as_json_sql(table: &str) -> String {
    format!("SELECT row_to_json(t)::text FROM {} AS t", quote_identifier(table))
}

#[async_trait]
impl RelationalSource for PostgresSource {
    #[instrument(skip(self))]
    async fn fetch_table(&self, name: &str) -> Result<RecordSet> {
        let rows: Vec<String> = sqlx::query_scalar(&select_as_json_sql(name))
            .fetch_all(&self.pool)
            .await?;

        let values = rows
            .iter()
            .map(|row| serde_json::from_str::<Value>(row))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let set = RecordSet::from_json_records(&values);
        debug!("Read {} rows, {} columns from {}", set.len(), set.columns().len(), name);
        Ok(set)
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables
             WHERE table_schema = 'public' ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }
}
