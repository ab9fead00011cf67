// Pipeline ingestion: source ports and their network adapters

pub mod document;
pub mod object_store;
pub mod relational;
pub mod rest_api;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RecordSet;

/// Request headers as name/value pairs
pub type Headers = [(String, String)];

/// Reads whole tables from a relational database.
#[async_trait]
pub trait RelationalSource: Send + Sync {
    async fn fetch_table(&self, name: &str) -> Result<RecordSet>;

    async fn list_tables(&self) -> Result<Vec<String>>;
}

/// Extracts a table from a document (PDF) at a URL.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_document_table(&self, url: &str) -> Result<RecordSet>;
}

/// Retrieves one record per entity from a paginated REST API.
#[async_trait]
pub trait ApiSource: Send + Sync {
    /// Number of entities the API exposes
    async fn count_entities(&self, url: &str, headers: &Headers) -> Result<usize>;

    /// Fetch entities `0..entity_count`; `{}` in the template is the entity index
    async fn fetch_paginated_api(
        &self,
        entity_count: usize,
        url_template: &str,
        headers: &Headers,
    ) -> Result<RecordSet>;
}

/// Reads a CSV or JSON object from object storage.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    async fn fetch_object(&self, store: &str, key: &str) -> Result<RecordSet>;
}
