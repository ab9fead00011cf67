use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

use super::ingestion::document::PdfDocumentSource;
use super::ingestion::object_store::HttpObjectSource;
use super::ingestion::relational::PostgresSource;
use super::ingestion::rest_api::HttpApiSource;
use super::ingestion::{ApiSource, DocumentSource, ObjectSource, RelationalSource};
use super::processing::normalize::ProfileRegistry;
use super::storage::{export_csv, SqliteSink, TableSink};
use crate::config::{Config, SourcesConfig, StoresApiConfig};
use crate::constants::*;
use crate::error::Result;
use crate::types::RecordSet;

const HTTP_TIMEOUT_SECS: u64 = 60;
/// Column of the card details document whose values contain spaces
const CARD_PROVIDER_COLUMN: &str = "card_provider";

/// One source-to-table load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    Users,
    Cards,
    Stores,
    Products,
    Orders,
    DateTimes,
}

impl Job {
    pub const ALL: [Job; 6] = [
        Job::Users,
        Job::Cards,
        Job::Stores,
        Job::Products,
        Job::Orders,
        Job::DateTimes,
    ];

    pub fn profile(self) -> &'static str {
        match self {
            Job::Users => USERS_PROFILE,
            Job::Cards => CARDS_PROFILE,
            Job::Stores => STORES_PROFILE,
            Job::Products => PRODUCTS_PROFILE,
            Job::Orders => ORDERS_PROFILE,
            Job::DateTimes => DATE_TIMES_PROFILE,
        }
    }

    /// Destination table in the local store
    pub fn table(self) -> &'static str {
        match self {
            Job::Users => USERS_TABLE,
            Job::Cards => CARDS_TABLE,
            Job::Stores => STORES_TABLE,
            Job::Products => PRODUCTS_TABLE,
            Job::Orders => ORDERS_TABLE,
            Job::DateTimes => DATE_TIMES_TABLE,
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Job::Users => "users",
            Job::Cards => "cards",
            Job::Stores => "stores",
            Job::Products => "products",
            Job::Orders => "orders",
            Job::DateTimes => "date_times",
        };
        f.write_str(name)
    }
}

/// Result of one job run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub job: Job,
    pub table: String,
    pub input_rows: usize,
    pub output_rows: usize,
    pub dropped_rows: usize,
    pub columns: Vec<String>,
    pub written: bool,
    /// CSV export path, when one was requested
    pub exported: Option<String>,
    pub duration_ms: u128,
}

/// The four extraction ports a pipeline reads from
#[derive(Clone)]
pub struct Sources {
    pub relational: Arc<dyn RelationalSource>,
    pub document: Arc<dyn DocumentSource>,
    pub api: Arc<dyn ApiSource>,
    pub objects: Arc<dyn ObjectSource>,
}

/// Where each non-relational job finds its data
#[derive(Debug, Clone)]
pub struct SourceLocations {
    pub stores_api: StoresApiConfig,
    pub sources: SourcesConfig,
}

pub struct Pipeline {
    sources: Sources,
    sink: Arc<dyn TableSink>,
    registry: ProfileRegistry,
    locations: SourceLocations,
}

impl Pipeline {
    pub fn new(
        sources: Sources,
        sink: Arc<dyn TableSink>,
        registry: ProfileRegistry,
        locations: SourceLocations,
    ) -> Self {
        Self { sources, sink, registry, locations }
    }

    /// Wire the network adapters and the SQLite sink described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("retail_etl/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let sources = Sources {
            relational: Arc::new(PostgresSource::connect_lazy(&config.source_db)?),
            document: Arc::new(PdfDocumentSource::new(client.clone()).with_spill_column(CARD_PROVIDER_COLUMN)),
            api: Arc::new(HttpApiSource::new(client.clone())),
            objects: Arc::new(HttpObjectSource::new(client)),
        };
        let sink = Arc::new(SqliteSink::open(&config.sink.path)?);

        let mut registry = ProfileRegistry::new();
        for profile in &config.profiles {
            info!("Registering configured profile {}", profile.name);
            registry.register(profile.clone());
        }

        let locations = SourceLocations {
            stores_api: config.stores_api.clone(),
            sources: config.sources.clone(),
        };
        Ok(Self::new(sources, sink, registry, locations))
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn sink(&self) -> &Arc<dyn TableSink> {
        &self.sink
    }

    /// Pull the raw table for `job` from its source.
    #[instrument(skip(self))]
    pub async fn extract(&self, job: Job) -> Result<RecordSet> {
        let sources = &self.sources;
        let locations = &self.locations;
        match job {
            Job::Users => sources.relational.fetch_table(USERS_SOURCE_TABLE).await,
            Job::Orders => sources.relational.fetch_table(ORDERS_SOURCE_TABLE).await,
            Job::Cards => {
                sources
                    .document
                    .fetch_document_table(&locations.sources.card_details_url)
                    .await
            }
            Job::Stores => {
                let api = &locations.stores_api;
                let headers = api.headers();
                let count = sources.api.count_entities(&api.count_url, &headers).await?;
                info!("Store API reports {} stores", count);
                sources
                    .api
                    .fetch_paginated_api(count, &api.detail_url_template, &headers)
                    .await
            }
            Job::Products => {
                let src = &locations.sources;
                sources.objects.fetch_object(&src.products_store, &src.products_key).await
            }
            Job::DateTimes => {
                let src = &locations.sources;
                sources.objects.fetch_object(&src.date_times_store, &src.date_times_key).await
            }
        }
    }

    /// Fetch, clean and replace the destination table for `job`.
    #[instrument(skip(self), fields(table = job.table()))]
    pub async fn run_job(&self, job: Job) -> Result<PipelineResult> {
        let (result, _) = self.execute(job, true, None).await?;
        Ok(result)
    }

    /// `run_job`, then also export the cleaned table as CSV to `export`.
    #[instrument(skip(self), fields(table = job.table()))]
    pub async fn run_job_with_export(&self, job: Job, export: &Path) -> Result<PipelineResult> {
        let (result, _) = self.execute(job, true, Some(export)).await?;
        Ok(result)
    }

    /// Extract and clean but leave the sink untouched. Returns the cleaned
    /// table alongside the result; `export` still receives a CSV copy.
    pub async fn dry_run(&self, job: Job, export: Option<&Path>) -> Result<(PipelineResult, RecordSet)> {
        self.execute(job, false, export).await
    }

    async fn execute(
        &self,
        job: Job,
        write: bool,
        export: Option<&Path>,
    ) -> Result<(PipelineResult, RecordSet)> {
        info!("🚀 Starting job {}", job);
        let started = Instant::now();

        let raw = self.extract(job).await?;
        let input_rows = raw.len();
        info!("📡 Extracted {} rows for {}", input_rows, job);

        let cleaned = self.registry.clean(job.profile(), raw)?;
        if write {
            self.sink.write_table(job.table(), &cleaned).await?;
        }
        if let Some(path) = export {
            export_csv(&cleaned, path)?;
        }

        let result = PipelineResult {
            job,
            table: job.table().to_string(),
            input_rows,
            output_rows: cleaned.len(),
            dropped_rows: input_rows - cleaned.len(),
            columns: cleaned.columns().to_vec(),
            written: write,
            exported: export.map(|p| p.display().to_string()),
            duration_ms: started.elapsed().as_millis(),
        };
        info!(
            job = %job,
            output_rows = result.output_rows,
            dropped_rows = result.dropped_rows,
            "✅ Finished job"
        );
        Ok((result, cleaned))
    }

    /// Run every job in order. A failing job is logged and does not stop the rest.
    pub async fn run_all(&self) -> Vec<(Job, Result<PipelineResult>)> {
        let mut results = Vec::with_capacity(Job::ALL.len());
        for job in Job::ALL {
            let result = self.run_job(job).await;
            if let Err(e) = &result {
                error!("❌ Job {} failed: {}", job, e);
            }
            results.push((job, result));
        }
        results
    }
}
