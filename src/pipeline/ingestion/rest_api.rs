use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{ApiSource, Headers};
use crate::constants::STORE_COUNT_FIELD;
use crate::error::{EtlError, Result};
use crate::types::RecordSet;

/// REST client retrieving one JSON object per entity
pub struct HttpApiSource {
    client: Client,
}

impl HttpApiSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn get_json(&self, url: &str, headers: &Headers) -> Result<reqwest::Response> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        Ok(request.send().await?)
    }
}

/// Substitute the entity index into a `{}` URL template.
pub fn entity_url(url_template: &str, index: usize) -> String {
    url_template.replace("{}", &index.to_string())
}

/// Read the entity count from a count endpoint body. The store API uses
/// `number_stores`; otherwise the first integer field is taken.
pub fn entity_count(body: &Value) -> Result<usize> {
    let obj = body.as_object().ok_or_else(|| EtlError::Format(format!("expected object, got {body}")))?;
    obj.get(STORE_COUNT_FIELD)
        .and_then(Value::as_u64)
        .or_else(|| obj.values().find_map(Value::as_u64))
        .map(|n| n as usize)
        .ok_or_else(|| EtlError::Format(format!("no entity count in {body}")))
}

#[async_trait]
impl ApiSource for HttpApiSource {
    async fn count_entities(&self, url: &str, headers: &Headers) -> Result<usize> {
        let response = self.get_json(url, headers).await?.error_for_status()?;
        let body: Value = response.json().await?;
        let count = entity_count(&body)?;
        info!("API reports {} entities", count);
        Ok(count)
    }

    #[instrument(skip(self, headers))]
    async fn fetch_paginated_api(
        &self,
        entity_count: usize,
        url_template: &str,
        headers: &Headers,
    ) -> Result<RecordSet> {
        let mut records = Vec::with_capacity(entity_count);
        for index in 0..entity_count {
            let url = entity_url(url_template, index);
            let response = self.get_json(&url, headers).await?;
            let status = response.status();
            if !status.is_success() {
                warn!("Skipping entity {}: status {}", index, status.as_u16());
                continue;
            }
            records.push(response.json::<Value>().await?);
            debug!("Fetched entity {}", index);
        }

        let set = RecordSet::from_json_records(&records);
        info!("Fetched {} of {} entities", set.len(), entity_count);
        Ok(set)
    }
}
