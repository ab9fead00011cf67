use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{EtlError, Result};
use crate::pipeline::processing::normalize::CleaningProfile;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source_db: SourceDbConfig,
    pub sink: SinkConfig,
    pub stores_api: StoresApiConfig,
    pub sources: SourcesConfig,
    /// Extra profiles; a profile named like a built-in one replaces it
    #[serde(default)]
    pub profiles: Vec<CleaningProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceDbConfig {
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
}

fn default_pg_port() -> u16 {
    5432
}

impl SourceDbConfig {
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    #[serde(default = "default_sink_path")]
    pub path: String,
}

fn default_sink_path() -> String {
    "data/sales_data.db".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoresApiConfig {
    pub count_url: String,
    /// Store detail URL with `{}` in place of the store number
    pub detail_url_template: String,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

impl StoresApiConfig {
    pub fn headers(&self) -> Vec<(String, String)> {
        self.api_key
            .iter()
            .map(|key| (self.api_key_header.clone(), key.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub card_details_url: String,
    pub products_store: String,
    #[serde(default = "default_products_key")]
    pub products_key: String,
    pub date_times_store: String,
    #[serde(default = "default_date_times_key")]
    pub date_times_key: String,
}

fn default_products_key() -> String {
    "products.csv".to_string()
}

fn default_date_times_key() -> String {
    "date_details.json".to_string()
}

impl Config {
    /// Read the TOML file at `path`, then apply environment overrides
    /// (`RDS_PASSWORD`, `STORES_API_KEY`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(password) = env::var("RDS_PASSWORD") {
            self.source_db.password = password;
        }
        if let Ok(key) = env::var("STORES_API_KEY") {
            self.stores_api.api_key = Some(key);
        }
    }
}
