use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument};

use super::ObjectSource;
use crate::error::{EtlError, Result};
use crate::types::{Cell, Record, RecordSet};

/// Object storage reader over plain HTTPS.
///
/// `s3://bucket` stores resolve to the bucket's public virtual-hosted URL;
/// `http(s)://` stores are used as a base URL as-is.
pub struct HttpObjectSource {
    client: Client,
}

impl HttpObjectSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Payload layouts understood by the reader, chosen by key extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectFormat {
    Csv,
    Json,
}

impl ObjectFormat {
    pub fn from_key(key: &str) -> Result<Self> {
        let lower = key.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(ObjectFormat::Csv)
        } else if lower.ends_with(".json") {
            Ok(ObjectFormat::Json)
        } else {
            Err(EtlError::Format(format!("unsupported object type for key '{key}'")))
        }
    }
}

/// HTTPS URL for `key` within `store`.
pub fn object_url(store: &str, key: &str) -> String {
    let key = key.trim_start_matches('/');
    match store.strip_prefix("s3://") {
        Some(bucket) => format!("https://{}.s3.amazonaws.com/{}", bucket.trim_end_matches('/'), key),
        None => format!("{}/{}", store.trim_end_matches('/'), key),
    }
}

/// Parse CSV with a header row. Blank header names become `Unnamed: <i>` and
/// field types are inferred per cell.
pub fn parse_csv(bytes: &[u8]) -> Result<RecordSet> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.trim();
            if h.is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::infer).collect());
    }
    Ok(RecordSet::from_rows(columns, rows))
}

/// Parse JSON as either an array of row objects, a column-oriented object of
/// `{row_key: value}` maps, or a single row object.
pub fn parse_json(bytes: &[u8]) -> Result<RecordSet> {
    let value: Value = serde_json::from_slice(bytes)?;
    match &value {
        Value::Array(items) => Ok(RecordSet::from_json_records(items)),
        Value::Object(obj) if !obj.is_empty() && obj.values().all(Value::is_object) => {
            let columns: Vec<String> = obj.keys().cloned().collect();

            let mut row_keys: Vec<String> = Vec::new();
            for column in obj.values().filter_map(Value::as_object) {
                for key in column.keys() {
                    if !row_keys.contains(key) {
                        row_keys.push(key.clone());
                    }
                }
            }

            let mut set = RecordSet::new(columns);
            for row_key in &row_keys {
                let record: Record = obj
                    .iter()
                    .map(|(column, values)| {
                        let cell = values.get(row_key).map_or(Cell::Null, Cell::from);
                        (column.clone(), cell)
                    })
                    .collect();
                set.push(record);
            }
            Ok(set)
        }
        Value::Object(_) => Ok(RecordSet::from_json_records(std::slice::from_ref(&value))),
        other => Err(EtlError::Format(format!("expected JSON array or object, got {other}"))),
    }
}

#[async_trait]
impl ObjectSource for HttpObjectSource {
    #[instrument(skip(self))]
    async fn fetch_object(&self, store: &str, key: &str) -> Result<RecordSet> {
        let format = ObjectFormat::from_key(key)?;
        let url = object_url(store, key);
        let bytes = self.client.get(&url).send().await?.error_for_status()?.bytes().await?;
        info!("Downloaded {} bytes from {}", bytes.len(), url);

        match format {
            ObjectFormat::Csv => parse_csv(&bytes),
            ObjectFormat::Json => parse_json(&bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url() {
        assert_eq!(
            object_url("s3://data-handling-public", "products.csv"),
            "https://data-handling-public.s3.amazonaws.com/products.csv"
        );
        assert_eq!(
            object_url("https://bucket.s3.eu-west-1.amazonaws.com/", "/date_details.json"),
            "https://bucket.s3.eu-west-1.amazonaws.com/date_details.json"
        );
    }

    #[test]
    fn test_format_from_key() {
        assert_eq!(ObjectFormat::from_key("products.CSV").unwrap(), ObjectFormat::Csv);
        assert_eq!(ObjectFormat::from_key("a/b/date_details.json").unwrap(), ObjectFormat::Json);
        assert!(ObjectFormat::from_key("card_details.pdf").is_err());
    }

    #[test]
    fn test_parse_csv_names_blank_headers() {
        let csv = b",product_name,product_price,weight\n0,Tea,\xc2\xa39.99,\"2 x 500g\"\n1,Rope,1.5,12\n";
        let set = parse_csv(csv).unwrap();

        assert_eq!(set.columns(), &["Unnamed: 0", "product_name", "product_price", "weight"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0, "Unnamed: 0"), Some(&Cell::Int(0)));
        assert_eq!(set.get(0, "weight"), Some(&Cell::text("2 x 500g")));
        assert_eq!(set.get(1, "product_price"), Some(&Cell::Float(1.5)));
        assert_eq!(set.get(1, "weight"), Some(&Cell::Int(12)));
    }

    #[test]
    fn test_parse_column_oriented_json() {
        let json = br#"{
            "timestamp": {"0": "22:00:06", "1": "17:29:32"},
            "month": {"0": "9", "1": "2"},
            "year": {"0": "2012", "1": "1997"}
        }"#;
        let set = parse_json(json).unwrap();

        assert_eq!(set.columns(), &["timestamp", "month", "year"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1, "timestamp"), Some(&Cell::text("17:29:32")));
        assert_eq!(set.get(0, "month"), Some(&Cell::text("9")));
    }

    #[test]
    fn test_parse_record_oriented_json() {
        let set = parse_json(br#"[{"a": 1, "b": "x"}, {"a": 2}]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1, "b"), Some(&Cell::Null));

        assert!(parse_json(b"42").is_err());
    }
}
