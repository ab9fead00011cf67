use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source database error: {0}")]
    SourceDb(#[from] sqlx::Error),

    #[error("Sink database error: {0}")]
    Sink(#[from] rusqlite::Error),

    #[error("Document extraction failed: {0}")]
    Document(String),

    #[error("Malformed payload: {0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {message}")]
    Api { message: String },

    #[error("No cleaning profile registered under '{0}'")]
    UnknownProfile(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
