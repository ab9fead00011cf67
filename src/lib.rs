pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

pub use error::{EtlError, Result};
pub use types::{Cell, Record, RecordSet};
