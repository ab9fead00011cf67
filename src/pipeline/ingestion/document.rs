use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use super::DocumentSource;
use crate::error::{EtlError, Result};
use crate::types::{Cell, RecordSet};

/// Reads a whitespace-aligned table out of a PDF.
///
/// The first non-empty line of extracted text is the header. Header lines
/// repeated on later pages are skipped. When a line has more tokens than there
/// are columns, the surplus is absorbed by `spill_column` (multi-word values
/// such as card provider names); other columns take one token each.
pub struct PdfDocumentSource {
    client: Client,
    spill_column: Option<String>,
}

impl PdfDocumentSource {
    pub fn new(client: Client) -> Self {
        Self { client, spill_column: None }
    }

    pub fn with_spill_column(mut self, column: &str) -> Self {
        self.spill_column = Some(column.to_string());
        self
    }
}

/// Split extracted document text into a record set. All cells are text.
pub fn parse_text_table(text: &str, spill_column: Option<&str>) -> RecordSet {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let Some(header) = lines.next() else {
        return RecordSet::default();
    };

    let columns: Vec<String> = header.split_whitespace().map(str::to_string).collect();
    let spill = spill_column
        .and_then(|name| columns.iter().position(|c| c == name))
        .unwrap_or(columns.len().saturating_sub(1));

    let rows: Vec<Vec<Cell>> = lines
        .filter(|line| *line != header)
        .map(|line| split_row(line, columns.len(), spill))
        .collect();
    debug!("Parsed {} document rows", rows.len());
    RecordSet::from_rows(columns, rows)
}

fn split_row(line: &str, width: usize, spill: usize) -> Vec<Cell> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() <= width {
        return tokens.into_iter().map(Cell::text).collect();
    }

    let trailing = width - spill - 1;
    let (head, rest) = tokens.split_at(spill);
    let (middle, tail) = rest.split_at(rest.len() - trailing);

    head.iter()
        .map(|t| Cell::text(*t))
        .chain(std::iter::once(Cell::text(middle.join(" "))))
        .chain(tail.iter().map(|t| Cell::text(*t)))
        .collect()
}

#[async_trait]
impl DocumentSource for PdfDocumentSource {
    #[instrument(skip(self))]
    async fn fetch_document_table(&self, url: &str) -> Result<RecordSet> {
        let bytes = self.client.get(url).send().await?.error_for_status()?.bytes().await?;
        info!("Downloaded {} byte document", bytes.len());

        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| EtlError::Document(e.to_string()))?;
        Ok(parse_text_table(&text, self.spill_column.as_deref()))
    }
}
