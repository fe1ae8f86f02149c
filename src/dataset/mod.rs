// Tabular corpus I/O.
//
// A Corpus is the raw CSV: header names plus string rows, all columns kept
// so labeled output can be written back with the original data intact.
// Typed views (QaRecord) are built on top for the fields scoring needs.

pub mod records;
pub mod sample;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Question title column in the scraped Q&A exports.
pub const TITLE_COLUMN: &str = "Title";
/// Answer body column in the scraped Q&A exports.
pub const ANSWER_COLUMN: &str = "Answer";

/// A CSV table held in memory. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Corpus {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                anyhow::bail!(
                    "row {} has {} cells but there are {} columns",
                    i,
                    row.len(),
                    headers.len()
                );
            }
        }
        Ok(Self { headers, rows })
    }

    /// Read a CSV file. Bytes that aren't valid UTF-8 are decoded as Latin-1.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read corpus {}", path.display()))?;
        let text = decode_bytes(bytes);
        Self::from_reader(text.as_bytes())
            .with_context(|| format!("Failed to parse corpus {}", path.display()))
    }

    /// Parse CSV from any reader. Short rows are padded with empty cells;
    /// rows longer than the header are an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("Malformed CSV record {}", i + 1))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > headers.len() {
                anyhow::bail!(
                    "record {} has {} fields but the header has {}",
                    i + 1,
                    row.len(),
                    headers.len()
                );
            }
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        debug!(columns = headers.len(), rows = rows.len(), "Corpus loaded");
        Ok(Self { headers, rows })
    }

    /// Write the corpus as CSV.
    pub fn write_path(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_to(file)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn write_to<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of a column, with empty cells as `None`.
    pub fn column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let idx = self.column_index(name).with_context(|| {
            format!(
                "Column '{}' not found (available: {})",
                name,
                self.headers.join(", ")
            )
        })?;
        Ok(self
            .rows
            .iter()
            .map(|row| {
                row.get(idx)
                    .filter(|cell| !cell.is_empty())
                    .cloned()
            })
            .collect())
    }

    /// Remove a column by name. Returns false if it wasn't present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.headers.remove(idx);
        for row in &mut self.rows {
            if idx < row.len() {
                row.remove(idx);
            }
        }
        true
    }

    /// A new corpus containing only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// UTF-8 if valid, otherwise Latin-1 (every byte maps to one code point).
fn decode_bytes(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("Corpus is not valid UTF-8, decoding as Latin-1");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}
