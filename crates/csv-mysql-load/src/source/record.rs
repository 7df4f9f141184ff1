//! Header-keyed CSV records.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use csv::StringRecord;
use tracing::warn;

use crate::error::{LoadError, Result};

/// Header name to field position.
type HeaderIndex = Arc<HashMap<String, usize>>;

/// One source record, fields addressed by header name.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    headers: HeaderIndex,
    record: StringRecord,
    line: u64,
}

impl SourceRecord {
    /// Raw text of a field. A column absent from the header, or a short
    /// record without that field, reads as the empty string.
    pub fn get(&self, column: &str) -> &str {
        self.headers
            .get(column)
            .and_then(|&idx| self.record.get(idx))
            .unwrap_or("")
    }

    /// 1-based line number in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }
}

/// Lazy, single-pass stream of records from one CSV file.
pub struct CsvRecords<R> {
    table: String,
    reader: csv::Reader<R>,
    headers: HeaderIndex,
    done: bool,
}

impl<R: Read> CsvRecords<R> {
    /// Read the header row and prepare the stream.
    ///
    /// `columns` are the manifest columns for the table; any that the header
    /// lacks are logged once, since every record will read them as empty.
    pub(crate) fn new(table: &str, mut reader: csv::Reader<R>, columns: &[String]) -> Result<Self> {
        let header = reader
            .headers()
            .map_err(|e| LoadError::source_read(table, format!("reading header: {}", e)))?;

        // Later duplicates shadow earlier ones.
        let headers: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.to_string(), idx))
            .collect();

        let missing: Vec<&str> = columns
            .iter()
            .filter(|c| !headers.contains_key(c.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            warn!(
                "Columns missing from CSV header of {} will load as NULL: {}",
                table,
                missing.join(", ")
            );
        }

        Ok(Self {
            table: table.to_string(),
            reader,
            headers: Arc::new(headers),
            done: false,
        })
    }
}

impl<R: Read> Iterator for CsvRecords<R> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                Some(Ok(SourceRecord {
                    headers: Arc::clone(&self.headers),
                    record,
                    line,
                }))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(LoadError::source_read(&self.table, e)))
            }
        }
    }
}
