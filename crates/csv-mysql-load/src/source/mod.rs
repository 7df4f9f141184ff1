//! CSV source files.
//!
//! Each manifest entry names a file relative to the configured CSV folder.
//! Files are expected to carry a header row; records are streamed one at a
//! time and never buffered beyond the current record.

mod record;

pub use record::{CsvRecords, SourceRecord};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use crate::config::LoadConfig;
use crate::core::schema::TableLoadSpec;
use crate::error::{LoadError, Result};

/// Opens the CSV file behind each table spec.
#[derive(Debug, Clone)]
pub struct CsvSource {
    folder: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(folder: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            folder: folder.into(),
            delimiter,
        }
    }

    /// Build from the `load` section of the configuration.
    pub fn from_config(config: &LoadConfig) -> Self {
        Self::new(&config.csv_folder, config.delimiter_byte())
    }

    /// Path of the file feeding a table spec.
    pub fn resolve(&self, spec: &TableLoadSpec) -> PathBuf {
        self.folder.join(&spec.csv)
    }

    /// Open the file for a table spec and read its header.
    pub fn open(&self, spec: &TableLoadSpec) -> Result<CsvRecords<BufReader<File>>> {
        let path = self.resolve(spec);
        let file = File::open(&path).map_err(|e| {
            LoadError::source_read(&spec.table, format!("opening {}: {}", path.display(), e))
        })?;
        self.from_reader(spec, BufReader::new(file))
    }

    /// Stream records for a table spec from any reader.
    pub fn from_reader<R: Read>(&self, spec: &TableLoadSpec, reader: R) -> Result<CsvRecords<R>> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        CsvRecords::new(&spec.table, reader, &spec.columns)
    }
}
