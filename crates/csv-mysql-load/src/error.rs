//! Error types for the load library.

use thiserror::Error;

use crate::core::value::ScalarKind;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for invalid or unreadable configuration.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code when the sink connection cannot be established or is lost.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code when a source file cannot be read.
pub const EXIT_SOURCE_ERROR: u8 = 3;
/// Exit code when a field fails numeric coercion.
pub const EXIT_COERCION_ERROR: u8 = 4;
/// Exit code when the sink rejects a batch.
pub const EXIT_BATCH_INSERT_ERROR: u8 = 5;
/// Exit code for other file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for load operations.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sink connection could not be established, or was lost
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Source file missing, unreadable, or structurally malformed
    #[error("Source read failed for table {table}: {message}")]
    SourceRead { table: String, message: String },

    /// A non-empty field did not parse under its column's numeric rule
    #[error("Cannot coerce {value:?} in column {column} to {kind}")]
    Coercion {
        column: String,
        value: String,
        kind: ScalarKind,
    },

    /// Sink rejected a batch flush (constraint violation, arity/type mismatch)
    #[error("Batch insert failed for table {table}: {message}")]
    BatchInsert { table: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        LoadError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a SourceRead error
    pub fn source_read(table: impl Into<String>, message: impl ToString) -> Self {
        LoadError::SourceRead {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Create a BatchInsert error
    pub fn batch_insert(table: impl Into<String>, message: impl ToString) -> Self {
        LoadError::BatchInsert {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            LoadError::Config(_) | LoadError::Yaml(_) | LoadError::Json(_) => EXIT_CONFIG_ERROR,
            LoadError::Connection { .. } => EXIT_CONNECTION_ERROR,
            LoadError::SourceRead { .. } => EXIT_SOURCE_ERROR,
            LoadError::Coercion { .. } => EXIT_COERCION_ERROR,
            LoadError::BatchInsert { .. } => EXIT_BATCH_INSERT_ERROR,
            LoadError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;
