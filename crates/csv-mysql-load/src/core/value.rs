//! Typed values, rows and batches.
//!
//! Source fields arrive as text; the type coercer turns each one into a
//! [`SqlValue`] and the batch inserter groups the resulting [`Row`]s into
//! size-bounded [`Batch`]es before they are written to the sink.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar kind a column is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Integer,
    Float,
    String,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
        };
        f.write_str(name)
    }
}

/// A single typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Empty source field.
    Null,

    /// 64-bit signed integer.
    Int(i64),

    /// 64-bit floating point.
    Float(f64),

    /// Text passed through unchanged.
    Text(String),
}

impl SqlValue {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Kind of a non-null value.
    #[must_use]
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            SqlValue::Null => None,
            SqlValue::Int(_) => Some(ScalarKind::Integer),
            SqlValue::Float(_) => Some(ScalarKind::Float),
            SqlValue::Text(_) => Some(ScalarKind::String),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

/// One coerced record, values in the table spec's column order.
pub type Row = Vec<SqlValue>;

/// Bounded, ordered buffer of rows for one table.
///
/// The length never exceeds `capacity`; [`Batch::push`] reports when the
/// batch has become full so the owner can flush it.
#[derive(Debug)]
pub struct Batch {
    rows: Vec<Row>,
    capacity: usize,
}

impl Batch {
    /// Create an empty batch. A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a row. Returns `true` once the batch has reached capacity.
    pub fn push(&mut self, row: Row) -> bool {
        debug_assert!(self.rows.len() < self.capacity, "batch pushed past capacity");
        self.rows.push(row);
        self.is_full()
    }

    /// Drop the buffered rows, keeping the allocation.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Rows currently buffered.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    /// Get the number of rows in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
