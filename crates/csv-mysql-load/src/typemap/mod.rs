//! Keyword-based type coercion for CSV fields.
//!
//! A column's scalar kind is decided by its name. The rules live in one
//! ordered table, [`COERCION_RULES`], evaluated top to bottom with the first
//! match winning; columns matching no rule are passed through as text.
//! Keywords are matched as case-insensitive substrings of the column name.
//!
//! An empty field is always NULL, before any rule is consulted.

use crate::core::value::{ScalarKind, SqlValue};
use crate::error::{LoadError, Result};

/// Maps columns whose name contains any of `keywords` to `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionRule {
    pub keywords: &'static [&'static str],
    pub kind: ScalarKind,
}

impl CoercionRule {
    /// Check whether this rule applies to an already lowercased column name.
    fn matches(&self, lowered_column: &str) -> bool {
        self.keywords.iter().any(|kw| lowered_column.contains(kw))
    }
}

/// Ordered coercion rules. The year marker comes first so that a column
/// such as `ano_valor` is an integer, never a float.
pub const COERCION_RULES: &[CoercionRule] = &[
    // Year columns
    CoercionRule {
        keywords: &["ano"],
        kind: ScalarKind::Integer,
    },
    // Monetary / decimal columns
    CoercionRule {
        keywords: &["decimal", "valor", "despesa", "receita", "investimento"],
        kind: ScalarKind::Float,
    },
    // Counts and identifiers
    CoercionRule {
        keywords: &["populacao", "quantidade", "id_"],
        kind: ScalarKind::Integer,
    },
];

/// Resolve the scalar kind for a column name.
pub fn kind_for_column(column: &str) -> ScalarKind {
    let lowered = column.to_lowercase();
    COERCION_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.kind)
        .unwrap_or(ScalarKind::String)
}

/// Coerce a raw field for a column.
///
/// Empty input yields NULL regardless of the column; malformed numeric text
/// yields `LoadError::Coercion`.
pub fn coerce(column: &str, raw: &str) -> Result<SqlValue> {
    coerce_as(column, kind_for_column(column), raw)
}

/// Coerce a raw field to an already resolved kind.
pub fn coerce_as(column: &str, kind: ScalarKind, raw: &str) -> Result<SqlValue> {
    if raw.is_empty() {
        return Ok(SqlValue::Null);
    }

    let invalid = || LoadError::Coercion {
        column: column.to_string(),
        value: raw.to_string(),
        kind,
    };

    match kind {
        ScalarKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(SqlValue::Int)
            .map_err(|_| invalid()),
        ScalarKind::Float => raw
            .trim()
            .parse::<f64>()
            .map(SqlValue::Float)
            .map_err(|_| invalid()),
        ScalarKind::String => Ok(SqlValue::Text(raw.to_string())),
    }
}

/// Per-table coercer with each column's kind resolved once up front.
#[derive(Debug, Clone)]
pub struct TypeCoercer {
    columns: Vec<(String, ScalarKind)>,
}

impl TypeCoercer {
    /// Resolve kinds for the given columns, in order.
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        let columns = columns
            .iter()
            .map(|c| {
                let name = c.as_ref().to_string();
                let kind = kind_for_column(&name);
                (name, kind)
            })
            .collect();
        Self { columns }
    }

    /// Column names with their resolved kinds.
    pub fn columns(&self) -> &[(String, ScalarKind)] {
        &self.columns
    }

    /// Build a row by looking up each column through `field` and coercing it.
    ///
    /// `field` returns the raw text for a column name; callers map a missing
    /// field to the empty string.
    pub fn coerce_row<'r, F>(&self, mut field: F) -> Result<Vec<SqlValue>>
    where
        F: FnMut(&str) -> &'r str,
    {
        self.columns
            .iter()
            .map(|(name, kind)| coerce_as(name, *kind, field(name)))
            .collect()
    }
}
