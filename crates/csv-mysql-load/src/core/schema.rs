//! Load manifest entries and the INSERT statements built from them.

use serde::{Deserialize, Serialize};

use super::identifier::{qualify_mysql, quote_mysql};
use crate::error::Result;

/// One manifest entry: which CSV file feeds which table, and through which columns.
///
/// Column order is both the CSV-header lookup order and the positional
/// parameter order of the generated INSERT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLoadSpec {
    /// Target table, optionally database-qualified (`modelagem.municipio`).
    pub table: String,

    /// Source file name, resolved relative to the configured CSV folder.
    pub csv: String,

    /// Columns to load, in insert order.
    pub columns: Vec<String>,
}

impl TableLoadSpec {
    pub fn new(table: impl Into<String>, csv: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            table: table.into(),
            csv: csv.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// A parameterized multi-row INSERT for one table.
///
/// Identifiers are quoted once at construction; [`InsertStatement::sql`]
/// renders the `VALUES` list for a given number of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    table: String,
    qualified_table: String,
    column_list: String,
    num_columns: usize,
}

impl InsertStatement {
    /// Build the statement skeleton for a table spec.
    pub fn for_spec(spec: &TableLoadSpec) -> Result<Self> {
        let qualified_table = qualify_mysql(&spec.table)?;
        let column_list = spec
            .columns
            .iter()
            .map(|c| quote_mysql(c))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        Ok(Self {
            table: spec.table.clone(),
            qualified_table,
            column_list,
            num_columns: spec.columns.len(),
        })
    }

    /// Unquoted table name, for logs and errors.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Render the INSERT with one placeholder group per row.
    pub fn sql(&self, rows: usize) -> String {
        let placeholders_per_row = format!("({})", vec!["?"; self.num_columns].join(", "));
        let all_placeholders: Vec<String> = std::iter::repeat(placeholders_per_row)
            .take(rows)
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.qualified_table,
            self.column_list,
            all_placeholders.join(", ")
        )
    }
}
