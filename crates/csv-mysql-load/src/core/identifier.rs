//! Identifier validation and quoting for generated SQL.
//!
//! Table and column names come from the load manifest and cannot be bound as
//! statement parameters, so they are validated and backtick-quoted before being
//! spliced into an INSERT. Only data values travel as parameters.

use crate::error::{LoadError, Result};

/// MySQL identifier length limit.
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Validate an identifier for security issues.
///
/// Rejects empty identifiers, identifiers containing null bytes and
/// identifiers longer than MySQL accepts.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LoadError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(LoadError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(LoadError::Config(format!(
            "Identifier exceeds maximum length of {} characters: {:?}",
            MAX_IDENTIFIER_LENGTH, name
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier.
///
/// Escapes backticks by doubling them and wraps in backticks.
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Quote a possibly database-qualified table name (`db.table`).
///
/// Each dot-separated part is quoted on its own, so `modelagem.municipio`
/// becomes `` `modelagem`.`municipio` ``.
pub fn qualify_mysql(table: &str) -> Result<String> {
    let parts = table
        .split('.')
        .map(quote_mysql)
        .collect::<Result<Vec<_>>>()?;
    if parts.len() > 2 {
        return Err(LoadError::Config(format!(
            "Table name has too many qualifiers: {:?}",
            table
        )));
    }
    Ok(parts.join("."))
}
