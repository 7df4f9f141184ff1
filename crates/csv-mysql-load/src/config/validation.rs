//! Configuration validation.

use std::collections::HashSet;

use super::Config;
use crate::core::identifier::{qualify_mysql, validate_identifier};
use crate::error::{LoadError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Target validation
    if config.target.host.is_empty() {
        return Err(LoadError::Config("target.host is required".into()));
    }
    if config.target.database.is_empty() {
        return Err(LoadError::Config("target.database is required".into()));
    }
    if config.target.user.is_empty() {
        return Err(LoadError::Config("target.user is required".into()));
    }

    // Load validation
    if config.load.batch_size == 0 {
        return Err(LoadError::Config("load.batch_size must be at least 1".into()));
    }
    if !config.load.delimiter.is_ascii() || matches!(config.load.delimiter, '\n' | '\r' | '"') {
        return Err(LoadError::Config(format!(
            "load.delimiter must be a single ASCII character other than quote or newline, got {:?}",
            config.load.delimiter
        )));
    }
    if !config.load.is_utf8() {
        return Err(LoadError::Config(format!(
            "load.encoding must be utf-8, got '{}'",
            config.load.encoding
        )));
    }

    // Manifest validation
    if config.tables.is_empty() {
        return Err(LoadError::Config("tables must list at least one table".into()));
    }
    for (idx, spec) in config.tables.iter().enumerate() {
        qualify_mysql(&spec.table)
            .map_err(|e| LoadError::Config(format!("tables[{}].table: {}", idx, e)))?;
        if spec.csv.is_empty() {
            return Err(LoadError::Config(format!(
                "tables[{}].csv is required for {}",
                idx, spec.table
            )));
        }
        if spec.columns.is_empty() {
            return Err(LoadError::Config(format!(
                "tables[{}].columns must list at least one column for {}",
                idx, spec.table
            )));
        }
        let mut seen = HashSet::new();
        for column in &spec.columns {
            validate_identifier(column).map_err(|e| {
                LoadError::Config(format!("tables[{}].columns: {}", idx, e))
            })?;
            if !seen.insert(column.as_str()) {
                return Err(LoadError::Config(format!(
                    "duplicate column '{}' in {}",
                    column, spec.table
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoadConfig, TargetConfig};
    use crate::core::schema::TableLoadSpec;

    fn valid_config() -> Config {
        Config {
            target: TargetConfig {
                host: "localhost".to_string(),
                port: 3306,
                database: "modelagem".to_string(),
                user: "loader".to_string(),
                password: "secret".to_string(),
                ssl_mode: "disable".to_string(),
            },
            load: LoadConfig::default(),
            tables: vec![TableLoadSpec::new(
                "modelagem.municipio",
                "municipio.csv",
                &["id_municipio", "sigla_uf"],
            )],
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_target_host() {
        let mut config = valid_config();
        config.target.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_batch_size() {
        let mut config = valid_config();
        config.load.batch_size = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_utf8_encoding_rejected() {
        let mut config = valid_config();
        config.load.encoding = "latin-1".to_string();
        assert!(validate(&config).is_err());

        config.load.encoding = "UTF8".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        let mut config = valid_config();
        config.load.delimiter = 'é';
        assert!(validate(&config).is_err());
        config.load.delimiter = '"';
        assert!(validate(&config).is_err());
        config.load.delimiter = ';';
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_manifest_rejected() {
        let mut config = valid_config();
        config.tables.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_table_without_columns_rejected() {
        let mut config = valid_config();
        config.tables[0].columns.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut config = valid_config();
        config.tables[0].columns.push("sigla_uf".to_string());
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate column 'sigla_uf'"));
    }
}
