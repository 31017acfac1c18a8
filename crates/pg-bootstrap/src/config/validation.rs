//! Configuration validation.

use super::Config;
use crate::error::{BootstrapError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Connection validation
    if config.database.host.is_empty() {
        return Err(BootstrapError::Config("database.host is required".into()));
    }
    if config.database.database.is_empty() {
        return Err(BootstrapError::Config(
            "database.database is required".into(),
        ));
    }
    if config.database.user.is_empty() {
        return Err(BootstrapError::Config("database.user is required".into()));
    }
    match config.database.ssl_mode.as_str() {
        "disable" | "prefer" | "require" => {}
        other => {
            return Err(BootstrapError::Config(format!(
                "database.ssl_mode must be 'disable', 'prefer' or 'require', got '{}'",
                other
            )));
        }
    }

    // Pool bounds
    if config.pool.max_open == 0 {
        return Err(BootstrapError::Config(
            "pool.max_open must be at least 1".into(),
        ));
    }
    if config.pool.min_idle > config.pool.max_open {
        return Err(BootstrapError::Config(format!(
            "pool.min_idle ({}) cannot exceed pool.max_open ({})",
            config.pool.min_idle, config.pool.max_open
        )));
    }
    if config.pool.max_lifetime_secs == 0 {
        return Err(BootstrapError::Config(
            "pool.max_lifetime_secs must be at least 1".into(),
        ));
    }

    // Pipeline
    if config.bootstrap.stage_timeout_secs == 0 {
        return Err(BootstrapError::Config(
            "bootstrap.stage_timeout_secs must be at least 1".into(),
        ));
    }
    for schema in &config.bootstrap.schemas {
        if !schema.is_valid_ident() {
            return Err(BootstrapError::Config(format!(
                "bootstrap.schemas entry '{}' is not a valid identifier",
                schema
            )));
        }
    }

    // Descriptors
    for table in &config.bootstrap.tables {
        if table.name.is_empty() {
            return Err(BootstrapError::Config(
                "bootstrap.tables entry has an empty name".into(),
            ));
        }
        if table.columns.is_empty() {
            return Err(BootstrapError::Config(format!(
                "table {} declares no columns",
                table.qualified_name()
            )));
        }
        if !table.schema.is_valid_ident() {
            return Err(BootstrapError::Config(format!(
                "table {} schema '{}' is not a valid identifier",
                table.name, table.schema
            )));
        }
        if !config.bootstrap.schemas.contains(&table.schema) {
            return Err(BootstrapError::Config(format!(
                "table {} references schema '{}' which is not in bootstrap.schemas",
                table.name, table.schema
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BootstrapConfig, DatabaseConfig, PoolConfig};
    use crate::descriptor::{ColumnSpec, ColumnType, TableDescriptor};

    fn valid_config() -> Config {
        Config {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                database: "app".to_string(),
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                ssl_mode: "disable".to_string(),
            },
            pool: PoolConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_host() {
        let mut config = valid_config();
        config.database.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let mut config = valid_config();
        config.database.ssl_mode = "verify-full".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_pool_bound() {
        let mut config = valid_config();
        config.pool.max_open = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_min_idle_exceeding_max_open() {
        let mut config = valid_config();
        config.pool.max_open = 5;
        config.pool.min_idle = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_stage_timeout() {
        let mut config = valid_config();
        config.bootstrap.stage_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unsafe_schema_name() {
        let mut config = valid_config();
        config.bootstrap.schemas.push("bad schema".into());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_table_without_columns() {
        let mut config = valid_config();
        config
            .bootstrap
            .tables
            .push(TableDescriptor::new("master", "empty_mst"));
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_table_in_unconfigured_schema_is_rejected() {
        let mut config = valid_config();
        config.bootstrap.schemas = vec!["master".into(), "bank".into()];
        config.bootstrap.tables.push(
            TableDescriptor::new("sec", "user_mst")
                .column(ColumnSpec::new("user_id_pk", ColumnType::Integer).primary_key()),
        );
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("not in bootstrap.schemas"));
        assert!(err.to_string().contains("'sec'"));
    }

    #[test]
    fn test_table_with_columns_passes() {
        let mut config = valid_config();
        config.bootstrap.tables.push(
            TableDescriptor::new("master", "prao_mst")
                .column(ColumnSpec::new("prao_id_pk", ColumnType::Integer).primary_key()),
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_default_schemas_cover_all_modules() {
        let config = valid_config();
        let names: Vec<&str> = config
            .bootstrap
            .schemas
            .iter()
            .map(|s| s.as_str())
            .collect();
        for expected in ["master", "bank", "sec", "acc"] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
        assert!(validate(&config).is_ok());
    }
}
